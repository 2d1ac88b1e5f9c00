//! Example demonstrating recovery from a damaged AD2CP stream

use ad2cp_core::{encoder::RecordBuilder, scan_bytes, ScanOptions};
use bytes::Bytes;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("AD2CP Damaged Stream Recovery Example\n");

    // Step 1: Build a clean stream, alternating header layouts
    println!("Step 1: Creating 10 records...");
    let mut stream = Vec::new();
    let mut starts = Vec::new();

    for i in 1..=10 {
        let payload = format!("Velocity profile from ensemble {}", i);
        let mut builder = RecordBuilder::new(0x15).payload(Bytes::from(payload));
        if i % 3 == 0 {
            builder = builder.long_header();
        }
        starts.push(stream.len());
        stream.extend_from_slice(&builder.build()?);
    }

    let original_size = stream.len();
    println!("Created clean stream: {} bytes\n", original_size);

    // Step 2: Simulate damage
    println!("Step 2: Simulating damage...");

    // Garbage in front, as when a recording starts mid-record
    let mut damaged = vec![0x3C, 0x00, 0x7E, 0x10];

    // Flip bits inside the payload of record 4
    let hit = starts[3] + 20;
    stream[hit] ^= 0x5A;
    println!("Flipped bits at byte {}", hit);

    // Cut the last record short
    stream.truncate(original_size - 5);
    println!("Dropped the last 5 bytes");

    damaged.extend_from_slice(&stream);
    println!("Damaged stream: {} bytes\n", damaged.len());

    // Step 3: Scan and recover
    println!("Step 3: Scanning damaged stream...");
    let result = scan_bytes(&damaged, &ScanOptions::default())?;

    println!("Scan Results:");
    println!("  Stream length:       {}", result.stream_len);
    println!("  Records indexed:     {}", result.len());
    println!("  Checksum failures:   {}", result.checksum_failures);
    println!("  Resyncs:             {}", result.resyncs);
    println!("  Bytes skipped:       {}", result.bytes_skipped);
    println!("  Early end of stream: {}", result.early_eof);
    println!("  12-byte headers:     {}\n", result.used_12_byte_header);

    println!("Recovered records:");
    for entry in &result.records {
        let end = entry.offset as usize + entry.length as usize;
        let text = String::from_utf8_lossy(&damaged[entry.offset as usize..end]);
        println!("  @{:>5} {:>3} bytes  {}: {}", entry.offset, entry.length, entry.kind(), text);
    }

    println!(
        "\nRecovered {}/{} records despite damage",
        result.len(),
        10
    );

    Ok(())
}
