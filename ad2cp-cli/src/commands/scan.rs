use ad2cp_core::constants::RecordKind;
use ad2cp_core::{scan, ScanOptions, ScanResult};
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use tracing::info;

pub fn execute(
    input: &str,
    output: Option<&str>,
    options: &ScanOptions,
    summary_only: bool,
) -> Result<ScanResult> {
    info!("Scanning file: {}", input);

    let result = scan(input, options).with_context(|| format!("Failed to scan {}", input))?;

    info!("File size: {} bytes", result.stream_len);

    print_summary(&result);

    if summary_only {
        return Ok(result);
    }

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&result)
            .with_context(|| "Failed to serialize scan result")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("Index written to: {}", output_path);
    } else {
        println!("=== Records ===");
        for (i, record) in result.records.iter().enumerate() {
            println!(
                "{:>6}  offset {:>10}  length {:>8}  {}",
                i + 1,
                record.offset,
                record.length,
                record.kind()
            );
        }
    }

    Ok(result)
}

fn print_summary(result: &ScanResult) {
    println!("\n=== Scan Results ===");
    println!("Bytes scanned:       {} bytes", result.stream_len);
    println!("Records indexed:     {}", result.len().to_string().green());
    if result.checksum_failures > 0 {
        println!(
            "Checksum failures:   {} (header {}, data {})",
            result.checksum_failures.to_string().red(),
            result.header_checksum_failures,
            result.payload_checksum_failures
        );
    } else {
        println!("Checksum failures:   0");
    }
    println!("Resyncs:             {}", result.resyncs);
    println!("Bytes skipped:       {} bytes", result.bytes_skipped);
    if result.early_eof {
        println!("Early end of file:   {}", "yes".yellow());
    } else {
        println!("Early end of file:   no");
    }
    println!("12-byte headers:     {}", if result.used_12_byte_header { "yes" } else { "no" });
    if result.unknown_ids > 0 {
        println!("Undocumented ids:    {}", result.unknown_ids.to_string().yellow());
    }

    let counts = result.id_counts();
    if !counts.is_empty() {
        println!("\n=== Record Kinds ===");
        for (id, count) in counts {
            println!("{:>8}  {}", count, RecordKind::from_id(id));
        }
    }
    println!();
}
