//! Fuzzing entry points for ad2cp-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_scan

use ad2cp_core::{scan_bytes, RecordHeader, ScanOptions};

pub fn fuzz_header(data: &[u8]) {
    // Errors are expected; panics are not
    if let Ok(header) = RecordHeader::parse(data, 0) {
        let _ = header.computed_checksum(data);
    }
}

pub fn fuzz_scan(data: &[u8]) {
    let _ = scan_bytes(data, &ScanOptions::default());
    let _ = scan_bytes(data, &ScanOptions::new().ignore_checksums(true));
}
