//! # AD2CP Core
//!
//! Record locator for Nortek AD2CP binary streams: finds every record header,
//! validates checksums, and recovers from corruption by resynchronizing on the
//! next plausible header.
//!
//! ## Modules
//!
//! - `constants`: Wire-format constants and record kinds
//! - `checksum`: The 16-bit AD2CP checksum
//! - `header`: Record header layouts and parsing
//! - `stream`: Cursor-tracking byte stream
//! - `resync`: Forward search for the next header after corruption
//! - `scanner`: The record-indexing state machine
//! - `encoder`: Record building (synthetic streams, tests)

#![warn(missing_docs)]

pub mod checksum;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod header;
pub mod resync;
pub mod scanner;
pub mod stream;

// Re-export commonly used types
pub use checksum::checksum;
pub use error::ScanError;
pub use header::{HeaderLayout, RecordHeader};
pub use scanner::{scan, scan_bytes, scan_reader, RecordEntry, ScanOptions, ScanResult};

/// Result type alias for AD2CP operations
pub type Result<T> = core::result::Result<T, ScanError>;
