//! Error types for AD2CP scanning

/// Errors raised while scanning or building records
///
/// Recoverable scan conditions (checksum mismatches, unknown record ids, a
/// stream that ends mid-record) are counted in the scan result instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    /// The input file could not be opened
    #[error("cannot open file '{path}': {reason}")]
    Open {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        reason: String,
    },

    /// IO error during read/seek
    #[error("IO error: {0}")]
    Io(String),

    /// The stream does not contain a single sync byte
    #[error("stream does not contain a single 0x{0:02x} sync byte")]
    NoSync(u8),

    /// A header was expected but the byte at `offset` is not the sync marker
    #[error("expected sync byte 0xa5 at offset {offset} but found 0x{found:02x}")]
    BadSync {
        /// Offset of the offending byte.
        offset: u64,
        /// The byte found there.
        found: u8,
    },

    /// Header size byte is neither 10 nor 12
    #[error("impossible header size {size} (should be 10 or 12) at offset {offset}")]
    BadHeaderSize {
        /// Offset of the header start.
        offset: u64,
        /// The header size byte found.
        size: u8,
    },

    /// Stream ended inside a header
    #[error("incomplete header at offset {offset}: expected {expected} bytes, got {actual}")]
    IncompleteHeader {
        /// Offset of the header start.
        offset: u64,
        /// The number of bytes expected.
        expected: usize,
        /// The number of bytes actually found.
        actual: usize,
    },

    /// Too many checksum failures to trust the stream
    #[error("more than {limit} checksum errors (stopped at offset {offset})")]
    TooManyChecksumFailures {
        /// The failure cap that was exceeded.
        limit: u32,
        /// Cursor position when the scan was abandoned.
        offset: u64,
    },

    /// Payload does not fit the data-size field of the chosen header layout
    #[error("payload size {size} exceeds maximum {max} for a {header_size}-byte header")]
    PayloadTooLarge {
        /// Payload length.
        size: usize,
        /// Largest length the layout can express.
        max: u64,
        /// Header size of the layout.
        header_size: usize,
    },

    /// Scan cursor and the underlying stream position disagree
    #[error("cursor {cursor} is out of sync with stream position {actual}")]
    CursorDesync {
        /// Cursor tracked by the scanner.
        cursor: u64,
        /// Position reported by the stream.
        actual: u64,
    },
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Io(err.to_string())
    }
}
