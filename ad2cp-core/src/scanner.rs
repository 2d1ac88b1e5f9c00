//! Record scanner for AD2CP streams
//!
//! The scanner walks a stream header by header and builds an index of every
//! record whose payload checksum validates. It is driven by an
//! explicit `ScanState` machine:
//!
//! ```text
//! SeekingSync -> ReadHeader -> ValidateHeader -> ReadPayload -> ValidatePayload
//!                    ^                                             |        |
//!                    |                                           Emit    Resync
//!                    +---------------------------------------------+--------+
//! ```
//!
//! Header checksum mismatches are counted and tolerated. Payload checksum
//! mismatches are counted, the record is dropped, and the scanner searches
//! forward for the next plausible header. A stream that ends mid-record stops
//! the scan with `early_eof` set; the records found so far are still returned.

use crate::checksum::checksum;
use crate::constants::{
    is_known_id, RecordKind, FAMILY, INITIAL_INDEX_CAPACITY, INITIAL_PAYLOAD_BUFFER,
    MAX_CHECKSUM_FAILURES, MAX_HEADER_SIZE, SYNC,
};
use crate::error::ScanError;
use crate::header::{HeaderLayout, RecordHeader};
use crate::resync::{resynchronize, ResyncOutcome};
use crate::stream::ByteStream;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

/// Options controlling a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Index (1-based) of the first record to keep. Accepted for
    /// compatibility; the scanner does not skip records.
    pub from: u32,

    /// Stop after this many records; 0 scans the whole stream
    pub to: u32,

    /// Keep every `by`-th record. Accepted for compatibility; the scanner
    /// keeps every record.
    pub by: u32,

    /// Treat every checksum as matching. Checksums are still computed.
    pub ignore_checksums: bool,

    /// Diagnostic verbosity: 1 adds scan-level debug events, 2 adds
    /// per-record trace events. Negative values act as 0.
    pub debug_level: i32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            from: 1,
            to: 0,
            by: 1,
            ignore_checksums: false,
            debug_level: 0,
        }
    }
}

impl ScanOptions {
    /// Default options: whole stream, checksums enforced
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first record index
    pub fn start_at(mut self, from: u32) -> Self {
        self.from = from;
        self
    }

    /// Limit the number of records (0 = no limit)
    pub fn limit(mut self, to: u32) -> Self {
        self.to = to;
        self
    }

    /// Set the record stride
    pub fn step(mut self, by: u32) -> Self {
        self.by = by;
        self
    }

    /// Ignore checksum mismatches
    pub fn ignore_checksums(mut self, ignore: bool) -> Self {
        self.ignore_checksums = ignore;
        self
    }

    /// Set the diagnostic verbosity
    pub fn debug_level(mut self, level: i32) -> Self {
        self.debug_level = level;
        self
    }

    fn debug(&self) -> i32 {
        self.debug_level.max(0)
    }
}

/// One indexed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Offset of the first payload byte (just past the header)
    pub offset: u64,

    /// Payload length in bytes
    pub length: u32,

    /// Record type id
    pub id: u8,
}

impl RecordEntry {
    /// Kind named by the id byte
    pub fn kind(&self) -> RecordKind {
        RecordKind::from_id(self.id)
    }

    /// Whether the id is one of the documented record ids
    pub fn is_known(&self) -> bool {
        is_known_id(self.id)
    }
}

/// Index and statistics produced by a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Records in stream order
    pub records: Vec<RecordEntry>,

    /// Header and payload checksum mismatches combined
    pub checksum_failures: u32,

    /// The stream ended inside a record or during resynchronization
    pub early_eof: bool,

    /// At least one 12-byte header was seen
    pub used_12_byte_header: bool,

    /// Header checksum mismatches (tolerated)
    pub header_checksum_failures: u32,

    /// Payload checksum mismatches (each dropped a record)
    pub payload_checksum_failures: u32,

    /// Successful resynchronizations
    pub resyncs: u32,

    /// Records indexed with an undocumented id
    pub unknown_ids: u32,

    /// Bytes passed over before the first header and during resyncs
    pub bytes_skipped: u64,

    /// Length of the scanned stream
    pub stream_len: u64,
}

impl ScanResult {
    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were indexed
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Payload offsets in stream order
    pub fn offsets(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.offset).collect()
    }

    /// Payload lengths in stream order
    pub fn lengths(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.length).collect()
    }

    /// Record ids in stream order
    pub fn ids(&self) -> Vec<u8> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Number of records per id
    pub fn id_counts(&self) -> BTreeMap<u8, usize> {
        let mut counts = BTreeMap::new();
        for r in &self.records {
            *counts.entry(r.id).or_insert(0) += 1;
        }
        counts
    }
}

/// State of the scan loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Skip leading bytes up to the first sync byte (start of stream only)
    SeekingSync,
    /// Read a header window at the cursor
    ReadHeader,
    /// Compare the stated header checksum with the computed one
    ValidateHeader {
        header: RecordHeader,
        window: [u8; MAX_HEADER_SIZE],
    },
    /// Read the payload into the reusable buffer
    ReadPayload { header: RecordHeader },
    /// Compare the stated payload checksum with the computed one
    ValidatePayload { header: RecordHeader, offset: u64 },
    /// Append the record to the index
    Emit { header: RecordHeader, offset: u64 },
    /// Search forward for the next header of `family`
    Resync { family: u8 },
    /// Finished
    Done,
}

/// Stateful scanner over one stream
pub struct Scanner<R> {
    stream: ByteStream<R>,
    options: ScanOptions,
    payload: Vec<u8>,
    result: ScanResult,
    foreign_family_seen: bool,
}

impl<R: Read + Seek> Scanner<R> {
    /// Create a scanner over `reader`, positioned at its start
    pub fn new(reader: R, options: ScanOptions) -> Result<Self, ScanError> {
        let stream = ByteStream::new(reader)?;
        let result = ScanResult {
            records: Vec::with_capacity(INITIAL_INDEX_CAPACITY),
            stream_len: stream.len(),
            ..Default::default()
        };
        Ok(Self {
            stream,
            options,
            payload: vec![0u8; INITIAL_PAYLOAD_BUFFER],
            result,
            foreign_family_seen: false,
        })
    }

    /// Run the scan to completion
    pub fn run(mut self) -> Result<ScanResult, ScanError> {
        #[cfg(feature = "logging")]
        if self.options.debug() > 0 {
            debug!(
                "scanning {} bytes (from={}, to={}, by={}, ignore_checksums={})",
                self.stream.len(),
                self.options.from,
                self.options.to,
                self.options.by,
                self.options.ignore_checksums
            );
        }

        let mut state = ScanState::SeekingSync;
        while state != ScanState::Done {
            state = self.step(state)?;
        }
        self.stream.verify_position()?;

        #[cfg(feature = "logging")]
        if self.options.debug() > 0 {
            debug!(
                "scan complete: {} records, {} checksum failures, early_eof={}",
                self.result.records.len(),
                self.result.checksum_failures,
                self.result.early_eof
            );
        }

        Ok(self.result)
    }

    fn step(&mut self, state: ScanState) -> Result<ScanState, ScanError> {
        match state {
            ScanState::SeekingSync => self.seek_first_sync(),
            ScanState::ReadHeader => self.read_header(),
            ScanState::ValidateHeader { header, window } => {
                self.validate_header(&header, &window)
            }
            ScanState::ReadPayload { header } => self.read_payload(header),
            ScanState::ValidatePayload { header, offset } => {
                self.validate_payload(header, offset)
            }
            ScanState::Emit { header, offset } => Ok(self.emit(&header, offset)),
            ScanState::Resync { family } => self.resync(family),
            ScanState::Done => Ok(ScanState::Done),
        }
    }

    fn seek_first_sync(&mut self) -> Result<ScanState, ScanError> {
        match self.stream.skip_to_sync()? {
            None => Err(ScanError::NoSync(SYNC)),
            Some(offset) => {
                self.result.bytes_skipped += offset;

                #[cfg(feature = "logging")]
                if offset > 0 {
                    debug!("skipped {} leading bytes before the first sync byte", offset);
                }

                Ok(ScanState::ReadHeader)
            }
        }
    }

    fn read_header(&mut self) -> Result<ScanState, ScanError> {
        if self.stream.is_at_end() {
            return Ok(ScanState::Done);
        }

        let start = self.stream.position();
        let mut window = [0u8; MAX_HEADER_SIZE];
        let got = self.stream.read_up_to(&mut window)?;

        let header = match RecordHeader::parse(&window[..got], start) {
            Ok(header) => header,
            Err(ScanError::IncompleteHeader { expected, actual, .. }) => {
                #[cfg(feature = "logging")]
                warn!(
                    "end of stream inside header at offset {} ({} of {} bytes)",
                    start, actual, expected
                );
                #[cfg(not(feature = "logging"))]
                let _ = (expected, actual);

                self.result.early_eof = true;
                return Ok(ScanState::Done);
            }
            Err(e) => return Err(e),
        };

        // give back what the short layout did not need
        self.stream.rewind((got - usize::from(header.header_size)) as u64)?;

        if header.layout() == HeaderLayout::Long {
            self.result.used_12_byte_header = true;
        }

        if header.family != FAMILY && !self.foreign_family_seen {
            self.foreign_family_seen = true;
            #[cfg(feature = "logging")]
            warn!(
                "header at offset {} has family 0x{:02x}, expected 0x{:02x}",
                start, header.family, FAMILY
            );
        }

        #[cfg(feature = "logging")]
        if self.options.debug() > 1 {
            trace!(
                "record {} at offset {} ({:.5}% through stream): {} header_size={} family=0x{:02x} data_size={} data_checksum=0x{:04x} header_checksum=0x{:04x}",
                self.result.records.len() + 1,
                start,
                100.0 * start as f64 / self.stream.len().max(1) as f64,
                header.kind(),
                header.header_size,
                header.family,
                header.data_size,
                header.data_checksum,
                header.header_checksum
            );
        }

        Ok(ScanState::ValidateHeader { header, window })
    }

    /// Count one checksum mismatch; past the cap the scan is abandoned
    fn count_checksum_failure(&mut self) -> Result<(), ScanError> {
        self.result.checksum_failures += 1;
        if self.result.checksum_failures > MAX_CHECKSUM_FAILURES {
            return Err(ScanError::TooManyChecksumFailures {
                limit: MAX_CHECKSUM_FAILURES,
                offset: self.stream.position(),
            });
        }
        Ok(())
    }

    fn validate_header(
        &mut self,
        header: &RecordHeader,
        window: &[u8],
    ) -> Result<ScanState, ScanError> {
        let computed = header.computed_checksum(window);
        let matched = self.options.ignore_checksums || computed == header.header_checksum;

        #[cfg(feature = "logging")]
        if matched && self.options.debug() > 1 {
            trace!(
                "header checksum 0x{:04x} accepted (stated 0x{:04x})",
                computed,
                header.header_checksum
            );
        }

        if !matched {
            self.result.header_checksum_failures += 1;

            #[cfg(feature = "logging")]
            warn!(
                "header checksum 0x{:04x} disagrees with stated 0x{:04x} at offset {}; continuing with header as read",
                computed,
                header.header_checksum,
                self.stream.position() - u64::from(header.header_size)
            );

            self.count_checksum_failure()?;
        }

        Ok(ScanState::ReadPayload { header: *header })
    }

    fn read_payload(&mut self, header: RecordHeader) -> Result<ScanState, ScanError> {
        let offset = self.stream.position();
        let len = header.data_size as usize;

        if u64::from(header.data_size) > self.stream.remaining() {
            #[cfg(feature = "logging")]
            warn!(
                "end of stream before end of record {} at offset {} ({} of {} payload bytes present)",
                self.result.records.len() + 1,
                offset - u64::from(header.header_size),
                self.stream.remaining(),
                header.data_size
            );
            self.result.early_eof = true;
            return Ok(ScanState::Done);
        }

        if len > self.payload.len() {
            #[cfg(feature = "logging")]
            if self.options.debug() > 0 {
                debug!(
                    "growing payload buffer from {} to {} bytes at offset {} ({:.4}%)",
                    self.payload.len(),
                    len,
                    offset,
                    self.stream.percent()
                );
            }
            self.stream.verify_position()?;
            self.payload.resize(len, 0);
        }

        let got = self.stream.read_up_to(&mut self.payload[..len])?;
        if got != len {
            #[cfg(feature = "logging")]
            warn!(
                "end of stream before end of record {} at offset {}",
                self.result.records.len() + 1,
                offset - u64::from(header.header_size)
            );
            self.result.early_eof = true;
            return Ok(ScanState::Done);
        }

        Ok(ScanState::ValidatePayload { header, offset })
    }

    fn validate_payload(
        &mut self,
        header: RecordHeader,
        offset: u64,
    ) -> Result<ScanState, ScanError> {
        let computed = checksum(&self.payload[..header.data_size as usize]);

        if self.options.ignore_checksums || computed == header.data_checksum {
            #[cfg(feature = "logging")]
            if self.options.debug() > 1 {
                trace!(
                    "data checksum 0x{:04x} accepted (stated 0x{:04x})",
                    computed,
                    header.data_checksum
                );
            }
            return Ok(ScanState::Emit { header, offset });
        }

        self.result.payload_checksum_failures += 1;

        #[cfg(feature = "logging")]
        warn!(
            "data checksum 0x{:04x} disagrees with stated 0x{:04x} for record at offset {}; resynchronizing",
            computed, header.data_checksum, offset
        );

        self.count_checksum_failure()?;

        Ok(ScanState::Resync {
            family: header.family,
        })
    }

    fn resync(&mut self, family: u8) -> Result<ScanState, ScanError> {
        match resynchronize(&mut self.stream, family)? {
            ResyncOutcome::Found { skipped, .. } => {
                self.result.resyncs += 1;
                self.result.bytes_skipped += skipped;
                Ok(ScanState::ReadHeader)
            }
            ResyncOutcome::EndOfStream { skipped } => {
                self.result.bytes_skipped += skipped;
                self.result.early_eof = true;
                Ok(ScanState::Done)
            }
        }
    }

    fn emit(&mut self, header: &RecordHeader, offset: u64) -> ScanState {
        if !header.is_known() {
            self.result.unknown_ids += 1;

            #[cfg(feature = "logging")]
            warn!(
                "indexing undocumented record id 0x{:02x} at offset {}",
                header.id, offset
            );
        }

        self.result.records.push(RecordEntry {
            offset,
            length: header.data_size,
            id: header.id,
        });

        let limit = self.options.to as usize;
        if (limit > 0 && self.result.records.len() >= limit) || self.stream.is_at_end() {
            ScanState::Done
        } else {
            ScanState::ReadHeader
        }
    }
}

/// Scan the file at `path`
pub fn scan(path: impl AsRef<Path>, options: &ScanOptions) -> Result<ScanResult, ScanError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ScanError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    scan_reader(file, options)
}

/// Scan any seekable reader from its start
pub fn scan_reader<R: Read + Seek>(
    reader: R,
    options: &ScanOptions,
) -> Result<ScanResult, ScanError> {
    Scanner::new(reader, options.clone())?.run()
}

/// Scan an in-memory stream
pub fn scan_bytes(data: &[u8], options: &ScanOptions) -> Result<ScanResult, ScanError> {
    scan_reader(Cursor::new(data), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::RecordBuilder;
    use bytes::Bytes;

    fn record(id: u8, payload: &'static [u8]) -> Bytes {
        RecordBuilder::new(id)
            .payload(Bytes::from_static(payload))
            .build()
            .unwrap()
    }

    #[test]
    fn test_scan_clean_stream() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&record(0x15, b"burst"));
        stream.extend_from_slice(&record(0x16, b"average!"));
        stream.extend_from_slice(&record(0xA0, b"$GPGGA"));

        let result = scan_bytes(&stream, &ScanOptions::default()).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.offsets(), vec![10, 25, 43]);
        assert_eq!(result.lengths(), vec![5, 8, 6]);
        assert_eq!(result.ids(), vec![0x15, 0x16, 0xA0]);
        assert_eq!(result.checksum_failures, 0);
        assert!(!result.early_eof);
        assert!(!result.used_12_byte_header);
        assert_eq!(result.stream_len, stream.len() as u64);
    }

    #[test]
    fn test_limit_stops_early() {
        let mut stream = Vec::new();
        for _ in 0..5 {
            stream.extend_from_slice(&record(0x16, b"data"));
        }
        let result = scan_bytes(&stream, &ScanOptions::new().limit(2)).unwrap();
        assert_eq!(result.len(), 2);
        assert!(!result.early_eof);
    }

    #[test]
    fn test_from_and_by_are_not_applied() {
        let mut stream = Vec::new();
        for _ in 0..4 {
            stream.extend_from_slice(&record(0x16, b"data"));
        }
        let options = ScanOptions::new().start_at(3).step(2);
        let result = scan_bytes(&stream, &options).unwrap();
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_empty_stream_has_no_sync() {
        assert_eq!(
            scan_bytes(&[], &ScanOptions::default()),
            Err(ScanError::NoSync(SYNC))
        );
        assert_eq!(
            scan_bytes(&[0x00; 64], &ScanOptions::default()),
            Err(ScanError::NoSync(SYNC))
        );
    }

    #[test]
    fn test_bad_header_size_is_fatal() {
        let mut stream = record(0x16, b"data").to_vec();
        stream.extend_from_slice(&[SYNC, 11, 0x16, FAMILY, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            scan_bytes(&stream, &ScanOptions::default()),
            Err(ScanError::BadHeaderSize { offset: 14, size: 11 })
        );
    }

    #[test]
    fn test_missing_sync_between_records_is_fatal() {
        let mut stream = record(0x16, b"data").to_vec();
        stream.push(0x00);
        stream.extend_from_slice(&record(0x16, b"data"));
        assert_eq!(
            scan_bytes(&stream, &ScanOptions::default()),
            Err(ScanError::BadSync { offset: 14, found: 0x00 })
        );
    }

    #[test]
    fn test_truncated_header_sets_early_eof() {
        let mut stream = record(0x16, b"data").to_vec();
        stream.extend_from_slice(&[SYNC, 12, 0x16, FAMILY, 0x04]);
        let result = scan_bytes(&stream, &ScanOptions::default()).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result.early_eof);
    }

    #[test]
    fn test_header_checksum_failure_is_tolerated() {
        let mut bad = record(0x16, b"data").to_vec();
        bad[8] ^= 0xFF;
        let mut stream = bad;
        stream.extend_from_slice(&record(0x17, b"next"));

        let result = scan_bytes(&stream, &ScanOptions::default()).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.checksum_failures, 1);
        assert_eq!(result.header_checksum_failures, 1);
        assert_eq!(result.resyncs, 0);
    }

    #[test]
    fn test_unknown_id_is_indexed() {
        let stream = record(0x42, b"mystery");
        let result = scan_bytes(&stream, &ScanOptions::default()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.unknown_ids, 1);
        assert!(!result.records[0].is_known());
        assert_eq!(result.records[0].kind(), RecordKind::Unknown(0x42));
    }

    #[test]
    fn test_payload_buffer_grows() {
        let big = vec![0x5Au8; INITIAL_PAYLOAD_BUFFER * 3];
        let stream = RecordBuilder::new(0x15)
            .long_header()
            .payload(Bytes::from(big))
            .build()
            .unwrap();
        let result = scan_bytes(&stream, &ScanOptions::default()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.records[0].length as usize, INITIAL_PAYLOAD_BUFFER * 3);
        assert!(result.used_12_byte_header);
    }

    #[test]
    fn test_id_counts() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&record(0x15, b"a"));
        stream.extend_from_slice(&record(0x16, b"b"));
        stream.extend_from_slice(&record(0x15, b"c"));
        let result = scan_bytes(&stream, &ScanOptions::default()).unwrap();
        let counts = result.id_counts();
        assert_eq!(counts.get(&0x15), Some(&2));
        assert_eq!(counts.get(&0x16), Some(&1));
    }

    #[test]
    fn test_negative_debug_level_acts_as_zero() {
        let options = ScanOptions::new().debug_level(-3);
        assert_eq!(options.debug_level, -3);
        assert_eq!(options.debug(), 0);
        assert_eq!(ScanOptions::new().debug_level(2).debug(), 2);
    }
}
