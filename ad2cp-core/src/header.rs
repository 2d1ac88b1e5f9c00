//! Record header layouts and parsing
//!
//! ```text
//! offset  short (10)        long (12)
//! 0       sync 0xA5         sync 0xA5
//! 1       header size 10    header size 12
//! 2       id                id
//! 3       family            family
//! 4       data size u16 LE  data size u32 LE
//! 6 / 8   data checksum     data checksum
//! 8 / 10  header checksum   header checksum
//! ```

use crate::checksum::checksum;
use crate::constants::{is_known_id, RecordKind, LONG_HEADER_SIZE, SHORT_HEADER_SIZE, SYNC};
use crate::error::ScanError;
use serde::{Deserialize, Serialize};

/// Which of the two header layouts a record uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderLayout {
    /// 10-byte header, 2-byte data size
    Short,
    /// 12-byte header, 4-byte data size
    Long,
}

impl HeaderLayout {
    /// Layout selected by a header-size byte, if it is a valid one
    pub const fn from_size_byte(size: u8) -> Option<Self> {
        match size as usize {
            SHORT_HEADER_SIZE => Some(HeaderLayout::Short),
            LONG_HEADER_SIZE => Some(HeaderLayout::Long),
            _ => None,
        }
    }

    /// Header length in bytes
    pub const fn size(&self) -> usize {
        match self {
            HeaderLayout::Short => SHORT_HEADER_SIZE,
            HeaderLayout::Long => LONG_HEADER_SIZE,
        }
    }

    /// Width of the data-size field
    pub const fn data_size_width(&self) -> usize {
        match self {
            HeaderLayout::Short => 2,
            HeaderLayout::Long => 4,
        }
    }

    const fn data_checksum_offset(&self) -> usize {
        4 + self.data_size_width()
    }

    const fn header_checksum_offset(&self) -> usize {
        self.size() - 2
    }
}

/// A decoded record header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Sync byte (always [`SYNC`] once parsed)
    pub sync: u8,

    /// Header length, 10 or 12
    pub header_size: u8,

    /// Record type id
    pub id: u8,

    /// Instrument family
    pub family: u8,

    /// Payload length in bytes
    pub data_size: u32,

    /// Stated checksum of the payload
    pub data_checksum: u16,

    /// Stated checksum of the header bytes before this field
    pub header_checksum: u16,
}

impl RecordHeader {
    /// Parse a header from the start of `window`
    ///
    /// `window` may be longer than the header (the scanner always reads
    /// [`MAX_HEADER_SIZE`](crate::constants::MAX_HEADER_SIZE) bytes); the
    /// extra bytes are ignored. `offset` is only used for error reporting.
    pub fn parse(window: &[u8], offset: u64) -> Result<Self, ScanError> {
        let sync = match window.first() {
            Some(&b) => b,
            None => {
                return Err(ScanError::IncompleteHeader {
                    offset,
                    expected: SHORT_HEADER_SIZE,
                    actual: 0,
                })
            }
        };
        if sync != SYNC {
            return Err(ScanError::BadSync { offset, found: sync });
        }

        let header_size = match window.get(1) {
            Some(&b) => b,
            None => {
                return Err(ScanError::IncompleteHeader {
                    offset,
                    expected: SHORT_HEADER_SIZE,
                    actual: window.len(),
                })
            }
        };
        let layout = HeaderLayout::from_size_byte(header_size)
            .ok_or(ScanError::BadHeaderSize { offset, size: header_size })?;

        if window.len() < layout.size() {
            return Err(ScanError::IncompleteHeader {
                offset,
                expected: layout.size(),
                actual: window.len(),
            });
        }

        let data_size = match layout {
            HeaderLayout::Short => u32::from(u16::from_le_bytes([window[4], window[5]])),
            HeaderLayout::Long => {
                u32::from_le_bytes([window[4], window[5], window[6], window[7]])
            }
        };
        let dcs = layout.data_checksum_offset();
        let hcs = layout.header_checksum_offset();

        Ok(Self {
            sync,
            header_size,
            id: window[2],
            family: window[3],
            data_size,
            data_checksum: u16::from_le_bytes([window[dcs], window[dcs + 1]]),
            header_checksum: u16::from_le_bytes([window[hcs], window[hcs + 1]]),
        })
    }

    /// The layout this header was parsed with
    pub fn layout(&self) -> HeaderLayout {
        if self.header_size as usize == LONG_HEADER_SIZE {
            HeaderLayout::Long
        } else {
            HeaderLayout::Short
        }
    }

    /// Header plus payload length
    pub fn record_size(&self) -> u64 {
        u64::from(self.header_size) + u64::from(self.data_size)
    }

    /// Checksum computed over the header bytes preceding the header checksum
    ///
    /// `window` must be the bytes this header was parsed from.
    pub fn computed_checksum(&self, window: &[u8]) -> u16 {
        checksum(&window[..self.layout().header_checksum_offset()])
    }

    /// Kind named by the id byte
    pub fn kind(&self) -> RecordKind {
        RecordKind::from_id(self.id)
    }

    /// Whether the id is one of the documented record ids
    pub fn is_known(&self) -> bool {
        is_known_id(self.id)
    }
}
