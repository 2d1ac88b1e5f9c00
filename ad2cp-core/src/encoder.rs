//! Record encoding
//!
//! Builds byte-exact AD2CP records. The scanner never writes; this is used to
//! produce synthetic streams for tests, benches and the `synth` command.

use crate::checksum::checksum;
use crate::constants::{FAMILY, SYNC};
use crate::error::ScanError;
use crate::header::HeaderLayout;
use bytes::{BufMut, Bytes, BytesMut};

/// Encode one record with correct checksums and a 10-byte header
pub fn encode_record(id: u8, payload: &[u8]) -> Result<Bytes, ScanError> {
    RecordBuilder::new(id)
        .payload(Bytes::copy_from_slice(payload))
        .build()
}

/// Builder for constructing records with various options
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    id: u8,
    family: u8,
    layout: HeaderLayout,
    payload: Bytes,
    bad_header_checksum: bool,
    bad_data_checksum: bool,
}

impl RecordBuilder {
    /// Create a new record builder for record type `id`
    pub fn new(id: u8) -> Self {
        Self {
            id,
            family: FAMILY,
            layout: HeaderLayout::Short,
            payload: Bytes::new(),
            bad_header_checksum: false,
            bad_data_checksum: false,
        }
    }

    /// Set the payload
    pub fn payload(mut self, payload: Bytes) -> Self {
        self.payload = payload;
        self
    }

    /// Set the instrument family byte
    pub fn family(mut self, family: u8) -> Self {
        self.family = family;
        self
    }

    /// Choose the header layout
    pub fn layout(mut self, layout: HeaderLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Use the 12-byte header
    pub fn long_header(self) -> Self {
        self.layout(HeaderLayout::Long)
    }

    /// Write a header checksum that does not match
    pub fn with_bad_header_checksum(mut self) -> Self {
        self.bad_header_checksum = true;
        self
    }

    /// Write a data checksum that does not match the payload
    pub fn with_bad_data_checksum(mut self) -> Self {
        self.bad_data_checksum = true;
        self
    }

    /// Build the record bytes (header followed by payload)
    pub fn build(self) -> Result<Bytes, ScanError> {
        let len = self.payload.len();
        let max = match self.layout {
            HeaderLayout::Short => u64::from(u16::MAX),
            HeaderLayout::Long => u64::from(u32::MAX),
        };
        if len as u64 > max {
            return Err(ScanError::PayloadTooLarge {
                size: len,
                max,
                header_size: self.layout.size(),
            });
        }

        let mut buf = BytesMut::with_capacity(self.layout.size() + len);
        buf.put_u8(SYNC);
        buf.put_u8(self.layout.size() as u8);
        buf.put_u8(self.id);
        buf.put_u8(self.family);
        match self.layout {
            HeaderLayout::Short => buf.put_u16_le(len as u16),
            HeaderLayout::Long => buf.put_u32_le(len as u32),
        }

        let mut data_checksum = checksum(&self.payload);
        if self.bad_data_checksum {
            data_checksum = !data_checksum;
        }
        buf.put_u16_le(data_checksum);

        let mut header_checksum = checksum(&buf);
        if self.bad_header_checksum {
            header_checksum = !header_checksum;
        }
        buf.put_u16_le(header_checksum);

        buf.put_slice(&self.payload);
        Ok(buf.freeze())
    }
}
