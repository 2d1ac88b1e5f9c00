//! Cursor-tracking byte stream
//!
//! [`ByteStream`] owns the scan cursor. Every read and rewind goes through it,
//! so the cursor always equals the position of the wrapped reader;
//! [`ByteStream::verify_position`] cross-checks that.

use crate::constants::SYNC;
use crate::error::ScanError;
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// A buffered, seekable stream with an explicit cursor
pub struct ByteStream<R> {
    inner: BufReader<R>,
    cursor: u64,
    len: u64,
}

impl<R: Read + Seek> ByteStream<R> {
    /// Wrap `reader`, measuring its length and rewinding it to the start
    pub fn new(mut reader: R) -> Result<Self, ScanError> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner: BufReader::with_capacity(READ_BUFFER_SIZE, reader),
            cursor: 0,
            len,
        })
    }

    /// Current cursor
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Total stream length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the stream has no bytes at all
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes between the cursor and the end of the stream
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.cursor)
    }

    /// Whether the cursor is at (or past) the end
    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.len
    }

    /// How far through the stream the cursor is, in percent
    pub fn percent(&self) -> f64 {
        if self.len == 0 {
            100.0
        } else {
            100.0 * self.cursor as f64 / self.len as f64
        }
    }

    /// Read until `buf` is full or the stream ends; returns the bytes read
    pub fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize, ScanError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.cursor += filled as u64;
        Ok(filled)
    }

    /// Step the cursor back over `n` bytes that were already read
    pub fn rewind(&mut self, n: u64) -> Result<(), ScanError> {
        if n == 0 {
            return Ok(());
        }
        let back = i64::try_from(n).map_err(|_| ScanError::Io(format!("cannot rewind {n} bytes")))?;
        self.inner.seek_relative(-back)?;
        self.cursor -= n;
        Ok(())
    }

    /// Advance to the next sync byte without consuming it
    ///
    /// Returns the sync byte's offset, or `None` if the stream ends first
    /// (the cursor is then at the end).
    pub fn skip_to_sync(&mut self) -> Result<Option<u64>, ScanError> {
        loop {
            let buf = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if buf.is_empty() {
                return Ok(None);
            }
            match memchr::memchr(SYNC, buf) {
                Some(i) => {
                    self.inner.consume(i);
                    self.cursor += i as u64;
                    return Ok(Some(self.cursor));
                }
                None => {
                    let n = buf.len();
                    self.inner.consume(n);
                    self.cursor += n as u64;
                }
            }
        }
    }

    /// Check that the cursor matches the underlying stream position
    pub fn verify_position(&mut self) -> Result<(), ScanError> {
        let actual = self.inner.stream_position()?;
        if actual != self.cursor {
            return Err(ScanError::CursorDesync {
                cursor: self.cursor,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_length_and_reads() {
        let mut s = ByteStream::new(Cursor::new(vec![1u8, 2, 3, 4, 5])).unwrap();
        assert_eq!(s.len(), 5);
        let mut buf = [0u8; 3];
        assert_eq!(s.read_up_to(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(s.position(), 3);
        assert_eq!(s.remaining(), 2);
        assert_eq!(s.read_up_to(&mut buf).unwrap(), 2);
        assert!(s.is_at_end());
        s.verify_position().unwrap();
    }

    #[test]
    fn test_rewind() {
        let mut s = ByteStream::new(Cursor::new(vec![1u8, 2, 3, 4, 5])).unwrap();
        let mut buf = [0u8; 4];
        s.read_up_to(&mut buf).unwrap();
        s.rewind(2).unwrap();
        assert_eq!(s.position(), 2);
        s.verify_position().unwrap();
        let mut one = [0u8; 1];
        s.read_up_to(&mut one).unwrap();
        assert_eq!(one[0], 3);
    }

    #[test]
    fn test_skip_to_sync() {
        let mut s = ByteStream::new(Cursor::new(vec![0u8, 1, 2, SYNC, 4])).unwrap();
        assert_eq!(s.skip_to_sync().unwrap(), Some(3));
        assert_eq!(s.position(), 3);
        s.verify_position().unwrap();
        // the sync byte itself is not consumed
        assert_eq!(s.skip_to_sync().unwrap(), Some(3));
    }

    #[test]
    fn test_skip_to_sync_none() {
        let mut s = ByteStream::new(Cursor::new(vec![0u8; 100])).unwrap();
        assert_eq!(s.skip_to_sync().unwrap(), None);
        assert!(s.is_at_end());
    }
}
