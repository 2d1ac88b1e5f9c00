//! Forward search for the next plausible header after a bad record
//!
//! A candidate is accepted when a sync byte is followed by a valid header-size
//! byte (10 or 12), any id byte, and the family byte of the last parsed
//! header. This 4-byte test can be fooled by payload data that happens to
//! match; the scanner's checksums catch most such false starts.

use crate::constants::HEADER_PROBE_LEN;
use crate::error::ScanError;
use crate::header::HeaderLayout;
use crate::stream::ByteStream;
use std::io::{Read, Seek};

#[cfg(feature = "logging")]
use tracing::warn;

/// Result of a resynchronization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncOutcome {
    /// A plausible header starts at `offset`; the stream is positioned there
    Found {
        /// Offset of the candidate sync byte
        offset: u64,
        /// Bytes passed over to get there
        skipped: u64,
    },
    /// The stream ended before a plausible header was found
    EndOfStream {
        /// Bytes passed over before the end
        skipped: u64,
    },
}

/// Search forward from the current cursor for a header of `family`
///
/// The search only moves forward, one candidate position at a time, so it
/// always terminates at the end of the stream.
pub fn resynchronize<R: Read + Seek>(
    stream: &mut ByteStream<R>,
    family: u8,
) -> Result<ResyncOutcome, ScanError> {
    let start = stream.position();

    loop {
        let candidate = match stream.skip_to_sync()? {
            Some(offset) => offset,
            None => {
                #[cfg(feature = "logging")]
                warn!(
                    "reached end of stream at offset {} while searching for a sync byte",
                    stream.position()
                );
                return Ok(ResyncOutcome::EndOfStream {
                    skipped: stream.position() - start,
                });
            }
        };

        let mut probe = [0u8; HEADER_PROBE_LEN];
        let got = stream.read_up_to(&mut probe)?;
        if got < HEADER_PROBE_LEN {
            #[cfg(feature = "logging")]
            warn!(
                "reached end of stream at offset {} while probing a candidate header",
                stream.position()
            );
            return Ok(ResyncOutcome::EndOfStream {
                skipped: stream.position() - start,
            });
        }

        let size_ok = HeaderLayout::from_size_byte(probe[1]).is_some();
        if size_ok && probe[3] == family {
            stream.rewind(got as u64)?;
            stream.verify_position()?;

            #[cfg(feature = "logging")]
            warn!(
                "skipped forward to a possible header at offset {} ({:.4}% through stream)",
                candidate,
                stream.percent()
            );

            return Ok(ResyncOutcome::Found {
                offset: candidate,
                skipped: candidate - start,
            });
        }

        // coincidental sync byte: resume one past it
        stream.rewind(got as u64 - 1)?;
    }
}
