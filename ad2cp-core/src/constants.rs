//! Constants and limits for the AD2CP record format

use serde::{Deserialize, Serialize};

/// Sync byte that starts every record header
pub const SYNC: u8 = 0xA5;

/// Instrument family byte for the AD2CP product line
pub const FAMILY: u8 = 0x10;

/// Seed of the 16-bit checksum accumulator
pub const CHECKSUM_SEED: u16 = 0xB58C;

/// Size of the short header (2-byte data size)
pub const SHORT_HEADER_SIZE: usize = 10;

/// Size of the long header (4-byte data size)
pub const LONG_HEADER_SIZE: usize = 12;

/// Largest header; this many bytes are read speculatively for every header
pub const MAX_HEADER_SIZE: usize = LONG_HEADER_SIZE;

/// Bytes needed to decide whether a sync candidate is plausible:
/// sync + header size + id + family
pub const HEADER_PROBE_LEN: usize = 4;

/// A scan is abandoned once cumulative checksum failures exceed this
pub const MAX_CHECKSUM_FAILURES: u32 = 100;

/// Initial length of the reusable payload buffer
pub const INITIAL_PAYLOAD_BUFFER: usize = 10_000;

/// Initial capacity of the record index
pub const INITIAL_INDEX_CAPACITY: usize = 1024;

/// Record ids documented as valid (0x15-0x18, 0x1A-0x1F, 0xA0)
pub const KNOWN_IDS: [u8; 11] = [21, 22, 23, 24, 26, 27, 28, 29, 30, 31, 160];

/// Whether `id` is one of the documented record ids
pub fn is_known_id(id: u8) -> bool {
    KNOWN_IDS.contains(&id)
}

/// Record type named by the header's id byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    /// 0x15
    Burst,
    /// 0x16
    Average,
    /// 0x17
    BottomTrack,
    /// 0x18, beam 5
    InterleavedBurst,
    /// 0x1A
    BurstAltimeterRaw,
    /// 0x1B
    DvlBottomTrack,
    /// 0x1C
    EchoSounder,
    /// 0x1D
    DvlWaterTrack,
    /// 0x1E
    Altimeter,
    /// 0x1F
    AverageAltimeterRaw,
    /// 0x23
    EchoSounderRaw,
    /// 0x24
    EchoSounderRawTxPulse,
    /// 0xA0, e.g. GPS NMEA text or an FWRITE comment
    String,
    /// Anything else
    Unknown(u8),
}

impl RecordKind {
    /// Classify a header id byte
    pub const fn from_id(id: u8) -> Self {
        match id {
            0x15 => RecordKind::Burst,
            0x16 => RecordKind::Average,
            0x17 => RecordKind::BottomTrack,
            0x18 => RecordKind::InterleavedBurst,
            0x1A => RecordKind::BurstAltimeterRaw,
            0x1B => RecordKind::DvlBottomTrack,
            0x1C => RecordKind::EchoSounder,
            0x1D => RecordKind::DvlWaterTrack,
            0x1E => RecordKind::Altimeter,
            0x1F => RecordKind::AverageAltimeterRaw,
            0x23 => RecordKind::EchoSounderRaw,
            0x24 => RecordKind::EchoSounderRawTxPulse,
            0xA0 => RecordKind::String,
            other => RecordKind::Unknown(other),
        }
    }

    /// The id byte this kind is encoded as
    pub const fn id(&self) -> u8 {
        match self {
            RecordKind::Burst => 0x15,
            RecordKind::Average => 0x16,
            RecordKind::BottomTrack => 0x17,
            RecordKind::InterleavedBurst => 0x18,
            RecordKind::BurstAltimeterRaw => 0x1A,
            RecordKind::DvlBottomTrack => 0x1B,
            RecordKind::EchoSounder => 0x1C,
            RecordKind::DvlWaterTrack => 0x1D,
            RecordKind::Altimeter => 0x1E,
            RecordKind::AverageAltimeterRaw => 0x1F,
            RecordKind::EchoSounderRaw => 0x23,
            RecordKind::EchoSounderRawTxPulse => 0x24,
            RecordKind::String => 0xA0,
            RecordKind::Unknown(id) => *id,
        }
    }

    /// Human-readable description
    pub const fn description(&self) -> &'static str {
        match self {
            RecordKind::Burst => "burst data record",
            RecordKind::Average => "average data record",
            RecordKind::BottomTrack => "bottom-track data record",
            RecordKind::InterleavedBurst => "interleaved burst (beam 5) data record",
            RecordKind::BurstAltimeterRaw => "burst altimeter raw record",
            RecordKind::DvlBottomTrack => "DVL bottom track record",
            RecordKind::EchoSounder => "echo sounder record",
            RecordKind::DvlWaterTrack => "DVL water track record",
            RecordKind::Altimeter => "altimeter record",
            RecordKind::AverageAltimeterRaw => "average altimeter raw record",
            RecordKind::EchoSounderRaw => "echo sounder raw sample data record",
            RecordKind::EchoSounderRawTxPulse => "echo sounder raw synthetic transmit pulse record",
            RecordKind::String => "string data record",
            RecordKind::Unknown(_) => "unrecognized record",
        }
    }
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (0x{:02x})", self.description(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids() {
        for id in [0x15, 0x16, 0x17, 0x18, 0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F, 0xA0] {
            assert!(is_known_id(id), "0x{id:02x} should be known");
        }
        assert!(!is_known_id(0x19));
        assert!(!is_known_id(0x23));
        assert!(!is_known_id(0x00));
    }

    #[test]
    fn test_kind_id_round_trip() {
        for id in 0..=u8::MAX {
            assert_eq!(RecordKind::from_id(id).id(), id);
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RecordKind::from_id(0xA0).to_string(), "string data record (0xa0)");
        assert_eq!(RecordKind::from_id(0x42), RecordKind::Unknown(0x42));
    }
}
