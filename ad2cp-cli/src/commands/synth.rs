use crate::HeaderChoice;
use ad2cp_core::encoder::RecordBuilder;
use anyhow::{Context, Result};
use bytes::Bytes;
use std::fs;
use tracing::info;

/// Record ids cycled through by the synthetic stream
const SYNTH_IDS: [u8; 4] = [0x15, 0x16, 0x17, 0xA0];

/// Write a synthetic stream of `records` records to `output`
///
/// When `corrupt` is `Some(k)`, record `k` (1-based) gets a data checksum that
/// does not match its payload. Returns the number of bytes written.
pub fn execute(
    output: &str,
    records: usize,
    payload_len: usize,
    headers: HeaderChoice,
    corrupt: Option<usize>,
) -> Result<usize> {
    info!("Writing {} synthetic records to {}", records, output);

    let mut data = Vec::new();
    for i in 0..records {
        let payload: Vec<u8> = (0..payload_len).map(|b| (b + i) as u8 & 0x7F).collect();
        let mut builder = RecordBuilder::new(SYNTH_IDS[i % SYNTH_IDS.len()])
            .payload(Bytes::from(payload));

        let long = match headers {
            HeaderChoice::Short => false,
            HeaderChoice::Long => true,
            HeaderChoice::Mixed => i % 2 == 1,
        };
        if long {
            builder = builder.long_header();
        }
        if corrupt == Some(i + 1) {
            builder = builder.with_bad_data_checksum();
        }

        let record = builder
            .build()
            .with_context(|| format!("Failed to build record {}", i + 1))?;
        data.extend_from_slice(&record);
    }

    fs::write(output, &data).with_context(|| format!("Failed to write output file: {}", output))?;

    info!("Wrote {} bytes", data.len());
    Ok(data.len())
}
