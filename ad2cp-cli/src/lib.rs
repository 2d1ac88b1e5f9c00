//! Library entry for ad2cp-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

/// Record layout choice for the synth command
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum HeaderChoice {
    /// 10-byte headers only
    Short,
    /// 12-byte headers only
    Long,
    /// Alternate 10- and 12-byte headers
    Mixed,
}
