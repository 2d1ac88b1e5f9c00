use ad2cp_cli::{commands, HeaderChoice};
use ad2cp_core::ScanOptions;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ad2cp")]
#[command(about = "ad2cp - Index the records of Nortek AD2CP data files", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a file and index its records
    Scan {
        /// Input file to scan
        #[arg(short, long)]
        input: String,

        /// Output JSON file for the index
        #[arg(short, long)]
        output: Option<String>,

        /// First record to keep (accepted, not applied)
        #[arg(long, default_value = "1")]
        from: u32,

        /// Stop after this many records (0 = all)
        #[arg(long, default_value = "0")]
        to: u32,

        /// Record stride (accepted, not applied)
        #[arg(long, default_value = "1")]
        by: u32,

        /// Accept records whatever their checksums
        #[arg(long)]
        ignore_checksums: bool,

        /// Scanner diagnostics: 1 = scan-level, 2 = per record
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        debug_level: i32,

        /// Show the summary only
        #[arg(long)]
        summary_only: bool,
    },

    /// Write a synthetic AD2CP stream
    Synth {
        /// Output file
        #[arg(short, long)]
        output: String,

        /// Number of records
        #[arg(long, default_value = "10")]
        records: usize,

        /// Payload length of every record
        #[arg(long, default_value = "64")]
        payload_len: usize,

        /// Header layout
        #[arg(long, value_enum, default_value = "short")]
        headers: HeaderChoice,

        /// Give record K (1-based) a bad data checksum
        #[arg(long)]
        corrupt: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Scan {
            input,
            output,
            from,
            to,
            by,
            ignore_checksums,
            debug_level,
            summary_only,
        } => {
            let options = ScanOptions::new()
                .start_at(from)
                .limit(to)
                .step(by)
                .ignore_checksums(ignore_checksums)
                .debug_level(debug_level);
            commands::scan::execute(&input, output.as_deref(), &options, summary_only).map(|_| ())
        }

        Commands::Synth {
            output,
            records,
            payload_len,
            headers,
            corrupt,
        } => commands::synth::execute(&output, records, payload_len, headers, corrupt).map(|_| ()),
    }
}
