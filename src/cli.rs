//! Command line interface for the `recordframe` replay binary.
//!
//! The binary replays a captured record stream from a file or standard input
//! and reports progress as it goes.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `recordframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "recordframe",
    version,
    about = "Replay a chunked JSON progress stream and report progress"
)]
pub struct Cli {
    /// File to read the stream from. Reads standard input when omitted.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Outcome code counted as a success.
    #[arg(long, default_value_t = 200)]
    pub success_code: u16,

    /// Keep only the most recent N records in history.
    #[arg(long, value_name = "N")]
    pub history_limit: Option<usize>,

    /// Largest incomplete record buffered before it is discarded.
    #[arg(long, value_name = "BYTES")]
    pub max_pending_bytes: Option<usize>,

    /// Fail if the input produces no data for this many seconds.
    #[arg(long, value_name = "SECS")]
    pub idle_timeout_secs: Option<u64>,

    /// Write the retained history to this path: CSV for a `.csv` extension,
    /// JSON Lines otherwise.
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}
