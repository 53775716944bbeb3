//! Command-line arguments for the index-futures fetcher.
use clap::{Parser, ValueEnum};

/// Fetch mode against the data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Per-root summary of the latest trading day.
    Latest,
    /// Continuous-leg daily history over a date span.
    Range,
}

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Fetch mode.
    #[clap(long, value_enum, default_value = "latest")]
    pub mode: Mode,

    /// Range start date (YYYYMMDD).
    #[clap(long, default_value = "20230101")]
    pub start: String,

    /// Range end date (YYYYMMDD). Defaults to today.
    #[clap(long)]
    pub end: Option<String>,

    /// Futures exchange queried for the board.
    #[clap(long, default_value = "CFFEX")]
    pub exchange: String,
}
