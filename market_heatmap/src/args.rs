//! Command-line arguments for the heatmap fetcher.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::{Parser, ValueEnum};

/// Fetch mode against the quote vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Sector-grouped traded-amount heatmap written to the data file.
    Heatmap,
    /// Flat per-code records printed to stdout.
    Snapshot,
    /// Spot index closes keyed by futures alias.
    SpotClose,
    /// Daily spot close series per alias over a date range.
    SpotSeries,
}

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Fetch mode.
    #[clap(long, value_enum, default_value = "heatmap")]
    pub mode: Mode,

    /// Trade date (YYYY-MM-DD). Defaults to the environment override, then today.
    #[clap(long)]
    pub trade_date: Option<String>,

    /// Series start date (YYYY-MM-DD), spot-series mode only.
    #[clap(long)]
    pub start: Option<String>,

    /// Series end date (YYYY-MM-DD), spot-series mode only.
    #[clap(long)]
    pub end: Option<String>,

    /// Path to a text file with instrument codes to fetch instead of the
    /// built-in commodity board.
    /// Codes may be separated by commas, spaces, or new lines.
    #[clap(long)]
    pub codes_path: Option<String>,

    /// Output file for heatmap mode.
    #[clap(long, default_value = "data/commodity_amount_heatmap.json")]
    pub out: String,

    /// Print the full document to stdout instead of writing the output file.
    #[clap(long)]
    pub stdout: bool,
}
