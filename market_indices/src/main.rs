//! Index-Futures Fetcher — pulls the financial-futures board from the REST
//! data service: the latest per-root summary (main contract, far month,
//! continuous legs) or a continuous-leg history over a date span.
//!
//! Usage example (CLI):
//! ```bash
//! market_indices --mode latest
//! market_indices --mode range --start 20230101 --end 20240830
//! ```
//!
//! The account token comes from `TUSHARE_TOKEN` (environment or
//! `.env`/`.env.local`). Fatal failures print `{"error": ...}` on stdout
//! and exit with a class-specific code: 1 service unavailable, 2 missing
//! token, 4 query failure.
#![warn(missing_docs)]
mod args;
mod dataservice;
mod frame;
mod latest;
mod range;

use crate::args::{Args, Mode};
use crate::dataservice::DataServiceClient;
use chrono::Local;
use clap::Parser;
use log::error;
use market_common::Result;
use market_common::config::Config;
use serde_json::json;

fn main() {
    init_logger();
    let args = Args::parse();
    let config = Config::from_env();
    if let Err(e) = run(&args, &config) {
        error!("{}", e);
        // stdout is the machine-readable channel consumed by the dashboard.
        println!("{}", json!({ "error": e.to_string() }));
        std::process::exit(e.exit_code());
    }
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let token = config.require_data_token()?;
    let client = DataServiceClient::new(&config.data_api_url, token);
    let today = Local::now().date_naive();
    match args.mode {
        Mode::Latest => {
            let document = latest::build_latest(&client, &args.exchange, today);
            print_json(&document)
        }
        Mode::Range => {
            let end = args
                .end
                .clone()
                .unwrap_or_else(|| latest::compact_date(today));
            let document = range::build_range(&client, &args.exchange, &args.start, &end)?;
            print_json(&document)
        }
    }
}

fn print_json<T: serde::Serialize>(document: &T) -> Result<()> {
    println!("{}", serde_json::to_string(document)?);
    Ok(())
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
