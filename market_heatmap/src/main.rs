//! Commodity Heatmap Fetcher — pulls daily snapshots from the terminal-style
//! quote vendor (through its local HTTP bridge), normalizes the shape-varying
//! payloads into uniform records, resolves traded-amount fallbacks, and
//! groups the board by sector for the dashboard heatmap.
//!
//! Usage example (CLI):
//! ```bash
//! market_heatmap --mode heatmap --trade-date 2024-08-30
//! market_heatmap --mode spot-series --start 2023-01-01 --end 2023-12-31
//! ```
//!
//! Credentials come from `EMQ_USERNAME`/`EMQ_PASSWORD` (environment or
//! `.env`/`.env.local`). Fatal failures print `{"error": ...}` on stdout and
//! exit with a class-specific code: 1 vendor unavailable, 2 missing
//! credentials, 3 login rejected, 4 query failure.
#![warn(missing_docs)]
mod args;
mod bridge;
mod output;

use std::fs::File;
use std::io::BufReader;

use crate::args::{Args, Mode};
use crate::bridge::BridgeSession;
use chrono::{Datelike, Local};
use clap::Parser;
use log::{error, info, warn};
use market_common::Result;
use market_common::codes::{self, CodeParser, InstrumentCode};
use market_common::config::Config;
use market_common::extract::{self, FieldKey};
use market_common::fallback::{self, TierSeries, TierSpec};
use market_common::payload::Shape;
use market_common::record::{self, QuoteRecord};
use market_common::sector;
use market_common::series;
use market_common::session::{QuoteSession, ScopedSession, SessionOptions};
use serde_json::json;

/// Vendor options for daily close series: daily period, no adjustment,
/// natural order, mainland market.
const DAILY_SERIES_OPTIONS: &str = "period=1,adjustflag=1,curtype=1,order=1,market=CNSESH";

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
    let credentials = config.require_quote()?;
    let trade_date = resolve_trade_date(args, config);

    // The snapshot modes force a fresh session; the spot modes reuse an
    // active one if the vendor still holds it.
    let force_login = matches!(args.mode, Mode::Heatmap | Mode::Snapshot);
    let options = SessionOptions::new(credentials, force_login);
    let mut session = ScopedSession::login(BridgeSession::new(&config.bridge_url), &options)?;

    match args.mode {
        Mode::Heatmap => run_heatmap(args, &mut session, &trade_date),
        Mode::Snapshot => run_snapshot(args, &mut session, &trade_date),
        Mode::SpotClose => run_spot_close(&mut session, &trade_date),
        Mode::SpotSeries => run_spot_series(args, &mut session),
    }
}

/// Trade-date precedence: environment override, then CLI, then today.
fn resolve_trade_date(args: &Args, config: &Config) -> String {
    config
        .trade_date
        .clone()
        .or_else(|| args.trade_date.clone())
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string())
}

/// The board to fetch: an explicit codes file, or the built-in commodity board.
fn board_codes(args: &Args) -> Result<Vec<InstrumentCode>> {
    match &args.codes_path {
        Some(path) => {
            let file = File::open(path)?;
            InstrumentCode::parse_from_file(BufReader::new(file))
        }
        None => Ok(codes::parse_list(codes::COMMODITY_BOARD)),
    }
}

/// Fetch the board snapshot and resolve amounts through the fallback chain.
fn fetch_board_records(
    session: &mut ScopedSession<BridgeSession>,
    trade_date: &str,
    board: &[InstrumentCode],
) -> Result<Vec<QuoteRecord>> {
    let code_list = codes::join(board);
    let requested: Vec<String> = board.iter().map(|c| c.as_str().to_string()).collect();
    let query_options = format!("TradeDate={}", trade_date);

    let mut payload = session.snapshot(&code_list, record::SNAPSHOT_FIELDS, &query_options)?;
    payload.status("css")?;
    payload.ensure_codes(&requested);
    let mut records = record::assemble_records(&payload);
    info!("Normalized {} records for {}", records.len(), trade_date);

    let mut amounts: Vec<Option<f64>> = records.iter().map(|r| r.amount).collect();
    fallback::resolve(&mut amounts, &fallback::AMOUNT_TIERS, |spec: &TierSpec<'_>| {
        fetch_tier(session, &code_list, &requested, &query_options, spec)
    });
    for (record, amount) in records.iter_mut().zip(amounts) {
        record.amount = amount;
    }
    Ok(records)
}

/// Run one fallback-tier query. Failures degrade to `None` so a broken
/// alternative field never kills the batch.
fn fetch_tier(
    session: &mut ScopedSession<BridgeSession>,
    code_list: &str,
    requested: &[String],
    query_options: &str,
    spec: &TierSpec<'_>,
) -> Option<TierSeries> {
    let fields = format!("{},{}", spec.first, spec.second);
    match session.snapshot(code_list, &fields, query_options) {
        Ok(mut payload) if payload.error_code == 0 => {
            payload.ensure_codes(requested);
            let shape = Shape::detect(&payload);
            Some(TierSeries {
                first: extract::float_series(&payload, shape, FieldKey::new(spec.first, 0)),
                second: extract::float_series(&payload, shape, FieldKey::new(spec.second, 1)),
                combine: spec.combine,
            })
        }
        Ok(payload) => {
            warn!("fallback query {} failed: {}", fields, payload.error_code);
            None
        }
        Err(e) => {
            warn!("fallback query {} failed: {}", fields, e);
            None
        }
    }
}

fn run_heatmap(
    args: &Args,
    session: &mut ScopedSession<BridgeSession>,
    trade_date: &str,
) -> Result<()> {
    let board = board_codes(args)?;
    let records = fetch_board_records(session, trade_date, &board)?;
    let heatmap = sector::build_heatmap(trade_date, &records);
    if args.stdout {
        output::print_json(&heatmap)
    } else {
        output::write_json_file(&args.out, &heatmap)?;
        info!("Heatmap written to {}", args.out);
        output::print_json(&json!({
            "ok": true,
            "trade_date": heatmap.trade_date,
            "total_amount": heatmap.total_amount
        }))
    }
}

fn run_snapshot(
    args: &Args,
    session: &mut ScopedSession<BridgeSession>,
    trade_date: &str,
) -> Result<()> {
    let board = board_codes(args)?;
    let records = fetch_board_records(session, trade_date, &board)?;
    output::print_json(&json!({ "trade_date": trade_date, "data": records }))
}

fn run_spot_close(session: &mut ScopedSession<BridgeSession>, trade_date: &str) -> Result<()> {
    let requested: Vec<String> = codes::SPOT_INDEX_ALIASES
        .iter()
        .map(|(_, code)| code.to_string())
        .collect();
    let mut payload = session.snapshot(
        &requested.join(","),
        "CLOSE",
        &format!("TradeDate={}", trade_date),
    )?;
    payload.status("css")?;
    payload.ensure_codes(&requested);
    let shape = Shape::detect(&payload);
    let closes = extract::float_series(&payload, shape, FieldKey::new("CLOSE", 0));

    let mut data = serde_json::Map::new();
    for (i, code) in payload.codes.iter().enumerate() {
        // Codes with no close are left out of the map entirely.
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        let alias = codes::spot_alias(code).unwrap_or(code.as_str());
        data.insert(alias.to_string(), json!({ "code": code, "close": close }));
    }
    output::print_json(&json!({ "trade_date": trade_date, "data": data }))
}

fn run_spot_series(args: &Args, session: &mut ScopedSession<BridgeSession>) -> Result<()> {
    let (start, end) = series_range(args);
    let mut data = serde_json::Map::new();
    for (alias, code) in codes::SPOT_INDEX_ALIASES {
        match session.daily_series(code, "CLOSE", &start, &end, DAILY_SERIES_OPTIONS) {
            Ok(payload) if payload.error_code == 0 => {
                let points = series::normalize_daily_series(&payload);
                data.insert(alias.to_string(), serde_json::to_value(points)?);
            }
            Ok(payload) => {
                warn!("csd {} failed: {}", code, payload.error_code);
                data.insert(
                    alias.to_string(),
                    json!({ "error": format!("csd error: {}", payload.error_code) }),
                );
            }
            Err(e) => {
                warn!("csd {} failed: {}", code, e);
                data.insert(alias.to_string(), json!({ "error": e.to_string() }));
            }
        }
    }
    output::print_json(&json!({ "start": start, "end": end, "data": data }))
}

/// Series range: explicit bounds, defaulting to the last full calendar year.
fn series_range(args: &Args) -> (String, String) {
    let last_year = Local::now().year() - 1;
    let start = args
        .start
        .clone()
        .unwrap_or_else(|| format!("{}-01-01", last_year));
    let end = args
        .end
        .clone()
        .unwrap_or_else(|| format!("{}-12-31", last_year));
    (start, end)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(trade_date: Option<&str>) -> Config {
        Config {
            quote: None,
            bridge_url: market_common::config::DEFAULT_BRIDGE_URL.to_string(),
            data_token: None,
            data_api_url: market_common::config::DEFAULT_DATA_API_URL.to_string(),
            trade_date: trade_date.map(str::to_string),
        }
    }

    fn args_with(trade_date: Option<&str>) -> Args {
        Args {
            mode: Mode::Heatmap,
            trade_date: trade_date.map(str::to_string),
            start: None,
            end: None,
            codes_path: None,
            out: "data/commodity_amount_heatmap.json".to_string(),
            stdout: false,
        }
    }

    #[test]
    fn environment_override_beats_the_cli_date() {
        let resolved = resolve_trade_date(&args_with(Some("2024-01-02")), &config_with(Some("2024-03-04")));
        assert_eq!(resolved, "2024-03-04");
    }

    #[test]
    fn cli_date_is_used_without_an_override() {
        let resolved = resolve_trade_date(&args_with(Some("2024-01-02")), &config_with(None));
        assert_eq!(resolved, "2024-01-02");
    }

    #[test]
    fn the_default_board_is_the_full_commodity_list() {
        let board = board_codes(&args_with(None)).unwrap();
        assert_eq!(board.len(), 83);
    }
}
