//! Latest index-futures board assembly.
//!
//! Resolves the most recent trading day by probing actual data (an anchor
//! index), fetches the whole futures board for that day, and summarizes one
//! root at a time: main contract by open interest, far-month contract by
//! code, settle-to-close return, and the near/next continuous legs. When
//! the board is unavailable (permissions, holidays), the underlying spot
//! indices stand in.
use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::{debug, info};
use serde::Serialize;
use serde_json::json;

use market_common::codes::{INDEX_FUTURE_ROOTS, SPOT_INDEX_ALIASES};

use crate::dataservice::DataServiceClient;
use crate::frame::DailyBar;

/// Daily-bar field list requested for the futures board.
const FUT_DAILY_FIELDS: &str =
    "ts_code,trade_date,pre_close,pre_settle,open,high,low,close,settle,vol,oi";
/// Field list for continuous-leg lookups (no open interest on those rows).
const CONTINUOUS_FIELDS: &str =
    "ts_code,trade_date,pre_close,pre_settle,open,high,low,close,settle,vol";
/// Field list for underlying-index probes and fallbacks.
const INDEX_DAILY_FIELDS: &str = "ts_code,trade_date,close,pre_close,pct_chg";

/// Anchor index used to find the most recent date with data.
const ANCHOR_INDEX: &str = "000300.SH";

/// Summary of one index-future root for the latest trading day.
#[derive(Debug, Clone, Default, Serialize)]
#[allow(missing_docs)]
pub struct RootSummary {
    pub ts_code: Option<String>,
    pub trade_date: String,
    pub close: Option<f64>,
    pub settle: Option<f64>,
    pub settle_return: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub far_ts_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub far_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_ts_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_settle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_settle_return: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub far_cont_ts_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub far_settle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub far_settle_return: Option<f64>,
    pub source: String,
}

/// One continuous-leg bar.
#[derive(Debug, Clone)]
pub struct ContinuousLeg {
    /// Continuous contract code actually answered.
    pub ts_code: String,
    /// Closing price.
    pub close: Option<f64>,
    /// Settlement price.
    pub settle: Option<f64>,
    /// Close against previous settle, percent.
    pub settle_return: Option<f64>,
}

/// Latest board document.
#[derive(Debug, Serialize)]
pub struct LatestDocument {
    /// Futures exchange the board belongs to.
    pub exchange: String,
    /// Most recent trading day actually used across roots.
    pub trade_date: String,
    /// Per-root summaries.
    pub data: BTreeMap<String, RootSummary>,
}

/// Percentage return of `close` against the previous settle, falling back
/// to the previous close. Zero bases count as absent.
pub fn settle_return(
    close: Option<f64>,
    pre_settle: Option<f64>,
    pre_close: Option<f64>,
) -> Option<f64> {
    let close = close?;
    let base = pre_settle
        .filter(|v| *v != 0.0)
        .or(pre_close.filter(|v| *v != 0.0))?;
    Some((close / base - 1.0) * 100.0)
}

/// Adjust a weekend date back to Friday; weekdays pass through.
pub fn adjust_for_weekend(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date - Duration::days(2),
        _ => date,
    }
}

/// Compact `YYYYMMDD` rendering used by the data service.
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn parse_compact(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y%m%d").ok()
}

/// Most recent date for which the anchor index has a daily bar, walking
/// back up to 20 days; weekend-adjusted today when nothing is found.
pub fn latest_data_date(client: &DataServiceClient, today: NaiveDate) -> String {
    for back in 0..20 {
        let date = compact_date(today - Duration::days(back));
        let params =
            json!({ "ts_code": ANCHOR_INDEX, "start_date": date.as_str(), "end_date": date.as_str() });
        match client.query("index_daily", params, INDEX_DAILY_FIELDS) {
            Ok(frame) if !frame.is_empty() => return date,
            Ok(_) => {}
            Err(e) => debug!("index_daily probe {} failed: {}", date, e),
        }
    }
    compact_date(adjust_for_weekend(today))
}

/// Whole-board daily bars for `date`, trying the exchange-parameter
/// spellings the service accepts before giving up.
fn fetch_fut_daily(client: &DataServiceClient, date: &str, exchange: &str) -> Vec<DailyBar> {
    for exchange_param in [Some(exchange), Some(""), None] {
        let mut params = json!({ "trade_date": date });
        if let Some(value) = exchange_param {
            params["exchange"] = json!(value);
        }
        match client.query("fut_daily", params, FUT_DAILY_FIELDS) {
            Ok(frame) if !frame.is_empty() => return frame.daily_bars(),
            Ok(_) => {}
            Err(e) => debug!("fut_daily {} failed: {}", date, e),
        }
    }
    Vec::new()
}

fn compare_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(0.0)
        .partial_cmp(&b.unwrap_or(0.0))
        .unwrap_or(Ordering::Equal)
}

/// Main contract for a root: highest open interest, then volume, then the
/// lexicographically latest code.
pub fn select_main_contract<'a>(bars: &'a [DailyBar], root: &str) -> Option<&'a DailyBar> {
    bars.iter()
        .filter(|bar| bar.ts_code.starts_with(root))
        .max_by(|a, b| {
            compare_f64(a.oi, b.oi)
                .then_with(|| compare_f64(a.vol, b.vol))
                .then_with(|| a.ts_code.cmp(&b.ts_code))
        })
}

/// Far-month contract for a root: the lexicographically latest code.
pub fn select_far_month<'a>(bars: &'a [DailyBar], root: &str) -> Option<&'a DailyBar> {
    bars.iter()
        .filter(|bar| bar.ts_code.starts_with(root))
        .max_by(|a, b| a.ts_code.cmp(&b.ts_code))
}

/// Continuous-leg bar for `ts_code`, walking back up to 8 days from `date`.
fn fetch_continuous(
    client: &DataServiceClient,
    ts_code: &str,
    date: &str,
) -> Option<ContinuousLeg> {
    let start = parse_compact(date)?;
    for back in 0..8 {
        let day = compact_date(start - Duration::days(back));
        for exchange_param in [Some("CFFEX"), None, Some("")] {
            let mut params = json!({ "trade_date": day.as_str(), "ts_code": ts_code });
            if let Some(value) = exchange_param {
                params["exchange"] = json!(value);
            }
            let Ok(frame) = client.query("fut_daily", params, CONTINUOUS_FIELDS) else {
                continue;
            };
            let Some(bar) = frame.daily_bars().into_iter().last() else {
                continue;
            };
            let ret = settle_return(bar.close, bar.pre_settle, bar.pre_close);
            return Some(ContinuousLeg {
                ts_code: if bar.ts_code.is_empty() {
                    ts_code.to_string()
                } else {
                    bar.ts_code
                },
                close: bar.close,
                settle: bar.settle,
                settle_return: ret,
            });
        }
    }
    None
}

/// Single-day bar of an underlying index, used for probes and fallbacks.
fn index_daily_bar(client: &DataServiceClient, index_code: &str, date: &str) -> Option<DailyBar> {
    let params = json!({ "ts_code": index_code, "start_date": date, "end_date": date });
    match client.query("index_daily", params, INDEX_DAILY_FIELDS) {
        Ok(frame) if !frame.is_empty() => frame.daily_bars().into_iter().last(),
        _ => None,
    }
}

fn summarize_root(
    client: &DataServiceClient,
    bars: &[DailyBar],
    root: &str,
    trade_date: &str,
    used_dates: &mut Vec<String>,
) -> RootSummary {
    let Some(bar) = select_main_contract(bars, root) else {
        return RootSummary {
            trade_date: trade_date.to_string(),
            source: "fut_daily".to_string(),
            ..Default::default()
        };
    };
    let far = select_far_month(bars, root);
    let ret = settle_return(bar.close, bar.pre_settle, bar.pre_close);
    let bar_date = if bar.trade_date.is_empty() {
        trade_date.to_string()
    } else {
        bar.trade_date.clone()
    };
    used_dates.push(bar_date.clone());

    // Far month falls back to the main contract so basis can still be
    // computed downstream.
    let far_close = far.and_then(|b| b.close).or(bar.close);
    let far_ts_code = far
        .map(|b| b.ts_code.clone())
        .or_else(|| Some(bar.ts_code.clone()));

    let near = fetch_continuous(client, &format!("{}L.CFX", root), trade_date);
    let far_cont = fetch_continuous(client, &format!("{}L1.CFX", root), trade_date);
    RootSummary {
        ts_code: Some(bar.ts_code.clone()),
        trade_date: bar_date,
        close: bar.close,
        settle: bar.settle,
        settle_return: ret,
        far_ts_code,
        far_close,
        near_ts_code: near.as_ref().map(|leg| leg.ts_code.clone()),
        near_close: near.as_ref().and_then(|leg| leg.close),
        near_settle: near.as_ref().and_then(|leg| leg.settle),
        near_settle_return: near.as_ref().and_then(|leg| leg.settle_return),
        far_cont_ts_code: far_cont.as_ref().map(|leg| leg.ts_code.clone()),
        far_settle: far_cont.as_ref().and_then(|leg| leg.settle),
        far_settle_return: far_cont.as_ref().and_then(|leg| leg.settle_return),
        source: "fut_daily".to_string(),
    }
}

fn fallback_root_summary(
    client: &DataServiceClient,
    index_code: &str,
    trade_date: &str,
    used_dates: &mut Vec<String>,
) -> RootSummary {
    let mut summary = RootSummary {
        trade_date: trade_date.to_string(),
        source: "index_daily".to_string(),
        ..Default::default()
    };
    let Some(start) = parse_compact(trade_date) else {
        return summary;
    };
    for back in 0..8 {
        let day = compact_date(start - Duration::days(back));
        if let Some(bar) = index_daily_bar(client, index_code, &day) {
            let ret = bar
                .pct_chg
                .or_else(|| settle_return(bar.close, None, bar.pre_close));
            if bar.close.is_some() || ret.is_some() {
                summary.close = bar.close;
                summary.settle_return = ret;
                summary.trade_date = day.clone();
                used_dates.push(day);
                break;
            }
        }
    }
    summary
}

/// Assemble the latest board document.
pub fn build_latest(client: &DataServiceClient, exchange: &str, today: NaiveDate) -> LatestDocument {
    let mut trade_date = latest_data_date(client, today);
    let mut bars = fetch_fut_daily(client, &trade_date, exchange);
    if bars.is_empty() {
        if let Some(start) = parse_compact(&trade_date) {
            for back in 1..6 {
                let day = compact_date(start - Duration::days(back));
                bars = fetch_fut_daily(client, &day, exchange);
                if !bars.is_empty() {
                    trade_date = day;
                    break;
                }
            }
        }
    }

    let mut data = BTreeMap::new();
    let mut used_dates: Vec<String> = Vec::new();
    if !bars.is_empty() {
        info!("fut_daily answered {} rows for {}", bars.len(), trade_date);
        for root in INDEX_FUTURE_ROOTS {
            let summary = summarize_root(client, &bars, root, &trade_date, &mut used_dates);
            data.insert(root.to_string(), summary);
        }
    } else {
        info!("fut_daily unavailable, falling back to underlying indices");
        for (root, index_code) in SPOT_INDEX_ALIASES {
            let summary = fallback_root_summary(client, index_code, &trade_date, &mut used_dates);
            data.insert(root.to_string(), summary);
        }
    }

    let payload_date = used_dates
        .iter()
        .max()
        .cloned()
        .unwrap_or_else(|| compact_date(adjust_for_weekend(today)));
    LatestDocument {
        exchange: exchange.to_string(),
        trade_date: payload_date,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts_code: &str, oi: Option<f64>, vol: Option<f64>) -> DailyBar {
        DailyBar {
            ts_code: ts_code.to_string(),
            trade_date: "20240830".to_string(),
            oi,
            vol,
            ..Default::default()
        }
    }

    #[test]
    fn settle_return_prefers_the_previous_settle() {
        let ret = settle_return(Some(103.0), Some(100.0), Some(50.0)).unwrap();
        assert!((ret - 3.0).abs() < 1e-9);
    }

    #[test]
    fn settle_return_falls_back_past_zero_and_absent_bases() {
        let ret = settle_return(Some(103.0), Some(0.0), Some(100.0)).unwrap();
        assert!((ret - 3.0).abs() < 1e-9);
        assert_eq!(settle_return(Some(103.0), None, None), None);
        assert_eq!(settle_return(None, Some(100.0), Some(100.0)), None);
    }

    #[test]
    fn weekends_adjust_back_to_friday() {
        let saturday = NaiveDate::from_ymd_opt(2024, 8, 31).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let friday = NaiveDate::from_ymd_opt(2024, 8, 30).unwrap();
        assert_eq!(adjust_for_weekend(saturday), friday);
        assert_eq!(adjust_for_weekend(sunday), friday);
        assert_eq!(adjust_for_weekend(friday), friday);
    }

    #[test]
    fn main_contract_prefers_open_interest_then_volume_then_code() {
        let bars = vec![
            bar("IF2409.CFX", Some(90_000.0), Some(1_000.0)),
            bar("IF2412.CFX", Some(120_000.0), Some(500.0)),
            bar("IC2409.CFX", Some(999_999.0), Some(9.0)),
        ];
        assert_eq!(
            select_main_contract(&bars, "IF").unwrap().ts_code,
            "IF2412.CFX"
        );

        let by_volume = vec![
            bar("IF2409.CFX", None, Some(1_000.0)),
            bar("IF2412.CFX", None, Some(500.0)),
        ];
        assert_eq!(
            select_main_contract(&by_volume, "IF").unwrap().ts_code,
            "IF2409.CFX"
        );

        let by_code = vec![bar("IF2409.CFX", None, None), bar("IF2412.CFX", None, None)];
        assert_eq!(
            select_main_contract(&by_code, "IF").unwrap().ts_code,
            "IF2412.CFX"
        );
        assert!(select_main_contract(&bars, "IM").is_none());
    }

    #[test]
    fn far_month_is_the_lexicographically_latest_code() {
        let bars = vec![
            bar("IF2409.CFX", Some(120_000.0), None),
            bar("IF2506.CFX", Some(10.0), None),
            bar("IF2412.CFX", Some(90_000.0), None),
        ];
        assert_eq!(select_far_month(&bars, "IF").unwrap().ts_code, "IF2506.CFX");
    }
}
