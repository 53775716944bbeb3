//! Continuous-leg daily history over a date span.
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;

use market_common::Result;
use market_common::codes::INDEX_FUTURE_ROOTS;

use crate::dataservice::DataServiceClient;
use crate::frame::DailyBar;

/// Continuous legs fetched per root: near month through the third back month.
pub const LEGS: [&str; 4] = ["L", "L1", "L2", "L3"];

const RANGE_FIELDS: &str = "ts_code,trade_date,open,high,low,close,settle,vol,amount,oi";

/// One point of a leg history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangePoint {
    /// Trading day (`YYYYMMDD`).
    pub trade_date: String,
    /// Closing price.
    pub close: Option<f64>,
    /// Settlement price.
    pub settle: Option<f64>,
}

/// Range document across roots and legs.
#[derive(Debug, Serialize)]
pub struct RangeDocument {
    /// Span start (`YYYYMMDD`).
    pub start_date: String,
    /// Span end (`YYYYMMDD`).
    pub end_date: String,
    /// Points per root, per leg.
    pub data: BTreeMap<String, BTreeMap<String, Vec<RangePoint>>>,
}

/// Points from daily bars, ascending by trade date.
fn points_from_bars(bars: Vec<DailyBar>) -> Vec<RangePoint> {
    let mut points: Vec<RangePoint> = bars
        .into_iter()
        .map(|bar| RangePoint {
            trade_date: bar.trade_date,
            close: bar.close,
            settle: bar.settle,
        })
        .collect();
    points.sort_by(|a, b| a.trade_date.cmp(&b.trade_date));
    points
}

/// Daily points for one continuous code over `[start, end]`. An empty
/// answer is an empty list, not an error.
fn fetch_leg_range(
    client: &DataServiceClient,
    ts_code: &str,
    exchange: &str,
    start: &str,
    end: &str,
) -> Result<Vec<RangePoint>> {
    let params = json!({
        "ts_code": ts_code,
        "exchange": exchange,
        "start_date": start,
        "end_date": end
    });
    let frame = client.query("fut_daily", params, RANGE_FIELDS)?;
    Ok(points_from_bars(frame.daily_bars()))
}

/// Assemble the range document for every root and continuous leg.
pub fn build_range(
    client: &DataServiceClient,
    exchange: &str,
    start: &str,
    end: &str,
) -> Result<RangeDocument> {
    let mut data = BTreeMap::new();
    for root in INDEX_FUTURE_ROOTS {
        let mut legs = BTreeMap::new();
        for leg in LEGS {
            let ts_code = format!("{}{}.CFX", root, leg);
            legs.insert(
                leg.to_string(),
                fetch_leg_range(client, &ts_code, exchange, start, end)?,
            );
        }
        data.insert(root.to_string(), legs);
    }
    Ok(RangeDocument {
        start_date: start.to_string(),
        end_date: end.to_string(),
        data,
    })
}
