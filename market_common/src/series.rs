//! Daily close-series normalization.
//!
//! Series responses are the most shape-unstable of the vendor's answers:
//! the value column may sit under a `CLOSE` key, be the first of a column
//! list, or arrive wrapped in one extra nesting level; dates may be spelled
//! `YYYY/M/D`. Normalization reduces all of that to `{date, close}` points
//! and degrades to an empty series when dates and values do not line up.
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::payload::QuotePayload;
use crate::value::to_float;

/// One normalized point of a daily close series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// ISO `YYYY-MM-DD` date.
    pub date: String,
    /// Closing value.
    pub close: f64,
}

/// Pick the value column out of a series payload.
fn series_values(payload: &QuotePayload) -> Option<&Value> {
    match &payload.data {
        Value::Object(map) => map
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("CLOSE"))
            .map(|(_, v)| v)
            .or_else(|| map.values().next()),
        Value::Array(columns) => columns.first(),
        Value::Null => None,
        other => Some(other),
    }
}

/// Unwrap one singleton nesting level: a column whose first element is
/// itself a sequence is the actual series.
fn flatten(values: &Value) -> &Value {
    if let Value::Array(items) = values {
        if let Some(inner @ Value::Array(_)) = items.first() {
            return inner;
        }
    }
    values
}

/// Normalize `YYYY/M/D` vendor dates to ISO; other spellings pass through.
fn normalize_date(raw: &str) -> String {
    if raw.contains('/') {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y/%m/%d") {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}

/// Normalize a daily-series payload into `{date, close}` points.
///
/// Points whose close does not coerce to a float are skipped; a length
/// mismatch between dates and values yields an empty series.
pub fn normalize_daily_series(payload: &QuotePayload) -> Vec<SeriesPoint> {
    let Some(dates) = payload.dates.as_ref() else {
        return Vec::new();
    };
    let Some(values) = series_values(payload) else {
        return Vec::new();
    };
    let Value::Array(values) = flatten(values) else {
        return Vec::new();
    };
    if dates.len() != values.len() {
        return Vec::new();
    }
    dates
        .iter()
        .zip(values)
        .filter_map(|(date, value)| {
            let close = to_float(value)?;
            Some(SeriesPoint {
                date: normalize_date(date),
                close,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> QuotePayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn close_keyed_mapping_normalizes() {
        let p = payload(json!({
            "Dates": ["2024-01-02", "2024-01-03"],
            "Data": {"CLOSE": [2410.5, 2403.1]}
        }));
        assert_eq!(
            normalize_daily_series(&p),
            vec![
                SeriesPoint { date: "2024-01-02".to_string(), close: 2410.5 },
                SeriesPoint { date: "2024-01-03".to_string(), close: 2403.1 },
            ]
        );
    }

    #[test]
    fn column_lists_use_the_first_series() {
        let p = payload(json!({
            "Dates": ["2024-01-02"],
            "Data": [[2410.5]]
        }));
        assert_eq!(normalize_daily_series(&p).len(), 1);
    }

    #[test]
    fn singleton_nesting_is_flattened() {
        let p = payload(json!({
            "Dates": ["2024-01-02", "2024-01-03"],
            "Data": {"CLOSE": [[2410.5, 2403.1]]}
        }));
        assert_eq!(normalize_daily_series(&p).len(), 2);
    }

    #[test]
    fn slash_dates_are_normalized() {
        let p = payload(json!({
            "Dates": ["2024/1/2"],
            "Data": {"CLOSE": [2410.5]}
        }));
        assert_eq!(normalize_daily_series(&p)[0].date, "2024-01-02");
    }

    #[test]
    fn length_mismatch_yields_an_empty_series() {
        let p = payload(json!({
            "Dates": ["2024-01-02", "2024-01-03"],
            "Data": {"CLOSE": [2410.5]}
        }));
        assert!(normalize_daily_series(&p).is_empty());
    }

    #[test]
    fn unparseable_closes_are_skipped() {
        let p = payload(json!({
            "Dates": ["2024-01-02", "2024-01-03"],
            "Data": {"CLOSE": [2410.5, "n/a"]}
        }));
        let points = normalize_daily_series(&p);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].close, 2410.5);
    }
}
