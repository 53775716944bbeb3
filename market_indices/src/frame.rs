//! Row-major table frames returned by the data service.
//!
//! The service answers every API with the same `{fields, items}` layout: a
//! parallel field-label list plus row-major records. Column lookup is
//! case-insensitive; cells coerce through the shared value-coercion rules,
//! so a missing or malformed column degrades to absent bar fields.
use market_common::value::{to_float, to_str};
use serde::Deserialize;
use serde_json::Value;

/// `{fields, items}` table frame.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableFrame {
    /// Column labels, in item order.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Row-major records aligned to `fields`.
    #[serde(default)]
    pub items: Vec<Vec<Value>>,
}

/// One daily bar of a futures contract or index, reduced to the columns the
/// summaries actually consume. Queries may request more; extra columns are
/// simply ignored.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(missing_docs)]
pub struct DailyBar {
    pub ts_code: String,
    pub trade_date: String,
    pub pre_close: Option<f64>,
    pub pre_settle: Option<f64>,
    pub close: Option<f64>,
    pub settle: Option<f64>,
    pub vol: Option<f64>,
    pub oi: Option<f64>,
    pub pct_chg: Option<f64>,
}

impl TableFrame {
    /// True when the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Case-insensitive column index lookup.
    pub fn column(&self, label: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.eq_ignore_ascii_case(label))
    }

    fn cell(&self, row: &[Value], label: &str) -> Value {
        self.column(label)
            .and_then(|i| row.get(i))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Typed daily bars, one per row.
    pub fn daily_bars(&self) -> Vec<DailyBar> {
        self.items
            .iter()
            .map(|row| DailyBar {
                ts_code: to_str(&self.cell(row, "ts_code")).unwrap_or_default(),
                trade_date: to_str(&self.cell(row, "trade_date")).unwrap_or_default(),
                pre_close: to_float(&self.cell(row, "pre_close")),
                pre_settle: to_float(&self.cell(row, "pre_settle")),
                close: to_float(&self.cell(row, "close")),
                settle: to_float(&self.cell(row, "settle")),
                vol: to_float(&self.cell(row, "vol")),
                oi: to_float(&self.cell(row, "oi")),
                pct_chg: to_float(&self.cell(row, "pct_chg")),
            })
            .collect()
    }
}
