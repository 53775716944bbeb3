//! Canonical per-instrument snapshot records.
//!
//! A `QuoteRecord` is what every snapshot payload normalizes into, whatever
//! shape the vendor answered in. Assembly is driven by the code list: one
//! record per requested code, in request order, with absent fields for codes
//! the vendor had no data for.
use serde::Serialize;

use crate::extract::{FieldKey, float_series, string_series};
use crate::payload::{QuotePayload, Shape};

/// Display-name field; slot 0 of code-keyed tuples.
pub const NAME: FieldKey<'static> = FieldKey::new("NAME", 0);
/// Settlement-to-settlement return percentage; slot 1.
pub const RETURN_PCT: FieldKey<'static> = FieldKey::new("CLEARDIFFERRANGE", 1);
/// Traded amount; slot 2.
pub const AMOUNT: FieldKey<'static> = FieldKey::new("AMOUNT", 2);

/// Snapshot field list requested for the commodity board.
pub const SNAPSHOT_FIELDS: &str = "NAME,CLEARDIFFERRANGE,AMOUNT";

/// Normalized quote record for a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRecord {
    /// Exchange-qualified instrument code.
    pub code: String,
    /// Display name, if the vendor supplied one.
    pub name: Option<String>,
    /// Daily return percentage.
    pub return_pct: Option<f64>,
    /// Traded amount, after fallback resolution.
    pub amount: Option<f64>,
}

/// Assemble one record per code from a snapshot payload.
///
/// The shape is detected once; the three canonical fields are extracted and
/// coerced per code. Codes without data yield records with absent optional
/// fields, never dropped records.
pub fn assemble_records(payload: &QuotePayload) -> Vec<QuoteRecord> {
    let shape = Shape::detect(payload);
    let names = string_series(payload, shape, NAME);
    let returns = float_series(payload, shape, RETURN_PCT);
    let amounts = float_series(payload, shape, AMOUNT);
    payload
        .codes
        .iter()
        .enumerate()
        .map(|(i, code)| QuoteRecord {
            code: code.clone(),
            name: names.get(i).cloned().flatten(),
            return_pct: returns.get(i).copied().flatten(),
            amount: amounts.get(i).copied().flatten(),
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
    fn field_keyed_payload_assembles_records() {
        let p = payload(json!({
            "Codes": ["C0.DCE"],
            "Data": {"NAME": ["Corn"], "AMOUNT": [500]}
        }));
        let records = assemble_records(&p);
        assert_eq!(
            records,
            vec![QuoteRecord {
                code: "C0.DCE".to_string(),
                name: Some("Corn".to_string()),
                return_pct: None,
                amount: Some(500.0),
            }]
        );
    }

    #[test]
    fn code_keyed_payload_matches_the_field_keyed_result() {
        let field_keyed = payload(json!({
            "Codes": ["C0.DCE"],
            "Data": {"NAME": ["Corn"], "CLEARDIFFERRANGE": [1.2], "AMOUNT": [500]}
        }));
        let code_keyed = payload(json!({
            "Codes": ["C0.DCE"],
            "Data": {"C0.DCE": ["Corn", 1.2, 500]}
        }));
        assert_eq!(assemble_records(&field_keyed), assemble_records(&code_keyed));
    }

    #[test]
    fn codes_without_data_keep_their_record() {
        let p = payload(json!({
            "Codes": ["C0.DCE", "AU0.SHF"],
            "Data": {"C0.DCE": ["Corn", 1.2, 500]}
        }));
        let records = assemble_records(&p);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].code, "AU0.SHF");
        assert_eq!(records[1].name, None);
        assert_eq!(records[1].return_pct, None);
        assert_eq!(records[1].amount, None);
    }

    #[test]
    fn unrecognized_payloads_yield_all_absent_records() {
        let p = payload(json!({"Codes": ["C0.DCE"], "Data": "oops"}));
        let records = assemble_records(&p);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, None);
    }
}
