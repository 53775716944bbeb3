//! Quote-vendor response envelope and shape detection.
//!
//! The terminal vendor answers structurally different payloads for the same
//! query depending on its build and the API used. The envelope is stable
//! (`ErrorCode`/`Codes`/`Fields`/`Data`, with `Dates` added for daily
//! series); the `Data` container comes in one of three known shapes. The
//! `Shape` enum classifies the container exactly once per payload, and the
//! extractor dispatches on that tag instead of re-probing the structure at
//! every call site.
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::result::Result;

/// Raw quote-vendor response envelope.
///
/// Field spellings vary across vendor builds (`Fields` vs `Field`, `Dates`
/// vs `Times`); serde aliases absorb the variants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotePayload {
    /// Vendor status code; zero means success.
    #[serde(alias = "ErrorCode", default)]
    pub error_code: i64,
    /// Human-readable vendor status message, if any.
    #[serde(alias = "ErrorMsg", default)]
    pub error_msg: Option<String>,
    /// Ordered instrument codes the query was made for.
    #[serde(alias = "Codes", default)]
    pub codes: Vec<String>,
    /// Ordered field labels; present for table-shaped data.
    #[serde(alias = "Fields", alias = "Field", default)]
    pub fields: Option<Vec<String>>,
    /// The data container, in one of the three known shapes.
    #[serde(alias = "Data", default)]
    pub data: Value,
    /// Ordered dates for daily-series responses.
    #[serde(alias = "Dates", alias = "Times", default)]
    pub dates: Option<Vec<String>>,
}

impl QuotePayload {
    /// Convert a nonzero vendor status into a query error for `api`.
    pub fn status(&self, api: &str) -> Result<()> {
        if self.error_code != 0 {
            return Err(FetchError::Query {
                api: api.to_string(),
                code: self.error_code,
            });
        }
        Ok(())
    }

    /// Fill in the requested code list when the vendor omitted `Codes`.
    ///
    /// The code list drives output cardinality and order, so extraction
    /// over a payload without it would yield nothing.
    pub fn ensure_codes(&mut self, requested: &[String]) {
        if self.codes.is_empty() {
            self.codes = requested.to_vec();
        }
    }
}

/// Structural layout of the payload's data container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Mapping keyed by instrument code; values are positional tuples.
    CodeKeyed,
    /// Mapping keyed by field name; values are code-aligned sequences.
    FieldKeyed,
    /// Sequence of per-field columns described by the field labels.
    Table,
    /// None of the known layouts; extraction yields absent values.
    Unrecognized,
}

impl Shape {
    /// Classify the payload's data container.
    ///
    /// Code-keyed detection must run before the generic mapping case: a
    /// code-keyed mapping is structurally a mapping too.
    pub fn detect(payload: &QuotePayload) -> Shape {
        match &payload.data {
            Value::Object(map) => {
                if payload.codes.iter().any(|code| map.contains_key(code)) {
                    Shape::CodeKeyed
                } else {
                    Shape::FieldKeyed
                }
            }
            Value::Array(_) if payload.fields.is_some() => Shape::Table,
            _ => Shape::Unrecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> QuotePayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn envelope_accepts_vendor_spellings() {
        let p = payload(json!({
            "ErrorCode": 0,
            "Codes": ["C0.DCE"],
            "Field": ["NAME"],
            "Data": [["Corn"]]
        }));
        assert_eq!(p.error_code, 0);
        assert_eq!(p.codes, vec!["C0.DCE"]);
        assert_eq!(p.fields, Some(vec!["NAME".to_string()]));
    }

    #[test]
    fn code_keyed_wins_over_generic_mapping() {
        let p = payload(json!({
            "Codes": ["C0.DCE", "AU0.SHF"],
            "Data": {"C0.DCE": ["Corn", 1.2, 500]}
        }));
        assert_eq!(Shape::detect(&p), Shape::CodeKeyed);
    }

    #[test]
    fn mapping_without_code_keys_is_field_keyed() {
        let p = payload(json!({
            "Codes": ["C0.DCE"],
            "Data": {"NAME": ["Corn"], "AMOUNT": [500]}
        }));
        assert_eq!(Shape::detect(&p), Shape::FieldKeyed);
    }

    #[test]
    fn sequence_with_labels_is_a_table() {
        let p = payload(json!({
            "Codes": ["C0.DCE"],
            "Fields": ["NAME", "AMOUNT"],
            "Data": [["Corn"], [500]]
        }));
        assert_eq!(Shape::detect(&p), Shape::Table);
    }

    #[test]
    fn unknown_layouts_are_unrecognized() {
        let no_labels = payload(json!({"Codes": ["C0.DCE"], "Data": [["Corn"]]}));
        assert_eq!(Shape::detect(&no_labels), Shape::Unrecognized);

        let scalar = payload(json!({"Codes": ["C0.DCE"], "Data": 7}));
        assert_eq!(Shape::detect(&scalar), Shape::Unrecognized);

        let missing = payload(json!({"Codes": ["C0.DCE"]}));
        assert_eq!(Shape::detect(&missing), Shape::Unrecognized);
    }

    #[test]
    fn status_reports_nonzero_codes() {
        let p = payload(json!({"ErrorCode": 10001, "Data": {}}));
        let err = p.status("css").unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("css"));
    }

    #[test]
    fn ensure_codes_keeps_vendor_codes_when_present() {
        let mut p = payload(json!({"Codes": ["C0.DCE"], "Data": {}}));
        p.ensure_codes(&["AU0.SHF".to_string()]);
        assert_eq!(p.codes, vec!["C0.DCE"]);

        let mut empty = payload(json!({"Data": {}}));
        empty.ensure_codes(&["AU0.SHF".to_string()]);
        assert_eq!(empty.codes, vec!["AU0.SHF"]);
    }
}
