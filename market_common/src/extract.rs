//! Per-field series extraction across the three payload shapes.
//!
//! Given a detected `Shape` and a field key, extraction produces exactly one
//! raw value per instrument code, in code order. Codes the vendor did not
//! answer for get `Null`; an unrecognized shape or an unknown field yields a
//! series of `Null`s rather than an error.
use serde_json::Value;

use crate::payload::{QuotePayload, Shape};
use crate::value::{to_float, to_str};

/// Canonical field lookup key.
///
/// `label` is matched case-insensitively against vendor field names; `slot`
/// is the position the field occupies inside code-keyed positional tuples.
#[derive(Debug, Clone, Copy)]
pub struct FieldKey<'a> {
    /// Vendor field label.
    pub label: &'a str,
    /// Position within a code-keyed tuple.
    pub slot: usize,
}

impl<'a> FieldKey<'a> {
    /// Key for `label` at code-keyed tuple position `slot`.
    pub const fn new(label: &'a str, slot: usize) -> Self {
        Self { label, slot }
    }
}

fn absent_series(len: usize) -> Vec<Value> {
    vec![Value::Null; len]
}

/// Index a code-aligned sequence by code position; a sequence shorter than
/// the code list leaves trailing codes absent.
fn aligned_series(column: &Value, len: usize) -> Vec<Value> {
    let Value::Array(items) = column else {
        return absent_series(len);
    };
    (0..len)
        .map(|i| items.get(i).cloned().unwrap_or(Value::Null))
        .collect()
}

fn code_keyed_series(payload: &QuotePayload, slot: usize) -> Vec<Value> {
    let Value::Object(map) = &payload.data else {
        return absent_series(payload.codes.len());
    };
    payload
        .codes
        .iter()
        .map(|code| match map.get(code) {
            Some(Value::Array(tuple)) => tuple.get(slot).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        })
        .collect()
}

fn mapping_series(payload: &QuotePayload, label: &str) -> Vec<Value> {
    let len = payload.codes.len();
    let Value::Object(map) = &payload.data else {
        return absent_series(len);
    };
    let column = map
        .get(label)
        .or_else(|| map.iter().find(|(k, _)| k.eq_ignore_ascii_case(label)).map(|(_, v)| v));
    match column {
        Some(column) => aligned_series(column, len),
        None => absent_series(len),
    }
}

fn table_series(payload: &QuotePayload, label: &str) -> Vec<Value> {
    let len = payload.codes.len();
    let (Some(fields), Value::Array(columns)) = (&payload.fields, &payload.data) else {
        return absent_series(len);
    };
    let index = fields.iter().position(|f| f.eq_ignore_ascii_case(label));
    match index.and_then(|i| columns.get(i)) {
        Some(column) => aligned_series(column, len),
        None => absent_series(len),
    }
}

/// Extract one raw value per code for `key`, in code order.
pub fn field_series(payload: &QuotePayload, shape: Shape, key: FieldKey<'_>) -> Vec<Value> {
    match shape {
        Shape::CodeKeyed => code_keyed_series(payload, key.slot),
        Shape::FieldKeyed => mapping_series(payload, key.label),
        Shape::Table => table_series(payload, key.label),
        Shape::Unrecognized => absent_series(payload.codes.len()),
    }
}

/// `field_series` with every value coerced to a float.
pub fn float_series(payload: &QuotePayload, shape: Shape, key: FieldKey<'_>) -> Vec<Option<f64>> {
    field_series(payload, shape, key).iter().map(to_float).collect()
}

/// `field_series` with every value coerced to a string.
pub fn string_series(payload: &QuotePayload, shape: Shape, key: FieldKey<'_>) -> Vec<Option<String>> {
    field_series(payload, shape, key).iter().map(to_str).collect()
}
