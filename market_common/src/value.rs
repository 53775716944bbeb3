//! Total scalar coercion for vendor payload values.
//!
//! Vendor payloads carry numbers as numbers, as formatted text (thousands
//! separators, percent signs) or, for non-UTF-8 vendor strings forwarded by
//! the quote bridge, as raw byte arrays. Both functions here are total:
//! malformed input degrades to `None`, it never becomes an error.
use serde_json::Value;

/// Decode a JSON array of byte values (integers in 0..=255) into lossy UTF-8
/// text. Returns `None` if any element is not a byte.
fn bytes_to_string(items: &[Value]) -> Option<String> {
    let mut buf = Vec::with_capacity(items.len());
    for item in items {
        let byte = item.as_u64().filter(|b| *b <= 255)?;
        buf.push(byte as u8);
    }
    Some(String::from_utf8_lossy(&buf).into_owned())
}

/// Parse numeric text after stripping thousands separators and percent signs.
///
/// Empty strings and the literal tokens `none`/`nan` (case-insensitive) are
/// treated as absent. The `nan` check runs before parsing so the value never
/// becomes a float NaN.
fn parse_float_text(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && *ch != '%')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.eq_ignore_ascii_case("none") || cleaned.eq_ignore_ascii_case("nan") {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Coerce an arbitrary payload scalar into a float.
///
/// Accepts absent (`Null`), numeric, textual and byte-encoded input; any
/// conversion failure yields `None`. Idempotent on numeric input.
pub fn to_float(v: &Value) -> Option<f64> {
    match v {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_text(s),
        Value::Array(items) => bytes_to_string(items).and_then(|s| parse_float_text(&s)),
        _ => None,
    }
}

/// Coerce an arbitrary payload scalar into a string.
///
/// Byte-encoded input is decoded as UTF-8 with invalid-byte substitution and
/// trimmed. Only absent (`Null`) input yields `None`.
pub fn to_str(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(match bytes_to_string(items) {
            Some(text) => text.trim().to_string(),
            None => v.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => Some(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_float_passes_numbers_through() {
        assert_eq!(to_float(&json!(500)), Some(500.0));
        assert_eq!(to_float(&json!(1.25)), Some(1.25));
        assert_eq!(to_float(&json!(-3)), Some(-3.0));
    }

    #[test]
    fn to_float_strips_separators_and_percent() {
        assert_eq!(to_float(&json!("1,234.5")), Some(1234.5));
        assert_eq!(to_float(&json!("12%")), Some(12.0));
        assert_eq!(to_float(&json!(" 7 ")), Some(7.0));
    }

    #[test]
    fn to_float_treats_sentinels_as_absent() {
        assert_eq!(to_float(&json!("")), None);
        assert_eq!(to_float(&json!("   ")), None);
        assert_eq!(to_float(&json!("none")), None);
        assert_eq!(to_float(&json!("None")), None);
        assert_eq!(to_float(&json!("NaN")), None);
    }

    #[test]
    fn to_float_is_total_over_malformed_input() {
        assert_eq!(to_float(&Value::Null), None);
        assert_eq!(to_float(&json!("abc")), None);
        assert_eq!(to_float(&json!(true)), None);
        assert_eq!(to_float(&json!({"close": 1.0})), None);
        assert_eq!(to_float(&json!([1, "x"])), None);
    }

    #[test]
    fn to_float_decodes_byte_arrays() {
        // b"123" and b"1,5%"
        assert_eq!(to_float(&json!([49, 50, 51])), Some(123.0));
        assert_eq!(to_float(&json!([49, 44, 53, 37])), Some(15.0));
    }

    #[test]
    fn to_float_is_idempotent_on_numeric_input() {
        let first = to_float(&json!(42.5)).unwrap();
        assert_eq!(to_float(&json!(first)), Some(first));
    }

    #[test]
    fn to_str_is_absent_only_for_null() {
        assert_eq!(to_str(&Value::Null), None);
        assert_eq!(to_str(&json!("玉米")), Some("玉米".to_string()));
        assert_eq!(to_str(&json!(12)), Some("12".to_string()));
        assert_eq!(to_str(&json!(false)), Some("false".to_string()));
    }

    #[test]
    fn to_str_substitutes_invalid_bytes() {
        // 0xFF is not valid UTF-8; decoding must not fail.
        let decoded = to_str(&json!([67, 111, 114, 110, 255])).unwrap();
        assert!(decoded.starts_with("Corn"));
        assert!(decoded.contains('\u{FFFD}'));
    }
}
