//! Forgiving `deserialize_with` helpers for backend and storage payloads.
//!
//! The backend and the local draft store are not schema-checked, so a field
//! of the wrong JSON type degrades to its empty value instead of failing the
//! whole record. Pair each helper with `#[serde(default)]` so missing fields
//! behave the same as mistyped ones.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A string, or `""` for any other JSON type.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// `Some` for a JSON string, `None` otherwise.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Non-empty strings of a JSON array; other elements and non-arrays are dropped.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// `true` only for JSON `true`.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
}

/// A non-negative integer count; fractional values are truncated, anything
/// else is zero.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(value_to_count(&Value::deserialize(d)?))
}

/// Like [`count`], saturating at `u32::MAX`.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn count_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let n = value_to_count(&Value::deserialize(d)?);
    Ok(u32::try_from(n).unwrap_or(u32::MAX))
}

/// A decimal from a JSON number or numeric string; zero otherwise.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => parse_decimal(&n.to_string()).unwrap_or_default(),
        Value::String(s) => parse_decimal(s.trim()).unwrap_or_default(),
        _ => Decimal::ZERO,
    })
}

/// An RFC 3339 timestamp string, `None` for anything else.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn opt_timestamp<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    })
}

/// Parse a decimal in plain or scientific notation.
#[must_use]
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

// Positive and finite floats only; `as` saturates above u64::MAX
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn value_to_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f > 0.0)
                .map_or(0, |f| f.trunc() as u64)
        }),
        _ => 0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string")]
        text: String,
        #[serde(default, deserialize_with = "string_list")]
        list: Vec<String>,
        #[serde(default, deserialize_with = "flag")]
        on: bool,
        #[serde(default, deserialize_with = "count")]
        n: u64,
        #[serde(default, deserialize_with = "decimal")]
        amount: Decimal,
    }

    fn probe(value: serde_json::Value) -> Probe {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let p = probe(json!({}));
        assert_eq!(p.text, "");
        assert!(p.list.is_empty());
        assert!(!p.on);
        assert_eq!(p.n, 0);
        assert_eq!(p.amount, Decimal::ZERO);
    }

    #[test]
    fn test_mistyped_fields_degrade() {
        let p = probe(json!({
            "text": 42,
            "list": "shipping",
            "on": "yes",
            "n": "12",
            "amount": {"value": 3}
        }));
        assert_eq!(p.text, "");
        assert!(p.list.is_empty());
        assert!(!p.on);
        assert_eq!(p.n, 0);
        assert_eq!(p.amount, Decimal::ZERO);
    }

    #[test]
    fn test_string_list_keeps_non_empty_strings() {
        let p = probe(json!({"list": ["refund", null, 7, "", "Delivery"]}));
        assert_eq!(p.list, vec!["refund".to_string(), "Delivery".to_string()]);
    }

    #[test]
    fn test_count_truncates_and_rejects_negatives() {
        assert_eq!(probe(json!({"n": 12})).n, 12);
        assert_eq!(probe(json!({"n": 7.9})).n, 7);
        assert_eq!(probe(json!({"n": -3})).n, 0);
    }

    #[test]
    fn test_decimal_accepts_numbers_and_strings() {
        assert_eq!(probe(json!({"amount": 19.99})).amount, Decimal::new(1999, 2));
        assert_eq!(probe(json!({"amount": "5.5"})).amount, Decimal::new(55, 1));
        assert_eq!(probe(json!({"amount": "abc"})).amount, Decimal::ZERO);
    }
}
