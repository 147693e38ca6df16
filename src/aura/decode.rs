//! Response decoding for the Aura API.
//!
//! Bodies are parsed into a JSON tree whose numbers are normalized: a number
//! becomes a 64-bit integer when that is lossless and a string otherwise, so a
//! large node or relationship count never silently turns into a rounded float.
//! Typed views are then taken from the normalized tree.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, AuraError, Result};

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Error envelope: `{"errors": [{"message": ..., "reason": ...}]}`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// Reported errors, most relevant first.
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

/// One entry of an error envelope.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Machine-readable reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Offending request field, if any.
    #[serde(default)]
    pub field: Option<String>,
}

/// Parses a raw body into a normalized JSON tree.
///
/// An empty body decodes to `null`.
///
/// # Errors
///
/// Returns an error if the body is not valid JSON.
pub fn decode(raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ApiError::invalid_response(format!("Malformed JSON body: {e}")))?;

    Ok(normalize_numbers(value))
}

/// Recursively rewrites numbers to `i64` when lossless, else to their literal text.
///
/// Only literals that parse as a 64-bit integer become integers: `12.0` and
/// `9007199254740993.0` stay strings rather than passing through a float.
#[must_use]
pub fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(int) => Value::from(int),
            None => Value::String(number.to_string()),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize_numbers(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Returns true if the tree carries a non-empty error envelope.
#[must_use]
pub fn has_errors(tree: &Value) -> bool {
    tree.get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| !errors.is_empty())
}

/// Extracts the error envelope, if the tree has one.
#[must_use]
pub fn error_envelope(tree: &Value) -> Option<ErrorEnvelope> {
    if !has_errors(tree) {
        return None;
    }
    ErrorEnvelope::deserialize(tree).ok()
}

/// Returns the single diagnostic string for an error body.
///
/// Only the first error is used; its message wins over its reason. Bodies
/// without an envelope are rendered verbatim.
#[must_use]
pub fn first_error_message(tree: &Value) -> String {
    error_envelope(tree)
        .and_then(|envelope| envelope.errors.into_iter().next())
        .and_then(|first| first.message.or(first.reason))
        .unwrap_or_else(|| match tree {
            Value::Null => String::from("no error details returned"),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
}

/// Takes the typed `data` member of a success envelope.
///
/// # Errors
///
/// Returns an error if `data` is missing or does not match `T`.
pub fn data<T: DeserializeOwned>(tree: Value) -> Result<T> {
    serde_json::from_value::<Envelope<T>>(tree)
        .map(|envelope| envelope.data)
        .map_err(|e| AuraError::Api(ApiError::invalid_response(format!("Unexpected payload: {e}"))))
}

/// Deserializes an optional integer that may arrive as a number or a numeric string.
///
/// # Errors
///
/// Returns an error if the value is neither.
pub fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("{number} is not a 64-bit integer"))),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("'{text}' is not an integer"))),
        Some(other) => Err(de::Error::custom(format!("expected integer, got {other}"))),
    }
}

/// Deserializes an optional boolean that may arrive as `true`/`false` or as a string.
///
/// # Errors
///
/// Returns an error if the value is neither.
pub fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(flag)),
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(de::Error::custom(format!("'{text}' is not a boolean"))),
        },
        Some(other) => Err(de::Error::custom(format!("expected boolean, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalizes_numbers_uniformly() {
        let tree = decode(
            r#"{"data": {"node_count": 12, "whole": 12.0, "big": 18446744073709551615,
                "ratio": 0.5, "nested": [1, -2, {"deep": 3}], "label": "7"}}"#,
        )
        .unwrap();

        assert_eq!(tree["data"]["node_count"], json!(12));
        assert_eq!(tree["data"]["whole"], json!("12.0"));
        assert_eq!(tree["data"]["big"], json!("18446744073709551615"));
        assert_eq!(tree["data"]["ratio"], json!("0.5"));
        assert_eq!(tree["data"]["nested"], json!([1, -2, {"deep": 3}]));
        assert_eq!(tree["data"]["label"], json!("7"));
    }

    #[test]
    fn test_counts_beyond_float_precision_stay_exact() {
        let tree = decode(
            r#"{"n": 9007199254740993.0, "m": 9007199254740993, "e": 1e3}"#,
        )
        .unwrap();

        assert_eq!(tree["n"], json!("9007199254740993.0"));
        assert_eq!(tree["m"], json!(9_007_199_254_740_993_i64));
        assert_eq!(tree["e"], json!("1e3"));
    }

    #[test]
    fn test_empty_and_malformed_bodies() {
        assert_eq!(decode("").unwrap(), Value::Null);
        assert_eq!(decode("  \n").unwrap(), Value::Null);

        let err = decode("{not json").unwrap_err();
        assert!(matches!(err, AuraError::Api(ApiError::InvalidResponse { .. })));
    }

    #[test]
    fn test_error_envelope_first_message_only() {
        let tree = json!({"errors": [
            {"message": "Instance is not running", "reason": "invalid-state"},
            {"message": "second", "reason": "ignored"}
        ]});
        assert!(has_errors(&tree));
        assert_eq!(first_error_message(&tree), "Instance is not running");
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        let tree = json!({"errors": [{"reason": "not-found"}]});
        assert_eq!(first_error_message(&tree), "not-found");

        let tree = json!({"errors": []});
        assert!(!has_errors(&tree));
        assert_eq!(first_error_message(&Value::Null), "no error details returned");
        assert_eq!(first_error_message(&json!("Bad Gateway")), "Bad Gateway");
    }

    #[test]
    fn test_data_extraction() {
        #[derive(Deserialize)]
        struct Item {
            id: String,
            #[serde(default, deserialize_with = "lenient_i64")]
            count: Option<i64>,
        }

        let item: Item = data(json!({"data": {"id": "a", "count": "42"}})).unwrap();
        assert_eq!(item.id, "a");
        assert_eq!(item.count, Some(42));

        let missing: Result<Item> = data(json!({"errors": []}));
        assert!(missing.is_err());
    }
}
