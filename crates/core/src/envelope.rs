//! Normalization of the Placify API's response envelopes.
//!
//! The backend is not consistent about how it wraps payloads. The same kind of
//! list can arrive as any of:
//!
//! - a bare array: `[...]`
//! - keyed: `{ "jobs": [...] }`
//! - wrapped: `{ "data": [...] }`
//! - wrapped and keyed: `{ "data": { "jobs": [...] } }`
//!
//! Everything downstream of the HTTP client works on the canonical shape
//! produced here instead of sniffing envelopes itself.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Name of the wrapping field used by the backend.
const DATA_FIELD: &str = "data";

/// Errors produced while normalizing a response envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The payload matched none of the known envelope shapes.
    #[error("unexpected response shape: expected a list under \"{key}\"")]
    UnexpectedShape {
        /// The list key that was looked for.
        key: String,
    },

    /// The payload had the right shape but an element failed to deserialize.
    #[error("failed to decode \"{key}\": {source}")]
    Decode {
        /// The list key that was decoded.
        key: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Strip a single `{ "data": ... }` wrapper, if present.
///
/// Objects that carry other fields next to `data` are left untouched, since
/// in that case `data` is a regular field and not an envelope.
#[must_use]
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key(DATA_FIELD) => {
            map.remove(DATA_FIELD).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Find the list stored under `key` in any of the known envelope shapes.
///
/// # Errors
///
/// Returns [`EnvelopeError::UnexpectedShape`] if no list can be found.
pub fn list_value(value: Value, key: &str) -> Result<Vec<Value>, EnvelopeError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove(key) {
                return Ok(items);
            }
            match map.remove(DATA_FIELD) {
                Some(Value::Array(items)) => Ok(items),
                Some(Value::Object(mut inner)) => match inner.remove(key) {
                    Some(Value::Array(items)) => Ok(items),
                    _ => Err(unexpected(key)),
                },
                _ => Err(unexpected(key)),
            }
        }
        _ => Err(unexpected(key)),
    }
}

/// Extract and decode the list stored under `key`.
///
/// # Errors
///
/// Returns [`EnvelopeError::UnexpectedShape`] if no list can be found, or
/// [`EnvelopeError::Decode`] if an element does not match `T`.
pub fn extract_list<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, EnvelopeError> {
    let items = list_value(value, key)?;
    serde_json::from_value(Value::Array(items)).map_err(|source| EnvelopeError::Decode {
        key: key.to_owned(),
        source,
    })
}

fn unexpected(key: &str) -> EnvelopeError {
    EnvelopeError::UnexpectedShape {
        key: key.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unwrap_data_strips_single_wrapper() {
        assert_eq!(unwrap_data(json!({"data": {"id": 1}})), json!({"id": 1}));
        assert_eq!(unwrap_data(json!({"data": [1, 2]})), json!([1, 2]));
    }

    #[test]
    fn test_unwrap_data_leaves_other_shapes() {
        let flat = json!({"token": "t", "user": {"role": "student"}});
        assert_eq!(unwrap_data(flat.clone()), flat);

        let mixed = json!({"data": 1, "message": "ok"});
        assert_eq!(unwrap_data(mixed.clone()), mixed);
    }

    #[test]
    fn test_list_value_accepts_every_shape() {
        let expected = vec![json!({"id": "a"})];

        for shape in [
            json!([{"id": "a"}]),
            json!({"jobs": [{"id": "a"}]}),
            json!({"data": [{"id": "a"}]}),
            json!({"data": {"jobs": [{"id": "a"}]}}),
            json!({"success": true, "data": {"jobs": [{"id": "a"}], "total": 1}}),
        ] {
            assert_eq!(list_value(shape, "jobs").expect("list"), expected);
        }
    }

    #[test]
    fn test_list_value_rejects_unknown_shape() {
        let err = list_value(json!({"data": {"items": []}}), "jobs").expect_err("no jobs");
        assert!(matches!(err, EnvelopeError::UnexpectedShape { ref key } if key == "jobs"));

        assert!(list_value(json!("nope"), "jobs").is_err());
    }

    #[test]
    fn test_extract_list_decodes_elements() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Item {
            id: String,
        }

        let items: Vec<Item> =
            extract_list(json!({"data": {"jobs": [{"id": "x"}]}}), "jobs").expect("decode");
        assert_eq!(items, vec![Item { id: "x".to_owned() }]);

        let err = extract_list::<Item>(json!([{"id": 5}]), "jobs").expect_err("bad element");
        assert!(matches!(err, EnvelopeError::Decode { .. }));
    }
}
