//! Forgiving `deserialize_with` helpers for pushed JSON.
//!
//! Front-end payloads are loosely typed: a field may be null, or carry a
//! number where text is expected. Each helper maps such a shape to a default
//! instead of failing the enclosing document. Pair every helper with
//! `#[serde(default)]` so a missing field is covered too.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::round::Scalar;

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text field. Numbers and booleans are stringified; null, arrays and
/// objects read as absent.
///
/// # Errors
/// Only if the input is not valid JSON.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(value_to_text)
}

/// Number-or-text field.
///
/// # Errors
/// Only if the input is not valid JSON.
pub fn scalar<'de, D>(deserializer: D) -> Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .map(Scalar::Int)
            .or_else(|| n.as_f64().map(Scalar::Float)),
        Value::String(s) => Some(Scalar::Text(s)),
        _ => None,
    })
}

/// Positional list: an entry that does not parse becomes `T::default()`,
/// so later entries keep their index. Anything but an array is empty.
///
/// # Errors
/// Only if the input is not valid JSON.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries
            .into_iter()
            .map(|entry| serde_json::from_value(entry).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// Batch list: entries that do not parse are dropped. Anything but an array
/// is empty.
///
/// # Errors
/// Only if the input is not valid JSON.
pub fn items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed batch entry");
                None
            }
        })
        .collect())
}

/// String-to-string map. Values that are not text-like are dropped.
///
/// # Errors
/// Only if the input is not valid JSON.
pub fn text_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| value_to_text(value).map(|v| (key, v)))
        .collect())
}

/// Boolean flag. Accepts `true`, non-zero numbers and `"true"`/`"1"`;
/// everything else is `false`.
///
/// # Errors
/// Only if the input is not valid JSON.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Doc {
        #[serde(default, deserialize_with = "text")]
        name: Option<String>,
        #[serde(default, deserialize_with = "scalar")]
        id: Option<Scalar>,
        #[serde(default, deserialize_with = "list")]
        slots: Vec<Slot>,
        #[serde(default, deserialize_with = "items")]
        batch: Vec<Slot>,
        #[serde(default, deserialize_with = "text_map")]
        labels: BTreeMap<String, String>,
        #[serde(default, deserialize_with = "flag")]
        on: bool,
    }

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Slot {
        n: u32,
    }

    fn doc(value: Value) -> Doc {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_nulls_read_as_defaults() {
        let d = doc(json!({
            "name": null, "id": null, "slots": null, "batch": null, "labels": null, "on": null
        }));
        assert_eq!(d.name, None);
        assert_eq!(d.id, None);
        assert!(d.slots.is_empty());
        assert!(d.batch.is_empty());
        assert!(d.labels.is_empty());
        assert!(!d.on);
    }

    #[test]
    fn test_numbers_become_text() {
        let d = doc(json!({"name": -1_001_234_567_890_i64, "id": 7}));
        assert_eq!(d.name.as_deref(), Some("-1001234567890"));
        assert_eq!(d.id, Some(Scalar::Int(7)));

        let d = doc(json!({"name": {"nested": 1}, "id": [1]}));
        assert_eq!(d.name, None);
        assert_eq!(d.id, None);
    }

    #[test]
    fn test_list_keeps_positions() {
        let d = doc(json!({"slots": [{"n": 1}, "junk", {"n": 3}]}));
        assert_eq!(d.slots, vec![Slot { n: 1 }, Slot::default(), Slot { n: 3 }]);
    }

    #[test]
    fn test_items_drop_bad_entries() {
        let d = doc(json!({"batch": [{"n": 1}, "junk", {"n": "x"}, {"n": 4}]}));
        assert_eq!(d.batch, vec![Slot { n: 1 }, Slot { n: 4 }]);
    }

    #[test]
    fn test_text_map_and_flag() {
        let d = doc(json!({"labels": {"a": "x", "b": 2, "c": null}, "on": "true"}));
        assert_eq!(d.labels.len(), 2);
        assert_eq!(d.labels["b"], "2");
        assert!(d.on);

        assert!(doc(json!({"on": 1})).on);
        assert!(!doc(json!({"on": "no"})).on);
    }
}
