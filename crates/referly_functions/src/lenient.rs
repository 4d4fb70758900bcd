//! Tolerant number and list fields
//!
//! Model replies and form posts put numbers in strings (`"60000"`,
//! `"$60,000"`) about as often as not, and send `null` for lists they
//! have nothing to put in.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a JSON value as a number, if it reasonably is one
pub(crate) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, ',' | '$' | '£' | '€' | ' ' | '%'))
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// `deserialize_with` helper for `Option<f64>`: numbers, numeric strings, or null
pub(crate) fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number))
}

/// `deserialize_with` helper for `Vec<T>`: `null` or a non-array becomes empty,
/// and entries that do not fit `T` are dropped
pub(crate) fn vec_or_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Lists {
        #[serde(default, deserialize_with = "vec_or_default")]
        items: Vec<String>,
    }

    fn items(json: Value) -> Vec<String> {
        serde_json::from_value::<Lists>(json).unwrap().items
    }

    #[test]
    fn lists_tolerate_null_and_junk() {
        assert!(items(json!({"items": null})).is_empty());
        assert!(items(json!({})).is_empty());
        assert!(items(json!({"items": "Rust"})).is_empty());
        assert_eq!(items(json!({"items": ["a", null, 3, "b"]})), vec!["a", "b"]);
    }

    #[test]
    fn accepts_common_shapes() {
        assert_eq!(number(&json!(5)), Some(5.0));
        assert_eq!(number(&json!("60000")), Some(60000.0));
        assert_eq!(number(&json!("$60,000")), Some(60000.0));
        assert_eq!(number(&json!("72%")), Some(72.0));
        assert_eq!(number(&json!("senior")), None);
        assert_eq!(number(&json!(null)), None);
        assert_eq!(number(&json!([1])), None);
    }
}
