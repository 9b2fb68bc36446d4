//! Lenient numeric deserializers
//!
//! The API is not strict about number encoding: values arrive as JSON
//! numbers, numeric strings, empty strings or null.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Missing or unreadable numbers become `0.0`
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value).unwrap_or(0.0))
}

/// Missing or unreadable numbers become `None`
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "f64_or_zero")]
        pages: f64,
        #[serde(default, deserialize_with = "opt_f64")]
        age: Option<f64>,
    }

    #[test]
    fn test_accepts_numbers_and_strings() {
        let p: Probe = serde_json::from_str(r#"{"pages": "12", "age": 40}"#).unwrap();
        assert_eq!(p.pages, 12.0);
        assert_eq!(p.age, Some(40.0));
    }

    #[test]
    fn test_missing_and_garbage() {
        let p: Probe = serde_json::from_str(r#"{"age": ""}"#).unwrap();
        assert_eq!(p.pages, 0.0);
        assert_eq!(p.age, None);

        let p: Probe = serde_json::from_str(r#"{"pages": null, "age": "old"}"#).unwrap();
        assert_eq!(p.pages, 0.0);
        assert_eq!(p.age, None);
    }
}
