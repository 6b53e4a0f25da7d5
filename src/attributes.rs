// 🏛️ Attribute Values - Closed set of values a POI attribute can hold
//
// Attribute NAMES belong to a POI type (see schema.rs); attribute VALUES
// belong to each POI. A declared attribute without a value is `Unset`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Values stored per POI, keyed by attribute name
pub type AttributeMap = HashMap<String, AttributeValue>;

// ============================================================================
// ATTRIBUTE VALUE
// ============================================================================

/// A single attribute value
///
/// Serialized untagged, so `"open"`, `4.5`, `true` and `null` map directly to
/// `Text`, `Number`, `Boolean` and `Unset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Number(f64),
    Text(String),
    #[default]
    Unset,
}

impl AttributeValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, AttributeValue::Unset)
    }

    /// Convert an arbitrary document value into an attribute value
    ///
    /// Arrays and objects have no variant of their own and are kept as their
    /// JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AttributeValue::Unset,
            Value::Bool(b) => AttributeValue::Boolean(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => AttributeValue::Number(f),
                None => AttributeValue::Text(n.to_string()),
            },
            Value::String(s) => AttributeValue::Text(s.clone()),
            other => AttributeValue::Text(other.to_string()),
        }
    }

    /// Interpret a line typed by a user
    ///
    /// Empty input is `Unset`; `true`/`false` are booleans; anything that
    /// parses as a number is a number; the rest is text.
    pub fn parse_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return AttributeValue::Unset;
        }
        match trimmed {
            "true" => AttributeValue::Boolean(true),
            "false" => AttributeValue::Boolean(false),
            _ => match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => AttributeValue::Number(n),
                _ => AttributeValue::Text(trimmed.to_string()),
            },
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Boolean(b) => write!(f, "{}", b),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Unset => write!(f, "-"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(AttributeValue::from_json(&json!(null)), AttributeValue::Unset);
        assert_eq!(AttributeValue::from_json(&json!(true)), AttributeValue::Boolean(true));
        assert_eq!(AttributeValue::from_json(&json!(12)), AttributeValue::Number(12.0));
        assert_eq!(AttributeValue::from_json(&json!("cafe")), AttributeValue::from("cafe"));
    }

    #[test]
    fn test_from_json_compound_kept_as_text() {
        let value = AttributeValue::from_json(&json!(["a", "b"]));
        assert_eq!(value, AttributeValue::Text("[\"a\",\"b\"]".to_string()));
    }

    #[test]
    fn test_parse_input() {
        assert!(AttributeValue::parse_input("   ").is_unset());
        assert_eq!(AttributeValue::parse_input("false"), AttributeValue::Boolean(false));
        assert_eq!(AttributeValue::parse_input("4.5"), AttributeValue::Number(4.5));
        assert_eq!(AttributeValue::parse_input(" Greek "), AttributeValue::from("Greek"));
        assert_eq!(AttributeValue::parse_input("NaN"), AttributeValue::from("NaN"));
    }

    #[test]
    fn test_serde_untagged() {
        let values: Vec<AttributeValue> = serde_json::from_str(r#"[true, 3, "x", null]"#).unwrap();
        assert_eq!(
            values,
            vec![
                AttributeValue::Boolean(true),
                AttributeValue::Number(3.0),
                AttributeValue::from("x"),
                AttributeValue::Unset,
            ]
        );
        assert_eq!(serde_json::to_string(&AttributeValue::Unset).unwrap(), "null");
    }

    #[test]
    fn test_display() {
        assert_eq!(AttributeValue::Number(3.0).to_string(), "3");
        assert_eq!(AttributeValue::Unset.to_string(), "-");
    }
}
