//! Event attribute values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute map of an event, ordered by key so encodings are stable.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Value of a single event attribute.
///
/// The variant is not written to the wire, only the payload shape:
///
/// | Variant | JSON |
/// |---|---|
/// | `String(Some(s))` | `"s"` |
/// | `String(None)` | `null` |
/// | `StringList(v)` | `["a", "b"]` |
/// | `Number(n)` | `9.99` |
///
/// Decoding therefore sniffs the shape in a fixed order: number first, then
/// list of strings, then nullable string. A JSON string is never read as a
/// number, and `null` always comes back as `String(None)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    // Declaration order is the decode priority.
    Number(f64),
    StringList(Vec<String>),
    String(Option<String>),
}

impl AttributeValue {
    /// `false` only for NaN and infinite numbers, which JSON cannot carry.
    pub fn is_encodable(&self) -> bool {
        match self {
            AttributeValue::Number(n) => n.is_finite(),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(Some(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::StringList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::String(None))
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(Some(value))
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(Some(value.to_string()))
    }
}

impl From<Option<String>> for AttributeValue {
    fn from(value: Option<String>) -> Self {
        AttributeValue::String(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        AttributeValue::StringList(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(raw: serde_json::Value) -> AttributeValue {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_wire_shapes() {
        assert_eq!(
            serde_json::to_value(AttributeValue::from("en_US")).unwrap(),
            json!("en_US")
        );
        assert_eq!(
            serde_json::to_value(AttributeValue::String(None)).unwrap(),
            json!(null)
        );
        assert_eq!(
            serde_json::to_value(AttributeValue::from(vec!["p1".to_string(), "p2".to_string()]))
                .unwrap(),
            json!(["p1", "p2"])
        );
        assert_eq!(
            serde_json::to_value(AttributeValue::from(9.99)).unwrap(),
            json!(9.99)
        );
    }

    #[test]
    fn test_decode_priority() {
        assert_eq!(decode(json!(12)), AttributeValue::Number(12.0));
        assert_eq!(decode(json!(-0.5)), AttributeValue::Number(-0.5));
        assert_eq!(
            decode(json!(["a"])),
            AttributeValue::StringList(vec!["a".to_string()])
        );
        assert_eq!(decode(json!([])), AttributeValue::StringList(Vec::new()));
        assert_eq!(decode(json!(null)), AttributeValue::String(None));
    }

    #[test]
    fn test_numeric_looking_string_stays_a_string() {
        assert_eq!(decode(json!("42")), AttributeValue::from("42"));
        assert_eq!(decode(json!("9.99")), AttributeValue::from("9.99"));
    }

    #[test]
    fn test_values_round_trip() {
        let values = vec![
            AttributeValue::from("checkout"),
            AttributeValue::from(String::new()),
            AttributeValue::StringList(vec!["p1".into(), "p2".into(), "p3".into()]),
            AttributeValue::Number(0.0),
            AttributeValue::Number(1_234_567.25),
            AttributeValue::String(None),
        ];

        for value in values {
            let encoded = serde_json::to_string(&value).unwrap();
            let decoded: AttributeValue = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, value, "round trip of {encoded}");
        }
    }

    #[test]
    fn test_unsupported_shapes_fail_to_decode() {
        assert!(serde_json::from_value::<AttributeValue>(json!(["a", 1])).is_err());
        assert!(serde_json::from_value::<AttributeValue>(json!({ "a": "b" })).is_err());
        assert!(serde_json::from_value::<AttributeValue>(json!(true)).is_err());
    }

    #[test]
    fn test_accessors() {
        let list = AttributeValue::from(vec!["x".to_string()]);
        assert_eq!(list.as_list(), Some(&["x".to_string()][..]));
        assert_eq!(list.as_str(), None);

        assert_eq!(AttributeValue::from(3.5).as_number(), Some(3.5));
        assert_eq!(AttributeValue::from("s").as_str(), Some("s"));
        assert!(AttributeValue::from(None::<String>).is_null());
    }

    #[test]
    fn test_is_encodable() {
        assert!(AttributeValue::Number(1.0).is_encodable());
        assert!(!AttributeValue::Number(f64::NAN).is_encodable());
        assert!(!AttributeValue::Number(f64::INFINITY).is_encodable());
        assert!(AttributeValue::String(None).is_encodable());
    }
}
