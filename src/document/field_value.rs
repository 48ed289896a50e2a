//! Field value types for batch documents.
//!
//! The upload format accepts text and unsigned integer values; a field with
//! several values is sent as a JSON array.
//!
//! ```
//! use cloudsearch_query::document::FieldValue;
//!
//! let title = FieldValue::from("Star Wars");
//! assert_eq!(title.as_text(), Some("Star Wars"));
//!
//! let year = FieldValue::from(1977u64);
//! assert_eq!(year.as_uint(), Some(1977));
//! ```

use serde::{Deserialize, Serialize};

/// A value for one field of a batch document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Unsigned integer data
    Uint(u64),
    /// Text data
    Text(String),
    /// Several values for a multi-valued field
    Multi(Vec<FieldValue>),
}

impl FieldValue {
    /// Get the value as text if it is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an unsigned integer if it is one.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            FieldValue::Uint(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the individual values of a multi-valued field.
    pub fn as_multi(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Multi(values) => Some(values),
            _ => None,
        }
    }

    /// Check whether this value nests another multi-valued field.
    ///
    /// The upload format only allows one level of arrays.
    pub fn has_nested_multi(&self) -> bool {
        match self {
            FieldValue::Multi(values) => values
                .iter()
                .any(|v| matches!(v, FieldValue::Multi(_))),
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Uint(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Uint(u64::from(value))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Multi(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(FieldValue::from("a").as_text(), Some("a"));
        assert_eq!(FieldValue::from("a").as_uint(), None);
        assert_eq!(FieldValue::from(3u64).as_uint(), Some(3));

        let multi = FieldValue::from(vec!["a", "b"]);
        assert_eq!(multi.as_multi().map(|v| v.len()), Some(2));
        assert!(!multi.has_nested_multi());
    }

    #[test]
    fn test_untagged_json_shape() {
        let value = FieldValue::from(vec![FieldValue::from("x"), FieldValue::from(2u64)]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"["x",2]"#);

        let parsed: FieldValue = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, FieldValue::Uint(7));
        let parsed: FieldValue = serde_json::from_str(r#""seven""#).unwrap();
        assert_eq!(parsed, FieldValue::Text("seven".to_string()));
    }
}
