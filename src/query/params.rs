//! The flat parameter mapping produced by a built query.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single parameter value: text or a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A text value.
    Text(String),
    /// An integer value (`size`, `start`, `facet-*-top-n`).
    Int(u64),
}

impl ParamValue {
    /// Get the text value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Int(_) => None,
        }
    }

    /// Get the integer value, if this is an integer.
    pub fn as_int(&self) -> Option<u64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            ParamValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Int(value)
    }
}

/// Insertion-ordered mapping from parameter name to value.
///
/// This is what a search service receives; it is encoded as the URL query of
/// a `GET /{version}/search` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    params: IndexMap<String, ParamValue>,
}

impl QueryParams {
    /// Create an empty mapping.
    pub fn new() -> Self {
        QueryParams {
            params: IndexMap::new(),
        }
    }

    /// Insert or replace a parameter.
    pub fn insert<K: Into<String>, V: Into<ParamValue>>(&mut self, key: K, value: V) {
        self.params.insert(key.into(), value.into());
    }

    /// Get a parameter.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Get a text parameter.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Get an integer parameter.
    pub fn get_int(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(ParamValue::as_int)
    }

    /// Check whether a parameter is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Parameter names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Percent-encode as `key=value&key=value`, in mapping order.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    urlencoding::encode(k),
                    urlencoding::encode(&v.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<'a> IntoIterator for &'a QueryParams {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = indexmap::map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Request path of the search operation for an API version.
pub fn search_path(api_version: &str) -> String {
    format!("/{api_version}/search")
}
