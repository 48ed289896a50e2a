//! Documents for the batch upload format.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::document::field_value::FieldValue;

/// A document to be added to the index.
///
/// Every document carries an id and a version; the service keeps the
/// highest version it has seen for an id. Field names and values are checked
/// when the document is added to a [`DocumentBatch`](crate::document::DocumentBatch).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct BatchDocument {
    /// Document id
    pub id: String,
    /// Document version
    pub version: u64,
    /// Optional two-letter language code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// The field values for this document, in insertion order
    #[serde(default)]
    pub fields: IndexMap<String, FieldValue>,
}

impl BatchDocument {
    /// Create a new document with no fields.
    pub fn new<S: Into<String>>(id: S, version: u64) -> Self {
        BatchDocument {
            id: id.into(),
            version,
            lang: None,
            fields: IndexMap::new(),
        }
    }

    /// Add a field value to the document, replacing an earlier value.
    pub fn add_field<S: Into<String>>(&mut self, name: S, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Get a field value from the document.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Create a builder for constructing documents.
    pub fn builder<S: Into<String>>(id: S, version: u64) -> BatchDocumentBuilder {
        BatchDocumentBuilder::new(id, version)
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug)]
pub struct BatchDocumentBuilder {
    document: BatchDocument,
}

impl BatchDocumentBuilder {
    /// Create a new document builder.
    pub fn new<S: Into<String>>(id: S, version: u64) -> Self {
        BatchDocumentBuilder {
            document: BatchDocument::new(id, version),
        }
    }

    /// Set the document language.
    pub fn lang<S: Into<String>>(mut self, lang: S) -> Self {
        self.document.lang = Some(lang.into());
        self
    }

    /// Add a text field to the document.
    pub fn add_text<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.document
            .add_field(name, FieldValue::Text(value.into()));
        self
    }

    /// Add an unsigned integer field to the document.
    pub fn add_uint<S: Into<String>>(mut self, name: S, value: u64) -> Self {
        self.document.add_field(name, FieldValue::Uint(value));
        self
    }

    /// Add a multi-valued field to the document.
    pub fn add_values<S, I, V>(mut self, name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.document.add_field(name, FieldValue::Multi(values));
        self
    }

    /// Build the document.
    pub fn build(self) -> BatchDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let doc = BatchDocument::builder("tt0076759", 3)
            .lang("en")
            .add_text("title", "Star Wars")
            .add_uint("year", 1977)
            .add_values("genre", ["Action", "Sci-Fi"])
            .build();

        assert_eq!(doc.id, "tt0076759");
        assert_eq!(doc.version, 3);
        assert_eq!(doc.lang.as_deref(), Some("en"));
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get_field("year"), Some(&FieldValue::Uint(1977)));
        assert_eq!(
            doc.fields.keys().collect::<Vec<_>>(),
            vec!["title", "year", "genre"]
        );
    }

    #[test]
    fn test_later_value_replaces_earlier() {
        let doc = BatchDocument::builder("a", 1)
            .add_text("title", "one")
            .add_text("title", "two")
            .build();
        assert_eq!(doc.get_field("title").and_then(FieldValue::as_text), Some("two"));
    }
}
