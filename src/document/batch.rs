//! Document batches for the upload endpoint.
//!
//! A batch is a JSON array of `add` and `delete` operations sent to
//! `POST /{version}/documents/batch`. Operations are validated as they are
//! added, so a batch that exists is always sendable once it is non-empty.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::document::BatchDocument;
use crate::error::{CloudSearchError, Result};

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_]{0,127}$").unwrap());
static FIELD_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_]{0,63}$").unwrap());
static LANG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]{2}$").unwrap());

/// Highest document version accepted by the service.
pub const MAX_VERSION: u64 = 4_294_967_295;

/// One operation of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BatchOperation {
    /// Add or replace a document.
    Add(BatchDocument),
    /// Delete a document.
    Delete {
        /// Document id
        id: String,
        /// Version of the deletion
        version: u64,
    },
}

impl BatchOperation {
    /// Get the document id this operation applies to.
    pub fn id(&self) -> &str {
        match self {
            BatchOperation::Add(doc) => &doc.id,
            BatchOperation::Delete { id, .. } => id,
        }
    }

    /// Get the version of this operation.
    pub fn version(&self) -> u64 {
        match self {
            BatchOperation::Add(doc) => doc.version,
            BatchOperation::Delete { version, .. } => *version,
        }
    }

    /// Check this operation against the upload constraints.
    pub fn validate(&self) -> Result<()> {
        validate_id(self.id())?;
        validate_version(self.id(), self.version())?;

        if let BatchOperation::Add(doc) = self {
            if let Some(lang) = &doc.lang
                && !LANG_PATTERN.is_match(lang)
            {
                return Err(CloudSearchError::invalid_document(format!(
                    "document '{}': lang '{lang}' must be a two-letter lowercase code",
                    doc.id
                )));
            }

            for (name, value) in &doc.fields {
                if !FIELD_NAME_PATTERN.is_match(name) {
                    return Err(CloudSearchError::invalid_document(format!(
                        "document '{}': invalid field name '{name}'",
                        doc.id
                    )));
                }
                if value.has_nested_multi() {
                    return Err(CloudSearchError::invalid_document(format!(
                        "document '{}': field '{name}' nests multi-valued values",
                        doc.id
                    )));
                }
            }
        }

        Ok(())
    }
}

fn validate_id(id: &str) -> Result<()> {
    if ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(CloudSearchError::invalid_document(format!(
            "invalid document id '{id}': expected 1-128 characters of [a-z0-9_], not starting with '_'"
        )))
    }
}

fn validate_version(id: &str, version: u64) -> Result<()> {
    if (1..=MAX_VERSION).contains(&version) {
        Ok(())
    } else {
        Err(CloudSearchError::invalid_document(format!(
            "document '{id}': version {version} outside 1..={MAX_VERSION}"
        )))
    }
}

/// An ordered batch of document operations.
///
/// ```
/// use cloudsearch_query::document::{BatchDocument, DocumentBatch};
///
/// let mut batch = DocumentBatch::new();
/// batch
///     .add(BatchDocument::builder("doc1", 1).add_text("title", "Dune").build())
///     .unwrap();
/// batch.delete("doc2", 5).unwrap();
///
/// assert_eq!(
///     batch.to_json().unwrap(),
///     r#"[{"type":"add","id":"doc1","version":1,"fields":{"title":"Dune"}},{"type":"delete","id":"doc2","version":5}]"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocumentBatch {
    operations: Vec<BatchOperation>,
}

impl DocumentBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validated operation.
    pub fn push(&mut self, operation: BatchOperation) -> Result<&mut Self> {
        operation.validate()?;
        log::trace!(
            "batch operation for '{}' v{} queued",
            operation.id(),
            operation.version()
        );
        self.operations.push(operation);
        Ok(self)
    }

    /// Append an `add` operation.
    pub fn add(&mut self, document: BatchDocument) -> Result<&mut Self> {
        self.push(BatchOperation::Add(document))
    }

    /// Append a `delete` operation.
    pub fn delete<S: Into<String>>(&mut self, id: S, version: u64) -> Result<&mut Self> {
        self.push(BatchOperation::Delete {
            id: id.into(),
            version,
        })
    }

    /// Get the queued operations.
    pub fn operations(&self) -> &[BatchOperation] {
        &self.operations
    }

    /// Number of `add` operations.
    pub fn adds(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, BatchOperation::Add(_)))
            .count()
    }

    /// Number of `delete` operations.
    pub fn deletes(&self) -> usize {
        self.operations.len() - self.adds()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Fail unless the batch has at least one operation.
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            Err(CloudSearchError::invalid_document("empty batch"))
        } else {
            Ok(())
        }
    }

    /// Serialize the batch as a compact JSON array.
    pub fn to_json(&self) -> Result<String> {
        self.ensure_not_empty()?;
        Ok(serde_json::to_string(&self.operations)?)
    }

    /// Serialize the batch as an indented JSON array.
    pub fn to_json_pretty(&self) -> Result<String> {
        self.ensure_not_empty()?;
        Ok(serde_json::to_string_pretty(&self.operations)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::field_value::FieldValue;

    #[test]
    fn test_id_validation() {
        let mut batch = DocumentBatch::new();
        assert!(batch.delete("ok_id_1", 1).is_ok());
        let too_long = "a".repeat(129);
        for bad in ["", "_leading", "Upper", "has-dash", too_long.as_str()] {
            assert!(
                matches!(batch.delete(bad, 1), Err(CloudSearchError::InvalidDocument(_))),
                "{bad:?} accepted"
            );
        }
        assert!(batch.delete("a".repeat(128), 1).is_ok());
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_version_bounds() {
        let mut batch = DocumentBatch::new();
        assert!(batch.delete("a", 0).is_err());
        assert!(batch.delete("a", MAX_VERSION + 1).is_err());
        assert!(batch.delete("a", MAX_VERSION).is_ok());
    }

    #[test]
    fn test_lang_and_field_names() {
        let mut batch = DocumentBatch::new();
        let doc = BatchDocument::builder("a", 1).lang("eng").build();
        assert!(batch.add(doc).is_err());

        let doc = BatchDocument::builder("a", 1).add_text("_title", "x").build();
        assert!(batch.add(doc).is_err());

        let doc = BatchDocument::builder("a", 1)
            .lang("en")
            .add_text("Title_2", "x")
            .build();
        assert!(batch.add(doc).is_ok());
    }

    #[test]
    fn test_nested_multi_rejected() {
        let mut doc = BatchDocument::new("a", 1);
        doc.add_field(
            "tags",
            FieldValue::Multi(vec![FieldValue::Multi(vec![FieldValue::from("x")])]),
        );
        assert!(DocumentBatch::new().add(doc).is_err());
    }

    #[test]
    fn test_empty_batch_not_serialized() {
        let batch = DocumentBatch::new();
        assert!(matches!(batch.to_json(), Err(CloudSearchError::InvalidDocument(_))));
    }

    #[test]
    fn test_counts_and_json_shape() {
        let mut batch = DocumentBatch::new();
        batch
            .add(
                BatchDocument::builder("doc1", 2)
                    .lang("fr")
                    .add_values("tags", ["a", "b"])
                    .add_uint("year", 1999)
                    .build(),
            )
            .unwrap()
            .delete("doc2", 3)
            .unwrap();

        assert_eq!(batch.adds(), 1);
        assert_eq!(batch.deletes(), 1);

        let value: serde_json::Value = serde_json::from_str(&batch.to_json().unwrap()).unwrap();
        assert_eq!(value[0]["type"], "add");
        assert_eq!(value[0]["lang"], "fr");
        assert_eq!(value[0]["fields"]["tags"][1], "b");
        assert_eq!(value[0]["fields"]["year"], 1999);
        assert_eq!(value[1]["type"], "delete");
        assert!(value[1].get("fields").is_none());
    }

    #[test]
    fn test_operation_round_trips_from_json_line() {
        let op: BatchOperation =
            serde_json::from_str(r#"{"type":"add","id":"x1","version":4,"fields":{"n":1}}"#)
                .unwrap();
        assert_eq!(op.id(), "x1");
        assert_eq!(op.version(), 4);
        assert!(op.validate().is_ok());
    }
}
