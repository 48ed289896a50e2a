//! Documents and upload batches.

pub mod batch;
#[allow(clippy::module_inception)]
pub mod document;
pub mod field_value;

pub use batch::{BatchOperation, DocumentBatch, MAX_VERSION};
pub use document::{BatchDocument, BatchDocumentBuilder};
pub use field_value::FieldValue;
