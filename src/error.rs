//! Error types for the CloudSearch query library.
//!
//! All errors are represented by the [`CloudSearchError`] enum. Errors raised by
//! the query builder are caller mistakes (consumed handles, malformed literals,
//! missing query content) and are reported at the call that violates the
//! contract, except for [`CloudSearchError::EmptyQuery`], which can only be
//! checked once the whole query has been assembled.
//!
//! # Examples
//!
//! ```
//! use cloudsearch_query::error::{CloudSearchError, Result};
//! use cloudsearch_query::query::SearchQuery;
//!
//! fn build_empty() -> Result<()> {
//!     SearchQuery::new().build()?;
//!     Ok(())
//! }
//!
//! match build_empty() {
//!     Err(CloudSearchError::EmptyQuery) => {}
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::convert::Infallible;
use std::io;

use thiserror::Error;

/// The main error type for CloudSearch query operations.
#[derive(Error, Debug)]
pub enum CloudSearchError {
    /// Neither a boolean query nor a free-text query was set.
    #[error("Empty query: at least one of 'q' or 'bq' must be set")]
    EmptyQuery,

    /// An expression handle that was never created or was already consumed.
    #[error("Invalid expression handle: {0}")]
    InvalidHandle(u64),

    /// More than the allowed number of rank fields.
    #[error("Too many rank fields: {0} given, a maximum of 10 fields and rank expressions can be specified")]
    TooManyRankFields(usize),

    /// A rank order flag that does not follow a field name.
    #[error("Invalid rank order: {0}")]
    InvalidRankOrder(String),

    /// A results type other than `json` or `xml`.
    #[error("Invalid results type '{0}': result type must be 'json' or 'xml'")]
    InvalidResultsType(String),

    /// A literal that could not be parsed.
    #[error("Malformed literal: {0}")]
    MalformedLiteral(String),

    /// A batch document that does not satisfy the upload constraints.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Client configuration errors.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Errors reported by a search or document service implementation.
    #[error("Service error: {0}")]
    Service(String),

    /// I/O errors (config files, CLI input)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with CloudSearchError.
pub type Result<T> = std::result::Result<T, CloudSearchError>;

impl From<Infallible> for CloudSearchError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl CloudSearchError {
    /// Create a new malformed literal error.
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        CloudSearchError::MalformedLiteral(msg.into())
    }

    /// Create a new invalid rank order error.
    pub fn invalid_rank_order<S: Into<String>>(msg: S) -> Self {
        CloudSearchError::InvalidRankOrder(msg.into())
    }

    /// Create a new invalid document error.
    pub fn invalid_document<S: Into<String>>(msg: S) -> Self {
        CloudSearchError::InvalidDocument(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        CloudSearchError::InvalidConfig(msg.into())
    }

    /// Create a new service error.
    pub fn service<S: Into<String>>(msg: S) -> Self {
        CloudSearchError::Service(msg.into())
    }

    /// Create a new invalid results type error.
    pub fn invalid_results_type<S: Into<String>>(value: S) -> Self {
        CloudSearchError::InvalidResultsType(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = CloudSearchError::malformed("abc");
        assert_eq!(error.to_string(), "Malformed literal: abc");

        let error = CloudSearchError::InvalidHandle(7);
        assert_eq!(error.to_string(), "Invalid expression handle: 7");

        let error = CloudSearchError::invalid_results_type("html");
        assert_eq!(
            error.to_string(),
            "Invalid results type 'html': result type must be 'json' or 'xml'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = CloudSearchError::from(io_error);

        match error {
            CloudSearchError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
