//! # cloudsearch-query
//!
//! A query builder and client toolkit for Amazon CloudSearch (API version
//! 2011-02-01).
//!
//! ## Features
//!
//! - Composable boolean queries (`bq`) with handle-based expression trees
//! - Free-text queries, facets, ranking, thresholds and paging
//! - Deterministic parameter mapping and URL encoding
//! - Validated document batches for the upload endpoint
//! - Transport-agnostic query and document clients
//!
//! ## Example
//!
//! ```
//! use cloudsearch_query::prelude::*;
//!
//! let mut query = SearchQuery::new();
//! let title = query.field("title", "star wars");
//! let year = query.filter("year", "1977..1983").unwrap();
//! query.or(vec![title, year]).unwrap();
//! query.facet("genre").limit(0, 10);
//!
//! let params = query.build().unwrap();
//! assert_eq!(
//!     params.get_str("bq"),
//!     Some("(or (field title 'star wars') (filter year 1977..1983))")
//! );
//! assert_eq!(params.get_int("size"), Some(10));
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod query;

pub mod prelude {
    pub use crate::client::{DocClient, DocumentService, QueryClient, QueryRequest, SearchService};
    pub use crate::config::ClientConfig;
    pub use crate::document::{BatchDocument, BatchOperation, DocumentBatch, FieldValue};
    pub use crate::error::{CloudSearchError, Result};
    pub use crate::query::{
        ASC, DESC, ExprHandle, FacetSort, QueryParams, RankArg, ResultsType, SearchQuery,
        SortOrder, TextLiteral, UintOrRange,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
