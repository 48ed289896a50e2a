//! Query construction for the search service.
//!
//! The [`SearchQuery`] builder assembles a boolean query tree from literal
//! values and renders it, together with facet, ranking and paging settings,
//! into the flat [`QueryParams`] mapping a search request carries.

pub mod args;
pub mod builder;
pub mod expression;
pub mod facet;
pub mod params;
pub mod text;
pub mod uint;

pub use args::{ASC, ArgTree, DESC, RankArg, SortOrder};
pub use builder::{JSON, MAX_RANK_FIELDS, ResultsType, SearchQuery, XML};
pub use expression::{BoolOp, ExprHandle, ExprNode, ExpressionStore};
pub use facet::FacetSort;
pub use params::{ParamValue, QueryParams, search_path};
pub use text::{CommaEscaping, Quoting, TextLiteral};
pub use uint::UintOrRange;
