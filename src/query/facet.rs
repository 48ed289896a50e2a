//! Facet sort specification.

use serde::{Deserialize, Serialize};

use crate::query::args::SortOrder;

/// Sort mode for the values returned for one facet.
///
/// Obtained from [`SearchQuery::facet_sort`](crate::query::SearchQuery::facet_sort).
/// Mode methods overwrite the previous choice and return the sort itself, not
/// the query; when no mode is chosen the facet sorts by `count`.
///
/// ```
/// use cloudsearch_query::query::{SearchQuery, DESC};
///
/// let mut q = SearchQuery::new();
/// q.q("shoes");
/// q.facet_sort("brand").max("rating", DESC);
/// let params = q.build().unwrap();
/// assert_eq!(params.get_str("facet-brand-sort"), Some("-max(rating)"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSort {
    facet: String,
    mode: Option<String>,
}

impl FacetSort {
    /// Create a sort for the given facet with no mode selected.
    pub fn new<S: Into<String>>(facet: S) -> Self {
        FacetSort {
            facet: facet.into(),
            mode: None,
        }
    }

    /// Get the facet this sort applies to.
    pub fn facet(&self) -> &str {
        &self.facet
    }

    /// Sort facet values alphabetically.
    pub fn alpha(&mut self) -> &mut Self {
        self.mode = Some("alpha".to_string());
        self
    }

    /// Sort facet values by document count.
    pub fn count(&mut self) -> &mut Self {
        self.mode = Some("count".to_string());
        self
    }

    /// Sort by the maximum value of `field` among matching documents.
    pub fn max<S: AsRef<str>>(&mut self, field: S, order: SortOrder) -> &mut Self {
        self.mode = Some(aggregate("max", field.as_ref(), order));
        self
    }

    /// Sort by the sum of `field` over matching documents.
    pub fn sum<S: AsRef<str>>(&mut self, field: S, order: SortOrder) -> &mut Self {
        self.mode = Some(aggregate("sum", field.as_ref(), order));
        self
    }

    /// Check whether a mode has been chosen explicitly.
    pub fn is_set(&self) -> bool {
        self.mode.is_some()
    }

    /// Render the sort mode, defaulting to `count`.
    pub fn build(&self) -> String {
        self.mode.clone().unwrap_or_else(|| "count".to_string())
    }
}

fn aggregate(function: &str, field: &str, order: SortOrder) -> String {
    let sign = if order.is_desc() { "-" } else { "" };
    format!("{sign}{function}({field})")
}
