//! The query builder facade.
//!
//! A [`SearchQuery`] accumulates boolean expressions, the free-text query,
//! facet settings, ranking, result shaping and paging, and renders them into
//! the flat [`QueryParams`] mapping sent to the search service:
//!
//! ```
//! use cloudsearch_query::query::SearchQuery;
//!
//! let mut q = SearchQuery::new();
//! let title = q.field("title", "star wars");
//! let public = q.filter("public", 1u64).unwrap();
//! let year = q.filter("year", 1990u64..).unwrap();
//! let timeless = q.filter("timeless", true).unwrap();
//! let when = q.or([year, timeless]).unwrap();
//! q.and([title, public, when]).unwrap();
//! q.facet("genre");
//!
//! let params = q.build().unwrap();
//! assert_eq!(
//!     params.get_str("bq"),
//!     Some("(and (field title 'star wars') (filter public 1) (or (filter year 1990..) (filter timeless 1)))")
//! );
//! assert_eq!(params.get_str("facet"), Some("genre"));
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{CloudSearchError, Result};
use crate::query::args::{ArgTree, RankArg};
use crate::query::expression::{BoolOp, ExprHandle, ExprNode, ExpressionStore};
use crate::query::facet::FacetSort;
use crate::query::params::QueryParams;
use crate::query::text::{CommaEscaping, Quoting, TextLiteral};
use crate::query::uint::UintOrRange;

/// Maximum number of entries in the `rank` parameter.
pub const MAX_RANK_FIELDS: usize = 10;

/// Response format requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsType {
    /// `json`
    Json,
    /// `xml`
    Xml,
}

/// `json` results.
pub const JSON: ResultsType = ResultsType::Json;
/// `xml` results.
pub const XML: ResultsType = ResultsType::Xml;

impl ResultsType {
    /// Get the wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            ResultsType::Json => "json",
            ResultsType::Xml => "xml",
        }
    }
}

impl fmt::Display for ResultsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultsType {
    type Err = CloudSearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(ResultsType::Json),
            "xml" => Ok(ResultsType::Xml),
            other => Err(CloudSearchError::invalid_results_type(other)),
        }
    }
}

impl TryFrom<&str> for ResultsType {
    type Error = CloudSearchError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl TryFrom<String> for ResultsType {
    type Error = CloudSearchError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Builder for one search request.
///
/// A builder is owned by a single caller for the lifetime of the query.
/// [`build`](Self::build) does not consume any state, so it may be called
/// repeatedly while the query is being refined.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    expressions: ExpressionStore,
    q: Option<String>,
    facets: IndexSet<String>,
    facet_constraints: IndexMap<String, Vec<String>>,
    facet_sorts: IndexMap<String, FacetSort>,
    facet_top_n: IndexMap<String, u64>,
    rank_expressions: IndexMap<String, String>,
    ranks: Vec<String>,
    results_type: Option<ResultsType>,
    return_fields: IndexSet<String>,
    size: Option<u64>,
    start: Option<u64>,
    thresholds: IndexMap<String, String>,
}

impl SearchQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a value as a [`TextLiteral`], passing existing literals through.
    pub fn text<T: Into<TextLiteral>>(value: T) -> TextLiteral {
        value.into()
    }

    /// Wrap a value as a [`UintOrRange`], passing existing values through.
    pub fn uint<V>(value: V) -> Result<UintOrRange>
    where
        V: TryInto<UintOrRange>,
        CloudSearchError: From<V::Error>,
    {
        Ok(value.try_into()?)
    }

    // ----- boolean expressions -----

    /// Match a quoted text value against the index's default search field.
    pub fn default_field<T: Into<TextLiteral>>(&mut self, value: T) -> ExprHandle {
        let value = value.into().build();
        self.expressions.insert(ExprNode::Text { value })
    }

    /// `(field <name> '<value>')`
    pub fn field<S, T>(&mut self, field: S, value: T) -> ExprHandle
    where
        S: Into<String>,
        T: Into<TextLiteral>,
    {
        let value = value.into().build();
        self.expressions.insert(ExprNode::Field {
            field: field.into(),
            value,
        })
    }

    /// `(filter <name> <uint or range>)`
    pub fn filter<S, V>(&mut self, field: S, value: V) -> Result<ExprHandle>
    where
        S: Into<String>,
        V: TryInto<UintOrRange>,
        CloudSearchError: From<V::Error>,
    {
        let value: UintOrRange = value.try_into()?;
        Ok(self.expressions.insert(ExprNode::Filter {
            field: field.into(),
            value: value.build(),
        }))
    }

    /// Combine expressions with `and`, consuming their handles.
    pub fn and<A: Into<ArgTree<ExprHandle>>>(&mut self, children: A) -> Result<ExprHandle> {
        self.combine(BoolOp::And, children.into())
    }

    /// Combine expressions with `or`, consuming their handles.
    pub fn or<A: Into<ArgTree<ExprHandle>>>(&mut self, children: A) -> Result<ExprHandle> {
        self.combine(BoolOp::Or, children.into())
    }

    /// Negate an expression, consuming its handle.
    pub fn not(&mut self, child: ExprHandle) -> Result<ExprHandle> {
        self.expressions.combine(BoolOp::Not, &[child])
    }

    fn combine(&mut self, op: BoolOp, children: ArgTree<ExprHandle>) -> Result<ExprHandle> {
        let handles = children.flatten();
        let handle = self.expressions.combine(op, &handles)?;
        log::debug!(
            "combined {} expression(s) with '{}' into {handle}",
            handles.len(),
            op.as_str()
        );
        Ok(handle)
    }

    /// Remove a live expression and return it.
    pub fn delete_exp(&mut self, handle: ExprHandle) -> Result<ExprNode> {
        self.expressions.take(handle)
    }

    /// Get a live expression.
    pub fn expression(&self, handle: ExprHandle) -> Option<&ExprNode> {
        self.expressions.get(handle)
    }

    /// Number of live top-level expressions.
    pub fn expression_count(&self) -> usize {
        self.expressions.len()
    }

    /// Render the boolean query (`bq`) from the live expressions.
    pub fn boolean_query(&self) -> Option<String> {
        self.expressions.render()
    }

    // ----- free text -----

    /// Set the free-text query. The value is trimmed and sent unquoted.
    pub fn q<T: Into<TextLiteral>>(&mut self, query: T) -> &mut Self {
        self.q = Some(query.into().build_unquoted());
        self
    }

    fn text_query(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.is_empty())
    }

    // ----- facets -----

    /// Request facet counts for the given fields. Repeated names are ignored.
    pub fn facet<A: Into<ArgTree<String>>>(&mut self, names: A) -> &mut Self {
        self.facets.extend(names.into().flatten());
        self
    }

    /// Remove the named facets and their constraints, sorts and top-N settings.
    ///
    /// An empty list removes all facet state.
    pub fn delete_facets<A: Into<ArgTree<String>>>(&mut self, names: A) -> &mut Self {
        let names = names.into().flatten();
        if names.is_empty() {
            return self.delete_all_facets();
        }

        for name in &names {
            self.facets.shift_remove(name);
            self.facet_constraints.shift_remove(name);
            self.facet_sorts.shift_remove(name);
            self.facet_top_n.shift_remove(name);
        }
        self
    }

    /// Remove all facet state.
    pub fn delete_all_facets(&mut self) -> &mut Self {
        self.facets.clear();
        self.facet_constraints.clear();
        self.facet_sorts.clear();
        self.facet_top_n.clear();
        self
    }

    /// Restrict a facet to the given unsigned values or ranges.
    pub fn facet_constraints_uint<S, I, V>(&mut self, facet: S, constraints: I) -> Result<&mut Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: TryInto<UintOrRange>,
        CloudSearchError: From<V::Error>,
    {
        let rendered = constraints
            .into_iter()
            .map(|c| -> Result<String> {
                let value: UintOrRange = c.try_into()?;
                Ok(value.build())
            })
            .collect::<Result<Vec<_>>>()?;
        self.facet_constraints.insert(facet.into(), rendered);
        Ok(self)
    }

    /// Restrict a facet to the given string values.
    ///
    /// Values are quoted and their commas escaped, since constraints are
    /// joined with commas.
    pub fn facet_constraints_str<S, I, T>(&mut self, facet: S, constraints: I) -> &mut Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<TextLiteral>,
    {
        let rendered = constraints
            .into_iter()
            .map(|c| c.into().build_with(Quoting::Quote, CommaEscaping::Escape))
            .collect();
        self.facet_constraints.insert(facet.into(), rendered);
        self
    }

    /// Start a sort specification for a facet, replacing any earlier one.
    pub fn facet_sort<S: Into<String>>(&mut self, facet: S) -> &mut FacetSort {
        let facet = facet.into();
        let sort = FacetSort::new(facet.clone());
        let (index, _) = self.facet_sorts.insert_full(facet, sort);
        &mut self.facet_sorts[index]
    }

    /// Limit the number of values returned for a facet. Values below 1 become 1.
    pub fn facet_top_n<S: Into<String>>(&mut self, facet: S, n: i64) -> &mut Self {
        self.facet_top_n.insert(facet.into(), n.max(1) as u64);
        self
    }

    // ----- ranking -----

    /// Replace the ranking order.
    ///
    /// Arguments are positional: a name, optionally followed by an order flag.
    /// Names without a flag sort ascending; descending names are sent with a
    /// `-` prefix. Fails without changing the current ranking if more than
    /// [`MAX_RANK_FIELDS`] names result, or if an order flag does not follow a
    /// name.
    pub fn rank<A: Into<ArgTree<RankArg>>>(&mut self, args: A) -> Result<&mut Self> {
        let args = args.into().flatten();
        let mut ranks = Vec::with_capacity(args.len());

        let mut iter = args.into_iter().peekable();
        while let Some(arg) = iter.next() {
            let name = match arg {
                RankArg::Name(name) => name,
                RankArg::Order(order) => {
                    return Err(CloudSearchError::invalid_rank_order(format!(
                        "rank order '{order:?}' does not follow a field name"
                    )));
                }
            };

            let desc = match iter.peek() {
                Some(RankArg::Order(order)) => {
                    let desc = order.is_desc();
                    iter.next();
                    desc
                }
                _ => false,
            };

            ranks.push(if desc { format!("-{name}") } else { name });
        }

        if ranks.len() > MAX_RANK_FIELDS {
            return Err(CloudSearchError::TooManyRankFields(ranks.len()));
        }

        self.ranks = ranks;
        Ok(self)
    }

    /// Define a named rank expression, sent as `rank-<name>`.
    pub fn define_rank<S, E>(&mut self, name: S, expression: E) -> &mut Self
    where
        S: Into<String>,
        E: Into<String>,
    {
        self.rank_expressions.insert(name.into(), expression.into());
        self
    }

    /// Set a threshold on a rank expression, sent as `t-<name>`.
    pub fn threshold<S, V>(&mut self, rank_name: S, range: V) -> Result<&mut Self>
    where
        S: Into<String>,
        V: TryInto<UintOrRange>,
        CloudSearchError: From<V::Error>,
    {
        let range: UintOrRange = range.try_into()?;
        self.thresholds.insert(rank_name.into(), range.build());
        Ok(self)
    }

    // ----- result shaping -----

    /// Set the response format; only `json` and `xml` are accepted.
    pub fn results_type<T>(&mut self, results_type: T) -> Result<&mut Self>
    where
        T: TryInto<ResultsType>,
        CloudSearchError: From<T::Error>,
    {
        self.results_type = Some(results_type.try_into()?);
        Ok(self)
    }

    /// Replace the fields returned with each hit.
    pub fn return_fields<A: Into<ArgTree<String>>>(&mut self, fields: A) -> &mut Self {
        self.return_fields = fields.into().flatten().into_iter().collect();
        self
    }

    /// Append a returned field unless it is already requested.
    pub fn add_return_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.return_fields.insert(field.into());
        self
    }

    /// Set the number of hits to return. Negative values become 0.
    pub fn size(&mut self, size: i64) -> &mut Self {
        self.size = Some(size.max(0) as u64);
        self
    }

    /// Set the offset of the first hit. Negative values become 0.
    pub fn start(&mut self, start: i64) -> &mut Self {
        self.start = Some(start.max(0) as u64);
        self
    }

    /// Set `start` and `size` together, in SQL `LIMIT <start>, <size>` order.
    pub fn limit(&mut self, start: i64, size: i64) -> &mut Self {
        self.start(start);
        self.size(size)
    }

    // ----- rendering -----

    /// Render the parameter mapping.
    ///
    /// Fails with [`CloudSearchError::EmptyQuery`] when there is neither a live
    /// boolean expression nor a free-text query.
    pub fn build(&self) -> Result<QueryParams> {
        let bq = self.expressions.render();
        let q = self.text_query();
        if bq.is_none() && q.is_none() {
            return Err(CloudSearchError::EmptyQuery);
        }

        let mut params = QueryParams::new();

        if let Some(bq) = bq {
            params.insert("bq", bq);
        }

        if !self.facets.is_empty() {
            params.insert("facet", join(self.facets.iter()));
        }

        for (facet, constraints) in &self.facet_constraints {
            params.insert(format!("facet-{facet}-constraints"), constraints.join(","));
        }

        for (facet, sort) in &self.facet_sorts {
            params.insert(format!("facet-{facet}-sort"), sort.build());
        }

        for (facet, n) in &self.facet_top_n {
            params.insert(format!("facet-{facet}-top-n"), *n);
        }

        if let Some(q) = q {
            params.insert("q", q);
        }

        for (name, expression) in &self.rank_expressions {
            params.insert(format!("rank-{name}"), expression.as_str());
        }

        if !self.ranks.is_empty() {
            params.insert("rank", self.ranks.join(","));
        }

        if let Some(results_type) = self.results_type {
            params.insert("results-type", results_type.as_str());
        }

        if !self.return_fields.is_empty() {
            params.insert("return-fields", join(self.return_fields.iter()));
        }

        if let Some(size) = self.size {
            params.insert("size", size);
        }

        if let Some(start) = self.start {
            params.insert("start", start);
        }

        for (rank_name, range) in &self.thresholds {
            params.insert(format!("t-{rank_name}"), range.as_str());
        }

        log::debug!(
            "built query with {} parameter(s) from {} top-level expression(s)",
            params.len(),
            self.expressions.len()
        );

        Ok(params)
    }
}

fn join<'a, I: Iterator<Item = &'a String>>(items: I) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::args::{ASC, DESC};

    fn with_field() -> SearchQuery {
        let mut q = SearchQuery::new();
        q.field("field1", "query");
        q
    }

    #[test]
    fn test_empty_query_rejected() {
        let q = SearchQuery::new();
        assert!(matches!(q.build(), Err(CloudSearchError::EmptyQuery)));
    }

    #[test]
    fn test_blank_text_query_does_not_count() {
        let mut q = SearchQuery::new();
        q.q("   ");
        assert!(matches!(q.build(), Err(CloudSearchError::EmptyQuery)));

        q.q("x");
        assert_eq!(q.build().unwrap().get_str("q"), Some("x"));
    }

    #[test]
    fn test_text_query_is_unquoted() {
        let mut q = SearchQuery::new();
        q.q(" it's ");
        let params = q.build().unwrap();
        assert_eq!(params.get_str("q"), Some("it's"));
        assert!(!params.contains_key("bq"));
    }

    #[test]
    fn test_default_field_renders_bare() {
        let mut q = SearchQuery::new();
        let a = q.default_field("star");
        let b = q.field("title", "wars");
        q.or([a, b]).unwrap();
        assert_eq!(
            q.build().unwrap().get_str("bq"),
            Some("(or 'star' (field title 'wars'))")
        );
    }

    #[test]
    fn test_consumed_handle_rejected() {
        let mut q = SearchQuery::new();
        let a = q.field("a", "x");
        let b = q.field("b", "y");
        q.or([a, b]).unwrap();

        assert!(matches!(q.not(a), Err(CloudSearchError::InvalidHandle(_))));
        assert!(matches!(q.and(vec![b]), Err(CloudSearchError::InvalidHandle(_))));
        assert!(matches!(q.delete_exp(a), Err(CloudSearchError::InvalidHandle(_))));
    }

    #[test]
    fn test_handle_from_other_query_rejected() {
        let mut other = SearchQuery::new();
        let foreign = other.field("a", "x");

        let mut q = SearchQuery::new();
        let own = q.field("b", "y");
        assert_eq!(foreign.id(), own.id());

        assert!(matches!(q.not(foreign), Err(CloudSearchError::InvalidHandle(_))));
        assert!(matches!(q.delete_exp(foreign), Err(CloudSearchError::InvalidHandle(_))));
        assert_eq!(q.build().unwrap().get_str("bq"), Some("(field b 'y')"));
        assert_eq!(other.build().unwrap().get_str("bq"), Some("(field a 'x')"));
    }

    #[test]
    fn test_delete_exp_removes_from_query() {
        let mut q = SearchQuery::new();
        let a = q.field("a", "x");
        q.field("b", "y");
        q.delete_exp(a).unwrap();
        assert_eq!(q.build().unwrap().get_str("bq"), Some("(field b 'y')"));
    }

    #[test]
    fn test_rank_replaces_previous() {
        let mut q = with_field();
        q.rank(vec!["a", "b"]).unwrap();
        q.rank(crate::rank_args!["c", DESC]).unwrap();
        assert_eq!(q.build().unwrap().get_str("rank"), Some("-c"));
    }

    #[test]
    fn test_rank_limit_keeps_previous_state() {
        let mut q = with_field();
        q.rank(vec!["keep"]).unwrap();

        let names: Vec<String> = (0..11).map(|i| format!("f{i}")).collect();
        let args: Vec<RankArg> = names.into_iter().map(RankArg::from).collect();
        match q.rank(args) {
            Err(CloudSearchError::TooManyRankFields(11)) => {}
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(q.build().unwrap().get_str("rank"), Some("keep"));
    }

    #[test]
    fn test_rank_ten_is_allowed() {
        let mut q = with_field();
        let args: Vec<RankArg> = (0..10)
            .flat_map(|i| [RankArg::from(format!("f{i}")), RankArg::from(DESC)])
            .collect();
        q.rank(args).unwrap();
        assert_eq!(
            q.build().unwrap().get_str("rank").unwrap().split(',').count(),
            10
        );
    }

    #[test]
    fn test_rank_stray_order_rejected() {
        let mut q = with_field();
        assert!(matches!(
            q.rank(crate::rank_args![ASC, "a"]),
            Err(CloudSearchError::InvalidRankOrder(_))
        ));
        assert!(matches!(
            q.rank(crate::rank_args!["a", ASC, DESC]),
            Err(CloudSearchError::InvalidRankOrder(_))
        ));
    }

    #[test]
    fn test_results_type_validation() {
        let mut q = with_field();
        assert!(matches!(
            q.results_type("html"),
            Err(CloudSearchError::InvalidResultsType(_))
        ));
        q.results_type(XML).unwrap();
        q.results_type("json").unwrap();
        assert_eq!(q.build().unwrap().get_str("results-type"), Some("json"));
    }

    #[test]
    fn test_paging_clamps() {
        let mut q = with_field();
        q.size(-3).start(-1);
        let params = q.build().unwrap();
        assert_eq!(params.get_int("size"), Some(0));
        assert_eq!(params.get_int("start"), Some(0));
    }

    #[test]
    fn test_facet_top_n_clamps() {
        let mut q = with_field();
        q.facet_top_n("genre", 0);
        q.facet_top_n("year", 25);
        let params = q.build().unwrap();
        assert_eq!(params.get_int("facet-genre-top-n"), Some(1));
        assert_eq!(params.get_int("facet-year-top-n"), Some(25));
    }

    #[test]
    fn test_facet_constraints_escape_commas() {
        let mut q = with_field();
        q.facet_constraints_str("city", ["Portland, OR", "Salem"]);
        assert_eq!(
            q.build().unwrap().get_str("facet-city-constraints"),
            Some("'Portland\\, OR','Salem'")
        );
    }

    #[test]
    fn test_facet_constraints_uint_rejects_malformed_atomically() {
        let mut q = with_field();
        q.facet_constraints_uint("year", ["2000..", "2010"]).unwrap();
        assert!(q.facet_constraints_uint("year", ["1990", "oops"]).is_err());
        assert_eq!(
            q.build().unwrap().get_str("facet-year-constraints"),
            Some("2000..,2010")
        );
    }

    #[test]
    fn test_facet_sort_replaced_on_second_call() {
        let mut q = with_field();
        q.facet_sort("genre").alpha();
        q.facet_sort("genre");
        assert_eq!(q.build().unwrap().get_str("facet-genre-sort"), Some("count"));
    }

    #[test]
    fn test_delete_facets_removes_all_related_state() {
        let mut q = with_field();
        q.facet(["a", "b"]);
        q.facet_constraints_str("b", ["x"]);
        q.facet_sort("b").alpha();
        q.facet_top_n("b", 3);
        q.delete_facets("b");

        let params = q.build().unwrap();
        assert_eq!(params.get_str("facet"), Some("a"));
        assert!(!params.contains_key("facet-b-constraints"));
        assert!(!params.contains_key("facet-b-sort"));
        assert!(!params.contains_key("facet-b-top-n"));
    }

    #[test]
    fn test_delete_facets_with_nested_empty_list_clears_everything() {
        let mut q = with_field();
        q.facet(["a", "b"]);
        q.facet_constraints_str("a", ["x"]);
        q.facet_sort("a").alpha();
        q.facet_top_n("b", 3);
        q.delete_facets(ArgTree::<String>::List(vec![ArgTree::List(Vec::new())]));

        let params = q.build().unwrap();
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["bq"]);
    }

    #[test]
    fn test_parameter_order() {
        let mut q = with_field();
        q.threshold("r", 5u64).unwrap();
        q.start(1).size(2);
        q.return_fields("title");
        q.results_type(JSON).unwrap();
        q.rank(vec!["r"]).unwrap();
        q.define_rank("r", "text_relevance");
        q.q("text");
        q.facet_top_n("f", 2);
        q.facet_sort("f");
        q.facet_constraints_str("f", ["v"]);
        q.facet("f");

        let params = q.build().unwrap();
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec![
                "bq",
                "facet",
                "facet-f-constraints",
                "facet-f-sort",
                "facet-f-top-n",
                "q",
                "rank-r",
                "rank",
                "results-type",
                "return-fields",
                "size",
                "start",
                "t-r",
            ]
        );
    }

    #[test]
    fn test_build_is_repeatable() {
        let q = with_field();
        assert_eq!(q.build().unwrap(), q.build().unwrap());
        assert_eq!(q.expression_count(), 1);
    }
}
