//! Argument lists for the variadic query builder operations.
//!
//! `and`, `or`, `facet`, `delete_facets`, `return_fields` and `rank` take a
//! single ordered sequence that may contain nested sequences. Nesting is
//! flattened depth-first before the operation runs, so `[a, [b, c]]` and
//! `[a, b, c]` are equivalent.

use serde::{Deserialize, Serialize};

use crate::query::expression::ExprHandle;

/// A possibly nested ordered sequence of arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgTree<T> {
    /// A single argument.
    Leaf(T),
    /// A nested sequence.
    List(Vec<ArgTree<T>>),
}

impl<T> ArgTree<T> {
    /// An empty argument list.
    pub fn empty() -> Self {
        ArgTree::List(Vec::new())
    }

    /// Flatten into a single ordered sequence.
    pub fn flatten(self) -> Vec<T> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<T>) {
        match self {
            ArgTree::Leaf(value) => out.push(value),
            ArgTree::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }

    /// Check whether the flattened sequence would be empty.
    pub fn is_empty(&self) -> bool {
        match self {
            ArgTree::Leaf(_) => false,
            ArgTree::List(items) => items.iter().all(ArgTree::is_empty),
        }
    }
}

impl<T> From<Vec<ArgTree<T>>> for ArgTree<T> {
    fn from(items: Vec<ArgTree<T>>) -> Self {
        ArgTree::List(items)
    }
}

impl From<ExprHandle> for ArgTree<ExprHandle> {
    fn from(handle: ExprHandle) -> Self {
        ArgTree::Leaf(handle)
    }
}

impl From<Vec<ExprHandle>> for ArgTree<ExprHandle> {
    fn from(handles: Vec<ExprHandle>) -> Self {
        ArgTree::List(handles.into_iter().map(ArgTree::Leaf).collect())
    }
}

impl<const N: usize> From<[ExprHandle; N]> for ArgTree<ExprHandle> {
    fn from(handles: [ExprHandle; N]) -> Self {
        ArgTree::List(handles.into_iter().map(ArgTree::Leaf).collect())
    }
}

impl From<&str> for ArgTree<String> {
    fn from(name: &str) -> Self {
        ArgTree::Leaf(name.to_string())
    }
}

impl From<String> for ArgTree<String> {
    fn from(name: String) -> Self {
        ArgTree::Leaf(name)
    }
}

impl From<Vec<&str>> for ArgTree<String> {
    fn from(names: Vec<&str>) -> Self {
        ArgTree::List(names.into_iter().map(ArgTree::from).collect())
    }
}

impl From<Vec<String>> for ArgTree<String> {
    fn from(names: Vec<String>) -> Self {
        ArgTree::List(names.into_iter().map(ArgTree::Leaf).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ArgTree<String> {
    fn from(names: [&str; N]) -> Self {
        ArgTree::List(names.into_iter().map(ArgTree::from).collect())
    }
}

impl From<&[String]> for ArgTree<String> {
    fn from(names: &[String]) -> Self {
        ArgTree::List(names.iter().cloned().map(ArgTree::Leaf).collect())
    }
}

/// Sort direction for rank fields and facet sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// Check whether this is descending order.
    pub fn is_desc(self) -> bool {
        self == SortOrder::Desc
    }
}

impl From<bool> for SortOrder {
    fn from(desc: bool) -> Self {
        if desc { SortOrder::Desc } else { SortOrder::Asc }
    }
}

/// Ascending order.
pub const ASC: SortOrder = SortOrder::Asc;
/// Descending order.
pub const DESC: SortOrder = SortOrder::Desc;

/// One positional argument to `rank`: a field/rank-expression name or an order flag.
///
/// An order flag applies to the name immediately before it. Names without a
/// following flag sort ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankArg {
    /// A field or rank expression name.
    Name(String),
    /// The order of the preceding name.
    Order(SortOrder),
}

impl From<&str> for RankArg {
    fn from(name: &str) -> Self {
        RankArg::Name(name.to_string())
    }
}

impl From<String> for RankArg {
    fn from(name: String) -> Self {
        RankArg::Name(name)
    }
}

impl From<SortOrder> for RankArg {
    fn from(order: SortOrder) -> Self {
        RankArg::Order(order)
    }
}

impl From<bool> for RankArg {
    fn from(desc: bool) -> Self {
        RankArg::Order(SortOrder::from(desc))
    }
}

impl From<RankArg> for ArgTree<RankArg> {
    fn from(arg: RankArg) -> Self {
        ArgTree::Leaf(arg)
    }
}

impl From<Vec<RankArg>> for ArgTree<RankArg> {
    fn from(args: Vec<RankArg>) -> Self {
        ArgTree::List(args.into_iter().map(ArgTree::Leaf).collect())
    }
}

impl From<&str> for ArgTree<RankArg> {
    fn from(name: &str) -> Self {
        ArgTree::Leaf(RankArg::from(name))
    }
}

impl From<Vec<&str>> for ArgTree<RankArg> {
    fn from(names: Vec<&str>) -> Self {
        ArgTree::List(names.into_iter().map(ArgTree::from).collect())
    }
}

impl From<Vec<(&str, SortOrder)>> for ArgTree<RankArg> {
    fn from(pairs: Vec<(&str, SortOrder)>) -> Self {
        ArgTree::List(
            pairs
                .into_iter()
                .flat_map(|(name, order)| {
                    [
                        ArgTree::Leaf(RankArg::from(name)),
                        ArgTree::Leaf(RankArg::Order(order)),
                    ]
                })
                .collect(),
        )
    }
}

/// Build a `Vec<RankArg>` from names and order flags in positional form.
///
/// ```
/// use cloudsearch_query::rank_args;
/// use cloudsearch_query::query::{DESC, RankArg};
///
/// let args = rank_args!["myrank", DESC, "title"];
/// assert_eq!(args.len(), 3);
/// assert_eq!(args[2], RankArg::Name("title".to_string()));
/// ```
#[macro_export]
macro_rules! rank_args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::query::RankArg::from($arg)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested() {
        let tree: ArgTree<String> = ArgTree::List(vec![
            "a".into(),
            ArgTree::from(vec!["b", "c"]),
            ArgTree::List(vec![ArgTree::List(vec!["d".into()])]),
        ]);
        assert_eq!(tree.flatten(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_is_empty() {
        assert!(ArgTree::<String>::empty().is_empty());
        assert!(ArgTree::<String>::List(vec![ArgTree::empty()]).is_empty());
        assert!(!ArgTree::<String>::from("a").is_empty());
    }

    #[test]
    fn test_rank_pairs_expand_positionally() {
        let tree: ArgTree<RankArg> = vec![("a", DESC), ("b", ASC)].into();
        assert_eq!(
            tree.flatten(),
            vec![
                RankArg::Name("a".to_string()),
                RankArg::Order(SortOrder::Desc),
                RankArg::Name("b".to_string()),
                RankArg::Order(SortOrder::Asc),
            ]
        );
    }

    #[test]
    fn test_sort_order_from_bool() {
        assert_eq!(SortOrder::from(true), DESC);
        assert_eq!(SortOrder::from(false), ASC);
        assert!(DESC.is_desc());
    }
}
