//! Boolean query expressions and the handle-indexed store that owns them.
//!
//! Every expression-building call on the query builder inserts a node and
//! returns an [`ExprHandle`]. Passing a handle to a composite (`and`, `or`,
//! `not`) moves its node out of the store and into the composite, so each
//! handle can be consumed exactly once. Whatever remains in the store when the
//! query is built forms the top level of the boolean query.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{CloudSearchError, Result};

/// Opaque identifier of a live expression in an [`ExpressionStore`].
///
/// Handles are unique per store and never reused. A handle also records the
/// store that issued it and is rejected by any other store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExprHandle {
    store: u64,
    id: u64,
}

impl ExprHandle {
    /// Get the raw identifier.
    pub fn id(self) -> u64 {
        self.id
    }
}

impl fmt::Display for ExprHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Boolean operators for composite expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolOp {
    /// All children must match.
    And,
    /// Any child must match.
    Or,
    /// The single child must not match.
    Not,
}

impl BoolOp {
    /// Get the operator keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
            BoolOp::Not => "not",
        }
    }
}

/// A node of the boolean query tree.
///
/// Leaf values are stored already rendered (quoted text, range string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExprNode {
    /// `(field <name> <value>)`
    Field { field: String, value: String },
    /// `(filter <name> <value>)`
    Filter { field: String, value: String },
    /// A quoted value matched against the default search field, rendered bare.
    Text { value: String },
    /// `(<op> <child> ...)`
    Composite { op: BoolOp, children: Vec<ExprNode> },
}

impl ExprNode {
    /// Render this node in the boolean query syntax.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            ExprNode::Field { field, value } => {
                out.push_str("(field ");
                out.push_str(field);
                out.push(' ');
                out.push_str(value);
                out.push(')');
            }
            ExprNode::Filter { field, value } => {
                out.push_str("(filter ");
                out.push_str(field);
                out.push(' ');
                out.push_str(value);
                out.push(')');
            }
            ExprNode::Text { value } => out.push_str(value),
            ExprNode::Composite { op, children } => {
                out.push('(');
                out.push_str(op.as_str());
                for child in children {
                    out.push(' ');
                    child.render_into(out);
                }
                out.push(')');
            }
        }
    }

    /// Check whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, ExprNode::Composite { .. })
    }

    /// Count the nodes in this subtree.
    pub fn node_count(&self) -> usize {
        match self {
            ExprNode::Composite { children, .. } => {
                1 + children.iter().map(ExprNode::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }
}

/// Handle-indexed table of live expressions.
///
/// A clone keeps the store identity, so handles issued before cloning stay
/// valid in both copies.
#[derive(Debug, Clone)]
pub struct ExpressionStore {
    /// Identity stamped into every handle this store issues.
    store_id: u64,
    /// Live nodes keyed by handle id; id order is creation order.
    nodes: BTreeMap<u64, ExprNode>,
    /// The next id to hand out.
    next_id: u64,
}

impl ExpressionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        ExpressionStore {
            store_id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Insert a node and return its new handle.
    pub fn insert(&mut self, node: ExprNode) -> ExprHandle {
        let id = self.next_id;
        self.next_id += 1;
        log::trace!("expression #{id} created: {}", node.render());
        self.nodes.insert(id, node);
        self.handle(id)
    }

    fn handle(&self, id: u64) -> ExprHandle {
        ExprHandle {
            store: self.store_id,
            id,
        }
    }

    fn is_live(&self, handle: ExprHandle) -> bool {
        handle.store == self.store_id && self.nodes.contains_key(&handle.id)
    }

    /// Remove a live node and return it.
    pub fn take(&mut self, handle: ExprHandle) -> Result<ExprNode> {
        if handle.store != self.store_id {
            return Err(CloudSearchError::InvalidHandle(handle.id));
        }
        let node = self
            .nodes
            .remove(&handle.id)
            .ok_or(CloudSearchError::InvalidHandle(handle.id))?;
        log::trace!("expression {handle} consumed");
        Ok(node)
    }

    /// Remove several live nodes, in order.
    ///
    /// Either every handle is consumed or, if any handle is not live or appears
    /// twice, none is and the store is left unchanged.
    pub fn take_all(&mut self, handles: &[ExprHandle]) -> Result<Vec<ExprNode>> {
        for (i, handle) in handles.iter().enumerate() {
            if !self.is_live(*handle) || handles[..i].contains(handle) {
                return Err(CloudSearchError::InvalidHandle(handle.id));
            }
        }

        handles.iter().map(|handle| self.take(*handle)).collect()
    }

    /// Wrap the nodes behind `handles` in a composite and return the new handle.
    pub fn combine(&mut self, op: BoolOp, handles: &[ExprHandle]) -> Result<ExprHandle> {
        let children = self.take_all(handles)?;
        Ok(self.insert(ExprNode::Composite { op, children }))
    }

    /// Get a live node.
    pub fn get(&self, handle: ExprHandle) -> Option<&ExprNode> {
        if handle.store != self.store_id {
            return None;
        }
        self.nodes.get(&handle.id)
    }

    /// Check whether a handle is live.
    pub fn contains(&self, handle: ExprHandle) -> bool {
        self.is_live(handle)
    }

    /// Handles of all live nodes in creation order.
    pub fn live_handles(&self) -> Vec<ExprHandle> {
        self.nodes.keys().map(|id| self.handle(*id)).collect()
    }

    /// Number of live top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether there are no live nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every live node. Handle ids keep increasing afterwards.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Render the boolean query from all live nodes.
    ///
    /// A single live node is rendered as is; several are wrapped in an implicit
    /// `(and ...)`. Returns `None` when the store is empty.
    pub fn render(&self) -> Option<String> {
        match self.nodes.len() {
            0 => None,
            1 => self.nodes.values().next().map(ExprNode::render),
            _ => {
                let mut out = String::from("(and");
                for node in self.nodes.values() {
                    out.push(' ');
                    node.render_into(&mut out);
                }
                out.push(')');
                Some(out)
            }
        }
    }
}

impl Default for ExpressionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, value: &str) -> ExprNode {
        ExprNode::Field {
            field: name.to_string(),
            value: format!("'{value}'"),
        }
    }

    #[test]
    fn test_handles_are_monotonic() {
        let mut store = ExpressionStore::new();
        let a = store.insert(field("a", "x"));
        let b = store.insert(field("b", "y"));
        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);

        store.take(b).unwrap();
        let c = store.insert(field("c", "z"));
        assert_eq!(c.id(), 3);
    }

    #[test]
    fn test_take_twice_fails() {
        let mut store = ExpressionStore::new();
        let a = store.insert(field("a", "x"));
        store.take(a).unwrap();

        match store.take(a) {
            Err(CloudSearchError::InvalidHandle(1)) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_take_all_is_atomic() {
        let mut store = ExpressionStore::new();
        let a = store.insert(field("a", "x"));
        let b = store.insert(field("b", "y"));

        assert!(store.take_all(&[a, b, a]).is_err());
        assert_eq!(store.len(), 2);
        let unknown = ExprHandle { store: a.store, id: 99 };
        assert!(store.take_all(&[a, unknown]).is_err());
        assert!(store.contains(a));

        let nodes = store.take_all(&[b, a]).unwrap();
        assert_eq!(nodes, vec![field("b", "y"), field("a", "x")]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_render_single_without_implicit_and() {
        let mut store = ExpressionStore::new();
        store.insert(field("field1", "query"));
        assert_eq!(store.render().unwrap(), "(field field1 'query')");
    }

    #[test]
    fn test_render_implicit_and() {
        let mut store = ExpressionStore::new();
        store.insert(field("field1", "query"));
        store.insert(ExprNode::Filter {
            field: "year".to_string(),
            value: "1990..".to_string(),
        });
        assert_eq!(
            store.render().unwrap(),
            "(and (field field1 'query') (filter year 1990..))"
        );
    }

    #[test]
    fn test_render_nested_composites() {
        let mut store = ExpressionStore::new();
        let a = store.insert(field("a", "x"));
        let b = store.insert(ExprNode::Text {
            value: "'free'".to_string(),
        });
        let or = store.combine(BoolOp::Or, &[a, b]).unwrap();
        let not = store.combine(BoolOp::Not, &[or]).unwrap();

        assert_eq!(store.live_handles(), vec![not]);
        assert_eq!(store.render().unwrap(), "(not (or (field a 'x') 'free'))");
        assert_eq!(store.get(not).unwrap().node_count(), 4);
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut first = ExpressionStore::new();
        let mut second = ExpressionStore::new();
        let foreign = first.insert(field("a", "x"));
        let own = second.insert(field("b", "y"));
        assert_eq!(foreign.id(), own.id());

        assert!(!second.contains(foreign));
        assert!(second.get(foreign).is_none());
        assert!(matches!(
            second.take(foreign),
            Err(CloudSearchError::InvalidHandle(1))
        ));
        assert!(second.take_all(&[own, foreign]).is_err());
        assert!(second.contains(own));
        assert!(first.contains(foreign));
    }

    #[test]
    fn test_clear_keeps_ids_increasing() {
        let mut store = ExpressionStore::new();
        let a = store.insert(field("a", "x"));
        store.clear();

        assert!(store.is_empty());
        assert!(store.render().is_none());
        assert!(store.take(a).is_err());
        assert_eq!(store.insert(field("b", "y")).id(), 2);
    }

    #[test]
    fn test_leaf_detection() {
        assert!(field("a", "x").is_leaf());
        assert!(
            ExprNode::Text {
                value: "'x'".to_string()
            }
            .is_leaf()
        );
        let composite = ExprNode::Composite {
            op: BoolOp::Not,
            children: vec![field("a", "x")],
        };
        assert!(!composite.is_leaf());
        assert_eq!(composite.node_count(), 2);
    }

    #[test]
    fn test_render_empty() {
        let store = ExpressionStore::new();
        assert!(store.render().is_none());
    }
}
