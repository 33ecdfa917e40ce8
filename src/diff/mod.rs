//! Graph change representation
//!
//! A [`GraphDiff`] is one atomic change to a graph of identified nodes.
//! Consumers match on the variants directly; [`GraphDiffCompressor`]
//! removes redundant changes from a [`CompoundDiff`] before it is applied
//! or reported.

mod compressor;

use std::fmt;

pub use compressor::GraphDiffCompressor;

/// Identifier of a node in the changed graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of an arc (a relationship name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcId(pub String);

impl ArcId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ArcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArcId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Property value carried by a property change
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One atomic change, owned by `node`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphDiff {
    NodeCreate {
        node: NodeId,
    },
    NodeDelete {
        node: NodeId,
    },
    NodeIdChange {
        node: NodeId,
        new_id: NodeId,
    },
    PropertyChange {
        node: NodeId,
        property: String,
        old: Value,
        new: Value,
    },
    ArcCreate {
        node: NodeId,
        target: Option<NodeId>,
        arc: ArcId,
    },
    ArcDelete {
        node: NodeId,
        target: Option<NodeId>,
        arc: ArcId,
    },
}

impl GraphDiff {
    pub fn node(&self) -> &NodeId {
        match self {
            GraphDiff::NodeCreate { node }
            | GraphDiff::NodeDelete { node }
            | GraphDiff::NodeIdChange { node, .. }
            | GraphDiff::PropertyChange { node, .. }
            | GraphDiff::ArcCreate { node, .. }
            | GraphDiff::ArcDelete { node, .. } => node,
        }
    }

    pub fn is_property_change(&self) -> bool {
        matches!(self, GraphDiff::PropertyChange { .. })
    }

    /// The change that undoes this one
    pub fn inverse(&self) -> GraphDiff {
        match self.clone() {
            GraphDiff::NodeCreate { node } => GraphDiff::NodeDelete { node },
            GraphDiff::NodeDelete { node } => GraphDiff::NodeCreate { node },
            GraphDiff::NodeIdChange { node, new_id } => GraphDiff::NodeIdChange {
                node: new_id,
                new_id: node,
            },
            GraphDiff::PropertyChange {
                node,
                property,
                old,
                new,
            } => GraphDiff::PropertyChange {
                node,
                property,
                old: new,
                new: old,
            },
            GraphDiff::ArcCreate { node, target, arc } => {
                GraphDiff::ArcDelete { node, target, arc }
            }
            GraphDiff::ArcDelete { node, target, arc } => {
                GraphDiff::ArcCreate { node, target, arc }
            }
        }
    }
}

impl fmt::Display for GraphDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphDiff::NodeCreate { node } => write!(f, "+ {}", node),
            GraphDiff::NodeDelete { node } => write!(f, "- {}", node),
            GraphDiff::NodeIdChange { node, new_id } => write!(f, "~ {} -> {}", node, new_id),
            GraphDiff::PropertyChange {
                node,
                property,
                old,
                new,
            } => write!(f, "~ {}.{}: {} -> {}", node, property, old, new),
            GraphDiff::ArcCreate { node, target, arc } => match target {
                Some(target) => write!(f, "+ {} -[{}]-> {}", node, arc, target),
                None => write!(f, "+ {} -[{}]->", node, arc),
            },
            GraphDiff::ArcDelete { node, target, arc } => match target {
                Some(target) => write!(f, "- {} -[{}]-> {}", node, arc, target),
                None => write!(f, "- {} -[{}]->", node, arc),
            },
        }
    }
}

/// Ordered list of changes applied as a unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundDiff {
    diffs: Vec<GraphDiff>,
}

impl CompoundDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diff: GraphDiff) {
        self.diffs.push(diff);
    }

    pub fn extend(&mut self, other: CompoundDiff) {
        self.diffs.extend(other.diffs);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GraphDiff> {
        self.diffs.iter()
    }

    pub fn len(&self) -> usize {
        self.diffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn as_slice(&self) -> &[GraphDiff] {
        &self.diffs
    }

    /// Undo of the whole compound: inverses in reverse order
    pub fn inverse(&self) -> CompoundDiff {
        CompoundDiff {
            diffs: self.diffs.iter().rev().map(GraphDiff::inverse).collect(),
        }
    }
}

impl From<Vec<GraphDiff>> for CompoundDiff {
    fn from(diffs: Vec<GraphDiff>) -> Self {
        Self { diffs }
    }
}

impl FromIterator<GraphDiff> for CompoundDiff {
    fn from_iter<I: IntoIterator<Item = GraphDiff>>(iter: I) -> Self {
        Self {
            diffs: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CompoundDiff {
    type Item = GraphDiff;
    type IntoIter = std::vec::IntoIter<GraphDiff>;

    fn into_iter(self) -> Self::IntoIter {
        self.diffs.into_iter()
    }
}

impl<'a> IntoIterator for &'a CompoundDiff {
    type Item = &'a GraphDiff;
    type IntoIter = std::slice::Iter<'a, GraphDiff>;

    fn into_iter(self) -> Self::IntoIter {
        self.diffs.iter()
    }
}
