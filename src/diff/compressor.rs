//! Removal of redundant changes from a compound diff

use std::collections::HashMap;

use super::{ArcId, CompoundDiff, GraphDiff, NodeId, Value};

type ArcKey = (NodeId, NodeId, ArcId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Create,
    Delete,
}

/// Per-node lifecycle, first and last create/delete seen in the pass
#[derive(Debug, Clone, Copy)]
struct NodeState {
    first: Lifecycle,
    last: Lifecycle,
}

/// Shrinks a [`CompoundDiff`] without changing its net effect.
///
/// The surviving changes keep their original relative order.
#[derive(Debug, Default)]
pub struct GraphDiffCompressor {
    entries: Vec<Option<GraphDiff>>,
    by_node: HashMap<NodeId, Vec<usize>>,
    properties: HashMap<(NodeId, String), usize>,
    pending_arc_creates: HashMap<ArcKey, Vec<usize>>,
    pending_arc_deletes: HashMap<ArcKey, Vec<usize>>,
    nodes: HashMap<NodeId, NodeState>,
}

impl GraphDiffCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compress(&mut self, diff: &CompoundDiff) -> CompoundDiff {
        self.clear();
        for change in diff {
            self.add(change.clone());
        }
        self.cleanup_deleted_nodes();

        let compressed: CompoundDiff = self.entries.drain(..).flatten().collect();
        tracing::debug!(
            before = diff.len(),
            after = compressed.len(),
            "Compressed graph diff"
        );
        self.clear();
        compressed
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.by_node.clear();
        self.properties.clear();
        self.pending_arc_creates.clear();
        self.pending_arc_deletes.clear();
        self.nodes.clear();
    }

    fn add(&mut self, change: GraphDiff) {
        match &change {
            GraphDiff::NodeCreate { node } => self.observe(node, Lifecycle::Create),
            GraphDiff::NodeDelete { node } => self.observe(node, Lifecycle::Delete),
            GraphDiff::PropertyChange {
                node,
                property,
                new,
                ..
            } => {
                if self.coalesce(node, property, new) {
                    return;
                }
            }
            GraphDiff::ArcCreate { node, target, arc } => {
                if let Some(key) = cancellable_key(node, target, arc) {
                    if self.cancel(&key, false) {
                        return;
                    }
                    let slot = self.entries.len();
                    self.pending_arc_creates.entry(key).or_default().push(slot);
                }
            }
            GraphDiff::ArcDelete { node, target, arc } => {
                if let Some(key) = cancellable_key(node, target, arc) {
                    if self.cancel(&key, true) {
                        return;
                    }
                    let slot = self.entries.len();
                    self.pending_arc_deletes.entry(key).or_default().push(slot);
                }
            }
            GraphDiff::NodeIdChange { .. } => {}
        }
        self.push(change);
    }

    fn push(&mut self, change: GraphDiff) {
        let slot = self.entries.len();
        if let GraphDiff::PropertyChange { node, property, .. } = &change {
            self.properties
                .insert((node.clone(), property.clone()), slot);
        }
        self.by_node
            .entry(change.node().clone())
            .or_default()
            .push(slot);
        // arcs are indexed under their target too
        if let GraphDiff::ArcCreate {
            node,
            target: Some(target),
            ..
        }
        | GraphDiff::ArcDelete {
            node,
            target: Some(target),
            ..
        } = &change
        {
            if target != node {
                self.by_node.entry(target.clone()).or_default().push(slot);
            }
        }
        self.entries.push(Some(change));
    }

    fn observe(&mut self, node: &NodeId, event: Lifecycle) {
        self.nodes
            .entry(node.clone())
            .and_modify(|state| state.last = event)
            .or_insert(NodeState {
                first: event,
                last: event,
            });
    }

    /// Folds a repeated property change into the first one; first `old` wins
    fn coalesce(&mut self, node: &NodeId, property: &str, value: &Value) -> bool {
        let Some(&slot) = self.properties.get(&(node.clone(), property.to_string())) else {
            return false;
        };
        match self.entries.get_mut(slot) {
            Some(Some(GraphDiff::PropertyChange { new, .. })) => {
                *new = value.clone();
                true
            }
            _ => false,
        }
    }

    /// Drops the opposite pending arc operation, if there is one
    fn cancel(&mut self, key: &ArcKey, deleting: bool) -> bool {
        let pending = if deleting {
            &mut self.pending_arc_creates
        } else {
            &mut self.pending_arc_deletes
        };
        let Some(slot) = pending.get_mut(key).and_then(Vec::pop) else {
            return false;
        };
        self.entries[slot] = None;
        true
    }

    fn cleanup_deleted_nodes(&mut self) {
        for (node, state) in &self.nodes {
            if state.last != Lifecycle::Delete {
                // deleted and created again: live node
                continue;
            }
            let drop_all = state.first == Lifecycle::Create;
            let Some(slots) = self.by_node.get(node) else {
                continue;
            };
            for &slot in slots {
                let entry = &mut self.entries[slot];
                let remove = match entry {
                    Some(change) => drop_all || change.is_property_change(),
                    None => false,
                };
                if remove {
                    *entry = None;
                }
            }
        }
    }
}

fn cancellable_key(node: &NodeId, target: &Option<NodeId>, arc: &ArcId) -> Option<ArcKey> {
    match target {
        Some(target) if target != node => Some((node.clone(), target.clone(), arc.clone())),
        _ => None,
    }
}
