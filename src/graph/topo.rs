//! Indegree-based topological sort

use std::collections::HashMap;
use std::hash::Hash;

use super::{Digraph, GraphError};

/// Topological order by repeatedly removing indegree-zero vertices.
///
/// An arc `A -> B` means `A` comes before `B`. Remaining vertices are
/// scanned round-robin starting where the previous vertex was removed.
/// When a full scan finds no indegree-zero vertex the iterator yields
/// `Err(GraphError::Cycle)` once and then ends.
pub struct IndegreeTopologicalSort<'g, E, G: ?Sized> {
    graph: &'g G,
    remaining: Vec<E>,
    indegree: HashMap<E, usize>,
    position: usize,
    stalled: bool,
}

impl<'g, E, G> IndegreeTopologicalSort<'g, E, G>
where
    E: Clone + Eq + Hash,
    G: Digraph<E> + ?Sized,
{
    pub fn new(graph: &'g G) -> Self {
        let remaining: Vec<E> = graph.vertices().to_vec();
        let mut indegree: HashMap<E, usize> = remaining.iter().map(|v| (v.clone(), 0)).collect();
        for vertex in &remaining {
            for target in graph.outgoing(vertex) {
                if let Some(degree) = indegree.get_mut(target) {
                    *degree += 1;
                }
            }
        }

        Self {
            graph,
            remaining,
            indegree,
            position: 0,
            stalled: false,
        }
    }

    /// Vertices not emitted yet
    pub fn remaining(&self) -> &[E] {
        &self.remaining
    }
}

impl<'g, E, G> Iterator for IndegreeTopologicalSort<'g, E, G>
where
    E: Clone + Eq + Hash,
    G: Digraph<E> + ?Sized,
{
    type Item = Result<E, GraphError<E>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stalled || self.remaining.is_empty() {
            return None;
        }

        let len = self.remaining.len();
        for step in 0..len {
            let slot = (self.position + step) % len;
            if self.indegree.get(&self.remaining[slot]).copied() != Some(0) {
                continue;
            }

            let vertex = self.remaining.remove(slot);
            self.indegree.remove(&vertex);
            for target in self.graph.outgoing(&vertex) {
                if let Some(degree) = self.indegree.get_mut(target) {
                    *degree = degree.saturating_sub(1);
                }
            }
            self.position = if slot >= self.remaining.len() { 0 } else { slot };
            return Some(Ok(vertex));
        }

        self.stalled = true;
        Some(Err(GraphError::Cycle {
            remaining: self.remaining.clone(),
        }))
    }
}

/// Collects a full topological order, or the cycle error
pub fn topological_sort<E, G>(graph: &G) -> Result<Vec<E>, GraphError<E>>
where
    E: Clone + Eq + Hash,
    G: Digraph<E> + ?Sized,
{
    IndegreeTopologicalSort::new(graph).collect()
}
