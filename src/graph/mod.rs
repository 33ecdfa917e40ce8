//! Directed graph primitives
//!
//! Traversals only see a graph through [`Digraph::outgoing`], so any
//! adjacency-list structure can be searched or sorted without building a
//! separate representation.

mod dfs;
mod topo;

use std::collections::HashMap;
use std::hash::Hash;

pub use dfs::{DepthFirstSearch, DepthFirstStampSearch, Stamp};
pub use topo::{topological_sort, IndegreeTopologicalSort};

/// A directed graph over vertices of type `E`
pub trait Digraph<E> {
    /// All vertices, in a stable order
    fn vertices(&self) -> &[E];

    /// Targets of the arcs leaving `vertex`; empty for unknown vertices
    fn outgoing(&self, vertex: &E) -> &[E];
}

/// Errors produced by graph algorithms
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError<E> {
    /// No vertex with indegree zero is left; `remaining` are the unsorted vertices
    #[error("cycle detected among vertices {remaining:?}")]
    Cycle { remaining: Vec<E> },
}

/// Insertion-ordered adjacency-list digraph
#[derive(Debug, Clone)]
pub struct MapDigraph<E> {
    vertices: Vec<E>,
    index: HashMap<E, usize>,
    arcs: Vec<Vec<E>>,
}

impl<E> Default for MapDigraph<E> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            index: HashMap::new(),
            arcs: Vec::new(),
        }
    }
}

impl<E: Clone + Eq + Hash> MapDigraph<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex; returns false if it was already present
    pub fn add_vertex(&mut self, vertex: E) -> bool {
        if self.index.contains_key(&vertex) {
            return false;
        }
        self.index.insert(vertex.clone(), self.vertices.len());
        self.vertices.push(vertex);
        self.arcs.push(Vec::new());
        true
    }

    /// Adds the arc `from -> to`, adding missing vertices. Duplicate arcs are ignored.
    pub fn add_arc(&mut self, from: E, to: E) {
        self.add_vertex(from.clone());
        self.add_vertex(to.clone());
        let slot = self.index[&from];
        if !self.arcs[slot].contains(&to) {
            self.arcs[slot].push(to);
        }
    }

    pub fn has_arc(&self, from: &E, to: &E) -> bool {
        self.outgoing(from).contains(to)
    }

    pub fn contains(&self, vertex: &E) -> bool {
        self.index.contains_key(vertex)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.iter().map(Vec::len).sum()
    }

    /// Number of arcs ending at `vertex`
    pub fn incoming_count(&self, vertex: &E) -> usize {
        self.arcs
            .iter()
            .filter(|targets| targets.contains(vertex))
            .count()
    }

    /// Same vertices, every arc flipped
    pub fn reverse(&self) -> MapDigraph<E> {
        let mut reversed = MapDigraph::new();
        for vertex in &self.vertices {
            reversed.add_vertex(vertex.clone());
        }
        for (from, targets) in self.vertices.iter().zip(&self.arcs) {
            for to in targets {
                reversed.add_arc(to.clone(), from.clone());
            }
        }
        reversed
    }
}

impl<E: Eq + Hash> Digraph<E> for MapDigraph<E> {
    fn vertices(&self) -> &[E] {
        &self.vertices
    }

    fn outgoing(&self, vertex: &E) -> &[E] {
        match self.index.get(vertex) {
            Some(&slot) => &self.arcs[slot],
            None => &[],
        }
    }
}
