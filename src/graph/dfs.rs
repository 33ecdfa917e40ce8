//! Depth-first traversals

use std::collections::HashSet;
use std::hash::Hash;
use std::slice;

use super::Digraph;

/// Depth-first iterator over the vertices reachable from a start vertex.
///
/// The stack holds one pending-arc iterator per vertex on the current path.
/// Each reachable vertex is yielded once, the start vertex first.
pub struct DepthFirstSearch<'g, E, G: ?Sized> {
    graph: &'g G,
    stack: Vec<slice::Iter<'g, E>>,
    seen: HashSet<E>,
    start: Option<E>,
}

impl<'g, E, G> DepthFirstSearch<'g, E, G>
where
    E: Clone + Eq + Hash,
    G: Digraph<E> + ?Sized,
{
    pub fn new(graph: &'g G, start: E) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            seen: HashSet::new(),
            start: Some(start),
        }
    }

    /// Restart from `start`, keeping the set of already visited vertices.
    ///
    /// Sweeping every vertex with `reset` visits each connected component once.
    pub fn reset(&mut self, start: E) {
        self.stack.clear();
        self.start = Some(start);
    }

    /// Restart from `start` and forget every visited vertex
    pub fn reset_all(&mut self, start: E) {
        self.seen.clear();
        self.reset(start);
    }

    pub fn is_seen(&self, vertex: &E) -> bool {
        self.seen.contains(vertex)
    }
}

impl<'g, E, G> Iterator for DepthFirstSearch<'g, E, G>
where
    E: Clone + Eq + Hash,
    G: Digraph<E> + ?Sized,
{
    type Item = E;

    fn next(&mut self) -> Option<E> {
        if let Some(start) = self.start.take() {
            if !self.seen.insert(start.clone()) {
                return None;
            }
            self.stack.push(self.graph.outgoing(&start).iter());
            return Some(start);
        }

        loop {
            let arcs = self.stack.last_mut()?;
            match arcs.next() {
                Some(target) => {
                    if self.seen.insert(target.clone()) {
                        self.stack.push(self.graph.outgoing(target).iter());
                        return Some(target.clone());
                    }
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Transition kind reported by [`DepthFirstStampSearch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    /// First child discovered under its parent (or the start vertex)
    GrowDepth,
    /// Later sibling discovered under the same parent
    GrowBreadth,
    /// Backtracking out of a vertex that had children
    Shrink,
    /// Backtracking out of a vertex without children
    Leaf,
}

struct Frame<'g, E> {
    vertex: E,
    arcs: slice::Iter<'g, E>,
    children: usize,
}

/// Depth-first traversal that reports each step with a [`Stamp`].
///
/// Every reachable vertex produces two items: one when it is discovered
/// (`GrowDepth` or `GrowBreadth`) and one when its subtree is complete
/// (`Leaf` or `Shrink`).
pub struct DepthFirstStampSearch<'g, E, G: ?Sized> {
    graph: &'g G,
    stack: Vec<Frame<'g, E>>,
    seen: HashSet<E>,
    start: Option<E>,
}

impl<'g, E, G> DepthFirstStampSearch<'g, E, G>
where
    E: Clone + Eq + Hash,
    G: Digraph<E> + ?Sized,
{
    pub fn new(graph: &'g G, start: E) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            seen: HashSet::new(),
            start: Some(start),
        }
    }

    pub fn reset(&mut self, start: E) {
        self.stack.clear();
        self.start = Some(start);
    }

    /// Number of vertices on the current path; the start vertex is at depth 1
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl<'g, E, G> Iterator for DepthFirstStampSearch<'g, E, G>
where
    E: Clone + Eq + Hash,
    G: Digraph<E> + ?Sized,
{
    type Item = (Stamp, E);

    fn next(&mut self) -> Option<(Stamp, E)> {
        if let Some(start) = self.start.take() {
            if !self.seen.insert(start.clone()) {
                return None;
            }
            self.stack.push(Frame {
                arcs: self.graph.outgoing(&start).iter(),
                vertex: start.clone(),
                children: 0,
            });
            return Some((Stamp::GrowDepth, start));
        }

        loop {
            let frame = self.stack.last_mut()?;
            match frame.arcs.next() {
                Some(target) => {
                    if !self.seen.insert(target.clone()) {
                        continue;
                    }
                    let stamp = if frame.children == 0 {
                        Stamp::GrowDepth
                    } else {
                        Stamp::GrowBreadth
                    };
                    frame.children += 1;
                    self.stack.push(Frame {
                        arcs: self.graph.outgoing(target).iter(),
                        vertex: target.clone(),
                        children: 0,
                    });
                    return Some((stamp, target.clone()));
                }
                None => {
                    let done = self.stack.pop()?;
                    let stamp = if done.children == 0 {
                        Stamp::Leaf
                    } else {
                        Stamp::Shrink
                    };
                    return Some((stamp, done.vertex));
                }
            }
        }
    }
}
