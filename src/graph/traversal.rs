//! Graph traversal utilities
//!
//! Index-based adjacency over a [`CanonicalGraph`] plus BFS in either
//! direction. Positions are indices into the graph's node order.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::model::{CanonicalGraph, NodeId};

/// Direction of traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Forward: follow edges source → target
    Forward,
    /// Backward: follow edges target → source
    Backward,
}

/// Neighbor lists keyed by node position
///
/// Lists preserve edge emission order; duplicate neighbors are not possible
/// because the builder emits one edge per (source, target).
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    /// Successor positions per node
    pub successors: Vec<SmallVec<[usize; 4]>>,
    /// Predecessor positions per node
    pub predecessors: Vec<SmallVec<[usize; 4]>>,
}

impl Adjacency {
    /// Build from a graph; edges with unknown endpoints are skipped
    pub fn new(graph: &CanonicalGraph) -> Self {
        let n = graph.node_count();
        let mut adj = Self {
            successors: vec![SmallVec::new(); n],
            predecessors: vec![SmallVec::new(); n],
        };

        for edge in graph.edges() {
            if let (Some(s), Some(t)) = (graph.position(edge.source), graph.position(edge.target)) {
                adj.successors[s].push(t);
                adj.predecessors[t].push(s);
            }
        }

        adj
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.successors.len()
    }

    /// Whether there are no nodes
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    fn neighbors(&self, pos: usize, direction: Direction) -> &[usize] {
        match direction {
            Direction::Forward => &self.successors[pos],
            Direction::Backward => &self.predecessors[pos],
        }
    }
}

/// BFS traversal iterator yielding node ids
pub struct BfsIterator<'a> {
    graph: &'a CanonicalGraph,
    adjacency: Adjacency,
    queue: VecDeque<usize>,
    visited: FxHashSet<usize>,
    direction: Direction,
}

impl<'a> BfsIterator<'a> {
    /// Create a new BFS iterator starting from the given node
    pub fn new(graph: &'a CanonicalGraph, start: NodeId, direction: Direction) -> Self {
        let mut queue = VecDeque::new();
        let mut visited = FxHashSet::default();

        if let Some(pos) = graph.position(start) {
            queue.push_back(pos);
            visited.insert(pos);
        }

        Self {
            graph,
            adjacency: Adjacency::new(graph),
            queue,
            visited,
            direction,
        }
    }

    /// Create forward BFS (follows consumers)
    pub fn forward(graph: &'a CanonicalGraph, start: NodeId) -> Self {
        Self::new(graph, start, Direction::Forward)
    }

    /// Create backward BFS (follows producers)
    pub fn backward(graph: &'a CanonicalGraph, start: NodeId) -> Self {
        Self::new(graph, start, Direction::Backward)
    }
}

impl<'a> Iterator for BfsIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.queue.pop_front()?;

        for &next in self.adjacency.neighbors(pos, self.direction) {
            if self.visited.insert(next) {
                self.queue.push_back(next);
            }
        }

        self.graph.nodes.get_index(pos).map(|(id, _)| *id)
    }
}

/// All nodes the given node depends on (excluding itself)
pub fn upstream(graph: &CanonicalGraph, start: NodeId) -> Vec<NodeId> {
    BfsIterator::backward(graph, start).skip(1).collect()
}

/// All nodes depending on the given node (excluding itself)
pub fn downstream(graph: &CanonicalGraph, start: NodeId) -> Vec<NodeId> {
    BfsIterator::forward(graph, start).skip(1).collect()
}

/// Check if there's a path between two nodes
pub fn has_path(graph: &CanonicalGraph, from: NodeId, to: NodeId) -> bool {
    from == to && graph.contains(from) || BfsIterator::forward(graph, from).any(|id| id == to)
}
