//! Layer assignment
//!
//! Works on node positions (indices into the canonical node order). Real
//! nodes occupy `0..real_count`; dummy nodes created for long edges follow.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::graph::{CanonicalGraph, NodeKind};

/// Virtual nodes traversed by one canonical edge
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EdgeChain {
    /// Virtual nodes in layer order (lowest layer first), endpoints included
    pub nodes: SmallVec<[usize; 4]>,
    /// Edge points right-to-left after cycle breaking
    pub reversed: bool,
    /// Source and target coincide
    pub self_loop: bool,
}

/// Layered graph with dummy nodes, every segment spanning one layer
#[derive(Debug, Clone)]
pub(crate) struct Hierarchy {
    /// Number of real (canonical) nodes
    pub real_count: usize,
    /// Layer of every virtual node
    pub layer_of: Vec<usize>,
    /// Number of layers
    pub layer_count: usize,
    /// Neighbors in the previous layer
    pub up: Vec<SmallVec<[usize; 4]>>,
    /// Neighbors in the next layer
    pub down: Vec<SmallVec<[usize; 4]>>,
    /// One chain per canonical edge, in edge order
    pub chains: Vec<EdgeChain>,
}

impl Hierarchy {
    /// Total virtual node count
    pub fn len(&self) -> usize {
        self.layer_of.len()
    }

    /// Whether a virtual node is a dummy
    pub fn is_dummy(&self, v: usize) -> bool {
        v >= self.real_count
    }
}

// ============================================================================
// Cycle removal
// ============================================================================

/// Flag the edges that close a cycle.
///
/// Iterative DFS over nodes and out-edges in canonical order; an edge into a
/// node still on the stack is a back edge. Self-loops are never flagged.
pub(crate) fn find_back_edges(n: usize, edges: &[(usize, usize)]) -> Vec<bool> {
    let mut out_edges: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); n];
    for (e, &(s, t)) in edges.iter().enumerate() {
        if s != t {
            out_edges[s].push(e);
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    let mut mark = vec![Mark::New; n];
    let mut back = vec![false; edges.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if mark[root] != Mark::New {
            continue;
        }
        mark[root] = Mark::Active;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            if let Some(&e) = out_edges[node].get(next) {
                top.1 += 1;
                let target = edges[e].1;
                match mark[target] {
                    Mark::New => {
                        mark[target] = Mark::Active;
                        stack.push((target, 0));
                    }
                    Mark::Active => back[e] = true,
                    Mark::Done => {}
                }
            } else {
                mark[node] = Mark::Done;
                stack.pop();
            }
        }
    }

    back
}

// ============================================================================
// Layer assignment
// ============================================================================

/// Longest-path layering of an acyclic edge list.
///
/// Returns `None` if the edges still contain a cycle.
pub(crate) fn longest_path_layers(n: usize, dag: &[(usize, usize)]) -> Option<Vec<usize>> {
    let mut succ: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); n];
    let mut indegree = vec![0usize; n];
    for &(s, t) in dag {
        succ[s].push(t);
        indegree[t] += 1;
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
    let mut layer = vec![0usize; n];
    let mut visited = 0;

    while let Some(v) = queue.pop_front() {
        visited += 1;
        for &t in &succ[v] {
            layer[t] = layer[t].max(layer[v] + 1);
            indegree[t] -= 1;
            if indegree[t] == 0 {
                queue.push_back(t);
            }
        }
    }

    (visited == n).then_some(layer)
}

/// Build the layered hierarchy for a graph.
///
/// Sink `Output` nodes move to the last layer; operator sources move next to
/// their nearest consumer; `Input` nodes stay in layer 0.
pub(crate) fn build_hierarchy(graph: &CanonicalGraph) -> Option<Hierarchy> {
    let n = graph.node_count();
    let kinds: Vec<&NodeKind> = graph.nodes().map(|node| &node.kind).collect();

    let mut edges = Vec::with_capacity(graph.edge_count());
    for edge in graph.edges() {
        edges.push((graph.position(edge.source)?, graph.position(edge.target)?));
    }

    let back = find_back_edges(n, &edges);
    let dag: Vec<(usize, usize)> = edges
        .iter()
        .zip(&back)
        .filter(|((s, t), _)| s != t)
        .map(|(&(s, t), &reversed)| if reversed { (t, s) } else { (s, t) })
        .collect();

    let mut layer_of = longest_path_layers(n, &dag)?;

    let mut has_succ = vec![false; n];
    let mut has_pred = vec![false; n];
    for &(s, t) in &dag {
        has_succ[s] = true;
        has_pred[t] = true;
    }

    // Pull operator sources (e.g. Constant) next to their earliest consumer
    for v in 0..n {
        if !has_pred[v] && has_succ[v] && matches!(kinds[v], NodeKind::Operator(_)) {
            let nearest = dag
                .iter()
                .filter(|(s, _)| *s == v)
                .map(|&(_, t)| layer_of[t])
                .min();
            if let Some(nearest) = nearest {
                layer_of[v] = nearest.saturating_sub(1);
            }
        }
    }

    let last = layer_of.iter().copied().max().unwrap_or(0);
    for v in 0..n {
        if !has_succ[v] && matches!(kinds[v], NodeKind::Output) {
            layer_of[v] = last;
        }
    }

    let layer_count = if n == 0 { 0 } else { last + 1 };
    let mut hierarchy = Hierarchy {
        real_count: n,
        layer_of,
        layer_count,
        up: vec![SmallVec::new(); n],
        down: vec![SmallVec::new(); n],
        chains: Vec::with_capacity(edges.len()),
    };

    for (&(s, t), &reversed) in edges.iter().zip(&back) {
        let chain = if s == t {
            EdgeChain {
                nodes: smallvec::smallvec![s],
                reversed: false,
                self_loop: true,
            }
        } else {
            let (from, to) = if reversed { (t, s) } else { (s, t) };
            EdgeChain {
                nodes: hierarchy.insert_chain(from, to),
                reversed,
                self_loop: false,
            }
        };
        hierarchy.chains.push(chain);
    }

    Some(hierarchy)
}

impl Hierarchy {
    /// Connect `from` to `to` through one dummy per intermediate layer
    fn insert_chain(&mut self, from: usize, to: usize) -> SmallVec<[usize; 4]> {
        let mut chain: SmallVec<[usize; 4]> = smallvec::smallvec![from];
        let mut prev = from;

        for layer in self.layer_of[from] + 1..self.layer_of[to] {
            let dummy = self.layer_of.len();
            self.layer_of.push(layer);
            self.up.push(SmallVec::new());
            self.down.push(SmallVec::new());
            self.link(prev, dummy);
            chain.push(dummy);
            prev = dummy;
        }

        self.link(prev, to);
        chain.push(to);
        chain
    }

    fn link(&mut self, upper: usize, lower: usize) {
        self.down[upper].push(lower);
        self.up[lower].push(upper);
    }
}
