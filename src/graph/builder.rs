//! Canonical graph construction
//!
//! [`GraphBuilder`] runs four passes over a [`RawModel`]:
//!
//! 1. every consumed tensor gets an id and an input placeholder
//! 2. every operator takes the id of its canonical name, replacing the
//!    placeholder in place when one exists; when two operators share a
//!    name the first one is kept and the later one is skipped with its edges
//! 3. secondary outputs that are consumed or declared become output nodes
//! 4. edges, in node order then input order
//!
//! Because pass 1 pre-assigns every consumed tensor, no edge can reference a
//! missing node.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::decode::{RawModel, RawNode};

use super::labels::describe_operator;
use super::model::{CanonicalGraph, GraphEdge, GraphNode, NodeId, NodeKind, OperatorInfo};

/// Name → id mapping with a monotonic counter
///
/// Requesting the same name twice returns the same id; ids are never reused.
#[derive(Debug, Default)]
pub struct IdAllocator {
    ids: FxHashMap<String, NodeId>,
    next: u32,
}

impl IdAllocator {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `name`, assigning the next one on first request.
    /// Returns the id and whether it was newly assigned.
    pub fn assign(&mut self, name: &str) -> (NodeId, bool) {
        if let Some(&id) = self.ids.get(name) {
            return (id, false);
        }
        let id = NodeId(self.next);
        self.next += 1;
        self.ids.insert(name.to_string(), id);
        (id, true)
    }

    /// Id for `name` if already assigned
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    /// Number of assigned ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing has been assigned
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn into_map(self) -> FxHashMap<String, NodeId> {
        self.ids
    }
}

/// Builds a [`CanonicalGraph`] from a decoded model
#[derive(Debug, Default)]
pub struct GraphBuilder {
    ids: IdAllocator,
    nodes: IndexMap<NodeId, GraphNode>,
    edges: Vec<GraphEdge>,
    seen_edges: FxHashSet<(NodeId, NodeId)>,
}

impl GraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Run all passes and produce the graph
    pub fn build(mut self, model: &RawModel) -> CanonicalGraph {
        let graph = &model.graph;

        self.collect_inputs(&graph.nodes);
        self.collect_operators(&graph.nodes);

        let declared: FxHashSet<&str> = graph.outputs.iter().map(|o| o.name.as_str()).collect();
        self.collect_secondary_outputs(&graph.nodes, &declared);
        self.collect_edges(&graph.nodes);

        let dropped_outputs: Vec<String> = graph
            .outputs
            .iter()
            .filter(|o| !o.name.is_empty() && self.ids.get(&o.name).is_none())
            .map(|o| o.name.clone())
            .collect();

        for name in &dropped_outputs {
            warn!(output = %name, "graph output is not produced by any node; dropped");
        }

        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            dropped = dropped_outputs.len(),
            "built canonical graph"
        );

        CanonicalGraph {
            nodes: self.nodes,
            edges: self.edges,
            ids: self.ids.into_map(),
            dropped_outputs,
            declared_inputs: graph.inputs.len(),
            declared_outputs: graph.outputs.len(),
            initializer_count: graph.initializers.len(),
        }
    }

    /// Pass 1: placeholders for every consumed tensor
    fn collect_inputs(&mut self, nodes: &[RawNode]) {
        for node in nodes {
            for input in node.input.iter().filter(|i| !i.is_empty()) {
                let (id, fresh) = self.ids.assign(input);
                if fresh {
                    self.nodes.insert(
                        id,
                        GraphNode {
                            id,
                            name: input.clone(),
                            kind: NodeKind::Input,
                        },
                    );
                }
            }
        }
    }

    /// Pass 2: operators, keyed by canonical name
    fn collect_operators(&mut self, nodes: &[RawNode]) {
        for (index, node) in nodes.iter().enumerate() {
            let name = node.canonical_name(index);
            let (id, _) = self.ids.assign(&name);
            if let Some(kept) = self.nodes.get(&id).and_then(GraphNode::operator) {
                warn!(
                    name = %name,
                    kept = kept.index,
                    skipped = index,
                    "operator name already taken, keeping the first producer"
                );
                continue;
            }
            let op_type = node.resolve_op_type(index);

            let info = OperatorInfo {
                details: describe_operator(node, &op_type),
                known_op_type: node.has_op_type(),
                op_type,
                index,
            };

            // IndexMap::insert keeps the original position for existing keys
            self.nodes.insert(
                id,
                GraphNode {
                    id,
                    name,
                    kind: NodeKind::Operator(info),
                },
            );
        }
    }

    /// Pass 3: secondary outputs that something refers to
    fn collect_secondary_outputs(&mut self, nodes: &[RawNode], declared: &FxHashSet<&str>) {
        for node in nodes {
            for output in node.output.iter().skip(1).filter(|o| !o.is_empty()) {
                let referenced = self.ids.get(output).is_some();
                if !referenced && !declared.contains(output.as_str()) {
                    continue;
                }

                let (id, _) = self.ids.assign(output);
                match self.nodes.get_mut(&id) {
                    Some(existing) if existing.is_input() => existing.kind = NodeKind::Output,
                    Some(_) => {}
                    None => {
                        self.nodes.insert(
                            id,
                            GraphNode {
                                id,
                                name: output.clone(),
                                kind: NodeKind::Output,
                            },
                        );
                    }
                }
            }
        }
    }

    /// Pass 4: consumer edges, then producer → secondary output edges
    fn collect_edges(&mut self, nodes: &[RawNode]) {
        for (index, node) in nodes.iter().enumerate() {
            let Some(target) = self.ids.get(&node.canonical_name(index)) else {
                continue;
            };
            let owner = self.nodes.get(&target).and_then(GraphNode::operator);
            if owner.map(|info| info.index) != Some(index) {
                continue;
            }

            for input in node.input.iter().filter(|i| !i.is_empty()) {
                if let Some(source) = self.ids.get(input) {
                    self.push_edge(source, target, input);
                }
            }

            for output in node.output.iter().skip(1).filter(|o| !o.is_empty()) {
                let Some(out_id) = self.ids.get(output) else {
                    continue;
                };
                if self.nodes.get(&out_id).map_or(false, GraphNode::is_output) {
                    self.push_edge(target, out_id, output);
                }
            }
        }
    }

    fn push_edge(&mut self, source: NodeId, target: NodeId, tensor: &str) {
        if self.seen_edges.insert((source, target)) {
            self.edges.push(GraphEdge {
                source,
                target,
                tensor: tensor.to_string(),
            });
        }
    }
}

/// Build the canonical graph of a model
pub fn build(model: &RawModel) -> CanonicalGraph {
    GraphBuilder::new().build(model)
}
