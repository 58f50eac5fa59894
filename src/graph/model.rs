//! Canonical graph types
//!
//! Nodes are stored in first-assignment order; edges in emission order. Both
//! orders are part of the output contract: layout uses them to break ties.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Stable node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position in allocation order
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Operator payload of a [`GraphNode`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorInfo {
    /// Resolved operator kind
    pub op_type: String,
    /// Whether the op type came from the model rather than the positional fallback
    pub known_op_type: bool,
    /// Position of the operator in the model's node list
    pub index: usize,
    /// Descriptive lines derived from attributes, e.g. `Strides: 1×1`
    pub details: Vec<String>,
}

/// Classification of a graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeKind {
    /// Tensor never produced by an operator
    Input,
    /// One operator invocation
    Operator(OperatorInfo),
    /// Produced tensor shown on its own (secondary outputs)
    Output,
}

/// Canonical visual unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Stable identity
    pub id: NodeId,
    /// Tensor name or operator canonical name
    pub name: String,
    /// Classification
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl GraphNode {
    /// Operator payload, if this is an operator
    pub fn operator(&self) -> Option<&OperatorInfo> {
        match &self.kind {
            NodeKind::Operator(info) => Some(info),
            _ => None,
        }
    }

    /// Whether this is an input placeholder
    pub fn is_input(&self) -> bool {
        matches!(self.kind, NodeKind::Input)
    }

    /// Whether this is an operator
    pub fn is_operator(&self) -> bool {
        matches!(self.kind, NodeKind::Operator(_))
    }

    /// Whether this is an output tensor node
    pub fn is_output(&self) -> bool {
        matches!(self.kind, NodeKind::Output)
    }
}

/// Producer → consumer relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    /// Producing node
    pub source: NodeId,
    /// Consuming node
    pub target: NodeId,
    /// Tensor carried along the edge
    pub tensor: String,
}

/// Deduplicated, identity-stable graph of one model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalGraph {
    pub(crate) nodes: IndexMap<NodeId, GraphNode>,
    pub(crate) edges: Vec<GraphEdge>,
    pub(crate) ids: FxHashMap<String, NodeId>,
    pub(crate) dropped_outputs: Vec<String>,
    pub(crate) declared_inputs: usize,
    pub(crate) declared_outputs: usize,
    pub(crate) initializer_count: usize,
}

impl CanonicalGraph {
    /// Nodes in first-assignment order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Edges in emission order
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    /// Position of a node in [`nodes`](Self::nodes) order
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    /// Look up the id assigned to a tensor or operator name
    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    /// Whether a node exists
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Operator nodes in order
    pub fn operators(&self) -> impl Iterator<Item = (&GraphNode, &OperatorInfo)> {
        self.nodes
            .values()
            .filter_map(|n| n.operator().map(|info| (n, info)))
    }

    /// Declared graph outputs that no operator produces; they have no node
    pub fn dropped_outputs(&self) -> &[String] {
        &self.dropped_outputs
    }

    /// Number of declared graph inputs in the source model
    pub fn declared_inputs(&self) -> usize {
        self.declared_inputs
    }

    /// Number of declared graph outputs in the source model
    pub fn declared_outputs(&self) -> usize {
        self.declared_outputs
    }

    /// Number of initializers in the source model
    pub fn initializer_count(&self) -> usize {
        self.initializer_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(12).to_string(), "n12");
        assert_eq!(NodeId(12).index(), 12);
    }

    #[test]
    fn test_node_serializes_flat() {
        let node = GraphNode {
            id: NodeId(1),
            name: "y".to_string(),
            kind: NodeKind::Operator(OperatorInfo {
                op_type: "Relu".to_string(),
                known_op_type: true,
                index: 0,
                details: Vec::new(),
            }),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["kind"], "operator");
        assert_eq!(json["opType"], "Relu");
    }

    #[test]
    fn test_empty_graph() {
        let graph = CanonicalGraph::default();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.id_of("x").is_none());
    }
}
