//! Layered left-to-right layout
//!
//! Assigns every node a box and every edge an orthogonal polyline:
//!
//! 1. validate the config and the edge endpoints
//! 2. break cycles by reversing DFS back edges ([`layering`])
//! 3. longest-path layers, sink outputs pushed to the last column
//! 4. dummy nodes for edges spanning several layers
//! 5. barycenter sweeps to reduce crossings ([`ordering`])
//! 6. columns left to right, aligned rows within a column ([`position`])
//! 7. elbow routing through the dummy waypoints ([`routing`])
//!
//! # Example
//!
//! ```ignore
//! use onnx_graphviz::graph::build;
//! use onnx_graphviz::layout::{layout, LayoutConfig};
//!
//! let laid_out = layout(&build(&model), &LayoutConfig::default())?;
//! println!("{} x {}", laid_out.width, laid_out.height);
//! ```

pub mod config;
pub(crate) mod layering;
pub(crate) mod ordering;
pub(crate) mod position;
pub(crate) mod routing;

pub use config::LayoutConfig;

use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::LayoutError;
use crate::graph::labels::truncate_label;
use crate::graph::{CanonicalGraph, GraphEdge, GraphNode, NodeId, NodeKind};

// ============================================================================
// Output types
// ============================================================================

/// A point in layout units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    /// Horizontal coordinate, growing rightwards
    pub x: f64,
    /// Vertical coordinate, growing downwards
    pub y: f64,
}

impl Point {
    /// Create a point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node with its box and label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutNode {
    /// The canonical node
    #[serde(flatten)]
    pub node: GraphNode,
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
    /// Display lines
    pub label: Vec<String>,
    /// Column index
    pub layer: usize,
    /// Row index within the column
    pub order: usize,
}

impl LaidOutNode {
    /// Whether a point falls inside the box (edges included)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Center of the box
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// An edge with its routed polyline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutEdge {
    /// The canonical edge
    #[serde(flatten)]
    pub edge: GraphEdge,
    /// Polyline from the source's right-center to the target's left-center
    pub points: SmallVec<[Point; 4]>,
    /// Whether the edge was reversed to break a cycle
    pub reversed: bool,
}

/// Result of a layout run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaidOutGraph {
    /// Nodes in canonical order
    pub nodes: Vec<LaidOutNode>,
    /// Edges in canonical order
    pub edges: Vec<LaidOutEdge>,
    /// Bounding width, margins included
    pub width: f64,
    /// Bounding height, margins included
    pub height: f64,
    #[serde(skip)]
    index: FxHashMap<NodeId, usize>,
}

impl LaidOutGraph {
    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Option<&LaidOutNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Topmost node under a point; later nodes win on overlap
    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.nodes
            .iter()
            .rev()
            .find(|n| n.contains(point))
            .map(|n| n.node.id)
    }

    /// Edges touching a node, in either direction
    pub fn edges_of(&self, id: NodeId) -> impl Iterator<Item = &LaidOutEdge> {
        self.edges
            .iter()
            .filter(move |e| e.edge.source == id || e.edge.target == id)
    }

    /// Whether there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Display lines for a node
pub fn node_label(node: &GraphNode, config: &LayoutConfig) -> Vec<String> {
    match &node.kind {
        NodeKind::Operator(info) => {
            let mut label = Vec::with_capacity(info.details.len() + 1);
            label.push(info.op_type.clone());
            label.extend(info.details.iter().cloned());
            label
        }
        NodeKind::Input | NodeKind::Output => {
            vec![truncate_label(&node.name, config.max_label_chars)]
        }
    }
}

/// Lay out a canonical graph
pub fn layout(graph: &CanonicalGraph, config: &LayoutConfig) -> Result<LaidOutGraph, LayoutError> {
    config.validate()?;
    check_endpoints(graph)?;

    if graph.is_empty() {
        return Ok(LaidOutGraph::default());
    }

    let hierarchy = layering::build_hierarchy(graph)
        .ok_or_else(|| LayoutError::Internal("cycle left after edge reversal".to_string()))?;
    let order = ordering::minimize_crossings(&hierarchy, config.crossing_passes);
    let rows = ordering::positions(&hierarchy, &order);

    let sizes: Vec<(f64, f64)> = graph.nodes().map(|n| config.size_for(&n.kind)).collect();
    let placement = position::assign_coordinates(&hierarchy, &order, &sizes, config);

    let mut nodes = Vec::with_capacity(graph.node_count());
    let mut index = FxHashMap::default();
    for (v, node) in graph.nodes().enumerate() {
        let (x, y) = (placement.left(v), placement.top(v));
        if !x.is_finite() || !y.is_finite() {
            return Err(LayoutError::NonFiniteCoordinate(node.id.to_string()));
        }

        index.insert(node.id, v);
        nodes.push(LaidOutNode {
            node: node.clone(),
            x,
            y,
            width: sizes[v].0,
            height: sizes[v].1,
            label: node_label(node, config),
            layer: hierarchy.layer_of[v],
            order: rows[v],
        });
    }

    let edges = graph
        .edges()
        .iter()
        .zip(&hierarchy.chains)
        .map(|(edge, chain)| LaidOutEdge {
            edge: edge.clone(),
            points: routing::route(chain, &placement, config),
            reversed: chain.reversed,
        })
        .collect::<Vec<_>>();

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        layers = hierarchy.layer_count,
        dummies = hierarchy.len() - hierarchy.real_count,
        "layout complete"
    );

    Ok(LaidOutGraph {
        nodes,
        edges,
        width: placement.width,
        height: placement.height,
        index,
    })
}

fn check_endpoints(graph: &CanonicalGraph) -> Result<(), LayoutError> {
    for edge in graph.edges() {
        for end in [edge.source, edge.target] {
            if !graph.contains(end) {
                return Err(LayoutError::DanglingEdge {
                    source_id: edge.source.to_string(),
                    target_id: edge.target.to_string(),
                    missing: end.to_string(),
                });
            }
        }
    }
    Ok(())
}
