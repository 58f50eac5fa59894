//! Canonical graph model
//!
//! This module turns a decoded [`RawModel`](crate::decode::RawModel) into a
//! deduplicated, identity-stable directed graph:
//!
//! - [`GraphBuilder`]: four-pass construction with an explicit [`IdAllocator`]
//! - [`CanonicalGraph`]: ordered nodes and edges with id lookups
//! - [`labels`]: descriptive operator lines and name truncation
//! - [`traversal`]: adjacency and BFS helpers
//!
//! # Example
//!
//! ```ignore
//! use onnx_graphviz::graph::build;
//!
//! let graph = build(&model);
//! for edge in graph.edges() {
//!     println!("{} -> {} ({})", edge.source, edge.target, edge.tensor);
//! }
//! ```
//!
//! # Node kinds
//!
//! | Kind | Meaning |
//! |------|---------|
//! | `Input` | tensor consumed before (or without) being produced |
//! | `Operator` | one model node, keyed by its first output |
//! | `Output` | secondary operator output that is consumed or declared |

pub mod builder;
pub mod labels;
pub mod model;
pub mod traversal;

// Re-export main types
pub use builder::{build, GraphBuilder, IdAllocator};
pub use model::{CanonicalGraph, GraphEdge, GraphNode, NodeId, NodeKind, OperatorInfo};
