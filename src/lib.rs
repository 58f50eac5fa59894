//! # ONNX Graphviz
//!
//! Decode ONNX models and lay their computation graphs out left to right.
//!
//! The crate covers the pipeline behind an interactive model viewer; drawing
//! is left to the caller.
//!
//! ## Features
//!
//! - **Decoding**: ONNX protobuf (or its JSON plain form) into a normalized model
//! - **Canonical graph**: one node per tensor or operator, identity-stable ids
//! - **Analysis**: node counts, complexity class, operator histogram
//! - **Layout**: layered placement with crossing reduction and orthogonal edges
//!
//! ## Example
//!
//! ```ignore
//! use onnx_graphviz::prelude::*;
//!
//! let output = run_file("model.onnx", &LayoutConfig::default());
//! if let Some(loaded) = output.loaded() {
//!     println!("{:?}", loaded.analysis.model_complexity);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module declarations
// ============================================================================

pub mod analysis;
pub mod decode;
pub mod error;
pub mod graph;
pub mod layout;
pub mod pipeline;
pub mod proto;
pub mod viewport;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use onnx_graphviz::prelude::*`
pub mod prelude {
    pub use crate::analysis::{summarize, Analysis, Complexity};
    pub use crate::decode::{decode, JsonSchema, ModelSchema, OnnxSchema, RawModel};
    pub use crate::error::{DecodeError, LayoutError, VizError, VizResult};
    pub use crate::graph::{build, CanonicalGraph, GraphEdge, GraphNode, NodeId, NodeKind};
    pub use crate::layout::{layout, LaidOutGraph, LayoutConfig, Point};
    pub use crate::pipeline::{run, run_file, run_file_with_config, PipelineOutput, PipelineSession};
    pub use crate::viewport::{Focus, Viewport};
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{VizError, VizResult};
pub use pipeline::{run, PipelineOutput};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
