//! End-to-end pipeline
//!
//! bytes → [`decode`] → [`build`] → [`summarize`] → [`layout`], with every
//! failure turned into a [`PipelineOutput::Fallback`] value. Nothing here
//! panics on bad input.
//!
//! [`PipelineSession`] adds "latest run wins" semantics for callers that may
//! start a new run before the previous one finished.
//!
//! # Example
//!
//! ```ignore
//! use onnx_graphviz::decode::OnnxSchema;
//! use onnx_graphviz::layout::LayoutConfig;
//! use onnx_graphviz::pipeline::{run, PipelineOutput};
//!
//! match run(&bytes, &OnnxSchema, &LayoutConfig::default()) {
//!     PipelineOutput::Loaded(loaded) => println!("{} nodes", loaded.graph.nodes.len()),
//!     PipelineOutput::Fallback { error, .. } => eprintln!("{}", error),
//! }
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{summarize, Analysis};
use crate::decode::{decode, read_model_file, schema_for_path, validate_model, ModelSchema, RawModel};
use crate::error::{VizError, VizResult};
use crate::graph::build;
use crate::layout::{layout, LaidOutGraph, LayoutConfig};

// ============================================================================
// Output shape
// ============================================================================

/// Model-level facts shown alongside the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// `"<name> <version>"`
    pub producer: String,
    /// IR version (decimal)
    pub ir_version: String,
    /// Default operator set version, if imported
    pub opset_version: Option<String>,
    /// Model namespace
    pub domain: String,
    /// Graph name
    pub graph_name: String,
    /// Declared outputs with no producing node
    pub dropped_outputs: Vec<String>,
}

impl ModelInfo {
    fn from_model(model: &RawModel, dropped_outputs: &[String]) -> Self {
        Self {
            producer: model.producer(),
            ir_version: model.ir_version.clone(),
            opset_version: model.default_opset_version().map(str::to_string),
            domain: model.domain.clone(),
            graph_name: model.graph.name.clone(),
            dropped_outputs: dropped_outputs.to_vec(),
        }
    }
}

/// Everything a renderer needs after a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedModel {
    /// Model-level facts
    pub model: ModelInfo,
    /// Laid-out graph
    pub graph: LaidOutGraph,
    /// Summary statistics
    pub analysis: Analysis,
    /// Non-fatal structural warnings
    pub warnings: Vec<String>,
}

/// Stage that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Reading or decoding the input
    Decode,
    /// Computing coordinates
    Layout,
}

impl Stage {
    /// Stage responsible for an error
    pub fn of(err: &VizError) -> Self {
        match err {
            VizError::Decode(_) => Stage::Decode,
            VizError::Layout(_) | VizError::Config(_) => Stage::Layout,
        }
    }
}

/// Result of one run, discriminated by `parsingMethod`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "parsingMethod")]
pub enum PipelineOutput {
    /// Every stage succeeded
    #[serde(rename = "runtime-load")]
    Loaded(Box<LoadedModel>),
    /// Some stage failed; no partial result
    #[serde(rename = "fallback")]
    Fallback {
        /// Error message (never empty)
        error: String,
        /// Failing stage
        stage: Stage,
    },
}

impl PipelineOutput {
    /// Build the failure shape from an error
    pub fn from_error(err: &VizError) -> Self {
        let message = err.to_string();
        PipelineOutput::Fallback {
            error: if message.is_empty() {
                "unknown error".to_string()
            } else {
                message
            },
            stage: Stage::of(err),
        }
    }

    /// Whether the run succeeded
    pub fn is_loaded(&self) -> bool {
        matches!(self, PipelineOutput::Loaded(_))
    }

    /// The successful result, if any
    pub fn loaded(&self) -> Option<&LoadedModel> {
        match self {
            PipelineOutput::Loaded(loaded) => Some(loaded.as_ref()),
            PipelineOutput::Fallback { .. } => None,
        }
    }

    /// The error message, if the run failed
    pub fn error(&self) -> Option<&str> {
        match self {
            PipelineOutput::Loaded(_) => None,
            PipelineOutput::Fallback { error, .. } => Some(error),
        }
    }
}

// ============================================================================
// Running
// ============================================================================

/// Run every stage, propagating the first error
pub fn try_run(
    bytes: &[u8],
    schema: &dyn ModelSchema,
    config: &LayoutConfig,
) -> VizResult<LoadedModel> {
    let model = decode(bytes, schema)?;

    let report = validate_model(&model);
    for warning in &report.warnings {
        warn!(%warning, "model validation");
    }

    let graph = build(&model);
    let analysis = summarize(&graph);
    let laid_out = layout(&graph, config)?;

    info!(
        producer = %model.producer(),
        nodes = analysis.total_nodes,
        complexity = ?analysis.model_complexity,
        warnings = report.warnings.len(),
        "model loaded"
    );

    Ok(LoadedModel {
        model: ModelInfo::from_model(&model, graph.dropped_outputs()),
        graph: laid_out,
        analysis,
        warnings: report.warnings,
    })
}

/// Run the pipeline; failures become [`PipelineOutput::Fallback`]
pub fn run(bytes: &[u8], schema: &dyn ModelSchema, config: &LayoutConfig) -> PipelineOutput {
    match try_run(bytes, schema, config) {
        Ok(loaded) => PipelineOutput::Loaded(Box::new(loaded)),
        Err(err) => {
            warn!(error = %err, stage = ?Stage::of(&err), "pipeline failed");
            PipelineOutput::from_error(&err)
        }
    }
}

/// Read a file and run the pipeline with the schema its extension selects
pub fn run_file<P: AsRef<Path>>(path: P, config: &LayoutConfig) -> PipelineOutput {
    let path = path.as_ref();
    match read_model_file(path) {
        Ok(bytes) => run(&bytes, schema_for_path(path), config),
        Err(err) => {
            let err = VizError::from(err);
            warn!(error = %err, "could not read model file");
            PipelineOutput::from_error(&err)
        }
    }
}

/// Like [`run_file`], with the layout config read from a TOML file
///
/// An unreadable or malformed config fails the run at the layout stage.
pub fn run_file_with_config<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    config_path: Q,
) -> PipelineOutput {
    match LayoutConfig::from_file(config_path.as_ref()) {
        Ok(config) => run_file(path, &config),
        Err(err) => {
            let err = VizError::from(err);
            warn!(error = %err, "could not load layout config");
            PipelineOutput::from_error(&err)
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Handle identifying one run within a [`PipelineSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Keeps only the output of the most recently started run
#[derive(Debug, Default)]
pub struct PipelineSession {
    config: LayoutConfig,
    latest: AtomicU64,
    published: Mutex<Option<Arc<PipelineOutput>>>,
}

impl PipelineSession {
    /// Create a session using `config` for every run
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            latest: AtomicU64::new(0),
            published: Mutex::new(None),
        }
    }

    /// Layout configuration used by [`run`](Self::run)
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Start a run; any earlier run becomes stale
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` belongs to the most recently started run
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Publish an output; returns `false` and discards it if a newer run
    /// has started since `ticket` was issued
    pub fn publish(&self, ticket: Ticket, output: PipelineOutput) -> bool {
        self.publish_shared(ticket, Arc::new(output)).is_some()
    }

    /// Store `output` under the lock and hand back the stored handle, so the
    /// caller never observes a result published by another run
    fn publish_shared(
        &self,
        ticket: Ticket,
        output: Arc<PipelineOutput>,
    ) -> Option<Arc<PipelineOutput>> {
        let mut published = self.lock();
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, "discarding superseded pipeline result");
            return None;
        }
        *published = Some(Arc::clone(&output));
        Some(output)
    }

    /// Run the pipeline under a fresh ticket; returns the output only if it
    /// was published
    pub fn run(&self, bytes: &[u8], schema: &dyn ModelSchema) -> Option<Arc<PipelineOutput>> {
        let ticket = self.begin();
        self.publish_shared(ticket, Arc::new(run(bytes, schema, &self.config)))
    }

    /// Most recently published output
    pub fn latest(&self) -> Option<Arc<PipelineOutput>> {
        self.lock().clone()
    }

    /// Drop the published output
    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<PipelineOutput>>> {
        self.published.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Complexity;
    use crate::decode::{JsonSchema, OnnxSchema};
    use crate::error::DecodeError;
    use crate::proto::extensions::{make_node, make_tensor_value_info};
    use crate::proto::{GraphProto, ModelProto, OperatorSetIdProto};
    use prost::Message;
    use std::thread;

    fn conv_model_bytes() -> Vec<u8> {
        let model = ModelProto {
            ir_version: 8,
            producer_name: "pytorch".to_string(),
            producer_version: "2.1".to_string(),
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: 17,
            }],
            graph: Some(GraphProto {
                name: "main".to_string(),
                node: vec![
                    make_node("Conv", &["x", "w", "b"], &["y"], "conv0"),
                    make_node("Relu", &["y"], &["z"], "relu0"),
                ],
                input: vec![make_tensor_value_info("x", 1, &[1, 3, 8, 8])],
                output: vec![make_tensor_value_info("z", 1, &[1, 4, 8, 8])],
                ..Default::default()
            }),
            ..Default::default()
        };
        model.encode_to_vec()
    }

    #[test]
    fn test_run_success() {
        let output = run(&conv_model_bytes(), &OnnxSchema, &LayoutConfig::default());
        let loaded = output.loaded().unwrap();

        assert_eq!(loaded.model.producer, "pytorch 2.1");
        assert_eq!(loaded.model.opset_version.as_deref(), Some("17"));
        assert_eq!(loaded.model.graph_name, "main");
        assert_eq!(loaded.analysis.total_nodes, 2);
        assert_eq!(loaded.graph.nodes.len(), 5);
        assert_eq!(loaded.graph.edges.len(), 4);
        assert!(output.error().is_none());
    }

    #[test]
    fn test_corrupt_bytes_fallback() {
        let output = run(&[0x0a, 0xff, 0xff], &OnnxSchema, &LayoutConfig::default());

        assert!(!output.is_loaded());
        assert!(!output.error().unwrap().is_empty());

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["parsingMethod"], "fallback");
        assert_eq!(json["stage"], "decode");
        assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn test_empty_graph_is_not_failure() {
        let output = run(&[], &OnnxSchema, &LayoutConfig::default());
        let loaded = output.loaded().unwrap();

        assert!(loaded.graph.nodes.is_empty());
        assert!(loaded.graph.edges.is_empty());
        assert_eq!(loaded.analysis.total_nodes, 0);
        assert_eq!(loaded.analysis.total_inputs, 0);
        assert_eq!(loaded.analysis.total_outputs, 0);
        assert_eq!(loaded.analysis.total_initializers, 0);
        assert!(loaded.analysis.operator_frequency.is_empty());
        assert_eq!(loaded.analysis.model_complexity, Complexity::Low);
        assert!(!loaded.warnings.is_empty());
    }

    #[test]
    fn test_layout_failure_fallback() {
        let config = LayoutConfig {
            node_sep: -5.0,
            ..Default::default()
        };
        let output = run(&conv_model_bytes(), &OnnxSchema, &config);

        match output {
            PipelineOutput::Fallback { stage, error } => {
                assert_eq!(stage, Stage::Layout);
                assert!(error.contains("node_sep"));
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_success_serialization() {
        let output = run(&conv_model_bytes(), &OnnxSchema, &LayoutConfig::default());
        let json = serde_json::to_value(&output).unwrap();

        assert_eq!(json["parsingMethod"], "runtime-load");
        assert_eq!(json["analysis"]["totalNodes"], 2);
        assert_eq!(json["analysis"]["operatorFrequency"]["Conv"], 1);
        assert_eq!(json["model"]["producer"], "pytorch 2.1");
        assert!(json["graph"]["nodes"].as_array().is_some_and(|n| n.len() == 5));
    }

    #[test]
    fn test_json_schema_run() {
        let json = br#"{
            "graph": {
                "nodes": [{"op_type": "Relu", "input": ["a"], "output": ["b"]}],
                "inputs": [{"name": "a"}],
                "outputs": [{"name": "b"}]
            }
        }"#;
        let output = run(json, &JsonSchema, &LayoutConfig::default());
        let loaded = output.loaded().unwrap();

        assert_eq!(loaded.model.producer, "Unknown Unknown");
        assert_eq!(loaded.analysis.operator_frequency["Relu"], 1);
    }

    #[test]
    fn test_run_missing_file() {
        let output = run_file("/nonexistent/model.onnx", &LayoutConfig::default());
        assert!(matches!(
            output,
            PipelineOutput::Fallback {
                stage: Stage::Decode,
                ..
            }
        ));
    }

    #[test]
    fn test_run_file_with_config() {
        let dir = std::env::temp_dir();
        let stem = format!("graphviz_pipeline_{}", std::process::id());
        let model_path = dir.join(format!("{}.onnx", stem));
        let good = dir.join(format!("{}_good.toml", stem));
        let bad = dir.join(format!("{}_bad.toml", stem));
        std::fs::write(&model_path, conv_model_bytes()).unwrap();
        std::fs::write(&good, "rank_sep = 80.0\n").unwrap();
        std::fs::write(&bad, "node_sep = \"wide\"\n").unwrap();

        let loaded = run_file_with_config(&model_path, &good);
        let malformed = run_file_with_config(&model_path, &bad);
        let missing = run_file_with_config(&model_path, dir.join("no_such_layout.toml"));

        for path in [&model_path, &good, &bad] {
            std::fs::remove_file(path).unwrap();
        }

        assert!(loaded.is_loaded());
        for output in [malformed, missing] {
            assert!(matches!(
                output,
                PipelineOutput::Fallback {
                    stage: Stage::Layout,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_session_latest_wins() {
        let session = PipelineSession::new(LayoutConfig::default());

        let first = session.begin();
        let second = session.begin();
        assert!(first < second);
        assert!(!session.is_current(first));

        let ok = run(&conv_model_bytes(), &OnnxSchema, session.config());
        let bad = run(&[0xff], &OnnxSchema, session.config());

        assert!(session.publish(second, ok));
        assert!(!session.publish(first, bad));
        assert!(session.latest().unwrap().is_loaded());
    }

    #[test]
    fn test_session_run_publishes() {
        let session = PipelineSession::default();
        assert!(session.latest().is_none());

        let published = session.run(&conv_model_bytes(), &OnnxSchema).unwrap();
        assert!(published.is_loaded());
        assert!(Arc::ptr_eq(&published, &session.latest().unwrap()));

        session.clear();
        assert!(session.latest().is_none());
    }

    #[test]
    fn test_session_run_returns_its_own_output() {
        let session = Arc::new(PipelineSession::default());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    let name = format!("graph_{}", i);
                    let model = ModelProto {
                        graph: Some(GraphProto {
                            name: name.clone(),
                            node: vec![make_node("Relu", &["x"], &["y"], "relu")],
                            ..Default::default()
                        }),
                        ..Default::default()
                    };
                    let output = session.run(&model.encode_to_vec(), &OnnxSchema);
                    (name, output)
                })
            })
            .collect();

        for handle in handles {
            let (name, output) = handle.join().unwrap();
            if let Some(output) = output {
                assert_eq!(output.loaded().unwrap().model.graph_name, name);
            }
        }
    }

    #[test]
    fn test_session_concurrent_runs() {
        let session = Arc::new(PipelineSession::default());
        let bytes = conv_model_bytes();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let session = Arc::clone(&session);
                let bytes = bytes.clone();
                thread::spawn(move || session.run(&bytes, &OnnxSchema).is_some())
            })
            .collect();

        let published = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|p| *p)
            .count();

        assert!(published >= 1);
        assert!(session.latest().unwrap().is_loaded());

        // A run started now supersedes everything before it
        let stale = session.begin();
        let fresh = session.begin();
        let err = VizError::from(DecodeError::Read("stale".to_string()));
        assert!(!session.publish(stale, PipelineOutput::from_error(&err)));
        assert!(session.is_current(fresh));
    }
}
