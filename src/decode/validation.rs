//! Structural diagnostics for decoded models
//!
//! Nothing here rejects a model: the graph view renders whatever it is given.
//! The report lists the oddities a user may want to know about.

use rustc_hash::FxHashSet;

use super::raw::RawModel;

/// Diagnostics for one model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Non-critical issues, in discovery order
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Add a warning
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Whether no issues were found
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Inspect a decoded model
///
/// Checks performed:
/// - graph is empty
/// - node without any op type spelling
/// - node without outputs
/// - tensor produced by more than one node (the graph view keeps only the
///   first producer)
/// - declared graph output not produced by any node and not a graph input
/// - initializer never consumed
pub fn validate_model(model: &RawModel) -> ValidationReport {
    let mut report = ValidationReport::default();
    let graph = &model.graph;

    if graph.nodes.is_empty() {
        report.add_warning("Graph is empty (no nodes)");
    }

    let mut produced: FxHashSet<&str> = FxHashSet::default();
    let mut consumed: FxHashSet<&str> = FxHashSet::default();

    for (idx, node) in graph.nodes.iter().enumerate() {
        let label = node.canonical_name(idx);

        if !node.has_op_type() {
            report.add_warning(format!("Node {} ('{}') has no op type", idx, label));
        }

        if node.output.iter().all(|o| o.is_empty()) {
            report.add_warning(format!("Node {} ('{}') has no outputs", idx, label));
        }

        for output in node.output.iter().filter(|o| !o.is_empty()) {
            if !produced.insert(output.as_str()) {
                report.add_warning(format!(
                    "Tensor '{}' is produced by more than one node (again by node {})",
                    output, idx
                ));
            }
        }

        consumed.extend(node.input.iter().filter(|i| !i.is_empty()).map(|i| i.as_str()));
    }

    let graph_inputs: FxHashSet<&str> = graph.inputs.iter().map(|i| i.name.as_str()).collect();

    for output in &graph.outputs {
        if output.name.is_empty() {
            report.add_warning("Graph output has empty name");
        } else if !produced.contains(output.name.as_str())
            && !graph_inputs.contains(output.name.as_str())
        {
            report.add_warning(format!(
                "Graph output '{}' not produced by any node",
                output.name
            ));
        }
    }

    for init in &graph.initializers {
        if !init.name.is_empty() && !consumed.contains(init.name.as_str()) {
            report.add_warning(format!("Unused initializer: {}", init.name));
        }
    }

    report
}
