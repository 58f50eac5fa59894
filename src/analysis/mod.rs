//! Model summary statistics
//!
//! A single pass over the canonical graph's operators.

use indexmap::IndexMap;
use serde::Serialize;

use crate::graph::CanonicalGraph;

/// Operator count above which a model is `Medium`
pub const MEDIUM_THRESHOLD: usize = 100;
/// Operator count above which a model is `High`
pub const HIGH_THRESHOLD: usize = 1000;

/// Coarse size classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Complexity {
    /// At most 100 operators
    Low,
    /// 101 to 1000 operators
    Medium,
    /// More than 1000 operators
    High,
}

impl Complexity {
    /// Classify by operator count
    pub fn from_operator_count(count: usize) -> Self {
        if count > HIGH_THRESHOLD {
            Complexity::High
        } else if count > MEDIUM_THRESHOLD {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }
}

/// Counts and operator histogram of one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Declared graph inputs
    pub total_inputs: usize,
    /// Declared graph outputs
    pub total_outputs: usize,
    /// Operator nodes
    pub total_nodes: usize,
    /// Initializers
    pub total_initializers: usize,
    /// Size classification
    pub model_complexity: Complexity,
    /// Op type → occurrences, in first-seen order
    pub operator_frequency: IndexMap<String, usize>,
}

impl Analysis {
    /// The `n` most frequent op types, ties kept in first-seen order
    pub fn top_operators(&self, n: usize) -> Vec<(&str, usize)> {
        let mut sorted: Vec<_> = self
            .operator_frequency
            .iter()
            .map(|(op, count)| (op.as_str(), *count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }
}

/// Summarize a canonical graph
pub fn summarize(graph: &CanonicalGraph) -> Analysis {
    let mut operator_frequency: IndexMap<String, usize> = IndexMap::new();
    let mut total_nodes = 0;

    for (_, info) in graph.operators() {
        total_nodes += 1;
        *operator_frequency.entry(info.op_type.clone()).or_insert(0) += 1;
    }

    Analysis {
        total_inputs: graph.declared_inputs(),
        total_outputs: graph.declared_outputs(),
        total_nodes,
        total_initializers: graph.initializer_count(),
        model_complexity: Complexity::from_operator_count(total_nodes),
        operator_frequency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{RawGraph, RawModel, RawNode, RawTensor, RawValueInfo};
    use crate::graph::build;

    fn chain_model(count: usize) -> RawModel {
        let nodes = (0..count)
            .map(|i| {
                let op = if i % 2 == 0 { "Conv" } else { "Relu" };
                let input = format!("t{}", i);
                let output = format!("t{}", i + 1);
                RawNode::new(op, &[input.as_str()], &[output.as_str()])
            })
            .collect();

        RawModel {
            graph: RawGraph {
                nodes,
                inputs: vec![RawValueInfo::named("t0")],
                outputs: vec![RawValueInfo::named(format!("t{}", count))],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_complexity_thresholds() {
        assert_eq!(Complexity::from_operator_count(0), Complexity::Low);
        assert_eq!(Complexity::from_operator_count(100), Complexity::Low);
        assert_eq!(Complexity::from_operator_count(101), Complexity::Medium);
        assert_eq!(Complexity::from_operator_count(1000), Complexity::Medium);
        assert_eq!(Complexity::from_operator_count(1001), Complexity::High);
    }

    #[test]
    fn test_empty_graph_summary() {
        let analysis = summarize(&build(&RawModel::default()));

        assert_eq!(analysis.total_inputs, 0);
        assert_eq!(analysis.total_outputs, 0);
        assert_eq!(analysis.total_nodes, 0);
        assert_eq!(analysis.total_initializers, 0);
        assert!(analysis.operator_frequency.is_empty());
        assert_eq!(analysis.model_complexity, Complexity::Low);
    }

    #[test]
    fn test_histogram_sums_to_total() {
        let analysis = summarize(&build(&chain_model(7)));

        assert_eq!(analysis.total_nodes, 7);
        assert_eq!(analysis.operator_frequency["Conv"], 4);
        assert_eq!(analysis.operator_frequency["Relu"], 3);
        assert_eq!(
            analysis.operator_frequency.values().sum::<usize>(),
            analysis.total_nodes
        );
        assert!(!analysis.operator_frequency.contains_key("Add"));
    }

    #[test]
    fn test_high_complexity() {
        let analysis = summarize(&build(&chain_model(1500)));
        assert_eq!(analysis.total_nodes, 1500);
        assert_eq!(analysis.model_complexity, Complexity::High);
    }

    #[test]
    fn test_counts_declared_endpoints_and_initializers() {
        let mut model = chain_model(2);
        model.graph.initializers.push(RawTensor {
            name: "W".to_string(),
            data_type: "FLOAT".to_string(),
            dims: vec!["3".to_string()],
            data: "<12 bytes>".to_string(),
        });
        let analysis = summarize(&build(&model));

        assert_eq!(analysis.total_inputs, 1);
        assert_eq!(analysis.total_outputs, 1);
        assert_eq!(analysis.total_initializers, 1);
    }

    #[test]
    fn test_serialized_keys() {
        let analysis = summarize(&build(&chain_model(1)));
        let json = serde_json::to_value(&analysis).unwrap();

        assert_eq!(json["totalNodes"], 1);
        assert_eq!(json["modelComplexity"], "Low");
        assert_eq!(json["operatorFrequency"]["Conv"], 1);
    }

    #[test]
    fn test_top_operators() {
        let analysis = summarize(&build(&chain_model(5)));
        assert_eq!(analysis.top_operators(1), vec![("Conv", 3)]);
    }
}
