//! Descriptive label lines for nodes
//!
//! Operators get one line per recognised attribute, rendered `Key: value`.
//! Missing values render as an en-dash so every operator of one kind has the
//! same number of lines.

use crate::decode::{AttributeValue, RawNode};

/// Placeholder for a recognised attribute the node does not carry
pub const MISSING: &str = "\u{2013}";

/// Appended to truncated names
pub const ELLIPSIS: char = '\u{2026}';

const CONV_LIKE: &[&str] = &["Conv", "ConvTranspose", "ConvInteger", "DeformConv"];
const POOL_LIKE: &[&str] = &["MaxPool", "AveragePool", "LpPool", "MaxRoiPool"];
const GEMM_LIKE: &[&str] = &["Gemm", "MatMul", "MatMulInteger"];
const AXIS_OPS: &[&str] = &[
    "Concat",
    "Softmax",
    "LogSoftmax",
    "Flatten",
    "Gather",
    "Split",
    "ArgMax",
    "ArgMin",
];

/// Descriptive lines for an operator (the op type line itself is not included)
pub fn describe_operator(node: &RawNode, op_type: &str) -> Vec<String> {
    if CONV_LIKE.contains(&op_type) {
        vec![
            line("Weights", input_at(node, 1)),
            line("Bias", input_at(node, 2)),
            line("Kernel", ints_attr(node, "kernel_shape", "×")),
            line("Strides", ints_attr(node, "strides", "×")),
            line("Padding", padding(node)),
            line("Dilations", ints_attr(node, "dilations", "×")),
        ]
    } else if POOL_LIKE.contains(&op_type) {
        vec![
            line("Kernel", ints_attr(node, "kernel_shape", "×")),
            line("Strides", ints_attr(node, "strides", "×")),
            line("Padding", padding(node)),
        ]
    } else if GEMM_LIKE.contains(&op_type) {
        let mut lines = vec![line("Weights", input_at(node, 1))];
        if op_type == "Gemm" {
            lines.push(line("Bias", input_at(node, 2)));
        }
        lines
    } else if AXIS_OPS.contains(&op_type) {
        vec![line("Axis", attr(node, "axis", ", "))]
    } else if op_type == "Transpose" {
        vec![line("Perm", ints_attr(node, "perm", ", "))]
    } else if op_type == "Reshape" {
        vec![line("Shape", input_at(node, 1))]
    } else if op_type == "BatchNormalization" || op_type == "LayerNormalization" {
        vec![line("Epsilon", attr(node, "epsilon", ", "))]
    } else {
        Vec::new()
    }
}

/// Truncate `name` to at most `max_chars` characters, ending in `…` when cut
pub fn truncate_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut out: String = name.chars().take(max_chars - 1).collect();
    out.push(ELLIPSIS);
    out
}

fn line(key: &str, value: Option<String>) -> String {
    format!("{}: {}", key, value.as_deref().unwrap_or(MISSING))
}

fn input_at(node: &RawNode, index: usize) -> Option<String> {
    node.input.get(index).filter(|s| !s.is_empty()).cloned()
}

fn attr(node: &RawNode, name: &str, sep: &str) -> Option<String> {
    node.get_attribute(name).map(|v| v.render(sep))
}

fn ints_attr(node: &RawNode, name: &str, sep: &str) -> Option<String> {
    node.get_attribute(name)
        .and_then(AttributeValue::as_ints)
        .filter(|v| !v.is_empty())
        .map(|v| v.join(sep))
}

/// Explicit `pads`, else a non-default `auto_pad` mode
fn padding(node: &RawNode) -> Option<String> {
    ints_attr(node, "pads", ", ").or_else(|| match node.get_attribute("auto_pad") {
        Some(AttributeValue::String(mode)) if !mode.is_empty() && mode != "NOTSET" => {
            Some(mode.clone())
        }
        _ => None,
    })
}
