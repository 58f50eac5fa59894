//! Extension methods for ONNX protobuf types
//!
//! Symbolic rendering of enum codes plus small constructors used by tests and
//! the demo program.

use super::onnx::*;

// ============================================================================
// Enum rendering
// ============================================================================

/// Render a `TensorProto.DataType` code as its symbolic name.
///
/// Codes unknown to this schema render as their decimal value.
pub fn data_type_name(code: i32) -> String {
    tensor_proto::DataType::try_from(code)
        .map(|dt| dt.as_str_name().to_string())
        .unwrap_or_else(|_| code.to_string())
}

/// Render an `AttributeProto.AttributeType` code as its symbolic name.
pub fn attribute_type_name(code: i32) -> String {
    attribute_proto::AttributeType::try_from(code)
        .map(|ty| ty.as_str_name().to_string())
        .unwrap_or_else(|_| code.to_string())
}

// ============================================================================
// AttributeProto extensions
// ============================================================================

impl AttributeProto {
    /// Attribute kind, inferring it from the populated field when the
    /// `type` tag is missing (IR version < 3 models omit it).
    pub fn kind(&self) -> attribute_proto::AttributeType {
        use attribute_proto::AttributeType;

        if let Ok(kind) = AttributeType::try_from(self.r#type) {
            if kind != AttributeType::Undefined {
                return kind;
            }
        }

        if !self.ints.is_empty() {
            AttributeType::Ints
        } else if !self.floats.is_empty() {
            AttributeType::Floats
        } else if !self.strings.is_empty() {
            AttributeType::Strings
        } else if !self.tensors.is_empty() {
            AttributeType::Tensors
        } else if !self.graphs.is_empty() {
            AttributeType::Graphs
        } else if self.t.is_some() {
            AttributeType::Tensor
        } else if self.g.is_some() {
            AttributeType::Graph
        } else if !self.s.is_empty() {
            AttributeType::String
        } else if self.i != 0 {
            AttributeType::Int
        } else if self.f != 0.0 {
            AttributeType::Float
        } else {
            AttributeType::Undefined
        }
    }

    /// Create a new integer attribute
    pub fn new_int(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            i: value,
            r#type: attribute_proto::AttributeType::Int as i32,
            ..Default::default()
        }
    }

    /// Create a new ints attribute
    pub fn new_ints(name: &str, values: Vec<i64>) -> Self {
        Self {
            name: name.to_string(),
            ints: values,
            r#type: attribute_proto::AttributeType::Ints as i32,
            ..Default::default()
        }
    }

    /// Create a new string attribute
    pub fn new_string(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            s: value.as_bytes().to_vec(),
            r#type: attribute_proto::AttributeType::String as i32,
            ..Default::default()
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Create a new ValueInfoProto for a tensor
pub fn make_tensor_value_info(name: &str, elem_type: i32, shape: &[i64]) -> ValueInfoProto {
    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type,
                shape: Some(TensorShapeProto {
                    dim: shape
                        .iter()
                        .map(|&d| tensor_shape_proto::Dimension {
                            value: Some(tensor_shape_proto::dimension::Value::DimValue(d)),
                            denotation: String::new(),
                        })
                        .collect(),
                }),
            })),
            denotation: String::new(),
        }),
        doc_string: String::new(),
    }
}

/// Create a new NodeProto
pub fn make_node(op_type: &str, inputs: &[&str], outputs: &[&str], name: &str) -> NodeProto {
    NodeProto {
        op_type: op_type.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: outputs.iter().map(|s| s.to_string()).collect(),
        name: name.to_string(),
        ..Default::default()
    }
}
