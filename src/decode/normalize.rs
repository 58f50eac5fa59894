//! Conversion from protobuf messages to the plain [`RawModel`] form

use crate::proto::extensions::{attribute_type_name, data_type_name};
use crate::proto::{
    attribute_proto::AttributeType, tensor_shape_proto::dimension, type_proto, AttributeProto,
    GraphProto, ModelProto, NodeProto, TensorProto, ValueInfoProto,
};

use super::raw::{AttributeValue, RawGraph, RawModel, RawNode, RawOpset, RawTensor, RawValueInfo};

/// Convert a decoded `ModelProto` into its plain form
pub fn model_from_proto(model: &ModelProto) -> RawModel {
    RawModel {
        ir_version: model.ir_version.to_string(),
        producer_name: model.producer_name.clone(),
        producer_version: model.producer_version.clone(),
        domain: model.domain.clone(),
        model_version: model.model_version.to_string(),
        opset_import: model
            .opset_import
            .iter()
            .map(|op| RawOpset {
                domain: op.domain.clone(),
                version: op.version.to_string(),
            })
            .collect(),
        graph: model.graph.as_ref().map(graph_from_proto).unwrap_or_default(),
    }
    .with_producer_defaults()
}

/// Convert a `GraphProto`
pub fn graph_from_proto(graph: &GraphProto) -> RawGraph {
    RawGraph {
        name: graph.name.clone(),
        nodes: graph.node.iter().map(node_from_proto).collect(),
        inputs: graph.input.iter().map(value_info_from_proto).collect(),
        outputs: graph.output.iter().map(value_info_from_proto).collect(),
        initializers: graph.initializer.iter().map(tensor_from_proto).collect(),
        value_info: graph.value_info.iter().map(value_info_from_proto).collect(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Convert a `NodeProto`
pub fn node_from_proto(node: &NodeProto) -> RawNode {
    RawNode {
        op_type: non_empty(&node.op_type),
        op_type_snake: None,
        type_name: None,
        name: non_empty(&node.name),
        domain: node.domain.clone(),
        input: node.input.clone(),
        output: node.output.clone(),
        attribute: node
            .attribute
            .iter()
            .map(|attr| (attr.name.clone(), attribute_from_proto(attr)))
            .collect(),
    }
}

/// Convert an `AttributeProto` by its (possibly inferred) kind
pub fn attribute_from_proto(attr: &AttributeProto) -> AttributeValue {
    match attr.kind() {
        AttributeType::Float => AttributeValue::Float(attr.f),
        AttributeType::Int => AttributeValue::Int(attr.i.to_string()),
        AttributeType::String => AttributeValue::String(bytes_to_text(&attr.s)),
        AttributeType::Tensor => {
            AttributeValue::Tensor(attr.t.as_ref().map(tensor_handle).unwrap_or_default())
        }
        AttributeType::Graph => {
            AttributeValue::Graph(attr.g.as_ref().map(graph_handle).unwrap_or_default())
        }
        AttributeType::Floats => AttributeValue::Floats(attr.floats.clone()),
        AttributeType::Ints => {
            AttributeValue::Ints(attr.ints.iter().map(|v| v.to_string()).collect())
        }
        AttributeType::Strings => {
            AttributeValue::Strings(attr.strings.iter().map(|s| bytes_to_text(s)).collect())
        }
        AttributeType::Tensors => AttributeValue::Tensors(attr.tensors.iter().map(tensor_handle).collect()),
        AttributeType::Graphs => AttributeValue::Graphs(attr.graphs.iter().map(graph_handle).collect()),
        other => AttributeValue::Undefined(attribute_type_name(other as i32)),
    }
}

/// Convert a `ValueInfoProto`, rendering its type
pub fn value_info_from_proto(vi: &ValueInfoProto) -> RawValueInfo {
    let tensor = vi.r#type.as_ref().and_then(|t| match &t.value {
        Some(type_proto::Value::TensorType(tensor)) => Some(tensor),
        None => None,
    });

    let Some(tensor) = tensor else {
        return RawValueInfo::named(vi.name.clone());
    };

    let elem_type = data_type_name(tensor.elem_type);
    let shape: Vec<String> = tensor
        .shape
        .as_ref()
        .map(|s| {
            s.dim
                .iter()
                .map(|d| match &d.value {
                    Some(dimension::Value::DimValue(v)) => v.to_string(),
                    Some(dimension::Value::DimParam(p)) => p.clone(),
                    None => "?".to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let type_name = if tensor.shape.is_some() {
        format!("tensor({})[{}]", elem_type, shape.join(","))
    } else {
        format!("tensor({})", elem_type)
    };

    RawValueInfo {
        name: vi.name.clone(),
        type_name,
        elem_type: Some(elem_type),
        shape,
    }
}

/// Convert a `TensorProto`; the payload becomes an opaque handle
pub fn tensor_from_proto(tensor: &TensorProto) -> RawTensor {
    RawTensor {
        name: tensor.name.clone(),
        data_type: data_type_name(tensor.data_type),
        dims: tensor.dims.iter().map(|d| d.to_string()).collect(),
        data: payload_handle(tensor),
    }
}

fn payload_handle(tensor: &TensorProto) -> String {
    if !tensor.raw_data.is_empty() {
        return format!("<{} bytes>", tensor.raw_data.len());
    }

    let values = tensor.float_data.len()
        + tensor.int32_data.len()
        + tensor.string_data.len()
        + tensor.int64_data.len()
        + tensor.double_data.len()
        + tensor.uint64_data.len();

    if values == 0 {
        "<empty>".to_string()
    } else {
        format!("<{} values>", values)
    }
}

fn tensor_handle(tensor: &TensorProto) -> String {
    if tensor.name.is_empty() {
        payload_handle(tensor)
    } else {
        format!("{} {}", tensor.name, payload_handle(tensor))
    }
}

fn graph_handle(graph: &GraphProto) -> String {
    format!("<graph {}: {} nodes>", graph.name, graph.node.len())
}

fn bytes_to_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::{make_node, make_tensor_value_info};

    #[test]
    fn test_int64_renders_decimal() {
        let model = ModelProto {
            ir_version: 9,
            model_version: i64::MAX,
            ..Default::default()
        };
        let raw = model_from_proto(&model);
        assert_eq!(raw.ir_version, "9");
        assert_eq!(raw.model_version, "9223372036854775807");
    }

    #[test]
    fn test_missing_producer_is_unknown() {
        let raw = model_from_proto(&ModelProto::default());
        assert_eq!(raw.producer_name, "Unknown");
        assert_eq!(raw.producer_version, "Unknown");
        assert!(raw.graph.nodes.is_empty());
    }

    #[test]
    fn test_value_info_type_rendering() {
        let vi = make_tensor_value_info("x", 1, &[1, 3, 224, 224]);
        let raw = value_info_from_proto(&vi);
        assert_eq!(raw.type_name, "tensor(FLOAT)[1,3,224,224]");
        assert_eq!(raw.elem_type.as_deref(), Some("FLOAT"));

        let bare = value_info_from_proto(&ValueInfoProto {
            name: "y".to_string(),
            ..Default::default()
        });
        assert_eq!(bare.type_name, "unknown");
    }

    #[test]
    fn test_initializer_payload_is_opaque() {
        let tensor = TensorProto {
            name: "W".to_string(),
            dims: vec![8, 3, 3, 3],
            data_type: 1,
            raw_data: vec![0; 864],
            ..Default::default()
        };
        let raw = tensor_from_proto(&tensor);
        assert_eq!(raw.data_type, "FLOAT");
        assert_eq!(raw.dims, vec!["8", "3", "3", "3"]);
        assert_eq!(raw.data, "<864 bytes>");
    }

    #[test]
    fn test_node_attributes_in_order() {
        let mut node = make_node("Conv", &["X", "W"], &["Y"], "");
        node.attribute.push(AttributeProto::new_ints("kernel_shape", vec![3, 3]));
        node.attribute.push(AttributeProto::new_string("auto_pad", "SAME_UPPER"));
        node.attribute.push(AttributeProto::new_int("group", 1));

        let raw = node_from_proto(&node);
        assert_eq!(raw.op_type.as_deref(), Some("Conv"));
        assert!(raw.name.is_none());

        let keys: Vec<_> = raw.attribute.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["kernel_shape", "auto_pad", "group"]);
        assert_eq!(
            raw.attribute["auto_pad"],
            AttributeValue::String("SAME_UPPER".to_string())
        );
        assert_eq!(raw.attribute["group"], AttributeValue::Int("1".to_string()));
    }
}
