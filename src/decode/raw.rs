//! Normalized model representation
//!
//! `RawModel` is the plain form every schema decodes into: 64-bit integers are
//! decimal strings, enums are symbolic names, byte blobs are opaque handles and
//! every repeated field is present (possibly empty). It serializes to JSON with
//! camelCase keys, which is also the input format of
//! [`JsonSchema`](super::JsonSchema).

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Producer name/version used when the model leaves them empty
pub const UNKNOWN_PRODUCER: &str = "Unknown";

fn unknown() -> String {
    UNKNOWN_PRODUCER.to_string()
}

fn zero() -> String {
    "0".to_string()
}

/// Decoded model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModel {
    /// IR version (decimal)
    #[serde(default = "zero", deserialize_with = "decimal")]
    pub ir_version: String,
    /// Producing tool
    #[serde(default = "unknown")]
    pub producer_name: String,
    /// Producing tool version
    #[serde(default = "unknown")]
    pub producer_version: String,
    /// Model namespace
    #[serde(default)]
    pub domain: String,
    /// Model version (decimal)
    #[serde(default = "zero", deserialize_with = "decimal")]
    pub model_version: String,
    /// Operator set imports
    #[serde(default)]
    pub opset_import: Vec<RawOpset>,
    /// The main graph
    #[serde(default)]
    pub graph: RawGraph,
}

impl Default for RawModel {
    fn default() -> Self {
        Self {
            ir_version: zero(),
            producer_name: unknown(),
            producer_version: unknown(),
            domain: String::new(),
            model_version: zero(),
            opset_import: Vec::new(),
            graph: RawGraph::default(),
        }
    }
}

impl RawModel {
    /// Replace empty producer fields with [`UNKNOWN_PRODUCER`]
    pub fn with_producer_defaults(mut self) -> Self {
        if self.producer_name.is_empty() {
            self.producer_name = unknown();
        }
        if self.producer_version.is_empty() {
            self.producer_version = unknown();
        }
        self
    }

    /// `"<name> <version>"`
    pub fn producer(&self) -> String {
        format!("{} {}", self.producer_name, self.producer_version)
    }

    /// Version of the default (`ai.onnx`) operator set, if imported
    pub fn default_opset_version(&self) -> Option<&str> {
        self.opset_import
            .iter()
            .find(|op| op.domain.is_empty() || op.domain == "ai.onnx")
            .map(|op| op.version.as_str())
    }
}

/// Operator set import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOpset {
    /// Operator domain (empty for `ai.onnx`)
    #[serde(default)]
    pub domain: String,
    /// Opset version (decimal)
    #[serde(default = "zero", deserialize_with = "decimal")]
    pub version: String,
}

/// Decoded graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGraph {
    /// Graph name
    #[serde(default)]
    pub name: String,
    /// Operators in file order
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    /// Declared graph inputs
    #[serde(default)]
    pub inputs: Vec<RawValueInfo>,
    /// Declared graph outputs
    #[serde(default)]
    pub outputs: Vec<RawValueInfo>,
    /// Constant tensors
    #[serde(default)]
    pub initializers: Vec<RawTensor>,
    /// Intermediate value annotations
    #[serde(default)]
    pub value_info: Vec<RawValueInfo>,
}

/// Named, typed graph endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValueInfo {
    /// Tensor name
    pub name: String,
    /// Rendered type, e.g. `tensor(FLOAT)[1,3,224,224]`
    #[serde(rename = "type", default = "unknown_type")]
    pub type_name: String,
    /// Element type symbol, when the value is a tensor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem_type: Option<String>,
    /// Dimensions as decimal strings or symbolic parameters
    #[serde(default)]
    pub shape: Vec<String>,
}

fn unknown_type() -> String {
    "unknown".to_string()
}

impl RawValueInfo {
    /// Value info with a name only
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: unknown_type(),
            elem_type: None,
            shape: Vec::new(),
        }
    }
}

/// Initializer; payload is kept as an opaque handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTensor {
    /// Tensor name
    #[serde(default)]
    pub name: String,
    /// Element type symbol
    #[serde(default = "undefined")]
    pub data_type: String,
    /// Dimensions (decimal)
    #[serde(default, deserialize_with = "decimal_vec")]
    pub dims: Vec<String>,
    /// Opaque payload handle, e.g. `<36 bytes>`
    #[serde(default)]
    pub data: String,
}

fn undefined() -> String {
    "UNDEFINED".to_string()
}

/// One operator invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// Operator kind, as spelled by the protobuf JSON mapping
    #[serde(rename = "opType", default, skip_serializing_if = "Option::is_none")]
    pub op_type: Option<String>,
    /// Operator kind, snake_case spelling used by some exporters
    #[serde(rename = "op_type", default, skip_serializing_if = "Option::is_none")]
    pub op_type_snake: Option<String>,
    /// Operator kind, generic spelling
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Node name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Operator domain
    #[serde(default)]
    pub domain: String,
    /// Consumed tensor names
    #[serde(default)]
    pub input: Vec<String>,
    /// Produced tensor names; the first one defines the node
    #[serde(default)]
    pub output: Vec<String>,
    /// Attributes by name, in declaration order
    #[serde(default)]
    pub attribute: IndexMap<String, AttributeValue>,
}

impl RawNode {
    /// Node with an op type and tensor lists
    pub fn new(op_type: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            op_type: Some(op_type.to_string()),
            input: inputs.iter().map(|s| s.to_string()).collect(),
            output: outputs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: &str, value: AttributeValue) -> Self {
        self.attribute.insert(name.to_string(), value);
        self
    }

    /// Resolve the operator kind: `opType`, then `op_type`, then `type`,
    /// then `Node <index>`. Empty strings count as absent.
    pub fn resolve_op_type(&self, index: usize) -> String {
        [&self.op_type, &self.op_type_snake, &self.type_name]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("Node {}", index))
    }

    /// Whether any op type spelling is present
    pub fn has_op_type(&self) -> bool {
        [&self.op_type, &self.op_type_snake, &self.type_name]
            .into_iter()
            .flatten()
            .any(|s| !s.is_empty())
    }

    /// Canonical name: first output, then node name, then `node-<index>`
    pub fn canonical_name(&self, index: usize) -> String {
        if let Some(out) = self.output.first().filter(|s| !s.is_empty()) {
            return out.clone();
        }
        if let Some(name) = self.name.as_ref().filter(|s| !s.is_empty()) {
            return name.clone();
        }
        format!("node-{}", index)
    }

    /// Get attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attribute.get(name)
    }
}

/// Attribute value in plain form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeValue {
    /// Single float
    Float(f32),
    /// Single 64-bit integer (decimal)
    Int(#[serde(deserialize_with = "decimal")] String),
    /// UTF-8 string (lossy)
    String(String),
    /// Opaque tensor handle
    Tensor(String),
    /// Opaque subgraph handle
    Graph(String),
    /// Float list
    Floats(Vec<f32>),
    /// Integer list (decimal)
    Ints(#[serde(deserialize_with = "decimal_vec")] Vec<String>),
    /// String list
    Strings(Vec<String>),
    /// Opaque tensor handles
    Tensors(Vec<String>),
    /// Opaque subgraph handles
    Graphs(Vec<String>),
    /// Kind not recognised; carries the type symbol
    Undefined(String),
}

impl AttributeValue {
    /// Integer list from native integers
    pub fn ints(values: &[i64]) -> Self {
        AttributeValue::Ints(values.iter().map(|v| v.to_string()).collect())
    }

    /// Integer list elements, if this is an integer list
    pub fn as_ints(&self) -> Option<&[String]> {
        match self {
            AttributeValue::Ints(values) => Some(values),
            _ => None,
        }
    }

    /// Render as one line of text, joining list elements with `sep`
    pub fn render(&self, sep: &str) -> String {
        fn join<T: ToString>(items: &[T], sep: &str) -> String {
            items
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(sep)
        }

        match self {
            AttributeValue::Float(f) => f.to_string(),
            AttributeValue::Int(i) => i.clone(),
            AttributeValue::String(s) => s.clone(),
            AttributeValue::Tensor(h) | AttributeValue::Graph(h) => h.clone(),
            AttributeValue::Floats(v) => join(v.as_slice(), sep),
            AttributeValue::Ints(v)
            | AttributeValue::Strings(v)
            | AttributeValue::Tensors(v)
            | AttributeValue::Graphs(v) => join(v.as_slice(), sep),
            AttributeValue::Undefined(kind) => format!("<{}>", kind),
        }
    }
}

// ============================================================================
// Decimal helpers: accept `"42"` or `42` for 64-bit integer fields
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl DecimalRepr {
    fn into_string(self) -> String {
        match self {
            DecimalRepr::Text(s) => s,
            DecimalRepr::Signed(v) => v.to_string(),
            DecimalRepr::Unsigned(v) => v.to_string(),
        }
    }
}

fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    DecimalRepr::deserialize(deserializer).map(DecimalRepr::into_string)
}

fn decimal_vec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Vec::<DecimalRepr>::deserialize(deserializer)
        .map(|items| items.into_iter().map(DecimalRepr::into_string).collect())
}
