//! Model decoding
//!
//! Turns a raw byte buffer into a [`RawModel`] using a [`ModelSchema`]
//! collaborator.
//!
//! # Example
//!
//! ```ignore
//! use onnx_graphviz::decode::{decode, OnnxSchema};
//!
//! let bytes = std::fs::read("model.onnx")?;
//! let model = decode(&bytes, &OnnxSchema)?;
//! println!("{} nodes", model.graph.nodes.len());
//! ```

pub mod normalize;
pub mod raw;
pub mod validation;

// Re-exports
pub use raw::{
    AttributeValue, RawGraph, RawModel, RawNode, RawOpset, RawTensor, RawValueInfo,
    UNKNOWN_PRODUCER,
};
pub use validation::{validate_model, ValidationReport};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use prost::Message;
use tracing::debug;

use crate::error::DecodeError;
use crate::proto::ModelProto;

/// Schema collaborator: knows how to read one serialized model format
pub trait ModelSchema {
    /// Short schema identifier used in logs
    fn name(&self) -> &str;

    /// Decode a whole buffer into the plain model form
    fn decode_model(&self, bytes: &[u8]) -> Result<RawModel, DecodeError>;
}

/// ONNX protobuf wire format
#[derive(Debug, Clone, Copy, Default)]
pub struct OnnxSchema;

impl ModelSchema for OnnxSchema {
    fn name(&self) -> &str {
        "onnx"
    }

    fn decode_model(&self, bytes: &[u8]) -> Result<RawModel, DecodeError> {
        let proto = ModelProto::decode(bytes)?;
        Ok(normalize::model_from_proto(&proto))
    }
}

/// The plain model form serialized as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchema;

impl ModelSchema for JsonSchema {
    fn name(&self) -> &str {
        "json"
    }

    fn decode_model(&self, bytes: &[u8]) -> Result<RawModel, DecodeError> {
        let model: RawModel = serde_json::from_slice(bytes)?;
        Ok(model.with_producer_defaults())
    }
}

/// Decode `bytes` with `schema`
pub fn decode(bytes: &[u8], schema: &dyn ModelSchema) -> Result<RawModel, DecodeError> {
    debug!(schema = schema.name(), bytes = bytes.len(), "decoding model");

    let model = schema.decode_model(bytes)?;

    debug!(
        nodes = model.graph.nodes.len(),
        inputs = model.graph.inputs.len(),
        outputs = model.graph.outputs.len(),
        initializers = model.graph.initializers.len(),
        "decoded model"
    );

    Ok(model)
}

/// Read a model file into memory
pub fn read_model_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, DecodeError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| {
        DecodeError::Read(format!("Failed to open file '{}': {}", path.display(), e))
    })?;

    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();

    reader.read_to_end(&mut buffer).map_err(|e| {
        DecodeError::Read(format!("Failed to read file '{}': {}", path.display(), e))
    })?;

    Ok(buffer)
}

/// Pick a schema from a file extension: `.json` selects [`JsonSchema`],
/// anything else [`OnnxSchema`]
pub fn schema_for_path(path: &Path) -> &'static dyn ModelSchema {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => &JsonSchema,
        _ => &OnnxSchema,
    }
}
