//! Error types for onnx-graphviz
//!
//! Each pipeline stage has its own error enum; [`VizError`] wraps them for
//! callers that drive the whole chain.

use thiserror::Error;

/// Failure to turn a byte buffer into a [`RawModel`](crate::decode::RawModel)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The buffer does not conform to the protobuf schema
    #[error("Protobuf decode error: {0}")]
    Protobuf(String),

    /// The buffer is not valid JSON for the normalized model form
    #[error("JSON decode error: {0}")]
    Json(String),

    /// Could not read the input
    #[error("Failed to read model input: {0}")]
    Read(String),
}

impl From<prost::DecodeError> for DecodeError {
    fn from(err: prost::DecodeError) -> Self {
        DecodeError::Protobuf(err.to_string())
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

/// Failure while computing coordinates or routes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Layout configuration is unusable
    #[error("Invalid layout configuration: {0}")]
    InvalidConfig(String),

    /// An edge references a node id that is not part of the graph
    #[error("Edge {source_id} -> {target_id} references unknown node {missing}")]
    DanglingEdge {
        /// Edge source id
        source_id: String,
        /// Edge target id
        target_id: String,
        /// The id that could not be resolved
        missing: String,
    },

    /// Coordinate assignment produced a non-finite value
    #[error("Non-finite coordinate for node {0}")]
    NonFiniteCoordinate(String),

    /// Internal invariant broken during placement
    #[error("Layout failed: {0}")]
    Internal(String),
}

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("cannot read config '{path}': {source}")]
    Io {
        /// Path that failed to load
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialise error
    #[error("TOML serialise error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Umbrella error for the full pipeline
#[derive(Error, Debug)]
pub enum VizError {
    /// Decoding failed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Layout failed
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Configuration failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for pipeline operations
pub type VizResult<T> = Result<T, VizError>;

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_error_display() {
        let err = LayoutError::InvalidConfig("node_sep must be >= 0".to_string());
        assert!(err.to_string().contains("node_sep"));
    }

    #[test]
    fn test_from_prost_error() {
        let err = crate::proto::ModelProto::decode(&[0u8, 1, 2, 3][..]).unwrap_err();
        let decode: DecodeError = err.into();
        assert!(matches!(decode, DecodeError::Protobuf(_)));
        assert!(!decode.to_string().is_empty());
    }

    #[test]
    fn test_umbrella_is_transparent() {
        let err: VizError = DecodeError::Json("expected value".to_string()).into();
        assert_eq!(err.to_string(), "JSON decode error: expected value");
    }
}
