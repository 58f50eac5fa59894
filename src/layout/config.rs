//! Layout configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! node_sep = 40.0
//! rank_sep = 120.0
//! operator_width = 220.0
//! operator_height = 150.0
//! crossing_passes = 24
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LayoutError};
use crate::graph::NodeKind;

/// Geometry and search parameters for [`layout`](super::layout)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum gap between neighbouring nodes of one layer
    pub node_sep: f64,
    /// Minimum gap between routed edge lanes (dummy nodes) of one layer
    pub edge_sep: f64,
    /// Gap between adjacent layers
    pub rank_sep: f64,
    /// Empty border around the drawing
    pub margin: f64,
    /// Operator node width
    pub operator_width: f64,
    /// Operator node height
    pub operator_height: f64,
    /// Input/output node width
    pub io_width: f64,
    /// Input/output node height
    pub io_height: f64,
    /// Tensor names longer than this are cut with an ellipsis
    pub max_label_chars: usize,
    /// Barycenter sweeps for crossing minimization
    pub crossing_passes: usize,
    /// Alignment sweeps during coordinate assignment
    pub alignment_passes: usize,
    /// Smallest zoom factor the viewport accepts
    pub min_scale: f64,
    /// Largest zoom factor the viewport accepts
    pub max_scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_sep: 40.0,
            edge_sep: 10.0,
            rank_sep: 120.0,
            margin: 20.0,
            operator_width: 220.0,
            operator_height: 150.0,
            io_width: 160.0,
            io_height: 44.0,
            max_label_chars: 24,
            crossing_passes: 24,
            alignment_passes: 8,
            min_scale: 0.1,
            max_scale: 4.0,
        }
    }
}

impl LayoutConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Fixed `(width, height)` for a node kind
    pub fn size_for(&self, kind: &NodeKind) -> (f64, f64) {
        match kind {
            NodeKind::Operator(_) => (self.operator_width, self.operator_height),
            NodeKind::Input | NodeKind::Output => (self.io_width, self.io_height),
        }
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), LayoutError> {
        let spacing = [
            ("node_sep", self.node_sep),
            ("edge_sep", self.edge_sep),
            ("rank_sep", self.rank_sep),
            ("margin", self.margin),
        ];
        for (name, value) in spacing {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{} must be a finite value >= 0, got {}",
                    name, value
                )));
            }
        }

        let sizes = [
            ("operator_width", self.operator_width),
            ("operator_height", self.operator_height),
            ("io_width", self.io_width),
            ("io_height", self.io_height),
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{} must be a finite value > 0, got {}",
                    name, value
                )));
            }
        }

        if self.max_label_chars == 0 {
            return Err(LayoutError::InvalidConfig(
                "max_label_chars must be at least 1".to_string(),
            ));
        }

        if self.min_scale > self.max_scale {
            return Err(LayoutError::InvalidConfig(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }

        // Reset returns to scale 1, which must be reachable
        if self.min_scale > 1.0 || self.max_scale < 1.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "scale range [{}, {}] must contain 1",
                self.min_scale, self.max_scale
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = LayoutConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.operator_width > c.io_width);
        assert!(c.operator_height > c.io_height);
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
node_sep = 25.0
rank_sep = 80.0
crossing_passes = 4
"#;
        let c = LayoutConfig::from_toml(toml).unwrap();
        assert_eq!(c.node_sep, 25.0);
        assert_eq!(c.rank_sep, 80.0);
        assert_eq!(c.crossing_passes, 4);
        assert_eq!(c.margin, LayoutConfig::default().margin);
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = LayoutConfig::default();
        let toml = c.to_toml().unwrap();
        let back = LayoutConfig::from_toml(&toml).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_from_toml_rejects_bad_type() {
        assert!(matches!(
            LayoutConfig::from_toml("node_sep = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let err = LayoutConfig::from_file(Path::new("/nonexistent/layout.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/layout.toml"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let c = LayoutConfig {
            node_sep: -1.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = LayoutConfig {
            io_width: f64::NAN,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = LayoutConfig {
            min_scale: 5.0,
            max_scale: 2.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = LayoutConfig {
            min_scale: 1.5,
            max_scale: 3.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = LayoutConfig {
            min_scale: 0.2,
            max_scale: 0.8,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = LayoutConfig {
            max_label_chars: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }
}
