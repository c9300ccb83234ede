//! Surface configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::StrokeStyle;
use crate::viewport::Viewport;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Tunables for a drawing surface. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Color for new strokes.
    pub stroke_color: String,
    /// Width for new strokes, in content units.
    pub stroke_width: f64,
    /// Start with palm rejection enabled.
    pub palm_rejection: bool,
    /// Quiet period after the last resize before layout is recomputed.
    pub resize_debounce_ms: u64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Factor applied by one zoom in / zoom out step.
    pub zoom_step: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            stroke_color: "#1f1f1f".to_string(),
            stroke_width: 4.0,
            palm_rejection: false,
            resize_debounce_ms: 300,
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_step: 1.25,
        }
    }
}

impl SurfaceConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "stroke_width must be positive, got {}",
                self.stroke_width
            )));
        }
        if self.stroke_color.trim().is_empty() {
            return Err(ConfigError::Invalid("stroke_color is empty".to_string()));
        }
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) || !self.max_zoom.is_finite() {
            return Err(ConfigError::Invalid("zoom bounds must be finite and positive".to_string()));
        }
        if self.min_zoom > 1.0 || self.max_zoom < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds [{}, {}] must contain 1.0",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(ConfigError::Invalid(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        Ok(())
    }

    /// Style for newly drawn strokes.
    pub fn style(&self) -> StrokeStyle {
        StrokeStyle {
            color: self.stroke_color.clone(),
            width: self.stroke_width,
        }
    }

    /// A fresh viewport with the configured zoom bounds.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.min_zoom, self.max_zoom)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SurfaceConfig::default();
        assert_eq!(config.stroke_color, "#1f1f1f");
        assert_eq!(config.resize_debounce(), Duration::from_millis(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SurfaceConfig::from_json(r#"{"stroke_width": 2.5, "palm_rejection": true}"#).unwrap();
        assert!((config.stroke_width - 2.5).abs() < f64::EPSILON);
        assert!(config.palm_rejection);
        assert_eq!(config.resize_debounce_ms, 300);
        assert_eq!(config.style().width, 2.5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SurfaceConfig::from_json(r#"{"stroke_width": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SurfaceConfig::from_json(r#"{"min_zoom": 2.0, "max_zoom": 1.5}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SurfaceConfig::from_json(r#"{"zoom_step": 1.0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(SurfaceConfig::from_json("{not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SurfaceConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_viewport_uses_bounds() {
        let config = SurfaceConfig {
            min_zoom: 0.5,
            max_zoom: 2.0,
            ..SurfaceConfig::default()
        };
        let viewport = config.viewport();
        assert!((viewport.min_zoom - 0.5).abs() < f64::EPSILON);
        assert!((viewport.max_zoom - 2.0).abs() < f64::EPSILON);
    }
}
