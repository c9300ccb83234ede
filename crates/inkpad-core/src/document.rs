//! JSON snapshots of a stroke set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::Path;
use crate::stroke_set::{StrokeSet, merge_add};

/// Current snapshot format version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Document errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(u32),
    #[error("IO error: {0}")]
    Io(String),
}

/// A saved stroke set, back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeDocument {
    pub version: u32,
    pub strokes: Vec<Path>,
}

impl Default for StrokeDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            strokes: Vec::new(),
        }
    }
}

impl StrokeDocument {
    /// Snapshot a stroke set.
    pub fn from_stroke_set(strokes: &StrokeSet) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            strokes: strokes.paths().to_vec(),
        }
    }

    /// Rebuild a stroke set. Duplicate ids and degenerate paths are dropped.
    pub fn into_stroke_set(self) -> StrokeSet {
        merge_add(&StrokeSet::new(), &self.strokes).into_owned()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(|e| DocumentError::Serialization(e.to_string()))
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let document: Self = serde_json::from_str(json).map_err(|e| DocumentError::Serialization(e.to_string()))?;
        if document.version != DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion(document.version));
        }
        Ok(document)
    }

    /// Write the document to a file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json)
            .map_err(|e| DocumentError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::debug!("Saved {} strokes to {}", self.strokes.len(), path.display());
        Ok(())
    }

    /// Read a document from a file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DocumentError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}
