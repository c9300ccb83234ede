//! Inkpad application shell.
//!
//! A headless host for the drawing surface: it replays recorded device-event
//! scripts through a [`SurfaceController`](inkpad_core::SurfaceController)
//! and exports the result as SVG and as a stroke document.

pub mod replay;
pub mod script;
pub mod svg;

pub use replay::{ReplayOptions, ReplayReport, replay, run_replay};
pub use script::{Script, ScriptSurface, Step, SurfaceLayout};
pub use svg::SvgRenderer;

use inkpad_core::{ConfigError, DocumentError};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
    #[error("Script error: {0}")]
    Script(String),
    #[error("IO error: {0}")]
    Io(String),
}
