//! Inkpad Core Library
//!
//! Platform-agnostic input handling, path model and render pipeline for the
//! Inkpad collaborative drawing surface.

pub mod config;
pub mod controller;
pub mod document;
pub mod input;
pub mod path;
pub mod render;
pub mod scheduler;
pub mod stroke_set;
pub mod surface;
pub mod sync;
pub mod tools;
pub mod viewport;

pub use config::{ConfigError, SurfaceConfig};
pub use controller::SurfaceController;
pub use document::{DOCUMENT_VERSION, DocumentError, StrokeDocument};
pub use input::{DeviceEvent, Phase, PointerKind, PointerSample, Touch, TouchKind, TouchPolicy};
pub use path::{MIN_STROKE_POINTS, Path, StrokeId};
pub use render::{DisplayList, DrawCommand, RenderContext, Renderer, render};
pub use scheduler::{Debouncer, FrameScheduler, FrameWork, Instant};
pub use stroke_set::{ERASE_RADIUS, StrokeSet, hit_test, merge_add, merge_remove};
pub use surface::{EventSink, Subscription, Surface};
pub use sync::{Outbox, StrokeChange, SyncTransport};
pub use tools::{Gesture, Outcome, StrokeStyle, ToolKind, ToolManager};
pub use viewport::Viewport;
