//! Replay scripts and the in-memory surface they drive.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use inkpad_core::{DeviceEvent, EventSink, Renderer, StrokeChange, Subscription, Surface, ToolKind};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::AppError;
use crate::svg::SvgRenderer;

/// Placement of the simulated surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceLayout {
    pub origin: Point,
    pub size: Size,
    pub device_pixel_ratio: f64,
}

impl Default for SurfaceLayout {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            size: Size::new(800.0, 600.0),
            device_pixel_ratio: 1.0,
        }
    }
}

impl SurfaceLayout {
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Deliver a device event through the surface's event binding.
    Event { event: DeviceEvent },
    Tool { tool: ToolKind },
    PalmRejection { enabled: bool },
    StrokeColor { color: String },
    StrokeWidth { width: f64 },
    ZoomIn,
    ZoomOut,
    /// A change arriving from another session.
    Remote { change: StrokeChange },
    /// Move the surface on screen without notifying anyone.
    MoveSurface { origin: Point },
    /// Resize the surface and fire a resize event.
    Resize { size: Size },
    /// Advance the clock.
    Wait { ms: u64 },
    /// Run an animation frame if one was requested.
    Frame,
}

/// A recorded session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub surface: SurfaceLayout,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Script(e.to_string()))
    }

    pub fn load(path: &std::path::Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

/// In-memory surface rendering to SVG.
pub struct ScriptSurface {
    bounds: Rect,
    device_pixel_ratio: f64,
    renderer: SvgRenderer,
    frames_requested: Cell<usize>,
    sink: Rc<RefCell<Option<EventSink>>>,
}

impl ScriptSurface {
    pub fn new(layout: &SurfaceLayout) -> Self {
        Self {
            bounds: layout.bounds(),
            device_pixel_ratio: layout.device_pixel_ratio,
            renderer: SvgRenderer::new(),
            frames_requested: Cell::new(0),
            sink: Rc::new(RefCell::new(None)),
        }
    }

    /// Push an event to the bound controller. Returns false if unbound.
    pub fn dispatch(&self, event: DeviceEvent) -> bool {
        match self.sink.borrow().as_ref() {
            Some(sink) => sink.send(event),
            None => false,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.sink.borrow().is_some()
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.bounds = Rect::from_origin_size(origin, self.bounds.size());
    }

    pub fn set_size(&mut self, size: Size) {
        self.bounds = Rect::from_origin_size(self.bounds.origin(), size);
    }

    /// How many frame callbacks the controller asked for.
    pub fn frames_requested(&self) -> usize {
        self.frames_requested.get()
    }

    pub fn svg(&self) -> &SvgRenderer {
        &self.renderer
    }
}

impl Surface for ScriptSurface {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn renderer(&mut self) -> Option<&mut dyn Renderer> {
        Some(&mut self.renderer)
    }

    fn request_frame(&self) {
        self.frames_requested.set(self.frames_requested.get() + 1);
    }

    fn subscribe(&mut self, sink: EventSink) -> Subscription {
        *self.sink.borrow_mut() = Some(sink);
        let slot = Rc::clone(&self.sink);
        Subscription::new(move || {
            slot.borrow_mut().take();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpad_core::Phase;
    use std::sync::mpsc;

    #[test]
    fn test_parse_script() {
        let json = r#"{
            "surface": {"origin": {"x": 10.0, "y": 20.0}},
            "steps": [
                {"step": "tool", "tool": "erase"},
                {"step": "event", "event": {"type": "pointer", "phase": "down", "position": {"x": 1.0, "y": 2.0}}},
                {"step": "wait", "ms": 300},
                {"step": "remote", "change": {"type": "removed", "ids": ["a"]}},
                {"step": "frame"}
            ]
        }"#;
        let script = Script::from_json(json).unwrap();
        assert_eq!(script.surface.size, Size::new(800.0, 600.0));
        assert_eq!(script.surface.bounds().origin(), Point::new(10.0, 20.0));
        assert_eq!(script.steps.len(), 5);
        assert_eq!(script.steps[0], Step::Tool { tool: ToolKind::Erase });
        assert!(matches!(
            &script.steps[1],
            Step::Event {
                event: DeviceEvent::Pointer { phase: Phase::Down, pointer_id: 0, .. }
            }
        ));
    }

    #[test]
    fn test_bad_script_is_reported() {
        assert!(matches!(
            Script::from_json(r#"{"steps": [{"step": "dance"}]}"#),
            Err(AppError::Script(_))
        ));
    }

    #[test]
    fn test_surface_binding_lifecycle() {
        let mut surface = ScriptSurface::new(&SurfaceLayout::default());
        assert!(!surface.dispatch(DeviceEvent::Resize));

        let (sender, receiver) = mpsc::channel();
        let subscription = surface.subscribe(EventSink::new(sender));
        assert!(surface.dispatch(DeviceEvent::Resize));
        assert_eq!(receiver.try_recv().unwrap(), DeviceEvent::Resize);

        drop(subscription);
        assert!(!surface.is_bound());
        assert!(!surface.dispatch(DeviceEvent::Resize));
    }

    #[test]
    fn test_set_size_keeps_origin() {
        let mut surface = ScriptSurface::new(&SurfaceLayout {
            origin: Point::new(5.0, 5.0),
            ..SurfaceLayout::default()
        });
        surface.set_size(Size::new(100.0, 100.0));
        assert_eq!(surface.bounds(), Rect::new(5.0, 5.0, 105.0, 105.0));
    }
}
