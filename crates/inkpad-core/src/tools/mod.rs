//! Tool selection and the per-gesture state machine.
//!
//! A gesture starts on pointer-down, is driven by moves, and ends on
//! pointer-up, cancel or a tool switch. Each transition consumes the current
//! [`Gesture`] and returns the next one, recording side effects as
//! [`Outcome`]s for the controller to apply.

use std::collections::HashSet;

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::input::{Phase, PointerSample, TouchPolicy};
use crate::path::{Path, StrokeId};
use crate::stroke_set::{ERASE_RADIUS, StrokeSet, hit_test};
use crate::viewport::Viewport;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Draw,
    Erase,
    Pan,
}

/// Style applied to newly drawn strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: "#1f1f1f".to_string(),
            width: 4.0,
        }
    }
}

/// Transient state of the active gesture. Variants are mutually exclusive.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    /// No pointer is down.
    #[default]
    Idle,
    /// A stroke is being drawn.
    Drawing { pointer_id: u64, path: Path },
    /// Strokes under the eraser, hidden from rendering until pointer-up.
    Erasing { pointer_id: u64, hits: HashSet<StrokeId> },
    /// The canvas is being dragged; `anchor` is in surface coordinates.
    Panning { pointer_id: u64, anchor: Point },
}

/// Side effect produced by a gesture transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    RequestRedraw,
    RequestScrollApply,
    /// A finished stroke to commit and publish.
    Commit(Path),
    /// Stroke ids to remove and publish, in z-order.
    Erase(Vec<StrokeId>),
}

/// Shared inputs for one transition.
pub struct GestureContext<'a> {
    pub strokes: &'a StrokeSet,
    pub viewport: &'a mut Viewport,
    pub style: &'a StrokeStyle,
    pub outcomes: Vec<Outcome>,
}

impl<'a> GestureContext<'a> {
    pub fn new(strokes: &'a StrokeSet, viewport: &'a mut Viewport, style: &'a StrokeStyle) -> Self {
        Self {
            strokes,
            viewport,
            style,
            outcomes: Vec::new(),
        }
    }

    fn emit(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }
}

impl Gesture {
    /// Whether a pointer is currently engaged.
    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }

    /// The stroke being drawn, if any.
    pub fn live_path(&self) -> Option<&Path> {
        match self {
            Gesture::Drawing { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Ids currently under the eraser, if erasing.
    pub fn erasing(&self) -> Option<&HashSet<StrokeId>> {
        match self {
            Gesture::Erasing { hits, .. } => Some(hits),
            _ => None,
        }
    }

    fn pointer_id(&self) -> Option<u64> {
        match self {
            Gesture::Idle => None,
            Gesture::Drawing { pointer_id, .. }
            | Gesture::Erasing { pointer_id, .. }
            | Gesture::Panning { pointer_id, .. } => Some(*pointer_id),
        }
    }

    /// Start a gesture for `tool`. Ignored while another pointer is engaged.
    ///
    /// A second down from the pointer that owns the gesture means its up was
    /// lost; the old gesture is finished as if it had lifted.
    pub fn pointer_down(self, tool: ToolKind, sample: PointerSample, cx: &mut GestureContext<'_>) -> Gesture {
        match self.pointer_id() {
            None => {}
            Some(owner) if owner == sample.pointer_id => {
                log::debug!("Pointer {owner} went down again, closing its previous gesture");
                let lifted = PointerSample {
                    phase: Phase::Up,
                    ..sample
                };
                return self.pointer_up(lifted, cx).pointer_down(tool, sample, cx);
            }
            Some(_) => return self,
        }
        let pointer_id = sample.pointer_id;
        match tool {
            ToolKind::Draw => {
                let mut path = Path::new(cx.style.color.clone(), cx.style.width);
                path.append_point(cx.viewport.content_point(sample.position));
                Gesture::Drawing { pointer_id, path }
            }
            ToolKind::Erase => {
                let point = cx.viewport.content_point(sample.position);
                let hits = hit_test(cx.strokes, point, ERASE_RADIUS).into_iter().collect();
                cx.emit(Outcome::RequestRedraw);
                Gesture::Erasing { pointer_id, hits }
            }
            ToolKind::Pan => Gesture::Panning {
                pointer_id,
                anchor: cx.viewport.surface_point(sample.position),
            },
        }
    }

    /// Advance the gesture. Moves from other pointers are ignored.
    pub fn pointer_move(self, sample: PointerSample, cx: &mut GestureContext<'_>) -> Gesture {
        if self.pointer_id() != Some(sample.pointer_id) {
            return self;
        }
        match self {
            Gesture::Drawing { pointer_id, mut path } => {
                if path.append_point(cx.viewport.content_point(sample.position)) {
                    cx.emit(Outcome::RequestRedraw);
                }
                Gesture::Drawing { pointer_id, path }
            }
            Gesture::Erasing { pointer_id, mut hits } => {
                let point = cx.viewport.content_point(sample.position);
                hits.extend(hit_test(cx.strokes, point, ERASE_RADIUS));
                cx.emit(Outcome::RequestRedraw);
                Gesture::Erasing { pointer_id, hits }
            }
            Gesture::Panning { pointer_id, anchor } => {
                let current = cx.viewport.surface_point(sample.position);
                // Dragging content right moves the visible origin left
                cx.viewport.scroll_by(anchor - current);
                cx.emit(Outcome::RequestScrollApply);
                Gesture::Panning {
                    pointer_id,
                    anchor: current,
                }
            }
            Gesture::Idle => Gesture::Idle,
        }
    }

    /// Finish the gesture, committing its result. Ups from other pointers are
    /// ignored.
    pub fn pointer_up(self, sample: PointerSample, cx: &mut GestureContext<'_>) -> Gesture {
        if self.pointer_id() != Some(sample.pointer_id) {
            return self;
        }
        match self {
            Gesture::Drawing { path, .. } => {
                if path.is_degenerate() {
                    log::trace!("Dropping degenerate stroke {}", path.id);
                } else {
                    cx.emit(Outcome::Commit(path));
                }
            }
            Gesture::Erasing { hits, .. } => {
                if !hits.is_empty() {
                    let ids: Vec<StrokeId> = cx
                        .strokes
                        .iter()
                        .filter(|path| hits.contains(&path.id))
                        .map(|path| path.id.clone())
                        .collect();
                    if ids.is_empty() {
                        // Everything under the eraser was already removed remotely
                        cx.emit(Outcome::RequestRedraw);
                    } else {
                        cx.emit(Outcome::Erase(ids));
                    }
                }
            }
            Gesture::Panning { .. } | Gesture::Idle => {}
        }
        Gesture::Idle
    }

    /// Abandon the gesture if `sample` comes from its pointer.
    pub fn pointer_cancel(self, sample: PointerSample, cx: &mut GestureContext<'_>) -> Gesture {
        if self.pointer_id() != Some(sample.pointer_id) {
            return self;
        }
        self.cancel(cx)
    }

    /// Abandon the gesture without committing anything.
    pub fn cancel(self, cx: &mut GestureContext<'_>) -> Gesture {
        match self {
            Gesture::Drawing { .. } | Gesture::Erasing { .. } => cx.emit(Outcome::RequestRedraw),
            Gesture::Panning { .. } | Gesture::Idle => {}
        }
        Gesture::Idle
    }
}

/// Manages the current tool, the drawing style and the active gesture.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    current_tool: ToolKind,
    /// Restrict touch drawing to stylus contacts.
    pub palm_rejection: bool,
    /// Style applied to new strokes.
    pub style: StrokeStyle,
    gesture: Gesture,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new(style: StrokeStyle, palm_rejection: bool) -> Self {
        Self {
            current_tool: ToolKind::default(),
            palm_rejection,
            style,
            gesture: Gesture::Idle,
        }
    }

    /// The selected tool.
    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    /// The active gesture.
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.gesture.is_active()
    }

    /// How touch contacts are admitted under the current settings.
    pub fn touch_policy(&self) -> TouchPolicy {
        TouchPolicy::for_mode(self.palm_rejection, self.current_tool == ToolKind::Pan)
    }

    /// Select a tool, abandoning any gesture begun with the previous one.
    pub fn set_tool(&mut self, tool: ToolKind, strokes: &StrokeSet, viewport: &mut Viewport) -> Vec<Outcome> {
        if tool == self.current_tool {
            return Vec::new();
        }
        self.current_tool = tool;
        self.cancel(strokes, viewport)
    }

    /// Feed a resolved pointer sample through the state machine.
    pub fn handle_sample(
        &mut self,
        sample: PointerSample,
        strokes: &StrokeSet,
        viewport: &mut Viewport,
    ) -> Vec<Outcome> {
        let mut cx = GestureContext::new(strokes, viewport, &self.style);
        let gesture = std::mem::take(&mut self.gesture);
        self.gesture = match sample.phase {
            Phase::Down => gesture.pointer_down(self.current_tool, sample, &mut cx),
            Phase::Move => gesture.pointer_move(sample, &mut cx),
            Phase::Up => gesture.pointer_up(sample, &mut cx),
            Phase::Cancel => gesture.pointer_cancel(sample, &mut cx),
        };
        cx.outcomes
    }

    /// Abandon the active gesture.
    pub fn cancel(&mut self, strokes: &StrokeSet, viewport: &mut Viewport) -> Vec<Outcome> {
        let mut cx = GestureContext::new(strokes, viewport, &self.style);
        self.gesture = std::mem::take(&mut self.gesture).cancel(&mut cx);
        cx.outcomes
    }
}
