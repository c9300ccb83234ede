//! Device event model and touch filtering.
//!
//! Hosts translate platform pointer, touch and wheel events into
//! [`DeviceEvent`]s. Before the gesture machine sees them, pointer and touch
//! events are reduced to a single [`PointerSample`] under a [`TouchPolicy`].

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Which input device produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// Contact type reported for a touch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TouchKind {
    /// Finger or palm.
    #[default]
    Direct,
    /// Stylus tip.
    Stylus,
}

/// One touch contact in a touch event's changed list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    /// Platform identifier, stable for the lifetime of the contact.
    pub id: u64,
    /// Position in client coordinates.
    pub position: Point,
    #[serde(default)]
    pub kind: TouchKind,
}

/// Stage of a pointer or touch interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Raw device event, positions in client coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceEvent {
    /// Mouse or pointer-events input.
    Pointer {
        phase: Phase,
        #[serde(default)]
        pointer_id: u64,
        position: Point,
        #[serde(default)]
        kind: PointerKind,
    },
    /// Touch-events input carrying the contacts that changed.
    Touch { phase: Phase, changed: Vec<Touch> },
    /// Wheel or trackpad scroll, in surface pixels.
    Wheel { delta: Vec2 },
    /// The window was resized; layout must be re-read.
    Resize,
}

/// How touch contacts are admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPolicy {
    /// Use the first changed contact, whatever its type.
    FirstContact,
    /// Use only stylus contacts; finger and palm input yields nothing.
    StylusOnly,
}

impl TouchPolicy {
    /// Policy for the current palm rejection setting.
    ///
    /// Panning accepts any contact so a hand can still move the canvas while
    /// drawing is restricted to the stylus.
    pub fn for_mode(palm_rejection: bool, panning: bool) -> Self {
        if palm_rejection && !panning {
            TouchPolicy::StylusOnly
        } else {
            TouchPolicy::FirstContact
        }
    }
}

/// A pointer or touch event reduced to one contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub phase: Phase,
    pub pointer_id: u64,
    /// Position in client coordinates.
    pub position: Point,
}

impl DeviceEvent {
    /// Reduce a pointer or touch event to a single contact.
    ///
    /// Returns `None` for wheel and resize events and for contacts the policy
    /// rejects.
    pub fn resolve(&self, policy: TouchPolicy) -> Option<PointerSample> {
        match self {
            DeviceEvent::Pointer {
                phase,
                pointer_id,
                position,
                kind,
            } => {
                if *kind == PointerKind::Touch && policy == TouchPolicy::StylusOnly {
                    return None;
                }
                Some(PointerSample {
                    phase: *phase,
                    pointer_id: *pointer_id,
                    position: *position,
                })
            }
            DeviceEvent::Touch { phase, changed } => {
                let touch = match policy {
                    TouchPolicy::FirstContact => changed.first(),
                    TouchPolicy::StylusOnly => changed.iter().find(|touch| touch.kind == TouchKind::Stylus),
                }?;
                Some(PointerSample {
                    phase: *phase,
                    pointer_id: touch.id,
                    position: touch.position,
                })
            }
            DeviceEvent::Wheel { .. } | DeviceEvent::Resize => None,
        }
    }
}
