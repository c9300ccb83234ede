//! Contract with the external synchronization transport.
//!
//! The transport is a black box that persists and broadcasts stroke batches.
//! Locally committed gestures go out through [`SyncTransport`]; batches pushed
//! by other sessions come back in as [`StrokeChange`]s.

use serde::{Deserialize, Serialize};

use crate::path::{Path, StrokeId};

/// One add or remove batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrokeChange {
    /// Strokes to add to the set.
    Added { paths: Vec<Path> },
    /// Stroke ids to remove from the set.
    Removed { ids: Vec<StrokeId> },
}

impl StrokeChange {
    /// Whether the batch carries nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            StrokeChange::Added { paths } => paths.is_empty(),
            StrokeChange::Removed { ids } => ids.is_empty(),
        }
    }
}

/// Receiver for locally originated changes.
pub trait SyncTransport {
    /// Called once per committed draw or erase gesture.
    fn emit_stroke_change(&mut self, change: StrokeChange);
}

impl<F: FnMut(StrokeChange)> SyncTransport for F {
    fn emit_stroke_change(&mut self, change: StrokeChange) {
        self(change)
    }
}

/// Transport that queues changes until the host drains them.
#[derive(Debug, Default)]
pub struct Outbox {
    outgoing: Vec<StrokeChange>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take pending outgoing changes (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<StrokeChange> {
        std::mem::take(&mut self.outgoing)
    }

    /// Check if there are pending outgoing changes.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }
}

impl SyncTransport for Outbox {
    fn emit_stroke_change(&mut self, change: StrokeChange) {
        self.outgoing.push(change);
    }
}
