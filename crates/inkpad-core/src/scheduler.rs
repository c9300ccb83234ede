//! Per-frame work coalescing and resize debouncing.

use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Work due in one display frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameWork {
    /// Commit the buffered scroll offset (always followed by a redraw).
    pub scroll_apply: bool,
    /// Re-render the surface.
    pub redraw: bool,
}

impl FrameWork {
    /// Whether the frame has anything to do.
    pub fn is_empty(&self) -> bool {
        !self.scroll_apply && !self.redraw
    }
}

/// Collapses repeated redraw / scroll-apply requests into one execution per
/// frame, tracking the two channels independently.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    redraw_pending: bool,
    scroll_apply_pending: bool,
}

impl FrameScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw on the next frame.
    ///
    /// Returns true if this request newly scheduled work, in which case the
    /// host should request a frame callback from the platform.
    pub fn request_redraw(&mut self) -> bool {
        !std::mem::replace(&mut self.redraw_pending, true)
    }

    /// Ask for the buffered scroll to be committed on the next frame.
    ///
    /// Returns true if this request newly scheduled work.
    pub fn request_scroll_apply(&mut self) -> bool {
        !std::mem::replace(&mut self.scroll_apply_pending, true)
    }

    /// Whether a redraw is waiting for a frame.
    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending
    }

    /// Whether a scroll-apply is waiting for a frame.
    pub fn scroll_apply_pending(&self) -> bool {
        self.scroll_apply_pending
    }

    /// Whether any channel is waiting for a frame.
    pub fn has_pending(&self) -> bool {
        self.redraw_pending || self.scroll_apply_pending
    }

    /// Take the work for the current frame.
    ///
    /// Pending flags are cleared before the work is handed out, so anything
    /// the work itself requests lands in a fresh frame. A scroll-apply always
    /// carries a redraw with it.
    pub fn begin_frame(&mut self) -> FrameWork {
        let scroll_apply = std::mem::take(&mut self.scroll_apply_pending);
        let redraw = std::mem::take(&mut self.redraw_pending);
        FrameWork {
            scroll_apply,
            redraw: redraw || scroll_apply,
        }
    }

    /// Drop all pending work.
    pub fn clear(&mut self) {
        self.redraw_pending = false;
        self.scroll_apply_pending = false;
    }
}

/// Trailing-edge debouncer: bursts of notifications fire once, `delay` after
/// the last one.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record an occurrence, pushing the deadline out.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Whether a notification is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending notification will fire, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire if the quiet period has elapsed. Returns true exactly once per burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Forget any pending notification.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
