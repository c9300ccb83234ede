//! The surface controller.
//!
//! [`SurfaceController`] owns every piece of mutable state for one drawing
//! session: the committed strokes, the viewport, the tool manager with its
//! active gesture, and the frame scheduler. Device events arrive through the
//! channel bound on [`attach`](SurfaceController::attach) and are drained by
//! [`pump`](SurfaceController::pump); frames run on
//! [`on_animation_frame`](SurfaceController::on_animation_frame).

use std::borrow::Cow;
use std::sync::mpsc::{self, Receiver};

use crate::config::SurfaceConfig;
use crate::input::{DeviceEvent, Phase};
use crate::path::{Path, StrokeId};
use crate::render::{RenderContext, render};
use crate::scheduler::{Debouncer, FrameScheduler, Instant};
use crate::stroke_set::{StrokeSet, merge_add, merge_remove};
use crate::surface::{EventSink, Subscription, Surface};
use crate::sync::{StrokeChange, SyncTransport};
use crate::tools::{Gesture, Outcome, StrokeStyle, ToolKind, ToolManager};
use crate::viewport::Viewport;

/// Event binding of a drawable surface.
struct Binding {
    subscription: Subscription,
    events: Receiver<DeviceEvent>,
}

struct Attachment<S> {
    surface: S,
    /// `None` when the surface has no drawable context.
    binding: Option<Binding>,
}

/// Drives input, rendering and synchronization for one surface.
pub struct SurfaceController<S: Surface, T: SyncTransport> {
    config: SurfaceConfig,
    strokes: StrokeSet,
    viewport: Viewport,
    tools: ToolManager,
    scheduler: FrameScheduler,
    resize: Debouncer,
    attached: Option<Attachment<S>>,
    transport: T,
}

impl<S: Surface, T: SyncTransport> SurfaceController<S, T> {
    /// Create a detached controller with an empty stroke set.
    pub fn new(config: SurfaceConfig, transport: T) -> Self {
        Self {
            strokes: StrokeSet::new(),
            viewport: config.viewport(),
            tools: ToolManager::new(config.style(), config.palm_rejection),
            scheduler: FrameScheduler::new(),
            resize: Debouncer::new(config.resize_debounce()),
            attached: None,
            transport,
            config,
        }
    }

    /// Bind to a surface, releasing any previous binding first.
    ///
    /// A surface without a drawable context is kept but left disabled: no
    /// listeners are bound and input and frames are ignored.
    pub fn attach(&mut self, mut surface: S) {
        self.detach();
        // Work requested while detached never reached a surface
        self.scheduler.clear();

        let binding = if surface.renderer().is_some() {
            let (sender, events) = mpsc::channel();
            let subscription = surface.subscribe(EventSink::new(sender));
            Some(Binding { subscription, events })
        } else {
            log::warn!("Surface has no drawable context, controller disabled");
            None
        };

        self.viewport.set_layout(surface.bounds(), surface.device_pixel_ratio());
        log::debug!(
            "Attached surface at {:?}, size {:?}, dpr {}",
            self.viewport.origin,
            self.viewport.size,
            self.viewport.device_pixel_ratio
        );
        let enabled = binding.is_some();
        self.attached = Some(Attachment { surface, binding });
        if enabled {
            self.request_redraw();
        }
    }

    /// Release the surface and its event binding.
    ///
    /// Any gesture in progress is abandoned.
    pub fn detach(&mut self) -> Option<S> {
        let attachment = self.attached.take()?;
        if let Some(binding) = attachment.binding {
            binding.subscription.dispose();
        }
        self.tools.cancel(&self.strokes, &mut self.viewport);
        self.scheduler.clear();
        self.resize.cancel();
        log::debug!("Detached surface");
        Some(attachment.surface)
    }

    /// Whether a surface is attached.
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Whether an attached surface can be drawn to.
    pub fn is_enabled(&self) -> bool {
        self.attached
            .as_ref()
            .is_some_and(|attachment| attachment.binding.is_some())
    }

    pub fn surface(&self) -> Option<&S> {
        self.attached.as_ref().map(|attachment| &attachment.surface)
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.attached.as_mut().map(|attachment| &mut attachment.surface)
    }

    /// Select a tool. Switching tools abandons the active gesture.
    pub fn set_tool(&mut self, tool: ToolKind) {
        let outcomes = self.tools.set_tool(tool, &self.strokes, &mut self.viewport);
        self.apply_outcomes(outcomes);
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool()
    }

    pub fn set_palm_rejection(&mut self, enabled: bool) {
        self.tools.palm_rejection = enabled;
    }

    pub fn palm_rejection(&self) -> bool {
        self.tools.palm_rejection
    }

    /// Color for strokes started from now on.
    pub fn set_stroke_color(&mut self, color: impl Into<String>) {
        self.tools.style.color = color.into();
    }

    /// Width for strokes started from now on. Non-positive widths are ignored.
    pub fn set_stroke_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.tools.style.width = width;
        } else {
            log::warn!("Ignoring invalid stroke width {width}");
        }
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.tools.style
    }

    /// Zoom in by one step. Returns true if the zoom level changed.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.config.zoom_step)
    }

    /// Zoom out by one step. Returns true if the zoom level changed.
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(1.0 / self.config.zoom_step)
    }

    fn zoom_by(&mut self, factor: f64) -> bool {
        if !self.viewport.zoom_by(factor) {
            return false;
        }
        log::debug!("Zoom {:.3}", self.viewport.zoom);
        self.request_redraw();
        true
    }

    /// Merge a change received from the sync transport.
    ///
    /// Safe to call mid-gesture; the live stroke is untouched. Inbound changes
    /// are never sent back out. Returns true if the stroke set changed.
    pub fn apply_remote(&mut self, change: StrokeChange) -> bool {
        let changed = match &change {
            StrokeChange::Added { paths } => self.add_paths(paths),
            StrokeChange::Removed { ids } => self.remove_ids(ids),
        };
        if changed {
            log::debug!("Merged remote change, {} strokes", self.strokes.len());
            self.request_redraw();
        } else {
            log::trace!("Remote change already applied");
        }
        changed
    }

    /// Drain queued device events. Returns how many were handled.
    pub fn pump(&mut self, now: Instant) -> usize {
        let events: Vec<DeviceEvent> = match &self.attached {
            Some(Attachment {
                binding: Some(binding),
                ..
            }) => binding.events.try_iter().collect(),
            _ => return 0,
        };
        let count = events.len();
        for event in events {
            self.handle_event(event, now);
        }
        count
    }

    /// Dispatch a single device event.
    pub fn handle_event(&mut self, event: DeviceEvent, now: Instant) {
        if !self.is_enabled() {
            log::trace!("Dropping {event:?}, surface disabled");
            return;
        }
        match event {
            DeviceEvent::Wheel { delta } => {
                self.viewport.scroll_by(delta);
                self.request_scroll_apply();
            }
            DeviceEvent::Resize => self.resize.notify(now),
            event => {
                let Some(sample) = event.resolve(self.tools.touch_policy()) else {
                    log::trace!("No usable contact in {event:?}");
                    return;
                };
                if sample.phase == Phase::Down {
                    // The surface may have moved since the last layout read
                    self.refresh_layout();
                }
                log::trace!("{:?} {:?} at {:?}", self.tools.current_tool(), sample.phase, sample.position);
                let outcomes = self.tools.handle_sample(sample, &self.strokes, &mut self.viewport);
                self.apply_outcomes(outcomes);
            }
        }
    }

    /// Run timers. Returns true if a debounced resize fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.resize.poll(now) {
            return false;
        }
        if self.refresh_layout() {
            log::debug!(
                "Layout recomputed: origin {:?}, size {:?}",
                self.viewport.origin,
                self.viewport.size
            );
        }
        self.request_redraw();
        true
    }

    /// When [`tick`](Self::tick) next has work, if ever.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.resize.deadline()
    }

    /// Whether a frame has been requested and not yet run.
    pub fn needs_frame(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Run the work batched for this frame. Returns true if anything ran.
    pub fn on_animation_frame(&mut self) -> bool {
        let work = self.scheduler.begin_frame();
        if work.is_empty() || !self.is_enabled() {
            return false;
        }
        if work.scroll_apply && self.viewport.apply_scroll() {
            log::trace!("Scroll applied: {:?}", self.viewport.scroll);
        }
        if work.redraw {
            self.redraw();
        }
        true
    }

    fn redraw(&mut self) {
        let Some(attachment) = self.attached.as_mut() else {
            return;
        };
        let Some(renderer) = attachment.surface.renderer() else {
            log::warn!("Drawable context lost, skipping frame");
            return;
        };
        let gesture = self.tools.gesture();
        let ctx = RenderContext::new(&self.strokes, &self.viewport)
            .with_live_path(gesture.live_path())
            .with_erasing(gesture.erasing());
        render(&ctx, renderer);
    }

    fn refresh_layout(&mut self) -> bool {
        let Some(attachment) = &self.attached else {
            return false;
        };
        let bounds = attachment.surface.bounds();
        let dpr = attachment.surface.device_pixel_ratio();
        self.viewport.set_layout(bounds, dpr)
    }

    fn apply_outcomes(&mut self, outcomes: Vec<Outcome>) {
        for outcome in outcomes {
            match outcome {
                Outcome::RequestRedraw => self.request_redraw(),
                Outcome::RequestScrollApply => self.request_scroll_apply(),
                Outcome::Commit(path) => {
                    log::debug!("Committing stroke {} with {} points", path.id, path.len());
                    let paths = vec![path];
                    self.add_paths(&paths);
                    self.transport.emit_stroke_change(StrokeChange::Added { paths });
                    self.request_redraw();
                }
                Outcome::Erase(ids) => {
                    log::debug!("Erasing {} strokes", ids.len());
                    self.remove_ids(&ids);
                    self.transport.emit_stroke_change(StrokeChange::Removed { ids });
                    self.request_redraw();
                }
            }
        }
    }

    fn add_paths(&mut self, paths: &[Path]) -> bool {
        match merge_add(&self.strokes, paths) {
            Cow::Borrowed(_) => false,
            Cow::Owned(next) => {
                self.strokes = next;
                true
            }
        }
    }

    fn remove_ids(&mut self, ids: &[StrokeId]) -> bool {
        match merge_remove(&self.strokes, ids) {
            Cow::Borrowed(_) => false,
            Cow::Owned(next) => {
                self.strokes = next;
                true
            }
        }
    }

    fn request_redraw(&mut self) {
        if self.scheduler.request_redraw() {
            self.request_frame();
        }
    }

    fn request_scroll_apply(&mut self) {
        if self.scheduler.request_scroll_apply() {
            self.request_frame();
        }
    }

    fn request_frame(&self) {
        if let Some(Attachment {
            surface,
            binding: Some(_),
        }) = &self.attached
        {
            surface.request_frame();
        }
    }

    pub fn strokes(&self) -> &StrokeSet {
        &self.strokes
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture(&self) -> &Gesture {
        self.tools.gesture()
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
