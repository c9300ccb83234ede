//! Viewport state and coordinate transforms.
//!
//! Three spaces are involved:
//! - client: device event coordinates, relative to the page
//! - surface: client minus the surface's on-screen origin (scroll agnostic)
//! - content: surface scaled by zoom with the scroll offset added back, the
//!   space strokes are stored in
//!
//! The device space used for rendering is `(content - scroll) * zoom * dpr`.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Scroll, scale and placement of the drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Committed scroll offset, read by rendering and input transforms.
    pub scroll: Vec2,
    /// Scroll offset accumulated by wheel and pan input, committed on the next
    /// scroll-apply frame.
    pub buffered_scroll: Vec2,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f64,
    /// Logical size of the surface.
    pub size: Size,
    /// On-screen offset of the surface in client coordinates.
    pub origin: Point,
    /// Current zoom multiplier.
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll: Vec2::ZERO,
            buffered_scroll: Vec2::ZERO,
            device_pixel_ratio: 1.0,
            size: Size::ZERO,
            origin: Point::ZERO,
            zoom: 1.0,
            min_zoom: 0.25,
            max_zoom: 4.0,
        }
    }
}

impl Viewport {
    /// Create a viewport with the given zoom bounds.
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Update the surface placement and pixel ratio after a layout read.
    ///
    /// Returns true if anything changed.
    pub fn set_layout(&mut self, bounds: Rect, device_pixel_ratio: f64) -> bool {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let origin = bounds.origin();
        let size = bounds.size();
        let changed = origin != self.origin || size != self.size || dpr != self.device_pixel_ratio;
        self.origin = origin;
        self.size = size;
        self.device_pixel_ratio = dpr;
        changed
    }

    /// Convert a client point to surface coordinates (no scroll, no zoom).
    pub fn surface_point(&self, client: Point) -> Point {
        Point::new(client.x - self.origin.x, client.y - self.origin.y)
    }

    /// Convert a client point to content coordinates.
    pub fn content_point(&self, client: Point) -> Point {
        let surface = self.surface_point(client);
        Point::new(
            surface.x / self.zoom + self.scroll.x,
            surface.y / self.zoom + self.scroll.y,
        )
    }

    /// Multiplier from logical content units to device pixels.
    pub fn device_scale(&self) -> f64 {
        self.zoom * self.device_pixel_ratio
    }

    /// Convert a content point to device pixels.
    pub fn to_device(&self, content: Point) -> Point {
        let scale = self.device_scale();
        Point::new(
            (content.x - self.scroll.x) * scale,
            (content.y - self.scroll.y) * scale,
        )
    }

    /// Size of the backing store in device pixels.
    pub fn device_size(&self) -> Size {
        Size::new(
            self.size.width * self.device_pixel_ratio,
            self.size.height * self.device_pixel_ratio,
        )
    }

    /// Buffer a scroll by a delta given in surface pixels.
    pub fn scroll_by(&mut self, delta: Vec2) {
        self.buffered_scroll += delta / self.zoom;
    }

    /// Commit the buffered scroll offset.
    ///
    /// Returns true if the committed offset changed.
    pub fn apply_scroll(&mut self) -> bool {
        if self.scroll == self.buffered_scroll {
            return false;
        }
        self.scroll = self.buffered_scroll;
        true
    }

    /// Multiply the zoom level, clamped to the configured bounds.
    ///
    /// Returns true if the zoom level changed.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = new_zoom;
        true
    }
}
