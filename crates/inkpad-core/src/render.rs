//! Render pipeline and backend trait.
//!
//! [`render`] is a pure function of its [`RenderContext`]: it clears the
//! surface and strokes every visible path through a [`Renderer`]. It keeps no
//! state between calls, so it can run once per scheduled frame.

use std::collections::HashSet;

use kurbo::{BezPath, Cap, Join, PathEl, Point, Size, Stroke};

use crate::path::{Path, StrokeId};
use crate::stroke_set::StrokeSet;
use crate::viewport::Viewport;

/// Trait for rendering backends.
///
/// Coordinates and widths are in device pixels.
pub trait Renderer {
    /// Clear the whole surface.
    fn clear(&mut self, size: Size);

    /// Stroke a polyline with the given style and color.
    fn stroke_path(&mut self, path: &BezPath, style: &Stroke, color: &str);
}

/// Inputs for a single frame.
pub struct RenderContext<'a> {
    /// Committed strokes, back to front.
    pub strokes: &'a StrokeSet,
    /// Scroll, zoom and pixel ratio.
    pub viewport: &'a Viewport,
    /// Stroke being drawn, rendered on top.
    pub live_path: Option<&'a Path>,
    /// Strokes under the eraser, hidden until the erase is committed.
    pub erasing: Option<&'a HashSet<StrokeId>>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(strokes: &'a StrokeSet, viewport: &'a Viewport) -> Self {
        Self {
            strokes,
            viewport,
            live_path: None,
            erasing: None,
        }
    }

    /// Set the in-progress stroke.
    pub fn with_live_path(mut self, path: Option<&'a Path>) -> Self {
        self.live_path = path;
        self
    }

    /// Set the ids suppressed by an active erase.
    pub fn with_erasing(mut self, erasing: Option<&'a HashSet<StrokeId>>) -> Self {
        self.erasing = erasing;
        self
    }
}

/// Draw one frame.
pub fn render(ctx: &RenderContext<'_>, renderer: &mut dyn Renderer) {
    renderer.clear(ctx.viewport.device_size());

    for path in ctx.strokes {
        if ctx.erasing.is_some_and(|hidden| hidden.contains(&path.id)) {
            continue;
        }
        draw_path(ctx.viewport, path, renderer);
    }

    if let Some(path) = ctx.live_path {
        draw_path(ctx.viewport, path, renderer);
    }
}

fn draw_path(viewport: &Viewport, path: &Path, renderer: &mut dyn Renderer) {
    if path.is_degenerate() {
        return;
    }
    let mut bez = BezPath::new();
    let mut points = path.points.iter().map(|point| viewport.to_device(*point));
    if let Some(first) = points.next() {
        bez.move_to(first);
    }
    for point in points {
        bez.line_to(point);
    }

    let style = Stroke::new(path.width * viewport.device_scale())
        .with_caps(Cap::Round)
        .with_join(Join::Round);
    renderer.stroke_path(&bez, &style, &path.color);
}

/// One recorded draw call.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Clear { size: Size },
    Stroke { path: BezPath, style: Stroke, color: String },
}

impl DrawCommand {
    /// Vertices of a stroke command, in device pixels.
    pub fn points(&self) -> Vec<Point> {
        match self {
            DrawCommand::Clear { .. } => Vec::new(),
            DrawCommand::Stroke { path, .. } => path
                .elements()
                .iter()
                .filter_map(|el| match el {
                    PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(*p),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// Backend that records draw calls, for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stroke commands recorded.
    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Stroke { .. }))
            .count()
    }
}

impl Renderer for DisplayList {
    fn clear(&mut self, size: Size) {
        // A clear invalidates everything drawn before it
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { size });
    }

    fn stroke_path(&mut self, path: &BezPath, style: &Stroke, color: &str) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            style: style.clone(),
            color: color.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Rect, Vec2};

    fn strokes() -> StrokeSet {
        vec![
            Path::from_points("a", "#ff0000", 2.0, vec![Point::new(10.0, 10.0), Point::new(20.0, 10.0)]),
            Path::from_points("b", "#00ff00", 3.0, vec![Point::new(0.0, 0.0), Point::new(0.0, 5.0)]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_render_clears_then_strokes_in_order() {
        let strokes = strokes();
        let viewport = Viewport::default();
        let mut list = DisplayList::new();

        render(&RenderContext::new(&strokes, &viewport), &mut list);

        assert!(matches!(list.commands[0], DrawCommand::Clear { .. }));
        assert_eq!(list.stroke_count(), 2);
        match &list.commands[1] {
            DrawCommand::Stroke { color, style, .. } => {
                assert_eq!(color, "#ff0000");
                assert_eq!(style.start_cap, Cap::Round);
                assert_eq!(style.end_cap, Cap::Round);
                assert_eq!(style.join, Join::Round);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_render_applies_scroll_and_pixel_ratio() {
        let strokes = strokes();
        let mut viewport = Viewport::default();
        viewport.set_layout(Rect::new(0.0, 0.0, 100.0, 50.0), 2.0);
        viewport.scroll = Vec2::new(5.0, 5.0);
        let mut list = DisplayList::new();

        render(&RenderContext::new(&strokes, &viewport), &mut list);

        match &list.commands[0] {
            DrawCommand::Clear { size } => assert_eq!(*size, Size::new(200.0, 100.0)),
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(list.commands[1].points(), vec![Point::new(10.0, 10.0), Point::new(30.0, 10.0)]);
        match &list.commands[1] {
            DrawCommand::Stroke { style, .. } => assert!((style.width - 4.0).abs() < f64::EPSILON),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_render_hides_erasing_strokes() {
        let strokes = strokes();
        let viewport = Viewport::default();
        let hidden: HashSet<StrokeId> = ["a".to_string()].into_iter().collect();
        let mut list = DisplayList::new();

        render(&RenderContext::new(&strokes, &viewport).with_erasing(Some(&hidden)), &mut list);

        assert_eq!(list.stroke_count(), 1);
        match &list.commands[1] {
            DrawCommand::Stroke { color, .. } => assert_eq!(color, "#00ff00"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_live_path_drawn_last() {
        let strokes = strokes();
        let viewport = Viewport::default();
        let live = Path::from_points("live", "#0000ff", 1.0, vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
        let mut list = DisplayList::new();

        render(&RenderContext::new(&strokes, &viewport).with_live_path(Some(&live)), &mut list);

        assert_eq!(list.stroke_count(), 3);
        match list.commands.last() {
            Some(DrawCommand::Stroke { color, .. }) => assert_eq!(color, "#0000ff"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_single_point_live_path_not_drawn() {
        let strokes = StrokeSet::new();
        let viewport = Viewport::default();
        let live = Path::from_points("live", "#0000ff", 1.0, vec![Point::new(1.0, 1.0)]);
        let mut list = DisplayList::new();

        render(&RenderContext::new(&strokes, &viewport).with_live_path(Some(&live)), &mut list);
        assert_eq!(list.stroke_count(), 0);
    }

    #[test]
    fn test_render_is_repeatable() {
        let strokes = strokes();
        let viewport = Viewport::default();
        let mut list = DisplayList::new();
        let ctx = RenderContext::new(&strokes, &viewport);

        render(&ctx, &mut list);
        render(&ctx, &mut list);
        assert_eq!(list.commands.len(), 3);
    }
}
