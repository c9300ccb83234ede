//! Freehand stroke paths.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique stroke identifier, assigned by whoever created the stroke.
pub type StrokeId = String;

/// Paths with fewer points than this are degenerate and never committed.
pub const MIN_STROKE_POINTS: usize = 2;

/// A freehand stroke (ordered series of points plus style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Unique id used for merge-by-id.
    pub id: StrokeId,
    /// CSS-style color string, stored verbatim.
    pub color: String,
    /// Line width in logical pixels.
    pub width: f64,
    /// Points in content space.
    pub points: Vec<Point>,
}

impl Path {
    /// Create an empty path with a fresh id.
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), color, width)
    }

    /// Create an empty path with a caller-provided id.
    pub fn with_id(id: impl Into<StrokeId>, color: impl Into<String>, width: f64) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
            width,
            points: Vec::new(),
        }
    }

    /// Create from existing points.
    pub fn from_points(id: impl Into<StrokeId>, color: impl Into<String>, width: f64, points: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
            width,
            points,
        }
    }

    /// Append a point unless it repeats the last one exactly.
    ///
    /// Returns whether the point was appended.
    pub fn append_point(&mut self, point: Point) -> bool {
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A path that cannot form a single segment.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < MIN_STROKE_POINTS
    }

    /// Whether any point of the path lies within `radius` of `point`.
    pub fn passes_near(&self, point: Point, radius: f64) -> bool {
        let radius_sq = radius * radius;
        self.points.iter().any(|p| {
            let dx = p.x - point.x;
            let dy = p.y - point.y;
            dx * dx + dy * dy <= radius_sq
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_path_has_unique_id() {
        let a = Path::new("#000", 2.0);
        let b = Path::new("#000", 2.0);
        assert!(a.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_append_suppresses_duplicate() {
        let mut path = Path::new("#000", 2.0);
        assert!(path.append_point(Point::new(1.0, 1.0)));
        assert!(!path.append_point(Point::new(1.0, 1.0)));
        assert_eq!(path.len(), 1);

        assert!(path.append_point(Point::new(2.0, 1.0)));
        assert!(path.append_point(Point::new(1.0, 1.0))); // Only consecutive repeats are dropped
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_degenerate() {
        let mut path = Path::new("#000", 2.0);
        assert!(path.is_degenerate());
        path.append_point(Point::new(0.0, 0.0));
        assert!(path.is_degenerate());
        path.append_point(Point::new(0.0, 0.0));
        assert!(path.is_degenerate());
        path.append_point(Point::new(0.5, 0.0));
        assert!(!path.is_degenerate());
    }

    #[test]
    fn test_passes_near() {
        let path = Path::from_points("a", "#000", 2.0, vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
        assert!(path.passes_near(Point::new(1.0, 1.0), 3.0));
        assert!(path.passes_near(Point::new(3.0, 0.0), 3.0)); // Boundary is inclusive
        assert!(!path.passes_near(Point::new(5.0, 5.0), 3.0)); // Between points, not near either
    }
}
