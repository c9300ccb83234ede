//! The committed stroke collection and its pure merge operations.
//!
//! Every mutation is expressed as a function from one set to the next. When an
//! operation changes nothing it hands back the input as [`Cow::Borrowed`], which
//! callers use to skip redraw scheduling.

use std::borrow::Cow;
use std::collections::HashSet;

use kurbo::Point;

use crate::path::{Path, StrokeId};

/// Hit-test radius for the eraser, in logical (device-independent) pixels.
///
/// Points are sampled sparsely during fast strokes, so this is sized to still
/// catch a stroke when the eraser passes between two of its samples.
pub const ERASE_RADIUS: f64 = 10.0;

/// Committed strokes keyed by id, in z-order (back to front).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeSet {
    paths: Vec<Path>,
    ids: HashSet<StrokeId>,
}

impl StrokeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed strokes.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if the set has no strokes.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Check if a stroke with this id is committed.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Look up a stroke by id.
    pub fn get(&self, id: &str) -> Option<&Path> {
        if !self.contains(id) {
            return None;
        }
        self.paths.iter().find(|path| path.id == id)
    }

    /// Strokes in z-order.
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Iterate strokes in z-order.
    pub fn iter(&self) -> std::slice::Iter<'_, Path> {
        self.paths.iter()
    }

    /// Consume the set, returning strokes in z-order.
    pub fn into_paths(self) -> Vec<Path> {
        self.paths
    }

    fn insert(&mut self, path: Path) -> bool {
        if !self.ids.insert(path.id.clone()) {
            return false;
        }
        self.paths.push(path);
        true
    }
}

impl FromIterator<Path> for StrokeSet {
    /// Build a set, keeping the first occurrence of each id.
    fn from_iter<T: IntoIterator<Item = Path>>(iter: T) -> Self {
        let mut set = StrokeSet::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}

impl<'a> IntoIterator for &'a StrokeSet {
    type Item = &'a Path;
    type IntoIter = std::slice::Iter<'a, Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Append every path whose id is not yet present.
///
/// Relative order of `paths` is kept, repeated ids within `paths` keep their
/// first occurrence, and degenerate paths are skipped.
pub fn merge_add<'a>(set: &'a StrokeSet, paths: &[Path]) -> Cow<'a, StrokeSet> {
    let mut fresh = paths
        .iter()
        .filter(|path| !path.is_degenerate() && !set.contains(&path.id))
        .peekable();
    if fresh.peek().is_none() {
        return Cow::Borrowed(set);
    }

    let mut next = set.clone();
    for path in fresh {
        next.insert(path.clone());
    }
    Cow::Owned(next)
}

/// Remove every stroke whose id is listed. Absent ids are ignored.
pub fn merge_remove<'a>(set: &'a StrokeSet, ids: &[StrokeId]) -> Cow<'a, StrokeSet> {
    if !ids.iter().any(|id| set.contains(id)) {
        return Cow::Borrowed(set);
    }

    let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let next = set
        .paths
        .iter()
        .filter(|path| !doomed.contains(path.id.as_str()))
        .cloned()
        .collect();
    Cow::Owned(next)
}

/// Ids of every stroke with at least one point within `radius` of `point`.
pub fn hit_test(set: &StrokeSet, point: Point, radius: f64) -> Vec<StrokeId> {
    set.paths
        .iter()
        .filter(|path| path.passes_near(point, radius))
        .map(|path| path.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, from: (f64, f64), to: (f64, f64)) -> Path {
        Path::from_points(id, "#000", 2.0, vec![Point::new(from.0, from.1), Point::new(to.0, to.1)])
    }

    fn ids(set: &StrokeSet) -> Vec<&str> {
        set.iter().map(|path| path.id.as_str()).collect()
    }

    #[test]
    fn test_merge_add_appends_in_order() {
        let set = StrokeSet::new();
        let next = merge_add(&set, &[line("a", (0.0, 0.0), (1.0, 1.0)), line("b", (0.0, 0.0), (2.0, 2.0))]);
        assert_eq!(ids(&next), vec!["a", "b"]);

        let next = merge_add(&next, &[line("c", (0.0, 0.0), (3.0, 3.0)), line("a", (5.0, 5.0), (6.0, 6.0))]);
        assert_eq!(ids(&next), vec!["a", "b", "c"]);
        // Existing stroke is not replaced by a later delivery with the same id
        assert_eq!(next.get("a").unwrap().points[1], Point::new(1.0, 1.0));
    }

    #[test]
    fn test_merge_add_noop_is_borrowed() {
        let set: StrokeSet = vec![line("a", (0.0, 0.0), (1.0, 1.0))].into_iter().collect();
        assert!(matches!(merge_add(&set, &[]), Cow::Borrowed(_)));
        assert!(matches!(merge_add(&set, &[line("a", (0.0, 0.0), (9.0, 9.0))]), Cow::Borrowed(_)));
    }

    #[test]
    fn test_merge_add_idempotent() {
        let set: StrokeSet = vec![line("a", (0.0, 0.0), (1.0, 1.0))].into_iter().collect();
        let batch = vec![line("x", (0.0, 0.0), (1.0, 0.0)), line("y", (0.0, 0.0), (0.0, 1.0))];

        let once = merge_add(&set, &batch).into_owned();
        let twice = merge_add(&once, &batch);
        assert!(matches!(twice, Cow::Borrowed(_)));
        assert_eq!(*twice, once);
    }

    #[test]
    fn test_merge_add_dedupes_within_batch() {
        let set = StrokeSet::new();
        let next = merge_add(&set, &[line("x", (0.0, 0.0), (1.0, 0.0)), line("x", (0.0, 0.0), (0.0, 1.0))]);
        assert_eq!(next.len(), 1);
        assert_eq!(next.get("x").unwrap().points[1], Point::new(1.0, 0.0));
    }

    #[test]
    fn test_merge_add_skips_degenerate() {
        let set = StrokeSet::new();
        let dot = Path::from_points("dot", "#000", 2.0, vec![Point::new(1.0, 1.0)]);
        assert!(matches!(merge_add(&set, &[dot]), Cow::Borrowed(_)));
    }

    #[test]
    fn test_duplicate_delivery_keeps_single_copy() {
        let set = StrokeSet::new();
        let first = merge_add(&set, &[line("x", (0.0, 0.0), (4.0, 4.0))]).into_owned();
        let second = merge_add(&first, &[line("x", (0.0, 0.0), (4.0, 4.0))]);
        assert_eq!(second.iter().filter(|path| path.id == "x").count(), 1);
    }

    #[test]
    fn test_merge_remove() {
        let set: StrokeSet = vec![
            line("a", (0.0, 0.0), (1.0, 1.0)),
            line("b", (0.0, 0.0), (2.0, 2.0)),
            line("c", (0.0, 0.0), (3.0, 3.0)),
        ]
        .into_iter()
        .collect();

        let next = merge_remove(&set, &["b".to_string(), "zzz".to_string()]);
        assert_eq!(ids(&next), vec!["a", "c"]);
        assert!(!next.contains("b"));
    }

    #[test]
    fn test_merge_remove_idempotent() {
        let set: StrokeSet = vec![line("a", (0.0, 0.0), (1.0, 1.0)), line("b", (0.0, 0.0), (2.0, 2.0))]
            .into_iter()
            .collect();
        let doomed = vec!["a".to_string()];

        let once = merge_remove(&set, &doomed).into_owned();
        let twice = merge_remove(&once, &doomed);
        assert!(matches!(twice, Cow::Borrowed(_)));
        assert_eq!(*twice, once);
    }

    #[test]
    fn test_merge_remove_on_empty_set() {
        let set = StrokeSet::new();
        assert!(matches!(merge_remove(&set, &["a".to_string()]), Cow::Borrowed(_)));
    }

    #[test]
    fn test_hit_test() {
        let set: StrokeSet = vec![line("a", (0.0, 0.0), (10.0, 10.0)), line("b", (100.0, 100.0), (120.0, 100.0))]
            .into_iter()
            .collect();

        assert_eq!(hit_test(&set, Point::new(1.0, 1.0), 3.0), vec!["a".to_string()]);
        assert_eq!(hit_test(&set, Point::new(119.0, 101.0), 3.0), vec!["b".to_string()]);
        assert!(hit_test(&set, Point::new(50.0, 50.0), 3.0).is_empty());
        assert!(hit_test(&StrokeSet::new(), Point::new(1.0, 1.0), 3.0).is_empty());
    }

    #[test]
    fn test_hit_test_repeatable() {
        let set: StrokeSet = vec![line("a", (0.0, 0.0), (10.0, 10.0))].into_iter().collect();
        let first = hit_test(&set, Point::new(9.0, 9.0), ERASE_RADIUS);
        let again = hit_test(&set, Point::new(9.0, 9.0), ERASE_RADIUS);
        assert_eq!(first, again);
    }
}
