//! Freehand stroke objects.

use super::{DrawableId, SerializableColor};
use crate::geometry::point_to_segment_dist;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Slack added on top of half the stroke width when hit-testing, so thin
/// strokes stay reachable.
pub const STROKE_HIT_SLACK: f64 = 5.0;

/// Which brush produced a stroke. Affects rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrushKind {
    Pencil,
    Highlighter,
}

/// A freehand stroke: a polyline in scene coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: DrawableId,
    /// Points in draw order. Holds at least one point; append-only while the
    /// stroke is being drawn.
    pub points: Vec<Point>,
    /// Stroke color.
    pub color: SerializableColor,
    /// Stroke width in scene units.
    pub width: f64,
    /// Brush that produced this stroke.
    pub brush: BrushKind,
    /// Soft-delete flag set by the eraser. Erased strokes stay in the page
    /// but are skipped by rendering and hit-testing.
    pub is_erased: bool,
}

impl Stroke {
    /// Create a stroke seeded with its first point.
    pub fn new(start: Point, color: SerializableColor, width: f64, brush: BrushKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            color,
            width,
            brush,
            is_erased: false,
        }
    }

    pub fn id(&self) -> DrawableId {
        self.id
    }

    /// Append a point to the stroke.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Bounding box of the points, inflated by half the stroke width.
    pub fn bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for point in &self.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        let half = self.width / 2.0;
        Rect::new(min_x, min_y, max_x, max_y).inflate(half, half)
    }

    /// Whether a point lies on the stroke within `tolerance`.
    ///
    /// The tolerance is floored at half the stroke width plus
    /// [`STROKE_HIT_SLACK`]. Single-point strokes never hit: they have no
    /// segments and are discarded at commit anyway.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if self.is_erased {
            return false;
        }
        let effective = tolerance.max(self.width / 2.0 + STROKE_HIT_SLACK);
        self.points
            .windows(2)
            .any(|w| point_to_segment_dist(point, w[0], w[1]) < effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pencil(points: &[(f64, f64)], width: f64) -> Stroke {
        let mut stroke = Stroke::new(
            Point::new(points[0].0, points[0].1),
            SerializableColor::black(),
            width,
            BrushKind::Pencil,
        );
        for &(x, y) in &points[1..] {
            stroke.add_point(Point::new(x, y));
        }
        stroke
    }

    #[test]
    fn test_stroke_starts_with_one_point() {
        let stroke = Stroke::new(
            Point::new(5.0, 5.0),
            SerializableColor::black(),
            2.5,
            BrushKind::Pencil,
        );
        assert_eq!(stroke.points.len(), 1);
        assert!(!stroke.is_erased);
    }

    #[test]
    fn test_add_points_preserves_order() {
        let stroke = pencil(&[(0.0, 0.0), (10.0, 0.0), (20.0, 5.0)], 2.0);
        assert_eq!(stroke.points.len(), 3);
        assert!((stroke.points[2].x - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds_include_width() {
        let stroke = pencil(&[(10.0, 10.0), (30.0, 10.0)], 4.0);
        let bounds = stroke.bounds();
        assert!((bounds.x0 - 8.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 8.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 32.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_on_segment() {
        let stroke = pencil(&[(0.0, 0.0), (100.0, 0.0)], 2.0);
        // Exactly on the segment.
        assert!(stroke.hit_test(Point::new(50.0, 0.0), 0.0));
        // Inside the width/2 + slack floor.
        assert!(stroke.hit_test(Point::new(50.0, 5.0), 0.0));
        // Outside it.
        assert!(!stroke.hit_test(Point::new(50.0, 7.0), 0.0));
    }

    #[test]
    fn test_tolerance_floor_uses_width() {
        // Width 4 gives an effective floor of max(10, 4/2 + 5) = 10 with a
        // 10-unit tolerance.
        let stroke = pencil(&[(0.0, 0.0), (100.0, 0.0)], 4.0);
        assert!(stroke.hit_test(Point::new(50.0, 9.9), 10.0));
        assert!(!stroke.hit_test(Point::new(50.0, 10.1), 10.0));
    }

    #[test]
    fn test_wide_stroke_overrides_small_tolerance() {
        // Width 30: effective tolerance is 30/2 + 5 = 20 even when asked for 1.
        let stroke = pencil(&[(0.0, 0.0), (100.0, 0.0)], 30.0);
        assert!(stroke.hit_test(Point::new(50.0, 19.0), 1.0));
    }

    #[test]
    fn test_single_point_never_hits() {
        let stroke = pencil(&[(50.0, 50.0)], 8.0);
        assert!(!stroke.hit_test(Point::new(50.0, 50.0), 100.0));
    }

    #[test]
    fn test_erased_stroke_never_hits() {
        let mut stroke = pencil(&[(0.0, 0.0), (100.0, 0.0)], 2.0);
        stroke.is_erased = true;
        assert!(!stroke.hit_test(Point::new(50.0, 0.0), 10.0));
    }
}
