//! Shared geometry helpers: coordinate mapping and distance tests.

use kurbo::{Point, Size};

/// Map a pointer position into scene coordinates.
///
/// `event` is the pointer position relative to the surface's top-left corner,
/// in the units the surface is displayed at. `backing` is the surface's
/// backing resolution and `displayed` the size it is shown at; the two differ
/// whenever the surface is scaled to fit its container. Every pointer path
/// funnels through this one function so hit-testing and drawing agree.
pub fn to_scene_coords(event: Point, backing: Size, displayed: Size) -> Point {
    if displayed.width <= 0.0 || displayed.height <= 0.0 {
        return event;
    }
    Point::new(
        event.x * (backing.width / displayed.width),
        event.y * (backing.height / displayed.height),
    )
}

/// Distance from a point to a line segment (a to b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = kurbo::Vec2::new(b.x - a.x, b.y - a.y);
    let pv = kurbo::Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}
