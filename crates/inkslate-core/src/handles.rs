//! Resize handles and the crop toggle affordance for the selected object.

use crate::input::CursorHint;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Side length of the square hit box around each handle, in scene units.
pub const HANDLE_SIZE: f64 = 10.0;
/// Side length of the crop toggle button.
pub const CROP_TOGGLE_SIZE: f64 = 20.0;
/// Gap between the crop toggle and the selection box edges.
pub const CROP_TOGGLE_INSET: f64 = 6.0;

/// The eight resize handles around a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
}

impl HandleKind {
    /// Whether dragging this handle moves the left edge.
    pub fn moves_left(&self) -> bool {
        matches!(
            self,
            HandleKind::TopLeft | HandleKind::BottomLeft | HandleKind::Left
        )
    }

    /// Whether dragging this handle moves the right edge.
    pub fn moves_right(&self) -> bool {
        matches!(
            self,
            HandleKind::TopRight | HandleKind::BottomRight | HandleKind::Right
        )
    }

    /// Whether dragging this handle moves the top edge.
    pub fn moves_top(&self) -> bool {
        matches!(
            self,
            HandleKind::TopLeft | HandleKind::TopRight | HandleKind::Top
        )
    }

    /// Whether dragging this handle moves the bottom edge.
    pub fn moves_bottom(&self) -> bool {
        matches!(
            self,
            HandleKind::BottomLeft | HandleKind::BottomRight | HandleKind::Bottom
        )
    }

    /// Cursor shown while hovering this handle.
    pub fn cursor(&self) -> CursorHint {
        match self {
            HandleKind::TopLeft | HandleKind::BottomRight => CursorHint::ResizeNwSe,
            HandleKind::TopRight | HandleKind::BottomLeft => CursorHint::ResizeNeSw,
            HandleKind::Top | HandleKind::Bottom => CursorHint::ResizeNs,
            HandleKind::Left | HandleKind::Right => CursorHint::ResizeEw,
        }
    }
}

/// A positioned resize handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

/// The eight handles for a selection box, corners first, then edge midpoints.
pub fn resize_handles(rect: Rect) -> [Handle; 8] {
    let cx = (rect.x0 + rect.x1) / 2.0;
    let cy = (rect.y0 + rect.y1) / 2.0;
    [
        Handle {
            position: Point::new(rect.x0, rect.y0),
            kind: HandleKind::TopLeft,
        },
        Handle {
            position: Point::new(rect.x1, rect.y0),
            kind: HandleKind::TopRight,
        },
        Handle {
            position: Point::new(rect.x0, rect.y1),
            kind: HandleKind::BottomLeft,
        },
        Handle {
            position: Point::new(rect.x1, rect.y1),
            kind: HandleKind::BottomRight,
        },
        Handle {
            position: Point::new(cx, rect.y0),
            kind: HandleKind::Top,
        },
        Handle {
            position: Point::new(cx, rect.y1),
            kind: HandleKind::Bottom,
        },
        Handle {
            position: Point::new(rect.x0, cy),
            kind: HandleKind::Left,
        },
        Handle {
            position: Point::new(rect.x1, cy),
            kind: HandleKind::Right,
        },
    ]
}

/// The handle under `point`, if any. Handles are probed in the order
/// [`resize_handles`] lists them, so corners win against overlapping edge
/// midpoints on small boxes.
pub fn handle_at(rect: Rect, point: Point) -> Option<HandleKind> {
    let half = HANDLE_SIZE / 2.0;
    resize_handles(rect)
        .into_iter()
        .find(|handle| {
            (point.x - handle.position.x).abs() < half
                && (point.y - handle.position.y).abs() < half
        })
        .map(|handle| handle.kind)
}

/// Where the crop toggle button sits for a selection box: tucked into the
/// top-right corner.
pub fn crop_toggle_rect(rect: Rect) -> Rect {
    Rect::new(
        rect.x1 - CROP_TOGGLE_INSET - CROP_TOGGLE_SIZE,
        rect.y0 + CROP_TOGGLE_INSET,
        rect.x1 - CROP_TOGGLE_INSET,
        rect.y0 + CROP_TOGGLE_INSET + CROP_TOGGLE_SIZE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_order_and_positions() {
        let rect = Rect::new(0.0, 0.0, 100.0, 60.0);
        let handles = resize_handles(rect);
        assert!(matches!(handles[0].kind, HandleKind::TopLeft));
        assert!(matches!(handles[3].kind, HandleKind::BottomRight));
        assert!(matches!(handles[4].kind, HandleKind::Top));
        assert!(matches!(handles[7].kind, HandleKind::Right));
        assert!((handles[4].position.x - 50.0).abs() < f64::EPSILON);
        assert!((handles[7].position.y - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_handle_at_hits_within_half_size() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(matches!(
            handle_at(rect, Point::new(3.0, -3.0)),
            Some(HandleKind::TopLeft)
        ));
        assert!(matches!(
            handle_at(rect, Point::new(100.0, 52.0)),
            Some(HandleKind::Right)
        ));
        assert!(handle_at(rect, Point::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_handle_at_misses_outside_box() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(handle_at(rect, Point::new(6.0, 0.0)).is_none());
        assert!(handle_at(rect, Point::new(0.0, 5.0)).is_none());
    }

    #[test]
    fn test_corners_win_on_tiny_boxes() {
        // A box smaller than a handle: the top-left corner and top midpoint
        // hit boxes overlap, and the corner is probed first.
        let rect = Rect::new(0.0, 0.0, 6.0, 6.0);
        assert!(matches!(
            handle_at(rect, Point::new(2.0, 0.0)),
            Some(HandleKind::TopLeft)
        ));
    }

    #[test]
    fn test_cursor_mapping() {
        assert!(matches!(
            HandleKind::TopLeft.cursor(),
            CursorHint::ResizeNwSe
        ));
        assert!(matches!(
            HandleKind::BottomLeft.cursor(),
            CursorHint::ResizeNeSw
        ));
        assert!(matches!(HandleKind::Bottom.cursor(), CursorHint::ResizeNs));
        assert!(matches!(HandleKind::Left.cursor(), CursorHint::ResizeEw));
    }

    #[test]
    fn test_edge_flags() {
        assert!(HandleKind::TopLeft.moves_left());
        assert!(HandleKind::TopLeft.moves_top());
        assert!(!HandleKind::TopLeft.moves_right());
        assert!(HandleKind::Right.moves_right());
        assert!(!HandleKind::Right.moves_top());
        assert!(HandleKind::Bottom.moves_bottom());
    }

    #[test]
    fn test_crop_toggle_sits_in_top_right() {
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);
        let toggle = crop_toggle_rect(rect);
        assert!((toggle.x0 - 174.0).abs() < f64::EPSILON);
        assert!((toggle.y0 - 6.0).abs() < f64::EPSILON);
        assert!((toggle.x1 - 194.0).abs() < f64::EPSILON);
        assert!((toggle.y1 - 26.0).abs() < f64::EPSILON);
        assert!((toggle.width() - CROP_TOGGLE_SIZE).abs() < f64::EPSILON);
    }
}
