//! Drawing surface abstraction.

use inkslate_core::DrawableId;
use kurbo::{BezPath, Rect};
use peniko::Color;

/// Line cap for stroked paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Round,
    Butt,
}

/// Compositing applied while painting a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendStyle {
    /// Plain source-over.
    #[default]
    Over,
    /// Multiply against the destination, darkening overlaps.
    Multiply,
}

/// How to paint a stroked path or outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePaint {
    pub color: Color,
    pub width: f64,
    pub cap: LineCap,
    /// Dash pattern as an on/off pair, or `None` for a solid line.
    pub dash: Option<[f64; 2]>,
    pub blend: BlendStyle,
}

impl StrokePaint {
    /// Solid round-capped stroke with plain compositing.
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            cap: LineCap::Round,
            dash: None,
            blend: BlendStyle::Over,
        }
    }

    /// Set the line cap.
    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    /// Set an on/off dash pattern.
    pub fn with_dash(mut self, on: f64, off: f64) -> Self {
        self.dash = Some([on, off]);
        self
    }

    /// Set the blend style.
    pub fn with_blend(mut self, blend: BlendStyle) -> Self {
        self.blend = blend;
        self
    }
}

/// A 2-D raster target the board renderer draws into.
///
/// Implementations must restore any compositing state they change before a
/// call returns, so one stroke's blending never leaks into later drawing.
pub trait RenderSurface {
    /// Wipe the whole surface to an opaque color.
    fn clear(&mut self, color: Color);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Outline an axis-aligned rectangle.
    fn stroke_rect(&mut self, rect: Rect, paint: StrokePaint);

    /// Stroke an open path. Joins are always round.
    fn stroke_path(&mut self, path: &BezPath, paint: StrokePaint);

    /// Blit the `src` window of an encoded image into `dest`.
    ///
    /// `src` is in the bitmap's native pixel space, `dest` in surface
    /// coordinates. `id` keys any decode cache the backend keeps;
    /// `data_base64` carries the encoded bytes for the first decode.
    fn draw_image(&mut self, id: DrawableId, data_base64: &str, src: Rect, dest: Rect);
}

/// A drawing operation captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Clear {
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        paint: StrokePaint,
    },
    StrokePath {
        path: BezPath,
        paint: StrokePaint,
    },
    DrawImage {
        id: DrawableId,
        src: Rect,
        dest: Rect,
    },
}

/// Surface that records operations instead of rasterizing. Useful for
/// asserting what a render pass would draw.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded operations matching a predicate.
    pub fn count(&self, predicate: impl Fn(&SurfaceOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }
}

impl RenderSurface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        self.ops.push(SurfaceOp::Clear { color });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(SurfaceOp::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, paint: StrokePaint) {
        self.ops.push(SurfaceOp::StrokeRect { rect, paint });
    }

    fn stroke_path(&mut self, path: &BezPath, paint: StrokePaint) {
        self.ops.push(SurfaceOp::StrokePath {
            path: path.clone(),
            paint,
        });
    }

    fn draw_image(&mut self, id: DrawableId, _data_base64: &str, src: Rect, dest: Rect) {
        self.ops.push(SurfaceOp::DrawImage { id, src, dest });
    }
}
