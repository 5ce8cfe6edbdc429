//! Board scene renderer.
//!
//! Turns a board into drawing operations on a [`RenderSurface`]: page
//! content bottom to top, then the live interaction overlays. Exports go
//! through [`render_page`], which draws content only.

use inkslate_core::{Board, BrushKind, Drawable, ImageObject, Stroke, resize_handles};
use kurbo::{BezPath, Point, Rect};
use peniko::Color;
use thiserror::Error;

use crate::surface::{BlendStyle, LineCap, RenderSurface, StrokePaint};

const WHITE: Color = Color::from_rgba8(255, 255, 255, 255);
/// Accent used for the selection outline and handle borders.
const SELECTION_COLOR: Color = Color::from_rgba8(37, 99, 235, 230);
const SELECTION_STROKE_WIDTH: f64 = 1.5;
const SELECTION_DASH: [f64; 2] = [6.0, 3.0];
/// Drawn size of a resize handle. Smaller than the hit target.
const HANDLE_DRAW_SIZE: f64 = 8.0;
const CROP_TOGGLE_COLOR: Color = Color::from_rgba8(59, 130, 246, 255);
const CROP_TOGGLE_ACTIVE_COLOR: Color = Color::from_rgba8(22, 163, 74, 255);
/// Dims the uncropped context around the crop window.
const CROP_MASK_COLOR: Color = Color::from_rgba8(0, 0, 0, 128);
const HIGHLIGHTER_WIDTH_SCALE: f64 = 3.0;
const HIGHLIGHTER_ALPHA: u8 = 102;

/// Errors that can occur while rendering a board.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Page {page} out of range: board has {pages} pages")]
    PageOutOfRange { page: usize, pages: usize },

    #[error("Invalid surface size {width}x{height}")]
    InvalidSurfaceSize { width: f64, height: f64 },

    #[error("Failed to decode image: {0}")]
    Decode(String),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Render the current page with all interaction overlays: selection chrome,
/// the crop context, and the stroke being drawn.
pub fn render_live(board: &Board, surface: &mut impl RenderSurface) {
    render_content(board, board.current_page(), surface);
    render_overlays(board, surface);
}

/// Render one page as it would be exported, without any overlays.
/// `page` is 1-based.
pub fn render_page(
    board: &Board,
    page: usize,
    surface: &mut impl RenderSurface,
) -> RenderResult<()> {
    if board.page(page).is_none() {
        return Err(RenderError::PageOutOfRange {
            page,
            pages: board.page_count(),
        });
    }
    render_content(board, page, surface);
    Ok(())
}

fn render_content(board: &Board, page: usize, surface: &mut impl RenderSurface) {
    let size = board.size();
    surface.clear(WHITE);
    if let Some(background) = board.background() {
        let natural = Rect::new(
            0.0,
            0.0,
            background.source_width as f64,
            background.source_height as f64,
        );
        surface.draw_image(
            background.id(),
            &background.data_base64,
            natural,
            Rect::new(0.0, 0.0, size.width, size.height),
        );
    }
    let Some(page) = board.page(page) else {
        return;
    };
    for drawable in page.drawables() {
        match drawable {
            Drawable::Stroke(stroke) => draw_stroke(stroke, surface),
            Drawable::Image(image) => draw_image_object(image, surface),
        }
    }
}

fn render_overlays(board: &Board, surface: &mut impl RenderSurface) {
    if let Some(image) = board.selected_image() {
        draw_selection_chrome(image, board.crop_mode(), surface);
    }
    if let Some(stroke) = board.current_stroke() {
        draw_stroke(stroke, surface);
    }
}

/// Smoothed open path through the stroke points: each interior point acts as
/// a quadratic control aimed at the midpoint towards the next point.
fn stroke_path_points(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(*first);
    for i in 1..points.len().saturating_sub(1) {
        path.quad_to(points[i], points[i].midpoint(points[i + 1]));
    }
    if points.len() > 1 {
        path.line_to(points[points.len() - 1]);
    }
    path
}

fn draw_stroke(stroke: &Stroke, surface: &mut impl RenderSurface) {
    if stroke.is_erased || stroke.points.len() < 2 {
        return;
    }
    let paint = match stroke.brush {
        BrushKind::Pencil => StrokePaint::solid(stroke.color.into(), stroke.width),
        BrushKind::Highlighter => StrokePaint::solid(
            stroke.color.with_alpha(HIGHLIGHTER_ALPHA).into(),
            stroke.width * HIGHLIGHTER_WIDTH_SCALE,
        )
        .with_cap(LineCap::Butt)
        .with_blend(BlendStyle::Multiply),
    };
    surface.stroke_path(&stroke_path_points(&stroke.points), paint);
}

fn draw_image_object(image: &ImageObject, surface: &mut impl RenderSurface) {
    surface.draw_image(
        image.id(),
        &image.data_base64,
        image.crop.as_rect(),
        image.as_rect(),
    );
}

fn draw_selection_chrome(image: &ImageObject, crop_mode: bool, surface: &mut impl RenderSurface) {
    let rect = image.as_rect();
    if crop_mode {
        draw_crop_context(image, rect, surface);
    }
    surface.stroke_rect(
        rect,
        StrokePaint::solid(SELECTION_COLOR, SELECTION_STROKE_WIDTH)
            .with_dash(SELECTION_DASH[0], SELECTION_DASH[1]),
    );
    let half = HANDLE_DRAW_SIZE / 2.0;
    for handle in resize_handles(rect) {
        let knob = Rect::new(
            handle.position.x - half,
            handle.position.y - half,
            handle.position.x + half,
            handle.position.y + half,
        );
        surface.fill_rect(knob, WHITE);
        surface.stroke_rect(knob, StrokePaint::solid(SELECTION_COLOR, 1.0));
    }
    draw_crop_toggle(rect, crop_mode, surface);
}

/// Full uncropped bitmap drawn in registration with the crop window, with
/// the area outside the window dimmed. The window itself is left untouched
/// so the page content underneath shows through at full strength.
fn draw_crop_context(image: &ImageObject, rect: Rect, surface: &mut impl RenderSurface) {
    let crop = image.crop;
    let scale_x = rect.width() / crop.width.max(1.0);
    let scale_y = rect.height() / crop.height.max(1.0);
    let full = Rect::new(
        rect.x0 - crop.x * scale_x,
        rect.y0 - crop.y * scale_y,
        rect.x0 + (image.source_width as f64 - crop.x) * scale_x,
        rect.y0 + (image.source_height as f64 - crop.y) * scale_y,
    );
    let natural = Rect::new(
        0.0,
        0.0,
        image.source_width as f64,
        image.source_height as f64,
    );
    surface.draw_image(image.id(), &image.data_base64, natural, full);
    let bands = [
        Rect::new(full.x0, full.y0, full.x1, rect.y0),
        Rect::new(full.x0, rect.y1, full.x1, full.y1),
        Rect::new(full.x0, rect.y0, rect.x0, rect.y1),
        Rect::new(rect.x1, rect.y0, full.x1, rect.y1),
    ];
    for band in bands {
        if band.width() > 0.0 && band.height() > 0.0 {
            surface.fill_rect(band, CROP_MASK_COLOR);
        }
    }
}

fn draw_crop_toggle(rect: Rect, active: bool, surface: &mut impl RenderSurface) {
    let button = inkslate_core::crop_toggle_rect(rect);
    let fill = if active {
        CROP_TOGGLE_ACTIVE_COLOR
    } else {
        CROP_TOGGLE_COLOR
    };
    surface.fill_rect(button, fill);

    // Two interlocking corner brackets, the usual crop glyph.
    let pad = 5.0;
    let (x0, y0) = (button.x0 + pad, button.y0 + pad);
    let (x1, y1) = (button.x1 - pad, button.y1 - pad);
    let bar = 2.0;
    let mut glyph = BezPath::new();
    glyph.move_to((x0 + bar, y0));
    glyph.line_to((x0 + bar, y1 - bar));
    glyph.line_to((x1, y1 - bar));
    glyph.move_to((x1 - bar, y1));
    glyph.line_to((x1 - bar, y0 + bar));
    glyph.line_to((x0, y0 + bar));
    surface.stroke_path(
        &glyph,
        StrokePaint::solid(WHITE, 1.5).with_cap(LineCap::Butt),
    );
}
