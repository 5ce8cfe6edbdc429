//! CPU rasterization with vello_cpu.
//!
//! [`PixmapSurface`] implements [`RenderSurface`] by painting into a
//! vello_cpu render context and rasterizing on demand. Decoded bitmaps are
//! cached per drawable so repeated frames never re-decode, and a failed
//! decode is cached too so it is not retried every frame.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use inkslate_core::{DecodedImage, DrawableId};
use kurbo::{Affine, BezPath, Cap, Join, Rect, Shape, StrokeOpts};
use peniko::Color;

use crate::renderer::{RenderError, RenderResult};
use crate::surface::{BlendStyle, LineCap, RenderSurface, StrokePaint};

/// Flattening tolerance for stroke expansion and rect outlines.
const STROKE_TOLERANCE: f64 = 0.1;

const MULTIPLY_BLEND: vello_cpu::peniko::BlendMode = vello_cpu::peniko::BlendMode {
    mix: vello_cpu::peniko::Mix::Multiply,
    compose: vello_cpu::peniko::Compose::SrcOver,
};

/// One rasterized frame: raw RGBA pixels and their dimensions.
///
/// Pixels are premultiplied, which is identical to straight alpha here
/// because every board render starts from an opaque clear.
#[derive(Debug, Clone)]
pub struct RasterFrame {
    pub rgba_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Software render surface backed by a vello_cpu context.
pub struct PixmapSurface {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
    image_cache: HashMap<DrawableId, Option<vello_cpu::Image>>,
}

impl PixmapSurface {
    /// Create a surface. Dimensions must be finite, at least one pixel and
    /// fit the u16 range vello_cpu works in.
    pub fn new(width: f64, height: f64) -> RenderResult<Self> {
        if !width.is_finite() || !height.is_finite() || width < 1.0 || height < 1.0 {
            return Err(RenderError::InvalidSurfaceSize { width, height });
        }
        let w: u16 = (width.round() as u32)
            .try_into()
            .map_err(|_| RenderError::InvalidSurfaceSize { width, height })?;
        let h: u16 = (height.round() as u32)
            .try_into()
            .map_err(|_| RenderError::InvalidSurfaceSize { width, height })?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            width: w,
            height: h,
            image_cache: HashMap::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Rasterize everything drawn since the last [`RenderSurface::clear`].
    pub fn finish(&mut self) -> RasterFrame {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        RasterFrame {
            rgba_data: pixmap.data_as_u8_slice().to_vec(),
            width: self.width as u32,
            height: self.height as u32,
        }
    }

    fn cached_paint(&mut self, id: DrawableId, data_base64: &str) -> Option<vello_cpu::Image> {
        if let Some(cached) = self.image_cache.get(&id) {
            return cached.clone();
        }
        let paint = match decode_paint(data_base64) {
            Ok(paint) => Some(paint),
            Err(reason) => {
                log::warn!("Failed to decode image {id}: {reason}");
                None
            }
        };
        self.image_cache.insert(id, paint.clone());
        paint
    }

    /// Gray box with an X, drawn where an undecodable image would be.
    fn draw_placeholder(&mut self, dest: Rect) {
        self.fill_rect(dest, Color::from_rgba8(200, 200, 200, 255));
        let mut cross = BezPath::new();
        cross.move_to((dest.x0, dest.y0));
        cross.line_to((dest.x1, dest.y1));
        cross.move_to((dest.x1, dest.y0));
        cross.line_to((dest.x0, dest.y1));
        self.stroke_path(
            &cross,
            StrokePaint::solid(Color::from_rgba8(150, 150, 150, 255), 2.0),
        );
        self.stroke_rect(
            dest,
            StrokePaint::solid(Color::from_rgba8(100, 100, 100, 255), 2.0),
        );
    }
}

impl RenderSurface for PixmapSurface {
    fn clear(&mut self, color: Color) {
        self.ctx.reset();
        self.ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            self.width as f64,
            self.height as f64,
        ));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    fn stroke_rect(&mut self, rect: Rect, paint: StrokePaint) {
        self.stroke_path(&rect.to_path(STROKE_TOLERANCE), paint);
    }

    fn stroke_path(&mut self, path: &BezPath, paint: StrokePaint) {
        let mut style = kurbo::Stroke::new(paint.width);
        style.join = Join::Round;
        let cap = match paint.cap {
            LineCap::Round => Cap::Round,
            LineCap::Butt => Cap::Butt,
        };
        style.start_cap = cap;
        style.end_cap = cap;
        if let Some([on, off]) = paint.dash {
            style = style.with_dashes(0.0, &[on, off]);
        }
        let outline = kurbo::stroke(
            path.elements().iter().copied(),
            &style,
            &StrokeOpts::default(),
            STROKE_TOLERANCE,
        );
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(paint.color));
        if matches!(paint.blend, BlendStyle::Multiply) {
            self.ctx.set_blend_mode(MULTIPLY_BLEND);
        }
        self.ctx.fill_path(&bezpath_to_cpu(&outline));
        if matches!(paint.blend, BlendStyle::Multiply) {
            self.ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        }
    }

    fn draw_image(&mut self, id: DrawableId, data_base64: &str, src: Rect, dest: Rect) {
        if src.width() <= 0.0 || src.height() <= 0.0 {
            return;
        }
        let Some(paint) = self.cached_paint(id, data_base64) else {
            self.draw_placeholder(dest);
            return;
        };
        // Map the source window onto the destination; the paint is sampled
        // in user space with the bitmap at the origin.
        let transform = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / src.width(), dest.height() / src.height())
            * Affine::translate((-src.x0, -src.y0));
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&rect_to_cpu(src));
    }
}

/// Read the pixel dimensions of an encoded image.
pub fn decode_dimensions(data: &[u8]) -> RenderResult<(u32, u32)> {
    let decoded =
        ::image::load_from_memory(data).map_err(|err| RenderError::Decode(err.to_string()))?;
    Ok(decoded.to_rgba8().dimensions())
}

/// Decode encoded bytes into the form the board's image seams expect.
pub fn decode_for_board(data: Vec<u8>) -> RenderResult<DecodedImage> {
    let (width, height) = decode_dimensions(&data)?;
    Ok(DecodedImage {
        data,
        width,
        height,
    })
}

fn decode_paint(data_base64: &str) -> Result<vello_cpu::Image, String> {
    let raw = STANDARD
        .decode(data_base64)
        .map_err(|err| err.to_string())?;
    let decoded = ::image::load_from_memory(&raw).map_err(|err| err.to_string())?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut bytes = rgba.into_raw();
    premultiply_rgba8_in_place(&mut bytes);
    rgba_premul_to_image(&bytes, width, height)
}

fn color_to_cpu(color: Color) -> vello_cpu::peniko::Color {
    let rgba = color.to_rgba8();
    vello_cpu::peniko::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

fn rect_to_cpu(rect: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1)
}

fn affine_to_cpu(affine: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(affine.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<vello_cpu::Pixmap, String> {
    let w: u16 = width
        .try_into()
        .map_err(|_| "pixmap width exceeds u16".to_string())?;
    let h: u16 = height
        .try_into()
        .map_err(|_| "pixmap height exceeds u16".to_string())?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err("pixmap byte len mismatch".to_string());
    }
    // Pixmap stores PremulRgba8; the bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> Result<vello_cpu::Image, String> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
