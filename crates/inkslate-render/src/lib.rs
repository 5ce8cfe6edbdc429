//! Inkslate Render Library
//!
//! Renderer abstraction and implementations for Inkslate.
//! The default implementation rasterizes on the CPU with vello_cpu.

mod renderer;
mod surface;

#[cfg(feature = "cpu-renderer")]
mod pixmap;

pub use renderer::{RenderError, RenderResult, render_live, render_page};
pub use surface::{BlendStyle, LineCap, RecordingSurface, RenderSurface, StrokePaint, SurfaceOp};

#[cfg(feature = "cpu-renderer")]
pub use pixmap::{PixmapSurface, RasterFrame, decode_dimensions, decode_for_board};
