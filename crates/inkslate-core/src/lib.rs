//! Inkslate Core Library
//!
//! Platform-agnostic scene model and interaction engine for the Inkslate
//! whiteboard: pages of strokes and images, per-tool brush settings, image
//! selection with resize and crop handles, and a pointer-driven state
//! machine tying them together. Rendering lives in `inkslate-render`.

pub mod board;
pub mod geometry;
pub mod handles;
pub mod input;
pub mod objects;
pub mod settings;

pub use board::{
    BackgroundImage, Board, BoardError, DecodedImage, Page, PageDirection, PendingImage,
    DEFAULT_HEIGHT, DEFAULT_WIDTH, ERASER_HIT_MARGIN, MAX_PAGES,
};
pub use geometry::{point_to_segment_dist, to_scene_coords};
pub use handles::{
    crop_toggle_rect, handle_at, resize_handles, Handle, HandleKind, CROP_TOGGLE_SIZE, HANDLE_SIZE,
};
pub use input::{CursorHint, Gesture, PointerButton, PointerInput, DAMPING_FACTOR};
pub use objects::{
    BrushKind, CropRect, Drawable, DrawableId, ImageFormat, ImageObject, SerializableColor, Stroke,
    MIN_OBJECT_SIZE,
};
pub use settings::{BrushSettings, ToolKind, ToolSettings};
