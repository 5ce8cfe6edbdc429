//! Drawable objects that make up a page.

mod image;
mod stroke;

pub use image::{CropRect, ImageFormat, ImageObject, MIN_OBJECT_SIZE};
pub use stroke::{BrushKind, STROKE_HIT_SLACK, Stroke};

use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for drawables.
pub type DrawableId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// The same color with a replaced alpha channel.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// A drawable object on a page. Paint order is the page's insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Drawable {
    Stroke(Stroke),
    Image(ImageObject),
}

impl Drawable {
    pub fn id(&self) -> DrawableId {
        match self {
            Drawable::Stroke(s) => s.id(),
            Drawable::Image(i) => i.id(),
        }
    }

    pub fn as_image(&self) -> Option<&ImageObject> {
        match self {
            Drawable::Image(i) => Some(i),
            Drawable::Stroke(_) => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageObject> {
        match self {
            Drawable::Image(i) => Some(i),
            Drawable::Stroke(_) => None,
        }
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Drawable::Stroke(s) => Some(s),
            Drawable::Image(_) => None,
        }
    }

    /// Whether a point in scene coordinates hits this drawable.
    ///
    /// Only images participate in selection picking; strokes answer here for
    /// the eraser path.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Drawable::Stroke(s) => s.hit_test(point, tolerance),
            Drawable::Image(i) => i.hit_test(point),
        }
    }
}
