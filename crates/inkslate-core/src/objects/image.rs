//! Placed image objects.

use super::DrawableId;
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest width or height an object can be resized to.
pub const MIN_OBJECT_SIZE: f64 = 10.0;

/// Supported image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Sniff the format from the first bytes of an encoded image.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(ImageFormat::WebP)
        } else {
            None
        }
    }
}

/// Crop window in the image's native pixel space.
///
/// Independent of where the image sits on the page or how large it is drawn.
/// Always kept inside the natural bounds by [`ImageObject::clamp_crop`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Crop covering the whole natural image.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
        }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// An image placed on a page.
///
/// `position`, `width` and `height` describe the box the image occupies in
/// scene coordinates. `crop` selects which part of the source bitmap fills
/// that box; the two are decoupled so moving or resizing the box never
/// changes what is shown unless crop mode is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageObject {
    pub(crate) id: DrawableId,
    /// Base64-encoded source bytes (PNG, JPEG, or WebP).
    pub data_base64: String,
    /// Natural pixel width of the source bitmap.
    pub source_width: u32,
    /// Natural pixel height of the source bitmap.
    pub source_height: u32,
    /// Top-left corner of the displayed box, in scene coordinates.
    pub position: Point,
    /// Displayed width in scene units.
    pub width: f64,
    /// Displayed height in scene units.
    pub height: f64,
    /// Visible window into the source bitmap, in native pixels.
    pub crop: CropRect,
}

impl ImageObject {
    /// Build an image from raw encoded bytes and its decoded dimensions.
    ///
    /// The image starts at the origin, displayed at natural size with a full
    /// crop. Placement and fitting happen at the board level.
    pub fn from_data(data: &[u8], width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            data_base64: STANDARD.encode(data),
            source_width: width,
            source_height: height,
            position: Point::ZERO,
            width: width as f64,
            height: height as f64,
            crop: CropRect::full(width, height),
        }
    }

    pub fn id(&self) -> DrawableId {
        self.id
    }

    /// Decode the stored base64 back into the original bytes.
    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }

    /// The box the image occupies in scene coordinates.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Whether a point falls inside the displayed box, edges included.
    pub fn hit_test(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + self.width
            && point.y >= self.position.y
            && point.y <= self.position.y + self.height
    }

    /// Scale the displayed box down to fit inside `max_width` x `max_height`,
    /// preserving aspect ratio. Images already inside the bounds are left
    /// untouched.
    pub fn shrink_to_fit(&mut self, max_width: f64, max_height: f64) {
        let max_width = max_width.max(1.0);
        let max_height = max_height.max(1.0);
        let ratio = (max_width / self.width).min(max_height / self.height);
        if ratio < 1.0 {
            self.width *= ratio;
            self.height *= ratio;
        }
    }

    /// Clamp the crop window back into the natural bounds of the source.
    pub fn clamp_crop(&mut self) {
        let max_width = (self.source_width as f64).max(1.0);
        let max_height = (self.source_height as f64).max(1.0);
        self.crop.width = self.crop.width.clamp(1.0, max_width);
        self.crop.height = self.crop.height.clamp(1.0, max_height);
        self.crop.x = self.crop.x.clamp(0.0, max_width - self.crop.width);
        self.crop.y = self.crop.y.clamp(0.0, max_height - self.crop.height);
    }

    /// Restore the crop to the full source bitmap.
    pub fn reset_crop(&mut self) {
        self.crop = CropRect::full(self.source_width, self.source_height);
    }
}
