//! Board state: pages of drawables, the active tool, selection, and the
//! canvas surface itself.

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::handles;
use crate::input::Gesture;
use crate::objects::{Drawable, DrawableId, ImageObject, Stroke};
use crate::settings::{ToolKind, ToolSettings};

/// Hard cap on the number of pages a board can hold.
pub const MAX_PAGES: usize = 200;
/// Default canvas width in scene units.
pub const DEFAULT_WIDTH: f64 = 1280.0;
/// Default canvas height in scene units.
pub const DEFAULT_HEIGHT: f64 = 720.0;
/// Extra reach added to the eraser size when hit-testing strokes.
pub const ERASER_HIT_MARGIN: f64 = 10.0;
/// Padding kept around images that are scaled down to fit the canvas.
pub(crate) const IMAGE_FIT_PADDING: f64 = 50.0;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: f64, height: f64 },
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),
}

/// One page of the board. Drawables keep insertion order, which is also
/// their paint order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    drawables: Vec<Drawable>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, drawable: Drawable) {
        self.drawables.push(drawable);
    }

    /// Remove a drawable by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: DrawableId) -> bool {
        let before = self.drawables.len();
        self.drawables.retain(|drawable| drawable.id() != id);
        self.drawables.len() != before
    }

    pub fn get(&self, id: DrawableId) -> Option<&Drawable> {
        self.drawables.iter().find(|drawable| drawable.id() == id)
    }

    pub fn get_mut(&mut self, id: DrawableId) -> Option<&mut Drawable> {
        self.drawables
            .iter_mut()
            .find(|drawable| drawable.id() == id)
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn drawables_mut(&mut self) -> &mut [Drawable] {
        &mut self.drawables
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }
}

/// Background image stretched across every page of the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub(crate) id: Uuid,
    pub data_base64: String,
    pub source_width: u32,
    pub source_height: u32,
}

impl BackgroundImage {
    pub fn from_data(data: &[u8], width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            data_base64: STANDARD.encode(data),
            source_width: width,
            source_height: height,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }
}

/// Raw bytes plus decoded dimensions, produced by whichever decoder the
/// embedding shell uses.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Token from [`Board::begin_add_image`]. Captures the page the image was
/// requested on so it lands there even if the user navigates while the
/// decode is in flight.
#[must_use]
#[derive(Debug, Clone, Copy)]
pub struct PendingImage {
    pub(crate) page: usize,
}

impl PendingImage {
    pub fn page(&self) -> usize {
        self.page
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageDirection {
    Prev,
    Next,
}

/// The whole board: canvas size, pages, tool state, selection, and the
/// in-flight gesture.
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) pages: Vec<Page>,
    /// 1-based index of the page being viewed and edited.
    pub(crate) current_page: usize,
    pub(crate) background: Option<BackgroundImage>,
    pub(crate) tool: ToolKind,
    /// Tool to restore when a secondary-button eraser override ends.
    pub(crate) pre_eraser_tool: Option<ToolKind>,
    pub(crate) settings: ToolSettings,
    /// Selected drawable, if any. Only ever set while the select tool is
    /// active; reads are re-validated against the current page.
    pub(crate) selection: Option<DrawableId>,
    pub(crate) crop_mode: bool,
    pub(crate) gesture: Gesture,
    /// Stroke being drawn, not yet committed to a page.
    pub(crate) current_stroke: Option<Stroke>,
    pub(crate) last_point: Option<Point>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Board {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pages: vec![Page::new()],
            current_page: 1,
            background: None,
            tool: ToolKind::default(),
            pre_eraser_tool: None,
            settings: ToolSettings::default(),
            selection: None,
            crop_mode: false,
            gesture: Gesture::Idle,
            current_stroke: None,
            last_point: None,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    /// 1-based number of the page being viewed.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn can_advance_page(&self) -> bool {
        self.current_page < MAX_PAGES
    }

    /// Page by 1-based number.
    pub fn page(&self, number: usize) -> Option<&Page> {
        if number == 0 {
            return None;
        }
        self.pages.get(number - 1)
    }

    pub fn current_page_drawables(&self) -> &[Drawable] {
        self.pages[self.current_page - 1].drawables()
    }

    pub(crate) fn current_page_mut(&mut self) -> &mut Page {
        &mut self.pages[self.current_page - 1]
    }

    pub fn background(&self) -> Option<&BackgroundImage> {
        self.background.as_ref()
    }

    pub fn crop_mode(&self) -> bool {
        self.crop_mode
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Stroke currently being drawn, if a draw gesture is in progress.
    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.current_stroke.as_ref()
    }

    pub fn selection(&self) -> Option<DrawableId> {
        self.selection
    }

    /// The selected image, re-validated against the current page. Returns
    /// `None` if the selection is stale or points at a stroke.
    pub fn selected_image(&self) -> Option<&ImageObject> {
        let id = self.selection?;
        self.current_page_drawables()
            .iter()
            .find(|drawable| drawable.id() == id)
            .and_then(Drawable::as_image)
    }

    pub(crate) fn selected_image_mut(&mut self) -> Option<&mut ImageObject> {
        let id = self.selection?;
        self.current_page_mut()
            .get_mut(id)
            .and_then(Drawable::as_image_mut)
    }

    /// Select a drawable. Selecting a different drawable leaves crop mode.
    pub(crate) fn select(&mut self, id: DrawableId) {
        if self.selection != Some(id) {
            self.crop_mode = false;
        }
        self.selection = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.crop_mode = false;
    }

    /// Switch tools. Any tool other than select drops the selection.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != ToolKind::Select {
            self.clear_selection();
        }
        self.tool = tool;
    }

    /// Flip crop mode for the selected image. Does nothing without one.
    pub fn toggle_crop_mode(&mut self) -> bool {
        if self.selected_image().is_some() {
            self.crop_mode = !self.crop_mode;
        }
        self.crop_mode
    }

    /// Start adding an image. The returned token remembers the target page;
    /// decode the bytes however the shell likes and finish with
    /// [`Board::complete_add_image`].
    pub fn begin_add_image(&self) -> PendingImage {
        PendingImage {
            page: self.current_page,
        }
    }

    /// Place a decoded image on its captured page: scaled down if it would
    /// not fit the canvas with some margin, centered, fully un-cropped, and
    /// selected with the select tool active.
    pub fn complete_add_image(
        &mut self,
        pending: PendingImage,
        result: Result<DecodedImage, String>,
    ) -> Result<DrawableId, BoardError> {
        let decoded = match result {
            Ok(decoded) => decoded,
            Err(reason) => {
                log::warn!("Image decode failed: {reason}");
                return Err(BoardError::ImageDecode(reason));
            }
        };
        let mut image = ImageObject::from_data(&decoded.data, decoded.width, decoded.height);
        let fit_width = (self.width - 2.0 * IMAGE_FIT_PADDING).max(1.0);
        let fit_height = (self.height - 2.0 * IMAGE_FIT_PADDING).max(1.0);
        image.shrink_to_fit(fit_width, fit_height);
        image.position = Point::new(
            (self.width - image.width) / 2.0,
            (self.height - image.height) / 2.0,
        );
        let id = image.id();
        let page = pending.page.min(self.pages.len());
        self.pages[page - 1].push(Drawable::Image(image));
        self.set_tool(ToolKind::Select);
        self.select(id);
        Ok(id)
    }

    /// Delete the selected drawable from the current page. Only active under
    /// the select tool; safe to call with a stale or empty selection.
    pub fn delete_selected(&mut self) -> bool {
        if self.tool != ToolKind::Select {
            return false;
        }
        let Some(id) = self.selection else {
            return false;
        };
        let removed = self.current_page_mut().remove(id);
        self.clear_selection();
        removed
    }

    /// Navigate one page backwards or forwards. Forward allocates a fresh
    /// page when walking past the last one, up to [`MAX_PAGES`]. Navigation
    /// always drops the selection, even when it hits a boundary.
    pub fn change_page(&mut self, direction: PageDirection) -> bool {
        self.clear_selection();
        match direction {
            PageDirection::Prev => {
                if self.current_page > 1 {
                    self.current_page -= 1;
                    true
                } else {
                    false
                }
            }
            PageDirection::Next => {
                if self.current_page >= MAX_PAGES {
                    return false;
                }
                self.current_page += 1;
                if self.current_page > self.pages.len() {
                    self.pages.push(Page::new());
                }
                true
            }
        }
    }

    /// Install or fail a background image. A failed decode clears any
    /// existing background rather than keeping a stale one.
    pub fn complete_set_background(
        &mut self,
        result: Result<DecodedImage, String>,
    ) -> Result<(), BoardError> {
        match result {
            Ok(decoded) => {
                self.background = Some(BackgroundImage::from_data(
                    &decoded.data,
                    decoded.width,
                    decoded.height,
                ));
                Ok(())
            }
            Err(reason) => {
                log::warn!("Background decode failed: {reason}");
                self.background = None;
                Err(BoardError::ImageDecode(reason))
            }
        }
    }

    pub fn clear_background(&mut self) {
        self.background = None;
    }

    /// Resize the canvas. Any change of surface wipes the document, so this
    /// validates first and then resets.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) -> Result<(), BoardError> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(BoardError::InvalidCanvasSize { width, height });
        }
        self.width = width;
        self.height = height;
        self.reset();
        Ok(())
    }

    /// Wipe the document back to a single empty page. The active tool and
    /// its settings survive.
    pub fn reset(&mut self) {
        self.pages = vec![Page::new()];
        self.current_page = 1;
        self.background = None;
        self.clear_selection();
        self.gesture = Gesture::Idle;
        self.current_stroke = None;
        self.last_point = None;
        self.pre_eraser_tool = None;
    }

    /// Topmost image under a point on the current page. Strokes are never
    /// returned; only images are selectable.
    pub fn image_at(&self, point: Point) -> Option<&ImageObject> {
        self.current_page_drawables()
            .iter()
            .rev()
            .find_map(|drawable| drawable.as_image().filter(|image| image.hit_test(point)))
    }

    /// Hit box of the crop toggle button for the selected image.
    pub fn crop_toggle_rect(&self) -> Option<Rect> {
        self.selected_image()
            .map(|image| handles::crop_toggle_rect(image.as_rect()))
    }

    /// Soft-erase every stroke under the eraser at `point`. The reach is the
    /// eraser size plus [`ERASER_HIT_MARGIN`]. Images are untouched.
    pub fn erase_at(&mut self, point: Point) -> bool {
        let tolerance = self.settings.eraser_size + ERASER_HIT_MARGIN;
        let mut changed = false;
        for drawable in self.current_page_mut().drawables_mut() {
            if let Drawable::Stroke(stroke) = drawable {
                if stroke.hit_test(point, tolerance) {
                    stroke.is_erased = true;
                    changed = true;
                }
            }
        }
        changed
    }
}
