//! Pointer-driven interaction: the gesture state machine that turns a
//! unified pointer stream into scene mutations.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::handles::{self, HandleKind};
use crate::objects::{BrushKind, Drawable, ImageObject, MIN_OBJECT_SIZE, Stroke};
use crate::settings::{BrushSettings, ToolKind};

/// Strength of the exponential smoothing applied to drawing input. Raw
/// points are pulled towards the previous point by this fraction.
pub const DAMPING_FACTOR: f64 = 0.5;

/// Which button a pointer press arrived with. Mouse, pen and touch are fed
/// through the same stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    /// Right mouse button.
    Secondary,
    /// Pen barrel button.
    Barrel,
    Other,
}

impl PointerButton {
    /// Secondary mouse button and pen barrel button both force the eraser
    /// for the duration of the gesture.
    pub fn is_eraser_override(&self) -> bool {
        matches!(self, PointerButton::Secondary | PointerButton::Barrel)
    }
}

/// A pointer press, already transformed into scene coordinates (see
/// [`crate::geometry::to_scene_coords`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub position: Point,
    pub button: PointerButton,
}

impl PointerInput {
    pub fn new(position: Point, button: PointerButton) -> Self {
        Self { position, button }
    }

    pub fn primary(position: Point) -> Self {
        Self::new(position, PointerButton::Primary)
    }
}

/// Cursor the embedding shell should show for a hover position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Crosshair,
    Pointer,
    Move,
    ResizeNwSe,
    ResizeNeSw,
    ResizeNs,
    ResizeEw,
}

/// What the pointer is currently doing. At most one gesture is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Drawing,
    Erasing,
    Moving { grab_offset: Vec2 },
    Resizing { handle: HandleKind },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

impl Board {
    /// Handle a pointer press. Returns whether the scene changed and a
    /// redraw is due.
    pub fn pointer_down(&mut self, input: PointerInput) -> bool {
        let point = input.position;
        if input.button.is_eraser_override() && self.tool != ToolKind::Eraser {
            self.pre_eraser_tool = Some(self.tool);
            self.set_tool(ToolKind::Eraser);
        }
        match self.tool {
            ToolKind::Select => self.select_down(point),
            ToolKind::Pencil => {
                let brush = self.settings.pencil;
                self.begin_stroke(point, brush, BrushKind::Pencil)
            }
            ToolKind::Highlighter => {
                let brush = self.settings.highlighter;
                self.begin_stroke(point, brush, BrushKind::Highlighter)
            }
            ToolKind::Eraser => {
                self.gesture = Gesture::Erasing;
                self.erase_at(point)
            }
        }
    }

    fn begin_stroke(&mut self, point: Point, brush: BrushSettings, kind: BrushKind) -> bool {
        self.current_stroke = Some(Stroke::new(point, brush.color, brush.size, kind));
        self.last_point = Some(point);
        self.gesture = Gesture::Drawing;
        true
    }

    /// Press with the select tool. Probes, in order: the crop toggle, the
    /// resize handles of the selection, then the topmost image under the
    /// pointer. A click on the toggle suppresses any drag for this gesture.
    fn select_down(&mut self, point: Point) -> bool {
        if let Some(toggle) = self.crop_toggle_rect() {
            if toggle.contains(point) {
                self.toggle_crop_mode();
                self.gesture = Gesture::Idle;
                return true;
            }
        }
        if let Some(rect) = self.selected_image().map(ImageObject::as_rect) {
            if let Some(handle) = handles::handle_at(rect, point) {
                self.gesture = Gesture::Resizing { handle };
                return false;
            }
        }
        if let Some(image) = self.image_at(point) {
            let id = image.id();
            let origin = image.position;
            self.select(id);
            self.gesture = Gesture::Moving {
                grab_offset: point - origin,
            };
            return true;
        }
        let had_selection = self.selection.is_some();
        self.clear_selection();
        self.gesture = Gesture::Idle;
        had_selection
    }

    /// Handle pointer motion with the button held. Without an active
    /// gesture this mutates nothing; use [`Board::cursor_hint`] for hover
    /// feedback.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        match self.gesture {
            Gesture::Idle => false,
            Gesture::Drawing => {
                let smoothed = self.damped_point(point);
                if self.last_point == Some(smoothed) {
                    return false;
                }
                let Some(stroke) = self.current_stroke.as_mut() else {
                    return false;
                };
                stroke.add_point(smoothed);
                self.last_point = Some(smoothed);
                true
            }
            Gesture::Erasing => self.erase_at(point),
            Gesture::Moving { grab_offset } => match self.selected_image_mut() {
                Some(image) => {
                    image.position = point - grab_offset;
                    true
                }
                None => false,
            },
            Gesture::Resizing { handle } => self.resize_selected(handle, point),
        }
    }

    /// Smooth a raw point against the previous one: the new point is pulled
    /// towards the last by [`DAMPING_FACTOR`].
    fn damped_point(&self, raw: Point) -> Point {
        match self.last_point {
            Some(last) => last + (raw - last) * (1.0 - DAMPING_FACTOR),
            None => raw,
        }
    }

    /// Apply a resize drag to the selected image. The handle decides which
    /// edges follow the pointer; top/left handles reposition the origin.
    /// With crop mode active the crop window changes proportionally in
    /// native pixel space, on top of the same box update.
    fn resize_selected(&mut self, handle: HandleKind, point: Point) -> bool {
        let crop_active = self.crop_mode;
        let Some(image) = self.selected_image_mut() else {
            return false;
        };
        let old = image.as_rect();
        let mut x = old.x0;
        let mut y = old.y0;
        let mut width = old.width();
        let mut height = old.height();

        if handle.moves_left() {
            width = old.x1 - point.x;
            x = point.x;
        } else if handle.moves_right() {
            width = point.x - old.x0;
        }
        if handle.moves_top() {
            height = old.y1 - point.y;
            y = point.y;
        } else if handle.moves_bottom() {
            height = point.y - old.y0;
        }
        width = width.max(MIN_OBJECT_SIZE);
        height = height.max(MIN_OBJECT_SIZE);

        if crop_active {
            // Floor the previous display size before dividing, so a
            // degenerate box cannot blow up the ratio.
            let scale_x = image.crop.width / old.width().max(MIN_OBJECT_SIZE);
            let scale_y = image.crop.height / old.height().max(MIN_OBJECT_SIZE);
            image.crop.x += (x - old.x0) * scale_x;
            image.crop.y += (y - old.y0) * scale_y;
            image.crop.width += (width - old.width()) * scale_x;
            image.crop.height += (height - old.height()) * scale_y;
            image.clamp_crop();
        }
        image.position = Point::new(x, y);
        image.width = width;
        image.height = height;
        true
    }

    /// Handle the pointer being released, anywhere, including outside the
    /// surface. Commits the stroke in flight if it gathered at least two
    /// points, ends the gesture, and restores a tool overridden by a
    /// secondary-button press.
    pub fn pointer_up(&mut self) -> bool {
        let mut changed = false;
        if let Some(stroke) = self.current_stroke.take() {
            if stroke.points.len() >= 2 {
                self.current_page_mut().push(Drawable::Stroke(stroke));
            }
            changed = true;
        }
        self.gesture = Gesture::Idle;
        self.last_point = None;
        if let Some(previous) = self.pre_eraser_tool.take() {
            self.set_tool(previous);
        }
        changed
    }

    /// Cursor to show at a hover position with nothing pressed.
    pub fn cursor_hint(&self, point: Point) -> CursorHint {
        match self.tool {
            ToolKind::Pencil | ToolKind::Highlighter | ToolKind::Eraser => CursorHint::Crosshair,
            ToolKind::Select => {
                if let Some(toggle) = self.crop_toggle_rect() {
                    if toggle.contains(point) {
                        return CursorHint::Pointer;
                    }
                }
                if let Some(image) = self.selected_image() {
                    if let Some(handle) = handles::handle_at(image.as_rect(), point) {
                        return handle.cursor();
                    }
                }
                if self.image_at(point).is_some() {
                    CursorHint::Move
                } else {
                    CursorHint::Default
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{DrawableId, SerializableColor};

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn board_with_image(width: f64, height: f64, natural: (u32, u32)) -> (Board, DrawableId) {
        let mut board = Board::default();
        let mut image = ImageObject::from_data(PNG_MAGIC, natural.0, natural.1);
        image.width = width;
        image.height = height;
        let id = image.id();
        board.current_page_mut().push(Drawable::Image(image));
        board.set_tool(ToolKind::Select);
        board.select(id);
        (board, id)
    }

    fn committed_stroke(board: &Board) -> &Stroke {
        match &board.current_page_drawables()[0] {
            Drawable::Stroke(stroke) => stroke,
            _ => panic!("Expected a stroke"),
        }
    }

    #[test]
    fn test_pencil_gesture_commits_one_stroke() {
        let mut board = Board::new(1280.0, 720.0);
        assert!(board.pointer_down(PointerInput::primary(Point::new(100.0, 100.0))));
        // Raw inputs chosen so the smoothed points land on round targets.
        board.pointer_move(Point::new(300.0, 100.0));
        board.pointer_move(Point::new(200.0, 300.0));
        assert!(board.pointer_up());

        assert_eq!(board.current_page_drawables().len(), 1);
        let stroke = committed_stroke(&board);
        assert_eq!(stroke.points.len(), 3);
        assert!((stroke.points[0].x - 100.0).abs() < f64::EPSILON);
        assert!((stroke.points[1].x - 200.0).abs() < f64::EPSILON);
        assert!((stroke.points[1].y - 100.0).abs() < f64::EPSILON);
        assert!((stroke.points[2].x - 200.0).abs() < f64::EPSILON);
        assert!((stroke.points[2].y - 200.0).abs() < f64::EPSILON);
        assert!(board.current_stroke().is_none());
        assert!(board.gesture().is_idle());
    }

    #[test]
    fn test_damping_pulls_towards_last_point() {
        let mut board = Board::default();
        board.pointer_down(PointerInput::primary(Point::ZERO));
        board.pointer_move(Point::new(100.0, 0.0));
        let stroke = board.current_stroke().unwrap();
        assert!((stroke.points[1].x - 50.0).abs() < f64::EPSILON);
        // The filter keeps trailing behind a stationary target.
        board.pointer_move(Point::new(100.0, 0.0));
        let stroke = board.current_stroke().unwrap();
        assert!((stroke.points[2].x - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_click_commits_nothing() {
        let mut board = Board::default();
        board.pointer_down(PointerInput::primary(Point::new(50.0, 50.0)));
        board.pointer_up();
        assert!(board.current_page_drawables().is_empty());
        assert!(board.current_stroke().is_none());
    }

    #[test]
    fn test_stationary_move_appends_no_duplicate() {
        let mut board = Board::default();
        board.pointer_down(PointerInput::primary(Point::new(50.0, 50.0)));
        assert!(!board.pointer_move(Point::new(50.0, 50.0)));
        assert_eq!(board.current_stroke().unwrap().points.len(), 1);
        board.pointer_up();
        assert!(board.current_page_drawables().is_empty());
    }

    #[test]
    fn test_highlighter_uses_its_own_settings() {
        let mut board = Board::default();
        board.set_tool(ToolKind::Highlighter);
        board.pointer_down(PointerInput::primary(Point::ZERO));
        let stroke = board.current_stroke().unwrap();
        assert!(matches!(stroke.brush, BrushKind::Highlighter));
        assert!((stroke.width - 7.0).abs() < f64::EPSILON);
        assert_eq!(stroke.color, SerializableColor::new(0xFA, 0xCC, 0x15, 255));
    }

    #[test]
    fn test_secondary_button_overrides_to_eraser() {
        let mut board = Board::default();
        let mut stroke = Stroke::new(
            Point::new(0.0, 0.0),
            SerializableColor::black(),
            4.0,
            BrushKind::Pencil,
        );
        stroke.add_point(Point::new(100.0, 0.0));
        board.current_page_mut().push(Drawable::Stroke(stroke));

        let input = PointerInput::new(Point::new(50.0, 10.0), PointerButton::Secondary);
        assert!(board.pointer_down(input));
        assert!(matches!(board.tool(), ToolKind::Eraser));
        assert!(committed_stroke(&board).is_erased);

        board.pointer_up();
        assert!(matches!(board.tool(), ToolKind::Pencil));
        assert!(board.gesture().is_idle());
    }

    #[test]
    fn test_barrel_button_override_does_not_stack_on_eraser() {
        let mut board = Board::default();
        board.set_tool(ToolKind::Eraser);
        board.pointer_down(PointerInput::new(Point::ZERO, PointerButton::Barrel));
        board.pointer_up();
        // No stored tool to restore, so the eraser stays active.
        assert!(matches!(board.tool(), ToolKind::Eraser));
    }

    #[test]
    fn test_select_click_starts_move_with_grab_offset() {
        let (mut board, id) = board_with_image(100.0, 100.0, (100, 100));
        board.clear_selection();
        assert!(board.pointer_down(PointerInput::primary(Point::new(60.0, 60.0))));
        assert_eq!(board.selection(), Some(id));
        assert!(matches!(board.gesture(), Gesture::Moving { .. }));
        board.pointer_move(Point::new(100.0, 100.0));
        let image = board.selected_image().unwrap();
        assert!((image.position.x - 40.0).abs() < f64::EPSILON);
        assert!((image.position.y - 40.0).abs() < f64::EPSILON);
        board.pointer_up();
        assert_eq!(board.selection(), Some(id));
    }

    #[test]
    fn test_click_on_empty_space_deselects() {
        let (mut board, _) = board_with_image(100.0, 100.0, (100, 100));
        assert!(board.pointer_down(PointerInput::primary(Point::new(500.0, 500.0))));
        assert!(board.selection().is_none());
        board.pointer_up();
        // With nothing selected the same click changes nothing.
        assert!(!board.pointer_down(PointerInput::primary(Point::new(500.0, 500.0))));
    }

    #[test]
    fn test_crop_toggle_click_suppresses_drag() {
        let (mut board, _) = board_with_image(200.0, 100.0, (200, 100));
        // Toggle button sits inset into the top-right corner.
        let toggle = board.crop_toggle_rect().unwrap();
        assert!((toggle.x0 - 174.0).abs() < f64::EPSILON);

        assert!(board.pointer_down(PointerInput::primary(Point::new(180.0, 16.0))));
        assert!(board.crop_mode());
        assert!(board.gesture().is_idle());
        // The press never becomes a drag.
        assert!(!board.pointer_move(Point::new(400.0, 300.0)));
        let image = board.selected_image().unwrap();
        assert!((image.position.x).abs() < f64::EPSILON);
        board.pointer_up();

        board.pointer_down(PointerInput::primary(Point::new(180.0, 16.0)));
        assert!(!board.crop_mode());
    }

    #[test]
    fn test_resize_clamps_to_minimum_size() {
        let (mut board, _) = board_with_image(100.0, 80.0, (100, 80));
        board.pointer_down(PointerInput::primary(Point::new(100.0, 80.0)));
        assert!(matches!(
            board.gesture(),
            Gesture::Resizing {
                handle: HandleKind::BottomRight
            }
        ));
        board.pointer_move(Point::new(-50.0, -50.0));
        let image = board.selected_image().unwrap();
        assert!((image.width - 10.0).abs() < f64::EPSILON);
        assert!((image.height - 10.0).abs() < f64::EPSILON);
        assert!((image.position.x).abs() < f64::EPSILON);
    }

    #[test]
    fn test_left_handle_moves_origin() {
        let (mut board, _) = board_with_image(400.0, 300.0, (400, 300));
        board.pointer_down(PointerInput::primary(Point::new(0.0, 150.0)));
        assert!(matches!(
            board.gesture(),
            Gesture::Resizing {
                handle: HandleKind::Left
            }
        ));
        board.pointer_move(Point::new(50.0, 150.0));
        let image = board.selected_image().unwrap();
        assert!((image.position.x - 50.0).abs() < f64::EPSILON);
        assert!((image.width - 350.0).abs() < f64::EPSILON);
        assert!((image.height - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_crop_resize_scales_crop_proportionally() {
        // Natural 800x600 displayed at 100x75: one displayed unit covers
        // eight native pixels horizontally.
        let (mut board, _) = board_with_image(100.0, 75.0, (800, 600));
        board.toggle_crop_mode();
        board.pointer_down(PointerInput::primary(Point::new(100.0, 37.5)));
        assert!(matches!(
            board.gesture(),
            Gesture::Resizing {
                handle: HandleKind::Right
            }
        ));
        board.pointer_move(Point::new(50.0, 37.5));
        let image = board.selected_image().unwrap();
        // Displayed width shrank by the 50 units dragged, the crop window
        // by the proportional 400 native pixels.
        assert!((image.width - 50.0).abs() < f64::EPSILON);
        assert!((image.crop.width - 400.0).abs() < f64::EPSILON);
        assert!((image.crop.x).abs() < f64::EPSILON);
        assert!((image.crop.height - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_crop_resize_stays_inside_natural_bounds() {
        let (mut board, _) = board_with_image(100.0, 100.0, (100, 100));
        board.toggle_crop_mode();
        board.pointer_down(PointerInput::primary(Point::new(100.0, 50.0)));
        // Dragging far outward would push the crop past the source edge.
        board.pointer_move(Point::new(400.0, 50.0));
        let image = board.selected_image().unwrap();
        assert!((image.crop.width - 100.0).abs() < f64::EPSILON);
        assert!((image.crop.x).abs() < f64::EPSILON);
        assert!((image.width - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_survives_stale_selection() {
        let (mut board, id) = board_with_image(100.0, 80.0, (100, 80));
        board.pointer_down(PointerInput::primary(Point::new(100.0, 80.0)));
        board.current_page_mut().remove(id);
        assert!(!board.pointer_move(Point::new(50.0, 50.0)));
        board.pointer_up();
        assert!(board.gesture().is_idle());
    }

    #[test]
    fn test_cursor_hints_follow_hover_target() {
        let (mut board, _) = board_with_image(200.0, 100.0, (200, 100));
        assert!(matches!(
            board.cursor_hint(Point::new(180.0, 16.0)),
            CursorHint::Pointer
        ));
        assert!(matches!(
            board.cursor_hint(Point::new(200.0, 100.0)),
            CursorHint::ResizeNwSe
        ));
        assert!(matches!(
            board.cursor_hint(Point::new(100.0, 99.0)),
            CursorHint::ResizeNs
        ));
        assert!(matches!(
            board.cursor_hint(Point::new(100.0, 50.0)),
            CursorHint::Move
        ));
        assert!(matches!(
            board.cursor_hint(Point::new(600.0, 600.0)),
            CursorHint::Default
        ));
        board.set_tool(ToolKind::Pencil);
        assert!(matches!(
            board.cursor_hint(Point::new(100.0, 50.0)),
            CursorHint::Crosshair
        ));
    }
}
