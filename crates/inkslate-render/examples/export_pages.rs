//! Renders a small two-page board to PNG files.
//!
//! Usage: cargo run --example export_pages [OUT_DIR]

use std::io::Cursor;
use std::path::PathBuf;

use inkslate_core::{Board, PageDirection, PointerInput, ToolKind};
use inkslate_render::{PixmapSurface, decode_for_board, render_page};
use kurbo::Point;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| ".".to_string()));

    let mut board = Board::default();

    // Page 1: a pencil line and a highlighted band.
    draw_line(&mut board, Point::new(140.0, 420.0), Point::new(520.0, 180.0));
    board.set_tool(ToolKind::Highlighter);
    draw_line(&mut board, Point::new(120.0, 470.0), Point::new(900.0, 470.0));

    // Page 2: a generated image, scaled and centered on insert.
    board.change_page(PageDirection::Next);
    let pending = board.begin_add_image();
    let png = checker_png(320, 200)?;
    let decoded = decode_for_board(png).map_err(|err| err.to_string());
    board.complete_add_image(pending, decoded)?;

    for page in 1..=board.page_count() {
        let size = board.size();
        let mut surface = PixmapSurface::new(size.width, size.height)?;
        render_page(&board, page, &mut surface)?;
        let frame = surface.finish();
        let path = out_dir.join(format!("page-{page}.png"));
        image::save_buffer(
            &path,
            &frame.rgba_data,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn draw_line(board: &mut Board, from: Point, to: Point) {
    board.pointer_down(PointerInput::primary(from));
    // A few intermediate moves so the input smoothing has work to do.
    for step in 1..=4 {
        let t = step as f64 / 4.0;
        board.pointer_move(Point::new(
            from.x + (to.x - from.x) * t,
            from.y + (to.y - from.y) * t,
        ));
    }
    board.pointer_up();
}

fn checker_png(width: u32, height: u32) -> Result<Vec<u8>, image::ImageError> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        if (x / 20 + y / 20) % 2 == 0 {
            image::Rgba([66, 133, 244, 255])
        } else {
            image::Rgba([255, 255, 255, 255])
        }
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}
