//! Grid drawing shared by the playfield and piece previews.
//!
//! Boards are stored bottom row first (`board[0]` is the floor), so drawing flips the y axis.

use crate::graphics::{Color, Renderer2d};
use crate::ui::Rect;

pub const COLOR_BACKGROUND: Color = [10, 10, 14, 255];
pub const COLOR_BOARD_OUTLINE: Color = [60, 60, 80, 255];
const COLOR_GRID_DOT: Color = [24, 24, 32, 255];
const COLOR_I: Color = [0, 229, 255, 255];
const COLOR_O: Color = [255, 215, 0, 255];
const COLOR_T: Color = [186, 85, 211, 255];
const COLOR_S: Color = [0, 200, 0, 255];
const COLOR_Z: Color = [220, 20, 60, 255];
const COLOR_J: Color = [30, 144, 255, 255];
const COLOR_L: Color = [255, 140, 0, 255];

pub fn color_for_cell(cell: u8) -> Color {
    match cell {
        0 => COLOR_BACKGROUND,
        1 => COLOR_I,
        2 => COLOR_O,
        3 => COLOR_T,
        4 => COLOR_S,
        5 => COLOR_Z,
        6 => COLOR_J,
        7 => COLOR_L,
        _ => [255, 255, 255, 255],
    }
}

/// Pixel rect of board cell (`x`, `y`) inside `area`, for a board `rows` tall.
pub fn cell_rect(area: Rect, cell_px: u32, rows: usize, x: usize, y: usize) -> Rect {
    let inverted_y = (rows as u32).saturating_sub(1).saturating_sub(y as u32);
    Rect::new(
        area.x + x as u32 * cell_px,
        area.y + inverted_y * cell_px,
        cell_px,
        cell_px,
    )
}

/// Draws a filled block with a darker 1px bevel so adjacent cells stay readable.
pub fn draw_block(gfx: &mut dyn Renderer2d, rect: Rect, color: Color) {
    gfx.fill_rect(rect, color);
    if rect.w > 4 && rect.h > 4 {
        let shade = [color[0] / 2, color[1] / 2, color[2] / 2, 255];
        gfx.rect_outline(rect, shade);
    }
}

/// Draws `board` into `area`, one `cell_px` square per cell, plus an outline outside the area.
pub fn draw_board(gfx: &mut dyn Renderer2d, board: &[Vec<u8>], area: Rect, cell_px: u32) {
    gfx.fill_rect(area, COLOR_BACKGROUND);
    gfx.rect_outline(area.outset(1), COLOR_BOARD_OUTLINE);

    let rows = board.len();
    let dot = (cell_px / 10).max(1);
    for (y, row) in board.iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            let rect = cell_rect(area, cell_px, rows, x, y);
            if cell == 0 {
                let dot_rect = Rect::new(
                    rect.x + (cell_px / 2).saturating_sub(dot / 2),
                    rect.y + (cell_px / 2).saturating_sub(dot / 2),
                    dot,
                    dot,
                );
                gfx.fill_rect(dot_rect, COLOR_GRID_DOT);
            } else {
                draw_block(gfx, rect, color_for_cell(cell));
            }
        }
    }
}

/// Translucent preview of where the active piece will land.
pub fn draw_ghost_cells(
    gfx: &mut dyn Renderer2d,
    cells: &[(i32, i32)],
    cell: u8,
    area: Rect,
    cell_px: u32,
    rows: usize,
) {
    let color = color_for_cell(cell);
    for &(x, y) in cells {
        if x < 0 || y < 0 || y as usize >= rows {
            continue;
        }
        let rect = cell_rect(area, cell_px, rows, x as usize, y as usize);
        gfx.blend_rect(rect, color, 60);
        gfx.rect_outline(rect, color);
    }
}
