//! Frame drawing for every mode.
//!
//! Rendering only reads state. The one thing it hands back is the pause-menu layout it drew,
//! so pointer input can be resolved against what is actually on screen.

use engine::graphics::{Color, Renderer2d, text_width};
use engine::render::{
    COLOR_BACKGROUND, cell_rect, color_for_cell, draw_block, draw_board, draw_ghost_cells,
};
use engine::ui::{Anchor, Insets, Rect, Size, UiScale};

use crate::layout::{MenuPanelLayout, PauseMenuLayout, PlayfieldLayout};
use crate::mode::Mode;
use crate::pause_menu::{PauseItem, PauseMenu, StatusKind};
use crate::state::Session;
use crate::tetris_core::{BOARD_HEIGHT, MAX_START_LEVEL, MIN_START_LEVEL, Piece, piece_grid};

const COLOR_TEXT: Color = [235, 235, 245, 255];
const COLOR_TEXT_MUTED: Color = [150, 150, 170, 255];
const COLOR_PANEL_BG: Color = [16, 16, 22, 255];
const COLOR_PANEL_BORDER: Color = [40, 40, 55, 255];
const COLOR_MENU_BG: Color = [10, 10, 14, 255];
const COLOR_DIM: Color = [0, 0, 0, 255];
const COLOR_ERROR: Color = [255, 96, 96, 255];
const COLOR_OK: Color = [120, 220, 140, 255];
const DIM_ALPHA: u8 = 170;
const SELECTED_BRIGHTEN: f32 = 0.18;
const DISABLED_DIM: f32 = 0.55;

pub const GAME_TITLE: &str = "TETRIS ENHANCED";

/// Everything a frame needs, borrowed from the router.
pub struct FrameView<'a> {
    pub mode: Mode,
    pub session: &'a Session,
    pub pause_menu: Option<&'a PauseMenu>,
    pub start_level: u32,
    pub track_name: Option<String>,
    /// User multiplier on the automatic UI scale.
    pub ui_scale: f32,
}

/// Draws one frame. Returns the pause-menu layout when the pause menu is showing.
pub fn render_frame(gfx: &mut dyn Renderer2d, view: &FrameView<'_>) -> Option<PauseMenuLayout> {
    let size = gfx.size();
    let scale = UiScale::for_surface(size, view.ui_scale);
    gfx.clear(COLOR_BACKGROUND);

    match view.mode {
        Mode::MainMenu => {
            draw_main_menu(gfx, view, scale);
            None
        }
        Mode::Playing => {
            draw_playfield(gfx, view.session, scale);
            None
        }
        Mode::Paused => {
            draw_playfield(gfx, view.session, scale);
            let menu = view.pause_menu?;
            Some(draw_pause_menu(gfx, menu, scale))
        }
        Mode::GameOver => {
            draw_playfield(gfx, view.session, scale);
            draw_game_over(gfx, view.session, scale);
            None
        }
    }
}

pub fn draw_playfield(gfx: &mut dyn Renderer2d, session: &Session, scale: UiScale) {
    let layout = PlayfieldLayout::compute(gfx.size(), scale);
    if layout.board.w == 0 {
        return;
    }
    let core = &session.tetris;

    draw_board(gfx, core.board(), layout.board, layout.cell_px);
    if let Some(piece) = core.current_piece() {
        draw_ghost_cells(
            gfx,
            &core.ghost_cells(),
            piece.cell(),
            layout.board,
            layout.cell_px,
            BOARD_HEIGHT,
        );
        for (x, y) in core.active_cells() {
            if x < 0 || y < 0 || y as usize >= BOARD_HEIGHT {
                continue;
            }
            let rect = cell_rect(layout.board, layout.cell_px, BOARD_HEIGHT, x as usize, y as usize);
            draw_block(gfx, rect, color_for_cell(piece.cell()));
        }
    }

    let text = layout.text_scale;
    let header_h = text * 5 + scale.px(12);

    draw_panel(gfx, layout.hold_panel);
    let hold_inner = layout.hold_panel.inset(Insets::all(scale.px(12)));
    gfx.draw_text_scaled(hold_inner.x, hold_inner.y, "HOLD", COLOR_TEXT, text);
    draw_piece_preview(
        gfx,
        Rect::new(hold_inner.x, hold_inner.y + header_h, hold_inner.w, layout.preview_cell * 3),
        core.held_piece(),
        layout.preview_cell,
        core.can_hold(),
    );

    draw_panel(gfx, layout.next_panel);
    let next_inner = layout.next_panel.inset(Insets::all(scale.px(12)));
    gfx.draw_text_scaled(next_inner.x, next_inner.y, "NEXT", COLOR_TEXT, text);
    let slot_h = layout.preview_cell * 3;
    let mut y = next_inner.y + header_h;
    for &piece in core.next_queue() {
        if y + slot_h > next_inner.bottom() {
            break;
        }
        draw_piece_preview(
            gfx,
            Rect::new(next_inner.x, y, next_inner.w, slot_h),
            Some(piece),
            layout.preview_cell,
            true,
        );
        y += slot_h + scale.px(12);
    }

    if layout.stats_panel.h > 0 {
        draw_panel(gfx, layout.stats_panel);
        let stats = layout.stats_panel.inset(Insets::all(scale.px(12)));
        let line_h = text * 5 + scale.px(10);
        let lines = [
            ("SCORE", core.score().to_string()),
            ("LINES", core.lines_cleared().to_string()),
            ("LEVEL", core.level().to_string()),
            ("TIME", format_play_time(session)),
        ];
        for (i, (label, value)) in lines.iter().enumerate() {
            let y = stats.y + (i as u32 * 2) * line_h;
            if y + 2 * line_h > stats.bottom() {
                break;
            }
            gfx.draw_text_scaled(stats.x, y, label, COLOR_TEXT_MUTED, text);
            gfx.draw_text_scaled(stats.x, y + line_h, value, COLOR_TEXT, text);
        }
    }
}

fn format_play_time(session: &Session) -> String {
    let secs = session.play_time.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn draw_piece_preview(
    gfx: &mut dyn Renderer2d,
    area: Rect,
    piece: Option<Piece>,
    cell_px: u32,
    enabled: bool,
) {
    let Some(piece) = piece else {
        return;
    };
    let grid = piece_grid(piece, 0);
    let mut color = color_for_cell(piece.cell());
    if !enabled {
        color = dim_color(color, DISABLED_DIM);
    }

    // Only the occupied rows/columns are centered, so flat pieces do not sit high.
    let filled: Vec<(usize, usize)> = (0..grid.size())
        .flat_map(|gy| (0..grid.size()).map(move |gx| (gx, gy)))
        .filter(|&(gx, gy)| grid.cell(gx, gy) == 1)
        .collect();
    let Some(&(first_x, first_y)) = filled.first() else {
        return;
    };
    let (min_x, max_x, min_y, max_y) = filled.iter().fold(
        (first_x, first_x, first_y, first_y),
        |(min_x, max_x, min_y, max_y), &(x, y)| (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y)),
    );

    let w = (max_x - min_x + 1) as u32 * cell_px;
    let h = (max_y - min_y + 1) as u32 * cell_px;
    let origin = area.place(Size::new(w, h), Anchor::Center);
    for (gx, gy) in filled {
        let rect = Rect::new(
            origin.x + (gx - min_x) as u32 * cell_px,
            origin.y + (gy - min_y) as u32 * cell_px,
            cell_px,
            cell_px,
        );
        draw_block(gfx, rect, color);
    }
}

pub fn draw_pause_menu(gfx: &mut dyn Renderer2d, menu: &PauseMenu, scale: UiScale) -> PauseMenuLayout {
    let size = gfx.size();
    gfx.blend_rect(Rect::from_surface(size), COLOR_DIM, DIM_ALPHA);

    let layout = PauseMenuLayout::compute(size, scale, menu.is_confirming());
    if layout.panel.w == 0 {
        return layout;
    }

    draw_menu_panel(gfx, layout.panel);
    gfx.draw_text_centered(layout.title, "PAUSED", COLOR_TEXT, layout.title_scale);

    for item in PauseItem::ALL {
        let selected = !menu.is_confirming() && menu.selected() == item;
        draw_button(gfx, layout.button(item), item.label(), selected, layout.text_scale);
    }

    if let Some(status) = menu.status() {
        let color = match status.kind {
            StatusKind::Info => COLOR_OK,
            StatusKind::Error => COLOR_ERROR,
        };
        let text_scale = fit_text_scale(&status.text, layout.status.w, layout.text_scale);
        gfx.draw_text_centered(layout.status, &status.text, color, text_scale);
    } else {
        let hint = "ESC TO RESUME";
        let text_scale = fit_text_scale(hint, layout.status.w, layout.text_scale);
        gfx.draw_text_centered(layout.status, hint, COLOR_TEXT_MUTED, text_scale);
    }

    if let (Some(confirm), Some(state)) = (layout.confirm, menu.confirm()) {
        gfx.blend_rect(layout.panel, COLOR_DIM, DIM_ALPHA);
        draw_menu_panel(gfx, confirm.panel);
        let inner = confirm.panel.inset(Insets::all(scale.px(18)));
        let prompt = "QUIT THE GAME?";
        let text_scale = fit_text_scale(prompt, inner.w, layout.text_scale);
        gfx.draw_text_centered(
            Rect::new(inner.x, inner.y, inner.w, text_scale * 5),
            prompt,
            COLOR_TEXT,
            text_scale,
        );
        draw_button(gfx, confirm.yes_button, "YES", state.yes_selected, layout.text_scale);
        draw_button(gfx, confirm.no_button, "NO", !state.yes_selected, layout.text_scale);
    }

    layout
}

fn draw_main_menu(gfx: &mut dyn Renderer2d, view: &FrameView<'_>, scale: UiScale) {
    let layout = MenuPanelLayout::compute(gfx.size(), scale, (560, 380));
    if layout.panel.w == 0 {
        return;
    }
    draw_menu_panel(gfx, layout.panel);

    let title_scale = fit_text_scale(GAME_TITLE, layout.lines.w, layout.title_scale);
    let left = if view.start_level > MIN_START_LEVEL { "<" } else { " " };
    let right = if view.start_level < MAX_START_LEVEL { ">" } else { " " };
    let level = format!("START LEVEL {left} {} {right}", view.start_level);
    let track = match &view.track_name {
        Some(name) => format!("MUSIC: {}", name.to_uppercase()),
        None => "MUSIC: NONE".to_string(),
    };

    let mut lines = TextColumn::new(layout.lines, scale.px(14));
    lines.centered(gfx, GAME_TITLE, COLOR_TEXT, title_scale);
    lines.gap(scale.px(20));
    lines.centered(gfx, &level, COLOR_TEXT, layout.text_scale);
    lines.centered(gfx, &track, COLOR_TEXT_MUTED, layout.text_scale);
    lines.gap(scale.px(20));
    lines.centered(gfx, "ENTER: START", COLOR_TEXT, layout.text_scale);
    lines.centered(gfx, "LEFT/RIGHT: LEVEL", COLOR_TEXT_MUTED, layout.text_scale);
    lines.centered(gfx, "UP/DOWN: TRACK", COLOR_TEXT_MUTED, layout.text_scale);
    lines.centered(gfx, "ESC: QUIT", COLOR_TEXT_MUTED, layout.text_scale);
}

fn draw_game_over(gfx: &mut dyn Renderer2d, session: &Session, scale: UiScale) {
    let size = gfx.size();
    gfx.blend_rect(Rect::from_surface(size), COLOR_DIM, DIM_ALPHA);

    let layout = MenuPanelLayout::compute(size, scale, (420, 280));
    if layout.panel.w == 0 {
        return;
    }
    draw_menu_panel(gfx, layout.panel);

    let core = &session.tetris;
    let mut lines = TextColumn::new(layout.lines, scale.px(12));
    lines.centered(gfx, "GAME OVER", COLOR_TEXT, layout.title_scale);
    lines.gap(scale.px(16));
    lines.centered(gfx, &format!("SCORE {}", core.score()), COLOR_TEXT, layout.text_scale);
    lines.centered(
        gfx,
        &format!("LINES {}  LEVEL {}", core.lines_cleared(), core.level()),
        COLOR_TEXT_MUTED,
        layout.text_scale,
    );
    lines.gap(scale.px(16));
    lines.centered(gfx, "ENTER: PLAY AGAIN", COLOR_TEXT, layout.text_scale);
    lines.centered(gfx, "M: MAIN MENU", COLOR_TEXT_MUTED, layout.text_scale);
    lines.centered(gfx, "ESC: QUIT", COLOR_TEXT_MUTED, layout.text_scale);
}

/// Stacks centered text lines top to bottom inside a rect.
struct TextColumn {
    area: Rect,
    y: u32,
    line_gap: u32,
}

impl TextColumn {
    fn new(area: Rect, line_gap: u32) -> Self {
        Self {
            area,
            y: area.y,
            line_gap,
        }
    }

    fn gap(&mut self, px: u32) {
        self.y += px;
    }

    fn centered(&mut self, gfx: &mut dyn Renderer2d, text: &str, color: Color, scale: u32) {
        let h = scale * 5;
        if self.y + h > self.area.bottom() {
            return;
        }
        let scale = fit_text_scale(text, self.area.w, scale);
        gfx.draw_text_centered(Rect::new(self.area.x, self.y, self.area.w, h), text, color, scale);
        self.y += h + self.line_gap;
    }
}

/// Largest scale up to `preferred` at which `text` fits in `width`.
fn fit_text_scale(text: &str, width: u32, preferred: u32) -> u32 {
    let mut scale = preferred.max(1);
    while scale > 1 && text_width(text, scale) > width {
        scale -= 1;
    }
    scale
}

fn draw_panel(gfx: &mut dyn Renderer2d, rect: Rect) {
    gfx.fill_rect(rect, COLOR_PANEL_BG);
    gfx.rect_outline(rect, COLOR_PANEL_BORDER);
}

fn draw_menu_panel(gfx: &mut dyn Renderer2d, rect: Rect) {
    gfx.fill_rect(rect, COLOR_MENU_BG);
    gfx.rect_outline(rect, COLOR_PANEL_BORDER);
}

fn draw_button(gfx: &mut dyn Renderer2d, rect: Rect, label: &str, selected: bool, text_scale: u32) {
    let (fill, border) = if selected {
        (
            brighten_color(COLOR_PANEL_BG, SELECTED_BRIGHTEN),
            brighten_color(COLOR_PANEL_BORDER, SELECTED_BRIGHTEN * 3.0),
        )
    } else {
        (COLOR_PANEL_BG, COLOR_PANEL_BORDER)
    };
    gfx.fill_rect(rect, fill);
    gfx.rect_outline(rect, border);
    let scale = fit_text_scale(label, rect.w.saturating_sub(8), text_scale);
    gfx.draw_text_centered(rect, label, COLOR_TEXT, scale);
}

fn dim_color(mut c: Color, factor: f32) -> Color {
    let f = factor.clamp(0.0, 1.0);
    for channel in c.iter_mut().take(3) {
        *channel = (*channel as f32 * f) as u8;
    }
    c
}

fn brighten_color(mut c: Color, amount: f32) -> Color {
    let t = amount.clamp(0.0, 1.0);
    for channel in c.iter_mut().take(3) {
        let v = *channel as f32;
        *channel = (v + (255.0 - v) * t).round().clamp(0.0, 255.0) as u8;
    }
    c
}
