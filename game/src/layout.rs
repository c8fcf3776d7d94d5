//! Screen geometry for every mode, derived from the surface size and [`UiScale`].
//!
//! Layouts are plain data so the renderer and pointer hit-testing agree on where things are.

use engine::surface::SurfaceSize;
use engine::ui::{Anchor, Insets, Rect, Size, UiScale};

use crate::pause_menu::PauseItem;
use crate::tetris_core::{BOARD_HEIGHT, BOARD_WIDTH, NEXT_QUEUE_LEN};

const BASE_CELL: u32 = 30;
const BASE_MARGIN: u32 = 24;
const BASE_GAP: u32 = 16;
const BASE_PAD: u32 = 12;
const BASE_PREVIEW_CELL: u32 = 14;
const BASE_SIDE_W: u32 = 200;

const BASE_PANEL_W: u32 = 360;
const BASE_PANEL_PAD: u32 = 18;
const BASE_BUTTON: (u32, u32) = (240, 44);
const BASE_BUTTON_GAP: u32 = 10;
const BASE_HEADER_H: u32 = 44;
const BASE_STATUS_H: u32 = 26;

/// Text scale for panel headers and button labels at 1x UI scale.
pub const BASE_TEXT: u32 = 2;
pub const BASE_TITLE_TEXT: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayfieldLayout {
    pub board: Rect,
    pub cell_px: u32,
    pub hold_panel: Rect,
    pub next_panel: Rect,
    pub stats_panel: Rect,
    pub preview_cell: u32,
    pub text_scale: u32,
}

impl PlayfieldLayout {
    pub fn compute(size: SurfaceSize, scale: UiScale) -> Self {
        let screen = Rect::from_surface(size);
        let safe = screen.inset(Insets::all(scale.px(BASE_MARGIN)));
        if safe.w == 0 || safe.h == 0 {
            return Self::default();
        }

        let gap = scale.px(BASE_GAP);
        let pad = scale.px(BASE_PAD);
        let side_w = scale.px(BASE_SIDE_W);
        let fit_h = safe.h / BOARD_HEIGHT as u32;
        let fit_w = safe.w.saturating_sub(2 * (side_w + gap)) / BOARD_WIDTH as u32;
        let cell_px = scale.px(BASE_CELL).min(fit_h).min(fit_w).max(1);

        let board_size = Size::new(
            cell_px * BOARD_WIDTH as u32,
            cell_px * BOARD_HEIGHT as u32,
        );
        let board = safe.place(board_size, Anchor::Center);

        let preview_cell = scale.px(BASE_PREVIEW_CELL).min(cell_px);
        let text_scale = scale.text(BASE_TEXT);
        let header_h = text_scale * 5 + pad;
        let preview_h = preview_cell * 3;

        let hold_panel = Rect::new(
            board.x.saturating_sub(gap + side_w),
            board.y,
            side_w,
            header_h + preview_h + pad * 2,
        );

        let next_h = header_h + (preview_h + pad) * NEXT_QUEUE_LEN as u32 + pad;
        let next_panel = Rect::new(
            board.right() + gap,
            board.y,
            side_w,
            next_h.min(board.h),
        );

        let stats_y = hold_panel.bottom() + gap;
        let stats_panel = Rect::new(
            hold_panel.x,
            stats_y,
            side_w,
            board.bottom().saturating_sub(stats_y),
        );

        Self {
            board,
            cell_px,
            hold_panel,
            next_panel,
            stats_panel,
            preview_cell,
            text_scale,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmLayout {
    pub panel: Rect,
    pub yes_button: Rect,
    pub no_button: Rect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseMenuLayout {
    pub panel: Rect,
    pub title: Rect,
    pub buttons: [Rect; PauseItem::COUNT],
    pub status: Rect,
    pub text_scale: u32,
    pub title_scale: u32,
    pub confirm: Option<ConfirmLayout>,
}

impl PauseMenuLayout {
    pub fn compute(size: SurfaceSize, scale: UiScale, confirming: bool) -> Self {
        let screen = Rect::from_surface(size);
        let safe = screen.inset(Insets::all(scale.px(BASE_MARGIN)));
        if safe.w == 0 || safe.h == 0 {
            return Self::default();
        }

        let pad = scale.px(BASE_PANEL_PAD);
        let gap = scale.px(BASE_BUTTON_GAP);
        let header_h = scale.px(BASE_HEADER_H);
        let status_h = scale.px(BASE_STATUS_H);
        let button = scale.size(BASE_BUTTON.0, BASE_BUTTON.1);
        let count = PauseItem::COUNT as u32;
        let stack_h = button.h * count + gap * (count - 1);

        let panel_size = Size::new(
            scale.px(BASE_PANEL_W),
            pad * 2 + header_h + stack_h + gap + status_h,
        )
        .clamp_max(safe.size());
        let panel = safe.place(panel_size, Anchor::Center);
        let content = panel.inset(Insets::all(pad));

        let title = Rect::new(content.x, content.y, content.w, header_h.min(content.h));
        let stack = Rect::new(
            content.x,
            content.y + title.h,
            content.w,
            stack_h.min(content.h.saturating_sub(title.h)),
        )
        .place(Size::new(button.w, stack_h), Anchor::TopCenter);

        let mut buttons = [Rect::default(); PauseItem::COUNT];
        for (slot, rect) in buttons.iter_mut().zip(stack.rows(count, gap)) {
            *slot = rect;
        }

        let status_y = stack.bottom() + gap;
        let status = Rect::new(
            content.x,
            status_y,
            content.w,
            content.bottom().saturating_sub(status_y),
        );

        let confirm = confirming.then(|| ConfirmLayout::compute(panel, scale));

        Self {
            panel,
            title,
            buttons,
            status,
            text_scale: scale.text(BASE_TEXT),
            title_scale: scale.text(BASE_TITLE_TEXT),
            confirm,
        }
    }

    pub fn button(&self, item: PauseItem) -> Rect {
        self.buttons[item.index()]
    }

    pub fn item_at(&self, x: u32, y: u32) -> Option<PauseItem> {
        PauseItem::ALL
            .into_iter()
            .find(|item| self.button(*item).contains(x, y))
    }
}

impl ConfirmLayout {
    fn compute(over: Rect, scale: UiScale) -> Self {
        let pad = scale.px(BASE_PANEL_PAD);
        let gap = scale.px(BASE_BUTTON_GAP);
        let button = scale.size(BASE_BUTTON.0 / 2, BASE_BUTTON.1);
        let panel_size = Size::new(
            button.w * 2 + gap + pad * 2,
            scale.px(BASE_HEADER_H) + button.h + pad * 2,
        );
        let panel = over.place(panel_size, Anchor::Center);
        let content = panel.inset(Insets::all(pad));
        let row = content.place(Size::new(button.w * 2 + gap, button.h), Anchor::BottomCenter);
        let yes_button = row.place(button, Anchor::CenterLeft);
        let no_button = row.place(button, Anchor::CenterRight);
        Self {
            panel,
            yes_button,
            no_button,
        }
    }
}

/// Centered panel shared by the main menu and game-over screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuPanelLayout {
    pub panel: Rect,
    pub lines: Rect,
    pub text_scale: u32,
    pub title_scale: u32,
}

impl MenuPanelLayout {
    pub fn compute(size: SurfaceSize, scale: UiScale, base: (u32, u32)) -> Self {
        let screen = Rect::from_surface(size);
        let safe = screen.inset(Insets::all(scale.px(BASE_MARGIN)));
        if safe.w == 0 || safe.h == 0 {
            return Self::default();
        }
        let panel = safe.place(scale.size(base.0, base.1), Anchor::Center);
        let lines = panel.inset(Insets::all(scale.px(BASE_PANEL_PAD)));
        Self {
            panel,
            lines,
            text_scale: scale.text(BASE_TEXT),
            title_scale: scale.text(BASE_TITLE_TEXT + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF: SurfaceSize = SurfaceSize::new(1024, 768);

    #[test]
    fn playfield_fits_inside_the_surface() {
        for (w, h) in [(1024, 768), (640, 480), (1920, 1080), (3840, 2160)] {
            let size = SurfaceSize::new(w, h);
            let layout = PlayfieldLayout::compute(size, UiScale::for_surface(size, 1.0));
            assert!(layout.board.right() <= w && layout.board.bottom() <= h, "{w}x{h}");
            assert!(layout.next_panel.right() <= w, "{w}x{h}");
            assert_eq!(layout.board.w, layout.cell_px * BOARD_WIDTH as u32);
        }
    }

    #[test]
    fn playfield_grows_with_scale() {
        let small = PlayfieldLayout::compute(REF, UiScale::ONE);
        let big_size = SurfaceSize::new(2048, 1536);
        let big = PlayfieldLayout::compute(big_size, UiScale::for_surface(big_size, 1.0));
        assert!(big.cell_px > small.cell_px);
    }

    #[test]
    fn pause_buttons_are_stacked_and_hit_testable() {
        let layout = PauseMenuLayout::compute(REF, UiScale::ONE, false);
        for pair in layout.buttons.windows(2) {
            assert!(pair[0].bottom() <= pair[1].y);
        }
        for item in PauseItem::ALL {
            let rect = layout.button(item);
            assert_eq!(layout.item_at(rect.x + 1, rect.y + 1), Some(item));
        }
        assert_eq!(layout.item_at(0, 0), None);
        assert!(layout.confirm.is_none());
    }

    #[test]
    fn confirm_buttons_sit_inside_the_pause_panel() {
        let layout = PauseMenuLayout::compute(REF, UiScale::ONE, true);
        let confirm = layout.confirm.expect("confirm layout");
        assert!(confirm.yes_button.x < confirm.no_button.x);
        assert!(confirm.panel.x >= layout.panel.x && confirm.panel.right() <= layout.panel.right());
    }

    #[test]
    fn degenerate_surface_yields_empty_layouts() {
        let tiny = SurfaceSize::new(10, 10);
        assert_eq!(
            PauseMenuLayout::compute(tiny, UiScale::ONE, false),
            PauseMenuLayout::default()
        );
        assert_eq!(
            PlayfieldLayout::compute(tiny, UiScale::ONE),
            PlayfieldLayout::default()
        );
    }
}
