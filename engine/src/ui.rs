//! Layout primitives and adaptive scaling.
//!
//! Screens are designed against a reference resolution and scaled with [`UiScale`], so the
//! same layout code works from small windows up to 4K surfaces.

use serde::{Deserialize, Serialize};

use crate::surface::SurfaceSize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_size(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    pub fn from_surface(size: SurfaceSize) -> Self {
        Self::from_size(size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Inner content area. Oversized insets saturate the size to 0.
    pub fn inset(&self, insets: Insets) -> Self {
        Self {
            x: self.x.saturating_add(insets.left),
            y: self.y.saturating_add(insets.top),
            w: self.w.saturating_sub(insets.left.saturating_add(insets.right)),
            h: self.h.saturating_sub(insets.top.saturating_add(insets.bottom)),
        }
    }

    /// Grows the rect by `amount` on every side, saturating at the origin.
    pub fn outset(&self, amount: u32) -> Self {
        let x = self.x.saturating_sub(amount);
        let y = self.y.saturating_sub(amount);
        Self {
            x,
            y,
            w: self.right().saturating_add(amount) - x,
            h: self.bottom().saturating_add(amount) - y,
        }
    }

    /// Places a child of `size` inside this rect. Oversized children are clamped to fit.
    pub fn place(&self, size: Size, anchor: Anchor) -> Self {
        let size = size.clamp_max(self.size());
        let slack_x = self.w - size.w;
        let slack_y = self.h - size.h;

        let x = self.x
            + match anchor.horizontal() {
                Align::Start => 0,
                Align::Center => slack_x / 2,
                Align::End => slack_x,
            };
        let y = self.y
            + match anchor.vertical() {
                Align::Start => 0,
                Align::Center => slack_y / 2,
                Align::End => slack_y,
            };

        Self::new(x, y, size.w, size.h)
    }

    /// Splits the rect into `count` equal-height rows separated by `gap`.
    pub fn rows(&self, count: u32, gap: u32) -> Vec<Rect> {
        if count == 0 {
            return Vec::new();
        }
        let gaps = gap.saturating_mul(count - 1);
        let row_h = self.h.saturating_sub(gaps) / count;
        (0..count)
            .map(|i| Rect::new(self.x, self.y + i * (row_h + gap), self.w, row_h))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn clamp_max(self, max: Size) -> Self {
        Self {
            w: self.w.min(max.w),
            h: self.h.min(max.h),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub fn all(v: u32) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Start,
    Center,
    End,
}

impl Anchor {
    fn horizontal(self) -> Align {
        match self {
            Anchor::TopLeft | Anchor::CenterLeft | Anchor::BottomLeft => Align::Start,
            Anchor::TopCenter | Anchor::Center | Anchor::BottomCenter => Align::Center,
            Anchor::TopRight | Anchor::CenterRight | Anchor::BottomRight => Align::End,
        }
    }

    fn vertical(self) -> Align {
        match self {
            Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => Align::Start,
            Anchor::CenterLeft | Anchor::Center | Anchor::CenterRight => Align::Center,
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => Align::End,
        }
    }
}

/// Reference resolution that layouts are authored against.
pub const REFERENCE_SIZE: SurfaceSize = SurfaceSize::new(1024, 768);
pub const MIN_UI_SCALE: f32 = 0.5;
pub const MAX_UI_SCALE: f32 = 3.0;

/// Uniform scale factor derived from the surface size and a user multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiScale {
    factor: f32,
}

impl UiScale {
    pub const ONE: UiScale = UiScale { factor: 1.0 };

    pub fn for_surface(size: SurfaceSize, user_factor: f32) -> Self {
        let fit_w = size.width as f32 / REFERENCE_SIZE.width as f32;
        let fit_h = size.height as f32 / REFERENCE_SIZE.height as f32;
        let user = if user_factor.is_finite() && user_factor > 0.0 {
            user_factor
        } else {
            1.0
        };
        let factor = (fit_w.min(fit_h) * user).clamp(MIN_UI_SCALE, MAX_UI_SCALE);
        Self { factor }
    }

    pub fn factor(self) -> f32 {
        self.factor
    }

    /// Scales a reference-resolution length; never returns 0 for a non-zero input.
    pub fn px(self, base: u32) -> u32 {
        if base == 0 {
            return 0;
        }
        ((base as f32 * self.factor).round() as u32).max(1)
    }

    pub fn size(self, w: u32, h: u32) -> Size {
        Size::new(self.px(w), self.px(h))
    }

    /// Integer text scale for the block font.
    pub fn text(self, base: u32) -> u32 {
        ((base as f32 * self.factor).floor() as u32).max(1)
    }
}

impl Default for UiScale {
    fn default() -> Self {
        Self::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_shrinks_rect_and_moves_origin() {
        let r = Rect::from_size(100, 80);
        assert_eq!(r.inset(Insets::all(10)), Rect::new(10, 10, 80, 60));
    }

    #[test]
    fn place_center_and_bottom_center() {
        let parent = Rect::from_size(100, 100);
        assert_eq!(
            parent.place(Size::new(20, 10), Anchor::Center),
            Rect::new(40, 45, 20, 10)
        );
        assert_eq!(
            parent.place(Size::new(20, 10), Anchor::BottomCenter),
            Rect::new(40, 90, 20, 10)
        );
    }

    #[test]
    fn place_clamps_size_to_parent() {
        let parent = Rect::from_size(50, 40);
        let child = parent.place(Size::new(999, 999), Anchor::TopLeft);
        assert_eq!(child, Rect::new(0, 0, 50, 40));
    }

    #[test]
    fn rows_split_evenly_with_gaps() {
        let rows = Rect::new(0, 10, 40, 100).rows(3, 5);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], Rect::new(0, 10, 40, 30));
        assert_eq!(rows[1], Rect::new(0, 45, 40, 30));
        assert_eq!(rows[2], Rect::new(0, 80, 40, 30));
    }

    #[test]
    fn ui_scale_follows_smaller_axis_and_clamps() {
        let scale = UiScale::for_surface(SurfaceSize::new(2048, 768), 1.0);
        assert_eq!(scale.factor(), 1.0);

        let scale = UiScale::for_surface(SurfaceSize::new(2048, 1536), 1.0);
        assert_eq!(scale.px(100), 200);

        let tiny = UiScale::for_surface(SurfaceSize::new(100, 100), 1.0);
        assert_eq!(tiny.factor(), MIN_UI_SCALE);

        let huge = UiScale::for_surface(SurfaceSize::new(8192, 8192), 2.0);
        assert_eq!(huge.factor(), MAX_UI_SCALE);
    }

    #[test]
    fn ui_scale_ignores_invalid_user_factor() {
        let scale = UiScale::for_surface(REFERENCE_SIZE, f32::NAN);
        assert_eq!(scale, UiScale::ONE);
        assert_eq!(scale.text(2), 2);
    }
}
