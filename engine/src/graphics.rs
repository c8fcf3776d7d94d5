use crate::{surface::SurfaceSize, ui::Rect};

pub type Color = [u8; 4];

pub const DEFAULT_TEXT_SCALE: u32 = 2;
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

fn glyph_advance_x(scale: u32) -> u32 {
    (GLYPH_W + 1) * scale.max(1)
}

fn line_advance_y(scale: u32) -> u32 {
    (GLYPH_H + 1) * scale.max(1)
}

/// Pixel width of the longest line of `text` at `scale`, without the trailing gap.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.lines()
        .map(|line| {
            let chars = line.chars().count() as u32;
            (chars * glyph_advance_x(scale)).saturating_sub(scale.max(1))
        })
        .max()
        .unwrap_or(0)
}

pub fn text_height(text: &str, scale: u32) -> u32 {
    let lines = text.lines().count().max(1) as u32;
    (lines * line_advance_y(scale)).saturating_sub(scale.max(1))
}

/// Unified 2D drawing interface.
///
/// Screens draw through this trait only; the presenter decides where the pixels end up.
pub trait Renderer2d {
    fn begin_frame(&mut self, size: SurfaceSize);
    fn size(&self) -> SurfaceSize;

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Alpha-blended rect over existing content (alpha is applied to `color`'s RGB).
    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8);

    fn rect_outline(&mut self, rect: Rect, color: Color);
    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32);

    fn draw_text(&mut self, x: u32, y: u32, text: &str, color: Color) {
        self.draw_text_scaled(x, y, text, color, DEFAULT_TEXT_SCALE);
    }

    /// Draws `text` centered inside `rect`.
    fn draw_text_centered(&mut self, rect: Rect, text: &str, color: Color, scale: u32) {
        let w = text_width(text, scale);
        let h = text_height(text, scale);
        let x = rect.x.saturating_add(rect.w.saturating_sub(w) / 2);
        let y = rect.y.saturating_add(rect.h.saturating_sub(h) / 2);
        self.draw_text_scaled(x, y, text, color, scale);
    }

    fn clear(&mut self, color: Color) {
        let s = self.size();
        self.fill_rect(Rect::from_size(s.width, s.height), color);
    }
}

/// CPU renderer that draws into an RGBA frame buffer.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
}

/// Byte span of a rect after clipping it to the frame.
struct ClippedSpan {
    first_byte: usize,
    row_bytes: usize,
    rows: u32,
    stride: usize,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self { frame, size }
    }

    fn clip(&self, rect: Rect) -> Option<ClippedSpan> {
        let max_x = rect.x.saturating_add(rect.w).min(self.size.width);
        let max_y = rect.y.saturating_add(rect.h).min(self.size.height);
        if rect.x >= max_x || rect.y >= max_y {
            return None;
        }
        if self.frame.len() < self.size.rgba_len() {
            return None;
        }

        let stride = self.size.width as usize * 4;
        Some(ClippedSpan {
            first_byte: rect.y as usize * stride + rect.x as usize * 4,
            row_bytes: (max_x - rect.x) as usize * 4,
            rows: max_y - rect.y,
            stride,
        })
    }

    fn for_each_pixel(&mut self, rect: Rect, mut f: impl FnMut(&mut [u8])) {
        let Some(span) = self.clip(rect) else {
            return;
        };
        let mut row_start = span.first_byte;
        for _ in 0..span.rows {
            let row = &mut self.frame[row_start..row_start + span.row_bytes];
            for px in row.chunks_exact_mut(4) {
                f(px);
            }
            row_start += span.stride;
        }
    }
}

impl Renderer2d for CpuRenderer<'_> {
    fn begin_frame(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.for_each_pixel(rect, |px| px.copy_from_slice(&color));
    }

    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8) {
        match alpha {
            0 => return,
            255 => return self.fill_rect(rect, color),
            _ => {}
        }

        let a = alpha as u32;
        let inv = 255 - a;
        self.for_each_pixel(rect, |px| {
            for channel in 0..3 {
                let dst = px[channel] as u32;
                px[channel] = ((dst * inv + color[channel] as u32 * a + 127) / 255) as u8;
            }
            px[3] = 255;
        });
    }

    fn rect_outline(&mut self, rect: Rect, color: Color) {
        if rect.w == 0 || rect.h == 0 {
            return;
        }

        let x1 = rect.x.saturating_add(rect.w).min(self.size.width);
        let y1 = rect.y.saturating_add(rect.h).min(self.size.height);
        if rect.x >= x1 || rect.y >= y1 {
            return;
        }
        let w = x1 - rect.x;
        let h = y1 - rect.y;

        self.fill_rect(Rect::new(rect.x, rect.y, w, 1), color);
        self.fill_rect(Rect::new(rect.x, y1 - 1, w, 1), color);
        self.fill_rect(Rect::new(rect.x, rect.y, 1, h), color);
        self.fill_rect(Rect::new(x1 - 1, rect.y, 1, h), color);
    }

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32) {
        let scale = scale.max(1);
        let adv_x = glyph_advance_x(scale);
        let adv_y = line_advance_y(scale);

        let mut cursor_x = x;
        let mut cursor_y = y;
        for ch in text.chars() {
            if ch == '\n' {
                cursor_x = x;
                cursor_y = cursor_y.saturating_add(adv_y);
                continue;
            }
            if cursor_x >= self.size.width || cursor_y >= self.size.height {
                continue;
            }
            if ch != ' ' {
                self.draw_glyph(cursor_x, cursor_y, ch, color, scale);
            }
            cursor_x = cursor_x.saturating_add(adv_x);
        }
    }
}

impl CpuRenderer<'_> {
    fn draw_glyph(&mut self, x: u32, y: u32, ch: char, color: Color, scale: u32) {
        for (row, bits) in glyph_rows(ch).into_iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1u8 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let px = x.saturating_add(col * scale);
                let py = y.saturating_add(row as u32 * scale);
                self.fill_rect(Rect::new(px, py, scale, scale), color);
            }
        }
    }
}

fn glyph_rows(ch: char) -> [u8; GLYPH_H as usize] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],

        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],

        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],

        _ => [0b111, 0b001, 0b010, 0b000, 0b010],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &[u8], size: SurfaceSize, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * size.width + x) * 4) as usize;
        [frame[idx], frame[idx + 1], frame[idx + 2], frame[idx + 3]]
    }

    #[test]
    fn text_width_ignores_trailing_gap() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("A", 1), 3);
        assert_eq!(text_width("AB", 2), 14);
        assert_eq!(text_width("AB\nABCD", 1), 15);
    }

    #[test]
    fn fill_rect_is_clipped_to_frame() {
        let size = SurfaceSize::new(4, 4);
        let mut frame = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut frame, size);
        gfx.fill_rect(Rect::new(2, 2, 10, 10), [9, 8, 7, 255]);

        assert_eq!(pixel(&frame, size, 3, 3), [9, 8, 7, 255]);
        assert_eq!(pixel(&frame, size, 1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn blend_rect_mixes_with_existing_pixels() {
        let size = SurfaceSize::new(2, 2);
        let mut frame = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut frame, size);
        gfx.clear([0, 0, 0, 255]);
        gfx.blend_rect(Rect::from_size(2, 2), [255, 255, 255, 255], 128);

        let px = pixel(&frame, size, 0, 0);
        assert!((127..=129).contains(&px[0]), "unexpected blend result {px:?}");
        assert_eq!(px[3], 255);
    }
}
