// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::{term_color, Rgb};
use crate::runtime::ColorMode;
use crate::surface::Surface;

/// Mono terminals cannot fade; anything fainter than this is left out.
const MONO_INK_THRESHOLD: f32 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Ink {
    ch: char,
    rgb: [f32; 3],
    alpha: f32,
    bold: bool,
}

/// The single drawing target shared by every layer. Each cell accumulates a
/// background colour and keeps at most one glyph: the last one drawn into it
/// this frame, so layers painted later cover earlier ones.
pub struct Canvas {
    surface: Surface,
    bg: Vec<[f32; 3]>,
    ink: Vec<Option<Ink>>,
}

fn blend(dst: &mut [f32; 3], src: [f32; 3], alpha: f32) {
    let a = alpha.clamp(0.0, 1.0);
    if a <= 0.0 || !a.is_finite() {
        return;
    }
    for (d, s) in dst.iter_mut().zip(src) {
        *d += (s - *d) * a;
    }
}

impl Canvas {
    pub fn new(surface: Surface) -> Self {
        let len = surface.cols() as usize * surface.rows() as usize;
        Self {
            surface,
            bg: vec![[0.0; 3]; len],
            ink: vec![None; len],
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    fn idx(&self, col: u16, row: u16) -> usize {
        row as usize * self.surface.cols() as usize + col as usize
    }

    pub fn clear(&mut self) {
        self.bg.fill([0.0; 3]);
        self.ink.fill(None);
    }

    pub fn fill(&mut self, rgb: Rgb) {
        self.bg.fill(rgb.to_f32());
    }

    /// Darkens (or tints) cells toward the edges, leaving the centre third
    /// untouched.
    pub fn vignette(&mut self, rgb: Rgb, strength: f32) {
        let cols = self.surface.cols();
        let rows = self.surface.rows();
        let (w, h) = (self.surface.width(), self.surface.height());
        let src = rgb.to_f32();
        for row in 0..rows {
            for col in 0..cols {
                let (cx, cy) = self.surface.cell_center(col, row);
                let nx = (cx / w) * 2.0 - 1.0;
                let ny = (cy / h) * 2.0 - 1.0;
                let d = ((nx * nx + ny * ny) / 2.0).sqrt();
                let t = ((d - 0.35) / 0.65).clamp(0.0, 1.0);
                let t = t * t * (3.0 - 2.0 * t);
                let i = self.idx(col, row);
                blend(&mut self.bg[i], src, t * strength);
            }
        }
    }

    /// Soft radial light: `alpha` at the centre fading linearly to nothing at
    /// `radius`.
    pub fn radial(&mut self, x: f32, y: f32, radius: f32, rgb: Rgb, alpha: f32) {
        if !(radius > 0.0) || alpha <= 0.0 {
            return;
        }
        let m = self.surface.metrics();
        let col0 = ((x - radius) / m.width).floor().max(0.0) as i64;
        let row0 = ((y - radius) / m.height).floor().max(0.0) as i64;
        let col1 = (((x + radius) / m.width).ceil() as i64).min(self.surface.cols() as i64 - 1);
        let row1 = (((y + radius) / m.height).ceil() as i64).min(self.surface.rows() as i64 - 1);
        if col1 < col0 || row1 < row0 {
            return;
        }

        let src = rgb.to_f32();
        for row in row0..=row1 {
            for col in col0..=col1 {
                let (cx, cy) = self.surface.cell_center(col as u16, row as u16);
                let d = ((cx - x).powi(2) + (cy - y).powi(2)).sqrt();
                if d >= radius {
                    continue;
                }
                let i = self.idx(col as u16, row as u16);
                blend(&mut self.bg[i], src, alpha * (1.0 - d / radius));
            }
        }
    }

    pub fn speck(&mut self, x: f32, y: f32, rgb: Rgb, alpha: f32) {
        if let Some((col, row)) = self.surface.cell_of(x, y) {
            let i = self.idx(col, row);
            blend(&mut self.bg[i], rgb.to_f32(), alpha);
        }
    }

    /// A particle: a dot glyph sized by `size`, with a halo of `blur` pixels.
    pub fn dot(&mut self, x: f32, y: f32, size: f32, rgb: Rgb, alpha: f32, blur: f32) {
        if blur > 0.0 {
            self.radial(x, y, size + blur, rgb, alpha * 0.35);
        }
        let ch = if size < 1.0 {
            '·'
        } else if size < 2.0 {
            '•'
        } else {
            '●'
        };
        self.glyph(x, y, ch, rgb, alpha, false);
    }

    /// Lays `text` out left to right starting at the cell holding `(x, y)`.
    pub fn text(&mut self, x: f32, y: f32, text: &str, rgb: Rgb, alpha: f32, bold: bool) {
        let Some((col, row)) = self.surface.cell_of(x, y) else {
            return;
        };
        for (i, ch) in text.chars().enumerate() {
            let c = col as usize + i;
            if c >= self.surface.cols() as usize {
                break;
            }
            if ch != ' ' {
                self.put_char(c as u16, row, ch, rgb, alpha, bold);
            }
        }
    }

    pub fn glyph(&mut self, x: f32, y: f32, ch: char, rgb: Rgb, alpha: f32, bold: bool) {
        if let Some((col, row)) = self.surface.cell_of(x, y) {
            self.put_char(col, row, ch, rgb, alpha, bold);
        }
    }

    fn put_char(&mut self, col: u16, row: u16, ch: char, rgb: Rgb, alpha: f32, bold: bool) {
        self.put_ink(
            col,
            row,
            Ink {
                ch,
                rgb: rgb.to_f32(),
                alpha,
                bold,
            },
        );
    }

    fn put_ink(&mut self, col: u16, row: u16, ink: Ink) {
        if !(ink.alpha > 0.0) {
            return;
        }
        let i = self.idx(col, row);
        self.ink[i] = Some(ink);
    }

    #[cfg(test)]
    pub(crate) fn ink_at(&self, col: u16, row: u16) -> Option<(char, f32, bool)> {
        self.ink[self.idx(col, row)].map(|k| (k.ch, k.alpha, k.bold))
    }

    #[cfg(test)]
    pub(crate) fn bg_at(&self, col: u16, row: u16) -> Rgb {
        Rgb::from_f32(self.bg[self.idx(col, row)])
    }

    /// Composites every cell onto `frame`. Glyph colours are blended over the
    /// cell background by their alpha, the way a canvas would paint them.
    pub fn present(&self, frame: &mut Frame, mode: ColorMode) {
        for row in 0..self.surface.rows() {
            for col in 0..self.surface.cols() {
                let i = self.idx(col, row);
                let bg = self.bg[i];
                let cell = match self.ink[i] {
                    Some(ink) if mode != ColorMode::Mono || ink.alpha >= MONO_INK_THRESHOLD => {
                        let mut fg = bg;
                        blend(&mut fg, ink.rgb, ink.alpha);
                        Cell::glyph(
                            ink.ch,
                            term_color(Rgb::from_f32(fg), mode),
                            term_color(Rgb::from_f32(bg), mode),
                            ink.bold,
                        )
                    }
                    _ => Cell::blank_with_bg(term_color(Rgb::from_f32(bg), mode)),
                };
                frame.set(col, row, cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CellMetrics;

    fn canvas(cols: u16, rows: u16) -> Canvas {
        Canvas::new(Surface::from_cells(cols, rows, CellMetrics::default()).unwrap())
    }

    #[test]
    fn last_drawn_ink_wins_a_cell() {
        let mut c = canvas(4, 2);
        let white = Rgb::new(255, 255, 255);
        c.text(0.0, 0.0, "a", white, 0.5, false);
        c.text(0.0, 0.0, "b", white, 0.2, false);
        assert_eq!(c.ink_at(0, 0), Some(('b', 0.2, false)));
        c.text(0.0, 0.0, "c", white, 0.9, true);
        assert_eq!(c.ink_at(0, 0), Some(('c', 0.9, true)));
    }

    #[test]
    fn invisible_ink_does_not_cover_a_cell() {
        let mut c = canvas(2, 1);
        let white = Rgb::new(255, 255, 255);
        c.glyph(0.0, 0.0, '1', white, 0.3, false);
        c.glyph(0.0, 0.0, '0', white, 0.0, false);
        c.glyph(0.0, 0.0, '0', white, f32::NAN, false);
        assert_eq!(c.ink_at(0, 0).map(|k| k.0), Some('1'));
    }

    #[test]
    fn text_is_clipped_at_the_right_edge() {
        let mut c = canvas(3, 1);
        c.text(8.0, 0.0, "<div>", Rgb::new(1, 2, 3), 1.0, false);
        assert_eq!(c.ink_at(1, 0).map(|k| k.0), Some('<'));
        assert_eq!(c.ink_at(2, 0).map(|k| k.0), Some('d'));
    }

    #[test]
    fn radial_is_strongest_at_its_centre() {
        let mut c = canvas(20, 10);
        c.fill(Rgb::new(0, 0, 0));
        c.radial(80.0, 80.0, 60.0, Rgb::new(200, 200, 200), 0.5);
        let centre = c.bg_at(10, 5).r;
        let off = c.bg_at(13, 5).r;
        assert!(centre > off, "centre {centre} off {off}");
        assert_eq!(c.bg_at(0, 0).r, 0);
    }

    #[test]
    fn present_writes_every_cell() {
        let mut c = canvas(4, 3);
        c.fill(Rgb::new(10, 10, 10));
        c.dot(4.0, 8.0, 1.5, Rgb::new(250, 250, 250), 1.0, 0.0);
        let mut f = Frame::new(4, 3, None);
        c.present(&mut f, ColorMode::TrueColor);
        assert_eq!(f.get(0, 0).unwrap().ch, '•');
        assert_eq!(
            f.get(3, 2).unwrap().bg,
            Some(crossterm::style::Color::Rgb {
                r: 10,
                g: 10,
                b: 10
            })
        );
    }

    #[test]
    fn mono_drops_faint_ink() {
        let mut c = canvas(2, 1);
        c.text(0.0, 0.0, "ab", Rgb::new(255, 255, 255), 0.1, false);
        let mut f = Frame::new(2, 1, None);
        c.present(&mut f, ColorMode::Mono);
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }
}
