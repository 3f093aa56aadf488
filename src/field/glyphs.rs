// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::canvas::Canvas;
use crate::field::particles::pick_color;
use crate::field::{jitter, uniform, wrap};
use crate::palette::{Palette, Rgb};
use crate::pointer::PointerSample;
use crate::vocab::pick;

pub const DEFAULT_COUNT: usize = 80;
pub const FRICTION: f32 = 0.98;
pub const REPEL_RADIUS: f32 = 150.0;
pub const REPEL_STRENGTH: f32 = 0.8;
pub const MAX_SPEED: f32 = 2.0;
/// Opacity multiplier while the pointer is close.
pub const HOVER_BOOST: f32 = 4.0;

/// Keeps slow glyphs moving: below `threshold` speed, each frame has a
/// `chance` of a fresh random heading at `min_speed`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdleReseed {
    pub threshold: f32,
    pub chance: f64,
    pub min_speed: f32,
}

impl Default for IdleReseed {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            chance: 0.05,
            min_speed: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CodeGlyph {
    pub x: f32,
    pub y: f32,
    pub text: &'static str,
    pub font_size: f32,
    pub opacity: f32,
    pub color: Rgb,
    pub vx: f32,
    pub vy: f32,
}

impl CodeGlyph {
    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// Opacity this glyph is painted with for the given pointer sample.
    pub fn render_opacity(&self, pointer: &PointerSample) -> f32 {
        if pointer.within(self.x, self.y, REPEL_RADIUS).is_some() {
            self.opacity * HOVER_BOOST
        } else {
            self.opacity
        }
    }
}

pub struct GlyphField {
    glyphs: Vec<CodeGlyph>,
    reseed: IdleReseed,
}

impl GlyphField {
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        palette: &Palette,
        tokens: &[&'static str],
        count: usize,
    ) -> Self {
        let glyphs = (0..count)
            .map(|_| CodeGlyph {
                x: uniform(rng, 0.0, width),
                y: uniform(rng, 0.0, height),
                text: pick(rng, tokens),
                font_size: uniform(rng, 10.0, 16.0),
                opacity: uniform(rng, 0.06, 0.16),
                color: pick_color(rng, &palette.glyphs),
                vx: jitter(rng, 0.15),
                vy: jitter(rng, 0.15),
            })
            .collect();
        Self {
            glyphs,
            reseed: IdleReseed::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_glyphs(glyphs: Vec<CodeGlyph>) -> Self {
        Self {
            glyphs,
            reseed: IdleReseed::default(),
        }
    }

    #[cfg(test)]
    pub fn glyphs(&self) -> &[CodeGlyph] {
        &self.glyphs
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        width: f32,
        height: f32,
        pointer: &PointerSample,
    ) {
        let reseed = self.reseed;
        for g in &mut self.glyphs {
            g.x = wrap(g.x + g.vx, width);
            g.y = wrap(g.y + g.vy, height);
            g.vx *= FRICTION;
            g.vy *= FRICTION;

            if let Some((dx, dy, dist)) = pointer.within(g.x, g.y, REPEL_RADIUS) {
                if dist > 0.0 {
                    let force = (1.0 - dist / REPEL_RADIUS) * REPEL_STRENGTH;
                    g.vx += dx / dist * force;
                    g.vy += dy / dist * force;
                }
                let speed = g.speed();
                if speed > MAX_SPEED {
                    g.vx = g.vx / speed * MAX_SPEED;
                    g.vy = g.vy / speed * MAX_SPEED;
                }
            } else if g.speed() < reseed.threshold && rng.random_bool(reseed.chance) {
                let angle = uniform(rng, 0.0, std::f32::consts::TAU);
                g.vx = angle.cos() * reseed.min_speed;
                g.vy = angle.sin() * reseed.min_speed;
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, palette: &Palette, pointer: &PointerSample) {
        for g in &self.glyphs {
            let hovered = pointer.within(g.x, g.y, REPEL_RADIUS).is_some();
            let alpha = (g.render_opacity(pointer) * palette.ink).min(1.0);
            // larger fonts read as heavier strokes on a cell grid
            let bold = hovered || g.font_size >= 15.0;
            canvas.text(g.x, g.y, g.text, g.color, alpha, bold);
        }
    }
}
