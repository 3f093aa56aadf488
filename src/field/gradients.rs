// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::canvas::Canvas;
use crate::field::{jitter, uniform};
use crate::palette::Palette;

pub const DEFAULT_COUNT: usize = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct GradientArea {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub opacity: f32,
    pub vx: f32,
    pub vy: f32,
}

/// Large soft glows drifting across the background. Purely visual; the
/// pointer does not touch them.
pub struct GradientField {
    areas: Vec<GradientArea>,
}

impl GradientField {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32, count: usize) -> Self {
        let span = width.max(height);
        let areas = (0..count)
            .map(|_| GradientArea {
                x: uniform(rng, 0.0, width),
                y: uniform(rng, 0.0, height),
                radius: uniform(rng, span * 0.25, span * 0.55),
                opacity: uniform(rng, 0.06, 0.14),
                vx: jitter(rng, 0.1),
                vy: jitter(rng, 0.1),
            })
            .collect();
        Self { areas }
    }

    #[cfg(test)]
    pub(crate) fn from_areas(areas: Vec<GradientArea>) -> Self {
        Self { areas }
    }

    #[cfg(test)]
    pub fn areas(&self) -> &[GradientArea] {
        &self.areas
    }

    pub fn update(&mut self, width: f32, height: f32) {
        for a in &mut self.areas {
            a.x += a.vx;
            a.y += a.vy;

            if a.x < -a.radius {
                a.x = width + a.radius;
            } else if a.x > width + a.radius {
                a.x = -a.radius;
            }
            if a.y < -a.radius {
                a.y = height + a.radius;
            } else if a.y > height + a.radius {
                a.y = -a.radius;
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, palette: &Palette) {
        if palette.gradients.is_empty() {
            return;
        }
        for (i, a) in self.areas.iter().enumerate() {
            let color = palette.gradients[i % palette.gradients.len()];
            canvas.radial(a.x, a.y, a.radius, color, a.opacity * palette.ink);
        }
    }
}
