// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::canvas::Canvas;
use crate::field::{jitter, uniform, wrap};
use crate::palette::{Palette, Rgb};
use crate::pointer::PointerSample;

pub const DEFAULT_COUNT: usize = 120;
pub const REPEL_RADIUS: f32 = 100.0;
/// Displacement at distance zero, in pixels per frame.
pub const REPEL_PUSH: f32 = 3.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub vx: f32,
    pub vy: f32,
    pub opacity: f32,
    pub color: Rgb,
    pub blur: f32,
}

/// Fixed pool of drifting dots. The pool never grows or shrinks after `new`.
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        palette: &Palette,
        count: usize,
    ) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                x: uniform(rng, 0.0, width),
                y: uniform(rng, 0.0, height),
                size: uniform(rng, 0.5, 2.5),
                vx: jitter(rng, 0.25),
                vy: jitter(rng, 0.25),
                opacity: uniform(rng, 0.15, 0.6),
                color: pick_color(rng, &palette.particles),
                blur: uniform(rng, 0.0, 6.0),
            })
            .collect();
        Self { particles }
    }

    #[cfg(test)]
    pub(crate) fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    #[cfg(test)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn update(&mut self, width: f32, height: f32, pointer: &PointerSample) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;

            if let Some((dx, dy, dist)) = pointer.within(p.x, p.y, REPEL_RADIUS) {
                // closer means stronger; at distance zero there is no direction
                let force = (REPEL_RADIUS - dist) / REPEL_RADIUS;
                if dist > 0.0 {
                    p.x += dx / dist * force * REPEL_PUSH;
                    p.y += dy / dist * force * REPEL_PUSH;
                }
            }

            p.x = wrap(p.x, width);
            p.y = wrap(p.y, height);
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, palette: &Palette, pointer: &PointerSample) {
        for p in &self.particles {
            let alpha = (p.opacity * palette.ink).min(1.0);
            if pointer.within(p.x, p.y, REPEL_RADIUS).is_some() {
                canvas.dot(p.x, p.y, p.size * 1.5, p.color, (alpha * 1.8).min(1.0), p.blur * 3.0 + 8.0);
            } else {
                canvas.dot(p.x, p.y, p.size, p.color, alpha, p.blur);
            }
        }
    }
}

pub(crate) fn pick_color<R: Rng + ?Sized>(rng: &mut R, colors: &[Rgb]) -> Rgb {
    if colors.is_empty() {
        return Rgb::new(255, 255, 255);
    }
    colors[rng.random_range(0..colors.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    use crate::runtime::Theme;
    use crate::surface::{CellMetrics, Surface};

    fn still(x: f32, y: f32, vx: f32, vy: f32) -> Particle {
        Particle {
            x,
            y,
            size: 1.0,
            vx,
            vy,
            opacity: 0.5,
            color: Rgb::new(255, 255, 255),
            blur: 0.0,
        }
    }

    #[test]
    fn particle_crossing_the_right_edge_wraps_to_the_left() {
        let mut field = ParticleField::from_particles(vec![still(790.0, 300.0, 15.0, 0.0)]);
        field.update(800.0, 600.0, &PointerSample::IDLE);
        let p = &field.particles()[0];
        assert!((0.0..10.0).contains(&p.x), "x = {}", p.x);
        assert_eq!(p.y, 300.0);
    }

    #[test]
    fn active_pointer_pushes_nearby_particles_away() {
        let pointer = PointerSample {
            x: 400.0,
            y: 300.0,
            active: true,
        };
        let mut field = ParticleField::from_particles(vec![
            still(420.0, 300.0, 0.0, 0.0),
            still(600.0, 300.0, 0.0, 0.0),
        ]);
        field.update(800.0, 600.0, &pointer);
        assert!(field.particles()[0].x > 420.0);
        assert_eq!(field.particles()[1].x, 600.0);
    }

    #[test]
    fn particle_on_the_pointer_is_not_displaced() {
        let pointer = PointerSample {
            x: 400.0,
            y: 300.0,
            active: true,
        };
        let mut field = ParticleField::from_particles(vec![still(400.0, 300.0, 0.0, 0.0)]);
        field.update(800.0, 600.0, &pointer);
        assert_eq!(field.particles()[0].x, 400.0);
        assert!(field.particles()[0].y.is_finite());
    }

    #[test]
    fn inactive_pointer_has_no_effect() {
        let pointer = PointerSample {
            x: 420.0,
            y: 300.0,
            active: false,
        };
        let mut field = ParticleField::from_particles(vec![still(400.0, 300.0, 0.0, 0.0)]);
        field.update(800.0, 600.0, &pointer);
        assert_eq!(field.particles()[0].x, 400.0);
    }

    #[test]
    fn hovered_particles_glow_wider_and_brighter() {
        let palette = Palette::for_theme(Theme::Dark);
        let field = ParticleField::from_particles(vec![still(400.0, 300.0, 0.0, 0.0)]);
        let surface = Surface::from_cells(100, 40, CellMetrics::default()).unwrap();
        let black = Rgb::new(0, 0, 0);

        let mut idle = Canvas::new(surface);
        idle.fill(black);
        field.draw(&mut idle, &palette, &PointerSample::IDLE);
        let (ch, alpha, _) = idle.ink_at(50, 18).unwrap();
        assert_eq!(ch, '•');
        assert!((alpha - 0.5).abs() < 1e-6);
        // no blur, no halo
        assert_eq!(idle.bg_at(50, 18), black);

        let pointer = PointerSample {
            x: 420.0,
            y: 300.0,
            active: true,
        };
        let mut hovered = Canvas::new(surface);
        hovered.fill(black);
        field.draw(&mut hovered, &palette, &pointer);
        let (_, alpha, _) = hovered.ink_at(50, 18).unwrap();
        assert!((alpha - 0.9).abs() < 1e-6);
        assert!(hovered.bg_at(50, 18).r > 0);
    }

    proptest! {
        #[test]
        fn particles_stay_inside_the_surface(
            seed in any::<u64>(),
            frames in 1usize..400,
            px in 0.0f32..800.0,
            py in 0.0f32..600.0,
            active in any::<bool>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let palette = Palette::for_theme(Theme::Dark);
            let mut field = ParticleField::new(&mut rng, 800.0, 600.0, &palette, 40);
            let pointer = PointerSample { x: px, y: py, active };
            for _ in 0..frames {
                field.update(800.0, 600.0, &pointer);
            }
            prop_assert_eq!(field.particles().len(), 40);
            for p in field.particles() {
                prop_assert!(p.x >= 0.0 && p.x < 800.0, "x = {}", p.x);
                prop_assert!(p.y >= 0.0 && p.y < 600.0, "y = {}", p.y);
            }
        }
    }
}
