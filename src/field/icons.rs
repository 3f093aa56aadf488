// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::canvas::Canvas;
use crate::field::particles::pick_color;
use crate::field::{jitter, uniform, wrap_margin};
use crate::palette::{Palette, Rgb};
use crate::pointer::PointerSample;
use crate::vocab::{pick, ICON_LABELS};

pub const DEFAULT_COUNT: usize = 15;
pub const ATTRACT_RADIUS: f32 = 200.0;
/// Fraction of the remaining distance covered per frame at zero distance.
pub const ATTRACT_PULL: f32 = 0.02;
pub const WRAP_MARGIN: f32 = 50.0;
pub const MAX_ROTATION_SPEED: f32 = 0.005;
pub const NUDGE_CHANCE: f64 = 0.02;
pub const NUDGE_PX: f32 = 0.5;
pub const HOVER_SCALE: f32 = 1.2;
pub const HOVER_BOOST: f32 = 5.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Icon {
    pub x: f32,
    pub y: f32,
    pub label: &'static str,
    pub size: f32,
    pub opacity: f32,
    pub color: Rgb,
    pub rotation: f32,
    pub rotation_speed: f32,
}

pub struct IconField {
    icons: Vec<Icon>,
}

impl IconField {
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        palette: &Palette,
        count: usize,
    ) -> Self {
        let icons = (0..count)
            .map(|_| Icon {
                x: uniform(rng, 0.0, width),
                y: uniform(rng, 0.0, height),
                label: pick(rng, ICON_LABELS),
                size: uniform(rng, 20.0, 40.0),
                opacity: uniform(rng, 0.05, 0.12),
                color: pick_color(rng, &palette.icons),
                rotation: uniform(rng, 0.0, std::f32::consts::TAU),
                rotation_speed: jitter(rng, MAX_ROTATION_SPEED),
            })
            .collect();
        Self { icons }
    }

    #[cfg(test)]
    pub(crate) fn from_icons(icons: Vec<Icon>) -> Self {
        Self { icons }
    }

    #[cfg(test)]
    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        width: f32,
        height: f32,
        pointer: &PointerSample,
    ) {
        for icon in &mut self.icons {
            icon.rotation += icon.rotation_speed;

            if rng.random_bool(NUDGE_CHANCE) {
                icon.x += jitter(rng, NUDGE_PX);
                icon.y += jitter(rng, NUDGE_PX);
            }

            if let Some((dx, dy, dist)) = pointer.within(icon.x, icon.y, ATTRACT_RADIUS) {
                let pull = (ATTRACT_RADIUS - dist) / ATTRACT_RADIUS * ATTRACT_PULL;
                icon.x -= dx * pull;
                icon.y -= dy * pull;
            }

            icon.x = wrap_margin(icon.x, width, WRAP_MARGIN);
            icon.y = wrap_margin(icon.y, height, WRAP_MARGIN);
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, palette: &Palette, pointer: &PointerSample) {
        let cell_h = canvas.surface().metrics().height;
        for icon in &self.icons {
            let hovered = pointer.within(icon.x, icon.y, ATTRACT_RADIUS).is_some();
            let (size, opacity) = if hovered {
                (icon.size * HOVER_SCALE, icon.opacity * HOVER_BOOST)
            } else {
                (icon.size, icon.opacity)
            };
            // text cannot turn on a cell grid; rotation shows as a shimmer
            let shimmer = 0.75 + 0.25 * icon.rotation.cos();
            let alpha = (opacity * shimmer * palette.ink).min(1.0);
            canvas.text(icon.x, icon.y, icon.label, icon.color, alpha, size >= cell_h * 2.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    use crate::runtime::Theme;
    use crate::surface::{CellMetrics, Surface};

    fn canvas() -> Canvas {
        Canvas::new(Surface::from_cells(100, 40, CellMetrics::default()).unwrap())
    }

    fn icon(x: f32, y: f32) -> Icon {
        Icon {
            x,
            y,
            label: "{ }",
            size: 30.0,
            opacity: 0.1,
            color: Rgb::new(1, 2, 3),
            rotation: 0.0,
            rotation_speed: 0.004,
        }
    }

    #[test]
    fn rotation_advances_every_frame() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut f = IconField::from_icons(vec![icon(100.0, 100.0)]);
        for _ in 0..10 {
            f.update(&mut rng, 800.0, 600.0, &PointerSample::IDLE);
        }
        assert!((f.icons()[0].rotation - 0.04).abs() < 1e-5);
    }

    #[test]
    fn pointer_attracts_icons_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let pointer = PointerSample {
            x: 200.0,
            y: 100.0,
            active: true,
        };
        let mut f = IconField::from_icons(vec![icon(100.0, 100.0), icon(700.0, 500.0)]);
        f.update(&mut rng, 800.0, 600.0, &pointer);
        // a nudge moves at most half a pixel, the pull here is about one pixel
        assert!(f.icons()[0].x > 100.0);
        assert!((f.icons()[1].x - 700.0).abs() <= 1.0);
    }

    #[test]
    fn icons_wrap_with_a_margin() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut f = IconField::from_icons(vec![icon(-60.0, 100.0)]);
        f.update(&mut rng, 800.0, 600.0, &PointerSample::IDLE);
        assert_eq!(f.icons()[0].x, 850.0);
    }

    #[test]
    fn hovered_icons_render_larger_and_five_times_as_opaque() {
        let palette = Palette::for_theme(Theme::Dark);
        let f = IconField::from_icons(vec![icon(100.0, 100.0)]);

        let mut idle = canvas();
        f.draw(&mut idle, &palette, &PointerSample::IDLE);
        // 30px stays below two 16px cells; rotation 0 is full shimmer
        let (ch, alpha, bold) = idle.ink_at(12, 6).unwrap();
        assert_eq!(ch, '{');
        assert!((alpha - 0.1 * palette.ink).abs() < 1e-6);
        assert!(!bold);

        let near = PointerSample {
            x: 250.0,
            y: 100.0,
            active: true,
        };
        let mut hovered = canvas();
        f.draw(&mut hovered, &palette, &near);
        // 30 * 1.2 = 36px crosses two cells, which renders bold
        let (_, alpha, bold) = hovered.ink_at(12, 6).unwrap();
        assert!((alpha - 0.1 * HOVER_BOOST * palette.ink).abs() < 1e-6);
        assert!(bold);
    }

    #[test]
    fn rotation_dims_through_the_shimmer() {
        let palette = Palette::for_theme(Theme::Dark);
        let mut turned = icon(100.0, 100.0);
        turned.rotation = std::f32::consts::PI;
        let f = IconField::from_icons(vec![turned]);
        let mut c = canvas();
        f.draw(&mut c, &palette, &PointerSample::IDLE);
        let (_, alpha, _) = c.ink_at(12, 6).unwrap();
        assert!((alpha - 0.05).abs() < 1e-6);
    }

    #[test]
    fn rotation_speeds_are_slow() {
        let mut rng = StdRng::seed_from_u64(11);
        let palette = Palette::for_theme(crate::runtime::Theme::Dark);
        let f = IconField::new(&mut rng, 800.0, 600.0, &palette, DEFAULT_COUNT);
        assert_eq!(f.icons().len(), DEFAULT_COUNT);
        for i in f.icons() {
            assert!(i.rotation_speed.abs() <= MAX_ROTATION_SPEED);
        }
    }
}
