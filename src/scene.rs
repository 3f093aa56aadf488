// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;
use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::canvas::Canvas;
use crate::field::glyphs::{self, GlyphField};
use crate::field::gradients::{self, GradientField};
use crate::field::icons::{self, IconField};
use crate::field::particles::{self, ParticleField};
use crate::field::rain::{RainField, RainGeometry};
use crate::frame::Frame;
use crate::palette::{term_color, Palette};
use crate::pointer::{PointerSample, PointerTracker};
use crate::runtime::{ColorMode, Theme};
use crate::surface::{CellMetrics, Surface};
use crate::vocab::{build_tokens, GlyphSet};

pub const NOISE_DOTS: usize = 1000;
/// Radius of the soft light under an active pointer.
pub const POINTER_GLOW_RADIUS: f32 = 220.0;

/// Pool sizes and switches fixed for the lifetime of a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub particles: usize,
    pub glyphs: usize,
    pub icons: usize,
    pub gradients: usize,
    pub glyph_set: GlyphSet,
    pub noise: bool,
    pub metrics: CellMetrics,
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particles: particles::DEFAULT_COUNT,
            glyphs: glyphs::DEFAULT_COUNT,
            icons: icons::DEFAULT_COUNT,
            gradients: gradients::DEFAULT_COUNT,
            glyph_set: GlyphSet::Code,
            noise: true,
            metrics: CellMetrics::default(),
            seed: 0x1234567,
        }
    }
}

/// Input collected between frames. Handlers only queue these; the scene
/// applies them in order at the start of its next step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intent {
    /// Pointer moved over the cell at `(col, row)`.
    PointerMoved { col: u16, row: u16, at: Instant },
    PointerLeft,
    Resize { cols: u16, rows: u16 },
    SetTheme(Theme),
    Reset,
}

struct Layers {
    canvas: Canvas,
    gradients: GradientField,
    rain: RainField,
    glyphs: GlyphField,
    icons: IconField,
    particles: ParticleField,
}

impl Layers {
    fn build(surface: Surface, palette: &Palette, config: &SceneConfig, rng: &mut StdRng) -> Self {
        let (w, h) = (surface.width(), surface.height());
        let m = surface.metrics();
        let tokens = build_tokens(config.glyph_set);
        Self {
            canvas: Canvas::new(surface),
            gradients: GradientField::new(rng, w, h, config.gradients),
            rain: RainField::new(
                rng,
                RainGeometry {
                    width: w,
                    height: h,
                    pitch_x: m.width,
                    pitch_y: m.height,
                },
            ),
            glyphs: GlyphField::new(rng, w, h, palette, &tokens, config.glyphs),
            icons: IconField::new(rng, w, h, palette, config.icons),
            particles: ParticleField::new(rng, w, h, palette, config.particles),
        }
    }

    /// Paints everything back to front; a layer painted later covers the glyphs
    /// of the ones before it. `noise` is the grain source, `None` when disabled.
    fn paint<R: Rng + ?Sized>(
        &mut self,
        palette: &Palette,
        pointer: &PointerSample,
        noise: Option<&mut R>,
    ) {
        let canvas = &mut self.canvas;
        let (w, h) = (canvas.surface().width(), canvas.surface().height());
        canvas.clear();
        canvas.fill(palette.background);
        canvas.vignette(palette.vignette, palette.vignette_strength);
        draw_pointer_glow(canvas, palette, pointer);
        self.gradients.draw(canvas, palette);
        if let Some(rng) = noise {
            draw_noise(canvas, palette, rng, w, h);
        }
        self.rain.draw(canvas, palette);
        self.glyphs.draw(canvas, palette, pointer);
        self.icons.draw(canvas, palette, pointer);
        self.particles.draw(canvas, palette, pointer);
    }
}

/// Everything the frame driver owns: surface, pointer, palette, all layers and
/// the pending intents.
pub struct Scene {
    config: SceneConfig,
    theme: Theme,
    palette: Palette,
    pointer: PointerTracker,
    surface: Option<Surface>,
    layers: Option<Layers>,
    intents: VecDeque<Intent>,
    rng: StdRng,
    paused: bool,
    rebuilt: bool,
    frames: u64,
}

impl Scene {
    pub fn new(config: SceneConfig, theme: Theme, cols: u16, rows: u16) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let mut scene = Self {
            palette: Palette::for_theme(theme),
            theme,
            pointer: PointerTracker::default(),
            surface: None,
            layers: None,
            intents: VecDeque::new(),
            rng,
            paused: false,
            rebuilt: false,
            frames: 0,
            config,
        };
        scene.resize(cols, rows);
        scene
    }

    pub fn push(&mut self, intent: Intent) {
        self.intents.push_back(intent);
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[cfg(test)]
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn noise(&self) -> bool {
        self.config.noise
    }

    pub fn set_noise(&mut self, on: bool) {
        self.config.noise = on;
    }

    #[cfg(test)]
    pub fn particles(&self) -> Option<&ParticleField> {
        self.layers.as_ref().map(|l| &l.particles)
    }

    #[cfg(test)]
    pub fn glyphs(&self) -> Option<&GlyphField> {
        self.layers.as_ref().map(|l| &l.glyphs)
    }

    #[cfg(test)]
    pub fn icons(&self) -> Option<&IconField> {
        self.layers.as_ref().map(|l| &l.icons)
    }

    #[cfg(test)]
    pub fn gradients(&self) -> Option<&GradientField> {
        self.layers.as_ref().map(|l| &l.gradients)
    }

    #[cfg(test)]
    pub fn rain(&self) -> Option<&RainField> {
        self.layers.as_ref().map(|l| &l.rain)
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.surface = Surface::from_cells(cols, rows, self.config.metrics);
        match self.surface {
            Some(s) => tracing::debug!(cols, rows, width = s.width(), height = s.height(), "surface resized"),
            None => tracing::debug!(cols, rows, "no drawable surface; rendering suspended"),
        }
        self.rebuild();
    }

    /// Recreates every pool from scratch for the current surface and palette.
    fn rebuild(&mut self) {
        self.layers = self
            .surface
            .map(|s| Layers::build(s, &self.palette, &self.config, &mut self.rng));
        self.rebuilt = true;
    }

    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::PointerMoved { col, row, at } => {
                if let Some(s) = &self.surface {
                    let (x, y) = s.cell_center(col, row);
                    self.pointer.moved(x, y, at);
                }
            }
            Intent::PointerLeft => self.pointer.left(),
            Intent::Resize { cols, rows } => {
                let same = self
                    .surface
                    .is_some_and(|s| s.cols() == cols && s.rows() == rows);
                if !same {
                    self.resize(cols, rows);
                }
            }
            Intent::SetTheme(theme) => {
                if theme != self.theme {
                    tracing::info!(theme = theme.label(), "theme changed");
                    self.theme = theme;
                    self.palette = Palette::for_theme(theme);
                    self.rebuild();
                }
            }
            Intent::Reset => self.rebuild(),
        }
    }

    /// Drains pending intents, then advances and paints every layer once, back
    /// to front, onto `frame`. While paused nothing advances, but freshly
    /// rebuilt layers are still painted once. Returns false when nothing was
    /// painted.
    pub fn step(&mut self, now: Instant, frame: &mut Frame, mode: ColorMode) -> bool {
        while let Some(intent) = self.intents.pop_front() {
            self.apply(intent);
        }
        let Some(layers) = self.layers.as_mut() else {
            return false;
        };
        if self.paused && !self.rebuilt {
            return false;
        }

        let pointer = self.pointer.sample(now);
        let surface = *layers.canvas.surface();

        if !self.paused {
            let rng = &mut self.rng;
            let (w, h) = (surface.width(), surface.height());
            layers.gradients.update(w, h);
            layers.rain.update(rng);
            layers.glyphs.update(rng, w, h, &pointer);
            layers.icons.update(rng, w, h, &pointer);
            layers.particles.update(w, h, &pointer);
            self.frames += 1;
        }

        let noise = if self.config.noise {
            Some(&mut self.rng)
        } else {
            None
        };
        layers.paint(&self.palette, &pointer, noise);

        let canvas = &layers.canvas;
        let bg = term_color(self.palette.background, mode);
        if frame.width != surface.cols() || frame.height != surface.rows() {
            *frame = Frame::new(surface.cols(), surface.rows(), bg);
        } else if self.rebuilt {
            frame.clear_with_bg(bg);
        }
        self.rebuilt = false;
        canvas.present(frame, mode);
        true
    }
}

fn draw_pointer_glow(canvas: &mut Canvas, palette: &Palette, pointer: &PointerSample) {
    if pointer.active {
        canvas.radial(
            pointer.x,
            pointer.y,
            POINTER_GLOW_RADIUS,
            palette.pointer_glow,
            palette.pointer_glow_alpha,
        );
    }
}

/// Metallic grain: random single-pixel specks, re-rolled every frame.
fn draw_noise<R: Rng + ?Sized>(canvas: &mut Canvas, palette: &Palette, rng: &mut R, w: f32, h: f32) {
    for _ in 0..NOISE_DOTS {
        let x = rng.random::<f32>() * w;
        let y = rng.random::<f32>() * h;
        canvas.speck(x, y, palette.noise, palette.noise_alpha);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::field::glyphs::CodeGlyph;
    use crate::field::icons::Icon;
    use crate::field::particles::Particle;
    use crate::field::rain::{RainColumn, MAX_COLUMNS};
    use crate::palette::Rgb;

    fn scene(cols: u16, rows: u16) -> Scene {
        let config = SceneConfig {
            metrics: CellMetrics {
                width: 8.0,
                height: 15.0,
            },
            ..SceneConfig::default()
        };
        Scene::new(config, Theme::Dark, cols, rows)
    }

    #[test]
    fn pools_have_their_configured_sizes() {
        let s = scene(100, 40);
        assert_eq!(s.surface().unwrap().width(), 800.0);
        assert_eq!(s.surface().unwrap().height(), 600.0);
        assert_eq!(s.particles().unwrap().particles().len(), 120);
        assert_eq!(s.glyphs().unwrap().glyphs().len(), 80);
        assert_eq!(s.icons().unwrap().icons().len(), 15);
        assert_eq!(s.gradients().unwrap().areas().len(), 5);
        assert_eq!(s.rain().unwrap().columns().len(), 10);
    }

    #[test]
    fn step_paints_the_whole_frame() {
        let mut s = scene(40, 12);
        let mut frame = Frame::new(40, 12, None);
        frame.clear_dirty();
        assert!(s.step(Instant::now(), &mut frame, ColorMode::TrueColor));
        assert!(frame.has_changes());
        assert_eq!(s.frames(), 1);
    }

    #[test]
    fn zero_sized_terminal_skips_rendering_until_resized() {
        let mut s = scene(0, 0);
        let mut frame = Frame::new(0, 0, None);
        assert!(!s.step(Instant::now(), &mut frame, ColorMode::TrueColor));
        assert!(s.surface().is_none());

        s.push(Intent::Resize { cols: 20, rows: 10 });
        assert!(s.step(Instant::now(), &mut frame, ColorMode::TrueColor));
        assert_eq!((frame.width, frame.height), (20, 10));
    }

    #[test]
    fn theme_change_rebuilds_pools_with_the_new_palette() {
        let mut s = scene(100, 40);
        let mut frame = Frame::new(100, 40, None);
        for _ in 0..50 {
            s.step(Instant::now(), &mut frame, ColorMode::TrueColor);
        }
        s.push(Intent::SetTheme(Theme::Light));
        s.step(Instant::now(), &mut frame, ColorMode::TrueColor);
        assert_eq!(s.theme(), Theme::Light);
        let light = Palette::for_theme(Theme::Light);
        for p in s.particles().unwrap().particles() {
            assert!(light.particles.contains(&p.color));
        }
        // freshly rebuilt rain has only advanced one frame
        assert!(s.rain().unwrap().columns().iter().all(|c| c.progress <= 3.0));
    }

    #[test]
    fn pointer_intents_are_applied_on_the_next_step() {
        let mut s = scene(100, 40);
        let mut frame = Frame::new(100, 40, None);
        let t0 = Instant::now();
        s.push(Intent::PointerMoved {
            col: 50,
            row: 20,
            at: t0,
        });
        assert!(!s.pointer.is_active(t0));
        s.step(t0, &mut frame, ColorMode::TrueColor);
        assert!(s.pointer.is_active(t0));
        assert_eq!(s.pointer.position(), (404.0, 307.5));
        assert!(!s.pointer.is_active(t0 + Duration::from_secs(2)));

        s.push(Intent::PointerLeft);
        s.step(t0, &mut frame, ColorMode::TrueColor);
        assert!(!s.pointer.is_active(t0));
    }

    #[test]
    fn paused_scene_does_not_advance() {
        let mut s = scene(30, 10);
        let mut frame = Frame::new(30, 10, None);
        s.toggle_pause();
        // the freshly built layers are shown once
        assert!(s.step(Instant::now(), &mut frame, ColorMode::Mono));
        assert_eq!(s.frames(), 0);
        assert!(!s.step(Instant::now(), &mut frame, ColorMode::Mono));
        assert_eq!(s.frames(), 0);
        s.toggle_pause();
        assert!(s.step(Instant::now(), &mut frame, ColorMode::Mono));
        assert_eq!(s.frames(), 1);
    }

    #[test]
    fn resize_while_paused_repaints_without_advancing() {
        let mut s = scene(30, 10);
        let mut frame = Frame::new(30, 10, None);
        assert!(s.step(Instant::now(), &mut frame, ColorMode::TrueColor));
        s.toggle_pause();
        frame.clear_dirty();
        assert!(!s.step(Instant::now(), &mut frame, ColorMode::TrueColor));

        s.push(Intent::Resize { cols: 50, rows: 20 });
        assert!(s.step(Instant::now(), &mut frame, ColorMode::TrueColor));
        assert_eq!((frame.width, frame.height), (50, 20));
        assert!(frame.has_changes());
        assert_eq!(s.frames(), 1);
        assert!(s.rain().unwrap().columns().iter().all(|c| c.progress == 0.0));
    }

    fn still_layers(
        cols: u16,
        rows: u16,
        rain: Vec<RainColumn>,
        glyphs: Vec<CodeGlyph>,
        icons: Vec<Icon>,
        particles: Vec<Particle>,
    ) -> Layers {
        let surface = Surface::from_cells(cols, rows, CellMetrics::default()).unwrap();
        let geo = RainGeometry {
            width: surface.width(),
            height: surface.height(),
            pitch_x: 8.0,
            pitch_y: 16.0,
        };
        Layers {
            canvas: Canvas::new(surface),
            gradients: GradientField::from_areas(Vec::new()),
            rain: RainField::from_columns(rain, geo),
            glyphs: GlyphField::from_glyphs(glyphs),
            icons: IconField::from_icons(icons),
            particles: ParticleField::from_particles(particles),
        }
    }

    #[test]
    fn later_layers_cover_earlier_ones() {
        let white = Rgb::new(255, 255, 255);
        // a full-strength rain digit lands in cell (0, 0)
        let mut col = RainColumn::with_shape(0.0, 400.0, 2.0);
        col.chars = vec!['1'; 10];
        col.progress = 116.0;
        let glyph = CodeGlyph {
            x: 24.0,
            y: 4.0,
            text: "fn",
            font_size: 12.0,
            opacity: 0.1,
            color: white,
            vx: 0.0,
            vy: 0.0,
        };
        let icon = Icon {
            x: 24.0,
            y: 4.0,
            label: "{ }",
            size: 20.0,
            opacity: 0.08,
            color: white,
            rotation: 0.0,
            rotation_speed: 0.0,
        };
        let particle = Particle {
            x: 4.0,
            y: 8.0,
            size: 1.0,
            vx: 0.0,
            vy: 0.0,
            opacity: 0.2,
            color: white,
            blur: 0.0,
        };
        let mut layers = still_layers(10, 8, vec![col], vec![glyph], vec![icon], vec![particle]);
        let palette = Palette::for_theme(Theme::Dark);
        layers.paint::<StdRng>(&palette, &PointerSample::IDLE, None);

        // the fainter particle still wins over the rain behind it
        assert_eq!(layers.canvas.ink_at(0, 0).map(|k| k.0), Some('•'));
        // rain elsewhere in the column is untouched
        assert_eq!(layers.canvas.ink_at(0, 1).map(|k| k.0), Some('1'));
        // icon over code glyph, and the glyph shows where the icon has a gap
        assert_eq!(layers.canvas.ink_at(3, 0).map(|k| k.0), Some('{'));
        assert_eq!(layers.canvas.ink_at(4, 0).map(|k| k.0), Some('n'));
        assert_eq!(layers.canvas.ink_at(5, 0).map(|k| k.0), Some('}'));
    }

    #[test]
    fn noise_speckles_about_a_thousand_cells() {
        let palette = Palette::for_theme(Theme::Dark);
        let mut layers = still_layers(100, 40, Vec::new(), Vec::new(), Vec::new(), Vec::new());
        layers.paint::<StdRng>(&palette, &PointerSample::IDLE, None);
        let clean: Vec<Rgb> = (0..40)
            .flat_map(|row| (0..100).map(move |col| (col, row)))
            .map(|(col, row)| layers.canvas.bg_at(col, row))
            .collect();

        let mut rng = StdRng::seed_from_u64(17);
        layers.paint(&palette, &PointerSample::IDLE, Some(&mut rng));
        let touched = (0..40)
            .flat_map(|row| (0..100).map(move |col| (col, row)))
            .filter(|&(col, row)| layers.canvas.bg_at(col, row) != clean[row as usize * 100 + col as usize])
            .count();
        assert!(touched <= NOISE_DOTS);
        assert!(touched >= 800, "touched = {touched}");
    }

    fn backgrounds(frame: &Frame) -> Vec<Option<crossterm::style::Color>> {
        (0..frame.height)
            .flat_map(|y| (0..frame.width).map(move |x| (x, y)))
            .map(|(x, y)| frame.get(x, y).map(|c| c.bg).unwrap_or_default())
            .collect()
    }

    #[test]
    fn disabled_noise_leaves_the_background_still() {
        let config = SceneConfig {
            particles: 0,
            glyphs: 0,
            icons: 0,
            gradients: 0,
            noise: false,
            ..SceneConfig::default()
        };
        let mut s = Scene::new(config, Theme::Dark, 100, 40);
        let mut frame = Frame::new(100, 40, None);
        let t0 = Instant::now();
        s.step(t0, &mut frame, ColorMode::TrueColor);
        let first = backgrounds(&frame);
        s.step(t0, &mut frame, ColorMode::TrueColor);
        assert_eq!(backgrounds(&frame), first);

        s.set_noise(true);
        s.step(t0, &mut frame, ColorMode::TrueColor);
        let changed = backgrounds(&frame)
            .iter()
            .zip(&first)
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed > 500, "changed = {changed}");
    }

    #[test]
    fn long_runs_respect_the_rain_cap() {
        let mut s = scene(60, 20);
        let mut frame = Frame::new(60, 20, None);
        s.set_noise(false);
        for _ in 0..2000 {
            s.step(Instant::now(), &mut frame, ColorMode::Color256);
        }
        assert!(s.rain().unwrap().columns().len() <= MAX_COLUMNS);
    }
}
