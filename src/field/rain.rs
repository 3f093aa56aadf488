// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::canvas::Canvas;
use crate::field::uniform;
use crate::palette::Palette;
use crate::vocab::random_bit;

pub const INITIAL_COLUMNS: usize = 10;
pub const MAX_COLUMNS: usize = 15;
/// Per-frame chance of a new column while below the cap.
pub const SPAWN_CHANCE: f64 = 0.008;
pub const RELOCATE_CHANCE: f64 = 0.3;
/// Distance over which a column fades in at its head and out at its tail.
pub const FADE_PX: f32 = 100.0;
pub const MIN_LENGTH: f32 = 100.0;
pub const MAX_LENGTH: f32 = 400.0;
pub const MIN_SPEED: f32 = 1.0;
pub const MAX_SPEED: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnPhase {
    Falling,
    ReadyToReset,
    Respawned,
}

/// The only place column phases change.
pub fn next_phase(phase: ColumnPhase, progress: f32, limit: f32) -> ColumnPhase {
    match phase {
        ColumnPhase::Falling | ColumnPhase::Respawned => {
            if progress >= limit {
                ColumnPhase::ReadyToReset
            } else {
                ColumnPhase::Falling
            }
        }
        ColumnPhase::ReadyToReset => ColumnPhase::Respawned,
    }
}

/// Surface size plus the pixel pitch of one rain character.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RainGeometry {
    pub width: f32,
    pub height: f32,
    pub pitch_x: f32,
    pub pitch_y: f32,
}

impl RainGeometry {
    fn slots(&self) -> u32 {
        if self.pitch_x > 0.0 {
            ((self.width / self.pitch_x).floor() as u32).max(1)
        } else {
            1
        }
    }

    fn aligned_x<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.random_range(0..self.slots()) as f32 * self.pitch_x
    }

    fn chars_for(&self, length: f32) -> usize {
        let pitch = self.pitch_y.max(1.0);
        ((length / pitch).ceil() as usize).max(1)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RainColumn {
    pub x: f32,
    pub progress: f32,
    pub length: f32,
    pub speed: f32,
    pub chars: Vec<char>,
    phase: ColumnPhase,
}

impl RainColumn {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, geo: &RainGeometry) -> Self {
        let length = uniform(rng, MIN_LENGTH, MAX_LENGTH);
        let mut col = Self {
            x: geo.aligned_x(rng),
            progress: 0.0,
            length,
            speed: uniform(rng, MIN_SPEED, MAX_SPEED),
            chars: Vec::new(),
            phase: ColumnPhase::Falling,
        };
        col.regenerate(rng, geo);
        col
    }

    #[cfg(test)]
    pub(crate) fn with_shape(x: f32, length: f32, speed: f32) -> Self {
        Self {
            x,
            progress: 0.0,
            length,
            speed,
            chars: vec!['0'; 4],
            phase: ColumnPhase::Falling,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> ColumnPhase {
        self.phase
    }

    fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R, geo: &RainGeometry) {
        let n = geo.chars_for(self.length);
        self.chars.clear();
        self.chars.extend((0..n).map(|_| random_bit(rng)));
    }

    /// One frame: fall by `speed`; a column whose tail has left the surface is
    /// reset to the top within the same call, without carrying the overshoot.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, geo: &RainGeometry) -> ColumnPhase {
        self.progress += self.speed;
        self.phase = next_phase(self.phase, self.progress, self.length + geo.height);

        if self.phase == ColumnPhase::ReadyToReset {
            self.progress = 0.0;
            if rng.random_bool(RELOCATE_CHANCE) {
                self.x = geo.aligned_x(rng);
            }
            self.regenerate(rng, geo);
            self.phase = next_phase(self.phase, self.progress, self.length + geo.height);
        }
        self.phase
    }
}

/// Alpha of the character `offset` pixels behind the head of a column that is
/// `length` long: ramps in over the first `FADE_PX` and out over the last.
pub fn fade_alpha(offset: f32, length: f32, base: f32) -> f32 {
    let head = (offset / FADE_PX).clamp(0.0, 1.0);
    let tail = ((length - offset) / FADE_PX).clamp(0.0, 1.0);
    base * head.min(tail)
}

pub struct RainField {
    columns: Vec<RainColumn>,
    geo: RainGeometry,
}

impl RainField {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, geo: RainGeometry) -> Self {
        let mut columns = Vec::with_capacity(MAX_COLUMNS);
        for _ in 0..INITIAL_COLUMNS {
            columns.push(RainColumn::spawn(rng, &geo));
        }
        Self { columns, geo }
    }

    #[cfg(test)]
    pub(crate) fn from_columns(columns: Vec<RainColumn>, geo: RainGeometry) -> Self {
        Self { columns, geo }
    }

    #[cfg(test)]
    pub fn columns(&self) -> &[RainColumn] {
        &self.columns
    }

    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for col in &mut self.columns {
            if col.advance(rng, &self.geo) == ColumnPhase::Respawned {
                tracing::trace!(x = col.x, length = col.length, "rain column respawned");
            }
        }

        if self.columns.len() < MAX_COLUMNS && rng.random_bool(SPAWN_CHANCE) {
            self.columns.push(RainColumn::spawn(rng, &self.geo));
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, palette: &Palette) {
        let base = (palette.rain_alpha * palette.ink).min(1.0);
        for col in &self.columns {
            for (i, &ch) in col.chars.iter().enumerate() {
                let offset = i as f32 * self.geo.pitch_y;
                let y = col.progress - offset;
                if y < 0.0 || y >= self.geo.height {
                    continue;
                }
                let alpha = fade_alpha(offset, col.length, base);
                canvas.glyph(col.x, y, ch, palette.rain, alpha, false);
            }
        }
    }
}
