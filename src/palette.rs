// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::{ColorMode, Theme};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_f32(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }

    pub fn from_f32(v: [f32; 3]) -> Self {
        let q = |c: f32| {
            if c.is_finite() {
                c.round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        };
        Self::new(q(v[0]), q(v[1]), q(v[2]))
    }

    #[cfg(test)]
    pub fn luma(self) -> f32 {
        0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32
    }
}

/// Immutable colour record for one theme. Built once per theme change and
/// handed read-only to every layer's draw call.
#[derive(Clone, Debug)]
pub struct Palette {
    pub background: Rgb,
    pub vignette: Rgb,
    pub vignette_strength: f32,
    pub pointer_glow: Rgb,
    pub pointer_glow_alpha: f32,
    pub noise: Rgb,
    pub noise_alpha: f32,
    pub gradients: Vec<Rgb>,
    pub particles: Vec<Rgb>,
    pub glyphs: Vec<Rgb>,
    pub icons: Vec<Rgb>,
    pub rain: Rgb,
    pub rain_alpha: f32,
    /// Multiplier for layer opacities; light backgrounds need more ink.
    pub ink: f32,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Rgb::new(8, 10, 18),
                vignette: Rgb::new(0, 0, 0),
                vignette_strength: 0.55,
                pointer_glow: Rgb::new(90, 140, 255),
                pointer_glow_alpha: 0.18,
                noise: Rgb::new(180, 190, 210),
                noise_alpha: 0.035,
                gradients: gradient_from_stops(
                    &[(64, 84, 200), (120, 60, 190), (30, 150, 180)],
                    5,
                ),
                particles: gradient_from_stops(&[(120, 170, 255), (200, 220, 255)], 4),
                glyphs: vec![
                    Rgb::new(110, 160, 255),
                    Rgb::new(150, 120, 255),
                    Rgb::new(90, 210, 200),
                ],
                icons: vec![Rgb::new(170, 190, 255), Rgb::new(200, 160, 255)],
                rain: Rgb::new(70, 200, 140),
                rain_alpha: 0.35,
                ink: 1.0,
            },
            Theme::Light => Self {
                background: Rgb::new(244, 246, 252),
                vignette: Rgb::new(200, 206, 222),
                vignette_strength: 0.35,
                pointer_glow: Rgb::new(60, 110, 240),
                pointer_glow_alpha: 0.10,
                noise: Rgb::new(90, 96, 120),
                noise_alpha: 0.03,
                gradients: gradient_from_stops(
                    &[(150, 180, 255), (205, 170, 250), (150, 225, 235)],
                    5,
                ),
                particles: gradient_from_stops(&[(40, 80, 190), (90, 120, 220)], 4),
                glyphs: vec![
                    Rgb::new(40, 80, 200),
                    Rgb::new(100, 60, 190),
                    Rgb::new(20, 130, 130),
                ],
                icons: vec![Rgb::new(60, 70, 160), Rgb::new(110, 60, 170)],
                rain: Rgb::new(20, 130, 80),
                rain_alpha: 0.30,
                ink: 1.6,
            },
        }
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn gradient_from_stops(stops: &[(u8, u8, u8)], steps: usize) -> Vec<Rgb> {
    if steps == 0 || stops.is_empty() {
        return Vec::new();
    }
    if stops.len() == 1 || steps == 1 {
        let (r, g, b) = stops[0];
        return vec![Rgb::new(r, g, b); steps];
    }

    let segs = stops.len() - 1;
    (0..steps)
        .map(|i| {
            let pos = (i as f32) / ((steps - 1) as f32) * (segs as f32);
            let seg = (pos.floor() as usize).min(segs - 1);
            let lt = pos - (seg as f32);
            let (r0, g0, b0) = stops[seg];
            let (r1, g1, b1) = stops[seg + 1];
            Rgb::new(lerp_u8(r0, r1, lt), lerp_u8(g0, g1, lt), lerp_u8(b0, b1, lt))
        })
        .collect()
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let gv = match gray_idx {
        16 => 0,
        231 => 255,
        _ => 8 + 10 * (gray_idx - 232),
    };

    if dist2(r, g, b, gv, gv, gv) < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

/// Maps a composited colour onto what the terminal can show. Mono terminals
/// get no explicit colour at all.
pub fn term_color(rgb: Rgb, mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
        }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(rgb.r, rgb.g, rgb.b))),
        ColorMode::Color16 => Some(rgb_to_color16(rgb.r, rgb.g, rgb.b)),
    }
}
