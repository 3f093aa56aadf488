// Copyright (c) 2026 rezky_nightky

//! The five independent kinematic layers. Each owns its pool, advances it
//! once per frame from a shared pointer sample, and paints itself onto the
//! canvas with colours from the active palette.

pub mod glyphs;
pub mod gradients;
pub mod icons;
pub mod particles;
pub mod rain;

use rand::Rng;

/// Folds `v` back into `[0, max)`.
pub fn wrap(v: f32, max: f32) -> f32 {
    if !(max > 0.0) || !v.is_finite() {
        return 0.0;
    }
    let w = v.rem_euclid(max);
    // rem_euclid can round a tiny negative up to exactly `max`
    if w >= max {
        0.0
    } else {
        w
    }
}

/// Wraps across a band that extends `margin` beyond each edge: leaving one
/// side re-enters on the opposite side, outside the visible area.
pub fn wrap_margin(v: f32, max: f32, margin: f32) -> f32 {
    if v < -margin {
        max + margin
    } else if v > max + margin {
        -margin
    } else {
        v
    }
}

pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return lo;
    }
    rng.random_range(lo..hi)
}

/// A value in `[-half, half)`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, half: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * 2.0 * half
}
