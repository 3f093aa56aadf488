// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

/// How long a motionless pointer keeps influencing the layers.
pub const IDLE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Last known pointer position plus the two signals that decide whether it
/// counts: presence (enter/leave) and recent motion.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    x: f32,
    y: f32,
    present: bool,
    last_move: Option<Instant>,
}

/// What the layers see for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

impl PointerSample {
    pub const IDLE: PointerSample = PointerSample {
        x: 0.0,
        y: 0.0,
        active: false,
    };

    /// Offset from the pointer to `(x, y)` and its length, if the pointer is
    /// active and closer than `radius`.
    pub fn within(&self, x: f32, y: f32, radius: f32) -> Option<(f32, f32, f32)> {
        if !self.active {
            return None;
        }
        let dx = x - self.x;
        let dy = y - self.y;
        let dist = (dx * dx + dy * dy).sqrt();
        (dist < radius).then_some((dx, dy, dist))
    }
}

impl PointerTracker {
    pub fn moved(&mut self, x: f32, y: f32, now: Instant) {
        self.x = x;
        self.y = y;
        self.present = true;
        self.last_move = Some(now);
    }

    pub fn left(&mut self) {
        self.present = false;
    }

    #[cfg(test)]
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.present
            && self
                .last_move
                .is_some_and(|t| now.saturating_duration_since(t) < IDLE_TIMEOUT)
    }

    pub fn sample(&self, now: Instant) -> PointerSample {
        PointerSample {
            x: self.x,
            y: self.y,
            active: self.is_active(now),
        }
    }
}
