//! Integer-degree sine/cosine tables for spawn-shape rotation

use ember_core::Vec2;
use std::rc::Rc;

/// Number of table entries, one per whole degree
pub const DEGREES: usize = 360;

/// Precomputed sine and cosine at whole-degree resolution.
///
/// Read-only after construction; share one instance between systems through
/// [`TrigCache::shared`] or an injected `Rc`.
pub struct TrigCache {
    sin: [f32; DEGREES],
    cos: [f32; DEGREES],
}

thread_local! {
    static SHARED: Rc<TrigCache> = Rc::new(TrigCache::new());
}

impl TrigCache {
    pub fn new() -> Self {
        let mut sin = [0.0; DEGREES];
        let mut cos = [0.0; DEGREES];
        for deg in 0..DEGREES {
            let rad = (deg as f64).to_radians();
            sin[deg] = rad.sin() as f32;
            cos[deg] = rad.cos() as f32;
        }
        Self { sin, cos }
    }

    /// The per-thread instance used when no cache is injected
    pub fn shared() -> Rc<TrigCache> {
        SHARED.with(Rc::clone)
    }

    pub fn sin(&self, degrees: u16) -> f32 {
        self.sin[degrees as usize % DEGREES]
    }

    pub fn cos(&self, degrees: u16) -> f32 {
        self.cos[degrees as usize % DEGREES]
    }

    /// Rotate `v` counter-clockwise by a whole-degree angle
    pub fn rotate(&self, v: Vec2, degrees: u16) -> Vec2 {
        v.rotated(self.sin(degrees), self.cos(degrees))
    }

    /// Wrap any angle into [0, 360) and drop the fractional part.
    /// Non-finite input maps to 0.
    pub fn normalize_degrees(rotation: f32) -> u16 {
        if !rotation.is_finite() {
            return 0;
        }
        let wrapped = rotation.rem_euclid(DEGREES as f32).floor();
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        (wrapped as u16).min(DEGREES as u16 - 1)
    }
}

impl Default for TrigCache {
    fn default() -> Self {
        Self::new()
    }
}
