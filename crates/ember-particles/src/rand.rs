//! Random sampling used by emission and modifiers

use ember_core::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform random source consumed by the particle pipeline.
///
/// Only `next_f32` is required; every other sampler is derived from it so a
/// scripted source in tests controls all randomness.
pub trait RandomSource {
    /// Returns a float in [0, 1)
    fn next_f32(&mut self) -> f32;

    /// Returns a float in [min, max)
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns -1.0 or 1.0 with equal probability
    fn sign(&mut self) -> f32 {
        if self.next_f32() < 0.5 {
            -1.0
        } else {
            1.0
        }
    }

    /// Returns a point on the unit circle.
    ///
    /// One axis is drawn uniformly in [-1, 1] and the other solved for, with
    /// the axes swapped half of the time.
    fn point_on_unit_circle(&mut self) -> Vec2 {
        let x = self.range(-1.0, 1.0);
        let y = self.sign() * (1.0 - x * x).max(0.0).sqrt();
        if self.next_f32() < 0.5 {
            Vec2::new(x, y)
        } else {
            Vec2::new(y, x)
        }
    }

    /// Returns a point inside the unit circle (uniform radius, not uniform area)
    fn point_inside_unit_circle(&mut self) -> Vec2 {
        let point = self.point_on_unit_circle();
        point * self.next_f32()
    }
}

/// Seedable default random source backed by `SmallRng`
pub struct ParticleRng {
    rng: SmallRng,
}

impl ParticleRng {
    pub const DEFAULT_SEED: u64 = 0xDEAD_BEEF;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seed from the operating system's entropy source
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl Default for ParticleRng {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl RandomSource for ParticleRng {
    fn next_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}
