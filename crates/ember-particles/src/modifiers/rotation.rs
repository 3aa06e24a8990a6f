use super::{ModifierContext, ParticleModifier};
use crate::settings::ValueRange;
use crate::sprite::ParticleState;

/// Spins particles at a torque sampled once at spawn
pub struct RotationModifier {
    speed: ValueRange,
}

impl Default for RotationModifier {
    fn default() -> Self {
        Self {
            speed: ValueRange::fixed(0.0),
        }
    }
}

impl RotationModifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Degrees per second; negative speeds spin counter-clockwise
    pub fn set_rotate_speed(&mut self, min: f32, max: impl Into<Option<f32>>) {
        self.speed = ValueRange::new(min, max);
    }

    pub fn rotate_speed(&self) -> ValueRange {
        self.speed
    }
}

impl ParticleModifier for RotationModifier {
    fn on_create(&mut self, particle: &mut ParticleState, ctx: &mut ModifierContext<'_>) {
        particle.vars.torque = self.speed.sample(ctx.rng);
    }

    fn on_tick(&mut self, particle: &mut ParticleState, delta_time: f32, _progress: f32) {
        let rotation = particle.rotation() + particle.vars.torque * delta_time;
        particle.set_rotation(rotation);
    }
}
