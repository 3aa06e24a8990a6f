use super::{ModifierContext, ParticleModifier};
use crate::sprite::ParticleState;
use ember_core::Vec2;

pub const DEFAULT_GRAVITY: f32 = 9.81;

/// Accelerates particles along +y
pub struct GravityModifier {
    gravity: f32,
}

impl Default for GravityModifier {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl GravityModifier {
    pub fn new(gravity: f32) -> Self {
        Self { gravity }
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }
}

impl ParticleModifier for GravityModifier {
    fn on_create(&mut self, particle: &mut ParticleState, _ctx: &mut ModifierContext<'_>) {
        particle.vars.fall_velocity = 0.0;
    }

    fn on_tick(&mut self, particle: &mut ParticleState, delta_time: f32, _progress: f32) {
        particle.vars.fall_velocity += self.gravity * delta_time;
        let fall = particle.vars.fall_velocity;
        particle.set_position(particle.position() + Vec2::new(0.0, fall));
    }
}
