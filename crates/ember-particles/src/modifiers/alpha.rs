use super::{ModifierContext, ParticleModifier};
use crate::ease::{self, EaseFn};
use crate::sprite::ParticleState;
use std::rc::Rc;

/// Sets alpha from an ease over the particle's progress. Fades out linearly
/// by default.
pub struct AlphaModifier {
    ease: EaseFn,
}

impl Default for AlphaModifier {
    fn default() -> Self {
        Self {
            ease: ease::linear_out(),
        }
    }
}

impl AlphaModifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ease(&mut self, ease: impl Fn(f32, f32, f32) -> f32 + 'static) {
        self.ease = Rc::new(ease);
    }

    pub fn set_ease_shared(&mut self, ease: EaseFn) {
        self.ease = ease;
    }
}

impl ParticleModifier for AlphaModifier {
    fn on_create(&mut self, _particle: &mut ParticleState, _ctx: &mut ModifierContext<'_>) {}

    fn on_tick(&mut self, particle: &mut ParticleState, delta_time: f32, progress: f32) {
        let alpha = (self.ease)(progress, delta_time, particle.alpha());
        particle.set_alpha(alpha);
    }
}
