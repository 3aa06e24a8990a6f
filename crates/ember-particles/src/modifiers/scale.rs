use super::{ModifierContext, ParticleModifier};
use crate::ease::{self, EaseFn};
use crate::sprite::ParticleState;
use ember_core::Vec2;
use std::rc::Rc;

/// Scales each axis by its own ease times the particle's spawn scale.
///
/// Both eases default to a constant 1, so an untouched modifier keeps the
/// spawn scale.
pub struct ScaleModifier {
    ease_x: EaseFn,
    ease_y: EaseFn,
}

impl Default for ScaleModifier {
    fn default() -> Self {
        Self {
            ease_x: ease::constant_one(),
            ease_y: ease::constant_one(),
        }
    }
}

impl ScaleModifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ease_x(&mut self, ease: impl Fn(f32, f32, f32) -> f32 + 'static) {
        self.ease_x = Rc::new(ease);
    }

    pub fn set_ease_y(&mut self, ease: impl Fn(f32, f32, f32) -> f32 + 'static) {
        self.ease_y = Rc::new(ease);
    }

    /// Use one ease for both axes
    pub fn set_ease_xy(&mut self, ease: impl Fn(f32, f32, f32) -> f32 + 'static) {
        self.set_ease_shared(Rc::new(ease));
    }

    pub fn set_ease_shared(&mut self, ease: EaseFn) {
        self.ease_x = ease.clone();
        self.ease_y = ease;
    }

    pub fn set_ease_x_shared(&mut self, ease: EaseFn) {
        self.ease_x = ease;
    }

    pub fn set_ease_y_shared(&mut self, ease: EaseFn) {
        self.ease_y = ease;
    }
}

impl ParticleModifier for ScaleModifier {
    fn on_create(&mut self, _particle: &mut ParticleState, _ctx: &mut ModifierContext<'_>) {}

    fn on_tick(&mut self, particle: &mut ParticleState, delta_time: f32, progress: f32) {
        let current = particle.scale();
        let base = particle.vars.initial_scale;
        let x = (self.ease_x)(progress, delta_time, current.x) * base;
        let y = (self.ease_y)(progress, delta_time, current.y) * base;
        particle.set_scale(Vec2::new(x, y));
    }
}
