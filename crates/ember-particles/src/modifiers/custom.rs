use super::{ModifierContext, ParticleModifier};
use crate::rand::RandomSource;
use crate::sprite::ParticleState;
use std::rc::Rc;

pub type CreateHook = Rc<dyn Fn(&mut ParticleState, &mut dyn RandomSource)>;

/// Receives `(particle, delta_time, progress)`
pub type TickHook = Rc<dyn Fn(&mut ParticleState, f32, f32)>;

/// A modifier assembled from user closures. A missing hook does nothing.
#[derive(Default)]
pub struct CustomModifier {
    on_create: Option<CreateHook>,
    on_tick: Option<TickHook>,
}

impl CustomModifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_on_create(
        mut self,
        hook: impl Fn(&mut ParticleState, &mut dyn RandomSource) + 'static,
    ) -> Self {
        self.on_create = Some(Rc::new(hook));
        self
    }

    pub fn with_on_tick(mut self, hook: impl Fn(&mut ParticleState, f32, f32) + 'static) -> Self {
        self.on_tick = Some(Rc::new(hook));
        self
    }

    pub fn set_on_create(&mut self, hook: Option<CreateHook>) {
        self.on_create = hook;
    }

    pub fn set_on_tick(&mut self, hook: Option<TickHook>) {
        self.on_tick = hook;
    }

    pub fn has_on_create(&self) -> bool {
        self.on_create.is_some()
    }

    pub fn has_on_tick(&self) -> bool {
        self.on_tick.is_some()
    }
}

impl ParticleModifier for CustomModifier {
    fn on_create(&mut self, particle: &mut ParticleState, ctx: &mut ModifierContext<'_>) {
        if let Some(hook) = &self.on_create {
            hook(particle, ctx.rng);
        }
    }

    fn on_tick(&mut self, particle: &mut ParticleState, delta_time: f32, progress: f32) {
        if let Some(hook) = &self.on_tick {
            hook(particle, delta_time, progress);
        }
    }
}
