//! Particle sprite: one pooled handle plus its simulation state

use crate::host::ParticleHandle;
use ember_core::{Transform2D, Vec2};

/// Per-particle scratch values written and read by modifiers
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParticleVariables {
    /// Uniform scale sampled at spawn; the Scale modifier multiplies by it
    pub initial_scale: f32,
    /// Accumulated downward speed from the Gravity modifier
    pub fall_velocity: f32,
    /// Units per second, set by the Movement modifier
    pub velocity: Vec2,
    /// Shape offset the particle spawned around
    pub origin_offset: Vec2,
    /// Degrees per second, set by the Rotation modifier
    pub torque: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct DirtyFlags {
    position: bool,
    rotation: bool,
    alpha: bool,
    scale: bool,
}

impl DirtyFlags {
    const ALL: Self = Self {
        position: true,
        rotation: true,
        alpha: true,
        scale: true,
    };
}

/// Simulation-side state of a particle, independent of the drawable type.
///
/// Transform writes go to a cache and are only pushed to the handle on
/// [`ParticleSprite::flush`].
#[derive(Clone, Debug)]
pub struct ParticleState {
    is_active: bool,
    max_alive_time: f32,
    cur_alive_time: f32,
    transform: Transform2D,
    dirty: DirtyFlags,
    pub vars: ParticleVariables,
}

impl ParticleState {
    pub(crate) fn spawned(max_alive_time: f32) -> Self {
        Self {
            is_active: true,
            max_alive_time,
            cur_alive_time: 0.0,
            transform: Transform2D::IDENTITY,
            dirty: DirtyFlags::ALL,
            vars: ParticleVariables::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn max_alive_time(&self) -> f32 {
        self.max_alive_time
    }

    pub fn cur_alive_time(&self) -> f32 {
        self.cur_alive_time
    }

    pub(crate) fn age(&mut self, delta_time: f32) {
        self.cur_alive_time += delta_time;
    }

    /// True once the particle has lived for its full alive time
    pub fn should_die(&self) -> bool {
        self.cur_alive_time >= self.max_alive_time
    }

    pub fn transform(&self) -> &Transform2D {
        &self.transform
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.dirty.position = true;
        self.transform.position = position;
    }

    pub fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.dirty.rotation = true;
        self.transform.rotation = degrees;
    }

    pub fn alpha(&self) -> f32 {
        self.transform.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.dirty.alpha = true;
        self.transform.alpha = alpha;
    }

    pub fn scale(&self) -> Vec2 {
        self.transform.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.dirty.scale = true;
        self.transform.scale = scale;
    }

    /// Whether any cached transform value still has to reach the handle
    pub fn is_dirty(&self) -> bool {
        self.dirty != DirtyFlags::default()
    }
}

/// Wraps one externally created handle for its whole pooled lifetime
pub struct ParticleSprite<H> {
    handle: H,
    state: ParticleState,
    is_initialized: bool,
}

impl<H: ParticleHandle> ParticleSprite<H> {
    /// Wrap a freshly instantiated handle and activate it
    pub(crate) fn new(mut handle: H, max_alive_time: f32) -> Self {
        handle.initialize();
        handle.on_created();
        let mut sprite = Self {
            handle,
            state: ParticleState::spawned(max_alive_time),
            is_initialized: true,
        };
        sprite.enable();
        sprite
    }

    /// Bring a pooled sprite back with a fresh state
    pub(crate) fn activate(&mut self, max_alive_time: f32) {
        self.state = ParticleState::spawned(max_alive_time);
        self.enable();
    }

    fn enable(&mut self) {
        self.handle.set_visible(true);
        self.handle.on_enabled();
    }

    pub(crate) fn deactivate(&mut self) {
        self.handle.set_visible(false);
        self.state.is_active = false;
        self.state.cur_alive_time = 0.0;
        self.handle.on_disabled();
    }

    /// Push every dirty cached value to the handle and clear the flags
    pub fn flush(&mut self) {
        let dirty = std::mem::take(&mut self.state.dirty);
        let t = &self.state.transform;
        if dirty.position {
            self.handle.set_position(t.position);
        }
        if dirty.rotation {
            self.handle.set_rotation(t.rotation);
        }
        if dirty.alpha {
            self.handle.set_alpha(t.alpha);
        }
        if dirty.scale {
            self.handle.set_scale(t.scale);
        }
    }

    pub fn state(&self) -> &ParticleState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ParticleState {
        &mut self.state
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}
