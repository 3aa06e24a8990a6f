//! Host-side collaborators: the drawable handle, its container and factory

use ember_core::{Result, Vec2};

/// An opaque drawable owned by one particle sprite.
///
/// The setters are only called when the sprite's cached value changed since
/// the last flush. Lifecycle hooks default to no-ops.
pub trait ParticleHandle {
    fn set_visible(&mut self, visible: bool);
    fn set_position(&mut self, position: Vec2);
    /// Rotation in degrees
    fn set_rotation(&mut self, degrees: f32);
    fn set_alpha(&mut self, alpha: f32);
    fn set_scale(&mut self, scale: Vec2);

    /// Called exactly once, before the handle is used for the first time
    fn initialize(&mut self) {}

    /// Called once after the sprite wrapping this handle is created
    fn on_created(&mut self) {}

    /// Called whenever the sprite is (re)activated
    fn on_enabled(&mut self) {}

    /// Called whenever the sprite is retired to the pool
    fn on_disabled(&mut self) {}
}

/// The display container newly created handles are attached to
pub trait ParticleContainer<H> {
    fn add_child(&mut self, name: &str, handle: &mut H) -> Result<()>;
}

/// Zero-argument factory for new handles
pub trait Instantiator<H> {
    fn instantiate(&mut self) -> Result<H>;
}

impl<H, F> Instantiator<H> for F
where
    F: FnMut() -> Result<H>,
{
    fn instantiate(&mut self) -> Result<H> {
        self()
    }
}
