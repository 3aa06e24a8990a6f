//! Runtime system trait

use ember_core::Result;

/// A system that can be ticked by a [`FrameClock`](crate::FrameClock)
///
/// Systems are updated synchronously once per frame with the frame's delta
/// time in seconds. No system may suspend or block inside `update`.
pub trait RuntimeSystem {
    /// Called once per frame with a non-negative delta time
    fn update(&mut self, dt: f64) -> Result<()>;

    /// Called when the host tears the system down
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
