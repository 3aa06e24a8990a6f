//! Ember Runtime - Frame loop infrastructure
//!
//! Provides the pieces a host uses to drive simulations once per frame:
//! - `FrameClock`: measures or accepts delta time and dispatches it to
//!   registered tick actions
//! - `RuntimeSystem`: trait for systems ticked by the frame clock

mod clock;
mod system;

pub use clock::{FrameClock, TickHandle, MAX_FRAME_TIME};
pub use system::RuntimeSystem;
