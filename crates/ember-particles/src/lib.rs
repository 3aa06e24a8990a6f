//! Ember Particles - pooled, modifier-driven 2D particle system
//!
//! Emits host-owned drawables ("handles") at a fixed rate and drives them
//! through an ordered pipeline of modifiers:
//! - Time-accumulator emission with a population cap
//! - Arena + LIFO free list so handles are created once and reused
//! - Shape, alpha, scale, gravity, movement, rotation and custom modifiers
//! - Dirty-tracked transform cache flushed to the handle once per tick
//! - TOML effect files with named custom callables

pub mod config;
pub mod ease;
pub mod emission;
pub mod host;
pub mod modifiers;
pub mod rand;
pub mod recycler;
pub mod settings;
pub mod sprite;
pub mod system;
pub mod trig;

#[cfg(test)]
mod test_support;

pub use config::{CallbackRegistry, EffectConfig};
pub use ease::{EaseFn, EasePreset};
pub use emission::ParticleEmission;
pub use host::{Instantiator, ParticleContainer, ParticleHandle};
pub use modifiers::{
    AlphaModifier, CustomModifier, GravityModifier, Modifier, ModifierContext, ModifierId,
    MovementModifier, ParticleModifier, RotationModifier, ScaleModifier, ShapeModifier,
};
pub use rand::{ParticleRng, RandomSource};
pub use recycler::{ParticleRecycler, SpriteId};
pub use settings::{ProgressMode, Settings, ValueRange};
pub use sprite::{ParticleSprite, ParticleState, ParticleVariables};
pub use system::{ParticleSystem, ParticleSystemBuilder};
pub use trig::TrigCache;
