//! The modifier pipeline: rules that shape each particle at birth and per tick
//!
//! Every modifier implements both hooks of [`ParticleModifier`]; modifiers
//! without creation or tick behavior implement the hook as an explicit no-op.
//! The system runs [`Settings`](crate::Settings) first, then every registered
//! [`Modifier`] in registration order.

mod alpha;
mod custom;
mod gravity;
mod movement;
mod rotation;
mod scale;
mod shape;

pub use alpha::AlphaModifier;
pub use custom::{CreateHook, CustomModifier, TickHook};
pub use gravity::GravityModifier;
pub use movement::{MovementModifier, Mover};
pub use rotation::RotationModifier;
pub use scale::ScaleModifier;
pub use shape::{ShapeModifier, Shaper};

use crate::rand::RandomSource;
use crate::sprite::ParticleState;
use crate::trig::TrigCache;

/// Services available while a particle is being created
pub struct ModifierContext<'a> {
    pub rng: &'a mut dyn RandomSource,
    pub trig: &'a TrigCache,
}

/// The two capabilities every modifier provides
pub trait ParticleModifier {
    /// Called once for each newly spawned particle
    fn on_create(&mut self, particle: &mut ParticleState, ctx: &mut ModifierContext<'_>);

    /// Called every tick for each active particle
    fn on_tick(&mut self, particle: &mut ParticleState, delta_time: f32, progress: f32);
}

/// Position of a modifier in its system's pipeline
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ModifierId(pub(crate) usize);

impl ModifierId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The closed set of pipeline stages a system can hold
pub enum Modifier {
    Shape(ShapeModifier),
    Alpha(AlphaModifier),
    Scale(ScaleModifier),
    Gravity(GravityModifier),
    Movement(MovementModifier),
    Rotation(RotationModifier),
    Custom(CustomModifier),
}

impl Modifier {
    pub fn kind(&self) -> &'static str {
        match self {
            Modifier::Shape(_) => "shape",
            Modifier::Alpha(_) => "alpha",
            Modifier::Scale(_) => "scale",
            Modifier::Gravity(_) => "gravity",
            Modifier::Movement(_) => "movement",
            Modifier::Rotation(_) => "rotation",
            Modifier::Custom(_) => "custom",
        }
    }

    fn as_dyn(&mut self) -> &mut dyn ParticleModifier {
        match self {
            Modifier::Shape(m) => m,
            Modifier::Alpha(m) => m,
            Modifier::Scale(m) => m,
            Modifier::Gravity(m) => m,
            Modifier::Movement(m) => m,
            Modifier::Rotation(m) => m,
            Modifier::Custom(m) => m,
        }
    }
}

impl ParticleModifier for Modifier {
    fn on_create(&mut self, particle: &mut ParticleState, ctx: &mut ModifierContext<'_>) {
        self.as_dyn().on_create(particle, ctx);
    }

    fn on_tick(&mut self, particle: &mut ParticleState, delta_time: f32, progress: f32) {
        self.as_dyn().on_tick(particle, delta_time, progress);
    }
}

macro_rules! modifier_variant {
    ($variant:ident, $ty:ty, $as_ref:ident, $as_mut:ident) => {
        impl From<$ty> for Modifier {
            fn from(m: $ty) -> Self {
                Modifier::$variant(m)
            }
        }

        impl Modifier {
            pub fn $as_ref(&self) -> Option<&$ty> {
                match self {
                    Modifier::$variant(m) => Some(m),
                    _ => None,
                }
            }

            pub fn $as_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    Modifier::$variant(m) => Some(m),
                    _ => None,
                }
            }
        }
    };
}

modifier_variant!(Shape, ShapeModifier, as_shape, as_shape_mut);
modifier_variant!(Alpha, AlphaModifier, as_alpha, as_alpha_mut);
modifier_variant!(Scale, ScaleModifier, as_scale, as_scale_mut);
modifier_variant!(Gravity, GravityModifier, as_gravity, as_gravity_mut);
modifier_variant!(Movement, MovementModifier, as_movement, as_movement_mut);
modifier_variant!(Rotation, RotationModifier, as_rotation, as_rotation_mut);
modifier_variant!(Custom, CustomModifier, as_custom, as_custom_mut);
