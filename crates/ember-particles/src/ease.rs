//! Ease functions for value-over-lifetime modifiers
//!
//! An ease receives `(progress, delta_time, current)` and returns the new
//! value. The presets ignore the last two arguments.

use std::rc::Rc;

/// Shared ease callable
pub type EaseFn = Rc<dyn Fn(f32, f32, f32) -> f32>;

/// Built-in ease curves, addressable by name from effect files
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EasePreset {
    LinearIn,
    LinearOut,
    QuadIn,
    QuadOut,
    SmoothStep,
    ConstantOne,
}

impl EasePreset {
    pub const NAMES: [&'static str; 6] = [
        "linear_in",
        "linear_out",
        "quad_in",
        "quad_out",
        "smooth_step",
        "constant_one",
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear_in" => Some(Self::LinearIn),
            "linear_out" => Some(Self::LinearOut),
            "quad_in" => Some(Self::QuadIn),
            "quad_out" => Some(Self::QuadOut),
            "smooth_step" => Some(Self::SmoothStep),
            "constant_one" => Some(Self::ConstantOne),
            _ => None,
        }
    }

    pub fn evaluate(self, t: f32) -> f32 {
        match self {
            Self::LinearIn => t,
            Self::LinearOut => 1.0 - t,
            Self::QuadIn => t * t,
            Self::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::ConstantOne => 1.0,
        }
    }

    pub fn to_fn(self) -> EaseFn {
        Rc::new(move |progress, _, _| self.evaluate(progress))
    }
}

/// `1 - progress`, the default alpha fade
pub fn linear_out() -> EaseFn {
    EasePreset::LinearOut.to_fn()
}

/// Always 1, leaving the multiplied base value untouched
pub fn constant_one() -> EaseFn {
    EasePreset::ConstantOne.to_fn()
}
