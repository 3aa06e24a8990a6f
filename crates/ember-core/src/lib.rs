//! Ember Core - Foundational types for the Ember particle engine
//!
//! This crate provides the core types that all other Ember crates depend on:
//! - `Vec2`, `Transform2D` - Planar spatial types
//! - Error types and Result alias

mod error;
mod types;

pub use error::{EmberError, Result};
pub use types::{Transform2D, Vec2};
