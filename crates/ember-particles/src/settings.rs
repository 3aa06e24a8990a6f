//! Global particle settings, always the first stage of the modifier pipeline

use crate::modifiers::{ModifierContext, ParticleModifier};
use crate::rand::RandomSource;
use crate::sprite::ParticleState;
use ember_core::Vec2;

/// Smallest duration and speed accepted; keeps divisions and wraps finite
pub const MIN_POSITIVE: f32 = 0.000_000_1;

/// An inclusive `[min, max]` sampling range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Range taken as given. An omitted max collapses the range to `min`.
    pub fn new(min: f32, max: impl Into<Option<f32>>) -> Self {
        Self {
            min,
            max: max.into().unwrap_or(min),
        }
    }

    /// Range with `min` clamped to zero and `max` clamped to at least `min`
    pub fn non_negative(min: f32, max: impl Into<Option<f32>>) -> Self {
        let min = min.max(0.0);
        let max = match max.into() {
            Some(max) => max.max(min),
            None => min,
        };
        Self { min, max }
    }

    pub fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn sample(&self, rng: &mut dyn RandomSource) -> f32 {
        rng.range(self.min, self.max)
    }
}

/// How the per-tick `progress` handed to ease functions is derived
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressMode {
    /// Elapsed alive seconds clamped to [0, 1], regardless of the particle's
    /// max alive time. Eases therefore run over the first second of life.
    #[default]
    ElapsedSeconds,
    /// Elapsed alive time divided by max alive time, clamped to [0, 1]
    Normalized,
}

impl ProgressMode {
    pub const NAMES: [&'static str; 2] = ["elapsed_seconds", "normalized"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "elapsed_seconds" => Some(Self::ElapsedSeconds),
            "normalized" => Some(Self::Normalized),
            _ => None,
        }
    }
}

/// Duration, looping, speed, population cap and the spawn-time ranges every
/// particle draws from
#[derive(Clone, Debug)]
pub struct Settings {
    max_particles: usize,
    duration: f32,
    looping: bool,
    speed: f32,
    alive_time: ValueRange,
    start_rotation: ValueRange,
    start_scale: ValueRange,
    progress_mode: ProgressMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_particles: 1000,
            duration: 5.0,
            looping: true,
            speed: 1.0,
            alive_time: ValueRange::fixed(1.0),
            start_rotation: ValueRange::fixed(0.0),
            start_scale: ValueRange::fixed(1.0),
            progress_mode: ProgressMode::ElapsedSeconds,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Max number of particles alive at once
    pub fn set_max_particles(&mut self, max_particles: usize) {
        self.max_particles = max_particles;
    }

    /// Emission duration in seconds; wraps when looping
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(MIN_POSITIVE);
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Simulation speed multiplier applied to every delta time
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(MIN_POSITIVE);
    }

    /// Alive time range in seconds. `set_alive_time(5.0, None)` means exactly 5.
    pub fn set_alive_time(&mut self, min: f32, max: impl Into<Option<f32>>) {
        self.alive_time = ValueRange::non_negative(min, max);
    }

    /// Starting rotation range in degrees
    pub fn set_start_rotation(&mut self, min: f32, max: impl Into<Option<f32>>) {
        self.start_rotation = ValueRange::non_negative(min, max);
    }

    /// Starting uniform scale range
    pub fn set_start_scale(&mut self, min: f32, max: impl Into<Option<f32>>) {
        self.start_scale = ValueRange::non_negative(min, max);
    }

    pub fn set_progress_mode(&mut self, mode: ProgressMode) {
        self.progress_mode = mode;
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn alive_time(&self) -> ValueRange {
        self.alive_time
    }

    pub fn start_rotation(&self) -> ValueRange {
        self.start_rotation
    }

    pub fn start_scale(&self) -> ValueRange {
        self.start_scale
    }

    pub fn progress_mode(&self) -> ProgressMode {
        self.progress_mode
    }

    pub fn random_alive_time(&self, rng: &mut dyn RandomSource) -> f32 {
        self.alive_time.sample(rng)
    }

    /// The `progress` value fed to every modifier's `on_tick` for `particle`
    pub fn progress(&self, particle: &ParticleState) -> f32 {
        match self.progress_mode {
            ProgressMode::ElapsedSeconds => particle.cur_alive_time().clamp(0.0, 1.0),
            ProgressMode::Normalized => {
                if particle.max_alive_time() <= 0.0 {
                    1.0
                } else {
                    (particle.cur_alive_time() / particle.max_alive_time()).clamp(0.0, 1.0)
                }
            }
        }
    }
}

impl ParticleModifier for Settings {
    fn on_create(&mut self, particle: &mut ParticleState, ctx: &mut ModifierContext<'_>) {
        particle.set_rotation(self.start_rotation.sample(ctx.rng));

        let scale = self.start_scale.sample(ctx.rng);
        particle.set_scale(Vec2::splat(scale));
        particle.vars.initial_scale = scale;
    }

    fn on_tick(&mut self, _particle: &mut ParticleState, _delta_time: f32, _progress: f32) {}
}
