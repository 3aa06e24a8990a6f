//! Time-accumulator spawner and the list of active sprites

use crate::host::ParticleHandle;
use crate::rand::RandomSource;
use crate::recycler::{ParticleRecycler, SpriteFactory, SpriteId};
use crate::settings::{Settings, MIN_POSITIVE};
use crate::sprite::ParticleSprite;
use ember_core::Result;

pub const DEFAULT_EMISSION_RATE: f32 = 10.0;

/// Spawns particles at a fixed rate and keeps track of the live ones.
///
/// Elapsed time accumulates in a threshold; one particle is spawned for every
/// full emission interval it holds. When the population cap is reached the
/// pending intervals are dropped and only the remainder carries over.
pub struct ParticleEmission<H> {
    recycler: ParticleRecycler<H>,
    emission_rate: f32,
    emission_interval: f32,
    emit_threshold: f32,
    active: Vec<SpriteId>,
    cap_warned: bool,
}

impl<H: ParticleHandle> Default for ParticleEmission<H> {
    fn default() -> Self {
        Self {
            recycler: ParticleRecycler::new(),
            emission_rate: DEFAULT_EMISSION_RATE,
            emission_interval: 1.0 / DEFAULT_EMISSION_RATE,
            emit_threshold: 0.0,
            active: Vec::new(),
            cap_warned: false,
        }
    }
}

impl<H: ParticleHandle> ParticleEmission<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Particles per second, clamped to a tiny positive minimum
    pub fn set_emission_rate(&mut self, rate: f32) {
        self.emission_rate = rate.max(MIN_POSITIVE);
        self.emission_interval = 1.0 / self.emission_rate;
    }

    pub fn emission_rate(&self) -> f32 {
        self.emission_rate
    }

    /// Seconds between two spawns
    pub fn emission_interval(&self) -> f32 {
        self.emission_interval
    }

    /// Accumulated time not yet spent on spawns
    pub fn emit_threshold(&self) -> f32 {
        self.emit_threshold
    }

    /// Ids of the live sprites, oldest first
    pub fn active(&self) -> &[SpriteId] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn recycler(&self) -> &ParticleRecycler<H> {
        &self.recycler
    }

    /// Live sprite ids alongside mutable access to the sprites themselves
    pub(crate) fn split_mut(&mut self) -> (&[SpriteId], &mut ParticleRecycler<H>) {
        (&self.active, &mut self.recycler)
    }

    pub fn sprites(&self) -> impl Iterator<Item = &ParticleSprite<H>> + '_ {
        self.active.iter().map(|id| self.recycler.sprite(*id))
    }

    /// Spawn whatever the elapsed time allows, then age every live sprite.
    ///
    /// Ids of sprites spawned during this call are written to `spawned`. A
    /// host failure stops spawning for this tick but live sprites still age
    /// before the error is returned.
    pub fn update(
        &mut self,
        delta_time: f32,
        playing: bool,
        settings: &Settings,
        rng: &mut dyn RandomSource,
        factory: &mut SpriteFactory<'_, H>,
        spawned: &mut Vec<SpriteId>,
    ) -> Result<()> {
        spawned.clear();

        let result = if playing {
            self.emit(delta_time, settings, rng, factory, spawned)
        } else {
            Ok(())
        };

        for id in &self.active {
            self.recycler.sprite_mut(*id).state_mut().age(delta_time);
        }

        result
    }

    fn emit(
        &mut self,
        delta_time: f32,
        settings: &Settings,
        rng: &mut dyn RandomSource,
        factory: &mut SpriteFactory<'_, H>,
        spawned: &mut Vec<SpriteId>,
    ) -> Result<()> {
        self.emit_threshold += delta_time;

        while self.emit_threshold > self.emission_interval {
            let before = self.emit_threshold;
            self.emit_threshold -= self.emission_interval;

            // At extreme magnitudes the subtraction can round to a no-op
            if self.emit_threshold == before {
                self.emit_threshold %= self.emission_interval;
                break;
            }

            if self.active.len() >= settings.max_particles() {
                self.emit_threshold %= self.emission_interval;
                if !self.cap_warned {
                    self.cap_warned = true;
                    log::warn!(
                        "[particles] population cap of {} reached, dropping pending emissions",
                        settings.max_particles()
                    );
                }
                break;
            }

            let alive_time = settings.random_alive_time(rng);
            match self.recycler.acquire(alive_time, factory) {
                Ok(id) => {
                    self.active.push(id);
                    spawned.push(id);
                }
                Err(err) => {
                    // Spawns lost to the host are not retried next tick
                    self.emit_threshold %= self.emission_interval;
                    return Err(err);
                }
            }
        }

        Ok(())
    }

    /// Start a new playback run: the population cap warning may fire again
    pub(crate) fn begin_run(&mut self) {
        self.cap_warned = false;
    }

    #[cfg(test)]
    pub(crate) fn cap_warned(&self) -> bool {
        self.cap_warned
    }

    /// Retire every sprite that has lived its full alive time
    pub fn kill_expired(&mut self) {
        let recycler = &mut self.recycler;
        let mut index = self.active.len();
        while index > 0 {
            index -= 1;
            let id = self.active[index];
            if recycler.sprite(id).state().should_die() {
                recycler.release(id);
                self.active.remove(index);
            }
        }
    }

    /// Retire every live sprite at once
    pub fn clear_particles(&mut self) {
        for id in self.active.drain(..).rev() {
            self.recycler.release(id);
        }
        self.cap_warned = false;
    }
}
