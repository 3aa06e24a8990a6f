//! The particle system: clock, playback state and the modifier pipeline

use std::cell::RefCell;
use std::rc::Rc;

use ember_core::{EmberError, Result};
use ember_runtime::{FrameClock, RuntimeSystem, TickHandle};

use crate::emission::ParticleEmission;
use crate::host::{Instantiator, ParticleContainer, ParticleHandle};
use crate::modifiers::{Modifier, ModifierContext, ModifierId, ParticleModifier};
use crate::rand::{ParticleRng, RandomSource};
use crate::recycler::{SpriteFactory, SpriteId};
use crate::settings::Settings;
use crate::sprite::ParticleSprite;
use crate::trig::TrigCache;

/// Emits pooled sprites into a host container and drives them through the
/// modifier pipeline once per [`update`](ParticleSystem::update).
///
/// A tick runs in a fixed order: scale the delta by the speed setting, advance
/// the playback clock, spawn and age, run `on_create` for each new sprite,
/// run `on_tick` and flush every live sprite, then retire the expired ones.
/// [`Settings`] is always the first stage of both passes.
pub struct ParticleSystem<H> {
    container: Box<dyn ParticleContainer<H>>,
    instantiator: Box<dyn Instantiator<H>>,
    rng: Box<dyn RandomSource>,
    trig: Rc<TrigCache>,
    settings: Settings,
    emission: ParticleEmission<H>,
    modifiers: Vec<Modifier>,
    cur_time: f32,
    is_playing: bool,
    spawned: Vec<SpriteId>,
}

impl<H: ParticleHandle + 'static> ParticleSystem<H> {
    pub fn builder() -> ParticleSystemBuilder<H> {
        ParticleSystemBuilder::default()
    }

    /// A system with an entropy-seeded random source and the shared trig cache
    pub fn new<F>(container: impl ParticleContainer<H> + 'static, instantiator: F) -> Self
    where
        F: FnMut() -> Result<H> + 'static,
    {
        Self::from_parts(
            Box::new(container),
            Box::new(instantiator),
            Box::new(ParticleRng::from_entropy()),
            TrigCache::shared(),
        )
    }

    fn from_parts(
        container: Box<dyn ParticleContainer<H>>,
        instantiator: Box<dyn Instantiator<H>>,
        rng: Box<dyn RandomSource>,
        trig: Rc<TrigCache>,
    ) -> Self {
        Self {
            container,
            instantiator,
            rng,
            trig,
            settings: Settings::default(),
            emission: ParticleEmission::new(),
            modifiers: Vec::new(),
            cur_time: 0.0,
            is_playing: false,
            spawned: Vec::new(),
        }
    }

    /// Append a stage to the pipeline. Stages run in registration order.
    pub fn add_modifier(&mut self, modifier: impl Into<Modifier>) -> ModifierId {
        let modifier = modifier.into();
        log::debug!("[particles] added {} modifier", modifier.kind());
        self.modifiers.push(modifier);
        ModifierId(self.modifiers.len() - 1)
    }

    pub fn modifier(&self, id: ModifierId) -> Option<&Modifier> {
        self.modifiers.get(id.index())
    }

    pub fn modifier_mut(&mut self, id: ModifierId) -> Option<&mut Modifier> {
        self.modifiers.get_mut(id.index())
    }

    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> + '_ {
        self.modifiers.iter()
    }

    /// Start or resume emission. The playback clock is left as is.
    pub fn play(&mut self) {
        if !self.is_playing {
            log::debug!("[particles] play");
            self.emission.begin_run();
        }
        self.is_playing = true;
    }

    /// Stop emission and rewind the playback clock. Live sprites keep
    /// simulating until they expire.
    pub fn stop(&mut self) {
        if self.is_playing {
            log::debug!("[particles] stop at {:.3}s", self.cur_time);
        }
        self.is_playing = false;
        self.cur_time = 0.0;
    }

    /// Retire every live sprite to the pool immediately
    pub fn clear(&mut self) {
        self.emission.clear_particles();
    }

    /// Advance the system by `delta_time` seconds.
    ///
    /// Negative or non-finite deltas count as zero. When the host fails to
    /// create or attach a sprite, the rest of the tick still runs for the
    /// sprites that exist and the error is returned afterwards.
    pub fn update(&mut self, delta_time: f32) -> Result<()> {
        let delta_time = if delta_time.is_finite() {
            delta_time.max(0.0)
        } else {
            0.0
        };
        let dt = delta_time * self.settings.speed();

        self.advance_clock(dt);

        let mut spawned = std::mem::take(&mut self.spawned);
        let mut factory = SpriteFactory {
            container: self.container.as_mut(),
            instantiator: self.instantiator.as_mut(),
        };
        let emitted = self.emission.update(
            dt,
            self.is_playing,
            &self.settings,
            self.rng.as_mut(),
            &mut factory,
            &mut spawned,
        );

        let (active, recycler) = self.emission.split_mut();

        let mut ctx = ModifierContext {
            rng: self.rng.as_mut(),
            trig: &self.trig,
        };
        for id in &spawned {
            let state = recycler.sprite_mut(*id).state_mut();
            self.settings.on_create(state, &mut ctx);
            for modifier in &mut self.modifiers {
                modifier.on_create(state, &mut ctx);
            }
        }

        for id in active {
            let sprite = recycler.sprite_mut(*id);
            let progress = self.settings.progress(sprite.state());
            let state = sprite.state_mut();
            self.settings.on_tick(state, dt, progress);
            for modifier in &mut self.modifiers {
                modifier.on_tick(state, dt, progress);
            }
            sprite.flush();
        }

        self.emission.kill_expired();
        self.spawned = spawned;

        emitted
    }

    fn advance_clock(&mut self, dt: f32) {
        if !self.is_playing {
            return;
        }
        self.cur_time += dt;
        let duration = self.settings.duration();
        if self.cur_time >= duration {
            if self.settings.is_looping() {
                self.cur_time %= duration;
                log::debug!("[particles] loop wrapped");
            } else {
                self.stop();
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Seconds into the current playback cycle
    pub fn cur_time(&self) -> f32 {
        self.cur_time
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn emission(&self) -> &ParticleEmission<H> {
        &self.emission
    }

    pub fn emission_mut(&mut self) -> &mut ParticleEmission<H> {
        &mut self.emission
    }

    pub fn active_count(&self) -> usize {
        self.emission.active_count()
    }

    pub fn pool_size(&self) -> usize {
        self.emission.recycler().pool_size()
    }

    pub fn total_created(&self) -> usize {
        self.emission.recycler().total_created()
    }

    /// Live sprites, oldest first
    pub fn sprites(&self) -> impl Iterator<Item = &ParticleSprite<H>> + '_ {
        self.emission.sprites()
    }

    pub fn container(&self) -> &dyn ParticleContainer<H> {
        self.container.as_ref()
    }

    pub fn container_mut(&mut self) -> &mut dyn ParticleContainer<H> {
        self.container.as_mut()
    }

    /// Drive a shared system from `clock`. The clock holds a weak reference,
    /// so the action goes inert once the system is dropped.
    pub fn attach_to_clock(system: &Rc<RefCell<Self>>, clock: &mut FrameClock) -> TickHandle {
        clock.register_system(system)
    }
}

impl<H: ParticleHandle + 'static> RuntimeSystem for ParticleSystem<H> {
    fn update(&mut self, dt: f64) -> Result<()> {
        ParticleSystem::update(self, dt as f32)
    }

    fn shutdown(&mut self) -> Result<()> {
        self.stop();
        self.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "particles"
    }
}

/// Collects the host collaborators a [`ParticleSystem`] needs.
///
/// Container and instantiator are required. The random source defaults to
/// an entropy-seeded [`ParticleRng`] and the trig cache to
/// [`TrigCache::shared`].
pub struct ParticleSystemBuilder<H> {
    container: Option<Box<dyn ParticleContainer<H>>>,
    instantiator: Option<Box<dyn Instantiator<H>>>,
    rng: Option<Box<dyn RandomSource>>,
    trig: Option<Rc<TrigCache>>,
}

impl<H> Default for ParticleSystemBuilder<H> {
    fn default() -> Self {
        Self {
            container: None,
            instantiator: None,
            rng: None,
            trig: None,
        }
    }
}

impl<H: ParticleHandle + 'static> ParticleSystemBuilder<H> {
    pub fn container(mut self, container: impl ParticleContainer<H> + 'static) -> Self {
        self.container = Some(Box::new(container));
        self
    }

    pub fn instantiator<F>(mut self, instantiator: F) -> Self
    where
        F: FnMut() -> Result<H> + 'static,
    {
        self.instantiator = Some(Box::new(instantiator));
        self
    }

    /// Use a hand-written [`Instantiator`] instead of a closure
    pub fn instantiator_object(mut self, instantiator: Box<dyn Instantiator<H>>) -> Self {
        self.instantiator = Some(instantiator);
        self
    }

    pub fn random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Shorthand for a deterministic [`ParticleRng`]
    pub fn seed(self, seed: u64) -> Self {
        self.random_source(ParticleRng::new(seed))
    }

    pub fn trig_cache(mut self, trig: Rc<TrigCache>) -> Self {
        self.trig = Some(trig);
        self
    }

    pub fn build(self) -> Result<ParticleSystem<H>> {
        let container = self
            .container
            .ok_or(EmberError::MissingCollaborator("container"))?;
        let instantiator = self
            .instantiator
            .ok_or(EmberError::MissingCollaborator("instantiator"))?;
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(ParticleRng::from_entropy()));
        let trig = self.trig.unwrap_or_else(TrigCache::shared);

        log::info!("[particles] system built");
        Ok(ParticleSystem::from_parts(container, instantiator, rng, trig))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::{CustomModifier, GravityModifier, MovementModifier};
    use crate::settings::ProgressMode;
    use crate::test_support::{fake_system, FakeHandle, RecordingContainer, RejectingContainer};
    use ember_core::Vec2;
    use proptest::prelude::*;

    #[test]
    fn build_requires_collaborators() {
        let err = ParticleSystem::<FakeHandle>::builder()
            .instantiator(|| Ok(FakeHandle::default()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, EmberError::MissingCollaborator("container")));
        assert!(err.is_configuration());

        let err = ParticleSystem::<FakeHandle>::builder()
            .container(RecordingContainer::default())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, EmberError::MissingCollaborator("instantiator")));
    }

    #[test]
    fn new_system_is_idle() {
        let mut system = ParticleSystem::new(RecordingContainer::default(), || {
            Ok(FakeHandle::default())
        });
        assert!(!system.is_playing());
        system.update(1.0).unwrap();
        assert_eq!(system.active_count(), 0);
        assert_eq!(system.total_created(), 0);
    }

    #[test]
    fn cap_limits_a_large_burst() {
        let mut system = fake_system(1);
        system.settings_mut().set_max_particles(5);
        system.settings_mut().set_alive_time(10.0, None);
        system.emission_mut().set_emission_rate(1000.0);
        system.play();
        system.update(1.0).unwrap();

        assert_eq!(system.active_count(), 5);
        assert_eq!(system.total_created(), 5);
        let emission = system.emission();
        assert!(emission.emit_threshold() >= 0.0);
        assert!(emission.emit_threshold() < emission.emission_interval());
    }

    #[test]
    fn cap_warning_rearms_on_each_run() {
        let mut system = fake_system(1);
        system.settings_mut().set_max_particles(2);
        system.settings_mut().set_alive_time(10.0, None);
        system.emission_mut().set_emission_rate(100.0);
        system.play();
        system.update(0.5).unwrap();
        assert!(system.emission().cap_warned());

        // Resuming an ongoing run keeps the warning silenced
        system.play();
        assert!(system.emission().cap_warned());

        system.stop();
        system.play();
        assert!(!system.emission().cap_warned());
        system.update(0.5).unwrap();
        assert!(system.emission().cap_warned());
    }

    #[test]
    fn shutdown_stops_and_clears() {
        let mut system = fake_system(4);
        system.settings_mut().set_alive_time(10.0, None);
        system.play();
        system.update(0.5).unwrap();
        assert!(system.active_count() > 0);
        let created = system.total_created();

        RuntimeSystem::shutdown(&mut system).unwrap();
        assert!(!system.is_playing());
        assert_eq!(system.cur_time(), 0.0);
        assert_eq!(system.active_count(), 0);
        assert_eq!(system.pool_size(), created);

        system.update(1.0).unwrap();
        assert_eq!(system.active_count(), 0);
    }

    #[test]
    fn expired_sprite_returns_to_pool() {
        let mut system = fake_system(2);
        system.settings_mut().set_alive_time(2.0, None);
        system.emission_mut().set_emission_rate(1.0);
        system.play();

        system.update(1.5).unwrap();
        assert_eq!(system.active_count(), 1);
        system.stop();

        system.update(0.25).unwrap();
        assert_eq!(system.active_count(), 1);
        assert_eq!(system.pool_size(), 0);

        system.update(0.25).unwrap();
        assert_eq!(system.active_count(), 0);
        assert_eq!(system.pool_size(), 1);
        assert_eq!(system.total_created(), 1);
    }

    #[test]
    fn pooled_sprite_is_reused() {
        let mut system = fake_system(3);
        system.settings_mut().set_alive_time(10.0, None);
        system.emission_mut().set_emission_rate(1.0);
        system.play();

        system.update(1.25).unwrap();
        system.clear();
        assert_eq!(system.pool_size(), 1);

        system.update(1.0).unwrap();
        assert_eq!(system.active_count(), 1);
        assert_eq!(system.pool_size(), 0);
        assert_eq!(system.total_created(), 1);

        let sprite = system.sprites().next().unwrap();
        assert_eq!(sprite.state().cur_alive_time(), 1.0);
        let handle = sprite.handle();
        assert_eq!(handle.enabled, 2);
        assert_eq!(handle.disabled, 1);
        assert_eq!(handle.initialized, 1);
    }

    #[test]
    fn non_looping_run_stops_once() {
        let mut system = fake_system(4);
        system.settings_mut().set_duration(3.0);
        system.settings_mut().set_looping(false);
        system.settings_mut().set_alive_time(100.0, None);
        system.play();

        system.update(1.0).unwrap();
        system.update(1.0).unwrap();
        assert!(system.is_playing());
        let before = system.active_count();
        assert!(before > 0);

        system.update(1.0).unwrap();
        assert!(!system.is_playing());
        assert_eq!(system.cur_time(), 0.0);
        assert_eq!(system.active_count(), before);

        let age = system.sprites().next().unwrap().state().cur_alive_time();
        system.update(1.0).unwrap();
        assert_eq!(system.active_count(), before);
        let later = system.sprites().next().unwrap().state().cur_alive_time();
        assert!((later - age - 1.0).abs() < 1e-5);
    }

    #[test]
    fn looping_clock_wraps() {
        let mut system = fake_system(5);
        system.settings_mut().set_duration(1.0);
        system.play();
        system.update(0.75).unwrap();
        system.update(0.5).unwrap();
        assert!(system.is_playing());
        assert!((system.cur_time() - 0.25).abs() < 1e-6);

        system.update(3.5).unwrap();
        assert!(system.cur_time() < 1.0);
    }

    #[test]
    fn play_keeps_clock_and_stop_rewinds() {
        let mut system = fake_system(6);
        system.play();
        system.update(0.5).unwrap();
        system.play();
        assert_eq!(system.cur_time(), 0.5);
        system.stop();
        assert_eq!(system.cur_time(), 0.0);
    }

    #[test]
    fn speed_scales_delta_time() {
        let mut system = fake_system(7);
        system.settings_mut().set_speed(2.0);
        system.play();
        system.update(0.5).unwrap();
        assert_eq!(system.cur_time(), 1.0);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut system = fake_system(8);
        system.play();
        system.update(-1.0).unwrap();
        system.update(f32::NAN).unwrap();
        assert_eq!(system.cur_time(), 0.0);
        assert_eq!(system.active_count(), 0);
    }

    #[test]
    fn clear_retires_everything() {
        let mut system = fake_system(9);
        system.emission_mut().set_emission_rate(100.0);
        system.play();
        system.update(0.5).unwrap();
        let created = system.total_created();

        system.clear();
        assert_eq!(system.active_count(), 0);
        assert_eq!(system.pool_size(), created);
    }

    #[test]
    fn creation_runs_before_ticks_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut system = fake_system(10);
        system.settings_mut().set_start_rotation(45.0, None);
        system.emission_mut().set_emission_rate(10.0);

        for label in ["a", "b"] {
            let create_log = log.clone();
            let tick_log = log.clone();
            system.add_modifier(
                CustomModifier::new()
                    .with_on_create(move |p, _| {
                        assert_eq!(p.rotation(), 45.0);
                        create_log.borrow_mut().push(format!("create {label}"));
                    })
                    .with_on_tick(move |_, _, _| tick_log.borrow_mut().push(format!("tick {label}"))),
            );
        }

        system.play();
        system.update(0.25).unwrap();
        assert_eq!(system.active_count(), 2);
        assert_eq!(
            *log.borrow(),
            vec![
                "create a", "create b", "create a", "create b", "tick a", "tick b", "tick a",
                "tick b",
            ]
        );
    }

    #[test]
    fn ticks_flush_to_handles() {
        let mut system = fake_system(11);
        system.emission_mut().set_emission_rate(10.0);
        let mut movement = MovementModifier::new();
        movement.set_move_constant(10.0, 0.0);
        system.add_modifier(movement);
        system.play();
        system.update(0.15).unwrap();

        let sprite = system.sprites().next().unwrap();
        assert!(!sprite.state().is_dirty());
        assert_eq!(sprite.handle().position, sprite.state().position());
        assert!((sprite.handle().position.x - 1.5).abs() < 1e-5);
        // Default alpha fade is not registered, so alpha stays at 1
        assert_eq!(sprite.handle().alpha, 1.0);
        assert_eq!(sprite.handle().scale, Vec2::ONE);
    }

    #[test]
    fn modifiers_are_addressable() {
        let mut system = fake_system(12);
        let id = system.add_modifier(GravityModifier::default());
        system
            .modifier_mut(id)
            .and_then(Modifier::as_gravity_mut)
            .unwrap()
            .set_gravity(1.0);
        assert_eq!(system.modifier(id).unwrap().as_gravity().unwrap().gravity(), 1.0);
        assert_eq!(system.modifiers().count(), 1);
    }

    #[test]
    fn container_sees_named_children() {
        let container = RecordingContainer::default();
        let children = container.children.clone();
        let mut system = ParticleSystem::<FakeHandle>::builder()
            .container(container)
            .instantiator(|| Ok(FakeHandle::default()))
            .seed(13)
            .build()
            .unwrap();
        system.emission_mut().set_emission_rate(10.0);
        system.play();
        system.update(0.25).unwrap();

        assert_eq!(*children.borrow(), vec!["particleSprite0", "particleSprite1"]);
    }

    #[test]
    fn host_failure_is_reported_after_the_tick() {
        let mut system = ParticleSystem::<FakeHandle>::builder()
            .container(RejectingContainer)
            .instantiator(|| Ok(FakeHandle::default()))
            .seed(14)
            .build()
            .unwrap();
        system.play();
        let err = system.update(0.5).unwrap_err();
        assert!(matches!(err, EmberError::Container(_)));
        assert!(system.is_playing());
        assert_eq!(system.active_count(), 0);
    }

    #[test]
    fn normalized_progress_reaches_one_at_death() {
        let mut system = fake_system(15);
        system.settings_mut().set_progress_mode(ProgressMode::Normalized);
        system.settings_mut().set_alive_time(4.0, None);
        system.emission_mut().set_emission_rate(1.0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        system.add_modifier(CustomModifier::new().with_on_tick(move |_, _, progress| {
            sink.borrow_mut().push(progress)
        }));
        system.play();
        system.update(1.5).unwrap();
        system.stop();
        system.update(2.5).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!((seen[0] - 0.375).abs() < 1e-6);
        assert_eq!(seen[1], 1.0);
        assert_eq!(system.active_count(), 0);
    }

    #[test]
    fn clock_attachment_goes_inert_after_drop() {
        let system = Rc::new(RefCell::new(fake_system(16)));
        system.borrow_mut().play();

        let mut clock = FrameClock::new();
        let handle = ParticleSystem::attach_to_clock(&system, &mut clock);
        clock.advance(0.5);
        assert_eq!(system.borrow().cur_time(), 0.5);

        drop(system);
        clock.advance(0.5);
        assert!(clock.unregister(handle));
    }

    proptest! {
        #[test]
        fn population_never_exceeds_cap(
            cap in 0usize..40,
            rate in 1.0f32..3000.0,
            alive in 0.0f32..2.0,
            steps in prop::collection::vec(0.0f32..0.3, 1..40),
        ) {
            let mut system = fake_system(17);
            system.settings_mut().set_max_particles(cap);
            system.settings_mut().set_alive_time(alive, None);
            system.emission_mut().set_emission_rate(rate);
            system.play();
            for dt in steps {
                system.update(dt).unwrap();
                prop_assert!(system.active_count() <= cap);
            }
        }

        #[test]
        fn sprites_are_either_live_or_pooled(
            rate in 1.0f32..500.0,
            alive_min in 0.0f32..1.0,
            alive_spread in 0.0f32..1.0,
            steps in prop::collection::vec(0.0f32..0.2, 1..60),
        ) {
            let mut system = fake_system(18);
            system.settings_mut().set_alive_time(alive_min, alive_min + alive_spread);
            system.emission_mut().set_emission_rate(rate);
            system.play();
            for dt in steps {
                system.update(dt).unwrap();
                prop_assert_eq!(
                    system.active_count() + system.pool_size(),
                    system.total_created()
                );
            }
            system.clear();
            prop_assert_eq!(system.pool_size(), system.total_created());
        }

        #[test]
        fn emission_matches_rate(
            rate in 1.0f32..100.0,
            dt in 0.01f32..0.1,
            ticks in 1usize..60,
        ) {
            let mut system = fake_system(19);
            system.settings_mut().set_max_particles(100_000);
            system.settings_mut().set_alive_time(1000.0, None);
            system.settings_mut().set_duration(1000.0);
            system.emission_mut().set_emission_rate(rate);
            system.play();

            let mut elapsed = 0.0f32;
            for _ in 0..ticks {
                system.update(dt).unwrap();
                elapsed += dt;
            }
            let expected = rate * elapsed;
            let spawned = system.total_created() as f32;
            prop_assert!((spawned - expected).abs() <= 1.0 + 1e-3, "{spawned} vs {expected}");
        }
    }
}
