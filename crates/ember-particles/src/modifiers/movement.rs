use super::{ModifierContext, ParticleModifier};
use crate::rand::RandomSource;
use crate::settings::ValueRange;
use crate::sprite::ParticleState;
use ember_core::Vec2;
use std::rc::Rc;

/// User-supplied velocity picker, called once per spawned particle
pub type Mover = Rc<dyn Fn(&ParticleState, &mut dyn RandomSource) -> Vec2>;

enum VelocityPattern {
    Range { x: ValueRange, y: ValueRange },
    Random(ValueRange),
    Directional(ValueRange),
    Custom(Mover),
}

/// Gives each particle a velocity at spawn and integrates it every tick
pub struct MovementModifier {
    pattern: VelocityPattern,
}

impl Default for MovementModifier {
    fn default() -> Self {
        let mut movement = Self {
            pattern: VelocityPattern::Random(ValueRange::fixed(1.0)),
        };
        movement.set_move_range(0.0, 0.0, 1.0, 1.0);
        movement
    }
}

impl MovementModifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Independent uniform ranges per axis, in units per second
    pub fn set_move_range(&mut self, min_x: f32, max_x: f32, min_y: f32, max_y: f32) {
        self.pattern = VelocityPattern::Range {
            x: ValueRange::new(min_x, max_x),
            y: ValueRange::new(min_y, max_y),
        };
    }

    /// Every particle moves with exactly `(x, y)`
    pub fn set_move_constant(&mut self, x: f32, y: f32) {
        self.set_move_range(x, x, y, y);
    }

    /// A random direction on the unit circle with a speed in `[min, max]`
    pub fn set_move_random(&mut self, min_speed: f32, max_speed: impl Into<Option<f32>>) {
        self.pattern = VelocityPattern::Random(ValueRange::new(min_speed, max_speed));
    }

    /// Away from the shape origin the particle spawned around. Particles
    /// spawned exactly on the origin get a zero velocity.
    pub fn set_move_directional(&mut self, min_speed: f32, max_speed: impl Into<Option<f32>>) {
        self.pattern = VelocityPattern::Directional(ValueRange::new(min_speed, max_speed));
    }

    pub fn set_move_custom(
        &mut self,
        mover: impl Fn(&ParticleState, &mut dyn RandomSource) -> Vec2 + 'static,
    ) {
        self.set_move_shared(Rc::new(mover));
    }

    pub fn set_move_shared(&mut self, mover: Mover) {
        self.pattern = VelocityPattern::Custom(mover);
    }

    fn pick_velocity(&self, particle: &ParticleState, rng: &mut dyn RandomSource) -> Vec2 {
        match &self.pattern {
            VelocityPattern::Range { x, y } => Vec2::new(x.sample(rng), y.sample(rng)),
            VelocityPattern::Random(speed) => {
                let dir = rng.point_on_unit_circle();
                dir * speed.sample(rng)
            }
            VelocityPattern::Directional(speed) => {
                let away = particle.position() - particle.vars.origin_offset;
                away.normalized() * speed.sample(rng)
            }
            VelocityPattern::Custom(mover) => mover(particle, rng),
        }
    }
}

impl ParticleModifier for MovementModifier {
    fn on_create(&mut self, particle: &mut ParticleState, ctx: &mut ModifierContext<'_>) {
        particle.vars.velocity = self.pick_velocity(particle, ctx.rng);
    }

    fn on_tick(&mut self, particle: &mut ParticleState, delta_time: f32, _progress: f32) {
        let step = particle.vars.velocity * delta_time;
        particle.set_position(particle.position() + step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::ParticleRng;
    use crate::test_support::{fresh_state, ScriptedRng};
    use crate::trig::TrigCache;

    fn create(movement: &mut MovementModifier, particle: &mut ParticleState, rng: &mut dyn RandomSource) {
        let trig = TrigCache::new();
        let mut ctx = ModifierContext { rng, trig: &trig };
        movement.on_create(particle, &mut ctx);
    }

    #[test]
    fn default_moves_down_one_unit_per_second() {
        let mut movement = MovementModifier::new();
        let mut particle = fresh_state(1.0);
        create(&mut movement, &mut particle, &mut ParticleRng::new(1));
        assert_eq!(particle.vars.velocity, Vec2::new(0.0, 1.0));

        movement.on_tick(&mut particle, 0.5, 0.0);
        assert_eq!(particle.position(), Vec2::new(0.0, 0.5));
    }

    #[test]
    fn constant_velocity() {
        let mut movement = MovementModifier::new();
        movement.set_move_constant(-3.0, 2.0);
        let mut particle = fresh_state(1.0);
        create(&mut movement, &mut particle, &mut ParticleRng::new(2));
        assert_eq!(particle.vars.velocity, Vec2::new(-3.0, 2.0));
    }

    #[test]
    fn range_samples_each_axis() {
        let mut movement = MovementModifier::new();
        movement.set_move_range(0.0, 10.0, -4.0, 0.0);
        let mut particle = fresh_state(1.0);
        create(&mut movement, &mut particle, &mut ScriptedRng::new(&[0.5, 0.25]));
        assert_eq!(particle.vars.velocity, Vec2::new(5.0, -3.0));
    }

    #[test]
    fn random_direction_has_requested_speed() {
        let mut movement = MovementModifier::new();
        movement.set_move_random(3.0, None);
        let mut rng = ParticleRng::new(3);
        for _ in 0..100 {
            let mut particle = fresh_state(1.0);
            create(&mut movement, &mut particle, &mut rng);
            assert!((particle.vars.velocity.length() - 3.0).abs() < 1e-3);
        }
    }

    #[test]
    fn directional_points_away_from_origin() {
        let mut movement = MovementModifier::new();
        movement.set_move_directional(2.0, None);
        let mut particle = fresh_state(1.0);
        particle.vars.origin_offset = Vec2::new(10.0, 10.0);
        particle.set_position(Vec2::new(10.0, 14.0));
        create(&mut movement, &mut particle, &mut ParticleRng::new(4));
        assert_eq!(particle.vars.velocity, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn directional_at_origin_is_still() {
        let mut movement = MovementModifier::new();
        movement.set_move_directional(5.0, None);
        let mut particle = fresh_state(1.0);
        create(&mut movement, &mut particle, &mut ParticleRng::new(5));
        assert_eq!(particle.vars.velocity, Vec2::ZERO);
    }

    #[test]
    fn custom_mover_sees_particle() {
        let mut movement = MovementModifier::new();
        movement.set_move_custom(|p, _| p.position() * 2.0);
        let mut particle = fresh_state(1.0);
        particle.set_position(Vec2::new(1.0, -1.0));
        create(&mut movement, &mut particle, &mut ParticleRng::new(6));
        assert_eq!(particle.vars.velocity, Vec2::new(2.0, -2.0));
    }
}
