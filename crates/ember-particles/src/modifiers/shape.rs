//! Spawn-position patterns

use super::{ModifierContext, ParticleModifier};
use crate::rand::RandomSource;
use crate::sprite::ParticleState;
use crate::trig::TrigCache;
use ember_core::Vec2;
use std::rc::Rc;

/// User-supplied spawn pattern returning an offset from the shape origin
pub type Shaper = Rc<dyn Fn(&mut dyn RandomSource) -> Vec2>;

enum ShapePattern {
    Point,
    Circle { radius: f32, on_edge: bool },
    Line { half_width: f32, vertical: bool },
    Rectangle { half_width: f32, half_height: f32, on_edge: bool },
    Custom(Shaper),
}

/// Places each new particle according to a pattern, optional rotation and
/// a fixed offset
pub struct ShapeModifier {
    pattern: ShapePattern,
    rotatable: bool,
    offset: Vec2,
    rotation: u16,
}

impl Default for ShapeModifier {
    fn default() -> Self {
        Self {
            pattern: ShapePattern::Point,
            rotatable: false,
            offset: Vec2::ZERO,
            rotation: 0,
        }
    }
}

impl ShapeModifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn every particle at the origin
    pub fn set_shape_none(&mut self) {
        self.pattern = ShapePattern::Point;
        self.rotatable = false;
    }

    /// Spawn on the circle's edge or anywhere inside it
    pub fn set_shape_circle(&mut self, radius: f32, on_edge: bool) {
        self.pattern = ShapePattern::Circle { radius, on_edge };
        self.rotatable = false;
    }

    /// Spawn along a line of `width` centered on the origin
    pub fn set_shape_line(&mut self, width: f32, vertical: bool) {
        self.pattern = ShapePattern::Line {
            half_width: width / 2.0,
            vertical,
        };
        self.rotatable = true;
    }

    /// Spawn on the rectangle's edges or anywhere inside it. Edge spawns pick
    /// a horizontal edge with probability `width / (width + height)`.
    pub fn set_shape_rectangle(&mut self, width: f32, height: f32, on_edge: bool) {
        self.pattern = ShapePattern::Rectangle {
            half_width: width / 2.0,
            half_height: height / 2.0,
            on_edge,
        };
        self.rotatable = true;
    }

    pub fn set_shape_custom(
        &mut self,
        shaper: impl Fn(&mut dyn RandomSource) -> Vec2 + 'static,
        rotatable: bool,
    ) {
        self.set_shape_shared(Rc::new(shaper), rotatable);
    }

    /// Same as [`set_shape_custom`](Self::set_shape_custom) for an already
    /// shared shaper
    pub fn set_shape_shared(&mut self, shaper: Shaper, rotatable: bool) {
        self.pattern = ShapePattern::Custom(shaper);
        self.rotatable = rotatable;
    }

    pub fn set_offset(&mut self, x: f32, y: f32) {
        self.offset = Vec2::new(x, y);
    }

    /// Pattern rotation in degrees, stored as a whole degree in [0, 360)
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = TrigCache::normalize_degrees(degrees);
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    pub fn is_rotatable(&self) -> bool {
        self.rotatable
    }

    /// Draw one offset from the current pattern, before rotation
    pub fn sample(&self, rng: &mut dyn RandomSource) -> Vec2 {
        match &self.pattern {
            ShapePattern::Point => Vec2::ZERO,
            ShapePattern::Circle { radius, on_edge } => {
                let unit = if *on_edge {
                    rng.point_on_unit_circle()
                } else {
                    rng.point_inside_unit_circle()
                };
                unit * *radius
            }
            ShapePattern::Line {
                half_width,
                vertical,
            } => {
                let along = rng.range(-half_width, *half_width);
                if *vertical {
                    Vec2::new(0.0, along)
                } else {
                    Vec2::new(along, 0.0)
                }
            }
            ShapePattern::Rectangle {
                half_width: w,
                half_height: h,
                on_edge,
            } => {
                if !*on_edge {
                    return Vec2::new(rng.range(-w, *w), rng.range(-h, *h));
                }
                let width_ratio = w / (w + h);
                if rng.next_f32() < width_ratio {
                    Vec2::new(rng.range(-w, *w), rng.sign() * h)
                } else {
                    Vec2::new(rng.sign() * w, rng.range(-h, *h))
                }
            }
            ShapePattern::Custom(shaper) => shaper(rng),
        }
    }
}

impl ParticleModifier for ShapeModifier {
    fn on_create(&mut self, particle: &mut ParticleState, ctx: &mut ModifierContext<'_>) {
        let mut pos = self.sample(ctx.rng);
        if self.rotatable {
            pos = ctx.trig.rotate(pos, self.rotation);
        }
        particle.vars.origin_offset = self.offset;
        particle.set_position(pos + self.offset);
    }

    fn on_tick(&mut self, _particle: &mut ParticleState, _delta_time: f32, _progress: f32) {}
}
