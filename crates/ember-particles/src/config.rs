//! TOML effect files: settings, emission rate and a modifier list
//!
//! Custom callables cannot live in a text file, so effect files name them and
//! a [`CallbackRegistry`] supplied by the host resolves the names.

use std::collections::HashMap;
use std::rc::Rc;

use ember_core::{EmberError, Result, Vec2};
use serde::Deserialize;

use crate::ease::{EaseFn, EasePreset};
use crate::host::ParticleHandle;
use crate::modifiers::{
    AlphaModifier, CreateHook, CustomModifier, GravityModifier, Modifier, MovementModifier, Mover,
    RotationModifier, ScaleModifier, ShapeModifier, Shaper, TickHook,
};
use crate::rand::RandomSource;
use crate::settings::ProgressMode;
use crate::sprite::ParticleState;
use crate::system::ParticleSystem;

/// A whole effect as read from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub settings: SettingsConfig,
    pub emission: EmissionConfig,
    pub modifiers: Vec<ModifierConfig>,
}

/// `[settings]`. Absent keys keep the system's current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub max_particles: Option<usize>,
    pub duration: Option<f32>,
    pub looping: Option<bool>,
    pub speed: Option<f32>,
    pub alive_time: Option<RangeValue>,
    pub start_rotation: Option<RangeValue>,
    pub start_scale: Option<RangeValue>,
    pub progress: Option<String>,
}

/// `[emission]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmissionConfig {
    pub rate: Option<f32>,
}

/// A single number or a `[min, max]` pair
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RangeValue {
    Single(f32),
    Pair([f32; 2]),
}

impl RangeValue {
    pub fn min(&self) -> f32 {
        match self {
            RangeValue::Single(v) => *v,
            RangeValue::Pair([min, _]) => *min,
        }
    }

    /// `None` for a single value, which callers treat as max == min
    pub fn max(&self) -> Option<f32> {
        match self {
            RangeValue::Single(_) => None,
            RangeValue::Pair([_, max]) => Some(*max),
        }
    }
}

/// A preset name or `{ custom = "name" }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EaseConfig {
    Named(String),
    Custom { custom: String },
}

/// One `[[modifiers]]` entry, selected by its `kind` key
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModifierConfig {
    Shape(ShapeConfig),
    Alpha(AlphaConfig),
    Scale(ScaleConfig),
    Gravity(GravityConfig),
    Movement(MovementConfig),
    Rotation(RotationConfig),
    Custom(CustomConfig),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub pattern: String,
    pub radius: f32,
    pub on_edge: bool,
    pub width: f32,
    pub height: f32,
    pub vertical: bool,
    pub custom: Option<String>,
    pub rotatable: bool,
    pub rotation: f32,
    pub offset: Vec2,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            pattern: "none".to_string(),
            radius: 0.0,
            on_edge: false,
            width: 0.0,
            height: 0.0,
            vertical: false,
            custom: None,
            rotatable: false,
            rotation: 0.0,
            offset: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlphaConfig {
    pub ease: Option<EaseConfig>,
}

/// `ease` drives both axes; `ease_x` / `ease_y` override one axis each
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub ease: Option<EaseConfig>,
    pub ease_x: Option<EaseConfig>,
    pub ease_y: Option<EaseConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    pub gravity: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub mode: String,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub x: f32,
    pub y: f32,
    pub min_speed: f32,
    pub max_speed: Option<f32>,
    pub custom: Option<String>,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            mode: "range".to_string(),
            min_x: 0.0,
            max_x: 0.0,
            min_y: 1.0,
            max_y: 1.0,
            x: 0.0,
            y: 0.0,
            min_speed: 1.0,
            max_speed: None,
            custom: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub min: f32,
    pub max: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomConfig {
    pub on_create: Option<String>,
    pub on_tick: Option<String>,
}

const SHAPE_PATTERNS: [&str; 5] = ["none", "circle", "line", "rectangle", "custom"];
const MOVEMENT_MODES: [&str; 5] = ["range", "constant", "random", "directional", "custom"];

fn invalid(value: &str, allowed: &[&str]) -> EmberError {
    EmberError::InvalidEnumValue {
        value: value.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    }
}

impl EffectConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Resolve every modifier entry, failing on the first bad one
    pub fn build_modifiers(&self, registry: &CallbackRegistry) -> Result<Vec<Modifier>> {
        self.modifiers
            .iter()
            .map(|entry| entry.build(registry))
            .collect()
    }

    /// Configure `system` from this effect and append its modifiers.
    ///
    /// Everything is resolved before the system is touched, so a bad entry
    /// leaves the system unchanged.
    pub fn apply<H: ParticleHandle + 'static>(
        &self,
        system: &mut ParticleSystem<H>,
        registry: &CallbackRegistry,
    ) -> Result<()> {
        let progress = match &self.settings.progress {
            Some(name) => Some(
                ProgressMode::from_name(name)
                    .ok_or_else(|| invalid(name, &ProgressMode::NAMES))?,
            ),
            None => None,
        };
        let modifiers = self.build_modifiers(registry)?;

        let s = &self.settings;
        let settings = system.settings_mut();
        if let Some(max) = s.max_particles {
            settings.set_max_particles(max);
        }
        if let Some(duration) = s.duration {
            settings.set_duration(duration);
        }
        if let Some(looping) = s.looping {
            settings.set_looping(looping);
        }
        if let Some(speed) = s.speed {
            settings.set_speed(speed);
        }
        if let Some(range) = s.alive_time {
            settings.set_alive_time(range.min(), range.max());
        }
        if let Some(range) = s.start_rotation {
            settings.set_start_rotation(range.min(), range.max());
        }
        if let Some(range) = s.start_scale {
            settings.set_start_scale(range.min(), range.max());
        }
        if let Some(mode) = progress {
            settings.set_progress_mode(mode);
        }

        if let Some(rate) = self.emission.rate {
            system.emission_mut().set_emission_rate(rate);
        }

        let count = modifiers.len();
        for modifier in modifiers {
            system.add_modifier(modifier);
        }
        log::info!("[particles] applied effect with {count} modifier(s)");
        Ok(())
    }
}

impl ModifierConfig {
    pub fn build(&self, registry: &CallbackRegistry) -> Result<Modifier> {
        let modifier: Modifier = match self {
            ModifierConfig::Shape(c) => c.build(registry)?.into(),
            ModifierConfig::Alpha(c) => {
                let mut alpha = AlphaModifier::new();
                if let Some(ease) = &c.ease {
                    alpha.set_ease_shared(registry.resolve_ease(ease)?);
                }
                alpha.into()
            }
            ModifierConfig::Scale(c) => {
                let mut scale = ScaleModifier::new();
                if let Some(ease) = &c.ease {
                    scale.set_ease_shared(registry.resolve_ease(ease)?);
                }
                if let Some(ease) = &c.ease_x {
                    scale.set_ease_x_shared(registry.resolve_ease(ease)?);
                }
                if let Some(ease) = &c.ease_y {
                    scale.set_ease_y_shared(registry.resolve_ease(ease)?);
                }
                scale.into()
            }
            ModifierConfig::Gravity(c) => match c.gravity {
                Some(g) => GravityModifier::new(g).into(),
                None => GravityModifier::default().into(),
            },
            ModifierConfig::Movement(c) => c.build(registry)?.into(),
            ModifierConfig::Rotation(c) => {
                let mut rotation = RotationModifier::new();
                rotation.set_rotate_speed(c.min, c.max);
                rotation.into()
            }
            ModifierConfig::Custom(c) => {
                let mut custom = CustomModifier::new();
                if let Some(name) = &c.on_create {
                    custom.set_on_create(Some(registry.create_hook(name)?));
                }
                if let Some(name) = &c.on_tick {
                    custom.set_on_tick(Some(registry.tick_hook(name)?));
                }
                custom.into()
            }
        };
        Ok(modifier)
    }
}

impl ShapeConfig {
    fn build(&self, registry: &CallbackRegistry) -> Result<ShapeModifier> {
        let mut shape = ShapeModifier::new();
        match self.pattern.as_str() {
            "none" => shape.set_shape_none(),
            "circle" => shape.set_shape_circle(self.radius, self.on_edge),
            "line" => shape.set_shape_line(self.width, self.vertical),
            "rectangle" => shape.set_shape_rectangle(self.width, self.height, self.on_edge),
            "custom" => {
                let name = self.custom.as_deref().ok_or_else(|| {
                    EmberError::Configuration("custom shape needs a `custom` callable name".into())
                })?;
                shape.set_shape_shared(registry.shaper(name)?, self.rotatable);
            }
            other => return Err(invalid(other, &SHAPE_PATTERNS)),
        }
        shape.set_rotation(self.rotation);
        shape.set_offset(self.offset.x, self.offset.y);
        Ok(shape)
    }
}

impl MovementConfig {
    fn build(&self, registry: &CallbackRegistry) -> Result<MovementModifier> {
        let mut movement = MovementModifier::new();
        match self.mode.as_str() {
            "range" => movement.set_move_range(self.min_x, self.max_x, self.min_y, self.max_y),
            "constant" => movement.set_move_constant(self.x, self.y),
            "random" => movement.set_move_random(self.min_speed, self.max_speed),
            "directional" => movement.set_move_directional(self.min_speed, self.max_speed),
            "custom" => {
                let name = self.custom.as_deref().ok_or_else(|| {
                    EmberError::Configuration("custom movement needs a `custom` callable name".into())
                })?;
                movement.set_move_shared(registry.mover(name)?);
            }
            other => return Err(invalid(other, &MOVEMENT_MODES)),
        }
        Ok(movement)
    }
}

/// Named callables an effect file can refer to
#[derive(Default, Clone)]
pub struct CallbackRegistry {
    shapers: HashMap<String, Shaper>,
    movers: HashMap<String, Mover>,
    eases: HashMap<String, EaseFn>,
    create_hooks: HashMap<String, CreateHook>,
    tick_hooks: HashMap<String, TickHook>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_shaper(
        &mut self,
        name: impl Into<String>,
        shaper: impl Fn(&mut dyn RandomSource) -> Vec2 + 'static,
    ) -> &mut Self {
        self.shapers.insert(name.into(), Rc::new(shaper));
        self
    }

    pub fn register_mover(
        &mut self,
        name: impl Into<String>,
        mover: impl Fn(&ParticleState, &mut dyn RandomSource) -> Vec2 + 'static,
    ) -> &mut Self {
        self.movers.insert(name.into(), Rc::new(mover));
        self
    }

    pub fn register_ease(
        &mut self,
        name: impl Into<String>,
        ease: impl Fn(f32, f32, f32) -> f32 + 'static,
    ) -> &mut Self {
        self.eases.insert(name.into(), Rc::new(ease));
        self
    }

    pub fn register_create_hook(
        &mut self,
        name: impl Into<String>,
        hook: impl Fn(&mut ParticleState, &mut dyn RandomSource) + 'static,
    ) -> &mut Self {
        self.create_hooks.insert(name.into(), Rc::new(hook));
        self
    }

    pub fn register_tick_hook(
        &mut self,
        name: impl Into<String>,
        hook: impl Fn(&mut ParticleState, f32, f32) + 'static,
    ) -> &mut Self {
        self.tick_hooks.insert(name.into(), Rc::new(hook));
        self
    }

    pub fn shaper(&self, name: &str) -> Result<Shaper> {
        lookup(&self.shapers, "shaper", name)
    }

    pub fn mover(&self, name: &str) -> Result<Mover> {
        lookup(&self.movers, "mover", name)
    }

    pub fn ease(&self, name: &str) -> Result<EaseFn> {
        lookup(&self.eases, "ease", name)
    }

    pub fn create_hook(&self, name: &str) -> Result<CreateHook> {
        lookup(&self.create_hooks, "create hook", name)
    }

    pub fn tick_hook(&self, name: &str) -> Result<TickHook> {
        lookup(&self.tick_hooks, "tick hook", name)
    }

    /// A preset by name, or a registered ease for `{ custom = "..." }`
    pub fn resolve_ease(&self, config: &EaseConfig) -> Result<EaseFn> {
        match config {
            EaseConfig::Named(name) => EasePreset::from_name(name)
                .map(EasePreset::to_fn)
                .ok_or_else(|| invalid(name, &EasePreset::NAMES)),
            EaseConfig::Custom { custom } => self.ease(custom),
        }
    }
}

fn lookup<T: Clone>(map: &HashMap<String, T>, slot: &'static str, name: &str) -> Result<T> {
    map.get(name).cloned().ok_or_else(|| EmberError::UnknownCallable {
        slot,
        name: name.to_string(),
    })
}
