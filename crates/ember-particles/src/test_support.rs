//! Fakes shared by the unit tests

use crate::host::{ParticleContainer, ParticleHandle};
use crate::rand::RandomSource;
use crate::sprite::ParticleState;
use crate::system::ParticleSystem;
use ember_core::{EmberError, Result, Vec2};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Records every write and lifecycle hook it receives
#[derive(Debug, Default)]
pub struct FakeHandle {
    pub visible: bool,
    pub position: Vec2,
    pub rotation: f32,
    pub alpha: f32,
    pub scale: Vec2,
    pub writes: u32,
    pub initialized: u32,
    pub created: u32,
    pub enabled: u32,
    pub disabled: u32,
}

impl ParticleHandle for FakeHandle {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.writes += 1;
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
        self.writes += 1;
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.writes += 1;
    }

    fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.writes += 1;
    }

    fn initialize(&mut self) {
        self.initialized += 1;
    }

    fn on_created(&mut self) {
        self.created += 1;
    }

    fn on_enabled(&mut self) {
        self.enabled += 1;
    }

    fn on_disabled(&mut self) {
        self.disabled += 1;
    }
}

/// Container that remembers the names of attached children
#[derive(Clone, Default)]
pub struct RecordingContainer {
    pub children: Rc<RefCell<Vec<String>>>,
}

impl ParticleContainer<FakeHandle> for RecordingContainer {
    fn add_child(&mut self, name: &str, _handle: &mut FakeHandle) -> Result<()> {
        self.children.borrow_mut().push(name.to_string());
        Ok(())
    }
}

/// Container that refuses every child
pub struct RejectingContainer;

impl ParticleContainer<FakeHandle> for RejectingContainer {
    fn add_child(&mut self, name: &str, _handle: &mut FakeHandle) -> Result<()> {
        Err(EmberError::Container(format!("{name} rejected")))
    }
}

/// Container that refuses children while its `failing` flag is set
#[derive(Clone, Default)]
pub struct FlakyContainer {
    pub failing: Rc<Cell<bool>>,
}

impl ParticleContainer<FakeHandle> for FlakyContainer {
    fn add_child(&mut self, name: &str, _handle: &mut FakeHandle) -> Result<()> {
        if self.failing.get() {
            return Err(EmberError::Container(format!("{name} rejected")));
        }
        Ok(())
    }
}

/// Replays a fixed sequence of values, cycling when exhausted
pub struct ScriptedRng {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: &[f32]) -> Self {
        assert!(!values.is_empty());
        Self {
            values: values.to_vec(),
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedRng {
    fn next_f32(&mut self) -> f32 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

/// A seeded system over fake handles
pub fn fake_system(seed: u64) -> ParticleSystem<FakeHandle> {
    ParticleSystem::<FakeHandle>::builder()
        .container(RecordingContainer::default())
        .instantiator(|| Ok(FakeHandle::default()))
        .seed(seed)
        .build()
        .expect("fake system builds")
}

/// A freshly spawned particle state with no sprite around it
pub fn fresh_state(max_alive_time: f32) -> ParticleState {
    ParticleState::spawned(max_alive_time)
}
