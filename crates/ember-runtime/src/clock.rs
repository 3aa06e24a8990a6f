//! Frame clock that hands delta time to registered tick actions

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;

use crate::system::RuntimeSystem;

/// Longest frame the clock will report, in seconds. Longer stalls (debugger,
/// suspended tab, window drag) are clamped so simulations don't jump.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Identifies one registered tick action
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct TickHandle(u64);

impl TickHandle {
    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

struct TickAction {
    id: u64,
    action: Box<dyn FnMut(f64)>,
}

/// Tracks frame time and dispatches it to every registered tick action.
///
/// Hosts either call [`FrameClock::tick`] once per frame to measure wall time,
/// or [`FrameClock::advance`] with a delta they computed themselves (tests,
/// fixed-step replays). Actions run synchronously, newest registration first.
pub struct FrameClock {
    /// Total dispatched time in seconds
    pub total_time: f64,
    /// Delta handed out by the last dispatch
    pub delta_time: f64,
    actions: Vec<TickAction>,
    next_id: u64,
    last_instant: Instant,
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            actions: Vec::new(),
            next_id: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action to be called with the delta time of every frame
    pub fn register(&mut self, action: impl FnMut(f64) + 'static) -> TickHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.actions.push(TickAction {
            id,
            action: Box::new(action),
        });
        TickHandle(id)
    }

    /// Register a shared system. The clock only keeps a weak reference, so the
    /// action goes quiet once the owner drops the system.
    pub fn register_system<S>(&mut self, system: &Rc<RefCell<S>>) -> TickHandle
    where
        S: RuntimeSystem + 'static,
    {
        let weak: Weak<RefCell<S>> = Rc::downgrade(system);
        self.register(move |dt| {
            let Some(system) = weak.upgrade() else {
                return;
            };
            let Ok(mut system) = system.try_borrow_mut() else {
                log::warn!("system is borrowed elsewhere, skipping frame");
                return;
            };
            if let Err(err) = system.update(dt) {
                log::error!("[{}] update failed: {err}", system.name());
            }
        })
    }

    /// Remove a registered action. Returns false if the handle was unknown.
    pub fn unregister(&mut self, handle: TickHandle) -> bool {
        match self.actions.iter().position(|a| a.id == handle.0) {
            Some(index) => {
                self.actions.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of registered actions
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Measure the wall time since the previous call and dispatch it.
    /// The first call only primes the clock and dispatches nothing.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed.min(MAX_FRAME_TIME));
    }

    /// Dispatch an explicit delta time to every action. Negative or NaN
    /// deltas are treated as zero.
    pub fn advance(&mut self, delta_time: f64) {
        let dt = if delta_time > 0.0 { delta_time } else { 0.0 };
        self.delta_time = dt;
        self.total_time += dt;

        for entry in self.actions.iter_mut().rev() {
            (entry.action)(dt);
        }
    }
}
