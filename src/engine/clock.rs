//! Wall-clock abstraction.
//!
//! Timer due-times are computed against a [`Clock`] rather than ambient
//! time primitives, so tests (and the `simulate` subcommand) can drive the
//! engine on a hand-cranked clock instead of real waits.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic seconds source.
pub trait Clock {
    /// Seconds elapsed since the clock's origin. Must never go backwards.
    fn now(&self) -> f64;
}

/// Real clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-cranked clock. Clones share the same time, so a test can hold one
/// handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `dt` seconds.
    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
