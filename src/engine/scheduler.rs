//! Cancellable one-shot timers.
//!
//! The engine never sleeps. It arms payload-carrying timers against clock
//! time and collects the due ones on each tick, which keeps every delayed
//! action (auto-jump, pause-resume, restore-after-jump) deterministic under
//! a manual clock.

/// Handle to a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct OneShot<T> {
    id: TimerId,
    due: f64,
    payload: T,
}

/// Ordered set of pending one-shot timers.
#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    pending: Vec<OneShot<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer that becomes due `delay` seconds after `now`. Negative
    /// delays are due immediately.
    pub fn arm(&mut self, now: f64, delay: f64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(OneShot {
            id,
            due: now + delay.max(0.0),
            payload,
        });
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    /// Seconds until the timer fires, clamped at zero.
    pub fn remaining(&self, id: TimerId, now: f64) -> Option<f64> {
        self.pending
            .iter()
            .find(|t| t.id == id)
            .map(|t| (t.due - now).max(0.0))
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: f64) -> Vec<(TimerId, T)> {
        let mut due: Vec<OneShot<T>> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due.into_iter().map(|t| (t.id, t.payload)).collect()
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
