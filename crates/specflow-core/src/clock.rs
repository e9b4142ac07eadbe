//! Time source for lifecycle commands.
//!
//! Commands stamp `updatedAt`, version creation times, and approval
//! decisions. Routing every read of "now" through [`Clock`] keeps the engine
//! deterministic: tests drive a [`ManualClock`], hosts use [`SystemClock`].

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// UTC instant used for every timestamp in the model.
pub type Timestamp = DateTime<Utc>;

/// A source of the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to, optionally ticking on every read.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Timestamp>,
    tick: Duration,
}

impl ManualClock {
    /// A clock frozen at `start`.
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
            tick: Duration::zero(),
        }
    }

    /// Builder: advance by `tick` after every read, so consecutive commands
    /// observe strictly increasing times.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: Timestamp) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let current = self.now.get();
        self.now.set(current + self.tick);
        current
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// ISO 8601 with second precision, e.g. `2024-01-20T14:30:00Z`.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
