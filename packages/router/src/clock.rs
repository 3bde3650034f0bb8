//! Time sources for the dwell window.

use std::{
    cell::Cell,
    time::{Duration, Instant},
};

/// Where the synchronizer gets "now" from. Inject a [`ManualClock`] to make dwell decisions
/// deterministic.
pub trait Clock {
    /// The current monotonic time.
    fn now(&self) -> Instant;
}

/// Reads [`Instant::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// ```rust
/// # use std::time::Duration;
/// # use distributed_router::clock::{Clock, ManualClock};
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(2500));
/// assert_eq!(clock.now() - start, Duration::from_millis(2500));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Start at the real current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
