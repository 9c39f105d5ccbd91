//! Host time adapter.
//!
//! Monotonic time from `std::time::Instant` and a real sleep for tick
//! pacing.

use std::thread;
use std::time::{Duration, Instant};

use crate::app::ports::Clock;

/// Wall-independent clock for the control loop.
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since this clock was created.
    pub fn uptime(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
