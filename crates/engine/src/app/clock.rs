use std::thread;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now_millis(&self) -> u64;
    fn delay(&self, millis: u64);
}

/// Milliseconds since construction, backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        Instant::now()
            .saturating_duration_since(self.start)
            .as_millis() as u64
    }

    fn delay(&self, millis: u64) {
        if millis > 0 {
            thread::sleep(Duration::from_millis(millis));
        }
    }
}
