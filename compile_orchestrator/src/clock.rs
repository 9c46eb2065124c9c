//! Time sources for compile timing

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use chrono::{Duration, Local, NaiveTime};

/// Format used for the completion time in status messages
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// Millisecond clock plus wall-clock time of day
pub trait Clock {
    /// Monotonic milliseconds, for elapsed time
    fn now_ms(&self) -> u64;

    /// Local time formatted as `HH:MM:SS`
    fn time_of_day(&self) -> String;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn time_of_day(&self) -> String {
        (**self).time_of_day()
    }
}

/// Real clock
#[derive(Debug, Clone)]
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
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn time_of_day(&self) -> String {
        Local::now().format(TIME_OF_DAY_FORMAT).to_string()
    }
}

/// Hand-driven clock
///
/// Time of day is `base` plus the elapsed milliseconds, wrapping at midnight.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Cell<u64>,
    base: NaiveTime,
}

impl ManualClock {
    pub fn new(base: NaiveTime) -> Self {
        Self {
            now_ms: Cell::new(0),
            base,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.set(ms);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(NaiveTime::default())
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn time_of_day(&self) -> String {
        let elapsed = Duration::milliseconds(self.now_ms.get() as i64);
        (self.base + elapsed).format(TIME_OF_DAY_FORMAT).to_string()
    }
}
