#![forbid(unsafe_code)]

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Time source for `created_at`, `updated_at` and dashboard "now".
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock. `step` is added after every read, so successive
/// mutations get strictly increasing timestamps.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
    step: Duration,
}

impl ManualClock {
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::stepping(at, Duration::zero())
    }

    pub fn stepping(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            now: Cell::new(start),
            step,
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let t = self.now.get();
        self.now.set(t + self.step);
        t
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
