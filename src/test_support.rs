//! Helpers shared by unit test modules.

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Clock that starts at a fixed instant and moves one second per reading.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).single().unwrap_or_default(),
            ticks: AtomicI64::new(0),
        }
    }

    /// Time the next reading will return.
    #[must_use]
    pub fn peek(&self) -> DateTime<Utc> {
        self.start + TimeDelta::seconds(self.ticks.load(Ordering::SeqCst))
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + TimeDelta::seconds(tick)
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FrozenClock(pub DateTime<Utc>);

impl Default for FrozenClock {
    fn default() -> Self {
        Self(SteppingClock::new().peek())
    }
}

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
