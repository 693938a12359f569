//! Time utilities for cram
//!
//! Provides monotonic time (for group deadlines) and wall-clock time (for
//! event log timestamps). Code that needs "now" takes it from a [`Clock`] so
//! that the scheduler can be driven deterministically in tests.

use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Represents a point in monotonic time for deadline enforcement.
/// This is immune to wall-clock changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicInstant(Instant);

impl MonotonicInstant {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub fn duration_since(&self, earlier: MonotonicInstant) -> Duration {
        self.0.saturating_duration_since(earlier.0)
    }

    pub fn checked_add(&self, duration: Duration) -> Option<MonotonicInstant> {
        self.0.checked_add(duration).map(MonotonicInstant)
    }

    /// Returns duration until `self`, or zero if `self` is in the past
    pub fn saturating_duration_until(&self, from: MonotonicInstant) -> Duration {
        if self.0 > from.0 {
            self.0.duration_since(from.0)
        } else {
            Duration::ZERO
        }
    }
}

impl std::ops::Add<Duration> for MonotonicInstant {
    type Output = MonotonicInstant;

    fn add(self, rhs: Duration) -> Self::Output {
        MonotonicInstant(self.0 + rhs)
    }
}

/// Source of monotonic "now"
pub trait Clock {
    fn now(&self) -> MonotonicInstant;
}

/// The real monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> MonotonicInstant {
        MonotonicInstant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant, so a test can hand one clone to
/// the code under test and advance time through another (for example from a
/// mock terminal that simulates a key-wait timing out).
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<MonotonicInstant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(MonotonicInstant::now())
    }

    pub fn starting_at(start: MonotonicInstant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now = *now + by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MonotonicInstant> {
        // A poisoned clock still holds a valid instant
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> MonotonicInstant {
        *self.lock()
    }
}

/// Wall-clock time split the way event log records print it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnixTimestamp {
    pub secs: i64,
    pub millis: u32,
}

impl std::fmt::Display for UnixTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:03}", self.secs, self.millis)
    }
}

/// Current wall-clock time as seconds and milliseconds since the Unix epoch
pub fn unix_timestamp() -> UnixTimestamp {
    let now = Utc::now();
    UnixTimestamp {
        secs: now.timestamp(),
        // Leap seconds report 1000..=1999 here
        millis: now.timestamp_subsec_millis().min(999),
    }
}
