use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Funnel entity - the leaky-bucket state persisted per limiter key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funnel {
    /// Maximum number of units the funnel can hold.
    pub capacity: u64,
    /// Leak rate in units per second.
    pub rate: f64,
    /// Units currently available.
    pub quota: u64,
    /// Last time at least one whole unit leaked back into the quota.
    pub last_leak_time: DateTime<Utc>,
}

impl Funnel {
    /// Create a full funnel whose leak clock starts at `now`.
    pub fn new(capacity: u64, rate: f64, now: DateTime<Utc>) -> Self {
        Self {
            capacity,
            rate,
            quota: capacity,
            last_leak_time: now,
        }
    }

    /// Whole units leaked between `last_leak_time` and `now`.
    ///
    /// A clock that moved backwards leaks nothing.
    pub fn leaked_units(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = now.signed_duration_since(self.last_leak_time);
        let Ok(elapsed) = elapsed.to_std() else {
            return 0;
        };

        let units = (elapsed.as_secs_f64() * self.rate).floor();
        if units.is_finite() && units >= 1.0 {
            // Saturating cast, anything above u64::MAX clamps.
            units as u64
        } else {
            0
        }
    }

    /// Replenish quota for the time elapsed since the last leak.
    ///
    /// Sub-unit leakage is not recorded: `last_leak_time` only moves when at
    /// least one whole unit leaked.
    pub fn leak(&mut self, now: DateTime<Utc>) {
        let leaked = self.leaked_units(now);
        if leaked < 1 {
            return;
        }

        self.last_leak_time = now;
        self.quota = self.quota.saturating_add(leaked).min(self.capacity);
    }

    /// Leak, then try to take `units` out of the quota.
    ///
    /// Returns `false` and leaves the quota untouched when there is not
    /// enough of it.
    pub fn infuse(&mut self, units: u64, now: DateTime<Utc>) -> bool {
        self.leak(now);
        if self.quota < units {
            return false;
        }

        self.quota -= units;
        true
    }
}
