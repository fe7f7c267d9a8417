//! Channel-wide cooldown between drops.
//!
//! One timestamp for everyone. The gate throttles how often cheese
//! appears, not who gets to collect it.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Remembers when the last drop spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownGate {
    last_drop_at: DateTime<Utc>,
}

impl CooldownGate {
    /// A gate whose cooldown starts running at `started_at`.
    ///
    /// The engine passes its own start time, so no cheese drops until one
    /// full cooldown after startup.
    pub const fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            last_drop_at: started_at,
        }
    }

    /// When the last drop spawned.
    pub const fn last_drop_at(&self) -> DateTime<Utc> {
        self.last_drop_at
    }

    /// Whether at least `cooldown` has passed since the last drop.
    pub fn is_allowed(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        self.ready_at(cooldown).is_some_and(|ready| now >= ready)
    }

    /// Time left until the gate opens; zero once it is open.
    pub fn remaining(&self, now: DateTime<Utc>, cooldown: Duration) -> Duration {
        self.ready_at(cooldown).map_or(Duration::MAX, |ready| {
            ready
                .signed_duration_since(now)
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }

    /// Mark a drop as spawned at `now`.
    pub const fn record_drop(&mut self, now: DateTime<Utc>) {
        self.last_drop_at = now;
    }

    /// Check the gate and, if open, record a drop at `now` in the same step.
    ///
    /// # Errors
    ///
    /// Returns the remaining cooldown when the gate is closed. Nothing is
    /// recorded in that case.
    pub fn try_claim(&mut self, now: DateTime<Utc>, cooldown: Duration) -> Result<(), Duration> {
        if self.is_allowed(now, cooldown) {
            self.record_drop(now);
            Ok(())
        } else {
            Err(self.remaining(now, cooldown))
        }
    }

    fn ready_at(&self, cooldown: Duration) -> Option<DateTime<Utc>> {
        TimeDelta::from_std(cooldown)
            .ok()
            .and_then(|delta| self.last_drop_at.checked_add_signed(delta))
    }
}
