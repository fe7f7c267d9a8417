//! Runtime-adjustable drop parameters.
//!
//! [`Tunables`] is the one mutable record behind the cooldown, the
//! collection timeout, and the debug flag. The coordinator reads it on every
//! message; only [`AdminPolicy`](crate::AdminPolicy) writes it, validating
//! the `timeout <= cooldown` relationship on every edit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::warn;

use crate::config::CheeseConfig;

/// Upper bound for the cooldown between drops, in seconds.
pub const MAX_COOLDOWN_SECONDS: u64 = 120;

/// Upper bound for the collection timeout, in seconds.
pub const MAX_TIMEOUT_SECONDS: u64 = 60;

/// Lowest cooldown or timeout an admin may set outside debug mode.
pub const MIN_SECONDS: u64 = 10;

/// Tunables shared between the coordinator and the admin policy.
pub type SharedTunables = Arc<Mutex<Tunables>>;

/// Cooldown, timeout, and debug flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tunables {
    cooldown_seconds: u64,
    timeout_seconds: u64,
    debug: bool,
}

impl Tunables {
    /// Build tunables from raw values.
    ///
    /// No validation happens here; use [`from_config`](Self::from_config)
    /// for values coming from outside and [`AdminPolicy`](crate::AdminPolicy)
    /// for edits.
    pub const fn new(cooldown_seconds: u64, timeout_seconds: u64, debug: bool) -> Self {
        Self {
            cooldown_seconds,
            timeout_seconds,
            debug,
        }
    }

    /// Build tunables from configuration.
    ///
    /// Values above their maxima are clamped. A timeout longer than the
    /// cooldown is lowered to the cooldown.
    pub fn from_config(config: &CheeseConfig) -> Self {
        let cooldown_seconds = config.cooldown.min(MAX_COOLDOWN_SECONDS);
        let mut timeout_seconds = config.timeout.min(MAX_TIMEOUT_SECONDS);
        if timeout_seconds > cooldown_seconds {
            warn!(
                cooldown_seconds,
                timeout_seconds,
                "configured timeout exceeds cooldown, lowering timeout"
            );
            timeout_seconds = cooldown_seconds;
        }

        Self {
            cooldown_seconds,
            timeout_seconds,
            debug: config.debug,
        }
    }

    /// Wrap in a shared handle.
    pub fn shared(self) -> SharedTunables {
        Arc::new(Mutex::new(self))
    }

    /// Seconds between drops.
    pub const fn cooldown_seconds(&self) -> u64 {
        self.cooldown_seconds
    }

    /// Seconds a drop stays collectable.
    pub const fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Whether debug mode is on.
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// The cooldown as a [`Duration`].
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    /// The collection timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub(crate) const fn set_cooldown_seconds(&mut self, seconds: u64) {
        self.cooldown_seconds = seconds;
    }

    pub(crate) const fn set_timeout_seconds(&mut self, seconds: u64) {
        self.timeout_seconds = seconds;
    }

    pub(crate) const fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }
}

impl Default for Tunables {
    fn default() -> Self {
        Self::from_config(&CheeseConfig::default())
    }
}
