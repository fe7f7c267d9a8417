//! Admin-only control over the drop tunables.
//!
//! Authorization is a predicate over the actor: membership in the configured
//! admin set. Every edit is validated against the current value of the other
//! tunable, so `timeout <= cooldown` holds after any sequence of accepted
//! edits. A rejected edit changes nothing and names the bound it violated.

use std::collections::BTreeSet;

use cheese_types::UserId;
use tracing::{debug, info};

use crate::tunables::{
    MAX_COOLDOWN_SECONDS, MAX_TIMEOUT_SECONDS, MIN_SECONDS, SharedTunables, Tunables,
};

/// Callback that switches log verbosity when debug mode changes.
pub type VerbosityHook = Box<dyn Fn(bool) + Send + Sync>;

/// Reasons an admin action is refused. The `Display` text is shown to the
/// invoker as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    /// The actor is not an admin.
    #[error("Sorry, you are not allowed to use this command!")]
    Unauthorized,

    /// Below the floor that applies outside debug mode.
    #[error("Not allowed to be less than {floor} seconds")]
    BelowFloor {
        /// The floor.
        floor: u64,
    },

    /// Above the hard maximum.
    #[error("Not allowed to be more than {max} seconds")]
    AboveMax {
        /// The maximum.
        max: u64,
    },

    /// A cooldown shorter than the current timeout.
    #[error("Not allowed to be less than the timeout of {timeout} seconds")]
    BelowTimeout {
        /// The current timeout.
        timeout: u64,
    },

    /// A timeout longer than the current cooldown.
    #[error("Not allowed to be more than the cooldown of {cooldown} seconds")]
    AboveCooldown {
        /// The current cooldown.
        cooldown: u64,
    },
}

/// Check a cooldown edit against the current tunables.
///
/// # Errors
///
/// Returns the first violated bound: the floor (outside debug), the
/// maximum, then the current timeout.
pub const fn validate_cooldown(tunables: &Tunables, seconds: u64) -> Result<(), AdminError> {
    if seconds < MIN_SECONDS && !tunables.debug() {
        return Err(AdminError::BelowFloor { floor: MIN_SECONDS });
    }
    if seconds > MAX_COOLDOWN_SECONDS {
        return Err(AdminError::AboveMax {
            max: MAX_COOLDOWN_SECONDS,
        });
    }
    if seconds < tunables.timeout_seconds() {
        return Err(AdminError::BelowTimeout {
            timeout: tunables.timeout_seconds(),
        });
    }
    Ok(())
}

/// Check a timeout edit against the current tunables.
///
/// # Errors
///
/// Returns the first violated bound: the floor (outside debug), the
/// maximum, then the current cooldown.
pub const fn validate_timeout(tunables: &Tunables, seconds: u64) -> Result<(), AdminError> {
    if seconds < MIN_SECONDS && !tunables.debug() {
        return Err(AdminError::BelowFloor { floor: MIN_SECONDS });
    }
    if seconds > MAX_TIMEOUT_SECONDS {
        return Err(AdminError::AboveMax {
            max: MAX_TIMEOUT_SECONDS,
        });
    }
    if seconds > tunables.cooldown_seconds() {
        return Err(AdminError::AboveCooldown {
            cooldown: tunables.cooldown_seconds(),
        });
    }
    Ok(())
}

/// Gatekeeper for the shared [`Tunables`].
pub struct AdminPolicy {
    admins: BTreeSet<UserId>,
    tunables: SharedTunables,
    verbosity: Option<VerbosityHook>,
}

impl core::fmt::Debug for AdminPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminPolicy")
            .field("admins", &self.admins)
            .field("tunables", &self.tunables)
            .field("verbosity", &self.verbosity.is_some())
            .finish()
    }
}

impl AdminPolicy {
    /// A policy granting admin rights to `admins`.
    pub fn new(admins: impl IntoIterator<Item = UserId>, tunables: SharedTunables) -> Self {
        Self {
            admins: admins.into_iter().collect(),
            tunables,
            verbosity: None,
        }
    }

    /// Install the callback invoked whenever debug mode is set.
    #[must_use]
    pub fn with_verbosity_hook(mut self, hook: VerbosityHook) -> Self {
        self.verbosity = Some(hook);
        self
    }

    /// Whether `actor` may run admin actions.
    pub fn authorize(&self, actor: UserId) -> bool {
        let allowed = self.admins.contains(&actor);
        debug!(actor = %actor, allowed, "admin authorization checked");
        allowed
    }

    /// The shared tunables this policy guards.
    pub const fn tunables(&self) -> &SharedTunables {
        &self.tunables
    }

    /// Current cooldown in seconds.
    pub async fn cooldown(&self) -> u64 {
        self.tunables.lock().await.cooldown_seconds()
    }

    /// Current timeout in seconds.
    pub async fn timeout(&self) -> u64 {
        self.tunables.lock().await.timeout_seconds()
    }

    /// Whether debug mode is on.
    pub async fn debug(&self) -> bool {
        self.tunables.lock().await.debug()
    }

    /// Change the cooldown.
    ///
    /// # Errors
    ///
    /// See [`validate_cooldown`]. Nothing changes on error.
    pub async fn set_cooldown(&self, seconds: u64) -> Result<(), AdminError> {
        let mut tunables = self.tunables.lock().await;
        validate_cooldown(&tunables, seconds)?;
        tunables.set_cooldown_seconds(seconds);
        info!(seconds, "cooldown updated");
        Ok(())
    }

    /// Change the collection timeout.
    ///
    /// # Errors
    ///
    /// See [`validate_timeout`]. Nothing changes on error.
    pub async fn set_timeout(&self, seconds: u64) -> Result<(), AdminError> {
        let mut tunables = self.tunables.lock().await;
        validate_timeout(&tunables, seconds)?;
        tunables.set_timeout_seconds(seconds);
        info!(seconds, "timeout updated");
        Ok(())
    }

    /// Turn debug mode on or off and adjust log verbosity to match.
    pub async fn set_debug(&self, debug: bool) {
        self.tunables.lock().await.set_debug(debug);
        if let Some(hook) = &self.verbosity {
            hook(debug);
        }
        if debug {
            debug!("debug enabled");
        } else {
            info!("debug disabled");
        }
    }
}
