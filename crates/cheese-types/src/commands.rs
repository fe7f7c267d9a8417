//! The `cheese` command group.
//!
//! Command-argument parsing belongs to the chat surface; by the time a
//! command reaches the engine it is one of these typed variants. Each
//! variant also accepts its one- or two-letter alias.

use serde::{Deserialize, Serialize};

use crate::events::Actor;

/// Default number of collectors shown by `list`.
pub const DEFAULT_LIST_LIMIT: u32 = 5;

/// Default amount handed over by `give`.
pub const DEFAULT_GIVE_AMOUNT: i64 = 5;

/// A subcommand of the `cheese` group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Command {
    /// No subcommand: show the group help.
    Help,
    /// Show the invoker's own cheese count.
    #[serde(alias = "m")]
    Mine,
    /// Show the top collectors.
    #[serde(alias = "l")]
    List {
        /// How many collectors to show.
        #[serde(default)]
        limit: Option<u32>,
    },
    /// Give cheese to another user.
    #[serde(alias = "g")]
    Give {
        /// The recipient.
        to: Actor,
        /// How much to give; signed so that nonsense amounts reach the
        /// engine and get a proper rejection.
        #[serde(default)]
        amount: Option<i64>,
    },
    /// Admin: show or set debug mode.
    #[serde(alias = "db")]
    Debug {
        /// New debug flag; `None` reports the current one.
        #[serde(default)]
        flag: Option<bool>,
    },
    /// Admin: show or set the cooldown between drops.
    #[serde(alias = "c")]
    Cooldown {
        /// New cooldown in seconds; `None` reports the current one.
        #[serde(default)]
        seconds: Option<u64>,
    },
    /// Admin: show or set the collection timeout.
    #[serde(alias = "t")]
    Timeout {
        /// New timeout in seconds; `None` reports the current one.
        #[serde(default)]
        seconds: Option<u64>,
    },
}

impl Command {
    /// Whether only admins may run this command.
    pub const fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Self::Debug { .. } | Self::Cooldown { .. } | Self::Timeout { .. }
        )
    }
}
