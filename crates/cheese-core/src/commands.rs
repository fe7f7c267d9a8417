//! The `cheese` command group.
//!
//! [`CommandHandler::handle`] turns a typed [`Command`] into a [`Reply`];
//! [`CommandHandler::execute`] also posts it. Every rejection, whether from
//! the ledger or the admin policy, becomes a reply. Only chat-surface
//! failures reach the caller as errors.

use cheese_ledger::TransferError;
use cheese_types::commands::{DEFAULT_GIVE_AMOUNT, DEFAULT_LIST_LIMIT};
use cheese_types::symbols::{CHEESE, SAD};
use cheese_types::{Actor, ChannelId, Command, UserId};
use tracing::{debug, info};

use crate::admin::{AdminError, AdminPolicy};
use crate::coordinator::{SharedLedger, log_standings};
use crate::error::CoreError;
use crate::surface::{ChatSurface, Embed, Reply};

/// Most collectors `list` shows outside debug mode.
pub const LIST_SOFT_CAP: u32 = 20;

/// Runs `cheese` subcommands.
#[derive(Debug)]
pub struct CommandHandler<S> {
    surface: S,
    ledger: SharedLedger,
    policy: AdminPolicy,
}

impl<S: ChatSurface> CommandHandler<S> {
    /// A handler answering through `surface`.
    pub const fn new(surface: S, ledger: SharedLedger, policy: AdminPolicy) -> Self {
        Self {
            surface,
            ledger,
            policy,
        }
    }

    /// The admin policy behind the admin-only subcommands.
    pub const fn policy(&self) -> &AdminPolicy {
        &self.policy
    }

    /// Run `command` for `invoker` and post the reply to `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Surface`] if the reply cannot be posted.
    pub async fn execute(
        &self,
        channel: ChannelId,
        invoker: &Actor,
        command: Command,
    ) -> Result<(), CoreError> {
        match self.handle(invoker, command).await {
            Reply::Text(text) => self.surface.send_message(channel, &text).await?,
            Reply::Embed(embed) => self.surface.send_embed(channel, &embed).await?,
        };
        Ok(())
    }

    /// Run `command` for `invoker` and return the reply.
    pub async fn handle(&self, invoker: &Actor, command: Command) -> Reply {
        debug!(invoker = %invoker.id, ?command, "cheese command received");

        if command.is_admin_only() && !self.policy.authorize(invoker.id) {
            info!(invoker = %invoker.id, ?command, "unauthorized admin command");
            return Reply::text(AdminError::Unauthorized.to_string());
        }

        match command {
            Command::Help => Reply::text(help_text()),
            Command::Mine => self.mine(invoker.id).await,
            Command::List { limit } => self.list(limit.unwrap_or(DEFAULT_LIST_LIMIT)).await,
            Command::Give { to, amount } => {
                self.give(invoker.id, &to, amount.unwrap_or(DEFAULT_GIVE_AMOUNT))
                    .await
            }
            Command::Debug { flag } => self.debug(flag).await,
            Command::Cooldown { seconds } => self.cooldown(seconds).await,
            Command::Timeout { seconds } => self.timeout(seconds).await,
        }
    }

    async fn mine(&self, user: UserId) -> Reply {
        let count = {
            let ledger = self.ledger.lock().await;
            ledger.contains(user).then(|| ledger.get(user))
        };
        match count {
            Some(count) => Reply::Embed(Embed::cheese(
                format!("{CHEESE} collected"),
                format!("You've collected {count} {CHEESE}"),
            )),
            None => Reply::text(format!("Sorry, you don't have any {CHEESE} yet {SAD}")),
        }
    }

    async fn list(&self, requested: u32) -> Reply {
        let mut lines = Vec::new();
        let mut shown = requested;
        if shown > LIST_SOFT_CAP && !self.policy.debug().await {
            lines.push(format!("Limiting output to top {LIST_SOFT_CAP}"));
            shown = LIST_SOFT_CAP;
        }

        let standings = self
            .ledger
            .lock()
            .await
            .top(usize::try_from(shown).unwrap_or(usize::MAX));
        for (rank, (user, count)) in (1_usize..).zip(standings) {
            let name = self.name_of(user).await;
            lines.push(format!("{rank:>3}. {name}: {count}"));
        }

        Reply::Embed(Embed::cheese(
            format!("Top {requested} {CHEESE} collectors"),
            lines.join("\n"),
        ))
    }

    async fn give(&self, from: UserId, to: &Actor, amount: i64) -> Reply {
        let Some(amount) = u64::try_from(amount).ok().filter(|a| *a > 0) else {
            return Reply::text("You must specify an amount above 0");
        };

        let debug = self.policy.debug().await;
        let result = {
            let mut ledger = self.ledger.lock().await;
            let result = ledger.transfer(from, to, amount);
            if debug && result.is_ok() {
                log_standings(&ledger);
            }
            result
        };
        match result {
            Ok(_) => Reply::text(format!("You gave {} {amount} {CHEESE}!", to.id.mention())),
            Err(TransferError::InvalidTarget) => Reply::text(format!(
                "You can only give {CHEESE} to someone else, not yourself silly!"
            )),
            Err(TransferError::IneligibleRecipient) => {
                Reply::text(format!("You cannot give bots {CHEESE}!"))
            }
            Err(TransferError::InvalidAmount) => {
                Reply::text("You must specify an amount above 0")
            }
            Err(TransferError::InsufficientBalance { available: 0, .. }) => {
                Reply::text(format!("You have no {CHEESE} to give away"))
            }
            Err(TransferError::InsufficientBalance { available, .. }) => Reply::text(format!(
                "You don't have enough {CHEESE}, you only have {available} {CHEESE}"
            )),
        }
    }

    async fn debug(&self, flag: Option<bool>) -> Reply {
        let Some(flag) = flag else {
            let state = if self.policy.debug().await {
                "enabled"
            } else {
                "disabled"
            };
            return Reply::text(format!("Debug is currently {state}"));
        };
        self.policy.set_debug(flag).await;
        Reply::text(if flag {
            "Debug enabled"
        } else {
            "Debug disabled"
        })
    }

    async fn cooldown(&self, seconds: Option<u64>) -> Reply {
        let Some(seconds) = seconds else {
            return Reply::text(format!(
                "Cooldown currently set to {}",
                self.policy.cooldown().await
            ));
        };
        match self.policy.set_cooldown(seconds).await {
            Ok(()) => Reply::text(format!("Cooldown set to {seconds} seconds")),
            Err(e) => Reply::text(e.to_string()),
        }
    }

    async fn timeout(&self, seconds: Option<u64>) -> Reply {
        let Some(seconds) = seconds else {
            return Reply::text(format!(
                "Timeout currently set to {}",
                self.policy.timeout().await
            ));
        };
        match self.policy.set_timeout(seconds).await {
            Ok(()) => Reply::text(format!("Timeout set to {seconds} seconds")),
            Err(e) => Reply::text(e.to_string()),
        }
    }

    async fn name_of(&self, user: UserId) -> String {
        self.surface
            .display_name(user)
            .await
            .unwrap_or_else(|_lookup| user.mention())
    }
}

fn help_text() -> String {
    [
        format!("All things Cheese {CHEESE}!"),
        "  mine (m)          See how much cheese you have".to_owned(),
        "  list (l) [limit]  Get the list of top cheese collectors".to_owned(),
        "  give (g) <user> [amount]  Give cheese to someone else".to_owned(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_the_public_subcommands() {
        let help = help_text();
        assert!(help.starts_with("All things Cheese"));
        for name in ["mine", "list", "give"] {
            assert!(help.contains(name), "missing {name}");
        }
        assert!(!help.contains("cooldown"));
    }
}
