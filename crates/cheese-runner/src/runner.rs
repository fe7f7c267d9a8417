//! The inbound dispatch loop.
//!
//! Every inbound line is handled on its own local task:
//!
//! 1. `message`: run through the drop pipeline (may suspend in a race).
//! 2. `reaction`: published to the reaction hub for pending races.
//! 3. `command`: answered by the command handler.
//!
//! Reactions are published inline rather than on a task so that they reach
//! the hub in arrival order. When the inbound stream closes, the loop waits
//! for every in-flight drop and command to finish before returning.

use std::rc::Rc;

use cheese_core::{CommandHandler, DropCoordinator, DropOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::bridge::LineBridge;
use crate::error::RunnerError;
use crate::protocol::Inbound;

/// Routes inbound frames to the engine.
pub struct CheeseRunner {
    bridge: LineBridge,
    coordinator: Rc<DropCoordinator<LineBridge>>,
    commands: Rc<CommandHandler<LineBridge>>,
}

impl CheeseRunner {
    /// A runner dispatching to `coordinator` and `commands`. `bridge` must be
    /// the surface both of them post through.
    pub fn new(
        bridge: LineBridge,
        coordinator: DropCoordinator<LineBridge>,
        commands: CommandHandler<LineBridge>,
    ) -> Self {
        Self {
            bridge,
            coordinator: Rc::new(coordinator),
            commands: Rc::new(commands),
        }
    }

    /// Read frames from `input` until it closes, then drain in-flight work.
    ///
    /// Must be called inside a [`tokio::task::LocalSet`].
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Io`] if reading `input` fails.
    pub async fn run<R>(self, input: R) -> Result<(), RunnerError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    self.dispatch(&line, &mut tasks).await;
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "inbound task aborted");
                    }
                }
            }
        }

        info!(in_flight = tasks.len(), "inbound stream closed, draining");
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "inbound task aborted");
            }
        }
        Ok(())
    }

    async fn dispatch(&self, line: &str, tasks: &mut JoinSet<()>) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let inbound = match Inbound::parse(line) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!(error = %e, "skipping malformed inbound line");
                return;
            }
        };

        match inbound {
            Inbound::Message(event) => {
                self.bridge.remember(&event.author).await;
                let coordinator = Rc::clone(&self.coordinator);
                tasks.spawn_local(async move {
                    match coordinator.handle_message(&event).await {
                        Ok(DropOutcome::Collected { collector, balance }) => {
                            debug!(collector = %collector, balance, "drop resolved");
                        }
                        Ok(outcome) => debug!(?outcome, "message handled"),
                        Err(e) => {
                            error!(message_id = %event.message_id, error = %e, "drop failed");
                        }
                    }
                });
            }
            Inbound::Reaction(reaction) => {
                self.bridge.remember(&reaction.actor).await;
                let delivered = self.coordinator.hub().publish(reaction);
                debug!(delivered, "reaction forwarded");
            }
            Inbound::Command {
                channel_id,
                invoker,
                command,
            } => {
                self.bridge.remember(&invoker).await;
                if let cheese_types::Command::Give { to, .. } = &command {
                    self.bridge.remember(to).await;
                }
                let commands = Rc::clone(&self.commands);
                tasks.spawn_local(async move {
                    if let Err(e) = commands.execute(channel_id, &invoker, command).await {
                        error!(channel_id = %channel_id, error = %e, "command failed");
                    }
                });
            }
        }
    }
}
