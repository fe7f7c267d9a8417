//! Per-message drop orchestration.
//!
//! [`DropCoordinator::handle_message`] walks one inbound message through
//! the drop pipeline in strict order:
//!
//! 1. Ignore bots and direct messages.
//! 2. Flip the weighted coin.
//! 3. Claim the cooldown gate, or post "No cheese for you!" and stop.
//! 4. Open the race, announce the drop, and react with the cheese.
//! 5. Run the race; credit the winner.
//! 6. Post the outcome.
//!
//! Several messages may be in flight at once, each suspended in its own
//! race. Only the cooldown gate limits how many drops exist.

use std::sync::Arc;
use std::time::Duration;

use cheese_ledger::Ledger;
use cheese_types::{Actor, ChannelKind, DropEvent, MessageEvent, UserId};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::CheeseConfig;
use crate::error::CoreError;
use crate::gate::CooldownGate;
use crate::notice;
use crate::race::{CollectionRace, RaceOutcome};
use crate::sampler::{ChanceWeight, DropSampler};
use crate::surface::{ChatSurface, ReactionHub};
use crate::tunables::SharedTunables;

/// Number of collectors logged after each ledger write while in debug mode.
const DEBUG_STANDINGS: usize = 10;

/// The ledger shared by the coordinator and the command handler.
pub type SharedLedger = Arc<Mutex<Ledger>>;

/// Log the leading collectors. Called after every debug-mode ledger write.
pub(crate) fn log_standings(ledger: &Ledger) {
    info!(standings = ?ledger.top(DEBUG_STANDINGS), "current cheese standings");
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// A bot or a direct message; not eligible for drops.
    Ignored,
    /// The coin flip said no.
    NotSampled,
    /// The coin flip said yes but the cooldown was still running.
    CoolingDown {
        /// Time until the next drop may spawn.
        remaining: Duration,
    },
    /// A drop spawned and was collected.
    Collected {
        /// The winner.
        collector: UserId,
        /// The winner's balance after the credit.
        balance: u64,
    },
    /// A drop spawned and nobody collected it.
    TimedOut,
}

/// Drives drops for every inbound message.
#[derive(Debug)]
pub struct DropCoordinator<S> {
    surface: S,
    hub: ReactionHub,
    ledger: SharedLedger,
    tunables: SharedTunables,
    gate: Mutex<CooldownGate>,
    sampler: Mutex<DropSampler>,
    chance_weight: ChanceWeight,
    messages: Vec<String>,
}

impl<S: ChatSurface> DropCoordinator<S> {
    /// Build a coordinator from configuration.
    ///
    /// The cooldown starts running now and the sampler is seeded from
    /// OS entropy.
    pub fn new(
        surface: S,
        hub: ReactionHub,
        ledger: SharedLedger,
        tunables: SharedTunables,
        config: &CheeseConfig,
    ) -> Self {
        Self {
            surface,
            hub,
            ledger,
            tunables,
            gate: Mutex::new(CooldownGate::new(Utc::now())),
            sampler: Mutex::new(DropSampler::from_entropy()),
            chance_weight: config.chance_weight(),
            messages: config.drop_messages(),
        }
    }

    /// Replace the sampler.
    #[must_use]
    pub fn with_sampler(mut self, sampler: DropSampler) -> Self {
        self.sampler = Mutex::new(sampler);
        self
    }

    /// Replace the cooldown gate.
    #[must_use]
    pub fn with_gate(mut self, gate: CooldownGate) -> Self {
        self.gate = Mutex::new(gate);
        self
    }

    /// The reaction hub races listen on.
    pub const fn hub(&self) -> &ReactionHub {
        &self.hub
    }

    /// Run one inbound message through the drop pipeline.
    ///
    /// Suspends until the drop's race resolves when a drop spawns.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Surface`] if posting or reacting fails. Ledger
    /// writes never fail the call.
    pub async fn handle_message(&self, event: &MessageEvent) -> Result<DropOutcome, CoreError> {
        if event.author.is_bot || event.channel_kind == ChannelKind::Direct {
            return Ok(DropOutcome::Ignored);
        }

        let sampled = self.sampler.lock().await.sample(self.chance_weight);
        debug!(
            message_id = %event.message_id,
            weight = self.chance_weight.percent(),
            sampled,
            "drop chance rolled"
        );
        if !sampled {
            return Ok(DropOutcome::NotSampled);
        }

        let tunables = *self.tunables.lock().await;
        let now = Utc::now();
        let claim = self.gate.lock().await.try_claim(now, tunables.cooldown());
        if let Err(remaining) = claim {
            debug!(
                remaining_secs = remaining.as_secs(),
                "cooldown still active"
            );
            self.surface
                .send_message(event.channel_id, &notice::no_cheese())
                .await?;
            return Ok(DropOutcome::CoolingDown { remaining });
        }

        let drop_event = DropEvent::cheese(event.message_id, event.channel_id, now);
        let race = CollectionRace::open(drop_event.clone(), &self.hub);

        let announcement = self.sampler.lock().await.pick_message(&self.messages);
        self.surface
            .send_message(drop_event.channel_id, announcement)
            .await?;
        self.surface
            .add_reaction(drop_event.channel_id, drop_event.message_id, drop_event.symbol)
            .await?;
        info!(
            channel_id = %drop_event.channel_id,
            message_id = %drop_event.message_id,
            timeout_secs = tunables.timeout_seconds(),
            "cheese dropped"
        );

        let outcome = race.run(tunables.timeout()).await;
        self.acknowledge(&drop_event).await;

        match outcome {
            RaceOutcome::Collected { collector } => {
                let balance = self.credit(collector.id, tunables.debug()).await;
                let name = self.name_of(&collector).await;
                self.surface
                    .send_message(drop_event.channel_id, &notice::collected(&name))
                    .await?;
                Ok(DropOutcome::Collected {
                    collector: collector.id,
                    balance,
                })
            }
            RaceOutcome::TimedOut => {
                info!(message_id = %drop_event.message_id, "nobody collected the cheese");
                self.surface
                    .send_message(drop_event.channel_id, &notice::nobody_collected())
                    .await?;
                Ok(DropOutcome::TimedOut)
            }
        }
    }

    /// Clear reactions on a resolved drop. Failure only costs a stale emoji.
    async fn acknowledge(&self, drop_event: &DropEvent) {
        if let Err(e) = self
            .surface
            .clear_reactions(drop_event.channel_id, drop_event.message_id)
            .await
        {
            warn!(
                message_id = %drop_event.message_id,
                error = %e,
                "unable to clear drop reactions"
            );
        }
    }

    /// Credit one cheese in a single critical section.
    async fn credit(&self, collector: UserId, debug: bool) -> u64 {
        let mut ledger = self.ledger.lock().await;
        let balance = ledger.credit(collector, 1);
        info!(collector = %collector, balance, "cheese credited to collector");
        if debug {
            log_standings(&ledger);
        }
        balance
    }

    async fn name_of(&self, actor: &Actor) -> String {
        if let Some(name) = &actor.name {
            return name.clone();
        }
        match self.surface.display_name(actor.id).await {
            Ok(name) => name,
            Err(e) => {
                warn!(user = %actor.id, error = %e, "unable to resolve collector name");
                actor.id.mention()
            }
        }
    }
}
