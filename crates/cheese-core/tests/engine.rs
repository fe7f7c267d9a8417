//! End-to-end tests for the drop flow and the `cheese` command group.
//!
//! A recording [`ChatSurface`] stands in for the chat platform. Drops are
//! forced with [`DropSampler::Fixed`] and time runs on tokio's paused clock,
//! so collection windows resolve instantly and deterministically.

#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::missing_panics_doc,
    clippy::too_many_lines
)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use cheese_core::{
    AdminPolicy, ChatSurface, CheeseConfig, CommandHandler, CooldownGate, DropCoordinator,
    DropOutcome, DropSampler, Embed, ReactionHub, Reply, SharedLedger, SurfaceError, Tunables,
};
use cheese_ledger::Ledger;
use cheese_types::symbols::CHEESE;
use cheese_types::{
    Actor, ChannelId, ChannelKind, Command, MessageEvent, MessageId, ReactionEvent, UserId,
};
use chrono::Utc;
use tokio::sync::Mutex;

const CHANNEL: ChannelId = ChannelId(7);
const ADMIN: UserId = UserId(99);
const U1: UserId = UserId(1);
const U2: UserId = UserId(2);

/// Everything the engine did to the chat platform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Posted {
    Message { channel: ChannelId, text: String },
    Embed { channel: ChannelId, embed: Embed },
    Reaction { message: MessageId, emoji: String },
    Cleared { message: MessageId },
}

#[derive(Debug, Default)]
struct Recorded {
    posted: Vec<Posted>,
    next_id: u64,
}

#[derive(Debug, Clone, Default)]
struct FakeSurface {
    recorded: Arc<StdMutex<Recorded>>,
    names: Arc<BTreeMap<UserId, String>>,
    fail_clears: bool,
}

impl FakeSurface {
    fn with_names(names: &[(UserId, &str)]) -> Self {
        Self {
            names: Arc::new(
                names
                    .iter()
                    .map(|(id, name)| (*id, (*name).to_owned()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    fn posted(&self) -> Vec<Posted> {
        self.recorded.lock().unwrap().posted.clone()
    }

    fn texts(&self) -> Vec<String> {
        self.posted()
            .into_iter()
            .filter_map(|p| match p {
                Posted::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, posted: Posted) -> MessageId {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.posted.push(posted);
        recorded.next_id += 1;
        MessageId(1000 + recorded.next_id)
    }
}

impl ChatSurface for FakeSurface {
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<MessageId, SurfaceError> {
        Ok(self.record(Posted::Message {
            channel,
            text: text.to_owned(),
        }))
    }

    async fn send_embed(&self, channel: ChannelId, embed: &Embed) -> Result<MessageId, SurfaceError> {
        Ok(self.record(Posted::Embed {
            channel,
            embed: embed.clone(),
        }))
    }

    async fn add_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), SurfaceError> {
        self.record(Posted::Reaction {
            message,
            emoji: emoji.to_owned(),
        });
        Ok(())
    }

    async fn clear_reactions(
        &self,
        _channel: ChannelId,
        message: MessageId,
    ) -> Result<(), SurfaceError> {
        if self.fail_clears {
            return Err(SurfaceError::Reaction {
                target: message,
                message: "missing permissions".to_owned(),
            });
        }
        self.record(Posted::Cleared { message });
        Ok(())
    }

    async fn display_name(&self, user: UserId) -> Result<String, SurfaceError> {
        self.names.get(&user).cloned().ok_or(SurfaceError::Lookup {
            user,
            message: "unknown user".to_owned(),
        })
    }
}

fn shared_ledger() -> SharedLedger {
    Arc::new(Mutex::new(Ledger::in_memory()))
}

fn message(author: Actor, id: u64) -> MessageEvent {
    MessageEvent {
        author,
        channel_id: CHANNEL,
        channel_kind: ChannelKind::Guild,
        message_id: MessageId(id),
    }
}

fn cheese_reaction(message_id: u64, actor: Actor) -> ReactionEvent {
    ReactionEvent {
        channel_id: CHANNEL,
        message_id: MessageId(message_id),
        emoji: CHEESE.to_owned(),
        actor,
    }
}

/// A coordinator that always drops, with no cooldown and a 60 s window.
fn forced_coordinator(surface: FakeSurface, ledger: SharedLedger) -> DropCoordinator<FakeSurface> {
    DropCoordinator::new(
        surface,
        ReactionHub::new(),
        ledger,
        Tunables::new(0, 60, true).shared(),
        &CheeseConfig::default(),
    )
    .with_sampler(DropSampler::Fixed(true))
}

// =========================================================================
// Drop flow
// =========================================================================

#[tokio::test(start_paused = true)]
async fn reaction_within_window_credits_the_collector() {
    let surface = FakeSurface::with_names(&[(U1, "U1")]);
    let ledger = shared_ledger();
    let coordinator = forced_coordinator(surface.clone(), Arc::clone(&ledger));

    let reactor = async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        coordinator.hub().publish(cheese_reaction(10, Actor::human(U1)));
    };
    let inbound = message(Actor::human(U2), 10);
    let (outcome, ()) = tokio::join!(coordinator.handle_message(&inbound), reactor);

    assert_eq!(
        outcome.unwrap(),
        DropOutcome::Collected {
            collector: U1,
            balance: 1
        }
    );
    assert_eq!(ledger.lock().await.get(U1), 1);

    let posted = surface.posted();
    assert_eq!(
        posted[0],
        Posted::Message {
            channel: CHANNEL,
            text: "A wild cheese appeared!".to_owned()
        }
    );
    assert_eq!(
        posted[1],
        Posted::Reaction {
            message: MessageId(10),
            emoji: CHEESE.to_owned()
        }
    );
    assert_eq!(posted[2], Posted::Cleared { message: MessageId(10) });
    assert_eq!(surface.texts().last().unwrap(), "\u{1F44D} U1 collected the \u{1F9C0}!");
}

#[tokio::test(start_paused = true)]
async fn nobody_collecting_leaves_the_ledger_unchanged() {
    let surface = FakeSurface::default();
    let ledger = shared_ledger();
    let coordinator = forced_coordinator(surface.clone(), Arc::clone(&ledger));
    let started = tokio::time::Instant::now();

    let outcome = coordinator
        .handle_message(&message(Actor::human(U1), 10))
        .await
        .unwrap();

    assert_eq!(outcome, DropOutcome::TimedOut);
    assert_eq!(started.elapsed(), Duration::from_secs(60));
    assert!(ledger.lock().await.is_empty());
    assert!(surface.texts().last().unwrap().contains("nobody collected"));
    assert!(surface.posted().contains(&Posted::Cleared { message: MessageId(10) }));
}

#[tokio::test(start_paused = true)]
async fn unresolvable_collector_is_named_by_mention() {
    let surface = FakeSurface::default();
    let coordinator = forced_coordinator(surface.clone(), shared_ledger());

    let reactor = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        coordinator.hub().publish(cheese_reaction(10, Actor::human(U1)));
    };
    let inbound = message(Actor::human(U2), 10);
    let (outcome, ()) = tokio::join!(coordinator.handle_message(&inbound), reactor);

    assert!(matches!(outcome.unwrap(), DropOutcome::Collected { .. }));
    assert!(surface.texts().last().unwrap().contains("<@1>"));
}

#[tokio::test(start_paused = true)]
async fn failing_to_clear_reactions_does_not_fail_the_drop() {
    let surface = FakeSurface {
        fail_clears: true,
        ..FakeSurface::default()
    };
    let coordinator = forced_coordinator(surface.clone(), shared_ledger());

    let outcome = coordinator
        .handle_message(&message(Actor::human(U1), 10))
        .await
        .unwrap();

    assert_eq!(outcome, DropOutcome::TimedOut);
    assert!(surface.texts().last().unwrap().contains("nobody collected"));
}

#[tokio::test(start_paused = true)]
async fn bots_and_direct_messages_are_ignored() {
    let surface = FakeSurface::default();
    let coordinator = forced_coordinator(surface.clone(), shared_ledger());

    let from_bot = message(Actor::bot(U1), 10);
    let mut direct = message(Actor::human(U1), 11);
    direct.channel_kind = ChannelKind::Direct;

    assert_eq!(coordinator.handle_message(&from_bot).await.unwrap(), DropOutcome::Ignored);
    assert_eq!(coordinator.handle_message(&direct).await.unwrap(), DropOutcome::Ignored);
    assert!(surface.posted().is_empty());
}

#[tokio::test]
async fn losing_the_coin_flip_posts_nothing() {
    let surface = FakeSurface::default();
    let coordinator = forced_coordinator(surface.clone(), shared_ledger())
        .with_sampler(DropSampler::Fixed(false));

    let outcome = coordinator
        .handle_message(&message(Actor::human(U1), 10))
        .await
        .unwrap();

    assert_eq!(outcome, DropOutcome::NotSampled);
    assert!(surface.posted().is_empty());
}

#[tokio::test]
async fn cooldown_denies_a_drop_with_a_notice() {
    let surface = FakeSurface::default();
    let ledger = shared_ledger();
    let coordinator = DropCoordinator::new(
        surface.clone(),
        ReactionHub::new(),
        ledger,
        Tunables::new(120, 60, false).shared(),
        &CheeseConfig::default(),
    )
    .with_sampler(DropSampler::Fixed(true))
    .with_gate(CooldownGate::new(Utc::now()));

    let outcome = coordinator
        .handle_message(&message(Actor::human(U1), 10))
        .await
        .unwrap();

    match outcome {
        DropOutcome::CoolingDown { remaining } => {
            assert!(remaining > Duration::from_secs(100));
        }
        other => panic!("expected a cooldown denial, got {other:?}"),
    }
    assert_eq!(surface.texts(), vec!["No \u{1F9C0} for you!".to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn concurrent_drops_resolve_independently() {
    let surface = FakeSurface::with_names(&[(U1, "U1"), (U2, "U2")]);
    let ledger = shared_ledger();
    let coordinator = forced_coordinator(surface.clone(), Arc::clone(&ledger));

    let reactor = async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        coordinator.hub().publish(cheese_reaction(20, Actor::human(U2)));
        tokio::time::sleep(Duration::from_secs(2)).await;
        coordinator.hub().publish(cheese_reaction(10, Actor::human(U1)));
        coordinator.hub().publish(cheese_reaction(20, Actor::human(U1)));
    };
    let (from_u1, from_u2) = (message(Actor::human(U1), 10), message(Actor::human(U2), 20));
    let (first, second, ()) = tokio::join!(
        coordinator.handle_message(&from_u1),
        coordinator.handle_message(&from_u2),
        reactor
    );

    assert_eq!(
        first.unwrap(),
        DropOutcome::Collected {
            collector: U1,
            balance: 1
        }
    );
    assert_eq!(
        second.unwrap(),
        DropOutcome::Collected {
            collector: U2,
            balance: 1
        }
    );
    let ledger = ledger.lock().await;
    assert_eq!(ledger.get(U1), 1);
    assert_eq!(ledger.get(U2), 1);
    assert_eq!(coordinator.hub().subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn bot_reactions_never_collect() {
    let surface = FakeSurface::default();
    let ledger = shared_ledger();
    let coordinator = forced_coordinator(surface.clone(), Arc::clone(&ledger));

    let reactor = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        coordinator.hub().publish(cheese_reaction(10, Actor::bot(UserId(50))));
    };
    let inbound = message(Actor::human(U1), 10);
    let (outcome, ()) = tokio::join!(coordinator.handle_message(&inbound), reactor);

    assert_eq!(outcome.unwrap(), DropOutcome::TimedOut);
    assert!(ledger.lock().await.is_empty());
}

// =========================================================================
// Commands
// =========================================================================

fn handler(surface: FakeSurface, ledger: SharedLedger, tunables: Tunables) -> CommandHandler<FakeSurface> {
    CommandHandler::new(surface, ledger, AdminPolicy::new([ADMIN], tunables.shared()))
}

async fn seeded_ledger(balances: &[(UserId, u64)]) -> SharedLedger {
    let ledger = shared_ledger();
    {
        let mut guard = ledger.lock().await;
        for (user, amount) in balances {
            guard.credit(*user, *amount);
        }
    }
    ledger
}

#[tokio::test]
async fn mine_reports_a_balance_or_its_absence() {
    let ledger = seeded_ledger(&[(U1, 3)]).await;
    let handler = handler(FakeSurface::default(), ledger, Tunables::default());

    match handler.handle(&Actor::human(U1), Command::Mine).await {
        Reply::Embed(embed) => {
            assert_eq!(embed.title, "\u{1F9C0} collected");
            assert_eq!(embed.description, "You've collected 3 \u{1F9C0}");
        }
        other => panic!("expected an embed, got {other:?}"),
    }

    let reply = handler.handle(&Actor::human(U2), Command::Mine).await;
    assert_eq!(
        reply,
        Reply::text("Sorry, you don't have any \u{1F9C0} yet \u{1F61E}")
    );
}

#[tokio::test]
async fn list_ranks_collectors_by_count() {
    let surface = FakeSurface::with_names(&[(U1, "alice"), (U2, "bob")]);
    let ledger = seeded_ledger(&[(U1, 2), (U2, 5), (UserId(3), 1)]).await;
    let handler = handler(surface, ledger, Tunables::default());

    let Reply::Embed(embed) = handler
        .handle(&Actor::human(U1), Command::List { limit: Some(2) })
        .await
    else {
        panic!("expected an embed");
    };
    assert_eq!(embed.title, "Top 2 \u{1F9C0} collectors");
    assert_eq!(embed.description, "  1. bob: 5\n  2. alice: 2");
}

#[tokio::test]
async fn list_caps_large_limits_outside_debug() {
    let ledger = seeded_ledger(&[(U1, 1)]).await;
    let strict = handler(FakeSurface::default(), Arc::clone(&ledger), Tunables::new(120, 60, false));

    let reply = strict
        .handle(&Actor::human(U1), Command::List { limit: Some(50) })
        .await;
    let Reply::Embed(embed) = reply else {
        panic!("expected an embed");
    };
    assert_eq!(embed.title, "Top 50 \u{1F9C0} collectors");
    assert!(embed.description.starts_with("Limiting output to top 20\n"));
    assert!(embed.description.contains("<@1>: 1"));

    let relaxed = handler(FakeSurface::default(), ledger, Tunables::new(120, 60, true));
    let reply = relaxed
        .handle(&Actor::human(U1), Command::List { limit: Some(50) })
        .await;
    assert!(!reply.body().contains("Limiting"));
}

/// Formatted log output from the subscriber installed on the test thread.
#[derive(Debug, Clone, Default)]
struct CapturedLogs(Arc<StdMutex<Vec<u8>>>);

impl CapturedLogs {
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn debug_mode_logs_standings_after_a_give() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let ledger = seeded_ledger(&[(U1, 10)]).await;
    let giver = Actor::human(U1);
    let give = Command::Give {
        to: Actor::human(U2),
        amount: Some(3),
    };

    let quiet = handler(FakeSurface::default(), Arc::clone(&ledger), Tunables::new(120, 60, false));
    assert_eq!(
        quiet.handle(&giver, give.clone()).await.body(),
        "You gave <@2> 3 \u{1F9C0}!"
    );
    assert!(logs.text().contains("cheese transferred"));
    assert!(!logs.text().contains("current cheese standings"));

    let verbose = handler(FakeSurface::default(), Arc::clone(&ledger), Tunables::new(120, 60, true));
    assert_eq!(
        verbose.handle(&giver, give).await.body(),
        "You gave <@2> 3 \u{1F9C0}!"
    );
    let text = logs.text();
    assert!(text.contains("current cheese standings"));
    assert!(text.contains("UserId(2), 6"));

    let refused = Command::Give {
        to: Actor::human(U1),
        amount: Some(1),
    };
    let before = text.matches("current cheese standings").count();
    assert!(verbose.handle(&giver, refused).await.body().contains("not yourself"));
    assert_eq!(logs.text().matches("current cheese standings").count(), before);
}

#[tokio::test]
async fn give_moves_cheese_and_reports_rejections() {
    let ledger = seeded_ledger(&[(U1, 10)]).await;
    let handler = handler(FakeSurface::default(), Arc::clone(&ledger), Tunables::default());
    let giver = Actor::human(U1);

    let give = |to: Actor, amount: Option<i64>| Command::Give { to, amount };

    assert_eq!(
        handler.handle(&giver, give(Actor::human(U2), None)).await,
        Reply::text("You gave <@2> 5 \u{1F9C0}!")
    );
    assert_eq!(
        handler.handle(&giver, give(Actor::human(U1), Some(1))).await.body(),
        "You can only give \u{1F9C0} to someone else, not yourself silly!"
    );
    assert_eq!(
        handler.handle(&giver, give(Actor::bot(UserId(50)), Some(1))).await.body(),
        "You cannot give bots \u{1F9C0}!"
    );
    assert_eq!(
        handler.handle(&giver, give(Actor::human(U2), Some(0))).await.body(),
        "You must specify an amount above 0"
    );
    assert_eq!(
        handler.handle(&giver, give(Actor::human(U2), Some(-3))).await.body(),
        "You must specify an amount above 0"
    );
    assert_eq!(
        handler.handle(&giver, give(Actor::human(U2), Some(6))).await.body(),
        "You don't have enough \u{1F9C0}, you only have 5 \u{1F9C0}"
    );
    assert_eq!(
        handler
            .handle(&Actor::human(UserId(3)), give(Actor::human(U2), Some(1)))
            .await
            .body(),
        "You have no \u{1F9C0} to give away"
    );

    let ledger = ledger.lock().await;
    assert_eq!(ledger.get(U1), 5);
    assert_eq!(ledger.get(U2), 5);
    assert_eq!(ledger.total(), 10);
}

#[tokio::test]
async fn admin_commands_reject_non_admins_without_mutation() {
    let handler = handler(FakeSurface::default(), shared_ledger(), Tunables::new(120, 60, false));
    let outsider = Actor::human(U1);

    for command in [
        Command::Debug { flag: Some(true) },
        Command::Cooldown { seconds: Some(90) },
        Command::Timeout { seconds: Some(30) },
        Command::Cooldown { seconds: None },
    ] {
        assert_eq!(
            handler.handle(&outsider, command).await.body(),
            "Sorry, you are not allowed to use this command!"
        );
    }

    assert_eq!(handler.policy().cooldown().await, 120);
    assert_eq!(handler.policy().timeout().await, 60);
    assert!(!handler.policy().debug().await);
}

#[tokio::test]
async fn admins_read_and_edit_tunables() {
    let handler = handler(FakeSurface::default(), shared_ledger(), Tunables::new(120, 60, false));
    let admin = Actor::human(ADMIN);

    assert_eq!(
        handler.handle(&admin, Command::Cooldown { seconds: None }).await.body(),
        "Cooldown currently set to 120"
    );
    assert_eq!(
        handler.handle(&admin, Command::Timeout { seconds: None }).await.body(),
        "Timeout currently set to 60"
    );
    assert_eq!(
        handler.handle(&admin, Command::Cooldown { seconds: Some(30) }).await.body(),
        "Not allowed to be less than the timeout of 60 seconds"
    );
    assert_eq!(
        handler.handle(&admin, Command::Timeout { seconds: Some(20) }).await.body(),
        "Timeout set to 20 seconds"
    );
    assert_eq!(
        handler.handle(&admin, Command::Cooldown { seconds: Some(30) }).await.body(),
        "Cooldown set to 30 seconds"
    );
    assert_eq!(
        handler.handle(&admin, Command::Timeout { seconds: Some(45) }).await.body(),
        "Not allowed to be more than the cooldown of 30 seconds"
    );
    assert_eq!(
        handler.handle(&admin, Command::Timeout { seconds: Some(5) }).await.body(),
        "Not allowed to be less than 10 seconds"
    );
    assert_eq!(
        handler.handle(&admin, Command::Debug { flag: None }).await.body(),
        "Debug is currently disabled"
    );
    assert_eq!(
        handler.handle(&admin, Command::Debug { flag: Some(true) }).await.body(),
        "Debug enabled"
    );
    assert_eq!(
        handler.handle(&admin, Command::Timeout { seconds: Some(5) }).await.body(),
        "Timeout set to 5 seconds"
    );
}

#[tokio::test]
async fn execute_posts_text_and_embeds_to_the_invoking_channel() {
    let surface = FakeSurface::default();
    let ledger = seeded_ledger(&[(U1, 1)]).await;
    let handler = handler(surface.clone(), ledger, Tunables::default());

    handler
        .execute(CHANNEL, &Actor::human(U2), Command::Mine)
        .await
        .unwrap();
    handler
        .execute(CHANNEL, &Actor::human(U1), Command::Mine)
        .await
        .unwrap();

    let posted = surface.posted();
    assert!(matches!(&posted[0], Posted::Message { channel, .. } if *channel == CHANNEL));
    assert!(matches!(&posted[1], Posted::Embed { channel, .. } if *channel == CHANNEL));
}
