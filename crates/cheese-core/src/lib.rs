//! Drop timing engine for the cheese bot.
//!
//! Every inbound chat message is a chance for a cheese to drop. This crate
//! decides whether one does, throttles drops with a channel-wide cooldown,
//! races a bounded collection window against user reactions, and credits
//! the winner in the [`cheese_ledger::Ledger`].
//!
//! # Flow
//!
//! ```text
//! MessageEvent --> DropSampler --> CooldownGate --> announce + react
//!                                                        |
//!        Ledger.credit <-- Collected <-- CollectionRace <-+--> TimedOut
//! ```
//!
//! # Modules
//!
//! - [`config`] -- File configuration with non-fatal loading
//! - [`tunables`] -- Runtime-adjustable cooldown, timeout, and debug flag
//! - [`gate`] -- The channel-wide [`CooldownGate`]
//! - [`sampler`] -- The weighted [`DropSampler`]
//! - [`surface`] -- The [`ChatSurface`] contract and the [`ReactionHub`]
//! - [`race`] -- The [`CollectionRace`] state machine
//! - [`coordinator`] -- The [`DropCoordinator`] tying it all together
//! - [`admin`] -- The [`AdminPolicy`] guarding tunables
//! - [`commands`] -- The [`CommandHandler`] behind the `cheese` command group
//! - [`notice`] -- User-facing notice texts

pub mod admin;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gate;
pub mod notice;
pub mod race;
pub mod sampler;
pub mod surface;
pub mod tunables;

pub use admin::{AdminError, AdminPolicy, VerbosityHook};
pub use commands::CommandHandler;
pub use config::{CheeseConfig, ConfigError};
pub use coordinator::{DropCoordinator, DropOutcome, SharedLedger};
pub use error::CoreError;
pub use gate::CooldownGate;
pub use race::{CollectionRace, RaceOutcome};
pub use sampler::{ChanceWeight, DropSampler};
pub use surface::{ChatSurface, Embed, ReactionHub, ReactionSubscription, Reply, SurfaceError};
pub use tunables::{SharedTunables, Tunables};
