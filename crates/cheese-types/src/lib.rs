//! Shared type definitions for the cheese drop engine.
//!
//! Every crate in the workspace speaks in these types: chat identifiers,
//! inbound chat events, the ephemeral [`DropEvent`], and the command surface.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for chat snowflake identifiers
//! - [`events`] -- Inbound message and reaction events, drop events
//! - [`commands`] -- The `cheese` command group and its subcommands
//! - [`symbols`] -- Emoji used in notices and as the reward symbol

pub mod commands;
pub mod events;
pub mod ids;
pub mod symbols;

// Re-export all public types at crate root for convenience.
pub use commands::Command;
pub use events::{Actor, ChannelKind, DropEvent, MessageEvent, ReactionEvent};
pub use ids::{ChannelId, MessageId, UserId};
