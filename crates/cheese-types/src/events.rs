//! Inbound chat events and the ephemeral drop event.
//!
//! The chat surface delivers [`MessageEvent`]s and [`ReactionEvent`]s; the
//! coordinator turns a lucky message into a [`DropEvent`] that lives exactly
//! as long as its collection race.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, MessageId, UserId};
use crate::symbols;

/// A chat participant as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The participant's identifier.
    pub id: UserId,
    /// Whether the participant is a bot (bots never collect or receive cheese).
    #[serde(default)]
    pub is_bot: bool,
    /// Display name, when the surface knows it.
    #[serde(default)]
    pub name: Option<String>,
}

impl Actor {
    /// A human participant without a known display name.
    pub const fn human(id: UserId) -> Self {
        Self {
            id,
            is_bot: false,
            name: None,
        }
    }

    /// A bot participant without a known display name.
    pub const fn bot(id: UserId) -> Self {
        Self {
            id,
            is_bot: true,
            name: None,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Kind of channel a message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// A shared channel in a server.
    #[default]
    Guild,
    /// A one-to-one private conversation.
    Direct,
}

/// A message posted somewhere on the chat surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Who wrote the message.
    pub author: Actor,
    /// Where it was written.
    pub channel_id: ChannelId,
    /// What kind of channel that is.
    #[serde(default)]
    pub channel_kind: ChannelKind,
    /// The message's own identifier.
    pub message_id: MessageId,
}

/// A reaction added to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    /// Channel containing the reacted message.
    pub channel_id: ChannelId,
    /// The reacted message.
    pub message_id: MessageId,
    /// The reaction symbol, as a unicode string.
    pub emoji: String,
    /// Who reacted.
    pub actor: Actor,
}

/// A spawned collectible attached to one message.
///
/// Never persisted. Created when a message passes both the sampler and the
/// cooldown gate, consumed by exactly one collection race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    /// The message the cheese was attached to.
    pub message_id: MessageId,
    /// The channel the message lives in.
    pub channel_id: ChannelId,
    /// When the drop was spawned.
    pub spawned_at: DateTime<Utc>,
    /// The reward symbol collectors must react with.
    pub symbol: &'static str,
}

impl DropEvent {
    /// Spawn a cheese drop on the given message.
    pub const fn cheese(
        message_id: MessageId,
        channel_id: ChannelId,
        spawned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            message_id,
            channel_id,
            spawned_at,
            symbol: symbols::CHEESE,
        }
    }

    /// Whether a reaction collects this drop: the reward symbol, from a
    /// human, on exactly this message.
    pub fn accepts(&self, reaction: &ReactionEvent) -> bool {
        !reaction.actor.is_bot
            && reaction.message_id == self.message_id
            && reaction.emoji == self.symbol
    }
}
