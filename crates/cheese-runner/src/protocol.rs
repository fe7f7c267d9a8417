//! JSON-lines frames exchanged with the chat gateway.
//!
//! One JSON object per line in each direction, discriminated by `type`.
//!
//! ```text
//! stdin  {"type":"message","author":{"id":1},"channel_id":7,"message_id":10}
//! stdin  {"type":"reaction","channel_id":7,"message_id":10,"emoji":"🧀","actor":{"id":2}}
//! stdin  {"type":"command","channel_id":7,"invoker":{"id":1},"command":{"name":"mine"}}
//! stdout {"type":"send_message","channel_id":7,"message_id":1,"text":"A wild cheese appeared!"}
//! ```

use cheese_core::Embed;
use cheese_types::{Actor, ChannelId, Command, MessageEvent, MessageId, ReactionEvent};
use serde::{Deserialize, Serialize};

/// A frame read from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// A chat message was posted.
    Message(MessageEvent),
    /// A reaction was added to a message.
    Reaction(ReactionEvent),
    /// A `cheese` command was invoked.
    Command {
        /// Where to answer.
        channel_id: ChannelId,
        /// Who invoked it.
        invoker: Actor,
        /// The parsed subcommand.
        command: Command,
    },
}

impl Inbound {
    /// Parse one inbound line.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// A frame written to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Post a text message.
    SendMessage {
        /// Target channel.
        channel_id: ChannelId,
        /// Identifier assigned to the new message.
        message_id: MessageId,
        /// Message body.
        text: String,
    },
    /// Post an embed.
    SendEmbed {
        /// Target channel.
        channel_id: ChannelId,
        /// Identifier assigned to the new message.
        message_id: MessageId,
        /// The embed.
        embed: Embed,
    },
    /// React to a message.
    AddReaction {
        /// Channel of the message.
        channel_id: ChannelId,
        /// The message.
        message_id: MessageId,
        /// Emoji to add.
        emoji: String,
    },
    /// Remove every reaction from a message.
    ClearReactions {
        /// Channel of the message.
        channel_id: ChannelId,
        /// The message.
        message_id: MessageId,
    },
}
