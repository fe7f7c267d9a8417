//! [`ChatSurface`] over JSON lines.
//!
//! Outbound frames are queued on an unbounded channel and written by a
//! single writer task, so posting never blocks the engine. The bridge hands
//! out its own message identifiers and learns display names from the
//! actors it sees on inbound frames.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cheese_core::{ChatSurface, Embed, SurfaceError};
use cheese_types::{Actor, ChannelId, MessageId, UserId};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, trace};

use crate::error::RunnerError;
use crate::protocol::Outbound;

/// First identifier handed to bridge-posted messages.
const FIRST_MESSAGE_ID: u64 = 1;

/// The line-protocol chat surface.
#[derive(Debug, Clone)]
pub struct LineBridge {
    outbound: mpsc::UnboundedSender<Outbound>,
    next_message_id: Arc<AtomicU64>,
    names: Arc<Mutex<HashMap<UserId, String>>>,
}

impl LineBridge {
    /// A bridge and the receiving end its frames are queued on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let bridge = Self {
            outbound,
            next_message_id: Arc::new(AtomicU64::new(FIRST_MESSAGE_ID)),
            names: Arc::new(Mutex::new(HashMap::new())),
        };
        (bridge, rx)
    }

    /// Cache the display name carried by `actor`, if any.
    pub async fn remember(&self, actor: &Actor) {
        if let Some(name) = &actor.name {
            let mut names = self.names.lock().await;
            if names.get(&actor.id) != Some(name) {
                trace!(user = %actor.id, name = %name, "display name cached");
                names.insert(actor.id, name.clone());
            }
        }
    }

    fn allocate_id(&self) -> MessageId {
        MessageId(self.next_message_id.fetch_add(1, Ordering::Relaxed))
    }

    fn send_frame(&self, frame: Outbound) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.outbound.send(frame)
    }
}

impl ChatSurface for LineBridge {
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<MessageId, SurfaceError> {
        let message_id = self.allocate_id();
        self.send_frame(Outbound::SendMessage {
            channel_id: channel,
            message_id,
            text: text.to_owned(),
        })
        .map_err(|e| SurfaceError::Send {
            channel,
            message: e.to_string(),
        })?;
        Ok(message_id)
    }

    async fn send_embed(&self, channel: ChannelId, embed: &Embed) -> Result<MessageId, SurfaceError> {
        let message_id = self.allocate_id();
        self.send_frame(Outbound::SendEmbed {
            channel_id: channel,
            message_id,
            embed: embed.clone(),
        })
        .map_err(|e| SurfaceError::Send {
            channel,
            message: e.to_string(),
        })?;
        Ok(message_id)
    }

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), SurfaceError> {
        self.send_frame(Outbound::AddReaction {
            channel_id: channel,
            message_id: message,
            emoji: emoji.to_owned(),
        })
        .map_err(|e| SurfaceError::Reaction {
            target: message,
            message: e.to_string(),
        })
    }

    async fn clear_reactions(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), SurfaceError> {
        self.send_frame(Outbound::ClearReactions {
            channel_id: channel,
            message_id: message,
        })
        .map_err(|e| SurfaceError::Reaction {
            target: message,
            message: e.to_string(),
        })
    }

    async fn display_name(&self, user: UserId) -> Result<String, SurfaceError> {
        self.names
            .lock()
            .await
            .get(&user)
            .cloned()
            .ok_or_else(|| SurfaceError::Lookup {
                user,
                message: "no display name seen yet".to_owned(),
            })
    }
}

/// Drain queued frames into `out`, one JSON object per line, until every
/// bridge handle is dropped.
pub async fn write_frames<W>(
    mut frames: mpsc::UnboundedReceiver<Outbound>,
    mut out: W,
) -> Result<(), RunnerError>
where
    W: AsyncWrite + Unpin,
{
    let mut written: u64 = 0;
    while let Some(frame) = frames.recv().await {
        let mut line = serde_json::to_vec(&frame)?;
        line.push(b'\n');
        out.write_all(&line).await?;
        out.flush().await?;
        written = written.saturating_add(1);
    }
    debug!(written, "outbound stream closed");
    Ok(())
}
