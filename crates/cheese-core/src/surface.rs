//! Contract between the engine and the chat platform.
//!
//! The engine never talks to a chat network directly. It posts through a
//! [`ChatSurface`] and learns about reactions through a [`ReactionHub`]
//! that the surface glue publishes into.
//!
//! # Reactions
//!
//! The hub routes each reaction by message id. A collection race subscribes
//! to its drop message before the drop is announced and gets its own
//! unbounded queue, so reactions elsewhere never crowd out the ones that
//! matter. Dropping the subscription removes the route, so a resolved race
//! never leaves a listener behind. Publishing with no race on the message
//! is a no-op.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cheese_types::{ChannelId, MessageId, ReactionEvent, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

/// Embed accent color used by every cheese embed.
pub const CHEESE_COLOR: u32 = 0x00FF_8000;

/// Errors reported by a chat surface.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// A message or embed could not be posted.
    #[error("failed to post to channel {channel}: {message}")]
    Send {
        /// Target channel.
        channel: ChannelId,
        /// Description of the failure.
        message: String,
    },

    /// A reaction could not be added or cleared.
    #[error("failed to update reactions on message {target}: {message}")]
    Reaction {
        /// Target message.
        target: MessageId,
        /// Description of the failure.
        message: String,
    },

    /// A user could not be resolved to a display name.
    #[error("failed to resolve user {user}: {message}")]
    Lookup {
        /// The user being resolved.
        user: UserId,
        /// Description of the failure.
        message: String,
    },
}

/// A titled, colored message card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Card title.
    pub title: String,
    /// Card body.
    pub description: String,
    /// Accent color as `0xRRGGBB`.
    pub color: u32,
}

impl Embed {
    /// An embed in the cheese accent color.
    pub fn cheese(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color: CHEESE_COLOR,
        }
    }
}

/// What a command answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A plain text message.
    Text(String),
    /// An embed card.
    Embed(Embed),
}

impl Reply {
    /// A plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The visible text of the reply, for logging and tests.
    pub fn body(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Embed(embed) => &embed.description,
        }
    }
}

/// Operations the engine needs from the chat platform.
///
/// Returned futures are not required to be `Send`: the engine runs every
/// task on one thread.
pub trait ChatSurface {
    /// Post a text message and return its identifier.
    fn send_message(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> impl Future<Output = Result<MessageId, SurfaceError>>;

    /// Post an embed and return its identifier.
    fn send_embed(
        &self,
        channel: ChannelId,
        embed: &Embed,
    ) -> impl Future<Output = Result<MessageId, SurfaceError>>;

    /// React to a message with the given emoji.
    fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> impl Future<Output = Result<(), SurfaceError>>;

    /// Remove every reaction from a message.
    fn clear_reactions(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> impl Future<Output = Result<(), SurfaceError>>;

    /// Resolve a user to a human-readable name.
    fn display_name(&self, user: UserId) -> impl Future<Output = Result<String, SurfaceError>>;
}

/// Pending races keyed by the drop message they listen on.
type Routes = HashMap<MessageId, Vec<Route>>;

#[derive(Debug)]
struct Route {
    token: u64,
    tx: mpsc::UnboundedSender<ReactionEvent>,
}

/// Routes reaction events to the races waiting on their message.
#[derive(Debug, Clone, Default)]
pub struct ReactionHub {
    routes: Arc<Mutex<Routes>>,
    next_token: Arc<AtomicU64>,
}

impl ReactionHub {
    /// Create a hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a reaction to the races listening on its message. Returns
    /// how many races saw it.
    pub fn publish(&self, reaction: ReactionEvent) -> usize {
        let routes = lock(&self.routes);
        let Some(listeners) = routes.get(&reaction.message_id) else {
            trace!(message_id = %reaction.message_id, "reaction for no pending race");
            return 0;
        };
        let delivered = listeners
            .iter()
            .filter(|route| route.tx.send(reaction.clone()).is_ok())
            .count();
        trace!(message_id = %reaction.message_id, delivered, "reaction published");
        delivered
    }

    /// Start listening for reactions on `message`. Dropping the returned
    /// subscription unsubscribes.
    pub fn subscribe(&self, message: MessageId) -> ReactionSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        lock(&self.routes)
            .entry(message)
            .or_default()
            .push(Route { token, tx });
        ReactionSubscription {
            message,
            token,
            rx,
            routes: Arc::clone(&self.routes),
        }
    }

    /// Number of races currently listening.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.routes).values().map(Vec::len).sum()
    }
}

/// Reactions on one message, buffered until the race reads them.
#[derive(Debug)]
pub struct ReactionSubscription {
    message: MessageId,
    token: u64,
    rx: mpsc::UnboundedReceiver<ReactionEvent>,
    routes: Arc<Mutex<Routes>>,
}

impl ReactionSubscription {
    /// Next reaction on the message, in publish order.
    pub async fn recv(&mut self) -> Option<ReactionEvent> {
        self.rx.recv().await
    }
}

impl Drop for ReactionSubscription {
    fn drop(&mut self) {
        let mut routes = lock(&self.routes);
        if let Some(listeners) = routes.get_mut(&self.message) {
            listeners.retain(|route| route.token != self.token);
            if listeners.is_empty() {
                routes.remove(&self.message);
            }
        }
    }
}

/// The route table stays consistent across a panicking holder, so a
/// poisoned lock is still usable.
fn lock(routes: &Mutex<Routes>) -> MutexGuard<'_, Routes> {
    routes.lock().unwrap_or_else(PoisonError::into_inner)
}
