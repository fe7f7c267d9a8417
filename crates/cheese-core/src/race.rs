//! The collection window for one drop.
//!
//! ```text
//!            first qualifying reaction
//! Pending ---------------------------------> Collected(actor)
//!    |
//!    +--- timeout elapses ----------------> TimedOut
//! ```
//!
//! The race subscribes to its drop message on the [`ReactionHub`] when it is
//! opened, which the coordinator does before announcing the drop. Every
//! reaction on that message is queued in publish order until the race reads
//! it, so the first qualifying one always wins no matter how busy the rest
//! of the chat is. The subscription is dropped when [`CollectionRace::run`]
//! returns.
//!
//! There is no external cancellation: time or a qualifying reaction are the
//! only ways out.

use std::time::Duration;

use cheese_types::{Actor, DropEvent};
use tracing::debug;

use crate::surface::{ReactionHub, ReactionSubscription};

/// Terminal state of a collection race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome {
    /// A human reacted with the reward symbol in time.
    Collected {
        /// The winner.
        collector: Actor,
    },
    /// Nobody collected the drop before the window closed.
    TimedOut,
}

/// A pending race for one drop.
#[derive(Debug)]
pub struct CollectionRace {
    drop_event: DropEvent,
    reactions: ReactionSubscription,
}

impl CollectionRace {
    /// Subscribe to reactions for `drop_event`. Call before the drop is
    /// announced.
    pub fn open(drop_event: DropEvent, hub: &ReactionHub) -> Self {
        let reactions = hub.subscribe(drop_event.message_id);
        Self {
            drop_event,
            reactions,
        }
    }

    /// The drop this race is for.
    pub const fn drop_event(&self) -> &DropEvent {
        &self.drop_event
    }

    /// Wait for the first qualifying reaction, at most `timeout`.
    ///
    /// A reaction and the deadline arriving together resolve as
    /// [`RaceOutcome::TimedOut`]: only reactions strictly inside the window
    /// count. Non-qualifying reactions are ignored and the wait continues.
    pub async fn run(self, timeout: Duration) -> RaceOutcome {
        let Self {
            drop_event,
            mut reactions,
        } = self;

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);
        let mut listening = true;

        loop {
            tokio::select! {
                biased;

                () = &mut deadline => {
                    debug!(message_id = %drop_event.message_id, "collection window closed");
                    return RaceOutcome::TimedOut;
                }

                received = reactions.recv(), if listening => match received {
                    Some(reaction) if drop_event.accepts(&reaction) => {
                        debug!(
                            message_id = %drop_event.message_id,
                            collector = %reaction.actor.id,
                            "cheese collected"
                        );
                        return RaceOutcome::Collected {
                            collector: reaction.actor,
                        };
                    }
                    Some(reaction) => {
                        debug!(
                            message_id = %reaction.message_id,
                            emoji = %reaction.emoji,
                            actor = %reaction.actor.id,
                            "ignoring non-qualifying reaction"
                        );
                    }
                    None => {
                        // Without a reaction source only the timer can end the race.
                        listening = false;
                    }
                },
            }
        }
    }
}
