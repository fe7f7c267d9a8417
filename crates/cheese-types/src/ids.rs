//! Type-safe identifier wrappers around chat snowflakes.
//!
//! Chat platforms hand out 64-bit snowflake identifiers for users,
//! channels, and messages. Wrapping each in its own newtype prevents a
//! message ID from ever being credited cheese.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a `u64` snowflake with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Return the inner snowflake value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a chat user (human or bot).
    UserId
}

define_id! {
    /// Identifier of a chat channel.
    ChannelId
}

define_id! {
    /// Identifier of a single chat message.
    MessageId
}

impl UserId {
    /// Render the user as a chat mention (`<@id>`).
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}
