//! Durable per-user cheese ledger.
//!
//! The ledger is the single authority on how much cheese each user holds.
//! Nothing else caches or mutates counts. Every mutation is followed by a
//! full rewrite of the backing file, and a failed write never loses the
//! in-memory state: the next successful write reconciles the file.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`] struct: balances, credits, checked transfers.
//! - [`store`] -- The [`LedgerStore`]: a flat JSON document on disk.
//!
//! # Failure Policy
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | File missing or malformed at startup | Empty ledger, warning logged |
//! | Write fails after a mutation | Warning logged, memory stays authoritative |
//! | Transfer rejected | [`TransferError`], ledger untouched |
//!
//! # Usage
//!
//! ```
//! use cheese_ledger::Ledger;
//! use cheese_types::{Actor, UserId};
//!
//! let mut ledger = Ledger::in_memory();
//! let alice = UserId(1);
//! let bob = Actor::human(UserId(2));
//!
//! ledger.credit(alice, 3);
//! assert!(ledger.transfer(alice, &bob, 2).is_ok());
//! assert_eq!(ledger.get(alice), 1);
//! assert_eq!(ledger.get(bob.id), 2);
//! assert_eq!(ledger.total(), 3);
//! ```

pub mod ledger;
pub mod store;

// Re-export primary types at crate root.
pub use ledger::{Ledger, TransferReceipt};
pub use store::LedgerStore;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a transfer is refused. None of them change the ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The sender has nothing, or less than the requested amount.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// What the sender currently holds.
        available: u64,
        /// What the sender tried to give.
        requested: u64,
    },

    /// Sender and recipient are the same user.
    #[error("cannot transfer to yourself")]
    InvalidTarget,

    /// The recipient is a bot.
    #[error("recipient is not eligible to hold cheese")]
    IneligibleRecipient,

    /// The amount was zero.
    #[error("transfer amount must be positive")]
    InvalidAmount,
}

/// Errors reading the ledger file at startup.
///
/// Callers never propagate these; they fall back to an empty ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerLoadError {
    /// The file could not be read.
    #[error("failed to read ledger file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The file is not a JSON object of non-negative integers.
    #[error("failed to parse ledger file: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A key is not a user identifier.
    #[error("invalid user id in ledger file: {key}")]
    InvalidUserId {
        /// The offending key.
        key: String,
    },
}

/// Errors writing the ledger file.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Writing or renaming the file failed.
    #[error("failed to write ledger file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Serializing the balances failed.
    #[error("failed to serialize ledger: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
