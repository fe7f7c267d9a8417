//! The ledger: per-user cheese balances with checked transfers.
//!
//! # Design
//!
//! - **Single owner**: balances live here and nowhere else.
//! - **Non-negative**: counts are `u64`; a debit never goes below zero.
//! - **Atomic mutations**: a transfer computes both new balances before
//!   writing either, then persists once. No caller can observe half a
//!   transfer.
//! - **Write-through**: every mutation rewrites the backing file. A failed
//!   write is logged and the next mutation tries again.

use std::collections::BTreeMap;
use std::path::PathBuf;

use cheese_types::{Actor, UserId};
use tracing::{debug, info, warn};

use crate::store::LedgerStore;
use crate::{PersistError, TransferError};

/// Balances of both parties after a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Sender's balance after the debit.
    pub from_balance: u64,
    /// Recipient's balance after the credit.
    pub to_balance: u64,
}

/// Durable mapping from user to cheese count.
///
/// An absent user is equivalent to a user holding zero, except that
/// [`contains`](Self::contains) tells them apart.
#[derive(Debug, Default)]
pub struct Ledger {
    counts: BTreeMap<UserId, u64>,
    store: Option<LedgerStore>,
}

impl Ledger {
    /// A ledger with no backing file. Mutations are never persisted.
    pub const fn in_memory() -> Self {
        Self {
            counts: BTreeMap::new(),
            store: None,
        }
    }

    /// Open the ledger stored at `path`.
    ///
    /// Never fails: a missing or corrupt file yields an empty ledger and a
    /// warning. The file is (re)written on the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = LedgerStore::new(path);
        let counts = match store.load() {
            Ok(counts) => {
                info!(
                    path = %store.path().display(),
                    users = counts.len(),
                    "cheese ledger loaded"
                );
                counts
            }
            Err(e) => {
                warn!(
                    path = %store.path().display(),
                    error = %e,
                    "unable to load cheese ledger, starting empty"
                );
                BTreeMap::new()
            }
        };

        Self {
            counts,
            store: Some(store),
        }
    }

    /// Current count for a user; zero if they have never held cheese.
    pub fn get(&self, user: UserId) -> u64 {
        self.counts.get(&user).copied().unwrap_or(0)
    }

    /// Whether the user has an entry at all.
    pub fn contains(&self, user: UserId) -> bool {
        self.counts.contains_key(&user)
    }

    /// Number of users with an entry.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no user has an entry.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of every balance.
    pub fn total(&self) -> u64 {
        self.counts
            .values()
            .fold(0_u64, |acc, count| acc.saturating_add(*count))
    }

    /// The `limit` largest balances, highest first. Ties are broken by user
    /// ID so the ranking is stable.
    pub fn top(&self, limit: usize) -> Vec<(UserId, u64)> {
        let mut ranked: Vec<(UserId, u64)> =
            self.counts.iter().map(|(user, count)| (*user, *count)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// All balances, ordered by user ID.
    pub const fn balances(&self) -> &BTreeMap<UserId, u64> {
        &self.counts
    }

    /// Add `amount` to a user's balance and persist. Returns the new balance.
    ///
    /// A zero amount changes nothing and skips the write.
    pub fn credit(&mut self, user: UserId, amount: u64) -> u64 {
        if amount == 0 {
            return self.get(user);
        }

        let balance = self.counts.entry(user).or_insert(0);
        *balance = balance.saturating_add(amount);
        let new_balance = *balance;

        debug!(user = %user, amount, balance = new_balance, "cheese credited");
        self.persist();
        new_balance
    }

    /// Move `amount` from `from` to `to` and persist once.
    ///
    /// Checks run in this order: self-transfer, bot recipient, zero amount,
    /// then balance (an empty sender or one holding less than `amount`).
    ///
    /// # Errors
    ///
    /// Returns a [`TransferError`] describing the first failed check. The
    /// ledger is unchanged on error.
    pub fn transfer(
        &mut self,
        from: UserId,
        to: &Actor,
        amount: u64,
    ) -> Result<TransferReceipt, TransferError> {
        if from == to.id {
            return Err(TransferError::InvalidTarget);
        }
        if to.is_bot {
            return Err(TransferError::IneligibleRecipient);
        }
        if amount == 0 {
            return Err(TransferError::InvalidAmount);
        }

        let available = self.get(from);
        let insufficient = TransferError::InsufficientBalance {
            available,
            requested: amount,
        };
        if available == 0 {
            return Err(insufficient);
        }
        let from_balance = available.checked_sub(amount).ok_or(insufficient)?;
        let to_balance = self.get(to.id).saturating_add(amount);

        self.counts.insert(from, from_balance);
        self.counts.insert(to.id, to_balance);

        info!(from = %from, to = %to.id, amount, "cheese transferred");
        self.persist();

        Ok(TransferReceipt {
            from_balance,
            to_balance,
        })
    }

    /// Write every balance to the backing file, logging any failure.
    ///
    /// In-memory state stays authoritative when the write fails; the next
    /// mutation writes the full map again.
    pub fn persist(&self) {
        if let Err(e) = self.try_persist() {
            warn!(error = %e, "unable to save cheese ledger");
        }
    }

    /// Write every balance to the backing file.
    ///
    /// In-memory ledgers succeed without doing anything.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the write fails.
    pub fn try_persist(&self) -> Result<(), PersistError> {
        match &self.store {
            Some(store) => store.save(&self.counts),
            None => Ok(()),
        }
    }
}
