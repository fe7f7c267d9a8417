//! On-disk representation of the ledger.
//!
//! The file is a flat JSON object mapping decimal user IDs to counts:
//!
//! ```text
//! {"81549128361578496": 12, "81549128361578497": 3}
//! ```
//!
//! Writes go to a sibling `.tmp` file which is then renamed over the real
//! one, so a crash mid-write leaves either the old or the new document.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use cheese_types::UserId;

use crate::{LedgerLoadError, PersistError};

/// A JSON file holding the ledger balances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Point a store at the given file. Nothing is read or created yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all balances from disk.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerLoadError`] if the file is missing, unreadable, not a
    /// JSON object of non-negative integers, or keyed by something other
    /// than user IDs.
    pub fn load(&self) -> Result<BTreeMap<UserId, u64>, LedgerLoadError> {
        let contents = std::fs::read(&self.path)?;
        let raw: BTreeMap<String, u64> = serde_json::from_slice(&contents)?;

        raw.into_iter()
            .map(|(key, count)| {
                key.parse::<UserId>()
                    .map(|user| (user, count))
                    .map_err(|_parse| LedgerLoadError::InvalidUserId { key })
            })
            .collect()
    }

    /// Overwrite the file with the given balances.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if serialization, the temp-file write, or the
    /// rename fails. The previous file is left intact in every failure case.
    pub fn save(&self, counts: &BTreeMap<UserId, u64>) -> Result<(), PersistError> {
        let raw: BTreeMap<String, u64> = counts
            .iter()
            .map(|(user, count)| (user.to_string(), *count))
            .collect();
        let encoded = serde_json::to_vec(&raw)?;

        let tmp_path = self.path.with_extension("tmp");
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(&encoded)?;
        tmp.sync_all()?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
