//! Configuration loading for the cheese drop engine.
//!
//! The configuration file is read once at startup. It may be JSON (as in
//! `cheese_config.json`) or YAML; JSON is a subset of YAML, so both go
//! through the same parser. A missing or unreadable file is not
//! fatal: the engine logs a warning and runs on defaults.
//!
//! ```text
//! {
//!   "admin": 81549128361578496,
//!   "chance_weight": 20,
//!   "messages": ["A wild cheese appeared!", "Cheese incoming!"],
//!   "cooldown": 120,
//!   "timeout": 60,
//!   "debug": false
//! }
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use cheese_types::UserId;
use serde::Deserialize;
use tracing::warn;

use crate::sampler::ChanceWeight;
use crate::tunables::{MAX_COOLDOWN_SECONDS, MAX_TIMEOUT_SECONDS};

/// Announcement used when the configuration lists none.
pub const DEFAULT_DROP_MESSAGE: &str = "A wild cheese appeared!";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse the file content.
    #[error("failed to parse config: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Engine configuration as read from disk.
///
/// Values are taken verbatim; range enforcement happens when they are
/// turned into a [`ChanceWeight`] or [`Tunables`](crate::Tunables).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheeseConfig {
    /// A single admin identity.
    #[serde(default)]
    pub admin: Option<UserId>,

    /// Additional admin identities.
    #[serde(default)]
    pub admins: Vec<UserId>,

    /// Percent chance (clamped to 10-50) that a message drops a cheese.
    #[serde(default = "default_chance_weight")]
    pub chance_weight: i64,

    /// Announcements, one picked at random per drop.
    #[serde(default = "default_messages")]
    pub messages: Vec<String>,

    /// Seconds between drops.
    #[serde(default = "default_cooldown")]
    pub cooldown: u64,

    /// Seconds a drop stays collectable.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Verbose logging and relaxed admin floors.
    #[serde(default = "default_true")]
    pub debug: bool,

    /// Where the ledger lives.
    #[serde(default = "default_scores_file")]
    pub scores_file: PathBuf,
}

impl Default for CheeseConfig {
    fn default() -> Self {
        Self {
            admin: None,
            admins: Vec::new(),
            chance_weight: default_chance_weight(),
            messages: default_messages(),
            cooldown: default_cooldown(),
            timeout: default_timeout(),
            debug: true,
            scores_file: default_scores_file(),
        }
    }
}

impl CheeseConfig {
    /// Load configuration from a JSON or YAML file.
    ///
    /// `CHEESE_SCORES_FILE` overrides `scores_file` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content does not parse.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a JSON or YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string does not parse.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "unable to load cheese config, using defaults"
                );
                let mut config = Self::default();
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Every identity allowed to run admin commands.
    pub fn admin_ids(&self) -> BTreeSet<UserId> {
        self.admin.iter().chain(self.admins.iter()).copied().collect()
    }

    /// The drop chance, clamped into its legal range.
    pub fn chance_weight(&self) -> ChanceWeight {
        ChanceWeight::new(self.chance_weight)
    }

    /// Announcements, never empty.
    pub fn drop_messages(&self) -> Vec<String> {
        if self.messages.is_empty() {
            default_messages()
        } else {
            self.messages.clone()
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CHEESE_SCORES_FILE") {
            self.scores_file = PathBuf::from(path);
        }
    }
}

const fn default_chance_weight() -> i64 {
    10
}

fn default_messages() -> Vec<String> {
    vec![DEFAULT_DROP_MESSAGE.to_owned()]
}

const fn default_cooldown() -> u64 {
    MAX_COOLDOWN_SECONDS
}

const fn default_timeout() -> u64 {
    MAX_TIMEOUT_SECONDS
}

const fn default_true() -> bool {
    true
}

fn default_scores_file() -> PathBuf {
    PathBuf::from("scores.json")
}
