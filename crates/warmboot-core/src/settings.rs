//! Versioned settings-write handshake between the harness and the platform.
//!
//! The bootstrap code inside a snapshot dump reads the environment's
//! settings the moment the dump loads, so the harness must persist them
//! first. Rather than a mutable settings file reloaded as a side effect,
//! each write is an explicit versioned batch with required/optional
//! semantics per key, and the platform reports back what it wrote.

use serde::{Deserialize, Serialize};

/// Schema version for [`SettingsWrite`] batches.
pub const SETTINGS_SCHEMA_VERSION: &str = "1.0";

/// One settings key to persist.
///
/// A `required` entry must be written for the bootstrap to be usable; an
/// optional entry may be skipped by platforms that do not understand it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub required: bool,
}

impl SettingsEntry {
    #[must_use]
    pub fn required(key: &str, value: serde_json::Value) -> Self {
        Self {
            key: key.to_owned(),
            value,
            required: true,
        }
    }

    #[must_use]
    pub fn optional(key: &str, value: serde_json::Value) -> Self {
        Self {
            key: key.to_owned(),
            value,
            required: false,
        }
    }
}

/// A batch of settings entries written in one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsWrite {
    pub schema_version: String,
    pub entries: Vec<SettingsEntry>,
}

impl SettingsWrite {
    #[must_use]
    pub fn new(entries: Vec<SettingsEntry>) -> Self {
        Self {
            schema_version: SETTINGS_SCHEMA_VERSION.to_owned(),
            entries,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the platform actually persisted from a [`SettingsWrite`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsWriteReport {
    /// Keys persisted, in write order.
    pub written: Vec<String>,
    /// Optional keys the platform chose to skip.
    pub skipped: Vec<String>,
}

impl SettingsWriteReport {
    /// True when every required entry of `write` appears in `written`.
    #[must_use]
    pub fn covers_required(&self, write: &SettingsWrite) -> bool {
        write
            .entries
            .iter()
            .filter(|entry| entry.required)
            .all(|entry| self.written.contains(&entry.key))
    }
}

/// Active database-connection descriptor, persisted into settings so the
/// dump's bootstrap code connects to the same store the test run uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConnectionInfo {
    pub driver: String,
    pub database: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    /// Table-name prefix, empty when unused.
    pub prefix: String,
}
