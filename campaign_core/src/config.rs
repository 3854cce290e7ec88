//! Configuration for the journal engine.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JournalError, JournalResult};

/// Settings for the live event stream and persistence.
///
/// Every field has a default, so a partial TOML file is enough:
///
/// ```toml
/// tick_interval_ms = 500
/// seed = 7
///
/// [storage]
/// key_prefix = "campaign_"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Milliseconds between synthetic events while a session is live.
    pub tick_interval_ms: u64,

    /// Chance that a generated event gets a second participant.
    pub second_participant_chance: f64,

    /// Chance that a generated event advances a quest.
    pub quest_chance: f64,

    /// Pool of titles for generated events.
    pub titles: Vec<String>,

    /// Placeholder summary attached to generated events.
    pub live_summary: String,

    /// Fixed RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,

    pub storage: StorageConfig,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2_000,
            second_participant_chance: 0.4,
            quest_chance: 0.6,
            titles: [
                "Footsteps in the Alley",
                "A Whispered Warning",
                "Broken Seal",
                "Secret Passage Found",
                "Unexpected Patrol",
                "Silent Incantation",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            live_summary: "Live event (mock stream)…".to_string(),
            seed: None,
            storage: StorageConfig::default(),
        }
    }
}

impl JournalConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> JournalResult<Self> {
        let config: Self = toml::from_str(text)?;
        Ok(config.normalized())
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> JournalResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| JournalError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Clamp probabilities into range and restore an empty title pool.
    fn normalized(mut self) -> Self {
        self.second_participant_chance = self.second_participant_chance.clamp(0.0, 1.0);
        self.quest_chance = self.quest_chance.clamp(0.0, 1.0);
        self.tick_interval_ms = self.tick_interval_ms.max(1);
        if self.titles.is_empty() {
            self.titles = Self::default().titles;
        }
        self
    }
}

/// Key naming for persisted values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: "ds_".to_string(),
        }
    }
}
