//! JSON-file settings store
//!
//! All records live in one JSON object (`name -> record`). Every write
//! rewrites the file through a temporary sibling and a rename, serialized by
//! the store's mutex so concurrent joins never interleave writes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::error::{BridgeError, Result};

use super::{AgentSettings, SettingsStore};

/// Settings store backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, AgentSettings>>,
}

impl JsonFileSettingsStore {
    /// Open a store, reading existing records if the file exists
    ///
    /// # Errors
    /// Returns `Settings` if the file exists but cannot be read or parsed
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                BridgeError::settings(format!("Corrupt settings file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(BridgeError::settings(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        log::debug!(
            "Loaded {} settings record(s) from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &BTreeMap<String, AgentSettings>) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, json).await.map_err(|e| {
            BridgeError::settings(format!("Failed to write {}: {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            BridgeError::settings(format!("Failed to replace {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}

impl SettingsStore for JsonFileSettingsStore {
    async fn load(&self, player_name: &str) -> Result<Option<AgentSettings>> {
        Ok(self.records.lock().await.get(player_name).cloned())
    }

    async fn create(&self, settings: AgentSettings) -> Result<AgentSettings> {
        let mut records = self.records.lock().await;
        if let Some(existing) = records.get(&settings.player_name) {
            return Ok(existing.clone());
        }

        records.insert(settings.player_name.clone(), settings.clone());
        if let Err(e) = self.persist(&records).await {
            records.remove(&settings.player_name);
            return Err(e);
        }
        Ok(settings)
    }

    async fn save(&self, settings: AgentSettings) -> Result<()> {
        let mut records = self.records.lock().await;
        let previous = records.insert(settings.player_name.clone(), settings.clone());
        if let Err(e) = self.persist(&records).await {
            match previous {
                Some(old) => records.insert(settings.player_name, old),
                None => records.remove(&settings.player_name),
            };
            return Err(e);
        }
        Ok(())
    }
}
