//! In-memory settings store

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::Result;

use super::{AgentSettings, SettingsStore};

/// Settings store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    records: Mutex<HashMap<String, AgentSettings>>,
}

impl MemorySettingsStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl SettingsStore for MemorySettingsStore {
    async fn load(&self, player_name: &str) -> Result<Option<AgentSettings>> {
        Ok(self.records.lock().get(player_name).cloned())
    }

    async fn create(&self, settings: AgentSettings) -> Result<AgentSettings> {
        let mut records = self.records.lock();
        Ok(records
            .entry(settings.player_name.clone())
            .or_insert(settings)
            .clone())
    }

    async fn save(&self, settings: AgentSettings) -> Result<()> {
        self.records
            .lock()
            .insert(settings.player_name.clone(), settings);
        Ok(())
    }
}
