//! Persistent per-player settings
//!
//! A player's IRC nick is chosen once, on the first join of a display name,
//! and reused on every later join regardless of how the nick prefix/suffix
//! configuration changes afterwards. Records are keyed by display name because
//! session identities do not survive a reconnect.

mod json_store;
mod memory;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::BridgeConfig;
use crate::error::Result;

pub use json_store::JsonFileSettingsStore;
pub use memory::MemorySettingsStore;

/// Persisted record for one display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Display name this record belongs to
    pub player_name: String,
    /// Chosen IRC nick
    pub irc_nick: String,
}

impl AgentSettings {
    /// Create a record for a display name
    pub fn new(player_name: impl Into<String>, irc_nick: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            irc_nick: irc_nick.into(),
        }
    }
}

/// Storage for `AgentSettings`
pub trait SettingsStore: Send + Sync + 'static {
    /// Load the record for a display name
    ///
    /// # Errors
    /// Returns `Settings` if the backing store cannot be read
    fn load(&self, player_name: &str) -> impl Future<Output = Result<Option<AgentSettings>>> + Send;

    /// Insert a record unless one already exists for the name
    ///
    /// Returns whichever record is stored once the call completes, so two
    /// racing first joins of the same name agree on one nick.
    ///
    /// # Errors
    /// Returns `Settings` if the backing store cannot be written
    fn create(&self, settings: AgentSettings) -> impl Future<Output = Result<AgentSettings>> + Send;

    /// Insert or overwrite a record (explicit nick change)
    ///
    /// # Errors
    /// Returns `Settings` if the backing store cannot be written
    fn save(&self, settings: AgentSettings) -> impl Future<Output = Result<()>> + Send;
}

/// Build the nick for a first-time name: `prefix + name + suffix`, truncated
#[must_use]
pub fn derive_nick(prefix: &str, player_name: &str, suffix: &str, max_len: usize) -> String {
    format!("{prefix}{player_name}{suffix}")
        .chars()
        .take(max_len)
        .collect()
}

/// Load the settings for a name, creating them on first join
///
/// # Errors
/// Propagates store failures; a join must not continue with a guessed nick.
pub async fn resolve_settings<S: SettingsStore>(
    store: &S,
    config: &BridgeConfig,
    player_name: &str,
) -> Result<AgentSettings> {
    if let Some(existing) = store.load(player_name).await? {
        log::info!(
            "Player '{}' using persistent IRC nick '{}'",
            player_name,
            existing.irc_nick
        );
        return Ok(existing);
    }

    let nick = derive_nick(
        &config.defaults.prefix,
        player_name,
        &config.defaults.suffix,
        config.server.nicksize,
    );
    let created = store.create(AgentSettings::new(player_name, nick)).await?;
    log::debug!(
        "Created settings for '{}' with IRC nick '{}'",
        player_name,
        created.irc_nick
    );
    Ok(created)
}
