//! Bridge configuration
//!
//! The configuration is a single JSON document whose keys mirror the plugin
//! configuration the bridge grew out of (`server.*`, `default.*`,
//! `messages.*`, `translations`, `verbose`). Every field has a default so a
//! minimal file only needs `server.address`.

mod builder;

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::transport::{NickCollisionPolicy, TlsMode};

pub use builder::BridgeConfigBuilder;

/// Default IRC port
pub const DEFAULT_PORT: u16 = 6667;

/// Default maximum nick length
pub const DEFAULT_NICK_SIZE: usize = 15;

/// Default bound on a connect attempt, in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default lifetime of a one-shot reply expectation, in seconds
pub const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 60;

/// Default size of the connect worker pool
pub const DEFAULT_MAX_CONCURRENT_CONNECTS: usize = 8;

// ============================================================================
// Top-level configuration
// ============================================================================

/// Complete bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// IRC server connection settings
    pub server: ServerConfig,
    /// Nick decoration applied to first-time player names
    #[serde(rename = "default")]
    pub defaults: NickDefaults,
    /// Channels every agent joins after a fresh connect
    pub channels: Vec<String>,
    /// Display templates
    pub messages: MessageTemplates,
    /// Action phrase translations (`/me dance` -> `dances wildly`)
    pub translations: HashMap<String, String>,
    /// Log every raw protocol line at info level
    pub verbose: bool,
    /// Bounds on connect and reply waits
    pub timeouts: Timeouts,
    /// What to do when the server reports the nick as taken
    pub nick_collision: NickCollisionPolicy,
    /// Maximum number of connects in flight at once
    pub max_concurrent_connects: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            defaults: NickDefaults::default(),
            channels: Vec::new(),
            messages: MessageTemplates::default(),
            translations: HashMap::new(),
            verbose: false,
            timeouts: Timeouts::default(),
            nick_collision: NickCollisionPolicy::default(),
            max_concurrent_connects: DEFAULT_MAX_CONCURRENT_CONNECTS,
        }
    }
}

/// IRC server settings (`server.*`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server hostname or address
    pub address: String,
    /// Server port
    pub port: u16,
    /// Server password sent with `PASS`
    pub password: Option<String>,
    /// WEBIRC password; enables the cloaking preamble when set
    pub webirc_password: Option<String>,
    /// Maximum nick length accepted by the server
    pub nicksize: usize,
    /// TLS settings
    pub ssl: SslConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: DEFAULT_PORT,
            password: None,
            webirc_password: None,
            nicksize: DEFAULT_NICK_SIZE,
            ssl: SslConfig::default(),
        }
    }
}

/// TLS settings (`server.ssl.*`)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    /// Connect over TLS
    pub enabled: bool,
    /// Accept any server certificate
    pub trust: bool,
}

/// Nick prefix/suffix (`default.*`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NickDefaults {
    /// Prepended to the player name
    pub prefix: String,
    /// Appended to the player name
    pub suffix: String,
}

/// Display templates (`messages.*`)
///
/// Templates use `${KEY}` placeholders and `&` color escapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplates {
    /// Channel user list: `${LIST}`, `${CHANNEL}`
    pub list: String,
    /// Action confirmation: `${CHANNEL}`, `${NICK}`, `${ACTION}`
    pub action: String,
    /// Channel topic: `${CHANNEL}`, `${TOPIC}`
    pub topic: String,
    /// Inbound channel message: `${CHANNEL}`, `${NICK}`, `${MESSAGE}`
    pub message: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            list: "&e[${CHANNEL}] &fUsers: ${LIST}".to_string(),
            action: "&e[${CHANNEL}] &d* ${NICK} ${ACTION}".to_string(),
            topic: "&e[${CHANNEL}] &fTopic: ${TOPIC}".to_string(),
            message: "&e[${CHANNEL}] &f<${NICK}> ${MESSAGE}".to_string(),
        }
    }
}

/// Timeouts (`timeouts.*`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Bound on a single connect attempt
    pub connect_secs: u64,
    /// Lifetime of a WHOIS latch or names/topic suppression
    pub reply_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            reply_secs: DEFAULT_REPLY_TIMEOUT_SECS,
        }
    }
}

impl Timeouts {
    /// Connect bound as a `Duration`
    #[must_use]
    pub const fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    /// Reply expectation lifetime as a `Duration`
    #[must_use]
    pub const fn reply(&self) -> Duration {
        Duration::from_secs(self.reply_secs)
    }
}

// ============================================================================
// Loading
// ============================================================================

impl BridgeConfig {
    /// Create a new builder for `BridgeConfig`
    #[must_use]
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Load and validate a configuration file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid JSON, or fails validation
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::invalid_config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate a configuration document
    ///
    /// # Errors
    /// Returns error if the document is not valid JSON or fails validation
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values the bridge cannot run without
    ///
    /// # Errors
    /// Returns `InvalidConfig` describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.server.address.trim().is_empty() {
            return Err(BridgeError::invalid_config("server.address is required"));
        }
        if self.server.port == 0 {
            return Err(BridgeError::invalid_config("server.port must be non-zero"));
        }
        if self.server.nicksize == 0 {
            return Err(BridgeError::invalid_config("server.nicksize must be non-zero"));
        }
        if self.max_concurrent_connects == 0 {
            return Err(BridgeError::invalid_config(
                "max_concurrent_connects must be non-zero",
            ));
        }
        if let Some(bad) = self.channels.iter().find(|c| !is_channel_name(c)) {
            return Err(BridgeError::invalid_config(format!(
                "'{bad}' is not a channel name"
            )));
        }
        Ok(())
    }

    /// TLS mode selected by `server.ssl`
    #[must_use]
    pub const fn tls_mode(&self) -> TlsMode {
        match (self.server.ssl.enabled, self.server.ssl.trust) {
            (false, _) => TlsMode::None,
            (true, false) => TlsMode::Verify,
            (true, true) => TlsMode::TrustAll,
        }
    }

    /// Translation for an action phrase, if one is configured
    #[must_use]
    pub fn translation(&self, phrase: &str) -> Option<&str> {
        self.translations
            .get(phrase)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }
}

fn is_channel_name(name: &str) -> bool {
    name.len() > 1 && name.starts_with(['#', '&', '+', '!']) && !name.contains([' ', ','])
}
