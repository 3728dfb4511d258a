//! # IRC transport bridge
//!
//! Gives every player on a game server their own IRC identity. When a player
//! joins, the bridge builds an [`Agent`] for them: it resolves the player's
//! persistent nick, opens a dedicated connection to the IRC server (optionally
//! behind a WEBIRC preamble carrying the player's real address), and from then
//! on relays their chat, actions and deaths to IRC while mirroring channel
//! traffic back.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use irc_transport::{
//!     Bridge, BridgeConfig, IrcConnector, MemorySettingsStore, PlayerIdentity, UserDisplay,
//!     UserJoined,
//! };
//!
//! struct Console;
//!
//! impl UserDisplay for Console {
//!     fn show(&self, identity: &PlayerIdentity, line: &str) {
//!         println!("{identity}: {line}");
//!     }
//! }
//!
//! # async fn example() -> irc_transport::Result<()> {
//! let config = BridgeConfig::builder()
//!     .server("irc.example.net", 6667)
//!     .add_channel("#lobby")
//!     .try_build()?;
//!
//! let bridge = Bridge::new(
//!     config,
//!     IrcConnector,
//!     Arc::new(MemorySettingsStore::new()),
//!     Arc::new(Console),
//! );
//!
//! let agent = bridge
//!     .on_user_joined(UserJoined {
//!         identity: PlayerIdentity::random(),
//!         display_name: "Alice".to_string(),
//!         network_address: None,
//!     })
//!     .await?;
//! println!("Alice is {} on IRC", agent.nick());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`bridge`]: event handlers and the background connect pool
//! - [`registry`]: concurrent identity to agent map
//! - [`agent`]: per-player worker, lifecycle control, WHOIS and names/topic handling
//! - [`transport`]: the connection capability and its IRC implementation
//! - [`settings`]: persistent nick records
//! - [`config`]: JSON configuration
//! - [`format`]: templates and display escapes
//! - [`error`]: error types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod bridge;
pub mod config;
pub mod display;
pub mod error;
pub mod format;
pub mod registry;
pub mod settings;
pub mod transport;
pub mod types;

// Re-export commonly used types for external API
pub use agent::{Agent, ConnectOutcome, ConnectionState};
pub use bridge::{Bridge, ConnectReport};
pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use display::UserDisplay;
pub use error::{BridgeError, Result};
pub use registry::{AgentRegistry, PendingJoin};
pub use settings::{AgentSettings, JsonFileSettingsStore, MemorySettingsStore, SettingsStore};
pub use transport::{
    ConnectParams, Connection, ConnectionFactory, IrcConnection, IrcConnector,
    NickCollisionPolicy, ServerEvent, TlsMode,
};
pub use types::{
    AgentId, ChatSubmitted, EventDisposition, PlayerIdentity, UserDied, UserJoined, UserQuit,
};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
