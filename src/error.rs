//! Error types for the IRC transport bridge

use thiserror::Error;

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Network-level failure while connecting to the IRC server
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server refused registration (bad password, ban, unusable nick)
    #[error("Server rejected registration: {0}")]
    ProtocolRejection(String),

    /// TLS setup or handshake failure
    #[error("TLS error: {0}")]
    Tls(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Operation needs a live connection
    #[error("Not connected to the IRC server")]
    NotConnected,

    /// Operation needs an active channel and none has been joined yet
    #[error("No active channel")]
    NoActiveChannel,

    /// Settings store failure (fatal to a join)
    #[error("Settings store error: {0}")]
    Settings(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No agent is registered for the identity
    #[error("No agent for player {0}")]
    AgentNotFound(String),

    /// The player quit (or joined again) before their agent was published
    #[error("Join for player {0} was cancelled")]
    JoinCancelled(String),

    /// The agent's worker task has stopped
    #[error("Agent {0} is closed")]
    AgentClosed(String),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a protocol rejection error
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::ProtocolRejection(msg.into())
    }

    /// Create a TLS error
    pub fn tls(msg: impl Into<String>) -> Self {
        Self::Tls(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a settings store error
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an agent not found error
    pub fn agent_not_found(identity: impl Into<String>) -> Self {
        Self::AgentNotFound(identity.into())
    }

    /// Create a join cancelled error
    pub fn join_cancelled(identity: impl Into<String>) -> Self {
        Self::JoinCancelled(identity.into())
    }

    /// Create an agent closed error
    pub fn agent_closed(agent: impl Into<String>) -> Self {
        Self::AgentClosed(agent.into())
    }

    /// Whether this error came from the network or server rather than local state
    #[must_use]
    pub const fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::ProtocolRejection(_) | Self::Tls(_) | Self::Timeout(_)
        )
    }
}
