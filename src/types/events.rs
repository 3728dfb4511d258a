//! Inbound events from the host event source

use std::net::IpAddr;

use super::identifiers::PlayerIdentity;

/// A player connected to the game server
#[derive(Debug, Clone)]
pub struct UserJoined {
    /// Session identity
    pub identity: PlayerIdentity,
    /// Stable display name (settings key)
    pub display_name: String,
    /// The player's real network address, forwarded in the WEBIRC preamble
    pub network_address: Option<IpAddr>,
}

/// A player left the game server
#[derive(Debug, Clone, Copy)]
pub struct UserQuit {
    /// Session identity
    pub identity: PlayerIdentity,
}

/// A player typed a chat line
#[derive(Debug, Clone)]
pub struct ChatSubmitted {
    /// Session identity
    pub identity: PlayerIdentity,
    /// Chat text
    pub text: String,
}

/// A player died
#[derive(Debug, Clone)]
pub struct UserDied {
    /// Session identity
    pub identity: PlayerIdentity,
    /// Free-text death message, if the game produced one
    pub death_message: Option<String>,
}

/// What the host should do with its own default handling of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// The bridge relayed the event; drop the host's default broadcast
    Suppress,
    /// The bridge did nothing; let the host handle the event normally
    PassThrough,
}
