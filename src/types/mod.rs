//! Type definitions for the bridge
//!
//! - [`identifiers`] - Type-safe ID wrappers (`PlayerIdentity`, `AgentId`)
//! - [`events`] - Inbound events delivered by the host event source

pub mod events;
pub mod identifiers;

pub use events::{ChatSubmitted, EventDisposition, UserDied, UserJoined, UserQuit};
pub use identifiers::{AgentId, PlayerIdentity};
