//! Outbound text to players

use crate::types::PlayerIdentity;

/// Delivers display lines to one player in the host game
///
/// Lines arrive already rewritten to the display escape convention.
pub trait UserDisplay: Send + Sync + 'static {
    /// Show a line to the player
    fn show(&self, identity: &PlayerIdentity, line: &str);
}
