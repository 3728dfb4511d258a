//! Outbound chat, actions and death notices

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::format::render_display;
use crate::transport::irc::message;

/// Lines produced by relaying one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedAction {
    /// Protocol line to send
    pub line: String,
    /// Confirmation shown to the player
    pub confirmation: String,
}

/// Turns player input into protocol lines and server traffic into display lines
#[derive(Debug, Clone)]
pub struct MessageRelay {
    config: Arc<BridgeConfig>,
}

impl MessageRelay {
    /// Create a relay over the bridge configuration
    #[must_use]
    pub const fn new(config: Arc<BridgeConfig>) -> Self {
        Self { config }
    }

    /// Plain chat to a channel, verbatim
    #[must_use]
    pub fn message_line(&self, channel: &str, text: &str) -> String {
        message::privmsg(channel, text)
    }

    /// Action to a channel with translation applied
    ///
    /// `player` fills `${NICK}` in the confirmation. The whole text is looked up in the translation table; an absent or
    /// empty entry leaves it unchanged.
    #[must_use]
    pub fn action(&self, channel: &str, player: &str, text: &str) -> RelayedAction {
        let action = self.config.translation(text).unwrap_or(text);
        RelayedAction {
            line: message::action(channel, action),
            confirmation: render_display(
                &self.config.messages.action,
                &[("CHANNEL", channel), ("NICK", player), ("ACTION", action)],
            ),
        }
    }

    /// Display line for a channel message from another user
    #[must_use]
    pub fn inbound_message(&self, channel: &str, from: &str, text: &str) -> String {
        render_display(
            &self.config.messages.message,
            &[("CHANNEL", channel), ("NICK", from), ("MESSAGE", text)],
        )
    }

    /// Display line for an action from another user
    #[must_use]
    pub fn inbound_action(&self, channel: &str, from: &str, text: &str) -> String {
        render_display(
            &self.config.messages.action,
            &[("CHANNEL", channel), ("NICK", from), ("ACTION", text)],
        )
    }
}

/// Action text for a death notice, or `None` if there is nothing to relay
///
/// A message that starts with the player's name has the name stripped (the
/// action already carries the nick); any other message becomes
/// `died: <message>`.
#[must_use]
pub fn death_action_text(death_message: Option<&str>, display_name: &str) -> Option<String> {
    let message = death_message.filter(|m| !m.is_empty())?;
    let text = match message.strip_prefix(display_name) {
        Some(rest) if !display_name.is_empty() => rest.trim(),
        _ => return Some(format!("died: {message}").trim().to_string()),
    };
    (!text.is_empty()).then(|| text.to_string())
}
