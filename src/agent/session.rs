//! Per-agent channel state: the active channel and reply suppression
//!
//! Joining a channel makes the server volunteer the user list and topic. The
//! player did not ask for either, so both are pre-suppressed on join and the
//! first matching reply is swallowed. A later explicit request withdraws the
//! suppression so that reply is shown.

use std::time::Duration;

use crate::error::{BridgeError, Result};
use crate::format::render_display;
use crate::transport::irc::message;

use super::expectation::{ExpectationKind, ExpectationTracker};

/// Active channel plus pending names/topic/WHOIS expectations
#[derive(Debug)]
pub struct ChannelSession {
    active: Option<String>,
    expectations: ExpectationTracker,
}

impl ChannelSession {
    /// Create a session with no active channel
    #[must_use]
    pub fn new(reply_ttl: Duration) -> Self {
        Self {
            active: None,
            expectations: ExpectationTracker::new(reply_ttl),
        }
    }

    /// Channel outbound chat and actions are sent to
    #[must_use]
    pub fn active_channel(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Change the active channel
    pub fn set_active_channel(&mut self, channel: &str) {
        self.active = Some(channel.to_string());
    }

    /// Pending reply expectations
    pub fn expectations_mut(&mut self) -> &mut ExpectationTracker {
        &mut self.expectations
    }

    /// The agent joined a channel: make it active and hide the unsolicited replies
    pub fn joined(&mut self, channel: &str) {
        self.set_active_channel(channel);
        self.expectations.expect(ExpectationKind::Names, channel);
        self.expectations.expect(ExpectationKind::Topic, channel);
    }

    /// The agent left a channel
    pub fn parted(&mut self, channel: &str) {
        if self
            .active
            .as_deref()
            .is_some_and(|active| message::same_name(active, channel))
        {
            self.active = None;
        }
        self.expectations.clear_target(channel);
    }

    /// Format a user list, or `None` if this list was suppressed
    pub fn names(&mut self, channel: &str, users: &[String], template: &str) -> Option<String> {
        if self.expectations.consume(ExpectationKind::Names, channel) {
            return None;
        }
        let list = users.join(" ");
        Some(render_display(
            template,
            &[("LIST", &list), ("CHANNEL", channel)],
        ))
    }

    /// Explicitly ask for the active channel's topic
    ///
    /// Withdraws any pending suppression and returns the request line to send.
    ///
    /// # Errors
    /// Returns `NoActiveChannel` if no channel has been joined
    pub fn request_topic(&mut self) -> Result<String> {
        let channel = self.active.as_deref().ok_or(BridgeError::NoActiveChannel)?;
        self.expectations.consume(ExpectationKind::Topic, channel);
        Ok(message::topic_request(channel))
    }

    /// Format a topic reply, or `None` if this reply was suppressed
    pub fn topic_reply(&mut self, channel: &str, topic: &str, template: &str) -> Option<String> {
        if self.expectations.consume(ExpectationKind::Topic, channel) {
            return None;
        }
        Some(render_display(
            template,
            &[("CHANNEL", channel), ("TOPIC", topic)],
        ))
    }

    /// Forget every pending expectation; the active channel survives for the rejoin
    pub fn reset(&mut self) {
        self.expectations.clear();
    }
}
