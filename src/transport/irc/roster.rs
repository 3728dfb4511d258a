//! Channel membership tracked from the server stream

use std::collections::{BTreeSet, HashMap};

use super::message::same_name;

/// Mode prefixes a server may put in front of nicks in a NAMES reply
const MEMBER_PREFIXES: &[char] = &['~', '&', '@', '%', '+'];

#[derive(Debug, Default)]
struct Members {
    name: String,
    users: BTreeSet<String>,
    incoming: Vec<String>,
}

/// Own nick plus the members of every joined channel
///
/// Channel keys are ASCII-lowercased; the name as first seen is kept for display.
#[derive(Debug, Default)]
pub(super) struct Roster {
    nick: String,
    channels: HashMap<String, Members>,
}

impl Roster {
    pub(super) fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            channels: HashMap::new(),
        }
    }

    pub(super) fn nick(&self) -> &str {
        &self.nick
    }

    pub(super) fn is_self(&self, nick: &str) -> bool {
        same_name(&self.nick, nick)
    }

    /// Forget all membership and start over under a (possibly new) nick
    pub(super) fn reset(&mut self, nick: impl Into<String>) {
        self.nick = nick.into();
        self.channels.clear();
    }

    pub(super) fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.values().map(|m| m.name.clone()).collect();
        names.sort();
        names
    }

    pub(super) fn joined(&mut self, channel: &str) {
        self.channels
            .entry(channel.to_ascii_lowercase())
            .or_insert_with(|| Members {
                name: channel.to_string(),
                ..Members::default()
            });
    }

    pub(super) fn parted(&mut self, channel: &str) {
        self.channels.remove(&channel.to_ascii_lowercase());
    }

    pub(super) fn user_joined(&mut self, channel: &str, nick: &str) {
        if let Some(members) = self.channels.get_mut(&channel.to_ascii_lowercase()) {
            members.users.insert(nick.to_string());
        }
    }

    pub(super) fn user_parted(&mut self, channel: &str, nick: &str) {
        if let Some(members) = self.channels.get_mut(&channel.to_ascii_lowercase()) {
            members.users.remove(nick);
        }
    }

    pub(super) fn user_quit(&mut self, nick: &str) {
        for members in self.channels.values_mut() {
            members.users.remove(nick);
        }
    }

    pub(super) fn renamed(&mut self, old: &str, new: &str) {
        if self.is_self(old) {
            self.nick = new.to_string();
        }
        for members in self.channels.values_mut() {
            if members.users.remove(old) {
                members.users.insert(new.to_string());
            }
        }
    }

    /// Accumulate one `353` chunk
    pub(super) fn names_chunk(&mut self, channel: &str, names: &str) {
        if let Some(members) = self.channels.get_mut(&channel.to_ascii_lowercase()) {
            members.incoming.extend(
                names
                    .split_whitespace()
                    .map(|n| n.trim_start_matches(MEMBER_PREFIXES).to_string())
                    .filter(|n| !n.is_empty()),
            );
        }
    }

    /// Replace the member list with the accumulated chunks (`366`)
    pub(super) fn names_end(&mut self, channel: &str) {
        if let Some(members) = self.channels.get_mut(&channel.to_ascii_lowercase()) {
            let incoming = std::mem::take(&mut members.incoming);
            if !incoming.is_empty() {
                members.users = incoming.into_iter().collect();
            }
        }
    }

    pub(super) fn users(&self, channel: &str) -> Vec<String> {
        self.channels
            .get(&channel.to_ascii_lowercase())
            .map(|m| m.users.iter().cloned().collect())
            .unwrap_or_default()
    }
}
