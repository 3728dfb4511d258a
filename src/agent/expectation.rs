//! One-shot expectations tied to asynchronous server replies
//!
//! The bridge issues some requests on the player's behalf (the NAMES and
//! TOPIC replies that follow every join) and needs to recognise their replies
//! when they arrive on the uncorrelated line stream. WHOIS works the other way
//! round: the first user-info line opens a window that the end-of-whois line
//! closes. Both are the same thing: a pending `(kind, target)` entry that the
//! first matching reply settles. Every entry carries a deadline so a reply that
//! never comes cannot pin the state forever.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// What a pending expectation is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectationKind {
    /// Hide the next user list for the target channel
    Names,
    /// Hide the next topic reply for the target channel
    Topic,
    /// A WHOIS reply for the target nick is streaming in
    Whois,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    kind: ExpectationKind,
    target: String,
}

impl Key {
    fn new(kind: ExpectationKind, target: &str) -> Self {
        Self {
            kind,
            target: target.to_ascii_lowercase(),
        }
    }
}

/// Pending expectations keyed by `(kind, target)`
#[derive(Debug)]
pub struct ExpectationTracker {
    pending: HashMap<Key, Instant>,
    ttl: Duration,
}

impl ExpectationTracker {
    /// Create a tracker whose entries expire after `ttl`
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            ttl,
        }
    }

    /// Register (or refresh) an expectation
    pub fn expect(&mut self, kind: ExpectationKind, target: &str) {
        self.pending
            .insert(Key::new(kind, target), Instant::now() + self.ttl);
    }

    /// Settle an expectation; returns `true` if it was pending and unexpired
    pub fn consume(&mut self, kind: ExpectationKind, target: &str) -> bool {
        self.pending
            .remove(&Key::new(kind, target))
            .is_some_and(|deadline| Instant::now() < deadline)
    }

    /// Whether an unexpired expectation is pending
    pub fn is_pending(&mut self, kind: ExpectationKind, target: &str) -> bool {
        self.prune();
        self.pending.contains_key(&Key::new(kind, target))
    }

    /// Whether any unexpired expectation of a kind is pending
    pub fn any_pending(&mut self, kind: ExpectationKind) -> bool {
        self.prune();
        self.pending.keys().any(|k| k.kind == kind)
    }

    /// Drop every expectation of a kind; returns how many were pending
    pub fn clear_kind(&mut self, kind: ExpectationKind) -> usize {
        self.prune();
        let before = self.pending.len();
        self.pending.retain(|k, _| k.kind != kind);
        before - self.pending.len()
    }

    /// Drop every expectation for a target
    pub fn clear_target(&mut self, target: &str) {
        let target = target.to_ascii_lowercase();
        self.pending.retain(|k, _| k.target != target);
    }

    /// Drop everything (disconnect)
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of entries, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the tracker holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn prune(&mut self) {
        let now = Instant::now();
        self.pending.retain(|_, deadline| now < *deadline);
    }
}
