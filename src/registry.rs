//! Live agents keyed by player identity

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::agent::Agent;
use crate::types::PlayerIdentity;

/// Registry of live agents
///
/// At most one agent is published per identity. Publishing a replacement or
/// removing an entry shuts the displaced agent down before the call returns,
/// so a superseded agent can never keep a connection open. Lookups are
/// shard-locked and never wait on a connect.
///
/// Joins still building their agent are tracked as pending. A removal
/// cancels the pending join, and the agent it was building is shut down
/// instead of published.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: DashMap<PlayerIdentity, Arc<Agent>>,
    pending: DashMap<PlayerIdentity, u64>,
    next_join: AtomicU64,
}

/// A join in progress, obtained from [`AgentRegistry::begin_join`]
///
/// Dropping it without publishing withdraws the join.
#[derive(Debug)]
#[must_use = "a pending join does nothing until published"]
pub struct PendingJoin<'a> {
    registry: &'a AgentRegistry,
    identity: PlayerIdentity,
    generation: u64,
}

impl PendingJoin<'_> {
    /// Identity the join is for
    #[must_use]
    pub const fn identity(&self) -> PlayerIdentity {
        self.identity
    }

    /// Whether the join has not been cancelled or superseded
    #[must_use]
    pub fn is_wanted(&self) -> bool {
        self.registry
            .pending
            .get(&self.identity)
            .is_some_and(|generation| *generation == self.generation)
    }

    /// Publish the agent if the join is still wanted
    ///
    /// Returns `false` and shuts the agent down if the player quit or joined
    /// again since [`AgentRegistry::begin_join`].
    pub fn publish(self, agent: Arc<Agent>) -> bool {
        // The pending entry stays locked until the agent is visible, so a
        // concurrent removal either cancels this join or finds the agent.
        let published = match self.registry.pending.entry(self.identity) {
            Entry::Occupied(entry) if *entry.get() == self.generation => {
                self.registry.insert(Arc::clone(&agent));
                entry.remove();
                true
            }
            _ => false,
        };
        if !published {
            log::debug!(
                "Join of '{}' was cancelled; discarding agent {}",
                agent.display_name(),
                agent.id()
            );
            agent.shutdown();
        }
        published
    }
}

impl Drop for PendingJoin<'_> {
    fn drop(&mut self) {
        self.registry
            .pending
            .remove_if(&self.identity, |_, generation| *generation == self.generation);
    }
}

impl AgentRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a join for an identity
    ///
    /// A later join for the same identity supersedes this one.
    pub fn begin_join(&self, identity: PlayerIdentity) -> PendingJoin<'_> {
        let generation = self.next_join.fetch_add(1, Ordering::Relaxed);
        self.pending.insert(identity, generation);
        PendingJoin {
            registry: self,
            identity,
            generation,
        }
    }

    /// Whether a join is in progress for an identity
    #[must_use]
    pub fn is_joining(&self, identity: &PlayerIdentity) -> bool {
        self.pending.contains_key(identity)
    }

    /// Publish an agent, shutting down any agent it replaces
    ///
    /// Returns the replaced agent.
    pub fn insert(&self, agent: Arc<Agent>) -> Option<Arc<Agent>> {
        let previous = self.agents.insert(agent.identity(), agent);
        if let Some(old) = &previous {
            log::debug!(
                "Replacing agent {} for '{}'",
                old.id(),
                old.display_name()
            );
            old.shutdown();
        }
        previous
    }

    /// Agent currently published for an identity
    #[must_use]
    pub fn get(&self, identity: &PlayerIdentity) -> Option<Arc<Agent>> {
        self.agents.get(identity).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether an agent is published for an identity
    #[must_use]
    pub fn contains(&self, identity: &PlayerIdentity) -> bool {
        self.agents.contains_key(identity)
    }

    /// Whether this exact agent instance is the one published for its identity
    #[must_use]
    pub fn is_current(&self, agent: &Agent) -> bool {
        self.agents
            .get(&agent.identity())
            .is_some_and(|entry| entry.id() == agent.id())
    }

    /// Cancel any pending join, then unpublish and shut down the agent
    ///
    /// The shutdown happens under the entry's lock, so no lookup can observe
    /// a removed agent that is still running.
    pub fn remove(&self, identity: &PlayerIdentity) -> Option<Arc<Agent>> {
        if self.pending.remove(identity).is_some() {
            log::debug!("Cancelled pending join for {identity}");
        }
        self.agents
            .remove_if(identity, |_, agent| {
                agent.shutdown();
                true
            })
            .map(|(_, agent)| agent)
    }

    /// Identities with a published agent
    #[must_use]
    pub fn identities(&self) -> Vec<PlayerIdentity> {
        self.agents.iter().map(|entry| *entry.key()).collect()
    }

    /// Number of published agents
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no agents are published
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Shut down and unpublish every agent; returns how many there were
    pub fn shutdown_all(&self) -> usize {
        self.drain().len()
    }

    /// Shut down and unpublish every agent, returning them
    pub fn drain(&self) -> Vec<Arc<Agent>> {
        self.pending.clear();
        self.identities()
            .iter()
            .filter_map(|identity| self.remove(identity))
            .collect()
    }
}
