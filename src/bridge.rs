//! Event handlers tying the host game to per-player agents
//!
//! The host delivers join/quit/chat/death events. Handlers never wait on the
//! network: connects are submitted to a bounded pool and their outcomes come
//! back to a finalizer task over a channel.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;

use crate::agent::{Agent, ConnectOutcome};
use crate::config::BridgeConfig;
use crate::display::UserDisplay;
use crate::error::{BridgeError, Result};
use crate::registry::AgentRegistry;
use crate::settings::{SettingsStore, resolve_settings};
use crate::transport::{ConnectParams, ConnectionFactory};
use crate::types::{ChatSubmitted, EventDisposition, PlayerIdentity, UserDied, UserJoined, UserQuit};

/// Outcome of one pooled connect
#[derive(Debug)]
pub struct ConnectReport {
    /// Agent the connect ran for
    pub agent: Arc<Agent>,
    /// What happened
    pub result: Result<ConnectOutcome>,
}

/// Per-player IRC bridge
pub struct Bridge<F: ConnectionFactory, S: SettingsStore> {
    config: Arc<BridgeConfig>,
    factory: F,
    store: Arc<S>,
    display: Arc<dyn UserDisplay>,
    registry: Arc<AgentRegistry>,
    connect_permits: Arc<Semaphore>,
    report_tx: mpsc::UnboundedSender<ConnectReport>,
    finalizer: JoinHandle<()>,
}

impl<F: ConnectionFactory, S: SettingsStore> Bridge<F, S> {
    /// Create a bridge and start its connect finalizer
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: BridgeConfig,
        factory: F,
        store: Arc<S>,
        display: Arc<dyn UserDisplay>,
    ) -> Self {
        let registry = Arc::new(AgentRegistry::new());
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let finalizer = tokio::spawn(finalize_connects(Arc::clone(&registry), report_rx));
        let permits = config.max_concurrent_connects.max(1);

        Self {
            config: Arc::new(config),
            factory,
            store,
            display,
            registry,
            connect_permits: Arc::new(Semaphore::new(permits)),
            report_tx,
            finalizer,
        }
    }

    /// Bridge configuration
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Live agents
    #[must_use]
    pub const fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Agent for a player, if one is published
    #[must_use]
    pub fn agent(&self, identity: &PlayerIdentity) -> Option<Arc<Agent>> {
        self.registry.get(identity)
    }

    /// A player joined: build their agent, publish it, and start connecting
    ///
    /// The join is registered as pending when this is called, before the
    /// returned future is first polled, so a quit delivered after the join
    /// cancels it even while settings are still loading. The agent is fully
    /// built (settings resolved, nick assigned) before it becomes visible.
    /// The connect runs in the background.
    ///
    /// # Errors
    /// Returns `Settings` if the nick cannot be loaded or created, and
    /// `JoinCancelled` if the player quit or joined again first. No agent is
    /// published in either case.
    pub fn on_user_joined(
        &self,
        event: UserJoined,
    ) -> impl Future<Output = Result<Arc<Agent>>> + '_ {
        let pending = self.registry.begin_join(event.identity);
        async move {
            let settings =
                resolve_settings(self.store.as_ref(), &self.config, &event.display_name).await?;
            if !pending.is_wanted() {
                return Err(BridgeError::join_cancelled(event.identity.to_string()));
            }

            let params = ConnectParams::for_player(
                &self.config,
                &settings.irc_nick,
                event.identity.login(),
                &event.display_name,
                event.network_address,
            );
            let connection = self.factory.create(params);
            let agent = Agent::spawn(
                event.identity,
                event.display_name,
                settings,
                connection,
                Arc::clone(&self.config),
                Arc::clone(&self.display),
            );

            if !pending.publish(Arc::clone(&agent)) {
                return Err(BridgeError::join_cancelled(event.identity.to_string()));
            }
            log::info!(
                "Created agent {} for '{}' with nick '{}'",
                agent.id(),
                agent.display_name(),
                agent.nick()
            );

            self.dispatch_connect(Arc::clone(&agent));
            Ok(agent)
        }
    }

    /// A player left: shut down and unpublish their agent
    ///
    /// Returns `true` if an agent was removed.
    pub fn on_user_quit(&self, event: UserQuit) -> bool {
        match self.registry.remove(&event.identity) {
            Some(agent) => {
                log::info!("Removed agent for '{}'", agent.display_name());
                true
            }
            None => false,
        }
    }

    /// A player chatted: relay it if their agent is connected
    pub fn on_chat(&self, event: &ChatSubmitted) -> EventDisposition {
        let Some(agent) = self.connected_agent(&event.identity) else {
            return EventDisposition::PassThrough;
        };
        match agent.send_message(event.text.as_str()) {
            Ok(()) => EventDisposition::Suppress,
            Err(e) => {
                log::warn!("Chat from '{}' not relayed: {e}", agent.display_name());
                EventDisposition::PassThrough
            }
        }
    }

    /// A player died: relay the death notice as an action
    pub fn on_user_died(&self, event: &UserDied) -> EventDisposition {
        let Some(agent) = self.connected_agent(&event.identity) else {
            return EventDisposition::PassThrough;
        };
        if agent.relay_death(event.death_message.as_deref()) {
            EventDisposition::Suppress
        } else {
            EventDisposition::PassThrough
        }
    }

    /// Retry the connect for a player whose agent is disconnected
    ///
    /// # Errors
    /// Returns `AgentNotFound` if no agent is published for the player
    pub fn reconnect(&self, identity: &PlayerIdentity) -> Result<()> {
        let agent = self
            .registry
            .get(identity)
            .ok_or_else(|| BridgeError::agent_not_found(identity.to_string()))?;
        self.dispatch_connect(agent);
        Ok(())
    }

    /// Shut down every agent; returns how many were running
    pub fn shutdown(&self) -> usize {
        let count = self.registry.shutdown_all();
        log::info!("Bridge shut down {count} agent(s)");
        count
    }

    /// Shut down every agent and wait up to `grace` for their QUITs to go out
    ///
    /// Returns how many agents stopped within the grace period.
    pub async fn shutdown_and_wait(&self, grace: Duration) -> usize {
        let agents = self.registry.drain();
        let total = agents.len();
        let closed = futures::future::join_all(agents.iter().map(|agent| async move {
            tokio::time::timeout(grace, agent.closed()).await.is_ok()
        }))
        .await;
        let stopped = closed.into_iter().filter(|ok| *ok).count();
        if stopped < total {
            log::warn!("{} agent(s) did not stop within {grace:?}", total - stopped);
        }
        log::info!("Bridge shut down {total} agent(s)");
        stopped
    }

    fn connected_agent(&self, identity: &PlayerIdentity) -> Option<Arc<Agent>> {
        self.registry.get(identity).filter(|agent| agent.is_connected())
    }

    fn dispatch_connect(&self, agent: Arc<Agent>) {
        let permits = Arc::clone(&self.connect_permits);
        let report_tx = self.report_tx.clone();

        tokio::spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => agent.connect().await,
                Err(_) => Err(BridgeError::agent_closed(agent.id().to_string())),
            };
            let _ = report_tx.send(ConnectReport { agent, result });
        });
    }
}

impl<F: ConnectionFactory, S: SettingsStore> Drop for Bridge<F, S> {
    fn drop(&mut self) {
        self.finalizer.abort();
    }
}

async fn finalize_connects(
    registry: Arc<AgentRegistry>,
    mut report_rx: mpsc::UnboundedReceiver<ConnectReport>,
) {
    while let Some(ConnectReport { agent, result }) = report_rx.recv().await {
        if !registry.is_current(&agent) {
            log::debug!(
                "Agent {} for '{}' was replaced or removed while connecting",
                agent.id(),
                agent.display_name()
            );
            agent.shutdown();
            continue;
        }

        match result {
            Ok(outcome) if outcome.is_new_link() => {
                log::info!(
                    "Agent for '{}' connected as '{}'",
                    agent.display_name(),
                    agent.nick()
                );
            }
            Ok(outcome) => {
                log::debug!("Connect for '{}' skipped: {outcome:?}", agent.display_name());
            }
            Err(e) => {
                log::error!(
                    "Failed to connect agent for '{}': {e}",
                    agent.display_name()
                );
            }
        }
    }
}
