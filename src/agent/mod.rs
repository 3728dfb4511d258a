//! Per-player agents
//!
//! Each [`Agent`] is a cheap handle around a spawned worker task. The worker
//! owns the connection together with the [`ChannelSession`],
//! [`ResponseInterpreter`] and [`MessageRelay`], and processes commands and
//! server events one at a time, so none of that state is ever locked.
//! Everything a handle needs to answer synchronously (connected? shutting
//! down?) lives in the shared [`ControlState`].
//!
//! [`Agent::shutdown`] flips the shutdown flag on the caller's thread before
//! asking the worker to stop. A connect that is still queued or mid-handshake
//! observes the flag and backs out.

mod commands;
pub mod controller;
pub mod expectation;
pub mod interpreter;
pub mod relay;
pub mod session;
mod worker;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::config::BridgeConfig;
use crate::display::UserDisplay;
use crate::error::{BridgeError, Result};
use crate::settings::AgentSettings;
use crate::transport::Connection;
use crate::types::{AgentId, PlayerIdentity};

use commands::AgentCommand;
use worker::{WorkerContext, spawn_agent_worker};

pub use controller::{ConnectOutcome, ConnectionController, ConnectionState, ControlState};
pub use expectation::{ExpectationKind, ExpectationTracker};
pub use interpreter::{ReplyOutcome, ResponseInterpreter};
pub use relay::{MessageRelay, RelayedAction, death_action_text};
pub use session::ChannelSession;

/// Handle to one player's IRC presence
pub struct Agent {
    id: AgentId,
    identity: PlayerIdentity,
    display_name: String,
    settings: AgentSettings,
    control: Arc<ControlState>,
    command_tx: mpsc::UnboundedSender<AgentCommand>,
}

impl Agent {
    /// Spawn the worker for a new agent and return its handle
    ///
    /// The agent starts disconnected; call [`connect`](Self::connect).
    /// Must be called from within a tokio runtime.
    pub fn spawn<C: Connection>(
        identity: PlayerIdentity,
        display_name: impl Into<String>,
        settings: AgentSettings,
        connection: C,
        config: Arc<BridgeConfig>,
        display: Arc<dyn UserDisplay>,
    ) -> Arc<Self> {
        let control = Arc::new(ControlState::new());
        let controller =
            ConnectionController::new(connection, Arc::clone(&control), config.timeouts.connect());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let display_name = display_name.into();

        spawn_agent_worker(
            controller,
            command_rx,
            WorkerContext {
                identity,
                display_name: display_name.clone(),
                config,
                display,
            },
        );

        Arc::new(Self {
            id: AgentId::new(),
            identity,
            display_name,
            settings,
            control,
            command_tx,
        })
    }

    /// Unique ID of this agent instance
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Player this agent represents
    #[must_use]
    pub const fn identity(&self) -> PlayerIdentity {
        self.identity
    }

    /// Player's display name
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Persisted settings the agent was created with
    #[must_use]
    pub const fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Nick assigned from settings
    ///
    /// The server may have accepted a variant of it after a collision.
    #[must_use]
    pub fn nick(&self) -> &str {
        &self.settings.irc_nick
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.control.state()
    }

    /// Whether the agent holds a live, registered link
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.control.state() == ConnectionState::Connected
    }

    /// Whether shutdown has begun
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.control.is_shutting_down()
    }

    /// Connect, or reconnect after a dropped link
    ///
    /// Returns `ShuttingDown` without connecting once shutdown has begun,
    /// including when shutdown begins while the handshake is running.
    ///
    /// # Errors
    /// Returns the connection failure; the agent stays disconnected
    pub async fn connect(&self) -> Result<ConnectOutcome> {
        if self.is_shutting_down() {
            return Ok(ConnectOutcome::ShuttingDown);
        }

        let (response_tx, response_rx) = oneshot::channel();
        if self.send(AgentCommand::Connect { response_tx }).is_err() {
            return self.closed_outcome();
        }
        match response_rx.await {
            Ok(result) => result,
            Err(_) => self.closed_outcome(),
        }
    }

    /// Stop the agent: disconnect if connected and stop the worker
    ///
    /// Idempotent and never fails. Returns `true` for the call that began
    /// the shutdown.
    pub fn shutdown(&self) -> bool {
        let first = self.control.begin_shutdown();
        if first {
            log::debug!("[{}] Shutting down agent for '{}'", self.id, self.display_name);
            let _ = self.send(AgentCommand::Shutdown);
        }
        first
    }

    /// Resolves once the worker has stopped
    pub async fn closed(&self) {
        self.command_tx.closed().await;
    }

    /// Relay a chat line verbatim to the active channel
    ///
    /// # Errors
    /// Returns `AgentClosed` if the worker has stopped
    pub fn send_message(&self, text: impl Into<String>) -> Result<()> {
        self.send(AgentCommand::SendMessage { text: text.into() })
    }

    /// Relay an action to the active channel, translating it if configured
    ///
    /// # Errors
    /// Returns `AgentClosed` if the worker has stopped
    pub fn send_action(&self, text: impl Into<String>) -> Result<()> {
        self.send(AgentCommand::SendAction { text: text.into() })
    }

    /// Relay a death notice as an action
    ///
    /// Returns `true` if a notice was queued.
    pub fn relay_death(&self, death_message: Option<&str>) -> bool {
        let Some(text) = death_action_text(death_message, &self.display_name) else {
            return false;
        };
        self.send_action(text).is_ok()
    }

    /// Ask for the active channel's topic; the reply is shown to the player
    ///
    /// # Errors
    /// Returns `AgentClosed` if the worker has stopped
    pub fn topic(&self) -> Result<()> {
        self.send(AgentCommand::RequestTopic)
    }

    /// Show a channel's user list (the active channel if `None`)
    ///
    /// # Errors
    /// Returns `AgentClosed` if the worker has stopped
    pub fn names(&self, channel: Option<String>) -> Result<()> {
        self.send(AgentCommand::ListNames { channel })
    }

    /// WHOIS one or more space-separated nicks
    ///
    /// # Errors
    /// Returns `AgentClosed` if the worker has stopped
    pub fn whois(&self, nicks: impl Into<String>) -> Result<()> {
        self.send(AgentCommand::Whois {
            nicks: nicks.into(),
        })
    }

    /// Join a channel; it becomes active once the server confirms
    ///
    /// # Errors
    /// Returns `AgentClosed` if the worker has stopped
    pub fn join(&self, channel: impl Into<String>) -> Result<()> {
        self.send(AgentCommand::Join {
            channel: channel.into(),
        })
    }

    /// Change the channel chat and actions go to
    ///
    /// # Errors
    /// Returns `AgentClosed` if the worker has stopped
    pub fn set_active_channel(&self, channel: impl Into<String>) -> Result<()> {
        self.send(AgentCommand::SetActiveChannel {
            channel: channel.into(),
        })
    }

    fn send(&self, cmd: AgentCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|_| BridgeError::agent_closed(self.id.to_string()))
    }

    fn closed_outcome(&self) -> Result<ConnectOutcome> {
        if self.is_shutting_down() {
            Ok(ConnectOutcome::ShuttingDown)
        } else {
            Err(BridgeError::agent_closed(self.id.to_string()))
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("display_name", &self.display_name)
            .field("nick", &self.settings.irc_nick)
            .field("state", &self.state())
            .finish()
    }
}
