//! Connect/disconnect lifecycle and the shutdown flag
//!
//! States move `Disconnected -> Connecting -> Connected`, back to
//! `Disconnected` on a network drop, and through `ShuttingDown` to a terminal
//! `Disconnected` once shutdown begins. The shutdown flag is set on the
//! caller's thread and cancels a handshake in flight, so a shutdown can never
//! be overtaken by a connect that completes after it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{BridgeError, Result};
use crate::transport::Connection;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// No live link (terminal once shutdown has begun)
    Disconnected = 0,
    /// Handshake in progress
    Connecting = 1,
    /// Registered and live
    Connected = 2,
    /// Shutdown requested, teardown in progress
    ShuttingDown = 3,
}

impl ConnectionState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::ShuttingDown,
            _ => Self::Disconnected,
        }
    }
}

/// Result of a connect request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// First successful connect
    Connected,
    /// Link re-established; channels were rejoined
    Reconnected,
    /// Nothing to do
    AlreadyConnected,
    /// Shutdown has begun; no connection was (or will be) made
    ShuttingDown,
}

impl ConnectOutcome {
    /// Whether this outcome produced a new live link
    #[must_use]
    pub const fn is_new_link(self) -> bool {
        matches!(self, Self::Connected | Self::Reconnected)
    }
}

/// State shared between an agent handle and its worker
#[derive(Debug)]
pub struct ControlState {
    state: AtomicU8,
    shutting_down: AtomicBool,
    cancel: CancellationToken,
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlState {
    /// Fresh, disconnected state
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Disconnected as u8),
            shutting_down: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Whether shutdown has begun; never resets
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Set the shutdown flag and cancel any handshake in flight
    ///
    /// Returns `true` only for the call that set the flag.
    pub fn begin_shutdown(&self) -> bool {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.cancel.cancel();
        true
    }

    /// Resolves once shutdown has begun
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

/// Owns one connection and enforces the lifecycle rules around it
pub struct ConnectionController<C: Connection> {
    conn: C,
    control: Arc<ControlState>,
    connect_timeout: Duration,
    established: bool,
}

impl<C: Connection> ConnectionController<C> {
    /// Wrap a connection
    #[must_use]
    pub const fn new(conn: C, control: Arc<ControlState>, connect_timeout: Duration) -> Self {
        Self {
            conn,
            control,
            connect_timeout,
            established: false,
        }
    }

    /// The wrapped connection
    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.conn
    }

    /// The wrapped connection, mutably
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Shared lifecycle state
    #[must_use]
    pub const fn control(&self) -> &Arc<ControlState> {
        &self.control
    }

    /// Connect unless already connected or shutting down
    ///
    /// A shutdown that begins while the handshake is running cancels it. A
    /// shutdown that lands just after the handshake completes is honoured by
    /// disconnecting straight away.
    ///
    /// # Errors
    /// Returns the connection's failure, or `Timeout` if the handshake
    /// exceeds the configured bound. The agent stays disconnected.
    pub async fn connect(&mut self) -> Result<ConnectOutcome> {
        if self.control.is_shutting_down() {
            return Ok(ConnectOutcome::ShuttingDown);
        }
        if self.conn.is_connected() {
            return Ok(ConnectOutcome::AlreadyConnected);
        }

        let reconnect = self.established;
        self.control.set_state(ConnectionState::Connecting);

        let control = Arc::clone(&self.control);
        let limit = self.connect_timeout;
        let attempt = tokio::select! {
            biased;
            () = control.cancelled() => None,
            result = tokio::time::timeout(limit, self.conn.connect()) => Some(result),
        };

        match attempt {
            None => {
                log::debug!("Connect to IRC cancelled by shutdown");
                self.abandon().await;
                Ok(ConnectOutcome::ShuttingDown)
            }
            Some(Err(_)) => {
                self.abandon().await;
                Err(BridgeError::timeout(format!(
                    "Connect did not complete within {}s",
                    limit.as_secs()
                )))
            }
            Some(Ok(Err(e))) => {
                self.settle_disconnected();
                Err(e)
            }
            Some(Ok(Ok(()))) => {
                if self.control.is_shutting_down() {
                    log::debug!("Shutdown arrived during connect; disconnecting");
                    self.abandon().await;
                    return Ok(ConnectOutcome::ShuttingDown);
                }
                self.established = true;
                self.control.set_state(ConnectionState::Connected);
                Ok(if reconnect {
                    ConnectOutcome::Reconnected
                } else {
                    ConnectOutcome::Connected
                })
            }
        }
    }

    /// Begin shutdown (if not already) and drop the link
    ///
    /// Never fails; a QUIT that cannot be delivered is only logged.
    pub async fn shutdown(&mut self) {
        self.control.begin_shutdown();
        if self.conn.is_connected() {
            self.control.set_state(ConnectionState::ShuttingDown);
            if let Err(e) = self.conn.disconnect().await {
                log::warn!("Error while disconnecting: {e}");
            }
        }
        self.control.set_state(ConnectionState::Disconnected);
    }

    /// The link dropped on its own
    pub fn link_lost(&self) {
        if self.control.state() != ConnectionState::ShuttingDown {
            self.control.set_state(ConnectionState::Disconnected);
        }
    }

    /// Tear down whatever a cancelled or timed-out handshake left behind
    async fn abandon(&mut self) {
        if let Err(e) = self.conn.disconnect().await {
            log::debug!("Cleanup after abandoned connect failed: {e}");
        }
        self.settle_disconnected();
    }

    fn settle_disconnected(&self) {
        self.control.set_state(ConnectionState::Disconnected);
    }
}
