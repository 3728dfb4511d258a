//! `IrcConnection` and its factory

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::SinkExt;
use futures::stream::SplitSink;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

use crate::error::{BridgeError, Result};
use crate::transport::{ConnectParams, Connection, ConnectionFactory, ServerEvent};

use super::codec::IrcCodec;
use super::roster::Roster;

/// Byte stream under the line codec: plain TCP or TLS
pub(super) trait IrcIo: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> IrcIo for T {}

pub(super) type IrcFramed = Framed<Box<dyn IrcIo>, IrcCodec>;

/// Write half, shared between the connection and its reader task (for PONG)
pub(super) type SharedSink = Arc<AsyncMutex<SplitSink<IrcFramed, String>>>;

/// One player's connection to the IRC server
pub struct IrcConnection {
    pub(super) params: ConnectParams,
    pub(super) roster: Arc<Mutex<Roster>>,
    pub(super) writer: Option<SharedSink>,
    pub(super) connected: Arc<AtomicBool>,
    pub(super) events_tx: mpsc::UnboundedSender<ServerEvent>,
    pub(super) events_rx: Option<mpsc::UnboundedReceiver<ServerEvent>>,
    pub(super) reader_task: Option<JoinHandle<()>>,
    pub(super) established: bool,
}

impl IrcConnection {
    /// Create an unconnected connection
    #[must_use]
    pub fn new(params: ConnectParams) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let roster = Roster::new(params.nick.clone());

        Self {
            params,
            roster: Arc::new(Mutex::new(roster)),
            writer: None,
            connected: Arc::new(AtomicBool::new(false)),
            events_tx,
            events_rx: Some(events_rx),
            reader_task: None,
            established: false,
        }
    }

    /// Parameters this connection was built with
    #[must_use]
    pub const fn params(&self) -> &ConnectParams {
        &self.params
    }

    /// Channels the connection is currently in
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        self.roster.lock().channel_names()
    }
}

impl Connection for IrcConnection {
    async fn connect(&mut self) -> Result<()> {
        self.connect_impl().await
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.close_impl().await
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(BridgeError::NotConnected);
        }

        let writer = self.writer.as_ref().ok_or(BridgeError::NotConnected)?;
        super::lifecycle::log_line(self.params.verbose, &self.nick(), ">>", line);
        writer.lock().await.send(line.to_string()).await
    }

    fn list_users(&self, channel: &str) -> Vec<String> {
        self.roster.lock().users(channel)
    }

    fn nick(&self) -> String {
        self.roster.lock().nick().to_string()
    }

    fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ServerEvent>> {
        self.events_rx.take()
    }
}

impl Drop for IrcConnection {
    fn drop(&mut self) {
        self.drop_impl();
    }
}

/// Factory producing [`IrcConnection`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct IrcConnector;

impl ConnectionFactory for IrcConnector {
    type Conn = IrcConnection;

    fn create(&self, params: ConnectParams) -> IrcConnection {
        IrcConnection::new(params)
    }
}
