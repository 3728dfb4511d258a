//! Shared fakes for integration tests
//!
//! `FakeConnection` implements the connection capability in memory. Each one
//! exposes a cloneable `FakeHandle` so a test can inspect sent lines, inject
//! server events, fail or hold the next connect, and drop the link.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use irc_transport::error::{BridgeError, Result};
use irc_transport::{
    AgentSettings, ConnectParams, Connection, ConnectionFactory, MemorySettingsStore,
    PlayerIdentity, ServerEvent, SettingsStore, UserDisplay,
};
use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc};

#[derive(Default)]
struct FakeState {
    connect_calls: usize,
    disconnect_calls: usize,
    sent: Vec<String>,
    users: HashMap<String, Vec<String>>,
    fail_next_connect: Option<String>,
    hold_connects: bool,
}

/// Test-side view of one fake connection
#[derive(Clone)]
pub struct FakeHandle {
    state: Arc<Mutex<FakeState>>,
    connected: Arc<AtomicBool>,
    started: Arc<Notify>,
    release: Arc<Notify>,
    events_tx: mpsc::UnboundedSender<ServerEvent>,
    params: Arc<ConnectParams>,
}

impl FakeHandle {
    pub fn params(&self) -> &ConnectParams {
        &self.params
    }

    pub fn sent(&self) -> Vec<String> {
        self.state.lock().sent.clone()
    }

    pub fn connect_calls(&self) -> usize {
        self.state.lock().connect_calls
    }

    pub fn disconnect_calls(&self) -> usize {
        self.state.lock().disconnect_calls
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn set_users(&self, channel: &str, users: &[&str]) {
        self.state.lock().users.insert(
            channel.to_string(),
            users.iter().map(ToString::to_string).collect(),
        );
    }

    /// Make the next connect fail with a connection error
    pub fn fail_next_connect(&self, reason: &str) {
        self.state.lock().fail_next_connect = Some(reason.to_string());
    }

    /// Hold every connect until `release_connect` is called
    pub fn hold_connects(&self) {
        self.state.lock().hold_connects = true;
    }

    pub fn release_connect(&self) {
        self.release.notify_one();
    }

    /// Resolves once a connect has started
    pub async fn connect_started(&self) {
        self.started.notified().await;
    }

    pub fn inject(&self, event: ServerEvent) {
        let _ = self.events_tx.send(event);
    }

    /// Simulate the server dropping the link
    pub fn drop_link(&self, reason: &str) {
        self.connected.store(false, Ordering::SeqCst);
        self.inject(ServerEvent::Disconnected {
            reason: reason.to_string(),
        });
    }
}

pub struct FakeConnection {
    handle: FakeHandle,
    events_rx: Option<mpsc::UnboundedReceiver<ServerEvent>>,
}

impl FakeConnection {
    pub fn new(params: ConnectParams) -> (Self, FakeHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = FakeHandle {
            state: Arc::new(Mutex::new(FakeState::default())),
            connected: Arc::new(AtomicBool::new(false)),
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            events_tx,
            params: Arc::new(params),
        };
        let conn = Self {
            handle: handle.clone(),
            events_rx: Some(events_rx),
        };
        (conn, handle)
    }
}

impl Connection for FakeConnection {
    async fn connect(&mut self) -> Result<()> {
        let hold = {
            let mut state = self.handle.state.lock();
            state.connect_calls += 1;
            state.hold_connects
        };
        self.handle.started.notify_one();
        if hold {
            self.handle.release.notified().await;
        }

        if let Some(reason) = self.handle.state.lock().fail_next_connect.take() {
            return Err(BridgeError::connection(reason));
        }
        self.handle.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.handle.state.lock().disconnect_calls += 1;
        self.handle.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.handle.is_connected()
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(BridgeError::NotConnected);
        }
        self.handle.state.lock().sent.push(line.to_string());
        Ok(())
    }

    fn list_users(&self, channel: &str) -> Vec<String> {
        self.handle
            .state
            .lock()
            .users
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    fn nick(&self) -> String {
        self.handle.params.nick.clone()
    }

    fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ServerEvent>> {
        self.events_rx.take()
    }
}

/// Factory recording a handle for every connection it builds
#[derive(Clone, Default)]
pub struct FakeFactory {
    handles: Arc<Mutex<Vec<FakeHandle>>>,
    hold_connects: Arc<AtomicBool>,
    fail_connects: Arc<Mutex<Option<String>>>,
}

impl FakeFactory {
    pub fn handles(&self) -> Vec<FakeHandle> {
        self.handles.lock().clone()
    }

    pub fn last(&self) -> Option<FakeHandle> {
        self.handles.lock().last().cloned()
    }

    /// Connections built from now on hold their connects
    pub fn hold_connects(&self) {
        self.hold_connects.store(true, Ordering::SeqCst);
    }

    /// The next connection built fails its first connect
    pub fn fail_next(&self, reason: &str) {
        *self.fail_connects.lock() = Some(reason.to_string());
    }
}

impl ConnectionFactory for FakeFactory {
    type Conn = FakeConnection;

    fn create(&self, params: ConnectParams) -> FakeConnection {
        let (conn, handle) = FakeConnection::new(params);
        if self.hold_connects.load(Ordering::SeqCst) {
            handle.hold_connects();
        }
        if let Some(reason) = self.fail_connects.lock().take() {
            handle.fail_next_connect(&reason);
        }
        self.handles.lock().push(handle);
        conn
    }
}

/// Display that records every line shown
#[derive(Default)]
pub struct RecordingDisplay {
    lines: Mutex<Vec<(PlayerIdentity, String)>>,
}

impl RecordingDisplay {
    pub fn lines_for(&self, identity: &PlayerIdentity) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(id, _)| id == identity)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn all(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, l)| l.clone()).collect()
    }
}

impl UserDisplay for RecordingDisplay {
    fn show(&self, identity: &PlayerIdentity, line: &str) {
        self.lines.lock().push((*identity, line.to_string()));
    }
}

/// Settings store whose `load` waits until the test releases it
#[derive(Default)]
pub struct GatedStore {
    inner: MemorySettingsStore,
    entered: Notify,
    release: Notify,
}

impl GatedStore {
    /// Resolves once a `load` is waiting
    pub async fn load_started(&self) {
        self.entered.notified().await;
    }

    pub fn release_load(&self) {
        self.release.notify_one();
    }
}

impl SettingsStore for GatedStore {
    async fn load(&self, player_name: &str) -> Result<Option<AgentSettings>> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.load(player_name).await
    }

    async fn create(&self, settings: AgentSettings) -> Result<AgentSettings> {
        self.inner.create(settings).await
    }

    async fn save(&self, settings: AgentSettings) -> Result<()> {
        self.inner.save(settings).await
    }
}

/// Parameters for a fake connection
pub fn params(nick: &str) -> ConnectParams {
    let config = irc_transport::BridgeConfig::builder()
        .server("irc.test", 6667)
        .build();
    ConnectParams::for_player(&config, nick, "login".to_string(), "Real Name", None)
}

/// Poll a condition until it holds or two seconds pass
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
