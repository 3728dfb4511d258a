//! Transport layer for talking to the IRC server
//!
//! An agent never touches a socket directly. It drives a [`Connection`], a
//! small capability (connect, disconnect, send a raw line, list channel users)
//! with one event stream of parsed [`ServerEvent`]s. The real implementation
//! lives in [`irc`]; tests substitute a scripted fake.

pub mod irc;
mod params;

use std::future::Future;

use tokio::sync::mpsc;

use crate::error::Result;

pub use irc::{IrcConnection, IrcConnector};
pub use params::{ConnectParams, NickCollisionPolicy, TlsMode, WebIrcPreamble};

/// Events parsed from the server stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Any numeric reply; `text` is everything after the code
    Reply {
        /// Three-digit reply code
        code: u16,
        /// Reply text following the code
        text: String,
    },
    /// This connection joined a channel
    Joined {
        /// Channel name
        channel: String,
    },
    /// This connection left or was kicked from a channel
    Parted {
        /// Channel name
        channel: String,
    },
    /// The user list for a channel is complete
    UserList {
        /// Channel name
        channel: String,
    },
    /// A channel topic arrived (reply or change)
    Topic {
        /// Channel name
        channel: String,
        /// Topic text
        topic: String,
    },
    /// The server reported that a channel has no topic
    NoTopic {
        /// Channel name
        channel: String,
    },
    /// A channel message from another user
    Message {
        /// Channel name
        channel: String,
        /// Sender nick
        from: String,
        /// Message text
        text: String,
    },
    /// A CTCP ACTION from another user
    Action {
        /// Channel name
        channel: String,
        /// Sender nick
        from: String,
        /// Action text
        text: String,
    },
    /// This connection's nick changed
    NickChanged {
        /// New nick
        nick: String,
    },
    /// The link to the server dropped
    Disconnected {
        /// Why the link dropped
        reason: String,
    },
}

/// Connection capability held by an agent
///
/// This trait defines the narrow set of operations the bridge needs from a
/// line-oriented IRC client.
pub trait Connection: Send + Sync + 'static {
    /// Connect, or reconnect if this connection was established before
    ///
    /// A reconnect re-registers with the current nick and rejoins the channels
    /// the connection was in.
    ///
    /// # Errors
    /// Returns `Connection`/`Tls` for network failures and `ProtocolRejection`
    /// when the server refuses registration
    fn connect(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Disconnect from the server
    ///
    /// # Errors
    /// Returns error if the quit could not be delivered
    fn disconnect(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Check whether the connection is registered and live
    fn is_connected(&self) -> bool;

    /// Send one raw protocol line (no trailing CRLF)
    ///
    /// # Errors
    /// Returns `NotConnected` if there is no live connection
    fn send_line(&mut self, line: &str) -> impl Future<Output = Result<()>> + Send;

    /// Nicks currently present in a channel
    fn list_users(&self, channel: &str) -> Vec<String>;

    /// Nick currently in use (may differ from the requested nick after a collision)
    fn nick(&self) -> String;

    /// Take the event receiver
    ///
    /// The receiver spans reconnects; it can only be taken once.
    fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ServerEvent>>;
}

/// Builds connections for new agents
pub trait ConnectionFactory: Send + Sync + 'static {
    /// Connection type produced by this factory
    type Conn: Connection;

    /// Create an unconnected connection
    fn create(&self, params: ConnectParams) -> Self::Conn;
}
