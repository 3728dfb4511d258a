//! IRC connection over TCP or TLS
//!
//! [`IrcConnection`] registers with the server (optionally behind a WEBIRC
//! preamble), then hands the socket's read half to a background reader task
//! that answers pings, keeps channel rosters current and turns lines into
//! [`ServerEvent`](crate::transport::ServerEvent)s.

pub mod codec;
mod connection;
mod lifecycle;
pub mod message;
mod reader;
mod roster;
mod tls;

// Re-export public types
pub use codec::IrcCodec;
pub use connection::{IrcConnection, IrcConnector};
pub use message::{IrcLine, replies};
