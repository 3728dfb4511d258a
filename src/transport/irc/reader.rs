//! Background reader for a registered connection

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::transport::ServerEvent;

use super::connection::{IrcFramed, SharedSink};
use super::lifecycle::log_line;
use super::message::{self, IrcLine, replies};
use super::roster::Roster;

/// Shared state for the reader task
pub(super) struct ReaderContext {
    pub writer: SharedSink,
    pub roster: Arc<Mutex<Roster>>,
    pub connected: Arc<AtomicBool>,
    pub events_tx: mpsc::UnboundedSender<ServerEvent>,
    pub verbose: bool,
}

/// Spawn the reader task for a freshly registered connection
///
/// The task runs until the server closes the link, sends `ERROR`, or the
/// connection aborts it on disconnect. When the link drops on its own the
/// connection is marked disconnected and a `Disconnected` event is emitted.
pub(super) fn spawn_reader(ctx: ReaderContext, mut source: SplitStream<IrcFramed>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reason = loop {
            let line = match source.next().await {
                Some(Ok(line)) => line,
                Some(Err(e)) => break format!("read error: {e}"),
                None => break "connection closed by server".to_string(),
            };

            let nick = ctx.roster.lock().nick().to_string();
            log_line(ctx.verbose, &nick, "<<", &line);

            let Some(msg) = IrcLine::parse(&line) else {
                log::warn!("[{nick}] Ignoring unparseable line: {line}");
                continue;
            };

            if msg.command == "ERROR" {
                break msg.trailing().unwrap_or("closing link").to_string();
            }
            if msg.command == "PING" {
                let token = msg.trailing().unwrap_or_default();
                let pong = message::pong(token);
                log_line(ctx.verbose, &nick, ">>", &pong);
                if ctx.writer.lock().await.send(pong).await.is_err() {
                    break "failed to answer PING".to_string();
                }
                continue;
            }

            for event in handle_line(&ctx.roster, &msg) {
                if ctx.events_tx.send(event).is_err() {
                    // Agent is gone; nothing left to deliver to
                    return;
                }
            }
        };

        ctx.connected.store(false, Ordering::SeqCst);
        let nick = ctx.roster.lock().nick().to_string();
        log::warn!("[{nick}] Disconnected: {reason}");
        let _ = ctx.events_tx.send(ServerEvent::Disconnected { reason });
    })
}

/// Update the roster from one line and produce the events it implies
fn handle_line(roster: &Mutex<Roster>, msg: &IrcLine) -> Vec<ServerEvent> {
    let mut roster = roster.lock();
    let from = msg.nick().unwrap_or_default().to_string();

    if let Some(code) = msg.numeric() {
        let mut events = vec![ServerEvent::Reply {
            code,
            text: msg.raw_params().to_string(),
        }];
        match code {
            replies::RPL_NAMREPLY => {
                // <me> <type> <channel> :<names>
                if let (Some(channel), Some(names)) = (msg.param(2), msg.param(3)) {
                    roster.names_chunk(channel, names);
                }
            }
            replies::RPL_ENDOFNAMES => {
                if let Some(channel) = msg.param(1) {
                    roster.names_end(channel);
                    events.push(ServerEvent::UserList {
                        channel: channel.to_string(),
                    });
                }
            }
            replies::RPL_NOTOPIC => {
                // <me> <channel> :No topic is set
                if let Some(channel) = msg.param(1) {
                    events.push(ServerEvent::NoTopic {
                        channel: channel.to_string(),
                    });
                }
            }
            replies::RPL_TOPIC => {
                if let (Some(channel), Some(topic)) = (msg.param(1), msg.param(2)) {
                    events.push(ServerEvent::Topic {
                        channel: channel.to_string(),
                        topic: topic.to_string(),
                    });
                }
            }
            _ => {}
        }
        return events;
    }

    match msg.command.as_str() {
        "JOIN" => {
            let Some(channel) = msg.param(0) else {
                return Vec::new();
            };
            if roster.is_self(&from) {
                roster.joined(channel);
                roster.user_joined(channel, &from);
                return vec![ServerEvent::Joined {
                    channel: channel.to_string(),
                }];
            }
            roster.user_joined(channel, &from);
        }
        "PART" => {
            let Some(channel) = msg.param(0) else {
                return Vec::new();
            };
            if roster.is_self(&from) {
                roster.parted(channel);
                return vec![ServerEvent::Parted {
                    channel: channel.to_string(),
                }];
            }
            roster.user_parted(channel, &from);
        }
        "KICK" => {
            let (Some(channel), Some(target)) = (msg.param(0), msg.param(1)) else {
                return Vec::new();
            };
            if roster.is_self(target) {
                roster.parted(channel);
                return vec![ServerEvent::Parted {
                    channel: channel.to_string(),
                }];
            }
            roster.user_parted(channel, target);
        }
        "QUIT" => roster.user_quit(&from),
        "NICK" => {
            let Some(new) = msg.param(0) else {
                return Vec::new();
            };
            let own = roster.is_self(&from);
            roster.renamed(&from, new);
            if own {
                return vec![ServerEvent::NickChanged {
                    nick: new.to_string(),
                }];
            }
        }
        "TOPIC" => {
            if let (Some(channel), Some(topic)) = (msg.param(0), msg.param(1)) {
                return vec![ServerEvent::Topic {
                    channel: channel.to_string(),
                    topic: topic.to_string(),
                }];
            }
        }
        "PRIVMSG" => {
            let (Some(target), Some(text)) = (msg.param(0), msg.param(1)) else {
                return Vec::new();
            };
            let channel = target.to_string();
            return vec![match message::ctcp_action(text) {
                Some(body) => ServerEvent::Action {
                    channel,
                    from,
                    text: body.to_string(),
                },
                None => ServerEvent::Message {
                    channel,
                    from,
                    text: text.to_string(),
                },
            }];
        }
        _ => {}
    }

    Vec::new()
}
