//! Lifecycle management for `IrcConnection` (connect, register, close)

use std::sync::Arc;
use std::sync::atomic::Ordering;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::codec::Framed;

use crate::error::{BridgeError, Result};
use crate::transport::{ConnectParams, TlsMode};

use super::codec::IrcCodec;
use super::connection::{IrcConnection, IrcFramed, IrcIo};
use super::message::{self, IrcLine, replies};
use super::reader::{ReaderContext, spawn_reader};
use super::tls;

/// Gateway name announced in the WEBIRC preamble
const WEBIRC_GATEWAY: &str = "cgiirc";

/// Reason sent with QUIT
const QUIT_MESSAGE: &str = "Player left the game";

impl IrcConnection {
    /// Connect (or reconnect) and register
    ///
    /// # Errors
    /// Returns `Connection`/`Tls` for network failures and `ProtocolRejection`
    /// when registration is refused
    pub(super) async fn connect_impl(&mut self) -> Result<()> {
        if self.connected.load(Ordering::SeqCst) {
            return Ok(());
        }

        // A previous session's reader may still be winding down
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
        self.writer = None;

        let (nick, rejoin) = {
            let roster = self.roster.lock();
            let rejoin = if self.established {
                roster.channel_names()
            } else {
                Vec::new()
            };
            (roster.nick().to_string(), rejoin)
        };

        let stream = open_stream(&self.params).await?;
        let mut framed: IrcFramed = Framed::new(stream, IrcCodec::new());
        let nick = register(&mut framed, &self.params, &nick).await?;

        self.roster.lock().reset(nick.clone());
        let (sink, source) = framed.split();
        let writer = Arc::new(AsyncMutex::new(sink));
        self.connected.store(true, Ordering::SeqCst);

        let ctx = ReaderContext {
            writer: Arc::clone(&writer),
            roster: Arc::clone(&self.roster),
            connected: Arc::clone(&self.connected),
            events_tx: self.events_tx.clone(),
            verbose: self.params.verbose,
        };
        self.reader_task = Some(spawn_reader(ctx, source));
        self.writer = Some(writer);

        if self.established {
            log::info!(
                "[{}] Reconnected to {}:{}, rejoining {} channel(s)",
                nick,
                self.params.host,
                self.params.port,
                rejoin.len()
            );
            for channel in rejoin {
                self.send_raw(&message::join(&channel)).await?;
            }
        } else {
            log::info!(
                "[{}] Connected to {}:{}",
                nick,
                self.params.host,
                self.params.port
            );
        }
        self.established = true;

        Ok(())
    }

    /// Quit and tear down the socket
    ///
    /// Cleanup always completes; the returned error only reports a QUIT that
    /// could not be delivered.
    pub(super) async fn close_impl(&mut self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);

        let mut result = Ok(());
        if let Some(writer) = self.writer.take() {
            let mut sink = writer.lock().await;
            result = sink.send(message::quit(QUIT_MESSAGE)).await;
            let _ = sink.close().await;
        }

        if let Some(task) = self.reader_task.take() {
            task.abort();
        }

        result
    }

    /// Handle Drop cleanup
    pub(super) fn drop_impl(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
    }

    async fn send_raw(&mut self, line: &str) -> Result<()> {
        let writer = self.writer.as_ref().ok_or(BridgeError::NotConnected)?;
        log_line(self.params.verbose, self.roster.lock().nick(), ">>", line);
        writer.lock().await.send(line.to_string()).await
    }
}

/// Log one protocol line, at info level when verbose
pub(super) fn log_line(verbose: bool, nick: &str, direction: &str, line: &str) {
    if verbose {
        log::info!("[{nick}] {direction} {line}");
    } else {
        log::trace!("[{nick}] {direction} {line}");
    }
}

async fn open_stream(params: &ConnectParams) -> Result<Box<dyn IrcIo>> {
    let tcp = TcpStream::connect((params.host.as_str(), params.port))
        .await
        .map_err(|e| {
            BridgeError::connection(format!(
                "Failed to connect to {}:{}: {e}",
                params.host, params.port
            ))
        })?;
    let _ = tcp.set_nodelay(true);

    match params.tls {
        TlsMode::None => Ok(Box::new(tcp)),
        mode => Ok(Box::new(tls::wrap(mode, &params.host, tcp).await?)),
    }
}

async fn send(framed: &mut IrcFramed, params: &ConnectParams, nick: &str, line: String) -> Result<()> {
    log_line(params.verbose, nick, ">>", &line);
    framed.send(line).await
}

/// Run the registration handshake; returns the nick the server accepted
async fn register(framed: &mut IrcFramed, params: &ConnectParams, nick: &str) -> Result<String> {
    if let Some(preamble) = &params.preamble {
        let line = message::webirc(
            &preamble.password,
            WEBIRC_GATEWAY,
            &preamble.hostname,
            &preamble.address.to_string(),
        );
        send(framed, params, nick, line).await?;
    }
    if let Some(password) = &params.password {
        send(framed, params, nick, message::pass(password)).await?;
    }

    let base = nick.to_string();
    let mut nick = base.clone();
    let mut attempt = 0;
    send(framed, params, &nick, message::nick(&nick)).await?;
    send(framed, params, &nick, message::user(&params.login, &params.realname)).await?;

    while let Some(frame) = framed.next().await {
        let line = frame?;
        log_line(params.verbose, &nick, "<<", &line);

        let Some(msg) = IrcLine::parse(&line) else {
            continue;
        };

        match (msg.command.as_str(), msg.numeric()) {
            ("PING", _) => {
                let token = msg.trailing().unwrap_or_default().to_string();
                send(framed, params, &nick, message::pong(&token)).await?;
            }
            ("ERROR", _) => {
                return Err(BridgeError::rejected(
                    msg.trailing().unwrap_or("closing link").to_string(),
                ));
            }
            (_, Some(replies::RPL_WELCOME)) => {
                return Ok(msg.param(0).unwrap_or(&nick).to_string());
            }
            (
                _,
                Some(
                    replies::ERR_NICKNAMEINUSE
                    | replies::ERR_ERRONEUSNICKNAME
                    | replies::ERR_NICKCOLLISION,
                ),
            ) => {
                attempt += 1;
                let Some(next) = params
                    .collision
                    .next_nick(&base, attempt, params.max_nick_len)
                else {
                    return Err(BridgeError::rejected(format!(
                        "Nick '{nick}' refused: {}",
                        msg.trailing().unwrap_or_default()
                    )));
                };
                log::debug!("[{nick}] Nick refused, trying '{next}'");
                nick = next;
                send(framed, params, &nick, message::nick(&nick)).await?;
            }
            (
                _,
                Some(
                    replies::ERR_PASSWDMISMATCH
                    | replies::ERR_YOUREBANNEDCREEP
                    | replies::ERR_NEEDMOREPARAMS,
                ),
            ) => {
                return Err(BridgeError::rejected(format!(
                    "{} {}",
                    msg.command,
                    msg.trailing().unwrap_or_default()
                )));
            }
            _ => {}
        }
    }

    Err(BridgeError::connection(
        "Server closed the connection during registration",
    ))
}
