//! Background task owning one agent's connection

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::BridgeConfig;
use crate::display::UserDisplay;
use crate::error::{BridgeError, Result};
use crate::transport::irc::message;
use crate::transport::{Connection, ServerEvent};
use crate::types::PlayerIdentity;

use super::commands::AgentCommand;
use super::controller::{ConnectOutcome, ConnectionController};
use super::interpreter::{ReplyOutcome, ResponseInterpreter};
use super::relay::MessageRelay;
use super::session::ChannelSession;

/// Shown in place of the topic for a channel without one
const NO_TOPIC: &str = "No topic is set";

/// Shared state for the worker task
pub(super) struct WorkerContext {
    pub identity: PlayerIdentity,
    pub display_name: String,
    pub config: Arc<BridgeConfig>,
    pub display: Arc<dyn UserDisplay>,
}

struct AgentWorker<C: Connection> {
    controller: ConnectionController<C>,
    session: ChannelSession,
    interpreter: ResponseInterpreter,
    relay: MessageRelay,
    ctx: WorkerContext,
}

/// Spawn the worker for one agent
///
/// The task owns the connection and handles:
/// - commands from the `Agent` handle
/// - events from the connection's reader
///
/// It runs until a `Shutdown` command arrives or every handle is dropped.
pub(super) fn spawn_agent_worker<C: Connection>(
    mut controller: ConnectionController<C>,
    mut command_rx: mpsc::UnboundedReceiver<AgentCommand>,
    ctx: WorkerContext,
) {
    tokio::spawn(async move {
        let mut events = controller.connection_mut().take_events();
        let mut worker = AgentWorker {
            controller,
            session: ChannelSession::new(ctx.config.timeouts.reply()),
            interpreter: ResponseInterpreter::new(),
            relay: MessageRelay::new(Arc::clone(&ctx.config)),
            ctx,
        };

        loop {
            tokio::select! {
                // Server traffic already received is handled before later commands
                biased;
                Some(event) = next_event(&mut events) => worker.handle_event(event),
                cmd = command_rx.recv() => {
                    let Some(cmd) = cmd else {
                        // Every handle is gone
                        worker.stop().await;
                        break;
                    };
                    if worker.handle_command(cmd).await.is_break() {
                        break;
                    }
                }
            }
        }

        log::debug!("[{}] Agent worker stopped", worker.ctx.identity);
    });
}

async fn next_event(events: &mut Option<mpsc::UnboundedReceiver<ServerEvent>>) -> Option<ServerEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

impl<C: Connection> AgentWorker<C> {
    fn nick(&self) -> String {
        self.controller.connection().nick()
    }

    fn show(&self, line: &str) {
        self.ctx.display.show(&self.ctx.identity, line);
    }

    async fn handle_command(&mut self, cmd: AgentCommand) -> ControlFlow<()> {
        match cmd {
            AgentCommand::Connect { response_tx } => {
                let result = self.connect().await;
                let _ = response_tx.send(result);
            }
            AgentCommand::SendMessage { text } => {
                if let Err(e) = self.send_message(&text).await {
                    log::warn!("[{}] Message not relayed: {e}", self.nick());
                }
            }
            AgentCommand::SendAction { text } => {
                if let Err(e) = self.send_action(&text).await {
                    log::warn!("[{}] Action not relayed: {e}", self.nick());
                }
            }
            AgentCommand::RequestTopic => {
                let result = match self.session.request_topic() {
                    Ok(line) => self.send(&line).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    log::warn!("[{}] Topic request failed: {e}", self.nick());
                }
            }
            AgentCommand::ListNames { channel } => self.list_names(channel),
            AgentCommand::Whois { nicks } => {
                if let Err(e) = self.send(&message::whois(&nicks)).await {
                    log::warn!("[{}] WHOIS failed: {e}", self.nick());
                }
            }
            AgentCommand::Join { channel } => {
                if let Err(e) = self.send(&message::join(&channel)).await {
                    log::warn!("[{}] Join of {channel} failed: {e}", self.nick());
                }
            }
            AgentCommand::SetActiveChannel { channel } => {
                self.session.set_active_channel(&channel);
            }
            AgentCommand::Shutdown => {
                self.stop().await;
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn connect(&mut self) -> Result<ConnectOutcome> {
        let outcome = self.controller.connect().await?;
        if outcome == ConnectOutcome::Connected {
            // Reconnects rejoin inside the connection; only a first connect autojoins
            for channel in &self.ctx.config.channels {
                let line = message::join(channel);
                if let Err(e) = self.controller.connection_mut().send_line(&line).await {
                    log::warn!("[{}] Autojoin of {channel} failed: {e}", self.nick());
                }
            }
        }
        Ok(outcome)
    }

    async fn stop(&mut self) {
        self.controller.shutdown().await;
        self.session.reset();
    }

    async fn send(&mut self, line: &str) -> Result<()> {
        self.controller.connection_mut().send_line(line).await
    }

    async fn send_message(&mut self, text: &str) -> Result<()> {
        let channel = self
            .session
            .active_channel()
            .ok_or(BridgeError::NoActiveChannel)?;
        let line = self.relay.message_line(channel, text);
        self.send(&line).await
    }

    async fn send_action(&mut self, text: &str) -> Result<()> {
        let channel = self
            .session
            .active_channel()
            .ok_or(BridgeError::NoActiveChannel)?;
        let relayed = self.relay.action(channel, &self.ctx.display_name, text);
        self.send(&relayed.line).await?;
        self.show(&relayed.confirmation);
        Ok(())
    }

    fn list_names(&mut self, channel: Option<String>) {
        let Some(channel) = channel.or_else(|| self.session.active_channel().map(str::to_string))
        else {
            log::debug!("[{}] No channel to list", self.nick());
            return;
        };
        let users = self.controller.connection().list_users(&channel);
        if let Some(line) = self
            .session
            .names(&channel, &users, &self.ctx.config.messages.list)
        {
            self.show(&line);
        }
    }

    fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Reply { code, text } => {
                let nick = self.nick();
                let outcome = self.interpreter.interpret(
                    self.session.expectations_mut(),
                    code,
                    &text,
                    &nick,
                );
                if let ReplyOutcome::Display(line) = outcome {
                    self.show(&line);
                }
            }
            ServerEvent::Joined { channel } => {
                log::debug!("[{}] Joined {channel}", self.nick());
                self.session.joined(&channel);
            }
            ServerEvent::Parted { channel } => {
                log::debug!("[{}] Left {channel}", self.nick());
                self.session.parted(&channel);
            }
            ServerEvent::UserList { channel } => self.list_names(Some(channel)),
            ServerEvent::Topic { channel, topic } => {
                if let Some(line) =
                    self.session
                        .topic_reply(&channel, &topic, &self.ctx.config.messages.topic)
                {
                    self.show(&line);
                }
            }
            ServerEvent::NoTopic { channel } => {
                if let Some(line) =
                    self.session
                        .topic_reply(&channel, NO_TOPIC, &self.ctx.config.messages.topic)
                {
                    self.show(&line);
                }
            }
            ServerEvent::Message {
                channel,
                from,
                text,
            } => {
                let line = self.relay.inbound_message(&channel, &from, &text);
                self.show(&line);
            }
            ServerEvent::Action {
                channel,
                from,
                text,
            } => {
                let line = self.relay.inbound_action(&channel, &from, &text);
                self.show(&line);
            }
            ServerEvent::NickChanged { nick } => {
                log::info!("[{}] Now known as '{nick}'", self.ctx.identity);
            }
            ServerEvent::Disconnected { reason } => {
                log::debug!("[{}] Link lost: {reason}", self.ctx.identity);
                self.session.reset();
                self.controller.link_lost();
            }
        }
    }
}
