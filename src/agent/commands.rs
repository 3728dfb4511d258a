//! Command protocol between an `Agent` handle and its worker task

use tokio::sync::oneshot;

use crate::error::Result;

use super::controller::ConnectOutcome;

/// Commands that can be sent to an agent worker
///
/// The worker owns the connection; handles never lock it.
pub(super) enum AgentCommand {
    /// Connect, or reconnect if the link dropped
    Connect {
        /// Channel to send the outcome back
        response_tx: oneshot::Sender<Result<ConnectOutcome>>,
    },

    /// Chat to the active channel
    SendMessage {
        /// Text to send verbatim
        text: String,
    },

    /// Action to the active channel (translation applies)
    SendAction {
        /// Action text
        text: String,
    },

    /// Ask for the active channel's topic
    RequestTopic,

    /// Show the user list of a channel (active channel if `None`)
    ListNames {
        /// Channel to list
        channel: Option<String>,
    },

    /// WHOIS one or more nicks
    Whois {
        /// Space-separated nicks
        nicks: String,
    },

    /// Join a channel
    Join {
        /// Channel name
        channel: String,
    },

    /// Change the active channel
    SetActiveChannel {
        /// Channel name
        channel: String,
    },

    /// Disconnect and stop the worker
    Shutdown,
}
