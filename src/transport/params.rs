//! Connection parameters

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::config::BridgeConfig;

/// Socket mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Plain TCP
    #[default]
    None,
    /// TLS with certificate verification against the webpki roots
    Verify,
    /// TLS accepting any certificate
    TrustAll,
}

/// What to do when the server rejects the nick during registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NickCollisionPolicy {
    /// Retry with a numeric suffix (`nick1`, `nick2`, ...) within the length limit
    #[default]
    AppendNumber,
    /// Fail the connect with `ProtocolRejection`
    Reject,
}

impl NickCollisionPolicy {
    /// Maximum number of alternate nicks tried before giving up
    pub const MAX_ATTEMPTS: u32 = 9;

    /// Next nick to try after `attempt` rejections, or `None` to give up
    #[must_use]
    pub fn next_nick(self, base: &str, attempt: u32, max_len: usize) -> Option<String> {
        match self {
            Self::Reject => None,
            Self::AppendNumber if attempt > Self::MAX_ATTEMPTS => None,
            Self::AppendNumber => {
                let suffix = attempt.to_string();
                let keep = max_len.saturating_sub(suffix.len());
                if keep == 0 {
                    return None;
                }
                let stem: String = base.chars().take(keep).collect();
                Some(format!("{stem}{suffix}"))
            }
        }
    }
}

/// Pre-registration data letting a trusted gateway present the player's real
/// address and hostname to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebIrcPreamble {
    /// Shared gateway password
    pub password: String,
    /// Hostname to present (the textual address; no reverse DNS)
    pub hostname: String,
    /// Address to present
    pub address: IpAddr,
}

/// Everything needed to open one agent's connection
#[derive(Debug, Clone)]
pub struct ConnectParams {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Server password
    pub password: Option<String>,
    /// Socket mode
    pub tls: TlsMode,
    /// Optional WEBIRC preamble
    pub preamble: Option<WebIrcPreamble>,
    /// Requested nick
    pub nick: String,
    /// `USER` ident
    pub login: String,
    /// `USER` real name
    pub realname: String,
    /// Maximum nick length
    pub max_nick_len: usize,
    /// Nick collision handling
    pub collision: NickCollisionPolicy,
    /// Log raw lines at info level
    pub verbose: bool,
}

impl ConnectParams {
    /// Build parameters for one player from the bridge configuration
    #[must_use]
    pub fn for_player(
        config: &BridgeConfig,
        nick: &str,
        login: String,
        realname: &str,
        address: Option<IpAddr>,
    ) -> Self {
        let preamble = match (&config.server.webirc_password, address) {
            (Some(password), Some(address)) => Some(WebIrcPreamble {
                password: password.clone(),
                hostname: address.to_string(),
                address,
            }),
            _ => None,
        };

        Self {
            host: config.server.address.clone(),
            port: config.server.port,
            password: config.server.password.clone().filter(|p| !p.is_empty()),
            tls: config.tls_mode(),
            preamble,
            nick: nick.to_string(),
            login,
            realname: realname.to_string(),
            max_nick_len: config.server.nicksize,
            collision: config.nick_collision,
            verbose: config.verbose,
        }
    }
}
