//! IRC line parsing and command encoding

/// Numeric reply codes the bridge reacts to
pub mod replies {
    /// Registration accepted
    pub const RPL_WELCOME: u16 = 1;
    /// Channel has no topic
    pub const RPL_NOTOPIC: u16 = 331;
    /// Channel topic
    pub const RPL_TOPIC: u16 = 332;
    /// WHOIS user-info line; opens a WHOIS reply
    pub const RPL_WHOISUSER: u16 = 311;
    /// End of a WHOIS reply
    pub const RPL_ENDOFWHOIS: u16 = 318;
    /// One chunk of a channel user list
    pub const RPL_NAMREPLY: u16 = 353;
    /// End of a channel user list
    pub const RPL_ENDOFNAMES: u16 = 366;
    /// Nick contains invalid characters
    pub const ERR_ERRONEUSNICKNAME: u16 = 432;
    /// Nick already taken
    pub const ERR_NICKNAMEINUSE: u16 = 433;
    /// Nick collided with another server's user
    pub const ERR_NICKCOLLISION: u16 = 436;
    /// Registration needs more parameters
    pub const ERR_NEEDMOREPARAMS: u16 = 461;
    /// Wrong server password
    pub const ERR_PASSWDMISMATCH: u16 = 464;
    /// Banned from the server
    pub const ERR_YOUREBANNEDCREEP: u16 = 465;
}

const CTCP_DELIM: char = '\u{1}';
const CTCP_ACTION: &str = "\u{1}ACTION ";

/// One parsed protocol line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcLine {
    /// Source prefix without the leading colon
    pub prefix: Option<String>,
    /// Command or three-digit numeric, upper-cased
    pub command: String,
    /// Parameters, trailing parameter last
    pub params: Vec<String>,
    raw_params: String,
}

impl IrcLine {
    /// Parse a line; IRCv3 message tags are skipped
    ///
    /// Returns `None` for blank lines or lines without a command.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        if rest.starts_with('@') {
            rest = rest.split_once(' ').map_or("", |(_, r)| r);
        }
        rest = rest.trim_start();

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (p, r) = stripped.split_once(' ').unwrap_or((stripped, ""));
            prefix = Some(p.to_string());
            rest = r.trim_start();
        }

        let (command, r) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return None;
        }
        let raw_params = r.trim_start();

        let mut params = Vec::new();
        let mut cursor = raw_params;
        while !cursor.is_empty() {
            if let Some(trailing) = cursor.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            let (param, r) = cursor.split_once(' ').unwrap_or((cursor, ""));
            params.push(param.to_string());
            cursor = r.trim_start();
        }

        Some(Self {
            prefix,
            command: command.to_ascii_uppercase(),
            params,
            raw_params: raw_params.to_string(),
        })
    }

    /// Nick part of the prefix (`nick!user@host`)
    #[must_use]
    pub fn nick(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|p| p.split(['!', '@']).next().unwrap_or(p))
    }

    /// Parameter by index
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Last parameter
    #[must_use]
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// Everything after the command, unparsed
    #[must_use]
    pub fn raw_params(&self) -> &str {
        &self.raw_params
    }

    /// Numeric reply code, if the command is a three-digit number
    #[must_use]
    pub fn numeric(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }
}

/// Extract the body of a CTCP ACTION, if the text is one
#[must_use]
pub fn ctcp_action(text: &str) -> Option<&str> {
    text.strip_prefix(CTCP_ACTION)
        .map(|body| body.strip_suffix(CTCP_DELIM).unwrap_or(body))
}

/// Compare two nicks or channel names the way IRC servers do (ASCII case-insensitive)
#[must_use]
pub fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

// ============================================================================
// Command encoding
// ============================================================================

/// `PRIVMSG <target> :<text>`
#[must_use]
pub fn privmsg(target: &str, text: &str) -> String {
    format!(
        "PRIVMSG {} :{}",
        strip_newlines(target),
        strip_newlines(text)
    )
}

/// CTCP ACTION to a target
#[must_use]
pub fn action(target: &str, text: &str) -> String {
    format!(
        "PRIVMSG {} :{CTCP_ACTION}{}{CTCP_DELIM}",
        strip_newlines(target),
        strip_newlines(text)
    )
}

/// `JOIN <channel>`
#[must_use]
pub fn join(channel: &str) -> String {
    format!("JOIN {}", strip_newlines(channel))
}

/// `TOPIC <channel>` (request, no new topic)
#[must_use]
pub fn topic_request(channel: &str) -> String {
    format!("TOPIC {}", strip_newlines(channel))
}

/// `WHOIS <nick-list>`
#[must_use]
pub fn whois(nicks: &str) -> String {
    format!("WHOIS {}", strip_newlines(nicks))
}

/// `NICK <nick>`
#[must_use]
pub fn nick(nick: &str) -> String {
    format!("NICK {nick}")
}

/// `USER <login> 8 * :<realname>`
#[must_use]
pub fn user(login: &str, realname: &str) -> String {
    format!("USER {login} 8 * :{realname}")
}

/// `PASS <password>`
#[must_use]
pub fn pass(password: &str) -> String {
    format!("PASS {password}")
}

/// `WEBIRC <password> <gateway> <hostname> <address>`
#[must_use]
pub fn webirc(password: &str, gateway: &str, hostname: &str, address: &str) -> String {
    format!("WEBIRC {password} {gateway} {hostname} {address}")
}

/// `PONG :<token>`
#[must_use]
pub fn pong(token: &str) -> String {
    format!("PONG :{token}")
}

/// `QUIT :<reason>`
#[must_use]
pub fn quit(reason: &str) -> String {
    format!("QUIT :{reason}")
}

/// Line breaks would end the command early and start a new one
fn strip_newlines(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
