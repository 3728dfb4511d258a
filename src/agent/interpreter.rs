//! WHOIS reconstruction from the numeric reply stream
//!
//! The server answers a WHOIS with several numerics that carry no request
//! correlation. The user-info line (`311`) opens the reply, the end-of-whois
//! line (`318`) closes it, and everything in between belongs to it whatever
//! its code.

use crate::format::{mark_own_nick, to_display};
use crate::transport::irc::replies::{RPL_ENDOFWHOIS, RPL_WHOISUSER};

use super::expectation::{ExpectationKind, ExpectationTracker};

/// What to do with one numeric reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Show this line to the player
    Display(String),
    /// Part of a WHOIS reply that is not shown (the end marker)
    Swallowed,
    /// Not WHOIS traffic; default handling applies
    PassThrough,
}

/// Routes numeric replies while a WHOIS reply is streaming in
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseInterpreter;

impl ResponseInterpreter {
    /// Create an interpreter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Classify one numeric reply
    ///
    /// `text` is the reply text after the code; `own_nick` is replaced by the
    /// WHOIS marker in forwarded lines.
    pub fn interpret(
        &self,
        expectations: &mut ExpectationTracker,
        code: u16,
        text: &str,
        own_nick: &str,
    ) -> ReplyOutcome {
        match code {
            RPL_WHOISUSER => {
                let target = text.split_whitespace().nth(1).unwrap_or("*");
                expectations.expect(ExpectationKind::Whois, target);
            }
            RPL_ENDOFWHOIS => {
                return if expectations.clear_kind(ExpectationKind::Whois) > 0 {
                    ReplyOutcome::Swallowed
                } else {
                    ReplyOutcome::PassThrough
                };
            }
            _ => {}
        }

        if expectations.any_pending(ExpectationKind::Whois) {
            ReplyOutcome::Display(to_display(&mark_own_nick(text, own_nick)))
        } else {
            ReplyOutcome::PassThrough
        }
    }

    /// Whether a WHOIS reply is currently streaming in
    pub fn receiving_whois(&self, expectations: &mut ExpectationTracker) -> bool {
        expectations.any_pending(ExpectationKind::Whois)
    }
}
