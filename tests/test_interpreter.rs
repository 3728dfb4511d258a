//! Unit tests for WHOIS reconstruction

use std::time::Duration;

use irc_transport::agent::{ExpectationTracker, ReplyOutcome, ResponseInterpreter};
use irc_transport::transport::irc::replies;

const NICK: &str = "mc_Alice";

fn tracker() -> ExpectationTracker {
    ExpectationTracker::new(Duration::from_secs(60))
}

#[test]
fn test_whois_sequence_is_forwarded_and_closed() {
    let interpreter = ResponseInterpreter::new();
    let mut expectations = tracker();

    let a = interpreter.interpret(
        &mut expectations,
        replies::RPL_WHOISUSER,
        "mc_Alice bob ~bob host.example * :Bob",
        NICK,
    );
    let b = interpreter.interpret(&mut expectations, 319, "mc_Alice bob :#mc #other", NICK);
    let c = interpreter.interpret(
        &mut expectations,
        replies::RPL_ENDOFWHOIS,
        "mc_Alice bob :End of /WHOIS list.",
        NICK,
    );
    let after = interpreter.interpret(&mut expectations, 312, "mc_Alice bob irc.test :Server", NICK);

    assert_eq!(
        a,
        ReplyOutcome::Display("\u{00A7}4bob ~bob host.example * :Bob".to_string())
    );
    assert_eq!(b, ReplyOutcome::Display("\u{00A7}4bob :#mc #other".to_string()));
    assert_eq!(c, ReplyOutcome::Swallowed);
    assert_eq!(after, ReplyOutcome::PassThrough);
}

#[test]
fn test_replies_outside_whois_pass_through() {
    let interpreter = ResponseInterpreter::new();
    let mut expectations = tracker();

    assert_eq!(
        interpreter.interpret(&mut expectations, 372, "mc_Alice :- motd", NICK),
        ReplyOutcome::PassThrough
    );
    assert_eq!(
        interpreter.interpret(&mut expectations, replies::RPL_ENDOFWHOIS, "mc_Alice x :End", NICK),
        ReplyOutcome::PassThrough
    );
    assert!(!interpreter.receiving_whois(&mut expectations));
}

#[test]
fn test_clearing_expectations_resets_latch() {
    let interpreter = ResponseInterpreter::new();
    let mut expectations = tracker();

    interpreter.interpret(&mut expectations, replies::RPL_WHOISUSER, "mc_Alice bob u h * :B", NICK);
    assert!(interpreter.receiving_whois(&mut expectations));

    // What the worker does on disconnect
    expectations.clear();
    assert_eq!(
        interpreter.interpret(&mut expectations, 319, "mc_Alice bob :#mc", NICK),
        ReplyOutcome::PassThrough
    );
}

#[test]
fn test_latch_expires_without_end_marker() {
    let interpreter = ResponseInterpreter::new();
    let mut expectations = ExpectationTracker::new(Duration::ZERO);

    let first =
        interpreter.interpret(&mut expectations, replies::RPL_WHOISUSER, "mc_Alice bob u h * :B", NICK);
    assert_eq!(first, ReplyOutcome::PassThrough);
    assert!(!interpreter.receiving_whois(&mut expectations));
}
