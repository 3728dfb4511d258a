//! Unit tests for channel session state and reply expectations

use std::time::Duration;

use irc_transport::BridgeError;
use irc_transport::agent::{ChannelSession, ExpectationKind, ExpectationTracker};

const LIST: &str = "&e[${CHANNEL}] &fUsers: ${LIST}";
const TOPIC: &str = "&e[${CHANNEL}] &fTopic: ${TOPIC}";

fn users(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

#[test]
fn test_active_channel_unset_until_join() {
    let mut session = ChannelSession::new(Duration::from_secs(60));
    assert_eq!(session.active_channel(), None);
    assert!(matches!(
        session.request_topic(),
        Err(BridgeError::NoActiveChannel)
    ));

    session.joined("#mc");
    assert_eq!(session.active_channel(), Some("#mc"));
}

#[test]
fn test_names_suppressed_once_after_join() {
    let mut session = ChannelSession::new(Duration::from_secs(60));
    session.joined("#mc");
    let present = users(&["alice", "bob"]);

    assert_eq!(session.names("#mc", &present, LIST), None);
    assert_eq!(
        session.names("#mc", &present, LIST).as_deref(),
        Some("\u{00A7}e[#mc] \u{00A7}fUsers: alice bob")
    );
    // Later requests keep displaying
    assert!(session.names("#mc", &present, LIST).is_some());
}

#[test]
fn test_suppression_is_per_channel() {
    let mut session = ChannelSession::new(Duration::from_secs(60));
    session.joined("#a");

    assert!(session.names("#b", &users(&["x"]), LIST).is_some());
    assert!(session.names("#a", &users(&["x"]), LIST).is_none());
}

#[test]
fn test_topic_reply_suppressed_once() {
    let mut session = ChannelSession::new(Duration::from_secs(60));
    session.joined("#mc");

    assert_eq!(session.topic_reply("#mc", "welcome", TOPIC), None);
    assert_eq!(
        session.topic_reply("#mc", "welcome", TOPIC).as_deref(),
        Some("\u{00A7}e[#mc] \u{00A7}fTopic: welcome")
    );
}

#[test]
fn test_manual_topic_request_withdraws_suppression() {
    let mut session = ChannelSession::new(Duration::from_secs(60));
    session.joined("#mc");

    assert_eq!(session.request_topic().unwrap(), "TOPIC #mc");
    assert!(session.topic_reply("#mc", "hello", TOPIC).is_some());
}

#[test]
fn test_set_active_channel_is_idempotent() {
    let mut session = ChannelSession::new(Duration::from_secs(60));
    session.set_active_channel("#x");
    session.set_active_channel("#x");
    assert_eq!(session.active_channel(), Some("#x"));
}

#[test]
fn test_parting_active_channel_clears_it() {
    let mut session = ChannelSession::new(Duration::from_secs(60));
    session.joined("#mc");
    session.parted("#MC");

    assert_eq!(session.active_channel(), None);
    assert!(session.names("#mc", &users(&["a"]), LIST).is_some());
}

#[test]
fn test_reset_drops_suppression_but_keeps_channel() {
    let mut session = ChannelSession::new(Duration::from_secs(60));
    session.joined("#mc");
    session.reset();

    assert_eq!(session.active_channel(), Some("#mc"));
    assert!(session.names("#mc", &users(&["a"]), LIST).is_some());
}

#[test]
fn test_expectations_are_case_insensitive() {
    let mut tracker = ExpectationTracker::new(Duration::from_secs(60));
    tracker.expect(ExpectationKind::Names, "#MC");

    assert!(tracker.is_pending(ExpectationKind::Names, "#mc"));
    assert!(!tracker.is_pending(ExpectationKind::Topic, "#mc"));
    assert!(tracker.consume(ExpectationKind::Names, "#mc"));
    assert!(!tracker.consume(ExpectationKind::Names, "#mc"));
}

#[test]
fn test_expectations_expire() {
    let mut tracker = ExpectationTracker::new(Duration::ZERO);
    tracker.expect(ExpectationKind::Topic, "#mc");

    assert!(!tracker.consume(ExpectationKind::Topic, "#mc"));
    tracker.expect(ExpectationKind::Whois, "bob");
    assert!(!tracker.any_pending(ExpectationKind::Whois));
    assert!(tracker.is_empty());
}

#[test]
fn test_clear_kind_counts_entries() {
    let mut tracker = ExpectationTracker::new(Duration::from_secs(60));
    tracker.expect(ExpectationKind::Whois, "bob");
    tracker.expect(ExpectationKind::Whois, "carol");
    tracker.expect(ExpectationKind::Names, "#mc");

    assert_eq!(tracker.clear_kind(ExpectationKind::Whois), 2);
    assert_eq!(tracker.len(), 1);
    tracker.clear();
    assert!(tracker.is_empty());
}
