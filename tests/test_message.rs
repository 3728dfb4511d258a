//! Unit tests for IRC line parsing, command encoding and the line codec

use irc_transport::transport::irc::message::{self, IrcLine, ctcp_action, same_name};
use irc_transport::transport::irc::{IrcCodec, replies};
use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

#[test]
fn test_parse_prefixed_privmsg() {
    let line = IrcLine::parse(":bob!~bob@host PRIVMSG #mc :hello there\r\n").unwrap();
    assert_eq!(line.prefix.as_deref(), Some("bob!~bob@host"));
    assert_eq!(line.nick(), Some("bob"));
    assert_eq!(line.command, "PRIVMSG");
    assert_eq!(line.params, vec!["#mc", "hello there"]);
    assert_eq!(line.trailing(), Some("hello there"));
    assert_eq!(line.numeric(), None);
}

#[test]
fn test_parse_numeric_keeps_raw_params() {
    let line = IrcLine::parse(":irc.test 311 Alice Bob ~bob host * :Bob Smith").unwrap();
    assert_eq!(line.numeric(), Some(replies::RPL_WHOISUSER));
    assert_eq!(line.raw_params(), "Alice Bob ~bob host * :Bob Smith");
    assert_eq!(line.param(1), Some("Bob"));
}

#[test]
fn test_parse_skips_tags_and_uppercases() {
    let line = IrcLine::parse("@time=2024-01-01T00:00:00Z :srv ping :token").unwrap();
    assert_eq!(line.command, "PING");
    assert_eq!(line.trailing(), Some("token"));
}

#[test]
fn test_parse_rejects_blank() {
    assert!(IrcLine::parse("").is_none());
    assert!(IrcLine::parse(":prefix-only").is_none());
}

#[test]
fn test_parse_without_prefix() {
    let line = IrcLine::parse("PING :abc").unwrap();
    assert!(line.prefix.is_none());
    assert!(line.nick().is_none());
    assert_eq!(line.params, vec!["abc"]);
}

#[test]
fn test_ctcp_action() {
    assert_eq!(ctcp_action("\u{1}ACTION waves\u{1}"), Some("waves"));
    assert_eq!(ctcp_action("\u{1}ACTION waves"), Some("waves"));
    assert_eq!(ctcp_action("waves"), None);
}

#[test]
fn test_same_name() {
    assert!(same_name("#MC", "#mc"));
    assert!(!same_name("#mc", "#mc2"));
}

#[test]
fn test_command_encoding() {
    assert_eq!(message::privmsg("#mc", "hi\nthere"), "PRIVMSG #mc :hi there");
    assert_eq!(message::action("#mc", "waves"), "PRIVMSG #mc :\u{1}ACTION waves\u{1}");
    assert_eq!(message::topic_request("#mc"), "TOPIC #mc");
    assert_eq!(message::whois("bob carol"), "WHOIS bob carol");
    assert_eq!(message::user("abcd1234", "Alice"), "USER abcd1234 8 * :Alice");
    assert_eq!(
        message::webirc("secret", "cgiirc", "10.0.0.5", "10.0.0.5"),
        "WEBIRC secret cgiirc 10.0.0.5 10.0.0.5"
    );
    assert_eq!(message::quit("bye"), "QUIT :bye");
}

#[test]
fn test_builders_cannot_smuggle_commands() {
    assert!(!message::join("#mc\r\nQUIT :bye").contains(['\r', '\n']));
    assert!(!message::topic_request("#mc\nPART #mc").contains(['\r', '\n']));
    assert_eq!(message::whois("bob\r\nQUIT"), "WHOIS bob  QUIT");
    assert!(!message::privmsg("#mc\nQUIT", "hi").contains('\n'));
    assert!(!message::action("#mc\rQUIT", "waves").contains('\r'));
}

#[test]
fn test_codec_encodes_crlf() {
    let mut codec = IrcCodec::new();
    let mut buf = BytesMut::new();
    codec.encode("NICK Alice\n".to_string(), &mut buf).unwrap();
    assert_eq!(&buf[..], b"NICK Alice\r\n");
}

#[test]
fn test_codec_decodes_crlf_and_lf() {
    let mut codec = IrcCodec::new();
    let mut buf = BytesMut::from(&b"PING :a\r\nPING :b\nPART"[..]);
    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PING :a"));
    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PING :b"));
    assert_eq!(codec.decode(&mut buf).unwrap(), None);
    assert_eq!(codec.decode_eof(&mut buf).unwrap().as_deref(), Some("PART"));
}
