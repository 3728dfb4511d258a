//! Unit tests for configuration loading and validation

use irc_transport::{BridgeConfig, BridgeError, NickCollisionPolicy, TlsMode};

#[test]
fn test_minimal_document_uses_defaults() {
    let config = BridgeConfig::from_json_str(r#"{ "server": { "address": "irc.test" } }"#).unwrap();

    assert_eq!(config.server.port, 6667);
    assert_eq!(config.server.nicksize, 15);
    assert_eq!(config.tls_mode(), TlsMode::None);
    assert_eq!(config.nick_collision, NickCollisionPolicy::AppendNumber);
    assert_eq!(config.max_concurrent_connects, 8);
    assert_eq!(config.timeouts.connect().as_secs(), 30);
    assert_eq!(config.messages.list, "&e[${CHANNEL}] &fUsers: ${LIST}");
    assert!(!config.verbose);
}

#[test]
fn test_full_document() {
    let raw = r##"{
        "server": {
            "address": "irc.example.net",
            "port": 6697,
            "password": "pw",
            "webirc_password": "gw",
            "nicksize": 12,
            "ssl": { "enabled": true, "trust": true }
        },
        "default": { "prefix": "mc_", "suffix": "|g" },
        "channels": ["#mc"],
        "messages": { "action": "* ${NICK} ${ACTION}" },
        "translations": { "dance": "dances wildly", "noop": "" },
        "verbose": true,
        "timeouts": { "connect_secs": 5, "reply_secs": 10 },
        "nick_collision": "reject",
        "max_concurrent_connects": 2
    }"##;
    let config = BridgeConfig::from_json_str(raw).unwrap();

    assert_eq!(config.tls_mode(), TlsMode::TrustAll);
    assert_eq!(config.defaults.prefix, "mc_");
    assert_eq!(config.defaults.suffix, "|g");
    assert_eq!(config.channels, vec!["#mc"]);
    assert_eq!(config.messages.action, "* ${NICK} ${ACTION}");
    // Unset templates keep their defaults
    assert_eq!(config.messages.topic, "&e[${CHANNEL}] &fTopic: ${TOPIC}");
    assert_eq!(config.translation("dance"), Some("dances wildly"));
    assert_eq!(config.translation("noop"), None);
    assert_eq!(config.translation("jump"), None);
    assert_eq!(config.nick_collision, NickCollisionPolicy::Reject);
    assert_eq!(config.timeouts.reply().as_secs(), 10);
}

#[test]
fn test_missing_address_is_invalid() {
    let err = BridgeConfig::from_json_str("{}").unwrap_err();
    assert!(matches!(err, BridgeError::InvalidConfig(_)));
}

#[test]
fn test_bad_channel_name_is_invalid() {
    let err = BridgeConfig::builder()
        .server("irc.test", 6667)
        .add_channel("lobby")
        .try_build()
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidConfig(_)));
}

#[test]
fn test_malformed_json() {
    let err = BridgeConfig::from_json_str("{ server: ").unwrap_err();
    assert!(matches!(err, BridgeError::Json(_)));
}

#[test]
fn test_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "server": { "address": "irc.test", "port": 7000 } }"#).unwrap();

    let config = BridgeConfig::from_file(&path).unwrap();
    assert_eq!(config.server.port, 7000);

    let missing = BridgeConfig::from_file(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, BridgeError::InvalidConfig(_)));
}

#[test]
fn test_append_number_policy_respects_length() {
    let policy = NickCollisionPolicy::AppendNumber;
    assert_eq!(policy.next_nick("mc_Alice", 1, 15).as_deref(), Some("mc_Alice1"));
    assert_eq!(policy.next_nick("mc_Alice", 3, 8).as_deref(), Some("mc_Alic3"));
    assert_eq!(policy.next_nick("mc_Alice", NickCollisionPolicy::MAX_ATTEMPTS + 1, 15), None);
    assert_eq!(NickCollisionPolicy::Reject.next_nick("mc_Alice", 1, 15), None);
}
