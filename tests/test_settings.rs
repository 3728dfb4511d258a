//! Unit tests for nick derivation and the settings stores

use irc_transport::settings::{derive_nick, resolve_settings};
use irc_transport::{
    AgentSettings, BridgeConfig, JsonFileSettingsStore, MemorySettingsStore, SettingsStore,
};

fn config(prefix: &str, suffix: &str, nicksize: usize) -> BridgeConfig {
    BridgeConfig::builder()
        .server("irc.test", 6667)
        .nick_decoration(prefix, suffix)
        .nick_size(nicksize)
        .build()
}

#[test]
fn test_derive_nick_truncates() {
    assert_eq!(derive_nick("mc_", "Alice", "", 15), "mc_Alice");
    assert_eq!(derive_nick("mc_", "Alexandria", "_x", 9), "mc_Alexan");
    assert_eq!(derive_nick("", "Jürgen", "", 3), "Jür");
}

#[tokio::test]
async fn test_first_join_creates_record() {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = MemorySettingsStore::new();
    let settings = resolve_settings(&store, &config("[", "]", 8), "Alexander")
        .await
        .unwrap();

    assert_eq!(settings, AgentSettings::new("Alexander", "[Alexand"));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_returning_name_keeps_nick() {
    let store = MemorySettingsStore::new();
    let first = resolve_settings(&store, &config("a_", "", 15), "Bob")
        .await
        .unwrap();

    // Decoration changed since the first join
    let again = resolve_settings(&store, &config("zz", "_q", 15), "Bob")
        .await
        .unwrap();

    assert_eq!(first.irc_nick, "a_Bob");
    assert_eq!(again.irc_nick, "a_Bob");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_create_is_insert_if_absent() {
    let store = MemorySettingsStore::new();
    let winner = store.create(AgentSettings::new("Carol", "first")).await.unwrap();
    let loser = store.create(AgentSettings::new("Carol", "second")).await.unwrap();

    assert_eq!(winner.irc_nick, "first");
    assert_eq!(loser.irc_nick, "first");
}

#[tokio::test]
async fn test_json_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let store = JsonFileSettingsStore::open(&path).await.unwrap();
    assert!(store.load("Dave").await.unwrap().is_none());
    store.create(AgentSettings::new("Dave", "mc_Dave")).await.unwrap();
    drop(store);

    let reopened = JsonFileSettingsStore::open(&path).await.unwrap();
    let record = reopened.load("Dave").await.unwrap().unwrap();
    assert_eq!(record.irc_nick, "mc_Dave");
}

#[tokio::test]
async fn test_json_store_save_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let store = JsonFileSettingsStore::open(&path).await.unwrap();
    store.create(AgentSettings::new("Eve", "old")).await.unwrap();
    store.save(AgentSettings::new("Eve", "new")).await.unwrap();

    let reopened = JsonFileSettingsStore::open(&path).await.unwrap();
    assert_eq!(reopened.load("Eve").await.unwrap().unwrap().irc_nick, "new");
}

#[tokio::test]
async fn test_json_store_empty_file_is_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "  \n").unwrap();

    let store = JsonFileSettingsStore::open(&path).await.unwrap();
    assert!(store.load("anyone").await.unwrap().is_none());
}

#[tokio::test]
async fn test_json_store_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonFileSettingsStore::open(&path).await.unwrap_err();
    assert!(matches!(err, irc_transport::BridgeError::Settings(_)));
}

#[tokio::test]
async fn test_json_store_write_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("settings.json");

    let store = JsonFileSettingsStore::open(&path).await.unwrap();
    let err = resolve_settings(&store, &config("", "", 15), "Frank")
        .await
        .unwrap_err();

    assert!(matches!(err, irc_transport::BridgeError::Settings(_)));
    // The failed record was rolled back
    assert!(store.load("Frank").await.unwrap().is_none());
}
