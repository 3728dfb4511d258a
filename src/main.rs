// Console host for the IRC transport bridge
//
// Reads player events from stdin, one per line, and prints what each player
// would see. Useful for exercising a server configuration without a game.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use dashmap::DashMap;
use irc_transport::{
    Bridge, BridgeConfig, ChatSubmitted, IrcConnector, JsonFileSettingsStore,
    MemorySettingsStore, PlayerIdentity, SettingsStore, UserDied, UserDisplay, UserJoined,
    UserQuit,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// How long to wait for agents to disconnect on exit
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const USAGE: &str = "usage: irc-transport <config.json> [settings.json]";

const HELP: &str = "commands: join <name> [address] | quit <name> | chat <name> <text> | \
me <name> <text> | die <name> [message] | topic <name> | names <name> | \
whois <name> <nicks> | join-channel <name> <channel> | reconnect <name>";

/// Prints display lines prefixed with the player's name
#[derive(Default)]
struct ConsoleDisplay {
    names: DashMap<PlayerIdentity, String>,
}

impl UserDisplay for ConsoleDisplay {
    fn show(&self, identity: &PlayerIdentity, line: &str) {
        let name = self
            .names
            .get(identity)
            .map_or_else(|| identity.to_string(), |n| n.value().clone());
        println!("[{name}] {line}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(config_path) = args.next() else {
        bail!(USAGE);
    };
    let config = BridgeConfig::from_file(&config_path)
        .with_context(|| format!("loading {config_path}"))?;

    match args.next() {
        Some(settings_path) => {
            let store = JsonFileSettingsStore::open(&settings_path)
                .await
                .with_context(|| format!("opening {settings_path}"))?;
            run(config, store).await
        }
        None => run(config, MemorySettingsStore::new()).await,
    }
}

async fn run<S: SettingsStore>(config: BridgeConfig, store: S) -> Result<()> {
    let display = Arc::new(ConsoleDisplay::default());
    let bridge = Bridge::new(config, IrcConnector, Arc::new(store), display.clone());
    let players: DashMap<String, PlayerIdentity> = DashMap::new();

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(e) = handle(&bridge, &display, &players, line).await {
            eprintln!("error: {e:#}");
        }
    }

    // Give every agent a chance to send QUIT before the runtime goes away
    bridge.shutdown_and_wait(SHUTDOWN_GRACE).await;
    Ok(())
}

async fn handle<S: SettingsStore>(
    bridge: &Bridge<IrcConnector, S>,
    display: &ConsoleDisplay,
    players: &DashMap<String, PlayerIdentity>,
    line: &str,
) -> Result<()> {
    let mut parts = line.splitn(3, ' ');
    let command = parts.next().unwrap_or_default();
    let name = parts.next().context(HELP)?.to_string();
    let rest = parts.next().map(str::trim).filter(|r| !r.is_empty());

    if command == "join" {
        let network_address = rest
            .map(str::parse::<IpAddr>)
            .transpose()
            .context("invalid address")?;
        let identity = PlayerIdentity::random();
        display.names.insert(identity, name.clone());
        players.insert(name.clone(), identity);
        bridge
            .on_user_joined(UserJoined {
                identity,
                display_name: name,
                network_address,
            })
            .await?;
        return Ok(());
    }

    let identity = *players
        .get(&name)
        .with_context(|| format!("'{name}' has not joined"))?;

    match command {
        "quit" => {
            players.remove(&name);
            bridge.on_user_quit(UserQuit { identity });
            display.names.remove(&identity);
        }
        "chat" => {
            let text = rest.context("chat needs text")?.to_string();
            let disposition = bridge.on_chat(&ChatSubmitted { identity, text });
            log::debug!("chat from '{name}': {disposition:?}");
        }
        "die" => {
            let death_message = rest.map(str::to_string);
            let disposition = bridge.on_user_died(&UserDied {
                identity,
                death_message,
            });
            log::debug!("death of '{name}': {disposition:?}");
        }
        "reconnect" => bridge.reconnect(&identity)?,
        _ => {
            let agent = bridge
                .agent(&identity)
                .with_context(|| format!("no agent for '{name}'"))?;
            match command {
                "me" => agent.send_action(rest.context("me needs text")?)?,
                "topic" => agent.topic()?,
                "names" => agent.names(rest.map(str::to_string))?,
                "whois" => agent.whois(rest.context("whois needs nicks")?)?,
                "join-channel" => agent.join(rest.context("join-channel needs a channel")?)?,
                _ => bail!(HELP),
            }
        }
    }
    Ok(())
}
