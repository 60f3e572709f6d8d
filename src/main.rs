//! TwistTacToe - terminal front end
//!
//! Local, computer and online play from one binary.

#![warn(missing_docs)]

use anyhow::{Result, bail};
use chrono::Utc;
use clap::Parser;
use std::path::Path;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;
use twist_tac_toe::cli::{Cli, Command, GameArgs};
use twist_tac_toe::console::{self, Exit, RULES};
use twist_tac_toe::net::{Backoff, LinkSettings, PeerLink, generate_room_code, normalize_room_code};
use twist_tac_toe::store::{LastRoom, PreferenceStore};
use twist_tac_toe::{GameConfig, Session, SessionOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = GameConfig::load_or_default(&cli.config)?;
    initialize_tracing(config.data_dir())?;

    let store = PreferenceStore::new(config.data_dir());
    match store.mark_rules_shown() {
        Ok(true) => println!("{}\n", RULES),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "Could not read preferences"),
    }

    match cli.command {
        Command::Local { game } => {
            let session = Session::local(SessionOptions::from_config(&config, game.arrangement));
            console::run(session, None).await.map(|_| ())
        }
        Command::Computer { game } => {
            let session = Session::computer(SessionOptions::from_config(&config, game.arrangement));
            console::run(session, None).await.map(|_| ())
        }
        Command::Host { game, port, bind } => {
            let address = format!("{}:{}", bind, port.unwrap_or(*config.port()));
            let code = generate_room_code(&mut rand::thread_rng());
            run_host(&config, &store, game, code, address).await
        }
        Command::Join {
            game,
            code,
            address,
        } => run_join(&config, &store, game, code, address).await,
        Command::Rejoin { game } => {
            let Some(room) = store.recent_room(Utc::now(), config.room_cache())? else {
                bail!("No room to rejoin in the last {} minutes", config.room_cache_minutes());
            };
            info!(code = %room.code(), is_host = room.is_host(), "Rejoining room");
            if *room.is_host() {
                run_host(&config, &store, game, room.code().clone(), room.address().clone()).await
            } else {
                run_join(&config, &store, game, room.code().clone(), room.address().clone()).await
            }
        }
    }
}

/// Logs to a file so output does not interleave with the board.
fn initialize_tracing(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let log_file = std::fs::File::create(data_dir.join("twist_tac_toe.log"))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,twist_tac_toe=debug")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

/// Opens a room and plays as host.
#[instrument(skip(config, store, game))]
async fn run_host(
    config: &GameConfig,
    store: &PreferenceStore,
    game: GameArgs,
    code: String,
    address: String,
) -> Result<()> {
    let link = PeerLink::host(address.as_str(), code.clone(), config.connect_timeout()).await?;
    println!(
        "Room {} is open on {}. Share the code and this machine's address.",
        code,
        link.local_addr()
    );
    remember(store, LastRoom::new(code.clone(), true, address, Utc::now()));

    let (transport, events) = link.split();
    let options = SessionOptions::from_config(config, game.arrangement);
    let session = Session::host(options, code, Box::new(transport));
    finish(store, console::run(session, Some(events)).await?);
    Ok(())
}

/// Joins a room and plays as guest.
#[instrument(skip(config, store, game))]
async fn run_join(
    config: &GameConfig,
    store: &PreferenceStore,
    game: GameArgs,
    code: String,
    address: String,
) -> Result<()> {
    let Some(code) = normalize_room_code(&code) else {
        bail!("Invalid room code. Must be 5 letters or digits.");
    };
    let settings = LinkSettings::new(
        config.connect_timeout(),
        Backoff::new(config.reconnect_base(), *config.max_reconnect_attempts()),
    );
    println!("Joining room {} at {}...", code, address);
    let link = PeerLink::join(address.clone(), code.clone(), settings).await?;
    remember(store, LastRoom::new(code.clone(), false, address, Utc::now()));

    let (transport, events) = link.split();
    let options = SessionOptions::from_config(config, game.arrangement);
    let session = Session::guest(options, code, Box::new(transport));
    finish(store, console::run(session, Some(events)).await?);
    Ok(())
}

fn remember(store: &PreferenceStore, room: LastRoom) {
    if let Err(e) = store.remember_room(room) {
        warn!(error = %e, "Could not remember room");
    }
}

/// Quitting forgets the room; a failed link keeps it for `rejoin`.
fn finish(store: &PreferenceStore, exit: Exit) {
    match exit {
        Exit::Quit => {
            if let Err(e) = store.clear_room() {
                warn!(error = %e, "Could not forget room");
            }
        }
        Exit::LinkFailed => println!("Connection lost. Use `rejoin` to try the room again."),
    }
}
