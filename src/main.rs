//! Strictly Arena - terminal checkers
//!
//! Stands in for a graphical front end: prints the board after every turn
//! and relays typed `row col` lines as board taps.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, PlayArgs};
use strictly_arena::{GameEvent, TapRelay};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Play(args) => play(args).await,
    }
}

/// Plays one game, rendering to stdout and logging to stderr.
#[instrument(skip_all)]
async fn play(args: PlayArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.resolve().context("Failed to load arena config")?;
    info!(red = ?config.red(), black = ?config.black(), "Starting Strictly Arena");

    let relay = TapRelay::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let runner = config.build_runner(&relay).with_events(event_tx);

    let stop = runner.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping game");
            stop.stop();
        }
    });

    if config.needs_taps() {
        println!("Enter moves one cell per line as `row col`: origin first, then destination.");
        // Plain thread: runtime shutdown must not wait on a pending read.
        let relay = relay.clone();
        let spawned = std::thread::Builder::new()
            .name("stdin-taps".into())
            .spawn(move || cli::relay_taps(std::io::stdin().lock(), &relay));
        if let Err(e) = spawned {
            warn!(error = %e, "Failed to start stdin reader, taps disabled");
        }
    }

    let game = runner.spawn();
    while let Some(event) = event_rx.recv().await {
        render(&event);
    }

    let outcome = game.await.context("Game task panicked")??;
    match outcome.winner {
        Some(winner) => println!("{winner} wins after {} turns", outcome.turns),
        None => println!("Game stopped after {} turns", outcome.turns),
    }
    Ok(())
}

fn render(event: &GameEvent) {
    match event {
        GameEvent::StateChanged(view) => println!("\n{view}"),
        GameEvent::MoveApplied { color, mv, outcome } => match outcome.captured {
            Some(piece) => println!("{color} {mv} captures {}", piece.position()),
            None => println!("{color} {mv}"),
        },
        GameEvent::MoveRejected { color, mv, error } => {
            println!("{color} {mv} rejected: {error}")
        }
        GameEvent::GameOver { .. } => {}
    }
}
