//! Actor - Battleship match runner for Salvo
//!
//! A command-line process that:
//! 1. Plays games between the heuristic MCTS bot and the guided MCTS bot
//! 2. Advances each bot's retained search tree along the shots it fires
//! 3. Saves every outcome to `./data/outcomes.db` (SQLite)
//! 4. Summarizes recorded outcomes (`actor stats`)

use anyhow::Result;
use clap::Parser;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

mod arena;
mod config;
mod evaluator;
mod storage;

use crate::arena::{Arena, Bots};
use crate::config::{Command, Config, MatchArgs, StatsArgs};
use crate::evaluator::ArenaEvaluator;
use crate::storage::{create_outcome_store, OutcomeStore};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

async fn run_match(args: MatchArgs, store: Arc<dyn OutcomeStore>) -> Result<()> {
    let heuristic_config = args.heuristic_config();
    let guided_config = args.guided_config();
    let model_path = args.model_path();
    let evaluator = ArenaEvaluator::load(
        model_path.as_deref(),
        heuristic_config.static_weight,
        heuristic_config.hunt_weight,
    )?;
    let bots = Bots::new(heuristic_config, guided_config, evaluator, args.seed);

    let arena = Arena::new(args, store);

    // Stop between games on Ctrl-C
    let shutdown = arena.shutdown_handle();
    let shutdown_handle = tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, finishing current game...");
                shutdown.store(true, Ordering::Relaxed);
            }
            Err(e) => warn!("Failed to listen for ctrl+c: {}", e),
        }
    });

    let result = arena.run(bots).await;
    shutdown_handle.abort();
    result.map(|_| ())
}

async fn run_stats(args: StatsArgs, store: Arc<dyn OutcomeStore>) -> Result<()> {
    let mode = args.mode.as_deref();
    let total = store.count(mode).await?;
    info!(mode = mode.unwrap_or("all"), games = total, "Recorded outcomes");

    for row in store.summary(mode).await? {
        let share = if total > 0 {
            row.games as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        info!(
            "{:<16} {:>6} wins ({:>5.1}%), avg duration {:.2}s",
            row.winner, row.games, share, row.avg_duration_secs
        );
    }

    if args.recent > 0 {
        for outcome in store.recent(mode, args.recent).await? {
            info!(
                mode = %outcome.mode,
                winner = %outcome.winner,
                duration_secs = outcome.duration_secs,
                "Recent outcome"
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    let store: Arc<dyn OutcomeStore> = Arc::from(create_outcome_store(&config.outcome_db)?);
    info!(path = %config.outcome_db, "Outcome store opened");

    let result = match config.command {
        Command::Match(args) => run_match(args, store).await,
        Command::Stats(args) => run_stats(args, store).await,
    };

    match result {
        Ok(()) => {
            info!("Actor completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Actor failed: {:#}", e);
            Err(e)
        }
    }
}
