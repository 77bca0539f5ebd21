//! Bot-vs-bot matches between the heuristic and guided engines.
//!
//! Each bot owns a fleet and fires at the other's board. Shots alternate,
//! heuristic first, until one fleet is sunk. Games run on the blocking pool
//! one at a time; the engines are moved into each task and handed back.

use anyhow::{anyhow, Context, Result};
use games_battleship::{BoardState, Coord};
use indicatif::{ProgressBar, ProgressStyle};
use mcts::{GuidedMcts, HeuristicMcts, MctsConfig, NodeSnapshot, SearchResult, SearchStats};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::config::MatchArgs;
use crate::evaluator::ArenaEvaluator;
use crate::storage::{GameOutcome, OutcomeStore};

/// Which bot sank the other fleet first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Heuristic,
    Guided,
}

impl Winner {
    /// Label stored in the outcome database
    pub fn label(self) -> &'static str {
        match self {
            Winner::Heuristic => "HeuristicMcts",
            Winner::Guided => "GuidedMcts",
        }
    }
}

/// Search totals for one bot over a game.
#[derive(Debug, Default, Clone)]
pub struct BotStats {
    pub shots: u32,
    pub search_time: Duration,
    pub expansions: u32,
    pub rollouts: u32,
    pub evaluations: u32,
    pub terminal_hits: u32,
    /// Searches that started from a retained tree
    pub reused_trees: u32,
}

impl BotStats {
    fn add(&mut self, stats: &SearchStats) {
        self.shots += 1;
        self.search_time += stats.elapsed;
        self.expansions += stats.expansions;
        self.rollouts += stats.rollouts;
        self.evaluations += stats.evaluations;
        self.terminal_hits += stats.terminal_hits;
        self.reused_trees += stats.reused_tree as u32;
    }
}

/// Everything recorded about one finished game.
#[derive(Debug)]
pub struct GameRecord {
    pub winner: Winner,
    pub duration: Duration,
    pub heuristic: BotStats,
    pub guided: BotStats,
    /// The heuristic bot's tree after its first search, when requested
    pub opening_tree: Option<NodeSnapshot>,
}

/// The two engines playing each other.
pub struct Bots {
    pub heuristic: HeuristicMcts,
    pub guided: GuidedMcts<ArenaEvaluator>,
}

impl Bots {
    pub fn new(
        heuristic_config: MctsConfig,
        guided_config: MctsConfig,
        evaluator: ArenaEvaluator,
        seed: Option<u64>,
    ) -> Self {
        match seed {
            Some(seed) => Self {
                heuristic: HeuristicMcts::with_seed(heuristic_config, seed),
                guided: GuidedMcts::with_seed(evaluator, guided_config, seed.wrapping_add(1)),
            },
            None => Self {
                heuristic: HeuristicMcts::new(heuristic_config),
                guided: GuidedMcts::new(evaluator, guided_config),
            },
        }
    }

    fn reset(&mut self) {
        self.heuristic.reset();
        self.guided.reset();
    }
}

fn expect_shot(result: Option<SearchResult>, bot: Winner) -> Result<Coord> {
    result
        .map(|r| r.action)
        .ok_or_else(|| anyhow!("{} found no legal shot on an unfinished board", bot.label()))
}

/// Play one game to completion.
///
/// `heuristic_target` carries the guided bot's fleet and is shot at by the
/// heuristic bot; `guided_target` the other way round. Both engines advance
/// their retained trees along their own shots.
pub fn play_game(
    bots: &mut Bots,
    mut heuristic_target: BoardState,
    mut guided_target: BoardState,
    capture_tree: bool,
) -> Result<GameRecord> {
    bots.reset();
    let start = Instant::now();
    let mut heuristic_stats = BotStats::default();
    let mut guided_stats = BotStats::default();
    let mut opening_tree = None;

    let winner = loop {
        let result = bots.heuristic.search(&heuristic_target)?;
        if let Some(r) = &result {
            heuristic_stats.add(&r.stats);
        }
        if capture_tree && opening_tree.is_none() {
            opening_tree = bots.heuristic.snapshot();
        }
        let shot = expect_shot(result, Winner::Heuristic)?;
        let hit = heuristic_target.shoot_at(shot);
        bots.heuristic.advance(shot);
        debug!(bot = "heuristic", %shot, hit, "Shot fired");
        if heuristic_target.has_won() {
            break Winner::Heuristic;
        }

        let result = bots.guided.search(&guided_target)?;
        if let Some(r) = &result {
            guided_stats.add(&r.stats);
        }
        let shot = expect_shot(result, Winner::Guided)?;
        let hit = guided_target.shoot_at(shot);
        bots.guided.advance(shot);
        debug!(bot = "guided", %shot, hit, "Shot fired");
        if guided_target.has_won() {
            break Winner::Guided;
        }
    };

    Ok(GameRecord {
        winner,
        duration: start.elapsed(),
        heuristic: heuristic_stats,
        guided: guided_stats,
        opening_tree,
    })
}

/// Two freshly placed fleets for one game.
pub fn new_boards(rng: &mut ChaCha20Rng) -> Result<(BoardState, BoardState)> {
    let mut heuristic_target = BoardState::new();
    heuristic_target.place_fleet(rng)?;
    let mut guided_target = BoardState::new();
    guided_target.place_fleet(rng)?;
    Ok((heuristic_target, guided_target))
}

/// Write a tree snapshot as pretty JSON.
pub fn dump_tree(snapshot: &NodeSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), snapshot)?;
    Ok(())
}

/// Win counts for a finished (or interrupted) match.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MatchSummary {
    pub games_played: u32,
    pub heuristic_wins: u32,
    pub guided_wins: u32,
    pub failed_games: u32,
}

impl MatchSummary {
    fn record(&mut self, winner: Winner) {
        self.games_played += 1;
        match winner {
            Winner::Heuristic => self.heuristic_wins += 1,
            Winner::Guided => self.guided_wins += 1,
        }
    }
}

pub struct Arena {
    args: MatchArgs,
    store: Arc<dyn OutcomeStore>,
    shutdown_signal: Arc<AtomicBool>,
}

impl Arena {
    pub fn new(args: MatchArgs, store: Arc<dyn OutcomeStore>) -> Self {
        Self {
            args,
            store,
            shutdown_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked between games; set it to stop after the current game.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_signal)
    }

    pub async fn run(&self, mut bots: Bots) -> Result<MatchSummary> {
        let games = self.args.games;
        info!(
            games,
            mode = %self.args.mode,
            seed = ?self.args.seed,
            evaluator = bots.guided.evaluator().name(),
            heuristic_simulations = self.args.heuristic_simulations,
            guided_simulations = self.args.guided_simulations,
            "Starting match"
        );

        // Progress bar only when stderr is a TTY
        let progress = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
            let pb = ProgressBar::new(games as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut summary = MatchSummary::default();
        for game in 1..=games {
            if self.shutdown_signal.load(Ordering::Relaxed) {
                info!("Shutdown signal received, stopping match");
                break;
            }

            let mut rng = match self.args.seed {
                Some(seed) => ChaCha20Rng::seed_from_u64(seed.wrapping_add(game as u64)),
                None => ChaCha20Rng::from_entropy(),
            };
            let (heuristic_target, guided_target) = new_boards(&mut rng)?;
            let capture_tree = self.args.dump_tree;

            let (returned, result) = tokio::task::spawn_blocking(move || {
                let result = play_game(&mut bots, heuristic_target, guided_target, capture_tree);
                (bots, result)
            })
            .await?;
            bots = returned;

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    error!("Game {} failed: {:#}", game, e);
                    summary.failed_games += 1;
                    continue;
                }
            };

            summary.record(record.winner);
            self.store
                .record(&GameOutcome {
                    mode: self.args.mode.clone(),
                    winner: record.winner.label().to_string(),
                    duration_secs: record.duration.as_secs_f64(),
                })
                .await?;

            if let Some(tree) = &record.opening_tree {
                let path = self.args.tree_dir().join(format!("game-{game}.json"));
                dump_tree(tree, &path)?;
                debug!(path = %path.display(), nodes = tree.node_count(), "Tree dumped");
            }

            let log = || {
                info!(
                    "[{}/{}] Winner: {}, duration {:.2}s",
                    game,
                    games,
                    record.winner.label(),
                    record.duration.as_secs_f64()
                );
                debug!(
                    game,
                    heuristic_shots = record.heuristic.shots,
                    heuristic_expansions = record.heuristic.expansions,
                    heuristic_rollouts = record.heuristic.rollouts,
                    heuristic_reused = record.heuristic.reused_trees,
                    heuristic_search_ms = record.heuristic.search_time.as_millis() as u64,
                    guided_shots = record.guided.shots,
                    guided_evaluations = record.guided.evaluations,
                    guided_terminal_hits = record.guided.terminal_hits,
                    guided_search_ms = record.guided.search_time.as_millis() as u64,
                    "Game search stats"
                );
            };
            match &progress {
                Some(pb) => {
                    pb.suspend(log);
                    pb.inc(1);
                }
                None => log(),
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        info!(
            games_played = summary.games_played,
            heuristic_wins = summary.heuristic_wins,
            guided_wins = summary.guided_wins,
            failed_games = summary.failed_games,
            "Match finished"
        );
        Ok(summary)
    }
}
