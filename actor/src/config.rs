//! Configuration for the actor binary
//!
//! Defaults come from config.toml (with `SALVO_*` environment overrides applied
//! by `engine-config`). CLI arguments take highest priority.

use anyhow::{anyhow, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use engine_config::{load_config, CentralConfig};
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_outcome_db() -> String {
    CENTRAL_CONFIG.outcome_db_path().display().to_string()
}

fn default_games() -> u32 {
    CENTRAL_CONFIG.arena.games
}

fn default_mode() -> String {
    CENTRAL_CONFIG.arena.mode.clone()
}

fn default_dump_tree() -> bool {
    CENTRAL_CONFIG.arena.dump_tree
}

fn default_heuristic_simulations() -> u32 {
    CENTRAL_CONFIG.mcts.num_simulations
}

fn default_guided_simulations() -> u32 {
    CENTRAL_CONFIG.guided.num_simulations
}

#[derive(Parser, Debug, Clone)]
#[command(name = "actor")]
#[command(about = "Salvo actor - Battleship MCTS match runner")]
#[command(
    long_about = "Plays Battleship games between the rollout-based heuristic MCTS bot and
the evaluator-guided MCTS bot, and records every outcome in a SQLite database.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value_t = default_log_level())]
    pub log_level: String,

    /// Path to the SQLite outcome database
    #[arg(long, global = true, default_value_t = default_outcome_db())]
    pub outcome_db: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Play heuristic-vs-guided games and record the outcomes
    Match(MatchArgs),
    /// Summarize recorded outcomes per winner
    Stats(StatsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MatchArgs {
    /// Number of games to play
    #[arg(long, default_value_t = default_games())]
    pub games: u32,

    /// Mode label stored with each outcome
    #[arg(long, default_value_t = default_mode())]
    pub mode: String,

    /// Base seed for fleets and engines (game i uses seed + i)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulations per shot for the heuristic bot
    #[arg(long, default_value_t = default_heuristic_simulations())]
    pub heuristic_simulations: u32,

    /// Simulations per shot for the guided bot
    #[arg(long, default_value_t = default_guided_simulations())]
    pub guided_simulations: u32,

    /// ONNX policy/value model for the guided bot (requires the `onnx` feature)
    #[arg(long)]
    pub model: Option<String>,

    /// Write the heuristic bot's opening search tree as JSON after each game
    #[arg(long, action = ArgAction::Set, default_value_t = default_dump_tree())]
    pub dump_tree: bool,

    /// Directory for tree dumps and other artifacts
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Only summarize outcomes recorded under this mode label
    #[arg(long)]
    pub mode: Option<String>,

    /// Also list the most recent N outcomes
    #[arg(long, default_value_t = 0)]
    pub recent: usize,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        if self.outcome_db.is_empty() {
            return Err(anyhow!("outcome_db cannot be empty"));
        }

        match &self.command {
            Command::Match(args) => args.validate(),
            Command::Stats(_) => Ok(()),
        }
    }
}

impl MatchArgs {
    pub fn validate(&self) -> Result<()> {
        if self.games == 0 {
            return Err(anyhow!("games must be greater than 0"));
        }

        if self.mode.is_empty() {
            return Err(anyhow!("mode cannot be empty"));
        }

        if self.heuristic_simulations == 0 || self.guided_simulations == 0 {
            return Err(anyhow!("simulation counts must be greater than 0"));
        }

        if self.model.is_some() && !cfg!(feature = "onnx") {
            return Err(anyhow!(
                "--model requires the actor to be built with the `onnx` feature"
            ));
        }

        Ok(())
    }

    /// Model path from the CLI, falling back to `guided.model_path` in config.toml.
    pub fn model_path(&self) -> Option<String> {
        self.model
            .clone()
            .or_else(|| CENTRAL_CONFIG.guided.model_path.clone())
    }

    /// Engine settings for the heuristic bot.
    pub fn heuristic_config(&self) -> MctsConfig {
        let mcts = &CENTRAL_CONFIG.mcts;
        MctsConfig::for_heuristic()
            .with_simulations(self.heuristic_simulations)
            .with_c_uct(mcts.c_uct)
            .with_c_puct(mcts.c_puct)
            .with_heatmap_weights(mcts.static_weight, mcts.hunt_weight)
            .with_endgame_cells(mcts.endgame_cells)
            .with_tree_reuse(mcts.reuse_tree)
    }

    /// Engine settings for the guided bot.
    pub fn guided_config(&self) -> MctsConfig {
        let guided = &CENTRAL_CONFIG.guided;
        MctsConfig::for_guided()
            .with_simulations(self.guided_simulations)
            .with_c_puct(guided.c_puct)
            .with_dirichlet(guided.dirichlet_alpha, guided.dirichlet_epsilon)
            .with_tree_reuse(guided.reuse_tree)
    }

    /// Directory tree dumps are written to
    pub fn tree_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("trees")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_match_args() -> MatchArgs {
        MatchArgs {
            games: 5,
            mode: "heuristic-vs-guided".into(),
            seed: Some(1),
            heuristic_simulations: 50,
            guided_simulations: 60,
            model: None,
            dump_tree: false,
            data_dir: "../data".into(),
        }
    }

    fn base_config() -> Config {
        Config {
            log_level: "info".into(),
            outcome_db: "../data/outcomes.db".into(),
            command: Command::Match(base_match_args()),
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "nope".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn validate_rejects_empty_outcome_db() {
        let mut cfg = base_config();
        cfg.outcome_db.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("outcome_db"));
    }

    #[test]
    fn validate_rejects_zero_games() {
        let mut args = base_match_args();
        args.games = 0;
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("games"));
    }

    #[test]
    fn validate_rejects_empty_mode() {
        let mut args = base_match_args();
        args.mode.clear();
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("mode"));
    }

    #[test]
    fn validate_rejects_zero_simulations() {
        let mut args = base_match_args();
        args.guided_simulations = 0;
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("simulation"));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn validate_rejects_model_without_onnx_feature() {
        let mut args = base_match_args();
        args.model = Some("model.onnx".into());
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("onnx"));
    }

    #[test]
    fn stats_command_needs_no_match_settings() {
        let mut cfg = base_config();
        cfg.command = Command::Stats(StatsArgs {
            mode: None,
            recent: 0,
        });
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn engine_configs_use_cli_simulations() {
        let args = base_match_args();
        let heuristic = args.heuristic_config();
        let guided = args.guided_config();
        assert_eq!(heuristic.num_simulations, 50);
        assert_eq!(guided.num_simulations, 60);
        assert!(heuristic.reuse_tree);
        assert!(guided.dirichlet_alpha > 0.0);
    }

    #[test]
    fn tree_dir_is_under_data_dir() {
        let args = base_match_args();
        assert_eq!(args.tree_dir(), PathBuf::from("../data/trees"));
    }

    #[test]
    fn parses_match_subcommand() {
        let cfg = Config::try_parse_from([
            "actor",
            "match",
            "--games",
            "3",
            "--seed",
            "9",
            "--dump-tree",
            "true",
        ])
        .unwrap();
        match cfg.command {
            Command::Match(args) => {
                assert_eq!(args.games, 3);
                assert_eq!(args.seed, Some(9));
                assert!(args.dump_tree);
            }
            Command::Stats(_) => panic!("expected match command"),
        }
    }
}
