//! Default configuration values loaded from config.defaults.toml.
//!
//! The shared TOML file is embedded at compile time so the binary and the
//! checked-in defaults can never drift apart.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    guided: GuidedDefaults,
    arena: ArenaDefaults,
    storage: StorageDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    c_uct: f32,
    c_puct: f32,
    endgame_cells: usize,
    static_weight: f32,
    hunt_weight: f32,
    reuse_tree: bool,
}

#[derive(Debug, Deserialize)]
struct GuidedDefaults {
    num_simulations: u32,
    c_puct: f32,
    dirichlet_alpha: f32,
    dirichlet_epsilon: f32,
    reuse_tree: bool,
}

#[derive(Debug, Deserialize)]
struct ArenaDefaults {
    games: u32,
    mode: String,
    dump_tree: bool,
}

#[derive(Debug, Deserialize)]
struct StorageDefaults {
    outcome_db: String,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Heuristic MCTS
pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn c_uct() -> f32 {
    DEFAULTS.mcts.c_uct
}
pub fn c_puct() -> f32 {
    DEFAULTS.mcts.c_puct
}
pub fn endgame_cells() -> usize {
    DEFAULTS.mcts.endgame_cells
}
pub fn static_weight() -> f32 {
    DEFAULTS.mcts.static_weight
}
pub fn hunt_weight() -> f32 {
    DEFAULTS.mcts.hunt_weight
}
pub fn reuse_tree() -> bool {
    DEFAULTS.mcts.reuse_tree
}

// Guided MCTS
pub fn guided_num_simulations() -> u32 {
    DEFAULTS.guided.num_simulations
}
pub fn guided_c_puct() -> f32 {
    DEFAULTS.guided.c_puct
}
pub fn dirichlet_alpha() -> f32 {
    DEFAULTS.guided.dirichlet_alpha
}
pub fn dirichlet_epsilon() -> f32 {
    DEFAULTS.guided.dirichlet_epsilon
}
pub fn guided_reuse_tree() -> bool {
    DEFAULTS.guided.reuse_tree
}

// Arena
pub fn arena_games() -> u32 {
    DEFAULTS.arena.games
}
pub fn arena_mode() -> &'static str {
    &DEFAULTS.arena.mode
}
pub fn dump_tree() -> bool {
    DEFAULTS.arena.dump_tree
}

// Storage
pub fn outcome_db() -> &'static str {
    &DEFAULTS.storage.outcome_db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        // Just accessing these will verify the TOML parses correctly
        assert_eq!(data_dir(), "./data");
        assert_eq!(log_level(), "info");
    }

    #[test]
    fn test_mcts_defaults() {
        assert_eq!(num_simulations(), 200);
        assert!((c_uct() - 1.41).abs() < f32::EPSILON);
        assert!((c_puct() - 0.5).abs() < f32::EPSILON);
        assert_eq!(endgame_cells(), 4);
        assert!(reuse_tree());
    }

    #[test]
    fn test_guided_defaults() {
        assert_eq!(guided_num_simulations(), 200);
        assert!((guided_c_puct() - 1.0).abs() < f32::EPSILON);
        assert!((dirichlet_alpha() - 0.3).abs() < f32::EPSILON);
        assert!((dirichlet_epsilon() - 0.25).abs() < f32::EPSILON);
        assert!(!guided_reuse_tree());
    }

    #[test]
    fn test_arena_and_storage_defaults() {
        assert_eq!(arena_games(), 10);
        assert_eq!(arena_mode(), "heuristic-vs-guided");
        assert!(!dump_tree());
        assert_eq!(outcome_db(), "outcomes.db");
    }
}
