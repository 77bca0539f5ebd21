//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;
use std::path::PathBuf;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_c_uct() -> f32 {
    defaults::c_uct()
}
fn d_c_puct() -> f32 {
    defaults::c_puct()
}
fn d_endgame_cells() -> usize {
    defaults::endgame_cells()
}
fn d_static_weight() -> f32 {
    defaults::static_weight()
}
fn d_hunt_weight() -> f32 {
    defaults::hunt_weight()
}
fn d_reuse_tree() -> bool {
    defaults::reuse_tree()
}
fn d_guided_num_sims() -> u32 {
    defaults::guided_num_simulations()
}
fn d_guided_c_puct() -> f32 {
    defaults::guided_c_puct()
}
fn d_dirichlet_alpha() -> f32 {
    defaults::dirichlet_alpha()
}
fn d_dirichlet_epsilon() -> f32 {
    defaults::dirichlet_epsilon()
}
fn d_guided_reuse_tree() -> bool {
    defaults::guided_reuse_tree()
}
fn d_arena_games() -> u32 {
    defaults::arena_games()
}
fn d_arena_mode() -> String {
    defaults::arena_mode().into()
}
fn d_dump_tree() -> bool {
    defaults::dump_tree()
}
fn d_outcome_db() -> String {
    defaults::outcome_db().into()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub guided: GuidedConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CentralConfig {
    /// Outcome database location, resolved against `common.data_dir` when relative.
    pub fn outcome_db_path(&self) -> PathBuf {
        let db = PathBuf::from(&self.storage.outcome_db);
        if db.is_absolute() {
            db
        } else {
            PathBuf::from(&self.common.data_dir).join(db)
        }
    }
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// Heuristic (rollout-based) MCTS configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_c_uct")]
    pub c_uct: f32,
    #[serde(default = "d_c_puct")]
    pub c_puct: f32,
    /// Remaining ship cells at or below which the simulation budget doubles
    #[serde(default = "d_endgame_cells")]
    pub endgame_cells: usize,
    #[serde(default = "d_static_weight")]
    pub static_weight: f32,
    #[serde(default = "d_hunt_weight")]
    pub hunt_weight: f32,
    #[serde(default = "d_reuse_tree")]
    pub reuse_tree: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            c_uct: defaults::c_uct(),
            c_puct: defaults::c_puct(),
            endgame_cells: defaults::endgame_cells(),
            static_weight: defaults::static_weight(),
            hunt_weight: defaults::hunt_weight(),
            reuse_tree: defaults::reuse_tree(),
        }
    }
}

/// Evaluator-guided MCTS configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GuidedConfig {
    #[serde(default = "d_guided_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_guided_c_puct")]
    pub c_puct: f32,
    #[serde(default = "d_dirichlet_alpha")]
    pub dirichlet_alpha: f32,
    #[serde(default = "d_dirichlet_epsilon")]
    pub dirichlet_epsilon: f32,
    #[serde(default = "d_guided_reuse_tree")]
    pub reuse_tree: bool,
    /// ONNX policy/value model. None = heatmap evaluator.
    #[serde(default)]
    pub model_path: Option<String>,
}

impl Default for GuidedConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::guided_num_simulations(),
            c_puct: defaults::guided_c_puct(),
            dirichlet_alpha: defaults::dirichlet_alpha(),
            dirichlet_epsilon: defaults::dirichlet_epsilon(),
            reuse_tree: defaults::guided_reuse_tree(),
            model_path: None,
        }
    }
}

/// Bot-vs-bot match configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ArenaConfig {
    #[serde(default = "d_arena_games")]
    pub games: u32,
    /// Label stored with every outcome
    #[serde(default = "d_arena_mode")]
    pub mode: String,
    /// Base seed for fleets and engines. None = seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Write the heuristic bot's final tree as JSON after each game
    #[serde(default = "d_dump_tree")]
    pub dump_tree: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            games: defaults::arena_games(),
            mode: defaults::arena_mode().into(),
            seed: None,
            dump_tree: defaults::dump_tree(),
        }
    }
}

/// Outcome storage configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file, relative to `common.data_dir` unless absolute
    #[serde(default = "d_outcome_db")]
    pub outcome_db: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            outcome_db: defaults::outcome_db().into(),
        }
    }
}
