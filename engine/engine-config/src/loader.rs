//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from subdirectory)
    "/app/config.toml", // Docker container
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by SALVO_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Docker container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var("SALVO_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from SALVO_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!("SALVO_CONFIG={} not found, searching defaults", path.display());
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// Unreadable or malformed files fall back to the built-in defaults with a warning.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Parse a config.toml document without applying overrides.
pub fn parse_config(content: &str) -> Result<CentralConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, f32, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Optional string field
    ($config:expr, $section:ident . $field:ident, $key:expr, optional) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = Some(v);
        }
    };
    // Optional parseable field (Option<u64>, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = Some(v);
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: SALVO_<SECTION>_<KEY>.
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "SALVO_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "SALVO_COMMON_LOG_LEVEL");

    // Heuristic MCTS
    env_override!(
        config,
        mcts.num_simulations,
        "SALVO_MCTS_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, mcts.c_uct, "SALVO_MCTS_C_UCT", parse);
    env_override!(config, mcts.c_puct, "SALVO_MCTS_C_PUCT", parse);
    env_override!(
        config,
        mcts.endgame_cells,
        "SALVO_MCTS_ENDGAME_CELLS",
        parse
    );
    env_override!(
        config,
        mcts.static_weight,
        "SALVO_MCTS_STATIC_WEIGHT",
        parse
    );
    env_override!(config, mcts.hunt_weight, "SALVO_MCTS_HUNT_WEIGHT", parse);
    env_override!(config, mcts.reuse_tree, "SALVO_MCTS_REUSE_TREE", parse);

    // Guided MCTS
    env_override!(
        config,
        guided.num_simulations,
        "SALVO_GUIDED_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, guided.c_puct, "SALVO_GUIDED_C_PUCT", parse);
    env_override!(
        config,
        guided.dirichlet_alpha,
        "SALVO_GUIDED_DIRICHLET_ALPHA",
        parse
    );
    env_override!(
        config,
        guided.dirichlet_epsilon,
        "SALVO_GUIDED_DIRICHLET_EPSILON",
        parse
    );
    env_override!(
        config,
        guided.reuse_tree,
        "SALVO_GUIDED_REUSE_TREE",
        parse
    );
    env_override!(
        config,
        guided.model_path,
        "SALVO_GUIDED_MODEL_PATH",
        optional
    );

    // Arena
    env_override!(config, arena.games, "SALVO_ARENA_GAMES", parse);
    env_override!(config, arena.mode, "SALVO_ARENA_MODE");
    env_override!(config, arena.seed, "SALVO_ARENA_SEED", optional_parse);
    env_override!(config, arena.dump_tree, "SALVO_ARENA_DUMP_TREE", parse);

    // Storage
    env_override!(config, storage.outcome_db, "SALVO_STORAGE_OUTCOME_DB");

    config
}
