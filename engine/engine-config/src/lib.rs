//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic shared
//! by the Salvo binaries.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`SALVO_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! SALVO_<SECTION>_<KEY>=value
//!
//! Examples:
//!     SALVO_COMMON_DATA_DIR=/data
//!     SALVO_MCTS_NUM_SIMULATIONS=400
//!     SALVO_GUIDED_MODEL_PATH=/models/latest.onnx
//!     SALVO_ARENA_SEED=42
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, parse_config, CONFIG_SEARCH_PATHS,
};
pub use structs::*;

#[cfg(test)]
mod tests;
