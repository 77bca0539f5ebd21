//! Tests for the configuration module.

use super::*;
use std::path::{Path, PathBuf};

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.data_dir, "./data");
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.mcts.num_simulations, 200);
    assert_eq!(config.guided.num_simulations, 200);
    assert_eq!(config.arena.games, 10);
    assert_eq!(config.storage.outcome_db, "outcomes.db");
}

#[test]
fn test_mcts_defaults() {
    let config = CentralConfig::default();
    assert!((config.mcts.c_uct - 1.41).abs() < f32::EPSILON);
    assert!((config.mcts.c_puct - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.mcts.endgame_cells, 4);
    assert!((config.mcts.static_weight - 0.3).abs() < f32::EPSILON);
    assert!((config.mcts.hunt_weight - 0.7).abs() < f32::EPSILON);
    assert!(config.mcts.reuse_tree);
}

#[test]
fn test_guided_defaults() {
    let config = CentralConfig::default();
    assert!((config.guided.c_puct - 1.0).abs() < f32::EPSILON);
    assert!((config.guided.dirichlet_alpha - 0.3).abs() < f32::EPSILON);
    assert!((config.guided.dirichlet_epsilon - 0.25).abs() < f32::EPSILON);
    assert!(!config.guided.reuse_tree);
    assert!(config.guided.model_path.is_none());
}

#[test]
fn test_arena_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.arena.mode, "heuristic-vs-guided");
    assert!(config.arena.seed.is_none());
    assert!(!config.arena.dump_tree);
}

#[test]
fn test_salvo_env_overrides() {
    std::env::set_var("SALVO_COMMON_LOG_LEVEL", "debug");
    std::env::set_var("SALVO_MCTS_NUM_SIMULATIONS", "64");
    std::env::set_var("SALVO_GUIDED_DIRICHLET_EPSILON", "0.5");
    std::env::set_var("SALVO_ARENA_SEED", "1234");

    let config = load_config();
    assert_eq!(config.common.log_level, "debug");
    assert_eq!(config.mcts.num_simulations, 64);
    assert!((config.guided.dirichlet_epsilon - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.arena.seed, Some(1234));

    std::env::remove_var("SALVO_COMMON_LOG_LEVEL");
    std::env::remove_var("SALVO_MCTS_NUM_SIMULATIONS");
    std::env::remove_var("SALVO_GUIDED_DIRICHLET_EPSILON");
    std::env::remove_var("SALVO_ARENA_SEED");
}

#[test]
fn test_unparseable_env_override_is_ignored() {
    std::env::set_var("SALVO_ARENA_GAMES", "lots");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.arena.games, 10);

    std::env::remove_var("SALVO_ARENA_GAMES");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
data_dir = "/custom/data"

[mcts]
num_simulations = 400
c_uct = 2.0
reuse_tree = false

[guided]
model_path = "/models/latest.onnx"
dirichlet_alpha = 0.15

[arena]
games = 3
seed = 7
dump_tree = true
"#;
    let config = parse_config(toml_content).unwrap();
    assert_eq!(config.common.data_dir, "/custom/data");
    assert_eq!(config.mcts.num_simulations, 400);
    assert!((config.mcts.c_uct - 2.0).abs() < f32::EPSILON);
    assert!(!config.mcts.reuse_tree);
    assert_eq!(
        config.guided.model_path.as_deref(),
        Some("/models/latest.onnx")
    );
    assert!((config.guided.dirichlet_alpha - 0.15).abs() < f32::EPSILON);
    assert_eq!(config.arena.games, 3);
    assert_eq!(config.arena.seed, Some(7));
    assert!(config.arena.dump_tree);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[mcts]
c_puct = 0.8
"#;
    let config = parse_config(toml_content).unwrap();
    assert!((config.mcts.c_puct - 0.8).abs() < f32::EPSILON);
    assert_eq!(config.mcts.num_simulations, 200); // Default
    assert_eq!(config.common.data_dir, "./data"); // Default
    assert_eq!(config.arena.mode, "heuristic-vs-guided"); // Default
}

#[test]
fn test_load_from_missing_path_uses_defaults() {
    let config = load_from_path(Path::new("/definitely/not/here/config.toml"));
    assert_eq!(config.storage.outcome_db, "outcomes.db");
}

#[test]
fn test_outcome_db_path_resolution() {
    let mut config = CentralConfig::default();
    config.common.data_dir = "/var/salvo".into();
    assert_eq!(
        config.outcome_db_path(),
        PathBuf::from("/var/salvo/outcomes.db")
    );

    config.storage.outcome_db = "/tmp/other.db".into();
    assert_eq!(config.outcome_db_path(), PathBuf::from("/tmp/other.db"));
}

#[test]
fn test_config_clone() {
    let config = CentralConfig::default();
    let cloned = config.clone();
    assert_eq!(config.common.data_dir, cloned.common.data_dir);
    assert_eq!(config.arena.mode, cloned.arena.mode);
}
