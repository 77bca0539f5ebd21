//! Monte Carlo Tree Search engines for choosing Battleship shots.
//!
//! Two engines share one arena-allocated tree:
//!
//! - [`HeuristicMcts`]: classic MCTS. Priors come from a placement-density
//!   [`Heatmap`], leaves are scored by hunt/target rollouts, and the tree is
//!   kept between calls and advanced along the shots actually fired.
//! - [`GuidedMcts`]: PUCT search where an [`Evaluator`] supplies priors and
//!   values, with Dirichlet noise on the root children.
//!
//! Both engines are single-threaded and synchronous. Each instance owns its
//! tree, heatmap and RNG; two bots must use two instances.
//!
//! # Usage
//!
//! ```rust
//! use games_battleship::BoardState;
//! use mcts::{GuidedMcts, HeuristicMcts, MctsConfig, UniformEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let mut board = BoardState::new();
//! board.place_fleet(&mut rng).unwrap();
//!
//! let mut heuristic = HeuristicMcts::with_seed(MctsConfig::for_testing(), 42);
//! let shot = heuristic.run(&board).unwrap().expect("board has legal moves");
//! board.shoot_at(shot);
//! heuristic.advance(shot);
//!
//! let config = MctsConfig::for_guided().with_simulations(20);
//! let mut guided = GuidedMcts::with_seed(UniformEvaluator::new(), config, 42);
//! let result = guided.search(&board).unwrap().expect("board has legal moves");
//! assert!(board.is_legal(result.action));
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_simulations`: Simulations per call, doubled in the endgame (default: 200)
//! - `c_uct`: Logarithmic exploration constant, heuristic engine only (default: 1.41)
//! - `c_puct`: Prior weight in the selection score (default: 0.5 heuristic, 1.0 guided)
//! - `dirichlet_alpha` / `dirichlet_epsilon`: Root noise, guided engine only
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │          HeuristicMcts            GuidedMcts<E>          │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────┐  ┌───────────────┐  ┌─────────────────┐  │
//! │  │  MctsTree  │  │ Heatmap +     │  │   Evaluator     │  │
//! │  │  (arena)   │  │ rollout       │  │ (policy/value)  │  │
//! │  └─────┬──────┘  └───────┬───────┘  └────────┬────────┘  │
//! │        ▼                 ▼                   ▼           │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │   select → expand → rollout/evaluate →             │  │
//! │  │                     backpropagate                  │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod evaluator;
pub mod guided;
pub mod heatmap;
pub mod heuristic;
pub mod node;
pub mod rollout;
pub mod search;
pub mod snapshot;
pub mod tree;

#[cfg(feature = "onnx")]
pub mod onnx;

// Re-export main types
pub use config::MctsConfig;
pub use evaluator::{EvalResult, Evaluator, EvaluatorError, HeatmapEvaluator, UniformEvaluator};
pub use guided::GuidedMcts;
pub use heatmap::Heatmap;
pub use heuristic::HeuristicMcts;
pub use node::{MctsNode, NodeId};
pub use rollout::{rollout, RolloutOutcome};
pub use search::{SearchError, SearchResult, SearchStats};
pub use snapshot::NodeSnapshot;
pub use tree::{MctsTree, TreeStats};

#[cfg(feature = "onnx")]
pub use onnx::{OnnxEvaluator, OnnxStats};
