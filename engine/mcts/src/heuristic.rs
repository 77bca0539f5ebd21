//! Rollout-based MCTS engine.
//!
//! Each simulation:
//! 1. **Selection**: descend with the hybrid score while the node is fully
//!    expanded
//! 2. **Expansion**: attach one random untried move, prior read from the heatmap
//! 3. **Rollout**: play the child's board out with the hunt/target policy
//! 4. **Backpropagation**: add the rollout reward from the child to the root
//!
//! The engine keeps its tree between calls. After a shot is fired the caller
//! should [`advance`](HeuristicMcts::advance) so the matching subtree becomes
//! the next root.

use std::time::Instant;

use games_battleship::{BoardState, Coord};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, trace};

use crate::config::MctsConfig;
use crate::heatmap::Heatmap;
use crate::rollout::rollout;
use crate::search::{SearchError, SearchResult, SearchStats};
use crate::snapshot::NodeSnapshot;
use crate::tree::MctsTree;

/// Heatmap-and-rollout search engine with tree reuse.
#[derive(Debug)]
pub struct HeuristicMcts {
    config: MctsConfig,
    tree: Option<MctsTree>,
    heatmap: Heatmap,
    rng: ChaCha20Rng,
}

impl HeuristicMcts {
    /// Create an engine seeded from OS entropy.
    pub fn new(config: MctsConfig) -> Self {
        Self::with_rng(config, ChaCha20Rng::from_entropy())
    }

    /// Create an engine with a reproducible seed.
    pub fn with_seed(config: MctsConfig, seed: u64) -> Self {
        Self::with_rng(config, ChaCha20Rng::seed_from_u64(seed))
    }

    pub fn with_rng(config: MctsConfig, rng: ChaCha20Rng) -> Self {
        Self {
            config,
            tree: None,
            heatmap: Heatmap::empty(),
            rng,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Heatmap computed by the most recent search call.
    pub fn heatmap(&self) -> &Heatmap {
        &self.heatmap
    }

    /// Tree retained from the most recent search call, if any.
    pub fn tree(&self) -> Option<&MctsTree> {
        self.tree.as_ref()
    }

    pub fn snapshot(&self) -> Option<NodeSnapshot> {
        self.tree.as_ref().map(MctsTree::snapshot)
    }

    /// Drop the retained tree.
    pub fn reset(&mut self) {
        self.tree = None;
    }

    /// Best cell to fire at on `board`, or `None` if nothing is left to shoot.
    pub fn run(&mut self, board: &BoardState) -> Result<Option<Coord>, SearchError> {
        Ok(self.search(board)?.map(|result| result.action))
    }

    /// Like [`run`](Self::run) but always on a fresh tree, also returning the
    /// root visit distribution over every grid cell.
    pub fn run_with_policy(
        &mut self,
        board: &BoardState,
    ) -> Result<Option<(Coord, Vec<f32>)>, SearchError> {
        Ok(self
            .search_with(board, false)?
            .map(|result| (result.action, result.policy)))
    }

    /// Full search, reusing the retained tree when configured to.
    pub fn search(&mut self, board: &BoardState) -> Result<Option<SearchResult>, SearchError> {
        self.search_with(board, self.config.reuse_tree)
    }

    /// Promote the child reached by `action` to be the retained root.
    ///
    /// Returns `false` (and drops the tree) when there is no retained tree or
    /// `action` was never expanded from its root.
    pub fn advance(&mut self, action: Coord) -> bool {
        let Some(mut tree) = self.tree.take() else {
            return false;
        };

        let Some(child) = tree.find_child(tree.root(), action) else {
            debug!(%action, "Move not in retained tree, discarding it");
            return false;
        };

        match tree.reroot(child) {
            Ok(()) => {
                debug!(
                    %action,
                    nodes = tree.len(),
                    visits = tree.root_node().visit_count,
                    "Advanced retained tree"
                );
                self.tree = Some(tree);
                true
            }
            Err(e) => {
                debug!(%action, error = %e, "Failed to advance retained tree");
                false
            }
        }
    }

    fn search_with(
        &mut self,
        board: &BoardState,
        reuse: bool,
    ) -> Result<Option<SearchResult>, SearchError> {
        if self.config.num_simulations == 0 {
            return Err(SearchError::InvalidConfig(
                "num_simulations must be positive".to_string(),
            ));
        }
        if board.num_legal_moves() == 0 {
            return Ok(None);
        }

        let start = Instant::now();
        self.heatmap = Heatmap::compute(board, self.config.static_weight, self.config.hunt_weight);

        let mut stats = SearchStats::default();
        let mut tree = match self.tree.take() {
            Some(tree) if reuse && tree.root_node().state == *board => {
                stats.reused_tree = true;
                tree
            }
            Some(_) if reuse => {
                debug!("Retained root does not match the board, starting a fresh tree");
                Self::fresh_tree(board)
            }
            _ => Self::fresh_tree(board),
        };

        let budget = self.config.budget(board.remaining_ship_cells());
        for _ in 0..budget {
            self.simulate(&mut tree, &mut stats)?;
        }

        let Some((action, visits)) = tree.best_action() else {
            // Only reachable when every simulation found no untried move at
            // the root, which a board with legal moves cannot produce.
            self.tree = Some(tree);
            return Ok(None);
        };

        stats.elapsed = start.elapsed();
        stats.tree = Some(tree.stats());
        let result = SearchResult {
            action,
            policy: tree.visit_policy(),
            value: tree.root_node().mean_value(),
            simulations: budget,
            stats,
        };

        debug!(
            %action,
            visits,
            simulations = budget,
            nodes = tree.len(),
            reused = result.stats.reused_tree,
            elapsed_ms = result.stats.elapsed.as_millis() as u64,
            "Heuristic search complete"
        );

        self.tree = Some(tree);
        Ok(Some(result))
    }

    fn fresh_tree(board: &BoardState) -> MctsTree {
        let mut tree = MctsTree::new(board.clone());
        let root = tree.root();
        tree.get_mut(root).visit_count = 1;
        tree
    }

    /// Run a single simulation (select -> expand -> rollout -> backpropagate).
    fn simulate(&mut self, tree: &mut MctsTree, stats: &mut SearchStats) -> Result<(), SearchError> {
        // Selection
        let mut node_id = tree.root();
        while tree.get(node_id).is_fully_expanded() {
            match tree.select_hybrid_child(node_id, self.config.c_uct, self.config.c_puct) {
                Some(child) => node_id = child,
                None => break,
            }
        }

        // Expansion
        let untried = tree.untried_moves(node_id);
        if let Some(&action) = untried.choose(&mut self.rng) {
            let prior = self.heatmap.weight(action);
            node_id = tree.add_child(node_id, action, prior)?;
            stats.expansions += 1;
        }

        // Rollout
        let state = tree.get(node_id).state.clone();
        if state.has_won() {
            stats.terminal_hits += 1;
        }
        let outcome = rollout(state, &self.heatmap, &mut self.rng);
        stats.rollouts += 1;

        // Backpropagation
        tree.backpropagate(node_id, outcome.reward);

        trace!(
            leaf = node_id.0,
            reward = outcome.reward,
            shots = outcome.shots,
            "Heuristic simulation complete"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_battleship::{Cell, Orientation, NUM_CELLS};
    use rand::Rng;

    fn coord(x: usize, y: usize) -> Coord {
        Coord::new(x, y).unwrap()
    }

    /// A board with the standard fleet and `shots` random cells already fired at.
    fn random_board(seed: u64, shots: usize) -> BoardState {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut board = BoardState::new();
        board.place_fleet(&mut rng).unwrap();
        for _ in 0..shots {
            let legal = board.legal_moves();
            let target = legal[rng.gen_range(0..legal.len())];
            board.shoot_at(target);
            if board.has_won() {
                break;
            }
        }
        board
    }

    #[test]
    fn test_run_returns_legal_move() {
        for seed in 0..8 {
            let board = random_board(seed, (seed as usize) * 3);
            let mut engine = HeuristicMcts::with_seed(MctsConfig::for_testing(), seed);

            let action = engine.run(&board).unwrap().unwrap();
            assert!(action.x() < 6 && action.y() < 6);
            assert!(
                !matches!(board.cell(action), Cell::Hit | Cell::Miss),
                "seed {seed}: {action} was already resolved"
            );
        }
    }

    #[test]
    fn test_run_without_legal_moves() {
        let mut board = BoardState::new();
        for c in Coord::all() {
            board.shoot_at(c);
        }
        let mut engine = HeuristicMcts::with_seed(MctsConfig::for_testing(), 0);
        assert_eq!(engine.run(&board).unwrap(), None);
        assert!(engine.run_with_policy(&board).unwrap().is_none());
    }

    #[test]
    fn test_zero_simulations_is_rejected() {
        let config = MctsConfig::for_testing().with_simulations(0);
        let mut engine = HeuristicMcts::with_seed(config, 0);
        assert!(matches!(
            engine.run(&random_board(1, 0)),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_run_with_policy_is_distribution() {
        let board = random_board(3, 6);
        let mut engine = HeuristicMcts::with_seed(MctsConfig::for_testing(), 3);

        let (action, policy) = engine.run_with_policy(&board).unwrap().unwrap();
        assert_eq!(policy.len(), NUM_CELLS);
        assert!(policy.iter().all(|&p| p >= 0.0));
        let sum: f64 = policy.iter().map(|&p| p as f64).sum();
        assert!((sum - 1.0).abs() < 1e-6);

        // Resolved cells are never expanded
        for c in Coord::all().filter(|&c| !board.is_legal(c)) {
            assert_eq!(policy[c.index()], 0.0);
        }
        assert!(policy[action.index()] > 0.0);
    }

    #[test]
    fn test_budget_and_visits() {
        let board = random_board(4, 0);
        let config = MctsConfig::for_testing().with_simulations(30);
        let mut engine = HeuristicMcts::with_seed(config, 4);

        let result = engine.search(&board).unwrap().unwrap();
        assert_eq!(result.simulations, 30);
        assert_eq!(result.stats.rollouts, 30);
        assert_eq!(result.stats.expansions, 30);
        assert!(!result.stats.reused_tree);

        // Root starts with one visit, then one per simulation
        let tree = engine.tree().unwrap();
        assert_eq!(tree.root_node().visit_count, 31);
        assert_eq!(tree.len(), 31);
    }

    #[test]
    fn test_endgame_doubles_budget() {
        let mut board = BoardState::new();
        board.place_ship(0, 0, Orientation::Horizontal, 3).unwrap();
        board.place_ship(4, 4, Orientation::Horizontal, 1).unwrap();
        assert_eq!(board.remaining_ship_cells(), 4);

        let config = MctsConfig::for_testing().with_simulations(10);
        let mut engine = HeuristicMcts::with_seed(config, 9);
        let result = engine.search(&board).unwrap().unwrap();
        assert_eq!(result.simulations, 20);
    }

    #[test]
    fn test_priors_come_from_heatmap() {
        let mut board = BoardState::new();
        board.place_ship(2, 2, Orientation::Horizontal, 2).unwrap();
        board.shoot(2, 2).unwrap();

        let mut engine = HeuristicMcts::with_seed(MctsConfig::for_testing(), 2);
        engine.run(&board).unwrap().unwrap();

        let heatmap = engine.heatmap().clone();
        let tree = engine.tree().unwrap();
        for &id in &tree.root_node().children {
            let child = tree.get(id);
            let action = child.action.unwrap();
            assert!((child.prior - heatmap.weight(action)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let board = random_board(5, 4);
        let mut a = HeuristicMcts::with_seed(MctsConfig::for_testing(), 77);
        let mut b = HeuristicMcts::with_seed(MctsConfig::for_testing(), 77);

        let ra = a.search(&board).unwrap().unwrap();
        let rb = b.search(&board).unwrap().unwrap();
        assert_eq!(ra.action, rb.action);
        assert_eq!(ra.policy, rb.policy);
    }

    #[test]
    fn test_advance_reuses_subtree() {
        let mut board = random_board(6, 0);
        let config = MctsConfig::for_testing().with_simulations(60);
        let mut engine = HeuristicMcts::with_seed(config, 6);

        let action = engine.run(&board).unwrap().unwrap();
        let visits_before = {
            let tree = engine.tree().unwrap();
            tree.get(tree.find_child(tree.root(), action).unwrap())
                .visit_count
        };

        board.shoot_at(action);
        assert!(engine.advance(action));
        let tree = engine.tree().unwrap();
        assert_eq!(tree.root_node().action, Some(action));
        assert_eq!(tree.root_node().visit_count, visits_before);
        assert!(tree.root_node().parent.is_none());

        let result = engine.search(&board).unwrap().unwrap();
        assert!(result.stats.reused_tree);
        assert!(board.is_legal(result.action));
    }

    #[test]
    fn test_advance_unknown_move_clears_tree() {
        let mut board = BoardState::new();
        board.place_ship(0, 0, Orientation::Vertical, 2).unwrap();
        let config = MctsConfig::for_testing().with_simulations(3);
        let mut engine = HeuristicMcts::with_seed(config, 1);
        engine.run(&board).unwrap();

        // Two ship cells left doubles the budget, so at most 6 of 36 root moves were expanded
        let expanded: Vec<Coord> = {
            let tree = engine.tree().unwrap();
            tree.root_node()
                .children
                .iter()
                .filter_map(|&id| tree.get(id).action)
                .collect()
        };
        let missing = Coord::all().find(|c| !expanded.contains(c)).unwrap();

        assert!(!engine.advance(missing));
        assert!(engine.tree().is_none());
        assert!(!engine.advance(missing));

        board.shoot_at(missing);
        let result = engine.search(&board).unwrap().unwrap();
        assert!(!result.stats.reused_tree);
    }

    #[test]
    fn test_mismatched_tree_is_rebuilt() {
        let board = random_board(8, 0);
        let mut engine = HeuristicMcts::with_seed(MctsConfig::for_testing(), 8);
        engine.run(&board).unwrap();

        // Fire somewhere without advancing
        let mut moved = board.clone();
        moved.shoot_at(coord(5, 5));
        let result = engine.search(&moved).unwrap().unwrap();
        assert!(!result.stats.reused_tree);
        assert_eq!(engine.tree().unwrap().root_node().state, moved);
    }

    #[test]
    fn test_run_with_policy_never_reuses() {
        let board = random_board(10, 0);
        let mut engine = HeuristicMcts::with_seed(MctsConfig::for_testing(), 10);
        engine.run(&board).unwrap();

        engine.run_with_policy(&board).unwrap();
        let tree = engine.tree().unwrap();
        assert_eq!(tree.root_node().visit_count, 21);
    }

    #[test]
    fn test_snapshot_after_search() {
        let board = random_board(12, 0);
        let mut engine = HeuristicMcts::with_seed(MctsConfig::for_testing(), 12);
        assert!(engine.snapshot().is_none());

        engine.run(&board).unwrap();
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.action, None);
        assert_eq!(snapshot.visits, 21);
        let child_visits: u32 = snapshot.children.iter().map(|c| c.visits).sum();
        assert_eq!(child_visits, 20);

        engine.reset();
        assert!(engine.snapshot().is_none());
    }
}
