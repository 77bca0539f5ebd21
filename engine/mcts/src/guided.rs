//! Evaluator-guided MCTS engine.
//!
//! Same arena tree as the heuristic engine, but priors and leaf values come
//! from an [`Evaluator`] instead of the heatmap and rollouts:
//!
//! 1. The root is evaluated once and expanded with one child per legal move.
//! 2. Dirichlet noise is blended into the root children's priors, once per
//!    root. Searching the same position again with a retained tree keeps the
//!    priors it already has.
//! 3. Each simulation descends by PUCT until it reaches an unexpanded node.
//!    A won board backpropagates +1; anything else is evaluated, expanded
//!    with the returned priors and backpropagates the returned value.
//!
//! An evaluator error aborts the search call. There is no fallback prior.

use std::time::Instant;

use games_battleship::{BoardState, Coord};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, trace};

use crate::config::MctsConfig;
use crate::evaluator::{EvalResult, Evaluator};
use crate::search::{dirichlet_noise, SearchError, SearchResult, SearchStats};
use crate::snapshot::NodeSnapshot;
use crate::tree::MctsTree;

/// Value backpropagated from a board that is already won.
const TERMINAL_WIN_VALUE: f32 = 1.0;

/// PUCT search driven by an external policy/value evaluator.
pub struct GuidedMcts<E: Evaluator> {
    config: MctsConfig,
    evaluator: E,
    tree: Option<MctsTree>,
    /// Whether the retained root's priors already carry Dirichlet noise.
    root_noised: bool,
    rng: ChaCha20Rng,
}

impl<E: Evaluator> std::fmt::Debug for GuidedMcts<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuidedMcts")
            .field("config", &self.config)
            .field("tree_nodes", &self.tree.as_ref().map(MctsTree::len))
            .finish_non_exhaustive()
    }
}

impl<E: Evaluator> GuidedMcts<E> {
    /// Create an engine seeded from OS entropy.
    pub fn new(evaluator: E, config: MctsConfig) -> Self {
        Self::with_rng(evaluator, config, ChaCha20Rng::from_entropy())
    }

    /// Create an engine with a reproducible seed.
    pub fn with_seed(evaluator: E, config: MctsConfig, seed: u64) -> Self {
        Self::with_rng(evaluator, config, ChaCha20Rng::seed_from_u64(seed))
    }

    pub fn with_rng(evaluator: E, config: MctsConfig, rng: ChaCha20Rng) -> Self {
        Self {
            config,
            evaluator,
            tree: None,
            root_noised: false,
            rng,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Tree built by the most recent search call, if any.
    pub fn tree(&self) -> Option<&MctsTree> {
        self.tree.as_ref()
    }

    pub fn snapshot(&self) -> Option<NodeSnapshot> {
        self.tree.as_ref().map(MctsTree::snapshot)
    }

    pub fn reset(&mut self) {
        self.tree = None;
        self.root_noised = false;
    }

    /// Best cell to fire at on `board`, or `None` if nothing is left to shoot.
    pub fn run(&mut self, board: &BoardState) -> Result<Option<Coord>, SearchError> {
        Ok(self.search(board)?.map(|result| result.action))
    }

    /// Promote the child reached by `action` to be the retained root.
    /// Only useful with `reuse_tree` enabled; otherwise every search starts fresh.
    pub fn advance(&mut self, action: Coord) -> bool {
        self.root_noised = false;
        let Some(mut tree) = self.tree.take() else {
            return false;
        };
        match tree.find_child(tree.root(), action) {
            Some(child) if tree.reroot(child).is_ok() => {
                self.tree = Some(tree);
                true
            }
            _ => {
                debug!(%action, "Move not in retained tree, discarding it");
                false
            }
        }
    }

    pub fn search(&mut self, board: &BoardState) -> Result<Option<SearchResult>, SearchError> {
        if self.config.num_simulations == 0 {
            return Err(SearchError::InvalidConfig(
                "num_simulations must be positive".to_string(),
            ));
        }
        if board.num_legal_moves() == 0 {
            return Ok(None);
        }

        let start = Instant::now();
        let mut stats = SearchStats::default();

        let mut tree = match self.tree.take() {
            Some(tree) if self.config.reuse_tree && tree.root_node().state == *board => {
                stats.reused_tree = true;
                tree
            }
            _ => {
                self.root_noised = false;
                let eval = self.evaluate(board, &mut stats)?;
                let mut tree = MctsTree::new(board.clone());
                let root_id = tree.root();
                let root = tree.get_mut(root_id);
                root.prior = 0.0;
                root.visit_count = 1;
                root.value_sum = eval.value;
                stats.expansions += tree.expand_all(root_id, &eval.policy)? as u32;
                tree
            }
        };

        // A reused root may never have been expanded
        let root = tree.root();
        if !tree.get(root).is_expanded() {
            let eval = self.evaluate(board, &mut stats)?;
            stats.expansions += tree.expand_all(root, &eval.policy)? as u32;
        }

        if self.config.dirichlet_alpha > 0.0
            && self.config.dirichlet_epsilon > 0.0
            && !self.root_noised
        {
            self.add_dirichlet_noise(&mut tree)?;
            self.root_noised = true;
        }

        let budget = self.config.budget(board.remaining_ship_cells());
        for _ in 0..budget {
            self.simulate(&mut tree, &mut stats)?;
        }

        let Some((action, visits)) = tree.best_action() else {
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
            evaluations = result.stats.evaluations,
            value = result.value,
            elapsed_ms = result.stats.elapsed.as_millis() as u64,
            "Guided search complete"
        );

        self.tree = Some(tree);
        Ok(Some(result))
    }

    fn evaluate(
        &self,
        board: &BoardState,
        stats: &mut SearchStats,
    ) -> Result<EvalResult, SearchError> {
        let eval = self.evaluator.evaluate(board)?;
        eval.validate()?;
        stats.evaluations += 1;
        Ok(eval)
    }

    /// Run a single simulation (select -> evaluate -> expand -> backpropagate).
    fn simulate(&self, tree: &mut MctsTree, stats: &mut SearchStats) -> Result<(), SearchError> {
        // Selection: traverse to a leaf
        let mut leaf_id = tree.root();
        let mut depth = 0;
        while tree.get(leaf_id).is_expanded() {
            match tree.select_puct_child(leaf_id, self.config.c_puct) {
                Some(child) => {
                    leaf_id = child;
                    depth += 1;
                }
                None => break,
            }
        }

        let value = if tree.get(leaf_id).state.has_won() {
            stats.terminal_hits += 1;
            TERMINAL_WIN_VALUE
        } else {
            let eval = self.evaluate(&tree.get(leaf_id).state, stats)?;
            stats.expansions += tree.expand_all(leaf_id, &eval.policy)? as u32;
            eval.value
        };

        tree.backpropagate(leaf_id, value);

        trace!(leaf = leaf_id.0, depth, value, "Guided simulation complete");
        Ok(())
    }

    /// Blend Dirichlet noise into the root children's priors.
    fn add_dirichlet_noise(&mut self, tree: &mut MctsTree) -> Result<(), SearchError> {
        let children = tree.root_node().children.clone();
        if children.is_empty() {
            return Ok(());
        }

        let noise = dirichlet_noise(children.len(), self.config.dirichlet_alpha, &mut self.rng)?;
        let eps = self.config.dirichlet_epsilon;
        for (child_id, n) in children.into_iter().zip(noise) {
            let child = tree.get_mut(child_id);
            child.prior = (1.0 - eps) * child.prior + eps * n;
        }
        Ok(())
    }
}
