//! MCTS configuration parameters.

/// Configuration shared by the heuristic and guided search engines.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Base number of simulations per search call.
    /// Doubled in the endgame (see `endgame_cells`).
    pub num_simulations: u32,

    /// UCT exploration constant for the logarithmic term.
    /// Only the heuristic engine uses it; the guided engine relies on priors.
    pub c_uct: f32,

    /// Weight of the prior term in the selection score.
    /// The heuristic engine uses ~0.5, the guided engine ~1.0.
    pub c_puct: f32,

    /// Dirichlet noise alpha for root children of the guided engine.
    /// Set to 0.0 to disable noise.
    pub dirichlet_alpha: f32,

    /// Fraction of each root prior replaced by noise.
    /// 0.25 means 75% prior + 25% noise.
    pub dirichlet_epsilon: f32,

    /// When at most this many ship cells remain unhit, the simulation budget
    /// is doubled for extra precision.
    pub endgame_cells: usize,

    /// Weight of the static placement-coverage map in the heatmap.
    pub static_weight: f32,

    /// Weight of the dynamic hunt map (neighbours of hits) in the heatmap.
    pub hunt_weight: f32,

    /// Keep the tree between calls and advance it along played moves.
    pub reuse_tree: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self::for_heuristic()
    }
}

impl MctsConfig {
    /// Settings for the rollout-based heuristic engine.
    pub fn for_heuristic() -> Self {
        Self {
            num_simulations: 200,
            c_uct: 1.41,
            c_puct: 0.5,
            dirichlet_alpha: 0.0,
            dirichlet_epsilon: 0.0,
            endgame_cells: 4,
            static_weight: 0.3,
            hunt_weight: 0.7,
            reuse_tree: true,
        }
    }

    /// Settings for the evaluator-guided engine (with root noise).
    pub fn for_guided() -> Self {
        Self {
            num_simulations: 200,
            c_uct: 0.0,
            c_puct: 1.0,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.25,
            endgame_cells: 4,
            static_weight: 0.3,
            hunt_weight: 0.7,
            reuse_tree: false,
        }
    }

    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 20,
            ..Self::for_heuristic()
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set the UCT exploration constant.
    pub fn with_c_uct(mut self, c: f32) -> Self {
        self.c_uct = c;
        self
    }

    /// Builder pattern: set c_puct exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set root noise parameters.
    pub fn with_dirichlet(mut self, alpha: f32, epsilon: f32) -> Self {
        self.dirichlet_alpha = alpha;
        self.dirichlet_epsilon = epsilon;
        self
    }

    /// Builder pattern: set the heatmap blend.
    pub fn with_heatmap_weights(mut self, static_weight: f32, hunt_weight: f32) -> Self {
        self.static_weight = static_weight;
        self.hunt_weight = hunt_weight;
        self
    }

    /// Builder pattern: set the endgame threshold for budget doubling.
    pub fn with_endgame_cells(mut self, cells: usize) -> Self {
        self.endgame_cells = cells;
        self
    }

    /// Builder pattern: enable or disable tree reuse across calls.
    pub fn with_tree_reuse(mut self, reuse: bool) -> Self {
        self.reuse_tree = reuse;
        self
    }

    /// Simulation budget for a board with `remaining_ship_cells` unhit cells.
    pub fn budget(&self, remaining_ship_cells: usize) -> u32 {
        if remaining_ship_cells <= self.endgame_cells {
            self.num_simulations.saturating_mul(2)
        } else {
            self.num_simulations
        }
    }
}
