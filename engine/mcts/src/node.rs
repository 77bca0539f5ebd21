//! MCTS tree node representation.
//!
//! Each node owns a full copy of the board reached by firing `action` from the
//! parent's board. Nodes store the visit statistics used for selection and for
//! the final move choice.

use games_battleship::{BoardState, Coord};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Shot that led to this node from its parent (None for the root)
    pub action: Option<Coord>,

    /// Board after `action` was fired. Never shared with another node.
    pub state: BoardState,

    /// Number of times this node has been visited
    pub visit_count: u32,

    /// Sum of rewards (heuristic engine) or values (guided engine)
    /// backpropagated through this node. Q = value_sum / visit_count
    pub value_sum: f32,

    /// Prior probability of `action`, from the heatmap or the evaluator.
    pub prior: f32,

    /// Children in expansion order. Empty until the node is expanded.
    pub children: Vec<NodeId>,
}

impl MctsNode {
    /// Create a new root node.
    pub fn new_root(state: BoardState) -> Self {
        Self {
            parent: NodeId::NONE,
            action: None,
            state,
            visit_count: 0,
            value_sum: 0.0,
            prior: 0.0,
            children: Vec::new(),
        }
    }

    /// Create a new child node.
    pub fn new_child(parent: NodeId, action: Coord, prior: f32, state: BoardState) -> Self {
        Self {
            parent,
            action: Some(action),
            state,
            visit_count: 0,
            value_sum: 0.0,
            prior,
            children: Vec::new(),
        }
    }

    /// Calculate mean value Q = value_sum / visit_count.
    /// Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// Selection score used by the heuristic engine:
    ///
    /// `Q + c_uct * sqrt(ln(N) / n) + c_puct * P * sqrt(N) / (1 + n)`
    ///
    /// Unvisited nodes score `+inf` so every child is tried once before any
    /// is revisited.
    #[inline]
    pub fn hybrid_score(&self, parent_visits: u32, c_uct: f32, c_puct: f32) -> f32 {
        if self.visit_count == 0 {
            return f32::INFINITY;
        }
        let n = self.visit_count as f32;
        // ln(0) is -inf; a parent always has at least one visit once a child
        // has been backpropagated through it, but guard the formula anyway.
        let parent = parent_visits.max(1) as f32;
        let q = self.mean_value();
        let u = c_uct * (parent.ln() / n).sqrt();
        let p = c_puct * self.prior * parent.sqrt() / (1.0 + n);
        q + u + p
    }

    /// Selection score used by the guided engine:
    ///
    /// `Q + c_puct * P * sqrt(N) / (1 + n)`
    ///
    /// Takes a pre-computed `sqrt(N)` so siblings don't each recompute it.
    #[inline]
    pub fn puct_score(&self, parent_visits_sqrt: f32, c_puct: f32) -> f32 {
        let u = c_puct * self.prior * parent_visits_sqrt / (1.0 + self.visit_count as f32);
        self.mean_value() + u
    }

    /// Check if this node has been expanded (has children).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// A node is fully expanded once it has a child for every legal move.
    /// Nodes without legal moves are never fully expanded.
    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        let legal = self.state.num_legal_moves();
        legal > 0 && self.children.len() >= legal
    }

    /// Won boards and boards with nothing left to shoot end a descent.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.has_won() || self.state.num_legal_moves() == 0
    }
}
