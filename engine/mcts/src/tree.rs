//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec
//! and referenced by NodeId indices, so parent links never own anything
//! and dropping a subtree is just dropping arena slots.

use std::cmp::Reverse;

use games_battleship::{BoardState, Coord, NUM_CELLS};

use crate::node::{MctsNode, NodeId};
use crate::search::SearchError;

/// MCTS tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after initialization or reroot)
    root: NodeId,
}

impl MctsTree {
    /// Create a new tree whose root wraps `state`.
    pub fn new(state: BoardState) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(state)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn root_node(&self) -> &MctsNode {
        self.get(self.root)
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.index()]
    }

    /// Checked lookup for IDs that come from outside the tree.
    pub fn try_get(&self, id: NodeId) -> Result<&MctsNode, SearchError> {
        self.nodes
            .get(id.index())
            .ok_or(SearchError::UnknownNode(id.0))
    }

    fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[MctsNode] {
        &self.nodes
    }

    /// Child of `parent` reached by firing at `action`, if it was expanded.
    pub fn find_child(&self, parent: NodeId, action: Coord) -> Option<NodeId> {
        self.get(parent)
            .children
            .iter()
            .copied()
            .find(|&id| self.get(id).action == Some(action))
    }

    /// Legal moves of `node` that have no child yet, in row-major order.
    pub fn untried_moves(&self, node: NodeId) -> Vec<Coord> {
        let node = self.get(node);
        let tried = node
            .children
            .iter()
            .filter_map(|&id| self.get(id).action)
            .fold(0u64, |mask, c| mask | (1u64 << c.index()));
        let open = node.state.legal_mask() & !tried;
        (0..NUM_CELLS)
            .filter(|&i| (open >> i) & 1 == 1)
            .filter_map(Coord::from_index)
            .collect()
    }

    /// Select the child of `node_id` with the highest hybrid score.
    pub fn select_hybrid_child(&self, node_id: NodeId, c_uct: f32, c_puct: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.visit_count;

        node.children.iter().copied().max_by(|&a, &b| {
            let score_a = self.get(a).hybrid_score(parent_visits, c_uct, c_puct);
            let score_b = self.get(b).hybrid_score(parent_visits, c_uct, c_puct);
            score_a
                .partial_cmp(&score_b)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Select the child of `node_id` with the highest PUCT score.
    pub fn select_puct_child(&self, node_id: NodeId, c_puct: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        // Pre-compute sqrt once instead of per-child comparison
        let parent_visits_sqrt = (node.visit_count as f32).sqrt();

        node.children.iter().copied().max_by(|&a, &b| {
            let score_a = self.get(a).puct_score(parent_visits_sqrt, c_puct);
            let score_b = self.get(b).puct_score(parent_visits_sqrt, c_puct);
            score_a
                .partial_cmp(&score_b)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Fire `action` from the parent's board and attach the result as a child.
    ///
    /// Rejects a move that is already resolved on the parent's board, and a
    /// move that already has a child.
    pub fn add_child(
        &mut self,
        parent_id: NodeId,
        action: Coord,
        prior: f32,
    ) -> Result<NodeId, SearchError> {
        let parent = self.try_get(parent_id)?;
        if !parent.state.is_legal(action) {
            return Err(SearchError::IllegalMove(action));
        }
        if self.find_child(parent_id, action).is_some() {
            return Err(SearchError::DuplicateChild(action));
        }

        let mut state = parent.state.clone();
        state.shoot_at(action);

        let child_id = self.allocate(MctsNode::new_child(parent_id, action, prior, state));
        self.get_mut(parent_id).children.push(child_id);
        Ok(child_id)
    }

    /// Add one child per legal move, taking each prior from `priors[cell index]`.
    /// Returns the number of children added.
    pub fn expand_all(&mut self, node_id: NodeId, priors: &[f32]) -> Result<usize, SearchError> {
        let moves = self.untried_moves(node_id);
        for &action in &moves {
            let prior = priors.get(action.index()).copied().unwrap_or(0.0);
            self.add_child(node_id, action, prior)?;
        }
        Ok(moves.len())
    }

    /// Add `value` to every node from `leaf_id` up to the root and bump their
    /// visit counts. There is a single agent, so the value is never negated.
    pub fn backpropagate(&mut self, leaf_id: NodeId, value: f32) {
        let mut current_id = leaf_id;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visit_count += 1;
            node.value_sum += value;
            current_id = node.parent;
        }
    }

    /// Most visited child of `node_id`. Ties go to the earliest expanded child.
    pub fn best_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.get(node_id)
            .children
            .iter()
            .copied()
            .min_by_key(|&id| Reverse(self.get(id).visit_count))
    }

    /// Get the best action from root based on visit counts.
    /// Returns (action, visit_count) or None if root has no children.
    pub fn best_action(&self) -> Option<(Coord, u32)> {
        let best = self.get(self.best_child(self.root)?);
        best.action.map(|action| (action, best.visit_count))
    }

    /// Root children's visit counts normalized over every grid cell.
    ///
    /// Cells that were never expanded get 0. All zeros if nothing was visited.
    pub fn visit_policy(&self) -> Vec<f32> {
        let root = self.root_node();
        let mut policy = vec![0.0; NUM_CELLS];

        let total: u32 = root
            .children
            .iter()
            .map(|&id| self.get(id).visit_count)
            .sum();
        if total == 0 {
            return policy;
        }

        for &id in &root.children {
            let child = self.get(id);
            if let Some(action) = child.action {
                policy[action.index()] = child.visit_count as f32 / total as f32;
            }
        }
        policy
    }

    /// Promote a child of the root to be the new root.
    ///
    /// The arena is rebuilt with only the child's subtree (breadth-first, so
    /// the new root lands at index 0). Siblings and the old root are dropped.
    pub fn reroot(&mut self, new_root: NodeId) -> Result<(), SearchError> {
        if self.try_get(new_root)?.parent != self.root {
            return Err(SearchError::NotRootChild(new_root.0));
        }

        let mut order = vec![new_root];
        let mut cursor = 0;
        while let Some(&id) = order.get(cursor) {
            order.extend_from_slice(&self.get(id).children);
            cursor += 1;
        }

        let mut remap = vec![NodeId::NONE; self.nodes.len()];
        for (new_idx, old) in order.iter().enumerate() {
            remap[old.index()] = NodeId(new_idx as u32);
        }

        let mut old_nodes: Vec<Option<MctsNode>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for old in order {
            if let Some(mut node) = old_nodes[old.index()].take() {
                // The old root maps to NONE, which detaches the new root
                node.parent = if node.parent.is_some() {
                    remap[node.parent.index()]
                } else {
                    NodeId::NONE
                };
                for child in &mut node.children {
                    *child = remap[child.index()];
                }
                nodes.push(node);
            }
        }

        self.nodes = nodes;
        self.root = NodeId(0);
        Ok(())
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.root_node();
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        if node.children.is_empty() {
            return current_depth;
        }

        node.children
            .iter()
            .map(|&id| self.compute_max_depth(id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}
