//! Read-only, serializable view of a search tree for visualization.

use games_battleship::Coord;
use serde::Serialize;

use crate::node::NodeId;
use crate::tree::MctsTree;

/// One node of a tree snapshot, with its children nested inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    /// Shot that produced this node; `None` for the root.
    pub action: Option<Coord>,
    pub visits: u32,
    /// Accumulated reward (heuristic) or value (guided).
    pub value: f32,
    /// `value / visits`, or 0 when unvisited.
    pub win_rate: f32,
    pub prior: f32,
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Number of nodes in this snapshot, including itself.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(NodeSnapshot::node_count)
            .sum::<usize>()
    }
}

impl MctsTree {
    /// Snapshot of the whole tree from the root.
    pub fn snapshot(&self) -> NodeSnapshot {
        self.snapshot_node(self.root(), usize::MAX)
    }

    /// Snapshot of the tree down to `max_depth` levels below the root.
    /// Depth 0 is just the root.
    pub fn snapshot_to_depth(&self, max_depth: usize) -> NodeSnapshot {
        self.snapshot_node(self.root(), max_depth)
    }

    fn snapshot_node(&self, id: NodeId, depth_left: usize) -> NodeSnapshot {
        let node = self.get(id);
        let children = if depth_left == 0 {
            Vec::new()
        } else {
            node.children
                .iter()
                .map(|&child| self.snapshot_node(child, depth_left - 1))
                .collect()
        };

        NodeSnapshot {
            action: node.action,
            visits: node.visit_count,
            value: node.value_sum,
            win_rate: node.mean_value(),
            prior: node.prior,
            children,
        }
    }
}
