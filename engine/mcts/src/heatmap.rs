//! Placement-density heatmap used for priors and rollout sampling.
//!
//! The heatmap blends two signals:
//!
//! - **Static coverage**: for every ship length in the fleet and every origin
//!   and orientation where that ship could still legally be placed, count how
//!   many such placements cover each cell. Both orientations are counted
//!   independently, so this measures "how many placements could cover this
//!   cell", not actual occupancy.
//! - **Hunt targets**: every unresolved orthogonal neighbour of a Hit cell
//!   gets weight 1.0.
//!
//! `heatmap = normalize(static_weight * static + hunt_weight * hunt)`.
//! An all-zero heatmap means "no preference"; [`Heatmap::sample`] falls back to
//! uniform sampling in that case.

use games_battleship::{BoardState, Cell, Coord, Orientation, FLEET, NUM_CELLS};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

/// Normalized weight per grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    weights: [f32; NUM_CELLS],
}

impl Heatmap {
    /// Compute the blended heatmap for a board.
    pub fn compute(board: &BoardState, static_weight: f32, hunt_weight: f32) -> Self {
        let coverage = static_coverage(board);
        let hunt = hunt_targets(board);

        let mut combined = [0.0; NUM_CELLS];
        for (i, slot) in combined.iter_mut().enumerate() {
            *slot = static_weight * coverage[i] + hunt_weight * hunt[i];
        }
        Self::from_weights(combined)
    }

    /// Build a heatmap from raw non-negative weights, normalizing them.
    pub fn from_weights(mut weights: [f32; NUM_CELLS]) -> Self {
        normalize(&mut weights);
        Self { weights }
    }

    /// A heatmap that expresses no preference at all.
    pub fn empty() -> Self {
        Self {
            weights: [0.0; NUM_CELLS],
        }
    }

    #[inline]
    pub fn weight(&self, coord: Coord) -> f32 {
        self.weights[coord.index()]
    }

    pub fn weights(&self) -> &[f32; NUM_CELLS] {
        &self.weights
    }

    /// True when every weight is zero.
    pub fn is_degenerate(&self) -> bool {
        self.weights.iter().all(|&w| w <= 0.0)
    }

    /// Sample one of `candidates` proportionally to its weight.
    ///
    /// Falls back to a uniform choice when the candidates carry no weight.
    /// Returns `None` only when `candidates` is empty.
    pub fn sample<R: Rng + ?Sized>(&self, candidates: &[Coord], rng: &mut R) -> Option<Coord> {
        let weights: Vec<f32> = candidates.iter().map(|&c| self.weight(c)).collect();
        match WeightedIndex::new(&weights) {
            Ok(dist) => Some(candidates[dist.sample(rng)]),
            Err(_) => candidates.choose(rng).copied(),
        }
    }
}

/// Normalized count of legal placements covering each cell.
pub fn static_coverage(board: &BoardState) -> [f32; NUM_CELLS] {
    let mut counts = [0.0; NUM_CELLS];
    for &length in &FLEET {
        for origin in Coord::all() {
            for orientation in Orientation::ALL {
                if !board.can_place(origin.x(), origin.y(), orientation, length) {
                    continue;
                }
                for k in 0..length as usize {
                    let (x, y) = match orientation {
                        Orientation::Horizontal => (origin.x(), origin.y() + k),
                        Orientation::Vertical => (origin.x() + k, origin.y()),
                    };
                    if let Ok(cell) = Coord::new(x, y) {
                        counts[cell.index()] += 1.0;
                    }
                }
            }
        }
    }
    normalize(&mut counts);
    counts
}

/// 1.0 on every unresolved orthogonal neighbour of a Hit cell, 0.0 elsewhere.
pub fn hunt_targets(board: &BoardState) -> [f32; NUM_CELLS] {
    let mut targets = [0.0; NUM_CELLS];
    for coord in Coord::all().filter(|&c| board.cell(c) == Cell::Hit) {
        for neighbor in coord.orthogonal_neighbors() {
            if board.is_legal(neighbor) {
                targets[neighbor.index()] = 1.0;
            }
        }
    }
    targets
}

/// Divide by the total, treating a zero total as 1.0 so nothing blows up.
fn normalize(weights: &mut [f32]) {
    let total: f32 = weights.iter().sum();
    let total = if total > 0.0 { total } else { 1.0 };
    for w in weights.iter_mut() {
        *w /= total;
    }
}
