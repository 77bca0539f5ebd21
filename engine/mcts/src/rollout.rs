//! Hunt/target rollout policy.
//!
//! A rollout keeps firing until the board is won or nothing is left to shoot.
//! After every hit its unresolved orthogonal neighbours are queued; queued
//! cells are fired first (FIFO), and only with an empty queue does the rollout
//! sample from the heatmap.

use std::collections::VecDeque;

use games_battleship::BoardState;
use rand::Rng;

use crate::heatmap::Heatmap;

/// Outcome of a single rollout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloutOutcome {
    /// 1.0 if the board ended won, 0.0 otherwise.
    pub reward: f32,
    /// Shots fired during the rollout.
    pub shots: u32,
}

/// Play `state` out with the hunt/target policy. The board is consumed.
pub fn rollout<R: Rng + ?Sized>(
    mut state: BoardState,
    heatmap: &Heatmap,
    rng: &mut R,
) -> RolloutOutcome {
    let mut hunt = VecDeque::new();
    let mut shots = 0;

    while !state.has_won() {
        let target = match hunt.pop_front() {
            Some(coord) => {
                if !state.is_legal(coord) {
                    continue;
                }
                coord
            }
            None => match heatmap.sample(&state.legal_moves(), rng) {
                Some(coord) => coord,
                None => break,
            },
        };

        shots += 1;
        if state.shoot_at(target) {
            hunt.extend(target.orthogonal_neighbors().filter(|&n| state.is_legal(n)));
        }
    }

    RolloutOutcome {
        reward: if state.has_won() { 1.0 } else { 0.0 },
        shots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_battleship::{Coord, Orientation, NUM_CELLS};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_rollout_with_fleet_always_wins() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..10 {
            let mut board = BoardState::new();
            board.place_fleet(&mut rng).unwrap();
            let heatmap = Heatmap::compute(&board, 0.3, 0.7);

            let outcome = rollout(board, &heatmap, &mut rng);
            assert!((outcome.reward - 1.0).abs() < 1e-6);
            assert!(outcome.shots as usize >= 9);
            assert!(outcome.shots as usize <= NUM_CELLS);
        }
    }

    #[test]
    fn test_rollout_on_won_board_fires_nothing() {
        let mut board = BoardState::new();
        board.place_ship(0, 0, Orientation::Horizontal, 1).unwrap();
        board.shoot(0, 0).unwrap();

        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let outcome = rollout(board, &Heatmap::empty(), &mut rng);
        assert_eq!(outcome.shots, 0);
        assert!((outcome.reward - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rollout_hunts_after_hit() {
        let mut board = BoardState::new();
        board.place_ship(2, 1, Orientation::Horizontal, 3).unwrap();

        // All weight on the ship's first cell, so the opening shot is fixed
        let mut weights = [0.0; NUM_CELLS];
        weights[Coord::new(2, 1).unwrap().index()] = 1.0;
        let heatmap = Heatmap::from_weights(weights);

        // (2,1) hits and queues (3,1) (1,1) (2,2) (2,0). (2,2) hits and queues
        // (3,2) (1,2) (2,3). Draining the queue in order sinks the ship on the
        // eighth shot without ever sampling again.
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let outcome = rollout(board, &heatmap, &mut rng);
        assert!((outcome.reward - 1.0).abs() < 1e-6);
        assert_eq!(outcome.shots, 8);
    }

    #[test]
    fn test_rollout_without_fleet_is_already_won() {
        // No fleet means has_won() is vacuously true
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let outcome = rollout(BoardState::new(), &Heatmap::empty(), &mut rng);
        assert_eq!(outcome.shots, 0);
    }
}
