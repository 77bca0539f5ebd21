//! Types shared by both search engines: errors, results and statistics.

use std::time::Duration;

use games_battleship::Coord;
use rand::Rng;
use rand_distr::{Distribution, Gamma};
use thiserror::Error;

use crate::evaluator::EvaluatorError;
use crate::tree::TreeStats;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Evaluator error: {0}")]
    EvaluatorError(#[from] EvaluatorError),

    #[error("Cell {0} has already been fired at")]
    IllegalMove(Coord),

    #[error("Node already has a child for {0}")]
    DuplicateChild(Coord),

    #[error("Node {0} is not a child of the root")]
    NotRootChild(u32),

    #[error("Unknown node {0}")]
    UnknownNode(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Counters collected during one search call.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Wall time of the search call
    pub elapsed: Duration,
    /// Nodes added to the tree
    pub expansions: u32,
    /// Rollouts played (heuristic engine)
    pub rollouts: u32,
    /// Evaluator calls (guided engine)
    pub evaluations: u32,
    /// Simulations that reached an already won board
    pub terminal_hits: u32,
    /// Whether the search started from a retained tree
    pub reused_tree: bool,
    /// Shape of the tree after the search
    pub tree: Option<TreeStats>,
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best cell to fire at (most visited root child)
    pub action: Coord,

    /// Root children's visit counts normalized over all grid cells
    pub policy: Vec<f32>,

    /// Mean value at the root
    pub value: f32,

    /// Number of simulations performed
    pub simulations: u32,

    pub stats: SearchStats,
}

/// Generate Dirichlet-distributed noise using Gamma variates.
///
/// Draws `n` independent `Gamma(alpha, 1)` samples and normalizes them.
pub(crate) fn dirichlet_noise<R: Rng + ?Sized>(
    n: usize,
    alpha: f32,
    rng: &mut R,
) -> Result<Vec<f32>, SearchError> {
    let gamma = Gamma::new(alpha as f64, 1.0).map_err(|e| {
        SearchError::InvalidConfig(format!("dirichlet_alpha {alpha} rejected: {e}"))
    })?;
    let mut samples: Vec<f32> = (0..n).map(|_| gamma.sample(rng) as f32).collect();

    // Normalize
    let sum: f32 = samples.iter().sum();
    if sum > 0.0 {
        for s in &mut samples {
            *s /= sum;
        }
    } else if n > 0 {
        // Every variate underflowed; treat the noise as flat
        samples.fill(1.0 / n as f32);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_dirichlet_noise() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let noise = dirichlet_noise(5, 0.3, &mut rng).unwrap();

        // Should sum to 1.0
        let sum: f32 = noise.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);

        // All values should be non-negative
        for &n in &noise {
            assert!(n >= 0.0);
        }
    }

    #[test]
    fn test_dirichlet_noise_is_seeded() {
        let a = dirichlet_noise(8, 0.3, &mut ChaCha20Rng::seed_from_u64(1)).unwrap();
        let b = dirichlet_noise(8, 0.3, &mut ChaCha20Rng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dirichlet_rejects_bad_alpha() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert!(matches!(
            dirichlet_noise(3, -1.0, &mut rng),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_error_messages() {
        let c = Coord::new(1, 2).unwrap();
        assert_eq!(
            SearchError::IllegalMove(c).to_string(),
            "Cell (1, 2) has already been fired at"
        );
        let err: SearchError = EvaluatorError::ModelError("missing".into()).into();
        assert_eq!(err.to_string(), "Evaluator error: Model error: missing");
    }
}
