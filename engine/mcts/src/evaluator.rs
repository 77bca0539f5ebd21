//! Evaluator trait for position evaluation.
//!
//! The evaluator provides priors (a probability per grid cell) and a value
//! estimate for a board. The guided engine has no other source of priors, so
//! every evaluator error aborts the search call that triggered it.

use games_battleship::{BoardState, NUM_CELLS};
use thiserror::Error;

use crate::heatmap::Heatmap;

/// Allowed deviation of the policy sum from 1.
const POLICY_SUM_TOLERANCE: f32 = 1e-3;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid evaluator output: {0}")]
    InvalidOutput(String),

    #[error("Model error: {0}")]
    ModelError(String),
}

/// Result of evaluating a board.
#[derive(Debug, Clone)]
pub struct EvalResult {
    /// Policy: probability distribution over grid cells.
    /// Index i corresponds to `Coord::from_index(i)`, values should sum to ~1.0.
    pub policy: Vec<f32>,

    /// Expected outcome for the shooting side, in [-1, 1].
    pub value: f32,
}

impl EvalResult {
    /// Reject output the search cannot use: wrong policy length, non-finite
    /// numbers, a policy that is not a probability distribution or a value
    /// outside [-1, 1].
    pub fn validate(&self) -> Result<(), EvaluatorError> {
        if self.policy.len() != NUM_CELLS {
            return Err(EvaluatorError::InvalidOutput(format!(
                "policy has {} entries, expected {}",
                self.policy.len(),
                NUM_CELLS
            )));
        }
        if let Some(i) = self.policy.iter().position(|p| !p.is_finite()) {
            return Err(EvaluatorError::InvalidOutput(format!(
                "policy entry {i} is not finite"
            )));
        }
        if let Some(i) = self.policy.iter().position(|&p| p < 0.0) {
            return Err(EvaluatorError::InvalidOutput(format!(
                "policy entry {i} is negative ({})",
                self.policy[i]
            )));
        }
        let total: f32 = self.policy.iter().sum();
        if (total - 1.0).abs() > POLICY_SUM_TOLERANCE {
            return Err(EvaluatorError::InvalidOutput(format!(
                "policy sums to {total}, expected 1"
            )));
        }
        if !self.value.is_finite() || !(-1.0..=1.0).contains(&self.value) {
            return Err(EvaluatorError::InvalidOutput(format!(
                "value {} is outside [-1, 1]",
                self.value
            )));
        }
        Ok(())
    }
}

/// Trait for position evaluators.
///
/// Implementations could be:
/// - UniformEvaluator: Returns uniform policy (for testing)
/// - HeatmapEvaluator: Placement-density priors, no model required
/// - OnnxEvaluator: Exported policy/value network (`onnx` feature)
/// - Any `Fn(&BoardState) -> Result<EvalResult, EvaluatorError>`
pub trait Evaluator: Send + Sync {
    /// Evaluate a single board.
    fn evaluate(&self, board: &BoardState) -> Result<EvalResult, EvaluatorError>;

    /// Batch evaluate multiple boards (optional optimization).
    /// Default implementation calls evaluate() in a loop.
    fn evaluate_batch(&self, boards: &[&BoardState]) -> Result<Vec<EvalResult>, EvaluatorError> {
        boards.iter().map(|board| self.evaluate(board)).collect()
    }
}

impl<F> Evaluator for F
where
    F: Fn(&BoardState) -> Result<EvalResult, EvaluatorError> + Send + Sync,
{
    fn evaluate(&self, board: &BoardState) -> Result<EvalResult, EvaluatorError> {
        self(board)
    }
}

/// Uniform evaluator that assigns equal probability to all legal moves.
/// Value is always 0.0 (neutral). Useful for testing MCTS without a model.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, board: &BoardState) -> Result<EvalResult, EvaluatorError> {
        let mut policy = vec![0.0; NUM_CELLS];
        let legal_mask = board.legal_mask();

        let num_legal = legal_mask.count_ones() as f32;
        if num_legal == 0.0 {
            // Nothing left to shoot
            return Ok(EvalResult { policy, value: 0.0 });
        }

        let prob = 1.0 / num_legal;
        for (i, p) in policy.iter_mut().enumerate() {
            if (legal_mask >> i) & 1 == 1 {
                *p = prob;
            }
        }

        Ok(EvalResult { policy, value: 0.0 })
    }
}

/// Uses the placement heatmap restricted to legal cells as priors, with a
/// neutral value. Lets the guided engine play without a trained model.
#[derive(Debug, Clone)]
pub struct HeatmapEvaluator {
    static_weight: f32,
    hunt_weight: f32,
}

impl HeatmapEvaluator {
    pub fn new(static_weight: f32, hunt_weight: f32) -> Self {
        Self {
            static_weight,
            hunt_weight,
        }
    }
}

impl Default for HeatmapEvaluator {
    fn default() -> Self {
        Self::new(0.3, 0.7)
    }
}

impl Evaluator for HeatmapEvaluator {
    fn evaluate(&self, board: &BoardState) -> Result<EvalResult, EvaluatorError> {
        let heatmap = Heatmap::compute(board, self.static_weight, self.hunt_weight);
        let legal_mask = board.legal_mask();

        let mut policy: Vec<f32> = heatmap
            .weights()
            .iter()
            .enumerate()
            .map(|(i, &w)| if (legal_mask >> i) & 1 == 1 { w } else { 0.0 })
            .collect();

        let total: f32 = policy.iter().sum();
        if total > 0.0 {
            for p in &mut policy {
                *p /= total;
            }
            Ok(EvalResult { policy, value: 0.0 })
        } else {
            // No placement fits any more; fall back to uniform
            UniformEvaluator.evaluate(board)
        }
    }
}
