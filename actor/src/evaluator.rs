//! Evaluator used by the guided bot.
//!
//! Without a model the guided bot falls back to heatmap priors.

use anyhow::Result;
use games_battleship::BoardState;
use mcts::{EvalResult, Evaluator, EvaluatorError, HeatmapEvaluator};
use tracing::info;

#[cfg(feature = "onnx")]
use mcts::OnnxEvaluator;

pub enum ArenaEvaluator {
    Heatmap(HeatmapEvaluator),
    #[cfg(feature = "onnx")]
    Onnx(OnnxEvaluator),
}

impl ArenaEvaluator {
    /// Load the model at `model_path`, or use heatmap priors when there is none.
    pub fn load(model_path: Option<&str>, static_weight: f32, hunt_weight: f32) -> Result<Self> {
        match model_path {
            None => {
                info!("No model configured, guided bot uses heatmap priors");
                Ok(Self::Heatmap(HeatmapEvaluator::new(
                    static_weight,
                    hunt_weight,
                )))
            }
            #[cfg(feature = "onnx")]
            Some(path) => {
                let evaluator = OnnxEvaluator::load(path)?;
                info!(model = %path, "Loaded ONNX model for guided bot");
                Ok(Self::Onnx(evaluator))
            }
            #[cfg(not(feature = "onnx"))]
            Some(path) => Err(anyhow::anyhow!(
                "cannot load model {}: actor was built without the `onnx` feature",
                path
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Heatmap(_) => "heatmap",
            #[cfg(feature = "onnx")]
            Self::Onnx(_) => "onnx",
        }
    }
}

impl Evaluator for ArenaEvaluator {
    fn evaluate(&self, board: &BoardState) -> Result<EvalResult, EvaluatorError> {
        match self {
            Self::Heatmap(e) => e.evaluate(board),
            #[cfg(feature = "onnx")]
            Self::Onnx(e) => e.evaluate(board),
        }
    }

    fn evaluate_batch(&self, boards: &[&BoardState]) -> Result<Vec<EvalResult>, EvaluatorError> {
        match self {
            Self::Heatmap(e) => e.evaluate_batch(boards),
            #[cfg(feature = "onnx")]
            Self::Onnx(e) => e.evaluate_batch(boards),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_model_uses_heatmap() {
        let evaluator = ArenaEvaluator::load(None, 0.3, 0.7).unwrap();
        assert_eq!(evaluator.name(), "heatmap");

        let result = evaluator.evaluate(&BoardState::new()).unwrap();
        assert_eq!(result.policy.len(), 36);
        assert!(result.validate().is_ok());
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_model_without_feature_is_rejected() {
        let err = ArenaEvaluator::load(Some("model.onnx"), 0.3, 0.7)
            .err()
            .unwrap();
        assert!(err.to_string().contains("onnx"));
    }
}
