//! ONNX Runtime evaluator for an exported policy/value network.
//!
//! # Model Format
//!
//! The ONNX model is expected to have:
//! - Input: "observation" - shape (batch_size, 3, 6, 6) float32, the
//!   hit/miss/unknown planes from [`BoardState::observation`]
//! - Output: "policy_logits" - shape (batch_size, 36) float32
//! - Output: "value" - shape (batch_size, 1) float32
//!
//! Logits of resolved cells are masked out before the softmax, so the policy
//! only ever puts mass on cells that can still be fired at.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use games_battleship::{BoardState, BOARD_SIZE, NUM_CELLS, OBS_PLANES};
use ort::{session::Session, value::Value};
use tracing::{debug, info};

use crate::evaluator::{EvalResult, Evaluator, EvaluatorError};

/// ONNX Runtime evaluator that loads and runs the policy/value model.
///
/// Uses a Mutex internally because `Session::run` requires `&mut self`,
/// but the `Evaluator` trait uses `&self` for thread-safe sharing.
pub struct OnnxEvaluator {
    session: Mutex<Session>,
    /// Number of boards evaluated (for diagnostics)
    inference_count: AtomicU64,
    /// Total inference time in microseconds (for diagnostics)
    total_inference_time_us: AtomicU64,
}

/// Inference counters accumulated by an [`OnnxEvaluator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OnnxStats {
    pub inferences: u64,
    pub avg_inference_us: u64,
}

impl std::fmt::Debug for OnnxEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEvaluator")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl OnnxEvaluator {
    /// Load an ONNX model from the given path.
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, EvaluatorError> {
        let model_path = model_path.as_ref();
        let session = Session::builder()
            .map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to create session builder: {}", e))
            })?
            .with_intra_threads(1)
            .map_err(|e| EvaluatorError::ModelError(format!("Failed to set intra threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| EvaluatorError::ModelError(format!("Failed to load model: {}", e)))?;

        info!(path = %model_path.display(), "Loaded ONNX policy/value model");

        Ok(Self {
            session: Mutex::new(session),
            inference_count: AtomicU64::new(0),
            total_inference_time_us: AtomicU64::new(0),
        })
    }

    pub fn stats(&self) -> OnnxStats {
        let inferences = self.inference_count.load(Ordering::Relaxed);
        let total_us = self.total_inference_time_us.load(Ordering::Relaxed);
        OnnxStats {
            inferences,
            avg_inference_us: total_us.checked_div(inferences).unwrap_or(0),
        }
    }

    /// Run the model on `boards` and return raw (logits, values).
    fn infer(&self, boards: &[&BoardState]) -> Result<(Vec<f32>, Vec<f32>), EvaluatorError> {
        let batch_size = boards.len();
        let mut flat_obs = Vec::with_capacity(batch_size * OBS_PLANES * NUM_CELLS);
        for board in boards {
            flat_obs.extend_from_slice(&board.observation());
        }

        let input_array = ndarray::Array4::from_shape_vec(
            (batch_size, OBS_PLANES, BOARD_SIZE, BOARD_SIZE),
            flat_obs,
        )
        .map_err(|e| EvaluatorError::EvaluationFailed(format!("Failed to shape input: {}", e)))?;

        let input_value = Value::from_array(input_array).map_err(|e| {
            EvaluatorError::ModelError(format!("Failed to create input tensor: {}", e))
        })?;

        // Run inference - extract all data inside the lock scope
        let inference_start = Instant::now();
        let (logits, values) = {
            let mut session = self.session.lock().map_err(|e| {
                EvaluatorError::EvaluationFailed(format!("Failed to acquire session lock: {}", e))
            })?;
            let outputs = session
                .run(ort::inputs!["observation" => input_value])
                .map_err(|e| {
                    EvaluatorError::EvaluationFailed(format!("Inference failed: {}", e))
                })?;

            let policy_output = outputs.get("policy_logits").ok_or_else(|| {
                EvaluatorError::ModelError("Missing policy_logits output".to_string())
            })?;
            let (_shape, policy_data) = policy_output.try_extract_tensor::<f32>().map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to extract policy tensor: {}", e))
            })?;

            let value_output = outputs
                .get("value")
                .ok_or_else(|| EvaluatorError::ModelError("Missing value output".to_string()))?;
            let (_shape, value_data) = value_output.try_extract_tensor::<f32>().map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to extract value tensor: {}", e))
            })?;

            (policy_data.to_vec(), value_data.to_vec())
        };

        if logits.len() != batch_size * NUM_CELLS || values.len() != batch_size {
            return Err(EvaluatorError::InvalidOutput(format!(
                "expected {} logits and {} values, got {} and {}",
                batch_size * NUM_CELLS,
                batch_size,
                logits.len(),
                values.len()
            )));
        }

        let elapsed_us = inference_start.elapsed().as_micros() as u64;
        self.total_inference_time_us
            .fetch_add(elapsed_us, Ordering::Relaxed);
        let count = self
            .inference_count
            .fetch_add(batch_size as u64, Ordering::Relaxed)
            + batch_size as u64;

        if count % 10_000 < batch_size as u64 {
            let stats = self.stats();
            debug!(
                inferences = stats.inferences,
                avg_us = stats.avg_inference_us,
                "ONNX inference stats"
            );
        }

        Ok((logits, values))
    }

    /// Apply softmax with masking for resolved cells.
    fn masked_softmax(logits: &[f32], legal_mask: u64) -> Vec<f32> {
        let mut max_logit = f32::NEG_INFINITY;
        for (i, &logit) in logits.iter().enumerate().take(NUM_CELLS) {
            if (legal_mask >> i) & 1 == 1 && logit > max_logit {
                max_logit = logit;
            }
        }

        // Handle case where no legal moves
        if max_logit == f32::NEG_INFINITY {
            return vec![0.0; NUM_CELLS];
        }

        let mut exp_sum = 0.0;
        let mut exp_values = vec![0.0; NUM_CELLS];

        for (i, &logit) in logits.iter().enumerate().take(NUM_CELLS) {
            if (legal_mask >> i) & 1 == 1 {
                let exp_val = (logit - max_logit).exp();
                exp_values[i] = exp_val;
                exp_sum += exp_val;
            }
        }

        if exp_sum > 0.0 {
            for v in &mut exp_values {
                *v /= exp_sum;
            }
        }

        exp_values
    }
}

impl Evaluator for OnnxEvaluator {
    fn evaluate(&self, board: &BoardState) -> Result<EvalResult, EvaluatorError> {
        let (logits, values) = self.infer(&[board])?;
        Ok(EvalResult {
            policy: Self::masked_softmax(&logits, board.legal_mask()),
            value: values[0].clamp(-1.0, 1.0),
        })
    }

    fn evaluate_batch(&self, boards: &[&BoardState]) -> Result<Vec<EvalResult>, EvaluatorError> {
        if boards.is_empty() {
            return Ok(Vec::new());
        }

        let (logits, values) = self.infer(boards)?;
        Ok(boards
            .iter()
            .zip(logits.chunks_exact(NUM_CELLS))
            .zip(values)
            .map(|((board, logits), value)| EvalResult {
                policy: Self::masked_softmax(logits, board.legal_mask()),
                value: value.clamp(-1.0, 1.0),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_softmax_all_legal() {
        let logits: Vec<f32> = (0..NUM_CELLS).map(|i| i as f32 * 0.1).collect();
        let mask = (1u64 << NUM_CELLS) - 1;
        let policy = OnnxEvaluator::masked_softmax(&logits, mask);

        let sum: f32 = policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);

        // Higher logit should have higher probability
        assert!(policy[35] > policy[1]);
        assert!(policy[1] > policy[0]);
    }

    #[test]
    fn test_masked_softmax_with_resolved_cells() {
        let mut board = BoardState::new();
        board.shoot(0, 1).unwrap();
        board.shoot(0, 3).unwrap();

        let logits = vec![1.0; NUM_CELLS];
        let policy = OnnxEvaluator::masked_softmax(&logits, board.legal_mask());

        let sum: f32 = policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(policy[1].abs() < 1e-6);
        assert!(policy[3].abs() < 1e-6);
        assert!((policy[0] - 1.0 / 34.0).abs() < 1e-6);
    }

    #[test]
    fn test_masked_softmax_no_legal() {
        let logits = vec![1.0; NUM_CELLS];
        let policy = OnnxEvaluator::masked_softmax(&logits, 0);

        for p in &policy {
            assert!(p.abs() < 1e-6);
        }
    }
}
