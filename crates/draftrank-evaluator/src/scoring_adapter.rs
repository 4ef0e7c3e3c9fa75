//! Guarded invocation of the scoring model.
//!
//! [`ScoringAdapter::score`] never fails: every way the model can fall short
//! (no model loaded, inference error, panic, timeout, unusable output) yields
//! a neutral score vector tagged with the [`FallbackReason`], and the reason
//! is logged as a warning.

use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::{
    linear_model::{LinearScoringModel, ModelLoadError},
    scoring_model::{ModelInputs, ModelOutputs, OutputKeys, ScoringModel, SharedScoringModel},
};

/// Raw score assigned to every card when the model cannot be used.
pub const NEUTRAL_SCORE: f32 = 50.0;

pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MODEL_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum FallbackReason {
    #[display("no scoring model is loaded")]
    ModelUnavailable,
    #[display("inference timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },
    #[display("inference failed: {message}")]
    ModelFailed { message: String },
    #[display("inference panicked")]
    ModelPanicked,
    #[display("model produced no numeric output")]
    NoUsableOutput,
    #[display("model produced {actual} scores for {expected} cards")]
    LengthMismatch { expected: usize, actual: usize },
    #[display("model produced a non-finite score for card {index}")]
    NonFiniteScore { index: usize },
}

/// Where a score vector came from.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum ScoreSource {
    #[display("model output '{output}'")]
    Model { output: String },
    #[display("neutral fallback ({_0})")]
    Fallback(FallbackReason),
}

impl ScoreSource {
    #[must_use]
    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            ScoreSource::Model { .. } => None,
            ScoreSource::Fallback(reason) => Some(reason),
        }
    }
}

/// Raw per-card scores aligned with catalogue order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    pub scores: Vec<f32>,
    pub source: ScoreSource,
}

impl ScoreVector {
    #[must_use]
    pub fn neutral(len: usize, reason: FallbackReason) -> Self {
        Self {
            scores: vec![NEUTRAL_SCORE; len],
            source: ScoreSource::Fallback(reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoringAdapter {
    model: Option<SharedScoringModel>,
    output_keys: OutputKeys,
    inference_timeout: Duration,
}

impl Default for ScoringAdapter {
    fn default() -> Self {
        Self::unavailable()
    }
}

impl ScoringAdapter {
    #[must_use]
    pub fn new(
        model: Option<SharedScoringModel>,
        output_keys: OutputKeys,
        inference_timeout: Duration,
    ) -> Self {
        Self {
            model,
            output_keys,
            inference_timeout,
        }
    }

    /// An adapter without a model; every call yields neutral scores.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(None, OutputKeys::default(), DEFAULT_INFERENCE_TIMEOUT)
    }

    #[must_use]
    pub fn with_model(model: SharedScoringModel) -> Self {
        Self::new(Some(model), OutputKeys::default(), DEFAULT_INFERENCE_TIMEOUT)
    }

    #[must_use]
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    #[must_use]
    pub fn inference_timeout(&self) -> Duration {
        self.inference_timeout
    }

    /// Scores `inputs`, returning exactly `inputs.len()` finite values.
    ///
    /// The model runs on the blocking thread pool. A call that outlives the
    /// inference timeout is abandoned: its result is discarded whenever it
    /// eventually finishes.
    pub async fn score(&self, inputs: ModelInputs) -> ScoreVector {
        let len = inputs.len();
        let Some(model) = self.model.clone() else {
            return fallback(None, len, FallbackReason::ModelUnavailable);
        };
        let name = model.name().to_owned();

        let task = tokio::task::spawn_blocking(move || model.run(&inputs));
        let outputs = match tokio::time::timeout(self.inference_timeout, task).await {
            Err(_) => {
                return fallback(Some(&name), len, FallbackReason::Timeout {
                    after: self.inference_timeout,
                });
            }
            Ok(Err(_)) => return fallback(Some(&name), len, FallbackReason::ModelPanicked),
            Ok(Ok(Err(e))) => {
                return fallback(Some(&name), len, FallbackReason::ModelFailed {
                    message: e.to_string(),
                });
            }
            Ok(Ok(Ok(outputs))) => outputs,
        };

        self.extract(&name, len, &outputs)
    }

    fn extract(&self, model: &str, len: usize, outputs: &ModelOutputs) -> ScoreVector {
        let Some(selected) = self.output_keys.select(outputs) else {
            return fallback(Some(model), len, FallbackReason::NoUsableOutput);
        };
        if selected.matched.is_first_available() {
            tracing::debug!(
                model,
                output = %selected.name,
                available = ?outputs.names().collect::<Vec<_>>(),
                "no configured output name matched; using first output"
            );
        }
        if selected.scores.len() != len {
            return fallback(Some(model), len, FallbackReason::LengthMismatch {
                expected: len,
                actual: selected.scores.len(),
            });
        }
        if let Some(index) = selected.scores.iter().position(|s| !s.is_finite()) {
            return fallback(Some(model), len, FallbackReason::NonFiniteScore { index });
        }
        ScoreVector {
            scores: selected.scores,
            source: ScoreSource::Model {
                output: selected.name,
            },
        }
    }
}

fn fallback(model: Option<&str>, len: usize, reason: FallbackReason) -> ScoreVector {
    tracing::warn!(model, %reason, cards = len, "using neutral scores");
    ScoreVector::neutral(len, reason)
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ModelOpenError {
    #[display("scoring model could not be loaded")]
    Load(ModelLoadError),
    #[display("loading scoring model {} timed out after {}ms", path.display(), after.as_millis())]
    Timeout { path: PathBuf, after: Duration },
    #[display("loading scoring model {} panicked", path.display())]
    Panicked { path: PathBuf },
}

/// Loads a [`LinearScoringModel`] on the blocking pool, bounded by `timeout`.
pub async fn open_model(
    path: PathBuf,
    timeout: Duration,
) -> Result<SharedScoringModel, ModelOpenError> {
    let load_path = path.clone();
    let task = tokio::task::spawn_blocking(move || LinearScoringModel::open(load_path));
    match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(ModelOpenError::Timeout {
            path,
            after: timeout,
        }),
        Ok(Err(_)) => Err(ModelOpenError::Panicked { path }),
        Ok(Ok(Err(e))) => Err(ModelOpenError::Load(e)),
        Ok(Ok(Ok(model))) => {
            tracing::info!(
                model = model.name(),
                cards = model.biases.len(),
                trained_at = %model.trained_at,
                path = %path.display(),
                "loaded scoring model"
            );
            Ok(Arc::new(model))
        }
    }
}
