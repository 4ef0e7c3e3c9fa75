//! Pairwise-synergy scoring model stored as JSON.
//!
//! For card `i` the raw score is
//!
//! ```text
//! score[i] = pack[i] * (bias[i] + Σ_j collection[j] * weight(j → i))
//! ```
//!
//! where `weight(j → i)` is how much owning a copy of card `j` increases the
//! value of card `i`. Unlisted pairs have weight zero.

use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring_model::{ModelInputs, ModelOutputs, OutputData, ScoringError, ScoringModel};

fn default_output_name() -> String {
    "scores".to_owned()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinearScoringModel {
    pub name: String,
    pub set_code: String,
    pub trained_at: DateTime<Utc>,
    #[serde(default = "default_output_name")]
    pub output_name: String,
    /// Per-card score with an empty collection, in catalogue order.
    pub biases: Vec<f32>,
    #[serde(default)]
    pub synergies: Vec<SynergyWeight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SynergyWeight {
    /// Catalogue index of the owned card.
    pub owned: usize,
    /// Catalogue index of the card whose score changes.
    pub target: usize,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InvalidModel {
    #[display("model has no cards")]
    NoCards,
    #[display("synergy {position} refers to card {index}, but the model has {len} cards")]
    IndexOutOfRange {
        position: usize,
        index: usize,
        len: usize,
    },
    #[display("bias of card {index} is not finite")]
    NonFiniteBias { index: usize },
    #[display("weight of synergy {position} is not finite")]
    NonFiniteWeight { position: usize },
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ModelLoadError {
    #[display("failed to open scoring model {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("failed to parse scoring model {}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("invalid scoring model {}", path.display())]
    Invalid { path: PathBuf, source: InvalidModel },
}

impl LinearScoringModel {
    pub fn open<P>(path: P) -> Result<Self, ModelLoadError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelLoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        let reader = BufReader::new(file);
        let model: Self = serde_json::from_reader(reader).map_err(|source| ModelLoadError::Parse {
            path: path.to_owned(),
            source,
        })?;
        model.validate().map_err(|source| ModelLoadError::Invalid {
            path: path.to_owned(),
            source,
        })?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), InvalidModel> {
        let len = self.biases.len();
        if len == 0 {
            return Err(InvalidModel::NoCards);
        }
        if let Some(index) = self.biases.iter().position(|b| !b.is_finite()) {
            return Err(InvalidModel::NonFiniteBias { index });
        }
        for (position, synergy) in self.synergies.iter().enumerate() {
            for index in [synergy.owned, synergy.target] {
                if index >= len {
                    return Err(InvalidModel::IndexOutOfRange {
                        position,
                        index,
                        len,
                    });
                }
            }
            if !synergy.weight.is_finite() {
                return Err(InvalidModel::NonFiniteWeight { position });
            }
        }
        Ok(())
    }

    fn scores(&self, inputs: &ModelInputs) -> Vec<f32> {
        let collection = inputs.collection();
        let mut scores = self.biases.clone();
        for synergy in &self.synergies {
            scores[synergy.target] += collection[synergy.owned] * synergy.weight;
        }
        for (score, available) in scores.iter_mut().zip(inputs.pack()) {
            *score *= available;
        }
        scores
    }
}

impl ScoringModel for LinearScoringModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_len(&self) -> usize {
        self.biases.len()
    }

    fn run(&self, inputs: &ModelInputs) -> Result<ModelOutputs, ScoringError> {
        if inputs.len() != self.input_len() {
            return Err(ScoringError::InputLength {
                expected: self.input_len(),
                actual: inputs.len(),
            });
        }
        Ok(ModelOutputs::new().with(self.output_name.clone(), OutputData::F32(self.scores(inputs))))
    }
}
