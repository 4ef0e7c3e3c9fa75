//! Contract of the external scoring model.
//!
//! A scoring model maps two per-card vectors to per-card raw scores:
//!
//! - `collection[i]`: copies of card `i` owned so far
//! - `pack[i]`: whether card `i` is available to be picked
//!
//! Both vectors are aligned by catalogue index and passed with an implied
//! `[1, n]` (batch size one) shape. The model answers with an ordered bundle of
//! named outputs; [`OutputKeys`] decides which one holds the scores.

use std::{fmt, sync::Arc};

use draftrank_catalogue::{Catalogue, OwnershipLedger};
use serde::{Deserialize, Serialize};

/// Name of the owned-copies input.
pub const COLLECTION_INPUT: &str = "collection";
/// Name of the availability input.
pub const PACK_INPUT: &str = "pack";

/// Input vectors for one model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInputs {
    collection: Vec<f32>,
    pack: Vec<f32>,
}

impl ModelInputs {
    /// Inputs for a context with no owned cards.
    #[must_use]
    pub fn empty(card_count: usize) -> Self {
        Self {
            collection: vec![0.0; card_count],
            pack: vec![1.0; card_count],
        }
    }

    /// Inputs for the current ownership state.
    ///
    /// Every card is treated as available: the engine rates the whole set as if
    /// it were one open pack rather than simulating real packs.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_ledger(catalogue: &Catalogue, ledger: &OwnershipLedger) -> Self {
        let mut inputs = Self::empty(catalogue.len());
        for (name, count) in ledger.collection() {
            if let Some(i) = catalogue.index_of(name) {
                inputs.collection[i] = count as f32;
            }
        }
        inputs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collection.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// Tensor shape of each input.
    #[must_use]
    pub fn shape(&self) -> [usize; 2] {
        [1, self.len()]
    }

    #[must_use]
    pub fn collection(&self) -> &[f32] {
        &self.collection
    }

    #[must_use]
    pub fn pack(&self) -> &[f32] {
        &self.pack
    }
}

/// Payload of one model output.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputData {
    F32(Vec<f32>),
    F64(Vec<f64>),
    /// An output that is not a numeric array (e.g. strings or a sequence type).
    NonNumeric {
        dtype: String,
    },
}

impl OutputData {
    /// The payload as `f32` scores, if it is numeric.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn to_scores(&self) -> Option<Vec<f32>> {
        match self {
            OutputData::F32(values) => Some(values.clone()),
            OutputData::F64(values) => Some(values.iter().map(|v| *v as f32).collect()),
            OutputData::NonNumeric { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedOutput {
    pub name: String,
    pub data: OutputData,
}

/// Outputs of one model invocation, in the order the model declares them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOutputs {
    outputs: Vec<NamedOutput>,
}

impl ModelOutputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, data: OutputData) -> Self {
        self.push(name, data);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, data: OutputData) {
        self.outputs.push(NamedOutput {
            name: name.into(),
            data,
        });
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NamedOutput> {
        self.outputs.iter().find(|o| o.name == name)
    }

    #[must_use]
    pub fn first(&self) -> Option<&NamedOutput> {
        self.outputs.first()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.outputs.iter().map(|o| o.name.as_str())
    }
}

/// How a score array was located in the model outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum OutputMatch {
    /// Matched one of the configured output names.
    Key,
    /// No configured name matched; the first output was used.
    FirstAvailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedOutput {
    pub name: String,
    pub scores: Vec<f32>,
    pub matched: OutputMatch,
}

/// Ordered list of output names accepted as the score array.
///
/// Names are tried in order; a name matches only if the output exists and is
/// numeric. When none match, the first output is used if it is numeric.
/// Otherwise there is no usable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputKeys(Vec<String>);

impl Default for OutputKeys {
    fn default() -> Self {
        Self(vec!["scores".to_owned(), "output".to_owned()])
    }
}

impl OutputKeys {
    #[must_use]
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn select(&self, outputs: &ModelOutputs) -> Option<SelectedOutput> {
        let keyed = self.iter().find_map(|key| {
            let output = outputs.get(key)?;
            Some((output, output.data.to_scores()?))
        });
        let (output, scores, matched) = match keyed {
            Some((output, scores)) => (output, scores, OutputMatch::Key),
            None => {
                let output = outputs.first()?;
                (output, output.data.to_scores()?, OutputMatch::FirstAvailable)
            }
        };
        Some(SelectedOutput {
            name: output.name.clone(),
            scores,
            matched,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ScoringError {
    #[display("model expects {expected} cards, got {actual}")]
    InputLength { expected: usize, actual: usize },
    #[display("inference failed: {message}")]
    Inference { message: String },
}

/// A model that produces raw pick scores.
///
/// Implementations may block; the [`ScoringAdapter`](crate::scoring_adapter::ScoringAdapter)
/// runs them off the async executor and bounds them with a timeout.
pub trait ScoringModel: fmt::Debug + Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Number of cards the model was trained on.
    fn input_len(&self) -> usize;

    /// Runs the model once.
    fn run(&self, inputs: &ModelInputs) -> Result<ModelOutputs, ScoringError>;
}

pub type SharedScoringModel = Arc<dyn ScoringModel>;
