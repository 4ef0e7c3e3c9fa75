use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use draftrank_evaluator::{filter::DeckOnlyDisplay, scoring_model::OutputKeys};
use serde::{Deserialize, Serialize};

use crate::set_registry::DraftMode;

/// Sets in release order, newest first.
pub const DEFAULT_SET_ORDER: [&str; 21] = [
    "FIN", "TDM", "DFT", "PIO", "FDN", "DSK", "BLB", "MH3", "OTJ", "MKM", "KTK", "LCI", "WOE", "LTR",
    "MOM", "SIR", "SNC", "NEO", "ONE", "BRO", "DMU",
];

/// Engine settings, usually read from a JSON file.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root holding `cards/{SET}.csv` and `models/{SET}_{MODE}.json`.
    pub data_dir: PathBuf,
    pub draft_mode: DraftMode,
    pub set_order: Vec<String>,
    pub model_load_timeout_ms: u64,
    pub inference_timeout_ms: u64,
    pub output_keys: OutputKeys,
    pub default_limit: usize,
    pub deck_only_display: DeckOnlyDisplay,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            draft_mode: DraftMode::default(),
            set_order: DEFAULT_SET_ORDER.iter().map(|s| (*s).to_owned()).collect(),
            model_load_timeout_ms: 30_000,
            inference_timeout_ms: 15_000,
            output_keys: OutputKeys::default(),
            default_limit: draftrank_evaluator::filter::DEFAULT_LIMIT,
            deck_only_display: DeckOnlyDisplay::default(),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("failed to open config file {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

impl EngineConfig {
    pub fn open<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_load_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "model_load_timeout_ms",
            });
        }
        if self.inference_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "inference_timeout_ms",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn model_load_timeout(&self) -> Duration {
        Duration::from_millis(self.model_load_timeout_ms)
    }

    #[must_use]
    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }
}
