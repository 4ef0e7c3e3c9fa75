//! Where a set's card list and scoring model live.
//!
//! ```text
//! {data_dir}/cards/{SET}.csv
//! {data_dir}/models/{SET}_{MODE}.json
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// Event format a scoring model was trained for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftMode {
    #[default]
    Premier,
    Trad,
    PickTwo,
    PickTwoTrad,
}

impl DraftMode {
    pub const ALL: [DraftMode; 4] = [
        DraftMode::Premier,
        DraftMode::Trad,
        DraftMode::PickTwo,
        DraftMode::PickTwoTrad,
    ];

    /// Suffix of the model file name.
    #[must_use]
    pub const fn file_suffix(self) -> &'static str {
        match self {
            DraftMode::Premier => "Premier",
            DraftMode::Trad => "Trad",
            DraftMode::PickTwo => "PickTwo",
            DraftMode::PickTwoTrad => "PickTwoTrad",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DraftMode::Premier => "premier",
            DraftMode::Trad => "trad",
            DraftMode::PickTwo => "pick_two",
            DraftMode::PickTwoTrad => "pick_two_trad",
        }
    }
}

impl fmt::Display for DraftMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown draft mode '{value}'")]
pub struct ParseDraftModeError {
    pub value: String,
}

impl FromStr for DraftMode {
    type Err = ParseDraftModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        DraftMode::ALL
            .into_iter()
            .find(|mode| {
                mode.as_str() == normalized || mode.file_suffix().eq_ignore_ascii_case(s.trim())
            })
            .ok_or_else(|| ParseDraftModeError {
                value: s.to_owned(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRegistry {
    data_dir: PathBuf,
    mode: DraftMode,
    set_order: Vec<String>,
}

impl SetRegistry {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, mode: DraftMode, set_order: Vec<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            mode,
            set_order,
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.data_dir.clone(),
            config.draft_mode,
            config.set_order.clone(),
        )
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    #[must_use]
    pub fn card_list_path(&self, set_code: &str) -> PathBuf {
        self.data_dir.join("cards").join(format!("{set_code}.csv"))
    }

    #[must_use]
    pub fn model_path(&self, set_code: &str) -> PathBuf {
        self.data_dir
            .join("models")
            .join(format!("{set_code}_{}.json", self.mode.file_suffix()))
    }

    /// Every configured set code, newest first, whether or not a model exists.
    pub fn known_sets(&self) -> impl Iterator<Item = &str> {
        self.set_order.iter().map(String::as_str)
    }

    /// Sets with a model for the current mode, newest first.
    #[must_use]
    pub fn available_sets(&self) -> Vec<&str> {
        self.known_sets()
            .filter(|set| self.model_path(set).is_file())
            .collect()
    }

    /// The set selected when none is requested.
    #[must_use]
    pub fn default_set(&self) -> Option<&str> {
        self.available_sets().first().copied()
    }
}
