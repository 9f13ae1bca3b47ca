//! Backend system status: model inventory and training dataset.
//!
//! Both payloads are informational. The CLI turns them into a status card
//! with a coarse availability level for each.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A real dataset above this many samples is production ready.
pub const READY_MIN_SAMPLES: u32 = 500;
/// Above this many samples a dataset is usable but limited.
pub const LIMITED_MIN_SAMPLES: u32 = 100;

/// One entry of `available_models`. Older backends report a bare flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelEntry {
    Flag(bool),
    Detail {
        #[serde(default)]
        loaded: bool,
        #[serde(default)]
        status: String,
    },
}

impl ModelEntry {
    pub fn is_loaded(&self) -> bool {
        match self {
            Self::Flag(loaded) => *loaded,
            Self::Detail { loaded, .. } => *loaded,
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            Self::Detail { status, .. } if !status.is_empty() => Some(status),
            _ => None,
        }
    }
}

/// Human name for a model key.
pub fn model_display_name(key: &str) -> &str {
    match key {
        "random_forest" => "Random Forest",
        "deep_learning" => "CNN/TensorFlow",
        "feature_scaler" => "Feature Scaler",
        "ocr_analyzer" => "Tesseract OCR",
        other => other,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsSummary {
    pub loaded_count: u32,
    pub total_count: u32,
    #[serde(default)]
    pub found_count: u32,
    #[serde(default)]
    pub load_percentage: f64,
    #[serde(default)]
    pub status: String,
}

/// Payload of `/api/models/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsInfo {
    #[serde(default)]
    pub models_loaded: bool,
    #[serde(default)]
    pub available_models: BTreeMap<String, ModelEntry>,
    pub summary: Option<ModelsSummary>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelAvailability {
    AllLoaded,
    Partial,
    NoneLoaded,
}

impl ModelAvailability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllLoaded => "all loaded",
            Self::Partial => "partial",
            Self::NoneLoaded => "none loaded",
        }
    }
}

impl ModelsInfo {
    /// `(loaded, listed)` over `available_models`.
    pub fn loaded_count(&self) -> (usize, usize) {
        let loaded = self
            .available_models
            .values()
            .filter(|m| m.is_loaded())
            .count();
        (loaded, self.available_models.len())
    }

    pub fn availability(&self) -> ModelAvailability {
        if self.available_models.is_empty() {
            return if self.models_loaded {
                ModelAvailability::AllLoaded
            } else {
                ModelAvailability::NoneLoaded
            };
        }
        match self.loaded_count() {
            (0, _) => ModelAvailability::NoneLoaded,
            (loaded, total) if loaded == total => ModelAvailability::AllLoaded,
            _ => ModelAvailability::Partial,
        }
    }
}

/// Payload of `/api/dataset/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// `real` when image folders were found, `demo` otherwise.
    pub dataset_type: String,
    pub total_samples: u32,
    #[serde(default)]
    pub genuine_samples: u32,
    #[serde(default)]
    pub fake_samples: u32,
    /// Genuine samples per fake sample.
    #[serde(default)]
    pub balance_ratio: f64,
    #[serde(default)]
    pub ready_for_training: bool,
    #[serde(default)]
    pub quality: String,
    pub last_updated: Option<NaiveDateTime>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetReadiness {
    Ready,
    Limited,
    Minimal,
    Empty,
}

impl DatasetReadiness {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Limited => "limited",
            Self::Minimal => "minimal",
            Self::Empty => "no data",
        }
    }
}

impl DatasetInfo {
    pub fn is_real(&self) -> bool {
        self.dataset_type == "real"
    }

    /// Only a real dataset can be `Ready`; demo data tops out at `Limited`.
    pub fn readiness(&self) -> DatasetReadiness {
        match self.total_samples {
            n if n > READY_MIN_SAMPLES && self.is_real() => DatasetReadiness::Ready,
            n if n > LIMITED_MIN_SAMPLES => DatasetReadiness::Limited,
            0 => DatasetReadiness::Empty,
            _ => DatasetReadiness::Minimal,
        }
    }
}
