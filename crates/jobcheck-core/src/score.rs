//! Scores reported by the analysis backends.

use serde::{Deserialize, Serialize};

use crate::confidence::{CanonicalConfidence, normalize};

/// Which analysis produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Image model (random forest / CNN ensemble on the uploaded file).
    Image,
    /// Text classifier run on OCR output or user-corrected text.
    Text,
}

/// One confidence value from one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// As reported: a fraction in `[0, 1]` or a percentage in `(1, 100]`.
    pub raw: f64,
    pub source_kind: SourceKind,
    /// Label the model attached, e.g. `genuine` or `fake`.
    pub prediction: Option<String>,
}

impl Score {
    pub fn image(raw: f64) -> Self {
        Self {
            raw,
            source_kind: SourceKind::Image,
            prediction: None,
        }
    }

    pub fn text(raw: f64) -> Self {
        Self {
            raw,
            source_kind: SourceKind::Text,
            prediction: None,
        }
    }

    pub fn with_prediction(mut self, prediction: impl Into<String>) -> Self {
        self.prediction = Some(prediction.into());
        self
    }

    pub fn canonical(&self) -> CanonicalConfidence {
        normalize(self.raw)
    }
}
