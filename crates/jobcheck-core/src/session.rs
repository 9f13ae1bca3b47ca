//! One analysis round for one uploaded file.
//!
//! Each step produces a new [`AnalysisSession`] rather than mutating shared
//! state, so a verdict is always computed from an explicit snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateResult, Aggregator};
use crate::ocr::OcrExtraction;
use crate::score::Score;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub file_name: String,
    pub started_at: DateTime<Utc>,
    pub image: Option<Score>,
    pub ocr: Option<OcrExtraction>,
    /// User-corrected text, replacing the OCR text for text analysis.
    pub edited_text: Option<String>,
    pub text: Option<Score>,
}

impl AnalysisSession {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            started_at: Utc::now(),
            image: None,
            ocr: None,
            edited_text: None,
            text: None,
        }
    }

    /// Snapshot with the image-model score set.
    #[must_use]
    pub fn with_image_score(&self, raw: f64, prediction: Option<String>) -> Self {
        Self {
            image: Some(Score {
                prediction,
                ..Score::image(raw)
            }),
            ..self.clone()
        }
    }

    /// Snapshot with fresh OCR output. Any earlier edit and text score are
    /// dropped, since they were based on the previous extraction.
    #[must_use]
    pub fn with_ocr(&self, ocr: OcrExtraction) -> Self {
        Self {
            ocr: Some(ocr),
            edited_text: None,
            text: None,
            ..self.clone()
        }
    }

    /// Snapshot with user-corrected text. The text score is dropped until the
    /// corrected text is analysed again.
    #[must_use]
    pub fn with_edited_text(&self, text: impl Into<String>) -> Self {
        Self {
            edited_text: Some(text.into()),
            text: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_text_score(&self, raw: f64, prediction: Option<String>) -> Self {
        Self {
            text: Some(Score {
                prediction,
                ..Score::text(raw)
            }),
            ..self.clone()
        }
    }

    /// Text to send for text analysis: the user's correction if any, else OCR output.
    pub fn analysis_text(&self) -> Option<&str> {
        self.edited_text
            .as_deref()
            .or_else(|| self.ocr.as_ref().map(|o| o.text.as_str()))
            .filter(|t| !t.trim().is_empty())
    }

    pub fn verdict(&self) -> AggregateResult {
        self.verdict_with(&Aggregator::default())
    }

    pub fn verdict_with(&self, aggregator: &Aggregator) -> AggregateResult {
        aggregator.aggregate(
            self.image.as_ref().map(|s| s.raw),
            self.text.as_ref().map(|s| s.raw),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{SourceLabel, Weights};
    use crate::score::SourceKind;
    use crate::verdict::VerdictTier;

    #[test]
    fn empty_session_defaults() {
        let s = AnalysisSession::new("poster.png");
        let v = s.verdict();
        assert_eq!(v.source_label, SourceLabel::Default);
        assert_eq!(v.final_confidence.value(), 50);
        assert!(s.analysis_text().is_none());
    }

    #[test]
    fn steps_do_not_touch_previous_snapshot() {
        let s0 = AnalysisSession::new("poster.png");
        let s1 = s0.with_image_score(0.9, Some("genuine".into()));
        assert!(s0.image.is_none());
        assert_eq!(s1.verdict().source_label, SourceLabel::MlOnly);

        let s2 = s1.with_text_score(0.5, None);
        assert_eq!(s1.verdict().final_confidence.value(), 90);
        assert_eq!(s2.verdict().final_confidence.value(), 74);
        assert_eq!(s2.verdict().tier, VerdictTier::Uncertain);
    }

    #[test]
    fn editing_text_invalidates_text_score() {
        let s = AnalysisSession::new("poster.png")
            .with_image_score(0.9, None)
            .with_ocr(OcrExtraction::new("Hiring drivers, fee required", 55.0, "Standard OCR"))
            .with_text_score(0.2, None);
        assert_eq!(s.analysis_text(), Some("Hiring drivers, fee required"));
        assert_eq!(s.verdict().source_label, SourceLabel::Combined);

        let edited = s.with_edited_text("Hiring drivers, registration fee required upfront");
        assert!(edited.text.is_none());
        assert_eq!(
            edited.analysis_text(),
            Some("Hiring drivers, registration fee required upfront")
        );
        assert_eq!(edited.verdict().source_label, SourceLabel::MlOnly);

        let rescored = edited.with_text_score(0.1, None);
        // 90 * 0.6 + 10 * 0.4 = 58
        assert_eq!(rescored.verdict().final_confidence.value(), 58);
    }

    #[test]
    fn new_ocr_discards_edit() {
        let s = AnalysisSession::new("poster.png")
            .with_ocr(OcrExtraction::new("first pass", 40.0, "Standard OCR"))
            .with_edited_text("corrected")
            .with_ocr(OcrExtraction::new("second pass", 80.0, "Standard OCR"));
        assert!(s.edited_text.is_none());
        assert_eq!(s.analysis_text(), Some("second pass"));
    }

    #[test]
    fn blank_text_is_not_analysable() {
        let s = AnalysisSession::new("poster.png").with_edited_text("   \n ");
        assert!(s.analysis_text().is_none());
    }

    #[test]
    fn scores_land_in_their_own_slot() {
        let s = AnalysisSession::new("poster.png")
            .with_image_score(0.3, Some("fake".into()))
            .with_text_score(0.8, Some("genuine".into()));
        let image = s.image.as_ref().unwrap();
        let text = s.text.as_ref().unwrap();
        assert_eq!(image.source_kind, SourceKind::Image);
        assert_eq!(image.prediction.as_deref(), Some("fake"));
        assert_eq!(text.source_kind, SourceKind::Text);
        assert_eq!(text.prediction.as_deref(), Some("genuine"));
        assert_eq!(s.verdict().breakdown.ml_percent.map(|p| p.value()), Some(30));
    }

    #[test]
    fn verdict_with_custom_weights() {
        let s = AnalysisSession::new("poster.png")
            .with_image_score(1.0, None)
            .with_text_score(0.0, None);
        let agg = Aggregator::new(Weights::new(0.3, 0.7).unwrap());
        assert_eq!(s.verdict_with(&agg).final_confidence.value(), 30);
        assert_eq!(s.verdict().final_confidence.value(), 60);
    }
}
