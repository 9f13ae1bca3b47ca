//! Weighted combination of image and text scores into one verdict.
//!
//! When both sources report, the final confidence is
//! `round(ml% * w_ml + text% * w_text)` with default weights 0.6 / 0.4. With a
//! single source that source's confidence is used as-is, and with none the
//! verdict falls back to the 50% midpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::confidence::{CanonicalConfidence, normalize};
use crate::verdict::{VerdictTier, classify};

/// Default weight of the image model in a combined verdict.
pub const DEFAULT_ML_WEIGHT: f64 = 0.6;
/// Default weight of the text classifier in a combined verdict.
pub const DEFAULT_TEXT_WEIGHT: f64 = 0.4;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight {name} must be a finite non-negative number, got {value}")]
    Invalid { name: &'static str, value: f64 },
    #[error("weights must sum to 1, got {0}")]
    BadSum(f64),
}

/// Relative weights of the two sources in a combined verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct Weights {
    ml: f64,
    text: f64,
}

#[derive(Deserialize)]
struct RawWeights {
    ml: f64,
    text: f64,
}

impl TryFrom<RawWeights> for Weights {
    type Error = WeightsError;

    fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
        Self::new(raw.ml, raw.text)
    }
}

impl Weights {
    pub fn new(ml: f64, text: f64) -> Result<Self, WeightsError> {
        for (name, value) in [("ml", ml), ("text", text)] {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::Invalid { name, value });
            }
        }
        let sum = ml + text;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::BadSum(sum));
        }
        Ok(Self { ml, text })
    }

    /// Weights with the given ML share; text gets the remainder.
    pub fn from_ml_share(ml: f64) -> Result<Self, WeightsError> {
        Self::new(ml, 1.0 - ml)
    }

    pub fn ml(&self) -> f64 {
        self.ml
    }

    pub fn text(&self) -> f64 {
        self.text
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            ml: DEFAULT_ML_WEIGHT,
            text: DEFAULT_TEXT_WEIGHT,
        }
    }
}

/// Which inputs produced an [`AggregateResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceLabel {
    #[serde(rename = "Combined ML + Text Analysis")]
    Combined,
    #[serde(rename = "Text Analysis Only")]
    TextOnly,
    #[serde(rename = "Machine Learning Only")]
    MlOnly,
    #[serde(rename = "Default")]
    Default,
}

impl SourceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Combined => "Combined ML + Text Analysis",
            Self::TextOnly => "Text Analysis Only",
            Self::MlOnly => "Machine Learning Only",
            Self::Default => "Default",
        }
    }
}

/// Per-source canonical confidences behind a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub ml_percent: Option<CanonicalConfidence>,
    pub text_percent: Option<CanonicalConfidence>,
}

/// Outcome of one aggregation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub final_confidence: CanonicalConfidence,
    pub tier: VerdictTier,
    pub source_label: SourceLabel,
    pub breakdown: Breakdown,
    pub weights: Weights,
}

impl AggregateResult {
    pub fn is_combined(&self) -> bool {
        self.source_label == SourceLabel::Combined
    }

    /// `"(ML × 60%) + (Text × 40%) = 74%"`, only for combined verdicts.
    pub fn formula(&self) -> Option<String> {
        if !self.is_combined() {
            return None;
        }
        Some(format!(
            "(ML × {}%) + (Text × {}%) = {}%",
            as_percent(self.weights.ml),
            as_percent(self.weights.text),
            self.final_confidence
        ))
    }

    /// `"(90% × 0.6) + (50% × 0.4) = 74%"`, only for combined verdicts.
    pub fn formula_detail(&self) -> Option<String> {
        let ml = self.breakdown.ml_percent?;
        let text = self.breakdown.text_percent?;
        Some(format!(
            "({}% × {}) + ({}% × {}) = {}%",
            ml,
            as_fraction(self.weights.ml),
            text,
            as_fraction(self.weights.text),
            self.final_confidence
        ))
    }

    pub fn headline(&self) -> &'static str {
        self.tier.presentation().headline
    }

    pub fn description(&self) -> String {
        self.tier.describe(self.final_confidence)
    }
}

fn as_percent(weight: f64) -> i64 {
    (weight * 100.0).round() as i64
}

/// Weight rounded to two decimals, so `1.0 - 0.7` prints as `0.3`.
fn as_fraction(weight: f64) -> f64 {
    as_percent(weight) as f64 / 100.0
}

/// Combines scores under a fixed pair of weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    weights: Weights,
}

impl Aggregator {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> Weights {
        self.weights
    }

    /// Combine an optional image score and an optional text score.
    ///
    /// Absent inputs are a normal case, never an error.
    pub fn aggregate(&self, ml_raw: Option<f64>, text_raw: Option<f64>) -> AggregateResult {
        let ml_percent = ml_raw.map(normalize);
        let text_percent = text_raw.map(normalize);

        let (final_confidence, source_label) = match (ml_percent, text_percent) {
            (Some(ml), Some(text)) => {
                let weighted = ml.as_raw() * self.weights.ml + text.as_raw() * self.weights.text;
                (
                    CanonicalConfidence::from_percent_f64(weighted),
                    SourceLabel::Combined,
                )
            }
            (None, Some(text)) => (text, SourceLabel::TextOnly),
            (Some(ml), None) => (ml, SourceLabel::MlOnly),
            (None, None) => (CanonicalConfidence::MIDPOINT, SourceLabel::Default),
        };

        let tier = classify(final_confidence);
        debug!(
            ml = ?ml_percent.map(CanonicalConfidence::value),
            text = ?text_percent.map(CanonicalConfidence::value),
            final_confidence = final_confidence.value(),
            tier = %tier,
            source = source_label.as_str(),
            "aggregated confidence"
        );

        AggregateResult {
            final_confidence,
            tier,
            source_label,
            breakdown: Breakdown {
                ml_percent,
                text_percent,
            },
            weights: self.weights,
        }
    }
}

/// Aggregate with the default 0.6 / 0.4 weights.
pub fn aggregate(ml_raw: Option<f64>, text_raw: Option<f64>) -> AggregateResult {
    Aggregator::default().aggregate(ml_raw, text_raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(c: Option<CanonicalConfidence>) -> Option<u8> {
        c.map(CanonicalConfidence::value)
    }

    #[test]
    fn combined_weighting() {
        let r = aggregate(Some(0.9), Some(0.5));
        assert_eq!(pct(r.breakdown.ml_percent), Some(90));
        assert_eq!(pct(r.breakdown.text_percent), Some(50));
        assert_eq!(r.final_confidence.value(), 74);
        assert_eq!(r.tier, VerdictTier::Uncertain);
        assert_eq!(r.source_label, SourceLabel::Combined);
    }

    #[test]
    fn ml_only() {
        let r = aggregate(Some(0.85), None);
        assert_eq!(r.final_confidence.value(), 85);
        assert_eq!(r.tier, VerdictTier::Genuine);
        assert_eq!(r.source_label.as_str(), "Machine Learning Only");
        assert_eq!(pct(r.breakdown.text_percent), None);
    }

    #[test]
    fn text_only() {
        let r = aggregate(None, Some(32.4));
        assert_eq!(r.final_confidence.value(), 32);
        assert_eq!(r.tier, VerdictTier::Fake);
        assert_eq!(r.source_label.as_str(), "Text Analysis Only");
    }

    #[test]
    fn neither_defaults_to_midpoint() {
        let r = aggregate(None, None);
        assert_eq!(r.final_confidence.value(), 50);
        assert_eq!(r.tier, VerdictTier::Uncertain);
        assert_eq!(r.source_label.as_str(), "Default");
        assert!(r.formula().is_none());
    }

    #[test]
    fn both_full_percentages() {
        let r = aggregate(Some(100.0), Some(100.0));
        assert_eq!(pct(r.breakdown.ml_percent), Some(100));
        assert_eq!(pct(r.breakdown.text_percent), Some(100));
        assert_eq!(r.final_confidence.value(), 100);
        assert_eq!(r.tier, VerdictTier::Genuine);
    }

    #[test]
    fn mixed_scales_normalize_independently() {
        // 0.7 is a fraction, 85.0 a percentage: 70 * 0.6 + 85 * 0.4 = 76.
        let r = aggregate(Some(0.7), Some(85.0));
        assert_eq!(r.final_confidence.value(), 76);
    }

    #[test]
    fn zero_score_is_present_not_absent() {
        let r = aggregate(Some(0.0), Some(0.9));
        assert_eq!(r.source_label, SourceLabel::Combined);
        assert_eq!(r.final_confidence.value(), 36);
        assert_eq!(r.tier, VerdictTier::Fake);
    }

    #[test]
    fn custom_weights() {
        let agg = Aggregator::new(Weights::new(0.5, 0.5).unwrap());
        let r = agg.aggregate(Some(0.9), Some(0.5));
        assert_eq!(r.final_confidence.value(), 70);
        assert_eq!(r.formula().unwrap(), "(ML × 50%) + (Text × 50%) = 70%");
    }

    #[test]
    fn formula_detail_rounds_complement_weight() {
        let agg = Aggregator::new(Weights::from_ml_share(0.7).unwrap());
        let r = agg.aggregate(Some(0.9), Some(0.5));
        // 90 * 0.7 + 50 * 0.3 = 78
        assert_eq!(
            r.formula_detail().unwrap(),
            "(90% × 0.7) + (50% × 0.3) = 78%"
        );
    }

    #[test]
    fn formula_strings() {
        let r = aggregate(Some(0.9), Some(0.5));
        assert_eq!(r.formula().unwrap(), "(ML × 60%) + (Text × 40%) = 74%");
        assert_eq!(
            r.formula_detail().unwrap(),
            "(90% × 0.6) + (50% × 0.4) = 74%"
        );
        assert!(aggregate(Some(0.9), None).formula_detail().is_none());
    }

    #[test]
    fn description_uses_tier_metadata() {
        let r = aggregate(Some(0.2), Some(0.3));
        assert_eq!(r.tier, VerdictTier::Fake);
        assert_eq!(r.headline(), "FAKE JOB POSTING");
        assert_eq!(r.description(), "Confidence 24% - most likely a scam");
    }

    #[test]
    fn weights_validation() {
        assert!(Weights::new(0.6, 0.4).is_ok());
        assert!(Weights::from_ml_share(0.75).is_ok());
        assert_eq!(Weights::new(0.6, 0.6), Err(WeightsError::BadSum(1.2)));
        assert!(matches!(
            Weights::new(-0.1, 1.1),
            Err(WeightsError::Invalid { name: "ml", .. })
        ));
        assert!(matches!(
            Weights::new(0.5, f64::NAN),
            Err(WeightsError::Invalid { name: "text", .. })
        ));
        assert!(Weights::from_ml_share(1.5).is_err());
    }

    #[test]
    fn weights_deserialize_through_validation() {
        let w: Weights = serde_json::from_str(r#"{"ml": 0.7, "text": 0.3}"#).unwrap();
        assert_eq!(w.ml(), 0.7);

        let err = serde_json::from_str::<Weights>(r#"{"ml": 5, "text": -4}"#).unwrap_err();
        assert!(err.to_string().contains("weight text"));
        assert!(serde_json::from_str::<Weights>(r#"{"ml": 0.5, "text": 0.2}"#).is_err());
    }

    #[test]
    fn result_json_shape() {
        let r = aggregate(Some(0.9), Some(0.5));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["final_confidence"], 74);
        assert_eq!(v["tier"], "uncertain");
        assert_eq!(v["source_label"], "Combined ML + Text Analysis");
        assert_eq!(v["breakdown"]["ml_percent"], 90);
        assert_eq!(v["breakdown"]["text_percent"], 50);

        let single = serde_json::to_value(aggregate(None, Some(0.5))).unwrap();
        assert!(single["breakdown"]["ml_percent"].is_null());
    }
}
