//! Confidence normalisation.
//!
//! Backend models report confidence either as a fraction ("0.85") or as a
//! percentage ("85.0"), and the two are not tagged. Everything downstream
//! works on a single canonical form: an integer percentage in `0..=100`.
//!
//! # Scale detection
//!
//! - `raw > 1`: already a percentage, rounded to the nearest integer
//! - `raw <= 1`: a fraction, multiplied by 100 then rounded
//! - Exactly `1.0` is read as a fraction and becomes 100%
//!
//! Out-of-range input is clamped: NaN and negatives become 0, anything above
//! 100 (including +inf) becomes 100.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An integer percentage above 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("confidence {0} exceeds 100")]
pub struct ConfidenceOutOfRange(pub u8);

/// Integer confidence percentage, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CanonicalConfidence(u8);

impl CanonicalConfidence {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(100);
    /// Used when no analysis source produced a score.
    pub const MIDPOINT: Self = Self(50);

    /// Build from an integer that is already a percentage.
    ///
    /// Returns `None` above 100.
    pub fn new(pct: u8) -> Option<Self> {
        (pct <= 100).then_some(Self(pct))
    }

    /// Round an already-percentage float into range.
    pub(crate) fn from_percent_f64(pct: f64) -> Self {
        if pct.is_nan() {
            return Self::MIN;
        }
        // f64::round goes half away from zero; inputs here are clamped to >= 0
        // first so it matches the "round half up" display behaviour.
        Self(pct.clamp(0.0, 100.0).round() as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The value as a raw score, for feeding back through [`normalize`].
    pub fn as_raw(self) -> f64 {
        f64::from(self.0)
    }
}

impl TryFrom<u8> for CanonicalConfidence {
    type Error = ConfidenceOutOfRange;

    fn try_from(pct: u8) -> Result<Self, Self::Error> {
        Self::new(pct).ok_or(ConfidenceOutOfRange(pct))
    }
}

impl From<CanonicalConfidence> for u8 {
    fn from(c: CanonicalConfidence) -> u8 {
        c.0
    }
}

impl fmt::Display for CanonicalConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalise a raw confidence (fraction or percentage) into a canonical percentage.
pub fn normalize(raw: f64) -> CanonicalConfidence {
    if raw.is_nan() {
        return CanonicalConfidence::MIN;
    }
    let pct = if raw > 1.0 { raw } else { raw * 100.0 };
    CanonicalConfidence::from_percent_f64(pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(raw: f64) -> u8 {
        normalize(raw).value()
    }

    #[test]
    fn fractions_scale_to_percent() {
        assert_eq!(pct(0.0), 0);
        assert_eq!(pct(0.5), 50);
        assert_eq!(pct(0.85), 85);
        assert_eq!(pct(0.904), 90);
        assert_eq!(pct(0.906), 91);
    }

    #[test]
    fn percentages_round_only() {
        assert_eq!(pct(1.5), 2);
        assert_eq!(pct(42.4), 42);
        assert_eq!(pct(42.6), 43);
        assert_eq!(pct(100.0), 100);
    }

    #[test]
    fn fraction_sweep_matches_rounding() {
        for i in 0..=1000 {
            let raw = i as f64 / 1000.0;
            let expected = (raw * 100.0).round() as u8;
            assert_eq!(pct(raw), expected, "raw = {raw}");
        }
    }

    #[test]
    fn percentage_sweep_matches_rounding() {
        for i in 11..=1000 {
            let raw = i as f64 / 10.0;
            assert_eq!(pct(raw), raw.round() as u8, "raw = {raw}");
        }
    }

    #[test]
    fn exactly_one_is_a_fraction() {
        assert_eq!(pct(1.0), 100);
    }

    #[test]
    fn out_of_domain_is_clamped() {
        assert_eq!(pct(f64::NAN), 0);
        assert_eq!(pct(-0.3), 0);
        assert_eq!(pct(-250.0), 0);
        assert_eq!(pct(f64::NEG_INFINITY), 0);
        assert_eq!(pct(f64::INFINITY), 100);
        assert_eq!(pct(180.0), 100);
    }

    #[test]
    fn renormalizing_is_stable() {
        // A canonical 1 would be re-read as the fraction 1.0 (see module docs),
        // so it is the one output excluded here.
        for i in 0..=1000 {
            let raw = i as f64 / 10.0;
            let once = normalize(raw);
            if once.value() == 1 {
                continue;
            }
            assert_eq!(normalize(once.as_raw()), once, "raw = {raw}");
        }
    }

    #[test]
    fn canonical_rejects_above_hundred() {
        assert!(CanonicalConfidence::new(100).is_some());
        assert!(CanonicalConfidence::new(101).is_none());
        assert_eq!(
            CanonicalConfidence::try_from(101),
            Err(ConfidenceOutOfRange(101))
        );
    }

    #[test]
    fn canonical_serializes_as_integer() {
        let c = normalize(0.74);
        assert_eq!(serde_json::to_string(&c).unwrap(), "74");
        let back: CanonicalConfidence = serde_json::from_str("74").unwrap();
        assert_eq!(back, c);
        let err = serde_json::from_str::<CanonicalConfidence>("101").unwrap_err();
        assert!(err.to_string().contains("confidence 101 exceeds 100"));
    }
}
