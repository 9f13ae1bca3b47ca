//! Verdict tiers for a canonical confidence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::confidence::CanonicalConfidence;

/// Lowest percentage classified as [`VerdictTier::Genuine`].
pub const GENUINE_THRESHOLD: u8 = 80;
/// Lowest percentage classified as [`VerdictTier::Uncertain`].
pub const UNCERTAIN_THRESHOLD: u8 = 40;

/// Final verdict for a job posting.
///
/// The three tiers partition `0..=100`: `[0, 40)` fake, `[40, 80)` uncertain,
/// `[80, 100]` genuine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictTier {
    Genuine,
    Uncertain,
    Fake,
}

/// Display metadata attached to each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPresentation {
    pub icon: &'static str,
    pub headline: &'static str,
    /// Trailing clause of the description, after the confidence percentage.
    pub assessment: &'static str,
}

const GENUINE: TierPresentation = TierPresentation {
    icon: "✅",
    headline: "VALID JOB POSTING",
    assessment: "most likely legitimate",
};

const UNCERTAIN: TierPresentation = TierPresentation {
    icon: "⚠️",
    headline: "PROCEED WITH CAUTION",
    assessment: "independent verification required",
};

const FAKE: TierPresentation = TierPresentation {
    icon: "❌",
    headline: "FAKE JOB POSTING",
    assessment: "most likely a scam",
};

impl VerdictTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genuine => "genuine",
            Self::Uncertain => "uncertain",
            Self::Fake => "fake",
        }
    }

    pub fn presentation(&self) -> &'static TierPresentation {
        match self {
            Self::Genuine => &GENUINE,
            Self::Uncertain => &UNCERTAIN,
            Self::Fake => &FAKE,
        }
    }

    /// Human-readable sentence for a confidence in this tier.
    pub fn describe(&self, confidence: CanonicalConfidence) -> String {
        format!(
            "Confidence {}% - {}",
            confidence,
            self.presentation().assessment
        )
    }
}

impl fmt::Display for VerdictTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a canonical confidence onto its verdict tier.
pub fn classify(confidence: CanonicalConfidence) -> VerdictTier {
    match confidence.value() {
        pct if pct >= GENUINE_THRESHOLD => VerdictTier::Genuine,
        pct if pct >= UNCERTAIN_THRESHOLD => VerdictTier::Uncertain,
        _ => VerdictTier::Fake,
    }
}
