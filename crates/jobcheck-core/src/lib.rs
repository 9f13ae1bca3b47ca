//! Core scoring for job-posting checks: confidence normalisation, verdict
//! tiers, weighted aggregation, OCR quality, and analysis sessions.

pub mod aggregate;
pub mod confidence;
pub mod ocr;
pub mod score;
pub mod session;
pub mod verdict;

pub use aggregate::{
    AggregateResult, Aggregator, Breakdown, SourceLabel, Weights, WeightsError, aggregate,
};
pub use confidence::{CanonicalConfidence, ConfidenceOutOfRange, normalize};
pub use ocr::{OcrExtraction, OcrGrade, OcrQuality};
pub use score::{Score, SourceKind};
pub use session::AnalysisSession;
pub use verdict::{TierPresentation, VerdictTier, classify};
