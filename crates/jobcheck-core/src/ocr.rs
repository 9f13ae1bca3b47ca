//! OCR extraction results and their quality grade.
//!
//! The backend reports OCR confidence as a percentage. Grades:
//! good (>= 80), medium (>= 60), low otherwise. External OCR is recommended
//! below 70% confidence, under 50 characters, or under 10 words.

use serde::{Deserialize, Serialize};

use crate::confidence::{CanonicalConfidence, normalize};

const GOOD_THRESHOLD: u8 = 80;
const MEDIUM_THRESHOLD: u8 = 60;
const EXTERNAL_OCR_CONFIDENCE: u8 = 70;
const EXTERNAL_OCR_MIN_CHARS: usize = 50;
const EXTERNAL_OCR_MIN_WORDS: usize = 10;
/// Below this many characters the text is almost certainly unusable as-is.
const TOO_SHORT_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrGrade {
    Good,
    Medium,
    Low,
}

impl OcrGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Quality assessment of one OCR extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrQuality {
    pub confidence: CanonicalConfidence,
    pub grade: OcrGrade,
    pub char_count: usize,
    pub word_count: usize,
    pub needs_external_ocr: bool,
    pub too_short: bool,
}

impl OcrQuality {
    pub fn assess(confidence_raw: f64, text: &str) -> Self {
        let confidence = normalize(confidence_raw);
        let char_count = text.trim().chars().count();
        let word_count = text.split_whitespace().count();

        let grade = match confidence.value() {
            pct if pct >= GOOD_THRESHOLD => OcrGrade::Good,
            pct if pct >= MEDIUM_THRESHOLD => OcrGrade::Medium,
            _ => OcrGrade::Low,
        };

        Self {
            confidence,
            grade,
            char_count,
            word_count,
            needs_external_ocr: confidence.value() < EXTERNAL_OCR_CONFIDENCE
                || char_count < EXTERNAL_OCR_MIN_CHARS
                || word_count < EXTERNAL_OCR_MIN_WORDS,
            too_short: char_count < TOO_SHORT_CHARS,
        }
    }
}

/// Text pulled from an uploaded file, with the backend's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrExtraction {
    pub text: String,
    pub method: String,
    pub quality: OcrQuality,
}

impl OcrExtraction {
    pub fn new(text: impl Into<String>, confidence_raw: f64, method: impl Into<String>) -> Self {
        let text = text.into();
        let quality = OcrQuality::assess(confidence_raw, &text);
        Self {
            text,
            method: method.into(),
            quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTING: &str = "PT Maju Jaya is hiring a staff accountant in Jakarta. \
        Requirements: bachelor degree in accounting, two years experience. \
        Apply via the company careers page.";

    #[test]
    fn grade_boundaries() {
        assert_eq!(OcrQuality::assess(80.0, POSTING).grade, OcrGrade::Good);
        assert_eq!(OcrQuality::assess(79.4, POSTING).grade, OcrGrade::Medium);
        assert_eq!(OcrQuality::assess(60.0, POSTING).grade, OcrGrade::Medium);
        assert_eq!(OcrQuality::assess(59.0, POSTING).grade, OcrGrade::Low);
    }

    #[test]
    fn long_confident_text_needs_nothing() {
        let q = OcrQuality::assess(91.0, POSTING);
        assert!(!q.needs_external_ocr);
        assert!(!q.too_short);
        assert!(q.word_count >= 10);
    }

    #[test]
    fn external_ocr_below_seventy() {
        assert!(OcrQuality::assess(69.0, POSTING).needs_external_ocr);
        assert!(!OcrQuality::assess(70.0, POSTING).needs_external_ocr);
    }

    #[test]
    fn external_ocr_for_sparse_text() {
        let q = OcrQuality::assess(95.0, "Hiring now, call 0812");
        assert!(q.needs_external_ocr);
        assert!(!q.too_short);
        assert_eq!(q.word_count, 4);
    }

    #[test]
    fn too_short_text() {
        let q = OcrQuality::assess(95.0, "  ab c  ");
        assert!(q.too_short);
        assert_eq!(q.char_count, 4);
    }

    #[test]
    fn extraction_assesses_quality() {
        let e = OcrExtraction::new(POSTING, 0.85, "Standard OCR");
        assert_eq!(e.quality.confidence.value(), 85);
        assert_eq!(e.quality.grade, OcrGrade::Good);
    }
}
