//! Analysis pipeline: image analysis → OCR → text analysis → verdict.
//!
//! Steps are awaited strictly in order, and aggregation only happens once
//! every step has either produced a score or failed. A failed step leaves its
//! score absent and is reported as a warning; nothing is fabricated.

use std::path::Path;

use jobcheck_core::{AggregateResult, Aggregator, AnalysisSession, OcrExtraction};
use serde::Serialize;
use tracing::{info, warn};

use crate::http::{BackendClient, ClientError, ImageAnalysis, TextAnalysis};

/// The backend calls the pipeline depends on.
#[async_trait::async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze_image(&self, path: &Path) -> Result<ImageAnalysis, ClientError>;
    async fn extract_text(&self, path: &Path) -> Result<OcrExtraction, ClientError>;
    async fn analyze_text(&self, text: &str) -> Result<TextAnalysis, ClientError>;
}

#[async_trait::async_trait]
impl AnalysisBackend for BackendClient {
    async fn analyze_image(&self, path: &Path) -> Result<ImageAnalysis, ClientError> {
        BackendClient::analyze_image(self, path).await
    }

    async fn extract_text(&self, path: &Path) -> Result<OcrExtraction, ClientError> {
        BackendClient::extract_text(self, path).await
    }

    async fn analyze_text(&self, text: &str) -> Result<TextAnalysis, ClientError> {
        BackendClient::analyze_text(self, text).await
    }
}

/// Which pipeline step a warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    ImageAnalysis,
    TextExtraction,
    TextAnalysis,
}

/// A step that failed; the analysis continued without its output.
#[derive(Debug, Clone, Serialize)]
pub struct StepWarning {
    pub step: Step,
    pub message: String,
}

/// Everything one analysis round produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub session: AnalysisSession,
    pub image: Option<ImageAnalysis>,
    pub text: Option<TextAnalysis>,
    pub verdict: AggregateResult,
    pub warnings: Vec<StepWarning>,
}

impl AnalysisReport {
    fn new(
        session: AnalysisSession,
        image: Option<ImageAnalysis>,
        text: Option<TextAnalysis>,
        warnings: Vec<StepWarning>,
        aggregator: &Aggregator,
    ) -> Self {
        let verdict = session.verdict_with(aggregator);
        info!(
            file = %session.file_name,
            final_confidence = verdict.final_confidence.value(),
            tier = %verdict.tier,
            source = verdict.source_label.as_str(),
            "verdict ready"
        );
        Self {
            session,
            image,
            text,
            verdict,
            warnings,
        }
    }
}

/// Run the full pipeline for one file.
///
/// When `edited_text` is given it replaces the OCR output for text analysis.
pub async fn run_analysis<B: AnalysisBackend + ?Sized>(
    backend: &B,
    path: &Path,
    edited_text: Option<String>,
    aggregator: &Aggregator,
) -> AnalysisReport {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut session = AnalysisSession::new(file_name);
    let mut warnings = Vec::new();

    // 1. Image models.
    let image = match backend.analyze_image(path).await {
        Ok(analysis) => {
            let score = analysis.to_score();
            session = session.with_image_score(score.raw, score.prediction);
            Some(analysis)
        }
        Err(e) => {
            warn!(error = %e, "image analysis failed, continuing without image score");
            warnings.push(StepWarning {
                step: Step::ImageAnalysis,
                message: e.to_string(),
            });
            None
        }
    };

    // 2. OCR.
    match backend.extract_text(path).await {
        Ok(ocr) => {
            if ocr.quality.too_short {
                warn!(
                    chars = ocr.quality.char_count,
                    "OCR text is very short, manual correction recommended"
                );
            }
            session = session.with_ocr(ocr);
        }
        Err(e) => {
            warn!(error = %e, "text extraction failed");
            warnings.push(StepWarning {
                step: Step::TextExtraction,
                message: e.to_string(),
            });
        }
    }

    if let Some(text) = edited_text {
        session = session.with_edited_text(text);
    }

    // 3. Text classifier, then 4. aggregate.
    let (session, text) = score_text(backend, session, &mut warnings).await;
    AnalysisReport::new(session, image, text, warnings, aggregator)
}

/// Re-run text analysis on user-corrected text.
///
/// The image result and any image or OCR warnings carry over from `previous`;
/// only the text step runs again.
pub async fn resubmit_text<B: AnalysisBackend + ?Sized>(
    backend: &B,
    previous: &AnalysisReport,
    corrected: String,
    aggregator: &Aggregator,
) -> AnalysisReport {
    let mut warnings: Vec<StepWarning> = previous
        .warnings
        .iter()
        .filter(|w| w.step != Step::TextAnalysis)
        .cloned()
        .collect();
    let session = previous.session.with_edited_text(corrected);
    let (session, text) = score_text(backend, session, &mut warnings).await;
    AnalysisReport::new(session, previous.image.clone(), text, warnings, aggregator)
}

async fn score_text<B: AnalysisBackend + ?Sized>(
    backend: &B,
    session: AnalysisSession,
    warnings: &mut Vec<StepWarning>,
) -> (AnalysisSession, Option<TextAnalysis>) {
    let Some(text) = session.analysis_text() else {
        info!("no text to analyse, skipping text classifier");
        return (session, None);
    };

    match backend.analyze_text(text).await {
        Ok(analysis) => {
            let score = analysis.to_score();
            let session = session.with_text_score(score.raw, score.prediction);
            (session, Some(analysis))
        }
        Err(e) => {
            warn!(error = %e, "text analysis failed, continuing without text score");
            warnings.push(StepWarning {
                step: Step::TextAnalysis,
                message: e.to_string(),
            });
            (session, None)
        }
    }
}
