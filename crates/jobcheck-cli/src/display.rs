//! Terminal cards for verdicts, OCR output, and backend status.

use std::fmt::{self, Write};

use jobcheck_client::status::model_display_name;
use jobcheck_client::{AnalysisReport, DatasetInfo, HealthStatus, ModelsInfo};
use jobcheck_core::{AggregateResult, CanonicalConfidence, OcrExtraction};

const MAX_SUGGESTIONS: usize = 5;
const RULE: &str = "----------------------------------------";

// ── Public API ──

pub fn print_verdict(result: &AggregateResult) {
    print!("{}", render_verdict(result));
}

pub fn print_report(report: &AnalysisReport) {
    print!("{}", render_report(report));
}

pub fn print_extraction(ocr: &OcrExtraction) {
    print!("{}", render_extraction(ocr));
}

pub fn print_health(base_url: &str, health: &HealthStatus) {
    println!("=== Backend {base_url} ===");
    println!("  {:<26} {}", "version", health.version);
    println!("  {:<26} {}", "models_loaded", yes_no(health.models_loaded));
    println!("  {:<26} {}", "models_count", health.models_count);
    println!("  {:<26} {}", "ocr_available", yes_no(health.ocr_available));
}

pub fn print_status(
    base_url: &str,
    health: &HealthStatus,
    models: Option<&ModelsInfo>,
    dataset: Option<&DatasetInfo>,
) {
    print!("{}", render_status(base_url, health, models, dataset));
}

// ── Rendering ──

/// Verdict banner followed by the score breakdown.
pub fn render_verdict(result: &AggregateResult) -> String {
    let mut out = String::new();
    let _ = write_verdict(&mut out, result);
    out
}

fn write_verdict(out: &mut String, result: &AggregateResult) -> fmt::Result {
    let presentation = result.tier.presentation();

    writeln!(out, "=== {} {} ===", presentation.icon, presentation.headline)?;
    writeln!(out, "{}", result.description())?;
    writeln!(out, "Based on: {}", result.source_label.as_str())?;
    writeln!(out)?;

    writeln!(out, "Breakdown")?;
    writeln!(
        out,
        "  {:<26} {}",
        "machine_learning",
        percent_or_na(result.breakdown.ml_percent)
    )?;
    writeln!(
        out,
        "  {:<26} {}",
        "text_analysis",
        percent_or_na(result.breakdown.text_percent)
    )?;
    writeln!(out, "  {:<26} {}%", "final_score", result.final_confidence)?;
    match result.formula() {
        Some(formula) => {
            writeln!(out, "  {:<26} {}", "formula", formula)?;
            if let Some(detail) = result.formula_detail() {
                writeln!(out, "  {:<26} {}", "", detail)?;
            }
        }
        None => {
            writeln!(out, "  {:<26} single source", "formula")?;
        }
    }
    Ok(())
}

/// Full pipeline report: per-step results, warnings, verdict, recommendations.
pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &AnalysisReport) -> fmt::Result {
    writeln!(out, "=== {} ===", report.session.file_name)?;
    writeln!(out)?;

    writeln!(out, "Image Analysis")?;
    match &report.image {
        Some(image) => {
            writeln!(out, "  {:<26} {}", "model", image.model_used)?;
            writeln!(out, "  {:<26} {}", "prediction", image.prediction)?;
            writeln!(
                out,
                "  {:<26} {}%",
                "confidence",
                image.to_score().canonical()
            )?;
        }
        None => {
            writeln!(out, "  (not available)")?;
        }
    }
    writeln!(out)?;

    if let Some(ocr) = &report.session.ocr {
        writeln!(out, "Text Extraction")?;
        write_quality(out, ocr)?;
        writeln!(out)?;
    }

    if let Some(edited) = &report.session.edited_text {
        writeln!(out, "Corrected Text")?;
        writeln!(out, "  {:<26} {}", "chars", edited.trim().chars().count())?;
        writeln!(out)?;
    }

    writeln!(out, "Text Analysis")?;
    match &report.text {
        Some(text) => {
            writeln!(out, "  {:<26} {}", "prediction", text.overall_prediction)?;
            writeln!(
                out,
                "  {:<26} {}%",
                "confidence",
                text.to_score().canonical()
            )?;
            if !text.overall_reasoning.is_empty() {
                writeln!(out, "  {:<26} {}", "reasoning", text.overall_reasoning)?;
            }
        }
        None => {
            writeln!(out, "  (not available)")?;
        }
    }
    writeln!(out)?;

    if !report.warnings.is_empty() {
        writeln!(out, "Warnings")?;
        for w in &report.warnings {
            writeln!(out, "  {:<26} {}", format!("{:?}", w.step), w.message)?;
        }
        writeln!(out)?;
    }

    write_verdict(out, &report.verdict)?;

    if let Some(text) = &report.text
        && !text.recommendations.is_empty()
    {
        writeln!(out)?;
        writeln!(out, "Recommendations")?;
        for rec in &text.recommendations {
            writeln!(out, "  [{}] {}", rec.category, rec.title)?;
            for s in rec.suggestions.iter().take(MAX_SUGGESTIONS) {
                writeln!(out, "    - {s}")?;
            }
            if rec.suggestions.len() > MAX_SUGGESTIONS {
                writeln!(
                    out,
                    "    ... and {} more",
                    rec.suggestions.len() - MAX_SUGGESTIONS
                )?;
            }
        }
    }
    Ok(())
}

/// OCR text between rules, ready to copy out for manual correction.
pub fn render_extraction(ocr: &OcrExtraction) -> String {
    let mut out = String::new();
    let _ = write_extraction(&mut out, ocr);
    out
}

fn write_extraction(out: &mut String, ocr: &OcrExtraction) -> fmt::Result {
    writeln!(out, "Text Extraction")?;
    write_quality(out, ocr)?;
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "{}", ocr.text.trim_end())?;
    writeln!(out, "{RULE}")?;
    if ocr.quality.too_short {
        writeln!(
            out,
            "OCR produced very little text. Edit it manually before analysing."
        )?;
    } else if ocr.quality.needs_external_ocr {
        writeln!(
            out,
            "OCR quality is limited. Check and correct the text, or use an external OCR service."
        )?;
    }
    Ok(())
}

/// Backend health plus model and dataset sections; a missing section
/// prints as unavailable.
pub fn render_status(
    base_url: &str,
    health: &HealthStatus,
    models: Option<&ModelsInfo>,
    dataset: Option<&DatasetInfo>,
) -> String {
    let mut out = String::new();
    let _ = write_status(&mut out, base_url, health, models, dataset);
    out
}

fn write_status(
    out: &mut String,
    base_url: &str,
    health: &HealthStatus,
    models: Option<&ModelsInfo>,
    dataset: Option<&DatasetInfo>,
) -> fmt::Result {
    writeln!(out, "=== Backend {base_url} ===")?;
    writeln!(out, "  {:<26} {}", "version", health.version)?;
    writeln!(out, "  {:<26} {}", "ocr_available", yes_no(health.ocr_available))?;
    writeln!(out)?;

    writeln!(out, "Models")?;
    match models {
        Some(info) => {
            let (loaded, total) = info.loaded_count();
            writeln!(
                out,
                "  {:<26} {} ({loaded}/{total})",
                "availability",
                info.availability().as_str()
            )?;
            if let Some(summary) = &info.summary {
                writeln!(out, "  {:<26} {}", "summary", summary.status)?;
            }
            for (key, entry) in &info.available_models {
                let mark = if entry.is_loaded() { "✅" } else { "❌" };
                match entry.status() {
                    Some(status) => {
                        writeln!(out, "  {mark} {:<23} {status}", model_display_name(key))?
                    }
                    None => writeln!(out, "  {mark} {}", model_display_name(key))?,
                }
            }
        }
        None => writeln!(out, "  (not available)")?,
    }
    writeln!(out)?;

    writeln!(out, "Dataset")?;
    match dataset {
        Some(info) => {
            writeln!(
                out,
                "  {:<26} {} ({} samples)",
                "readiness",
                info.readiness().as_str(),
                info.total_samples
            )?;
            writeln!(out, "  {:<26} {}", "type", info.dataset_type)?;
            writeln!(out, "  {:<26} {}", "genuine_samples", info.genuine_samples)?;
            writeln!(out, "  {:<26} {}", "fake_samples", info.fake_samples)?;
            writeln!(out, "  {:<26} {:.2}", "balance_ratio", info.balance_ratio)?;
            writeln!(
                out,
                "  {:<26} {}",
                "ready_for_training",
                yes_no(info.ready_for_training)
            )?;
            if let Some(note) = &info.note {
                writeln!(out, "  {:<26} {}", "note", note)?;
            }
        }
        None => writeln!(out, "  (not available)")?,
    }
    Ok(())
}

// ── Helpers ──

fn write_quality(out: &mut String, ocr: &OcrExtraction) -> fmt::Result {
    let q = &ocr.quality;
    writeln!(out, "  {:<26} {}", "method", ocr.method)?;
    writeln!(
        out,
        "  {:<26} {}% ({})",
        "confidence",
        q.confidence,
        q.grade.as_str()
    )?;
    writeln!(out, "  {:<26} {}", "chars", q.char_count)?;
    writeln!(out, "  {:<26} {}", "words", q.word_count)?;
    writeln!(
        out,
        "  {:<26} {}",
        "external_ocr_advised",
        yes_no(q.needs_external_ocr)
    )
}

fn percent_or_na(pct: Option<CanonicalConfidence>) -> String {
    pct.map(|p| format!("{p}%"))
        .unwrap_or_else(|| "N/A".to_string())
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}
