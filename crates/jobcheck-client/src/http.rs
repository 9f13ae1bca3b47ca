//! HTTP client for the fraud-detection backend.
//!
//! Every endpoint wraps its payload in the same envelope:
//! `{"status": "success"|"error", "message"?, "data"?, "error"?, "timestamp"}`.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDateTime;
use jobcheck_core::{OcrExtraction, Score};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::status::{DatasetInfo, ModelsInfo};

const DEFAULT_OCR_METHOD: &str = "Standard OCR";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("backend reported an error: {0}")]
    Backend(String),
    #[error("response from {0} carried no data")]
    MissingData(&'static str),
    #[error("no analysis results available")]
    NoResults,
    #[error("reading upload {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Standard response wrapper used by every backend endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    /// Server-local time, ISO 8601 without an offset.
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `status: "error"` into [`ClientError::Backend`].
    pub fn into_data(self, endpoint: &'static str) -> Result<T, ClientError> {
        if self.status != "success" {
            return Err(ClientError::Backend(
                self.error
                    .or(self.message)
                    .unwrap_or_else(|| format!("status {}", self.status)),
            ));
        }
        self.data.ok_or(ClientError::MissingData(endpoint))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub version: String,
    #[serde(default)]
    pub models_loaded: bool,
    #[serde(default)]
    pub models_count: u32,
    #[serde(default)]
    pub ocr_available: bool,
}

/// Prediction and confidence from a single model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVerdict {
    pub prediction: String,
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ImageAnalysisData {
    combined: Option<ModelVerdict>,
    random_forest: Option<ModelVerdict>,
}

/// Image-model result, preferring the ensemble over the random forest alone.
#[derive(Debug, Clone, Serialize)]
pub struct ImageAnalysis {
    pub prediction: String,
    pub confidence: f64,
    pub model_used: &'static str,
}

impl ImageAnalysis {
    fn from_data(data: ImageAnalysisData) -> Result<Self, ClientError> {
        let (verdict, model_used) = match (data.combined, data.random_forest) {
            (Some(v), _) => (v, "Ensemble (RF + CNN)"),
            (None, Some(v)) => (v, "Random Forest"),
            (None, None) => return Err(ClientError::NoResults),
        };
        Ok(Self {
            prediction: verdict.prediction,
            confidence: verdict.confidence,
            model_used,
        })
    }

    pub fn to_score(&self) -> Score {
        Score::image(self.confidence).with_prediction(self.prediction.to_lowercase())
    }
}

#[derive(Debug, Deserialize)]
struct ExtractTextData {
    extracted_text: Option<String>,
    text: Option<String>,
    confidence: Option<f64>,
    method: Option<String>,
    quality_score: Option<String>,
}

impl ExtractTextData {
    fn into_extraction(self) -> OcrExtraction {
        let text = self.extracted_text.or(self.text).unwrap_or_default();
        OcrExtraction::new(
            text,
            self.confidence.unwrap_or(0.0),
            self.method.unwrap_or_else(|| DEFAULT_OCR_METHOD.to_string()),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Ensemble text analysis of a job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub overall_prediction: String,
    pub overall_confidence: f64,
    #[serde(default)]
    pub overall_reasoning: String,
    #[serde(default)]
    pub models: HashMap<String, ModelVerdict>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

impl TextAnalysis {
    pub fn to_score(&self) -> Score {
        Score::text(self.overall_confidence).with_prediction(self.overall_prediction.clone())
    }

    /// The backend signals an internal failure with prediction `error`.
    fn check(self) -> Result<Self, ClientError> {
        if self.overall_prediction == "error" {
            return Err(ClientError::Backend(self.overall_reasoning));
        }
        Ok(self)
    }
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

/// HTTP client for the backend's `/api` endpoints.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the given backend base URL.
    ///
    /// `base_url` should be like `http://localhost:5000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.url("health");
        info!(url = %url, "checking backend health");
        let resp = self.client.get(&url).send().await?;
        read_envelope(resp, "health").await
    }

    /// Which models the backend has loaded.
    pub async fn models_info(&self) -> Result<ModelsInfo, ClientError> {
        let url = self.url("models/info");
        info!(url = %url, "fetching model status");
        let resp = self.client.get(&url).send().await?;
        read_envelope(resp, "models/info").await
    }

    /// Size and balance of the backend's training dataset.
    pub async fn dataset_info(&self) -> Result<DatasetInfo, ClientError> {
        let url = self.url("dataset/info");
        info!(url = %url, "fetching dataset status");
        let resp = self.client.get(&url).send().await?;
        read_envelope(resp, "dataset/info").await
    }

    /// Classify the uploaded file with the image models.
    pub async fn analyze_image(&self, path: &Path) -> Result<ImageAnalysis, ClientError> {
        let url = self.url("analyze-image");
        let form = upload_form(path).await?;
        info!(url = %url, file = %path.display(), "sending image analysis request");
        let resp = self.client.post(&url).multipart(form).send().await?;
        let data: ImageAnalysisData = read_envelope(resp, "analyze-image").await?;
        let analysis = ImageAnalysis::from_data(data)?;
        info!(
            prediction = %analysis.prediction,
            confidence = analysis.confidence,
            model = analysis.model_used,
            "image analysis complete"
        );
        Ok(analysis)
    }

    /// Run OCR on the uploaded file.
    pub async fn extract_text(&self, path: &Path) -> Result<OcrExtraction, ClientError> {
        let url = self.url("extract-text");
        let form = upload_form(path).await?;
        info!(url = %url, file = %path.display(), "sending OCR request");
        let resp = self.client.post(&url).multipart(form).send().await?;
        let data: ExtractTextData = read_envelope(resp, "extract-text").await?;
        if let Some(grade) = &data.quality_score {
            debug!(backend_grade = %grade, "backend OCR quality");
        }
        let extraction = data.into_extraction();
        info!(
            chars = extraction.quality.char_count,
            confidence = extraction.quality.confidence.value(),
            grade = extraction.quality.grade.as_str(),
            "text extracted"
        );
        Ok(extraction)
    }

    /// Classify job-posting text, either raw OCR output or a user correction.
    pub async fn analyze_text(&self, text: &str) -> Result<TextAnalysis, ClientError> {
        let url = self.url("analyze-fake-genuine");
        info!(url = %url, chars = text.chars().count(), "sending text analysis request");
        let resp = self
            .client
            .post(&url)
            .json(&TextRequest { text })
            .send()
            .await?;
        let analysis: TextAnalysis = read_envelope(resp, "analyze-fake-genuine").await?;
        let analysis = analysis.check()?;
        info!(
            prediction = %analysis.overall_prediction,
            confidence = analysis.overall_confidence,
            "text analysis complete"
        );
        Ok(analysis)
    }
}

async fn upload_form(path: &Path) -> Result<Form, ClientError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Form::new().part("file", Part::bytes(bytes).file_name(file_name)))
}

async fn read_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
    endpoint: &'static str,
) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        // Error responses still use the envelope; surface its message when present.
        if let Ok(env) = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            && let Some(err) = env.error
        {
            return Err(ClientError::Backend(err));
        }
        return Err(ClientError::Server {
            status: status.as_u16(),
            body,
        });
    }
    parse_envelope(&body, endpoint)
}

fn parse_envelope<T: DeserializeOwned>(body: &str, endpoint: &'static str) -> Result<T, ClientError> {
    let env: Envelope<T> = serde_json::from_str(body)?;
    debug!(endpoint, timestamp = ?env.timestamp, message = ?env.message, "envelope received");
    env.into_data(endpoint)
}
