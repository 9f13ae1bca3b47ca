//! Backend access: HTTP client for the fraud-detection API, the sequential
//! analysis pipeline built on it, and system status payloads.

pub mod http;
pub mod pipeline;
pub mod status;

pub use http::{BackendClient, ClientError, HealthStatus, ImageAnalysis, TextAnalysis};
pub use pipeline::{AnalysisBackend, AnalysisReport, Step, StepWarning, resubmit_text, run_analysis};
pub use status::{DatasetInfo, DatasetReadiness, ModelAvailability, ModelsInfo};
