mod display;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jobcheck_client::{BackendClient, resubmit_text, run_analysis};
use jobcheck_core::{Aggregator, Weights};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jobcheck")]
#[command(version, about = "Check job postings for fraud using image and text classification", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "JOBCHECK_BACKEND", default_value = "http://localhost:5000")]
    backend: String,

    /// Weight of the image model in combined verdicts (text gets the rest)
    #[arg(long, global = true, env = "JOBCHECK_ML_WEIGHT", default_value_t = jobcheck_core::aggregate::DEFAULT_ML_WEIGHT)]
    ml_weight: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Combine raw scores into a verdict without contacting the backend
    Verdict {
        /// Image-model confidence (fraction or percentage)
        #[arg(long)]
        ml: Option<f64>,

        /// Text-model confidence (fraction or percentage)
        #[arg(long)]
        text: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check backend availability
    Health,

    /// Show backend, model, and dataset status
    Status,

    /// Extract text from a posting for manual correction
    Extract {
        /// Image or PDF of the job posting
        input: PathBuf,

        /// Write the extracted text to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the full analysis on a posting
    Analyze {
        /// Image or PDF of the job posting
        input: PathBuf,

        /// Corrected text, analysed in a second round after the OCR text
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("jobcheck v{}", env!("CARGO_PKG_VERSION"));

    let weights = Weights::from_ml_share(cli.ml_weight).context("invalid --ml-weight")?;
    let aggregator = Aggregator::new(weights);

    match cli.command {
        Commands::Verdict { ml, text, json } => {
            let result = aggregator.aggregate(ml, text);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                display::print_verdict(&result);
            }
        }
        Commands::Health => {
            let client = BackendClient::new(cli.backend);
            let health = client
                .health()
                .await
                .with_context(|| format!("backend {} is not available", client.base_url()))?;
            display::print_health(client.base_url(), &health);
        }
        Commands::Status => {
            let client = BackendClient::new(cli.backend);
            let health = client
                .health()
                .await
                .with_context(|| format!("backend {} is not available", client.base_url()))?;
            let models = client
                .models_info()
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "model status unavailable"))
                .ok();
            let dataset = client
                .dataset_info()
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "dataset status unavailable"))
                .ok();
            display::print_status(
                client.base_url(),
                &health,
                models.as_ref(),
                dataset.as_ref(),
            );
        }
        Commands::Extract { input, output } => {
            let client = BackendClient::new(cli.backend);
            let ocr = client
                .extract_text(&input)
                .await
                .with_context(|| format!("extracting text from {}", input.display()))?;
            if let Some(path) = output {
                std::fs::write(&path, &ocr.text)
                    .with_context(|| format!("writing {}", path.display()))?;
                eprintln!("  Wrote extracted text to {}", path.display());
            }
            display::print_extraction(&ocr);
        }
        Commands::Analyze {
            input,
            text_file,
            json,
        } => {
            let edited_text = text_file
                .map(|path| {
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))
                })
                .transpose()?;

            let client = BackendClient::new(cli.backend);
            let mut report = run_analysis(&client, &input, None, &aggregator).await;
            if let Some(corrected) = edited_text {
                tracing::info!(
                    first_confidence = report.verdict.final_confidence.value(),
                    "resubmitting corrected text"
                );
                report = resubmit_text(&client, &report, corrected, &aggregator).await;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_report(&report);
            }
        }
    }

    Ok(())
}
