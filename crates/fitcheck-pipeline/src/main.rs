//! FitCheck command line: rate every outfit in one photo.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fitcheck_models::{Rating, RatingSummary, RunPhase};
use fitcheck_pipeline::{Orchestrator, PipelineConfig, RunOutcome, SourceImage};

#[derive(Parser)]
#[command(name = "fitcheck", about = "Rate the outfit of every person in a photo")]
struct Cli {
    /// Photo to analyze (JPEG, PNG, WebP, GIF or BMP)
    image: PathBuf,

    /// Print ratings as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    init_tracing()?;

    let cli = Cli::parse();

    let config = PipelineConfig::from_env();
    info!(
        "Pipeline config: detector={}, relay={}",
        config.detector.model_url, config.rater.relay_url
    );

    let image = SourceImage::from_path(&cli.image)
        .await
        .with_context(|| format!("Failed to load {}", cli.image.display()))?;

    let orchestrator = Orchestrator::from_config(config).context("Failed to build clients")?;

    // Progress goes to stderr so --json output stays clean.
    let mut updates = orchestrator.subscribe();
    let progress = tokio::spawn(async move {
        let mut last = RunPhase::Idle;
        while updates.changed().await.is_ok() {
            let phase = updates.borrow_and_update().phase;
            if phase != last && phase.is_busy() {
                eprintln!("{}...", phase);
            }
            last = phase;
        }
    });

    let outcome = orchestrator.run(image).await;
    progress.abort();

    match outcome {
        RunOutcome::Done(ratings) => {
            if cli.json {
                print_json(&ratings)?;
            } else {
                print_text(&ratings);
            }
            Ok(())
        }
        RunOutcome::Failed(err) => bail!("{}: {}", err.kind(), err),
        RunOutcome::Superseded => bail!("Run was superseded"),
    }
}

fn init_tracing() -> Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("fitcheck=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

fn print_json(ratings: &[Rating]) -> Result<()> {
    let output = json!({
        "ratings": ratings,
        "summary": RatingSummary::from_ratings(ratings),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(ratings: &[Rating]) {
    for rating in ratings {
        let score = match rating.score {
            Some(score) => format!("{:.1}/10", score),
            None => "failed".to_string(),
        };
        println!("Person {} ({}): {}", rating.id + 1, score, rating.feedback);
    }

    let summary = RatingSummary::from_ratings(ratings);
    match summary.mean_score {
        Some(mean) => println!(
            "\n{} people, {} rated, average {:.1}/10",
            summary.total, summary.rated, mean
        ),
        None => println!("\n{} people, none could be rated", summary.total),
    }
}
