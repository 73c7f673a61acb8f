//! stepshot CLI entry point.
//!
//! Provides the `stepshot` binary.  With no subcommand it captures one
//! question (or the built-in default); `all` captures the sample batch and
//! `parse` prints the parsed intent only.

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use stepshot_adapters::{CdpLauncher, FsArtifactStore};
use stepshot_capture::{CaptureConfig, DEFAULT_QUESTION, Driver, RunOutcome, SAMPLE_QUESTIONS};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_tracing(if cli.verbose { "debug" } else { "info" });

    match &cli.command {
        Some(Commands::Parse { question }) => cmd_parse(&question.join(" ")),
        Some(Commands::All) => cmd_all(&cli).await,
        None => cmd_capture(&cli).await,
    }
}

// ---------------------------------------------------------------------------
// Subcommand: parse
// ---------------------------------------------------------------------------

fn cmd_parse(question: &str) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&intent_summary(question)?)?);
    Ok(())
}

/// The parsed intent as a JSON object, with its output folder name added.
fn intent_summary(question: &str) -> Result<serde_json::Value> {
    let intent = stepshot_intent::parse(question);
    let mut summary = serde_json::to_value(&intent)?;
    summary["folder"] = serde_json::Value::String(intent.folder_name());
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Default: capture one question
// ---------------------------------------------------------------------------

async fn cmd_capture(cli: &Cli) -> Result<()> {
    let question = cli
        .question_text()
        .unwrap_or_else(|| DEFAULT_QUESTION.to_string());
    let driver = build_driver(cli)?;

    info!(question = %question, "starting capture");
    let outcome = driver
        .run(&question)
        .await
        .context("failed to start capture")?;

    print_outcome(&question, &outcome);
    if let RunOutcome::Aborted { reason, .. } = &outcome {
        bail!("capture aborted: {reason}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: all
// ---------------------------------------------------------------------------

async fn cmd_all(cli: &Cli) -> Result<()> {
    let driver = build_driver(cli)?;
    let summary = driver.run_batch(&SAMPLE_QUESTIONS).await;

    println!();
    for entry in &summary.entries {
        match &entry.result {
            Ok(outcome) => print_outcome(&entry.question, outcome),
            Err(e) => println!("  [!] {}\n      could not start: {e}", entry.question),
        }
    }
    println!();
    println!(
        "  {} of {} captures completed",
        summary.completed(),
        summary.entries.len()
    );

    if summary.failed() > 0 {
        warn!(failed = summary.failed(), "some captures did not complete");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Assemble config, browser and artifact store into a driver.
fn build_driver(cli: &Cli) -> Result<Driver> {
    let mut config = CaptureConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_env_overrides()
        .context("invalid STEPSHOT_* environment override")?;
    if cli.headless {
        config = config.with_headless(true);
    }

    let root = store_root(&config.output_dir)?;
    info!(
        root = %root.display(),
        output_dir = %config.output_dir,
        headless = config.browser.headless,
        "configuration ready"
    );

    Ok(Driver::new(
        config,
        Arc::new(CdpLauncher::new()),
        Arc::new(FsArtifactStore::new(root)),
    ))
}

/// Artifact store root: the output directory itself when it is absolute,
/// otherwise the working directory.
fn store_root(output_dir: &str) -> Result<PathBuf> {
    let output_dir = Path::new(output_dir);
    if output_dir.is_absolute() {
        return Ok(output_dir.to_path_buf());
    }
    std::env::current_dir().context("failed to resolve working directory")
}

fn print_outcome(question: &str, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed(record) => {
            println!("  [+] {question}");
            println!(
                "      {} screenshots in {}",
                record.step_count, record.output_location
            );
        }
        RunOutcome::Aborted {
            steps_captured,
            output_location,
            reason,
        } => {
            println!("  [!] {question}");
            println!(
                "      aborted after {steps_captured} screenshots in {output_location}: {reason}"
            );
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_level` when set.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
