//! tonuino-cards - command line entry point.
//!
//! # Execution Flow
//!
//! 1. Initialize logging (console, plus a rotating file with `--log-dir`)
//! 2. Load and check the card configuration (nothing on disk changes if this fails)
//! 3. Compile every card into `<destination>/NN/` and collect the byte codes
//! 4. Print one text block per QR code batch
//! 5. Log the run summary
//!
//! Any fatal error ends the run with exit code 1. Recoverable issues are
//! logged as they happen and counted in the summary.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use tonuino_cards::services::qrcode::{TextQrRenderer, render_batches};
use tonuino_cards::services::tags::LoftyTagReader;
use tonuino_cards::{APP_NAME, CardCompiler, ConfigManager, Metrics, VERSION};

/// Compile a YAML card configuration into a Tonuino SD card layout
#[derive(Parser, Debug)]
#[command(name = "tonuino-cards", version, about)]
struct Cli {
    /// Card configuration (YAML)
    #[arg(short = 'c', long)]
    config: Utf8PathBuf,

    /// Root of the SD card, or a directory to be copied onto it
    #[arg(short = 'd', long)]
    destination: Utf8PathBuf,

    /// Log per-file steps
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Also write a daily rotating log file into this directory
    #[arg(long)]
    log_dir: Option<Utf8PathBuf>,
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = ConfigManager::new(&cli.config).load()?;

    std::fs::create_dir_all(&cli.destination)
        .with_context(|| format!("Failed to create destination: {}", cli.destination))?;

    let metrics = Metrics::new();
    let tags = LoftyTagReader::new();
    let report = CardCompiler::new(&cli.destination, &tags).compile(&mut config, &metrics)?;

    render_batches(&report.batches, &mut TextQrRenderer::stdout())?;

    if let Some(toc) = &report.table_of_contents {
        tracing::info!("Table of contents: {}", toc);
    }
    metrics.log_summary();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so the log file is flushed
    let _guard = tonuino_cards::logging::setup_logging(
        cli.verbose,
        cli.log_dir.as_deref(),
        APP_NAME,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    run(&cli).inspect_err(|e| tracing::error!("{:#}", e))
}
