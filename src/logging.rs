use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Level used when `RUST_LOG` is not set
fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

/// Setup console logging, plus a daily rotating log file when `log_dir` is given.
///
/// # Arguments
/// * `verbose` - If true, use debug level; otherwise use info level
/// * `log_dir` - Directory for log files, created if missing
/// * `log_prefix` - Prefix for log files (e.g., "tonuino-cards")
///
/// # Returns
/// The file writer's guard, which must be held for the duration of the
/// program so buffered lines are flushed. `None` without a log directory.
pub fn setup_logging(
    verbose: bool,
    log_dir: Option<&Utf8Path>,
    log_prefix: &str,
) -> Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .boxed();

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory: {}", dir))?;
            }

            let file_appender = rolling::daily(dir, log_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false) // No ANSI codes in log files
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::debug!(
        "Logging initialized: dir={:?}, prefix={}, verbose={}",
        log_dir,
        log_prefix,
        verbose
    );

    Ok(guard)
}
