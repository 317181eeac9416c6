//! Console and daily rotated file logging.
use anyhow::{Context as _, Result};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer as _, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use crate::config::Config;

pub const LOG_FILE_PREFIX: &str = "sweepsage.log";

/// Parses a level name case-insensitively, accepting `warning` and `critical` as aliases.
///
/// Unknown names yield `default`.
pub fn parse_level(name: &str, default: LevelFilter) -> LevelFilter {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" | "critical" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => default,
    }
}

/// Installs the global subscriber.
///
/// The console follows `RUST_LOG` when set, the configured console level otherwise. The file
/// layer writes `<log_dir>/sweepsage.log.YYYY-MM-DD`. Keep the returned guard alive until exit,
/// dropping it flushes the file writer.
///
/// # Errors
///
/// Fails if the log directory cannot be created or a subscriber is already installed.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let logging = &config.logging;
    let log_dir = config.resolve(&logging.log_dir);
    fs_err::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let console_level = parse_level(&logging.console_level, LevelFilter::INFO);
    let file_level = parse_level(&logging.file_level, LevelFilter::DEBUG);

    let console_filter = EnvFilter::builder()
        .with_default_directive(console_level.into())
        .from_env_lossy();

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .with_filter(console_filter);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(file_level);

    tracing_subscriber::registry()
        .with(vec![console_layer.boxed(), file_layer.boxed()])
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::debug!(log_dir = %log_dir.display(), %console_level, %file_level, "Logging initialized");
    Ok(guard)
}
