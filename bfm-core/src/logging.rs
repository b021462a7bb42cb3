//! src/logging.rs
//! Structured JSON logging to a rolling file.
//!
//! The terminal belongs to the UI, so every event goes to
//! `<log_dir>/bfm.<date>.jsonl` through a non-blocking writer. The returned
//! `WorkerGuard` must live until exit or buffered lines are lost.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use compact_str::CompactString;
use tokio::fs as TokioFs;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogRotation, LoggingConfig};

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub log_dir: PathBuf,
    pub log_file_prefix: CompactString,
    pub log_level: CompactString,
    pub max_log_files: usize,
    pub rotation: LogRotation,
}

impl LoggerConfig {
    pub fn new(config: &LoggingConfig, log_dir: PathBuf) -> Self {
        Self {
            log_dir,
            log_file_prefix: CompactString::from("bfm"),
            log_level: CompactString::new(&config.level),
            max_log_files: config.max_log_files,
            rotation: config.rotation,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log directory: {0}")]
    InvalidLogDirectory(String),

    #[error("Failed to create log directory: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub struct Logger;

impl Logger {
    /// Install the global subscriber. `RUST_LOG` overrides the configured
    /// level.
    pub async fn init_tracing(config: LoggerConfig) -> Result<WorkerGuard> {
        validate_config(&config)?;
        setup_log_directory(&config.log_dir).await?;

        let (non_blocking, guard) = tracing_appender::non_blocking(build_appender(&config)?);

        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(config.log_level.as_str())
                .context("Invalid log level in config")?,
        };

        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .context("Failed to install global tracing subscriber")?;

        Ok(guard)
    }
}

fn build_appender(config: &LoggerConfig) -> Result<RollingFileAppender> {
    let rotation = match config.rotation {
        LogRotation::Never => Rotation::NEVER,
        LogRotation::Daily => Rotation::DAILY,
    };

    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(config.log_file_prefix.as_str())
        .filename_suffix("jsonl")
        .max_log_files(config.max_log_files)
        .build(&config.log_dir)
        .context("Failed to create file appender")
}

fn validate_config(config: &LoggerConfig) -> Result<()> {
    if config.max_log_files == 0 {
        return Err(
            LoggingError::ConfigError("max_log_files must be greater than 0".to_string()).into(),
        );
    }

    validate_log_directory(&config.log_dir)?;
    Ok(())
}

fn validate_log_directory(path: &Path) -> Result<()> {
    if path.components().count() == 0 {
        return Err(LoggingError::InvalidLogDirectory("Empty path".to_string()).into());
    }

    if path.components().any(|c| c == Component::ParentDir) {
        return Err(LoggingError::InvalidLogDirectory(
            "Path contains parent directory references".to_string(),
        )
        .into());
    }

    Ok(())
}

async fn setup_log_directory(log_dir: &Path) -> Result<()> {
    if !log_dir.exists() {
        TokioFs::create_dir_all(log_dir)
            .await
            .map_err(LoggingError::from)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }
    Ok(())
}
