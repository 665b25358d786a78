//! Error types for the monitoring agent.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    #[error("Exporter error: {0}")]
    Exporter(#[from] ExporterError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration resolution, loading, and watching errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The environment variable naming the config file is not set.
    #[error("config environment variable '{var}' is not set")]
    SourceNotConfigured { var: &'static str },

    /// The resolved config file could not be opened or read.
    #[error("failed to read config file '{path}': {source}")]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file contents did not parse into the expected schema.
    #[error("failed to parse config file '{path}': {source}")]
    SourceInvalid {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// The file-watch mechanism could not be created or the path registered.
    #[error("failed to watch config file '{path}': {source}")]
    WatchSetupFailed {
        path: PathBuf,
        source: notify::Error,
    },
}

/// Process statistics collection errors.
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("failed to enumerate processes under '{path}': {source}")]
    ProcUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Alert dispatch errors.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Slack webhook failed: {0}")]
    SlackFailed(String),

    #[error("HTTP request failed: {0}")]
    HttpFailed(#[from] reqwest::Error),
}

/// Metrics export errors.
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Prometheus metrics export failed: {0}")]
    PrometheusFailed(String),
}
