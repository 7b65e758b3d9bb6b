use crate::config::ConfigError;
use crate::marketplace::{PhotoStorageError, RepositoryError, ServiceError};
use crate::telemetry::TelemetryError;

/// Failures that abort startup or one of the CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("document store error: {0}")]
    Store(#[from] RepositoryError),
    #[error("photo storage error: {0}")]
    Photos(#[from] PhotoStorageError),
    #[error("seed error: {0}")]
    Seed(#[from] ServiceError),
}
