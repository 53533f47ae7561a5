//! Error types for the Vigil change-monitoring system.

use crate::monitor::MonitorId;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Monitor not found: {0}")]
    MonitorNotFound(MonitorId),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// API-level errors surfaced by the check engine, assist flows, and CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Monitor not found: {0}")]
    MonitorNotFound(MonitorId),

    #[error("Invalid monitor: {0}")]
    InvalidMonitor(String),

    #[error("Check already in progress for monitor {0}")]
    CheckInProgress(MonitorId),

    #[error("Observation failed: {0}")]
    ObservationFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
