//! Error types for the certwatch service
//!
//! Only run-level failures live here. A single endpoint failing is not an
//! error for the run; see [`crate::probe::ProbeFailure`].

/// Errors that can occur while running a certificate check
#[derive(Debug, thiserror::Error)]
pub enum CertwatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Notifier error: {0}")]
    Notifier(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("TLS setup error: {0}")]
    Tls(String),
}

/// Result type alias for certwatch operations
pub type Result<T> = std::result::Result<T, CertwatchError>;
