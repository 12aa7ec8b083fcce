use thiserror::Error;

/// Unified error type for configuration loading and service access.
#[derive(Error, Debug)]
pub enum IntakeError {
    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Service errors ─────────────────────────────────────────
    #[error("service unreachable: {endpoint}: {reason}")]
    Service { endpoint: String, reason: String },

    #[error("unexpected status from {endpoint}: {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    #[error("contract violation: {endpoint}: {reason}")]
    ContractViolation { endpoint: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl IntakeError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
