//! Error types.
//!
//! Parsing and structural errors are raised before any decision variable
//! exists, so a failed build never leaves a partial model behind.
//! Infeasibility is not an error: it is reported as a status on the
//! [`AllocationReport`](crate::models::AllocationReport).

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised while building or solving an allocation model.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// A time value is not a finite decimal.
    #[error("invalid time value {value:?}: {reason}")]
    InvalidTimeFormat { value: String, reason: String },

    /// The catalog is structurally inconsistent.
    #[error("invalid model specification: {}", join_messages(.0))]
    InvalidModelSpec(Vec<ValidationError>),

    /// The solving backend failed or did not answer before the deadline.
    #[error("solver unavailable: {0}")]
    SolverUnavailable(String),
}

impl AllocationError {
    pub(crate) fn invalid_time(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTimeFormat {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Validation errors carried by `InvalidModelSpec`, empty otherwise.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::InvalidModelSpec(errors) => errors,
            _ => &[],
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed line configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
