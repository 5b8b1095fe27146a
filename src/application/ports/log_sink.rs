use serde::Serialize;
use thiserror::Error;

use crate::domain::{CaughtError, ErrorCategory, ErrorClassification};

#[derive(Debug, Error)]
pub enum LogSinkError {
    #[error("Log sink unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize log entry: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One cause in the chain of a logged error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseEntry {
    pub name: String,
    pub message: String,
    pub code: Option<String>,
}

/// Everything operators get to see about a caught error.
/// This is the only place raw error detail leaves the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorLogEntry {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub category: ErrorCategory,
    pub subcode: Option<String>,
    pub status: u16,
    pub error_name: String,
    pub message: String,
    pub code: Option<String>,
    pub kind: Option<String>,
    pub stack: Option<String>,
    pub causes: Vec<CauseEntry>,
    /// Set when the error looked like a database failure and an HTTP
    /// exception at the same time; database wins
    pub ambiguous: bool,
}

impl ErrorLogEntry {
    pub fn new(
        request_id: &str,
        method: &str,
        path: &str,
        error: &CaughtError,
        classification: &ErrorClassification,
    ) -> Self {
        let causes = error
            .chain()
            .skip(1)
            .map(|cause| CauseEntry {
                name: cause.name().to_string(),
                message: cause.message().to_string(),
                code: cause.code().map(str::to_string),
            })
            .collect();

        Self {
            request_id: request_id.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            category: classification.category,
            subcode: classification.subcode.clone(),
            status: classification.status.as_u16(),
            error_name: error.name().to_string(),
            message: error.message().to_string(),
            code: error.code().map(str::to_string),
            kind: error.kind().map(|kind| format!("{:?}", kind)),
            stack: error.stack().map(str::to_string),
            causes,
            ambiguous: classification.category == ErrorCategory::Database
                && error.http().is_some(),
        }
    }
}

/// Destination for internal error diagnostics
#[cfg_attr(test, mockall::automock)]
pub trait ErrorLogSink: Send + Sync {
    fn record(&self, entry: &ErrorLogEntry) -> Result<(), LogSinkError>;
}
