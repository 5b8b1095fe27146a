use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fixed text shown for errors with no recognizable shape
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Closed set of error categories the boundary distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    Database,
    Http,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Database => "DatabaseError",
            ErrorCategory::Http => "HttpError",
            ErrorCategory::Unknown => "UnknownError",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-facing message: a single sentence or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PublicMessage {
    Single(String),
    List(Vec<String>),
}

impl From<&str> for PublicMessage {
    fn from(message: &str) -> Self {
        PublicMessage::Single(message.to_string())
    }
}

impl From<Vec<String>> for PublicMessage {
    fn from(messages: Vec<String>) -> Self {
        PublicMessage::List(messages)
    }
}

/// Outcome of classifying one caught error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorClassification {
    pub category: ErrorCategory,
    /// Machine code for database errors
    pub subcode: Option<String>,
    pub status: StatusCode,
    pub message: PublicMessage,
    /// Human status name, e.g. "Not Found"
    pub label: &'static str,
}

impl ErrorClassification {
    pub fn unknown() -> Self {
        Self {
            category: ErrorCategory::Unknown,
            subcode: None,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: PublicMessage::from(UNKNOWN_ERROR_MESSAGE),
            label: "Internal Server Error",
        }
    }
}
