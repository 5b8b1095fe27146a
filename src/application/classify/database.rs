use std::sync::Arc;

use axum::http::StatusCode;

use super::code_table::DatabaseCodeTable;
use super::labels::status_label;
use super::predicates;
use crate::domain::{CaughtError, ErrorCategory, ErrorClassification, PublicMessage};

pub const NETWORK_FAILURE_MESSAGE: &str =
    "Service temporarily unavailable. Please try again in a few moments.";
pub const GENERIC_DATABASE_MESSAGE: &str =
    "A database error occurred. Please try again or contact support.";

/// Subcode used when no machine code could be found on the error
pub const UNKNOWN_SUBCODE: &str = "UNKNOWN";

/// Maps persistence-layer failures to safe responses
#[derive(Debug, Clone)]
pub struct DatabaseErrorClassifier {
    table: Arc<DatabaseCodeTable>,
}

impl DatabaseErrorClassifier {
    pub fn new(table: Arc<DatabaseCodeTable>) -> Self {
        Self { table }
    }

    pub fn classify(&self, error: &CaughtError) -> ErrorClassification {
        let code = machine_code(error);

        let (status, message) = match code.as_deref().and_then(|c| self.table.lookup(c)) {
            Some(mapping) => (
                StatusCode::from_u16(mapping.status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                mapping.message.clone(),
            ),
            None if predicates::mentions_network_failure(error) => (
                StatusCode::SERVICE_UNAVAILABLE,
                NETWORK_FAILURE_MESSAGE.to_string(),
            ),
            None => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_DATABASE_MESSAGE.to_string(),
            ),
        };

        ErrorClassification {
            category: ErrorCategory::Database,
            subcode: Some(code.unwrap_or_else(|| UNKNOWN_SUBCODE.to_string())),
            status,
            message: PublicMessage::Single(message),
            label: status_label(status),
        }
    }
}

/// First machine code in the chain; a structured kind stands in when the
/// driver reported no code
fn machine_code(error: &CaughtError) -> Option<String> {
    error
        .chain()
        .find_map(CaughtError::code)
        .map(str::to_string)
        .or_else(|| {
            error
                .chain()
                .find_map(|err| err.kind().and_then(|kind| kind.sqlstate()))
                .map(str::to_string)
        })
}
