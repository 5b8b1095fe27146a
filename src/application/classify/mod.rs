//! Error classification
//!
//! `ErrorClassifier::classify` is a pure, total function from a caught error
//! to exactly one [`ErrorClassification`]. Checks run in a fixed order and
//! the first match wins:
//!
//! 1. database markers (see [`predicates::is_database_shaped`])
//! 2. an HTTP self-description
//! 3. everything else is `Unknown`
//!
//! The database check is deliberately broad and runs before the HTTP check,
//! so an application exception whose text contains driver phrasing is
//! classified as a database error. The dispatcher flags such cases in the log.

pub mod code_table;
pub mod database;
pub mod http;
pub mod labels;
pub mod predicates;

use std::sync::Arc;

pub use code_table::{CodeMapping, CodeTableFile, DatabaseCodeTable};
pub use database::DatabaseErrorClassifier;
pub use labels::status_label;

use crate::domain::{CaughtError, ErrorClassification};

/// Maps a caught error to exactly one classification
pub trait Classify: Send + Sync {
    fn classify(&self, error: &CaughtError) -> ErrorClassification;
}

#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    database: DatabaseErrorClassifier,
}

impl ErrorClassifier {
    pub fn new(table: Arc<DatabaseCodeTable>) -> Self {
        Self {
            database: DatabaseErrorClassifier::new(table),
        }
    }

    pub fn classify(&self, error: &CaughtError) -> ErrorClassification {
        if predicates::is_database_shaped(error) {
            return self.database.classify(error);
        }

        if predicates::exposes_http_status(error) {
            if let Some(exception) = error.http() {
                return http::classify(exception);
            }
        }

        ErrorClassification::unknown()
    }
}

impl Classify for ErrorClassifier {
    fn classify(&self, error: &CaughtError) -> ErrorClassification {
        ErrorClassifier::classify(self, error)
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(Arc::new(DatabaseCodeTable::builtin().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCategory, HttpException, PublicMessage};
    use axum::http::StatusCode;

    #[test]
    fn test_database_checked_before_http() {
        let error = CaughtError::from(HttpException::bad_request(
            "error returned from database: value out of range",
        ));

        let result = ErrorClassifier::default().classify(&error);

        assert_eq!(result.category, ErrorCategory::Database);
    }

    #[test]
    fn test_code_only_postgres_errors_are_database() {
        let classifier = ErrorClassifier::default();

        for code in ["42P01", "42601", "28P01", "3D000"] {
            let error = CaughtError::new("relation is broken").with_code(code);
            let result = classifier.classify(&error);

            assert_eq!(result.category, ErrorCategory::Database, "{code}");
            assert_eq!(result.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(result.subcode.as_deref(), Some(code));
        }
    }

    #[test]
    fn test_no_data_code_maps_to_not_found() {
        let error = CaughtError::new("no data").with_code("02000");
        let result = ErrorClassifier::default().classify(&error);

        assert_eq!(result.category, ErrorCategory::Database);
        assert_eq!(result.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_http_exception() {
        let error = CaughtError::from(HttpException::forbidden("Not your return"));

        let result = ErrorClassifier::default().classify(&error);

        assert_eq!(result.category, ErrorCategory::Http);
        assert_eq!(result.status, StatusCode::FORBIDDEN);
        assert_eq!(result.label, "Forbidden");
    }

    #[test]
    fn test_unrecognized_shape_is_unknown() {
        let error = CaughtError::new("foo").with_name("Object");

        let result = ErrorClassifier::default().classify(&error);

        assert_eq!(result, ErrorClassification::unknown());
        assert_eq!(
            result.message,
            PublicMessage::from("An unexpected error occurred. Please try again later.")
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = ErrorClassifier::default();
        let error = CaughtError::from(sqlx::Error::PoolClosed);

        assert_eq!(classifier.classify(&error), classifier.classify(&error.clone()));
    }
}
