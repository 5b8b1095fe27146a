use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::domain::{CaughtError, HttpException};

/// Raised error travelling from a handler to the error handling layer in
/// the response extensions
#[derive(Debug, Clone)]
pub struct RaisedError(Arc<CaughtError>);

impl RaisedError {
    pub fn error(&self) -> &CaughtError {
        &self.0
    }
}

/// A bodiless 500 carrying the error for `ErrorHandlingLayer`. Without the
/// layer the client still sees nothing of the error.
impl IntoResponse for CaughtError {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response
            .extensions_mut()
            .insert(RaisedError(Arc::new(self)));
        response
    }
}

impl IntoResponse for HttpException {
    fn into_response(self) -> Response {
        CaughtError::from(self).into_response()
    }
}

// Convert extractor and validation failures to HTTP exceptions

impl From<JsonRejection> for HttpException {
    fn from(rejection: JsonRejection) -> Self {
        HttpException::new(rejection.status(), rejection.body_text())
    }
}

impl From<JsonRejection> for CaughtError {
    fn from(rejection: JsonRejection) -> Self {
        HttpException::from(rejection).into()
    }
}

/// One message per failing rule, ordered by field path
impl From<ValidationErrors> for HttpException {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_messages("", &errors, &mut messages);
        messages.sort();

        HttpException::new(
            StatusCode::BAD_REQUEST,
            json!({
                "statusCode": StatusCode::BAD_REQUEST.as_u16(),
                "message": messages,
                "error": "Bad Request",
            }),
        )
    }
}

impl From<ValidationErrors> for CaughtError {
    fn from(errors: ValidationErrors) -> Self {
        HttpException::from(errors).into()
    }
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(message) => format!("{} {}", path, message),
                        None => format!("{} is invalid ({})", path, error.code),
                    };
                    out.push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}
