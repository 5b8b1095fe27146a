use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::PublicMessage;

/// Client-safe error body. Never carries stack traces, machine codes,
/// SQL or driver names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SafeResponsePayload {
    /// Always `false`
    pub success: bool,
    pub status_code: u16,
    /// Human status name, e.g. "Not Found"
    pub error: String,
    pub message: PublicMessage,
    /// UTC, ISO-8601 with millisecond precision
    pub timestamp: String,
    pub path: String,
}

/// Builds and writes the safe response for a caught error
pub struct ResponseComposer;

impl ResponseComposer {
    pub fn compose(
        status: StatusCode,
        label: &str,
        message: PublicMessage,
        path: &str,
    ) -> SafeResponsePayload {
        SafeResponsePayload {
            success: false,
            status_code: status.as_u16(),
            error: label.to_string(),
            message,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            path: path.to_string(),
        }
    }

    pub fn write(status: StatusCode, payload: SafeResponsePayload) -> Response {
        (status, Json(payload)).into_response()
    }
}
