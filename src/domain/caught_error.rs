//! Normalized view of an error raised while serving a request
//!
//! Failures reach the HTTP boundary in several incompatible shapes: typed
//! `sqlx` errors, application-raised [`HttpException`]s, `anyhow` chains with
//! context, or panics. [`CaughtError`] flattens all of them into one owned
//! value so classification can run as a pure function over plain data.

use std::any::Any;
use std::backtrace::BacktraceStatus;
use std::error::Error as StdError;

use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Driver marker recorded on every error converted from `sqlx`
pub const SQLX_CLIENT_VERSION: &str = "sqlx-postgres/0.8";

/// Structured discriminator for constraint failures reported by the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    NotNullViolation,
    CheckViolation,
    Other,
}

impl ErrorKind {
    /// SQLSTATE code the database reports for this kind of failure
    pub fn sqlstate(&self) -> Option<&'static str> {
        match self {
            ErrorKind::UniqueViolation => Some("23505"),
            ErrorKind::ForeignKeyViolation => Some("23503"),
            ErrorKind::NotNullViolation => Some("23502"),
            ErrorKind::CheckViolation => Some("23514"),
            ErrorKind::Other => None,
        }
    }
}

impl From<sqlx::error::ErrorKind> for ErrorKind {
    fn from(kind: sqlx::error::ErrorKind) -> Self {
        match kind {
            sqlx::error::ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
            sqlx::error::ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
            sqlx::error::ErrorKind::NotNullViolation => ErrorKind::NotNullViolation,
            sqlx::error::ErrorKind::CheckViolation => ErrorKind::CheckViolation,
            _ => ErrorKind::Other,
        }
    }
}

/// Response description attached to an [`HttpException`]
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDescription {
    /// Plain text description
    Text(String),
    /// Structured body, usually an object with a `message` field
    Body(Value),
}

impl From<&str> for ErrorDescription {
    fn from(text: &str) -> Self {
        ErrorDescription::Text(text.to_string())
    }
}

impl From<String> for ErrorDescription {
    fn from(text: String) -> Self {
        ErrorDescription::Text(text)
    }
}

impl From<Value> for ErrorDescription {
    fn from(body: Value) -> Self {
        ErrorDescription::Body(body)
    }
}

/// Error deliberately raised by request handling code with an intended
/// status and message
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct HttpException {
    status: StatusCode,
    message: String,
    response: ErrorDescription,
}

impl HttpException {
    pub fn new(status: StatusCode, response: impl Into<ErrorDescription>) -> Self {
        let response = response.into();
        let message = match &response {
            ErrorDescription::Text(text) => text.clone(),
            ErrorDescription::Body(body) => body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Http Exception")
                        .to_string()
                }),
        };

        Self {
            status,
            message,
            response,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into())
    }

    /// 422 carrying one message per failed field
    pub fn unprocessable(messages: Vec<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            serde_json::json!({
                "statusCode": StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                "message": messages,
                "error": "Unprocessable Entity",
            }),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn response(&self) -> &ErrorDescription {
        &self.response
    }
}

/// Error intercepted at the HTTP boundary
#[derive(Debug, Clone, PartialEq)]
pub struct CaughtError {
    name: String,
    message: String,
    code: Option<String>,
    client_version: Option<String>,
    kind: Option<ErrorKind>,
    stack: Option<String>,
    cause: Option<Box<CaughtError>>,
    http: Option<HttpException>,
}

impl CaughtError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: "Error".to_string(),
            message: message.into(),
            code: None,
            client_version: None,
            kind: None,
            stack: None,
            cause: None,
            http: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = Some(version.into());
        self
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_cause(mut self, cause: CaughtError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn client_version(&self) -> Option<&str> {
        self.client_version.as_deref()
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    pub fn cause(&self) -> Option<&CaughtError> {
        self.cause.as_deref()
    }

    /// HTTP self-description, present only for application-raised errors
    pub fn http(&self) -> Option<&HttpException> {
        self.http.as_ref()
    }

    /// This error followed by its nested causes, outermost first
    pub fn chain(&self) -> impl Iterator<Item = &CaughtError> {
        std::iter::successors(Some(self), |err| err.cause())
    }

    /// Convert a `sqlx` error, keeping SQLSTATE codes for database errors and
    /// assigning a synthetic `SQLX_*` code to driver-level failures
    pub fn from_sqlx(err: &sqlx::Error) -> Self {
        let (code, kind) = match err {
            sqlx::Error::Database(db_err) => (
                db_err.code().map(|code| code.into_owned()),
                Some(ErrorKind::from(db_err.kind())),
            ),
            other => (Some(sqlx_code(other).to_string()), None),
        };

        Self {
            name: std::any::type_name::<sqlx::Error>().to_string(),
            message: err.to_string(),
            code,
            client_version: Some(SQLX_CLIENT_VERSION.to_string()),
            kind,
            stack: None,
            cause: None,
            http: None,
        }
    }

    /// Convert any standard error, walking its `source()` chain
    pub fn from_std_error(err: &(dyn StdError + 'static)) -> Self {
        if let Some(sqlx_err) = err.downcast_ref::<sqlx::Error>() {
            return Self::from_sqlx(sqlx_err);
        }

        let mut caught = match err.downcast_ref::<HttpException>() {
            Some(http) => Self::from(http.clone()),
            None => Self::new(err.to_string()),
        };
        if let Some(source) = err.source() {
            caught.cause = Some(Box::new(Self::from_std_error(source)));
        }
        caught
    }

    /// Convert a panic payload caught while running a handler
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "handler panicked".to_string()
        };

        Self::new(message).with_name("panic")
    }
}

fn sqlx_code(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::Configuration(_) => "SQLX_CONFIGURATION",
        sqlx::Error::Io(_) => "SQLX_IO",
        sqlx::Error::Tls(_) => "SQLX_TLS",
        sqlx::Error::Protocol(_) => "SQLX_PROTOCOL",
        sqlx::Error::RowNotFound => "SQLX_ROW_NOT_FOUND",
        sqlx::Error::TypeNotFound { .. } => "SQLX_TYPE_NOT_FOUND",
        sqlx::Error::ColumnIndexOutOfBounds { .. } => "SQLX_COLUMN_INDEX_OUT_OF_BOUNDS",
        sqlx::Error::ColumnNotFound(_) => "SQLX_COLUMN_NOT_FOUND",
        sqlx::Error::ColumnDecode { .. } => "SQLX_COLUMN_DECODE",
        sqlx::Error::Decode(_) => "SQLX_DECODE",
        sqlx::Error::PoolTimedOut => "SQLX_POOL_TIMED_OUT",
        sqlx::Error::PoolClosed => "SQLX_POOL_CLOSED",
        sqlx::Error::WorkerCrashed => "SQLX_WORKER_CRASHED",
        _ => "SQLX_OTHER",
    }
}

impl From<sqlx::Error> for CaughtError {
    fn from(err: sqlx::Error) -> Self {
        Self::from_sqlx(&err)
    }
}

impl From<HttpException> for CaughtError {
    fn from(exception: HttpException) -> Self {
        Self {
            name: "HttpException".to_string(),
            message: exception.message.clone(),
            code: None,
            client_version: None,
            kind: None,
            stack: None,
            cause: None,
            http: Some(exception),
        }
    }
}

impl From<anyhow::Error> for CaughtError {
    fn from(err: anyhow::Error) -> Self {
        let root: &(dyn StdError + Send + Sync + 'static) = err.as_ref();
        let mut caught = Self::from_std_error(root);

        // anyhow sees through context layers, so an exception wrapped in
        // context still self-describes as HTTP
        if caught.http.is_none() {
            caught.http = err.downcast_ref::<HttpException>().cloned();
        }
        if caught.stack.is_none() {
            let backtrace = err.backtrace();
            if backtrace.status() == BacktraceStatus::Captured {
                caught.stack = Some(backtrace.to_string());
            }
        }
        caught
    }
}
