use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use axum::{extract::Request, http::StatusCode, response::Response};
use tracing::debug;
use uuid::Uuid;

use super::composer::{ResponseComposer, SafeResponsePayload};
use crate::application::classify::{Classify, DatabaseCodeTable, ErrorClassifier};
use crate::application::ports::{ErrorLogEntry, ErrorLogSink};
use crate::domain::{CaughtError, ErrorClassification};
use crate::infrastructure::TracingLogSink;

/// Request metadata needed to log and answer a caught error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub request_id: String,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            request_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Method, path (without query string) and `x-request-id`, generating an
    /// id when the caller sent none
    pub fn from_request(request: &Request) -> Self {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            request_id,
        }
    }
}

/// Single entry point for every error caught while serving a request
pub struct ErrorDispatcher {
    classifier: Arc<dyn Classify>,
    sink: Arc<dyn ErrorLogSink>,
}

impl ErrorDispatcher {
    pub fn new(table: Arc<DatabaseCodeTable>, sink: Arc<dyn ErrorLogSink>) -> Self {
        Self::with_classifier(Arc::new(ErrorClassifier::new(table)), sink)
    }

    pub fn with_classifier(classifier: Arc<dyn Classify>, sink: Arc<dyn ErrorLogSink>) -> Self {
        Self { classifier, sink }
    }

    /// Classify, log and compose without building the HTTP response
    pub fn resolve(
        &self,
        error: &CaughtError,
        context: &RequestContext,
    ) -> (StatusCode, SafeResponsePayload) {
        let classification = catch_unwind(AssertUnwindSafe(|| self.classifier.classify(error)))
            .unwrap_or_else(|_| ErrorClassification::unknown());

        self.log(error, context, &classification);

        let payload = ResponseComposer::compose(
            classification.status,
            classification.label,
            classification.message,
            &context.path,
        );
        (classification.status, payload)
    }

    /// Terminal operation: the returned response is the only one sent for
    /// this error
    pub fn dispatch(&self, error: &CaughtError, context: &RequestContext) -> Response {
        let (status, payload) = self.resolve(error, context);
        ResponseComposer::write(status, payload)
    }

    // Sink failures stay here; the client response never depends on them.
    fn log(
        &self,
        error: &CaughtError,
        context: &RequestContext,
        classification: &ErrorClassification,
    ) {
        let entry = ErrorLogEntry::new(
            &context.request_id,
            &context.method,
            &context.path,
            error,
            classification,
        );

        match catch_unwind(AssertUnwindSafe(|| self.sink.record(&entry))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "Error log sink failed"),
            Err(_) => debug!("Error log sink panicked"),
        }
    }
}

impl Default for ErrorDispatcher {
    fn default() -> Self {
        Self::new(
            Arc::new(DatabaseCodeTable::builtin().clone()),
            Arc::new(TracingLogSink::default()),
        )
    }
}
