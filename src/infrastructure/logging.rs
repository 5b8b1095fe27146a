//! Tracing setup and the default error log sink

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::application::ports::{ErrorLogEntry, ErrorLogSink, LogSinkError};
use crate::domain::errors::ConfigError;
use crate::domain::ErrorCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
    }
}

/// Error log sink writing structured `tracing` events
#[derive(Debug, Clone)]
pub struct TracingLogSink {
    log_client_errors: bool,
}

impl TracingLogSink {
    pub fn new(log_client_errors: bool) -> Self {
        Self { log_client_errors }
    }
}

impl Default for TracingLogSink {
    fn default() -> Self {
        Self::new(true)
    }
}

// Every branch carries the full field set; only the level differs.
macro_rules! log_entry {
    ($level:expr, $entry:ident, $tag:ident, $code:ident, $causes:ident, $stack:ident) => {
        tracing::event!(
            $level,
            request_id = %$entry.request_id,
            method = %$entry.method,
            path = %$entry.path,
            status = $entry.status,
            category = %$entry.category,
            subcode = ?$entry.subcode,
            error_name = %$entry.error_name,
            code = %$code,
            kind = ?$entry.kind,
            causes = %$causes,
            stack = %$stack,
            ambiguous = $entry.ambiguous,
            "{} {} {} failed: {}",
            $tag,
            $entry.method,
            $entry.path,
            $entry.message
        )
    };
}

impl ErrorLogSink for TracingLogSink {
    /// Server errors log at `error`. Database errors and, unless disabled,
    /// client errors log at `warn`. Remaining client errors log at `info`.
    fn record(&self, entry: &ErrorLogEntry) -> Result<(), LogSinkError> {
        let causes = serde_json::to_string(&entry.causes)?;
        let stack = entry.stack.as_deref().unwrap_or("");
        let code = entry.code.as_deref().unwrap_or("");
        let tag = match entry.category {
            ErrorCategory::Database => "[DATABASE ERROR]",
            ErrorCategory::Http => "[HTTP ERROR]",
            ErrorCategory::Unknown => "[UNHANDLED ERROR]",
        };

        if entry.status >= 500 {
            log_entry!(Level::ERROR, entry, tag, code, causes, stack);
        } else if entry.category == ErrorCategory::Database || self.log_client_errors {
            log_entry!(Level::WARN, entry, tag, code, causes, stack);
        } else {
            log_entry!(Level::INFO, entry, tag, code, causes, stack);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::classify::ErrorClassifier;
    use crate::domain::{CaughtError, ErrorClassification, HttpException};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer};

    #[derive(Debug, Clone)]
    struct CapturedEvent {
        level: Level,
        fields: HashMap<String, String>,
    }

    /// Layer keeping every event with its fields rendered as text
    #[derive(Clone, Default)]
    struct CaptureLayer {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

    impl Visit for FieldVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{:?}", value));
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldVisitor(&mut fields));
            self.events.lock().unwrap().push(CapturedEvent {
                level: *event.metadata().level(),
                fields,
            });
        }
    }

    fn capture(sink: &TracingLogSink, entry: &ErrorLogEntry) -> Vec<CapturedEvent> {
        let layer = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());

        tracing::subscriber::with_default(subscriber, || {
            sink.record(entry).unwrap();
        });

        let events = layer.events.lock().unwrap().clone();
        events
    }

    fn entry_for(error: &CaughtError) -> ErrorLogEntry {
        let classification = ErrorClassifier::default().classify(error);
        ErrorLogEntry::new("req-7", "POST", "/v1/clients", error, &classification)
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" TEXT ".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_tracing_sink_records_without_subscriber() {
        let error = CaughtError::new("boom").with_stack("at handler");
        let entry = ErrorLogEntry::new(
            "req-1",
            "GET",
            "/health/ready",
            &error,
            &ErrorClassification::unknown(),
        );

        assert!(TracingLogSink::default().record(&entry).is_ok());
        assert!(TracingLogSink::new(false).record(&entry).is_ok());
    }

    #[test]
    fn test_client_status_database_error_keeps_code_when_client_logging_off() {
        let error = CaughtError::new(
            "duplicate key value violates unique constraint \"clients_ssn_key\"",
        )
        .with_name("sqlx_core::error::Error")
        .with_code("23505");

        let events = capture(&TracingLogSink::new(false), &entry_for(&error));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
        assert_eq!(events[0].fields["code"], "23505");
        assert_eq!(events[0].fields["category"], "DatabaseError");
        assert_eq!(events[0].fields["status"], "409");
        assert!(events[0].fields["message"].contains("[DATABASE ERROR]"));
        assert!(events[0].fields["message"].contains("clients_ssn_key"));
    }

    #[test]
    fn test_client_error_with_logging_off_keeps_full_detail() {
        let error = CaughtError::from(HttpException::not_found("Return not found"));

        let events = capture(&TracingLogSink::new(false), &entry_for(&error));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::INFO);
        for field in ["request_id", "category", "subcode", "code", "causes", "stack"] {
            assert!(events[0].fields.contains_key(field), "missing {field}");
        }
    }

    #[test]
    fn test_server_error_logs_at_error() {
        let error = CaughtError::new("boom");

        let events = capture(&TracingLogSink::default(), &entry_for(&error));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert!(events[0].fields["message"].contains("[UNHANDLED ERROR]"));
    }
}
