mod log_sink;

pub use log_sink::{CauseEntry, ErrorLogEntry, ErrorLogSink, LogSinkError};

#[cfg(test)]
pub use log_sink::MockErrorLogSink;
