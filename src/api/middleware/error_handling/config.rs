use std::path::PathBuf;

/// Error handling configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorHandlingConfig {
    /// Whether 4xx HTTP errors are logged at warn level; when off they log at
    /// info. 5xx and database errors always log at warn or above.
    pub log_client_errors: bool,
    /// Optional TOML or YAML file extending the database code table
    pub code_table_path: Option<PathBuf>,
}

impl Default for ErrorHandlingConfig {
    fn default() -> Self {
        Self {
            log_client_errors: true,
            code_table_path: None,
        }
    }
}

impl ErrorHandlingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self {
            log_client_errors: std::env::var("LOG_CLIENT_ERRORS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
            code_table_path: std::env::var("ERROR_CODE_TABLE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Enable/disable client error logging
    pub fn with_client_error_logging(mut self, enabled: bool) -> Self {
        self.log_client_errors = enabled;
        self
    }

    /// Set the code table override file
    pub fn with_code_table_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.code_table_path = Some(path.into());
        self
    }
}
