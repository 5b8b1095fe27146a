use thiserror::Error;

/// Failures while building the database code table
#[derive(Debug, Error)]
pub enum CodeTableError {
    #[error("Failed to read code table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in code table: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid YAML in code table: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Status {status} for code '{code}' is outside 400-599")]
    StatusOutOfRange { code: String, status: u16 },

    #[error("Code table entry has an empty code")]
    EmptyCode,

    #[error("Code table entry '{0}' has an empty message")]
    EmptyMessage(String),
}

/// Invalid service configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LISTEN_ADDR cannot be empty")]
    EmptyListenAddr,

    #[error("DATABASE_URL must start with postgres:// or postgresql://")]
    InvalidDatabaseUrl,

    #[error("LOG_FORMAT must be 'text' or 'json', got '{0}'")]
    InvalidLogFormat(String),

    #[error("DB_ACQUIRE_TIMEOUT_SECS must be between 1 and 60")]
    InvalidAcquireTimeout,
}
