//! Shape predicates used by the classifier
//!
//! Database failures surface as typed `sqlx` errors, as `anyhow` chains that
//! wrap them, or only as driver text inside some other error. The database
//! check is therefore a union of independent predicates, each of which looks
//! through the whole cause chain.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::CaughtError;

/// Substrings of error type names that identify the persistence driver
pub const PROVIDER_NAME_MARKERS: &[&str] = &["sqlx", "PgDatabaseError"];

/// Driver phrasing that only appears in persistence-layer errors
pub const PROVIDER_MESSAGE_MARKERS: &[&str] = &[
    "error returned from database",
    "error communicating with database",
    "pool timed out while waiting for an open connection",
    "attempted to acquire a connection on a closed pool",
    "no rows returned by a query that expected to return at least one row",
    "error occurred while decoding column",
];

/// Lowercased phrases that indicate the database could not be reached
pub const NETWORK_FAILURE_MARKERS: &[&str] = &[
    "connection refused",
    "timed out",
    "error communicating with database",
];

/// Synthetic driver codes and any five character SQLSTATE
static PROVIDER_CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(SQLX_[A-Z_]+|[0-9A-Z]{5})$")
        .expect("Invalid provider code pattern")
});

pub fn has_provider_name(error: &CaughtError) -> bool {
    error.chain().any(|err| {
        PROVIDER_NAME_MARKERS
            .iter()
            .any(|marker| err.name().contains(marker))
    })
}

pub fn has_provider_code(error: &CaughtError) -> bool {
    error
        .chain()
        .filter_map(CaughtError::code)
        .any(|code| PROVIDER_CODE_PATTERN.is_match(code))
}

pub fn has_client_version(error: &CaughtError) -> bool {
    error.chain().any(|err| err.client_version().is_some())
}

pub fn has_provider_message(error: &CaughtError) -> bool {
    error.chain().any(|err| {
        PROVIDER_MESSAGE_MARKERS
            .iter()
            .any(|marker| err.message().contains(marker))
    })
}

pub fn is_database_shaped(error: &CaughtError) -> bool {
    has_provider_name(error)
        || has_provider_code(error)
        || has_client_version(error)
        || has_provider_message(error)
}

/// The error already carries its own HTTP status
pub fn exposes_http_status(error: &CaughtError) -> bool {
    error.http().is_some()
}

pub fn mentions_network_failure(error: &CaughtError) -> bool {
    error.chain().any(|err| {
        let message = err.message().to_lowercase();
        NETWORK_FAILURE_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    })
}
