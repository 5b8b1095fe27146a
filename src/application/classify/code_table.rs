//! Machine code to public response mapping for database errors
//!
//! The table is read-only reference data. The built-in entries live in a
//! process-wide `Lazy`; deployments may layer an override file on top once at
//! start-up, after which the table is shared behind an `Arc` and never
//! mutated.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::errors::CodeTableError;

const UNAVAILABLE: &str = "Service temporarily unavailable. Please try again later.";
const CONTACT_SUPPORT: &str = "Service is temporarily unavailable. Please contact support.";
const TIMED_OUT: &str = "The request timed out. Please try again.";

static BUILTIN_TABLE: Lazy<DatabaseCodeTable> = Lazy::new(|| {
    let mut entries = BTreeMap::new();
    let mut insert = |codes: &[&str], status: u16, message: &str| {
        for code in codes {
            entries.insert(
                (*code).to_string(),
                CodeMapping {
                    status,
                    message: message.to_string(),
                },
            );
        }
    };

    // Connectivity and start-up
    insert(
        &[
            "08000",
            "08001",
            "08003",
            "08004",
            "08006",
            "08007",
            "08P01",
            "53300",
            "57P01",
            "57P03",
            "SQLX_IO",
            "SQLX_TLS",
            "SQLX_POOL_CLOSED",
            "SQLX_WORKER_CRASHED",
        ],
        503,
        UNAVAILABLE,
    );
    insert(&["SQLX_CONFIGURATION"], 503, CONTACT_SUPPORT);

    // Timeouts
    insert(&["57014", "55P03", "SQLX_POOL_TIMED_OUT"], 504, TIMED_OUT);

    // Constraint violations
    insert(&["23505"], 409, "A record with this information already exists.");
    insert(&["23503"], 400, "Invalid reference. The related record does not exist.");
    insert(&["22001"], 400, "The provided value is too long for this field.");

    // Missing records
    insert(&["SQLX_ROW_NOT_FOUND"], 404, "The requested record does not exist.");
    insert(&["02000"], 404, "Record not found.");

    DatabaseCodeTable { entries }
});

/// Public status and message for one machine code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMapping {
    pub status: u16,
    pub message: String,
}

/// On-disk shape of an override file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTableFile {
    #[serde(default)]
    pub codes: BTreeMap<String, CodeMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseCodeTable {
    entries: BTreeMap<String, CodeMapping>,
}

impl DatabaseCodeTable {
    /// Built-in mappings shipped with the service
    pub fn builtin() -> &'static DatabaseCodeTable {
        &BUILTIN_TABLE
    }

    pub fn lookup(&self, code: &str) -> Option<&CodeMapping> {
        self.entries.get(code)
    }

    /// Layer validated overrides on top of this table. Overrides replace
    /// entries with the same code.
    pub fn with_overrides(mut self, file: CodeTableFile) -> Result<Self, CodeTableError> {
        for (code, mapping) in file.codes {
            let code = code.trim().to_string();
            if code.is_empty() {
                return Err(CodeTableError::EmptyCode);
            }
            if !(400..=599).contains(&mapping.status) {
                return Err(CodeTableError::StatusOutOfRange {
                    code,
                    status: mapping.status,
                });
            }
            if mapping.message.trim().is_empty() {
                return Err(CodeTableError::EmptyMessage(code));
            }
            self.entries.insert(code, mapping);
        }
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CodeMapping)> {
        self.entries
            .iter()
            .map(|(code, mapping)| (code.as_str(), mapping))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
