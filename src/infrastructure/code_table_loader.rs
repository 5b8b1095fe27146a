use std::path::Path;

use tracing::info;

use crate::application::classify::{CodeTableFile, DatabaseCodeTable};
use crate::domain::errors::CodeTableError;

/// Parse an override file. `.yaml`/`.yml` files are read as YAML, anything
/// else as TOML.
pub fn read_overrides(path: &Path) -> Result<CodeTableFile, CodeTableError> {
    let content = std::fs::read_to_string(path).map_err(|source| CodeTableError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );

    if is_yaml {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(toml::from_str(&content)?)
    }
}

/// Built-in table, extended with the override file when one is configured
pub fn load_code_table(overrides: Option<&Path>) -> Result<DatabaseCodeTable, CodeTableError> {
    let table = DatabaseCodeTable::builtin().clone();

    match overrides {
        Some(path) => {
            let file = read_overrides(path)?;
            let count = file.codes.len();
            let table = table.with_overrides(file)?;
            info!(
                path = %path.display(),
                overrides = count,
                total = table.len(),
                "Loaded database code table overrides"
            );
            Ok(table)
        }
        None => Ok(table),
    }
}
