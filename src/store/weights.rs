use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::WeightTable;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("weight store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse weight store: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Weight store format version for compatibility checking
pub const STORE_VERSION: &str = "1.0.0";

/// Serializable weight store document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreData {
    pub version: String,
    pub updated_at: String,
    pub weights: WeightTable,
}

/// Load a weight table from a JSON file
///
/// # Errors
///
/// Returns `StoreError::Io` if the file cannot be read or
/// `StoreError::Parse` if the content is not a valid store document.
pub fn load_from_file(path: &Path) -> Result<WeightTable, StoreError> {
    let content = std::fs::read_to_string(path)?;
    from_json(&content)
}

/// Load a weight table, treating a missing file as an empty table so a
/// first round can bootstrap via `sync`.
///
/// # Errors
///
/// Returns an error for any failure other than the file not existing.
pub fn load_or_empty(path: &Path) -> Result<WeightTable, StoreError> {
    if path.exists() {
        load_from_file(path)
    } else {
        tracing::info!(path = %path.display(), "weight store missing, starting empty");
        Ok(WeightTable::new())
    }
}

/// Parse a weight store document from JSON
///
/// # Errors
///
/// Returns `StoreError::Parse` if the JSON is malformed.
pub fn from_json(json: &str) -> Result<WeightTable, StoreError> {
    let data: StoreData = serde_json::from_str(json)?;

    // Version check (warn but don't fail)
    if data.version != STORE_VERSION {
        tracing::warn!(
            expected = STORE_VERSION,
            found = %data.version,
            "weight store version mismatch"
        );
    }

    Ok(data.weights)
}

/// Export a weight table to a versioned JSON document
///
/// # Errors
///
/// Returns `StoreError::Parse` if serialization fails.
pub fn to_json(table: &WeightTable) -> Result<String, StoreError> {
    let data = StoreData {
        version: STORE_VERSION.to_string(),
        updated_at: chrono::Utc::now().to_rfc3339(),
        weights: table.clone(),
    };
    Ok(serde_json::to_string_pretty(&data)?)
}

/// Persist a weight table to a JSON file
///
/// # Errors
///
/// Returns `StoreError::Io` on write failure or `StoreError::Parse` on
/// serialization failure.
pub fn save_to_file(path: &Path, table: &WeightTable) -> Result<(), StoreError> {
    std::fs::write(path, to_json(table)?)?;
    Ok(())
}
