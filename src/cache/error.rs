use thiserror::Error;

/// Errors that can occur during cache and settings operations
#[derive(Debug, Error)]
pub enum CacheError {
  #[error("SQLite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("Failed to serialize entity {key}: {source}")]
  Serialization {
    key: String,
    source: serde_json::Error,
  },

  #[error("Stored value for {key} is invalid: {reason}")]
  InvalidValue { key: String, reason: String },
}
