//! Persistent key/value store for small scalars (image base URL, language,
//! configuration timestamp).

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

use crate::cache::CacheError;
use crate::db::Database;

/// Well-known setting keys
pub mod keys {
  pub const SECURE_BASE_URL: &str = "secure_base_url";
  pub const UPDATED: &str = "updated";
  pub const LANGUAGE: &str = "language";
}

/// Trait for settings storage backends.
pub trait SettingsStore: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

  fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

  /// Read an RFC 3339 timestamp.
  fn get_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, CacheError> {
    match self.get(key)? {
      None => Ok(None),
      Some(raw) => DateTime::parse_from_rfc3339(&raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|e| CacheError::InvalidValue {
          key: key.to_string(),
          reason: e.to_string(),
        }),
    }
  }

  fn set_timestamp(&self, key: &str, value: DateTime<Utc>) -> Result<(), CacheError> {
    self.set(key, &value.to_rfc3339())
  }
}

/// Settings kept in the `settings` table of the shared database
pub struct SqliteSettings {
  db: Arc<Database>,
}

impl SqliteSettings {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }
}

impl SettingsStore for SqliteSettings {
  fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
    let conn = self.db.lock();
    let value: Option<String> = conn
      .query_row(
        "SELECT value FROM settings WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }

  fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
    let conn = self.db.lock();
    conn.execute(
      "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, datetime('now'))",
      params![key, value],
    )?;
    Ok(())
  }
}
