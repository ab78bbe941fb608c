pub mod schema;

use color_eyre::{eyre::eyre, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// Database connection wrapper shared by the record cache and the settings store
pub struct Database {
  conn: Mutex<Connection>,
}

impl Database {
  /// Open or create the database at `path`
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create database directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open database at {}: {}", path.display(), e))?;

    let db = Self::from_connection(conn)?;
    info!(path = %path.display(), "database opened");
    Ok(db)
  }

  /// Open a throwaway database that lives as long as the process
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory database: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let db = Self {
      conn: Mutex::new(conn),
    };
    db.run_migrations()?;
    Ok(db)
  }

  /// Bring the schema up to `schema::CURRENT_VERSION`
  fn run_migrations(&self) -> Result<()> {
    let conn = self.lock();
    let from = schema::version(&conn).map_err(|e| eyre!("Failed to read schema version: {}", e))?;
    let to = schema::migrate(&conn).map_err(|e| eyre!("Failed to run migrations: {}", e))?;
    if from != to {
      info!(from, to, "database schema migrated");
    }
    Ok(())
  }

  /// Lock the connection.
  ///
  /// A panic while holding the lock leaves SQLite itself consistent, so a
  /// poisoned lock is recovered rather than propagated.
  pub fn lock(&self) -> MutexGuard<'_, Connection> {
    self
      .conn
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}
