//! Versioned schema. `PRAGMA user_version` records how many entries of
//! `MIGRATIONS` have been applied; new versions are appended, never edited.

use rusqlite::Connection;

const MIGRATIONS: &[&str] = &[
  // 1: entity cache and key/value settings
  r#"
CREATE TABLE IF NOT EXISTS entity_cache (
    entity_type TEXT NOT NULL,
    entity_key TEXT NOT NULL,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (entity_type, entity_key)
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];

pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

pub fn version(conn: &Connection) -> rusqlite::Result<u32> {
  conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Apply every migration newer than the stored version. Returns the new version.
pub fn migrate(conn: &Connection) -> rusqlite::Result<u32> {
  let current = version(conn)?;

  for (index, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
    let next = index as u32 + 1;
    conn.execute_batch(&format!(
      "BEGIN;\n{sql}\nPRAGMA user_version = {next};\nCOMMIT;"
    ))?;
  }

  version(conn)
}
