//! Cache storage trait and SQLite implementation.

use rusqlite::params;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::db::Database;

use super::error::CacheError;
use super::traits::Cacheable;

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Insert or replace a single entity.
  fn upsert<T: Cacheable>(&self, entity: &T) -> Result<(), CacheError>;

  /// Insert or replace many entities atomically.
  fn upsert_many<T: Cacheable>(&self, entities: &[T]) -> Result<(), CacheError>;

  /// Every cached entity of type `T`, in no particular order.
  fn read_all<T: Cacheable>(&self) -> Result<Vec<T>, CacheError>;

  /// Remove one entity by key. Removing a missing key is not an error.
  fn delete_by_id<T: Cacheable>(&self, entity_key: &str) -> Result<(), CacheError>;

  /// Remove every entity of type `T`.
  fn delete_all<T: Cacheable>(&self) -> Result<(), CacheError>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn upsert<T: Cacheable>(&self, _entity: &T) -> Result<(), CacheError> {
    Ok(()) // Discard
  }

  fn upsert_many<T: Cacheable>(&self, _entities: &[T]) -> Result<(), CacheError> {
    Ok(()) // Discard
  }

  fn read_all<T: Cacheable>(&self) -> Result<Vec<T>, CacheError> {
    Ok(Vec::new()) // Always miss
  }

  fn delete_by_id<T: Cacheable>(&self, _entity_key: &str) -> Result<(), CacheError> {
    Ok(())
  }

  fn delete_all<T: Cacheable>(&self) -> Result<(), CacheError> {
    Ok(())
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  db: Arc<Database>,
}

impl SqliteStorage {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }
}

fn serialize_entity<T: Cacheable>(entity: &T) -> Result<(String, Vec<u8>), CacheError> {
  let key = entity.cache_key();
  let data =
    serde_json::to_vec(entity).map_err(|source| CacheError::Serialization {
      key: key.clone(),
      source,
    })?;
  Ok((key, data))
}

const UPSERT_SQL: &str = "INSERT OR REPLACE INTO entity_cache (entity_type, entity_key, data, cached_at)
   VALUES (?, ?, ?, datetime('now'))";

impl CacheStorage for SqliteStorage {
  fn upsert<T: Cacheable>(&self, entity: &T) -> Result<(), CacheError> {
    let (key, data) = serialize_entity(entity)?;
    let conn = self.db.lock();
    conn.execute(UPSERT_SQL, params![T::entity_type(), key, data])?;
    Ok(())
  }

  fn upsert_many<T: Cacheable>(&self, entities: &[T]) -> Result<(), CacheError> {
    // Serialize before taking the lock so a bad entity writes nothing
    let rows = entities
      .iter()
      .map(serialize_entity)
      .collect::<Result<Vec<_>, _>>()?;

    let mut conn = self.db.lock();
    let tx = conn.transaction()?;
    {
      let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
      for (key, data) in &rows {
        stmt.execute(params![T::entity_type(), key, data])?;
      }
    }
    tx.commit()?;

    debug!(
      entity_type = T::entity_type(),
      count = rows.len(),
      "cache upserted"
    );
    Ok(())
  }

  fn read_all<T: Cacheable>(&self) -> Result<Vec<T>, CacheError> {
    let conn = self.db.lock();
    let mut stmt = conn.prepare("SELECT entity_key, data FROM entity_cache WHERE entity_type = ?")?;

    let rows = stmt
      .query_map(params![T::entity_type()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut entities = Vec::with_capacity(rows.len());
    for (key, data) in rows {
      // A row written by an older schema of `T` is skipped, not fatal
      match serde_json::from_slice::<T>(&data) {
        Ok(entity) => entities.push(entity),
        Err(e) => warn!(
          entity_type = T::entity_type(),
          key = %key,
          error = %e,
          "skipping undecodable cache entry"
        ),
      }
    }

    Ok(entities)
  }

  fn delete_by_id<T: Cacheable>(&self, entity_key: &str) -> Result<(), CacheError> {
    let conn = self.db.lock();
    conn.execute(
      "DELETE FROM entity_cache WHERE entity_type = ? AND entity_key = ?",
      params![T::entity_type(), entity_key],
    )?;
    Ok(())
  }

  fn delete_all<T: Cacheable>(&self) -> Result<(), CacheError> {
    let conn = self.db.lock();
    conn.execute(
      "DELETE FROM entity_cache WHERE entity_type = ?",
      params![T::entity_type()],
    )?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::{Deserialize, Serialize};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Item {
    id: u32,
    label: String,
  }

  impl Cacheable for Item {
    fn cache_key(&self) -> String {
      self.id.to_string()
    }

    fn entity_type() -> &'static str {
      "item"
    }
  }

  #[derive(Debug, Clone, Serialize, Deserialize)]
  struct Other {
    id: u32,
  }

  impl Cacheable for Other {
    fn cache_key(&self) -> String {
      self.id.to_string()
    }

    fn entity_type() -> &'static str {
      "other"
    }
  }

  fn item(id: u32, label: &str) -> Item {
    Item {
      id,
      label: label.to_string(),
    }
  }

  fn storage() -> SqliteStorage {
    SqliteStorage::new(Arc::new(Database::open_in_memory().unwrap()))
  }

  fn sorted(mut items: Vec<Item>) -> Vec<Item> {
    items.sort_by_key(|i| i.id);
    items
  }

  #[test]
  fn test_upsert_replaces_by_identity() {
    let storage = storage();
    storage.upsert(&item(1, "first")).unwrap();
    storage.upsert(&item(1, "second")).unwrap();

    let all: Vec<Item> = storage.read_all().unwrap();
    assert_eq!(all, vec![item(1, "second")]);
  }

  #[test]
  fn test_upsert_many_is_idempotent() {
    let storage = storage();
    let batch = vec![item(1, "a"), item(2, "b"), item(3, "c")];
    storage.upsert_many(&batch).unwrap();
    storage.upsert_many(&batch).unwrap();

    let all: Vec<Item> = storage.read_all().unwrap();
    assert_eq!(sorted(all), batch);
  }

  #[test]
  fn test_delete_by_id_and_delete_all() {
    let storage = storage();
    storage
      .upsert_many(&[item(1, "a"), item(2, "b"), item(3, "c")])
      .unwrap();
    storage.upsert(&Other { id: 1 }).unwrap();

    storage.delete_by_id::<Item>("2").unwrap();
    storage.delete_by_id::<Item>("42").unwrap();
    let all: Vec<Item> = storage.read_all().unwrap();
    assert_eq!(sorted(all), vec![item(1, "a"), item(3, "c")]);

    storage.delete_all::<Item>().unwrap();
    assert!(storage.read_all::<Item>().unwrap().is_empty());
    // Other entity types are untouched
    assert_eq!(storage.read_all::<Other>().unwrap().len(), 1);
  }

  #[test]
  fn test_read_all_skips_corrupt_rows() {
    let storage = storage();
    storage.upsert(&item(1, "ok")).unwrap();
    storage
      .db
      .lock()
      .execute(
        "INSERT INTO entity_cache (entity_type, entity_key, data) VALUES ('item', '2', x'00')",
        [],
      )
      .unwrap();

    let all: Vec<Item> = storage.read_all().unwrap();
    assert_eq!(all, vec![item(1, "ok")]);
  }

  #[test]
  fn test_noop_storage_always_misses() {
    let storage = NoopStorage;
    storage.upsert(&item(1, "a")).unwrap();
    assert!(storage.read_all::<Item>().unwrap().is_empty());
  }
}
