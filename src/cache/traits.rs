//! Core traits and types for the caching system.

use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities that can be cached.
///
/// Implementors must provide a unique cache key; two entities with the same
/// key are the same entity and replace each other on upsert.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Unique identifier for this entity (e.g., TMDB show id)
  fn cache_key(&self) -> String;

  /// Entity type name for storage organization (e.g., "tv_show")
  fn entity_type() -> &'static str;
}

/// Indicates where the currently displayed data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheSource {
  /// Fresh data from network
  #[default]
  Network,
  /// Offline mode - network unavailable, cached data merged in
  Offline,
}
