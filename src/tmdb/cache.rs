//! Caching implementations for TMDB types.

use crate::cache::Cacheable;

use super::types::Show;

impl Cacheable for Show {
  fn cache_key(&self) -> String {
    self.id.to_string()
  }

  fn entity_type() -> &'static str {
    "tv_show"
  }
}
