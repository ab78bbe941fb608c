use std::collections::HashSet;

use crate::cache::CacheSource;
use crate::tmdb::{Page, Show, ShowId};

/// Everything loaded so far plus the pagination cursor.
///
/// `records` never holds two shows with the same id and keeps first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
  pub current_page: u32,
  pub can_load_next_page: bool,
  pub records: Vec<Show>,
  /// Epoch of this content; results fetched for another generation are stale
  pub generation: u64,
  /// Whether the last merge came from the network or the offline cache
  pub source: CacheSource,
}

impl Content {
  pub fn new(generation: u64) -> Self {
    Self {
      current_page: 0,
      can_load_next_page: true,
      records: Vec::new(),
      generation,
      source: CacheSource::Network,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn get(&self, id: ShowId) -> Option<&Show> {
    self.records.iter().find(|show| show.id == id)
  }

  /// Append shows whose id is not present yet. Returns how many were added.
  ///
  /// Later duplicates are dropped rather than replacing the earlier entry.
  pub fn append(&mut self, incoming: impl IntoIterator<Item = Show>) -> usize {
    let mut seen: HashSet<ShowId> = self.records.iter().map(|show| show.id).collect();
    let before = self.records.len();

    for show in incoming {
      if seen.insert(show.id) {
        self.records.push(show);
      }
    }

    self.records.len() - before
  }

  /// Merge a freshly fetched page and advance the cursor.
  pub fn apply_page(&mut self, page: Page) {
    self.append(page.records);
    self.current_page = page.page;
    self.can_load_next_page = self.current_page <= page.total_pages;
    self.source = CacheSource::Network;
  }
}
