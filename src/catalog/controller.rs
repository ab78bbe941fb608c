//! Pagination controller: owns the loaded content, drives fetch-merge-cache and
//! decides when a failure falls back to cached data.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, CacheSource, CacheStorage};
use crate::settings::{keys, SettingsStore};
use crate::tmdb::{FetchError, Fetcher, Page, Show, ShowId};

use super::content::Content;
use super::state::ViewState;

/// Image base URL used until `/configuration` has been fetched once
pub const DEFAULT_SECURE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Age in whole days at which the stored configuration is refreshed
pub const CONFIGURATION_TTL_DAYS: i64 = 5;

/// What to do when a cache call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheErrorPolicy {
  /// Log a warning and carry on as if the cache call succeeded
  #[default]
  Log,
  /// Raise the error banner and keep the message in `last_cache_error`
  Strict,
}

/// Handle for one in-flight page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
  pub generation: u64,
  pub page: u32,
  pub language: String,
}

#[derive(Debug)]
enum Phase {
  Idle,
  Loading,
  Loaded,
  Failed(FetchError),
}

pub struct CatalogController<F, C, S> {
  fetcher: Arc<F>,
  cache: C,
  settings: S,
  content: Content,
  phase: Phase,
  /// Dismissible banner: a fetch failed but content is still shown
  has_error: bool,
  last_error: Option<FetchError>,
  last_cache_error: Option<String>,
  /// A page fetch has been handed out and not yet finished
  busy: bool,
  language: String,
  selected: Option<Show>,
  cache_policy: CacheErrorPolicy,
}

impl<F, C, S> CatalogController<F, C, S>
where
  F: Fetcher,
  C: CacheStorage,
  S: SettingsStore,
{
  /// Create a controller with empty content.
  ///
  /// The language is the one stored in `settings`, or `default_language` if
  /// none has been chosen yet.
  pub fn new(fetcher: F, cache: C, settings: S, default_language: &str) -> Self {
    let language = match settings.get(keys::LANGUAGE) {
      Ok(Some(language)) => language,
      Ok(None) => default_language.to_string(),
      Err(e) => {
        warn!(error = %e, "failed to read stored language");
        default_language.to_string()
      }
    };

    Self {
      fetcher: Arc::new(fetcher),
      cache,
      settings,
      content: Content::new(0),
      phase: Phase::Idle,
      has_error: false,
      last_error: None,
      last_cache_error: None,
      busy: false,
      language,
      selected: None,
      cache_policy: CacheErrorPolicy::default(),
    }
  }

  pub fn with_cache_policy(mut self, policy: CacheErrorPolicy) -> Self {
    self.cache_policy = policy;
    self
  }

  // ==========================================================================
  // Accessors for the presentation layer
  // ==========================================================================

  /// Current view state, derived from the content and the last outcome.
  pub fn state(&self) -> ViewState<&Content, &FetchError> {
    match &self.phase {
      Phase::Idle => ViewState::Idle,
      Phase::Loading => ViewState::Loading,
      Phase::Loaded => ViewState::Success(&self.content),
      Phase::Failed(err) => ViewState::Failed(err),
    }
  }

  pub fn content(&self) -> &Content {
    &self.content
  }

  pub fn has_error(&self) -> bool {
    self.has_error
  }

  pub fn last_error(&self) -> Option<&FetchError> {
    self.last_error.as_ref()
  }

  pub fn last_cache_error(&self) -> Option<&str> {
    self.last_cache_error.as_deref()
  }

  pub fn is_busy(&self) -> bool {
    self.busy
  }

  pub fn language(&self) -> &str {
    &self.language
  }

  pub fn selected(&self) -> Option<&Show> {
    self.selected.as_ref()
  }

  /// Shared handle to the fetcher, for running requests off the owning task.
  pub fn fetcher(&self) -> Arc<F> {
    Arc::clone(&self.fetcher)
  }

  /// Image base URL from the settings store, or the built-in default.
  pub fn secure_base_url(&self) -> String {
    match self.settings.get(keys::SECURE_BASE_URL) {
      Ok(Some(url)) => url,
      Ok(None) => DEFAULT_SECURE_BASE_URL.to_string(),
      Err(e) => {
        warn!(error = %e, "failed to read secure_base_url");
        DEFAULT_SECURE_BASE_URL.to_string()
      }
    }
  }

  // ==========================================================================
  // Pagination
  // ==========================================================================

  /// Fetch and merge the next page.
  pub async fn load_next_page(&mut self) {
    let Some(ticket) = self.begin_load() else {
      return;
    };
    let result = self
      .fetcher
      .fetch_page(&ticket.language, ticket.page)
      .await;
    self.finish_load(ticket, result);
  }

  /// Start a page fetch if one is allowed.
  ///
  /// Returns `None` when the end of the list has been reached or a fetch is
  /// already in flight. The caller must run the fetch and hand the outcome to
  /// [`finish_load`](Self::finish_load).
  pub fn begin_load(&mut self) -> Option<PageTicket> {
    if !self.content.can_load_next_page {
      debug!(page = self.content.current_page, "no more pages to load");
      return None;
    }
    if self.busy {
      debug!("page fetch already in flight");
      return None;
    }
    let Some(next_page) = self.content.current_page.checked_add(1) else {
      debug!(page = self.content.current_page, "page counter exhausted");
      self.content.can_load_next_page = false;
      return None;
    };

    // Only a fresh list shows the loading indicator
    if self.content.is_empty() {
      self.phase = Phase::Loading;
    }
    self.has_error = false;
    self.busy = true;

    let ticket = PageTicket {
      generation: self.content.generation,
      page: next_page,
      language: self.language.clone(),
    };
    debug!(page = ticket.page, generation = ticket.generation, language = %ticket.language, "loading page");
    Some(ticket)
  }

  /// Apply the outcome of a fetch started by `begin_load`.
  ///
  /// Returns `false` if the ticket belongs to content that has since been
  /// reset; such results are dropped.
  pub fn finish_load(&mut self, ticket: PageTicket, result: Result<Page, FetchError>) -> bool {
    if ticket.generation != self.content.generation {
      debug!(
        page = ticket.page,
        ticket_generation = ticket.generation,
        generation = self.content.generation,
        "discarding result for reset content"
      );
      return false;
    }
    self.busy = false;

    match result {
      Ok(page) => self.apply_page(page),
      Err(err) => self.apply_failure(err),
    }
    true
  }

  fn apply_page(&mut self, page: Page) {
    let fetched = page.records.len();
    self.content.apply_page(page);

    let stored = self.cache.upsert_many(&self.content.records);
    self.check_cache("store page", stored);

    self.phase = Phase::Loaded;
    self.last_error = None;
    info!(
      page = self.content.current_page,
      fetched,
      total = self.content.records.len(),
      can_load_next_page = self.content.can_load_next_page,
      "page loaded"
    );
  }

  fn apply_failure(&mut self, err: FetchError) {
    warn!(error = %err, page = self.content.current_page.saturating_add(1), "page fetch failed");

    if err.is_transport() {
      match self.cache.read_all::<Show>() {
        Ok(cached) => {
          let added = self.content.append(cached);
          info!(added, "merged cached shows after transport failure");
        }
        Err(e) => self.check_cache("read cached shows", Err(e)),
      }

      if self.content.is_empty() {
        self.phase = Phase::Failed(err.clone());
      } else {
        self.content.source = CacheSource::Offline;
        self.phase = Phase::Loaded;
        self.has_error = true;
      }
    } else if self.content.is_empty() {
      self.phase = Phase::Failed(err.clone());
    } else {
      self.has_error = true;
    }

    self.last_error = Some(err);
  }

  /// Throw away all content and start over from page 1.
  pub async fn reset(&mut self) {
    self.restart();
    self.load_next_page().await;
  }

  /// Replace content with an empty one of the next generation.
  ///
  /// Any fetch still in flight for the old content will be discarded.
  pub fn restart(&mut self) {
    let generation = self.content.generation + 1;
    self.content = Content::new(generation);
    self.busy = false;
    self.has_error = false;
    info!(generation, "content reset");
  }

  // ==========================================================================
  // Detail
  // ==========================================================================

  /// Load the full record for `summary`. Never fails: on any error the summary
  /// itself is returned.
  pub async fn load_detail(&mut self, summary: &Show) -> Show {
    let result = self.fetcher.fetch_detail(summary.id, &self.language).await;
    self.finish_detail(summary, result)
  }

  pub fn finish_detail(&mut self, summary: &Show, result: Result<Show, FetchError>) -> Show {
    let shown = match result {
      Ok(detail) => {
        let stored = self.cache.upsert(&detail);
        self.check_cache("store detail", stored);
        detail
      }
      Err(err) => {
        warn!(id = %summary.id, error = %err, "detail fetch failed, showing summary");
        summary.clone()
      }
    };

    self.selected = Some(shown.clone());
    shown
  }

  // ==========================================================================
  // Configuration
  // ==========================================================================

  /// Refresh the image configuration if it is missing or too old.
  ///
  /// Returns the base URL to use for images.
  pub async fn refresh_configuration_if_stale(&mut self) -> String {
    self.refresh_configuration_at(Utc::now()).await
  }

  pub async fn refresh_configuration_at(&mut self, now: DateTime<Utc>) -> String {
    let updated = match self.settings.get_timestamp(keys::UPDATED) {
      Ok(updated) => updated,
      Err(e) => {
        warn!(error = %e, "ignoring unreadable configuration timestamp");
        None
      }
    };

    if let Some(updated) = updated {
      let age_days = (now - updated).num_days();
      if age_days < CONFIGURATION_TTL_DAYS {
        debug!(age_days, "configuration is fresh");
        return self.secure_base_url();
      }
    }

    match self.fetcher.fetch_configuration().await {
      Ok(images) => {
        let stored = self
          .settings
          .set(keys::SECURE_BASE_URL, &images.secure_base_url)
          .and_then(|()| self.settings.set_timestamp(keys::UPDATED, now));
        self.check_cache("store configuration", stored);
        info!(secure_base_url = %images.secure_base_url, "configuration refreshed");
        images.secure_base_url
      }
      Err(err) => {
        // Timestamp stays untouched so the next call retries
        warn!(error = %err, "configuration fetch failed, using default image base URL");
        let stored = self
          .settings
          .set(keys::SECURE_BASE_URL, DEFAULT_SECURE_BASE_URL);
        self.check_cache("store default configuration", stored);
        DEFAULT_SECURE_BASE_URL.to_string()
      }
    }
  }

  // ==========================================================================
  // Language and cache maintenance
  // ==========================================================================

  /// Switch the content language and reload from page 1.
  pub async fn set_language(&mut self, language: &str) {
    self.apply_language(language);
    self.load_next_page().await;
  }

  /// Persist the language and reset content without fetching.
  pub fn apply_language(&mut self, language: &str) {
    self.language = language.to_string();
    self.restart();
    // After the restart, so a strict write failure stays visible
    let stored = self.settings.set(keys::LANGUAGE, language);
    self.check_cache("store language", stored);
    info!(language, "language changed");
  }

  /// Drop one show from the offline cache. Loaded content is not touched.
  pub fn evict(&mut self, id: ShowId) {
    let result = self.cache.delete_by_id::<Show>(&id.to_string());
    self.check_cache("evict show", result);
  }

  /// Drop every cached show.
  pub fn clear_cache(&mut self) {
    let result = self.cache.delete_all::<Show>();
    self.check_cache("clear cache", result);
  }

  fn check_cache(&mut self, operation: &str, result: Result<(), CacheError>) {
    let Err(e) = result else {
      return;
    };

    match self.cache_policy {
      CacheErrorPolicy::Log => {
        warn!(operation, error = %e, "cache operation failed");
      }
      CacheErrorPolicy::Strict => {
        warn!(operation, error = %e, "cache operation failed (strict)");
        self.has_error = true;
        self.last_cache_error = Some(format!("{operation}: {e}"));
      }
    }
  }
}
