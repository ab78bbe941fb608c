//! Scripted fetcher for driving the controller without a network.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::tmdb::{FetchError, Fetcher, ImageConfiguration, Page, Show, ShowId};

/// Replays queued results in order. An empty queue answers with a transport error.
#[derive(Default)]
pub struct ScriptedFetcher {
  pages: Mutex<VecDeque<Result<Page, FetchError>>>,
  details: Mutex<VecDeque<Result<Show, FetchError>>>,
  configurations: Mutex<VecDeque<Result<ImageConfiguration, FetchError>>>,
  page_requests: Mutex<Vec<(String, u32)>>,
  configuration_requests: Mutex<usize>,
}

impl ScriptedFetcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_page(self, result: Result<Page, FetchError>) -> Self {
    self.pages.lock().unwrap().push_back(result);
    self
  }

  pub fn with_detail(self, result: Result<Show, FetchError>) -> Self {
    self.details.lock().unwrap().push_back(result);
    self
  }

  pub fn with_configuration(self, result: Result<ImageConfiguration, FetchError>) -> Self {
    self.configurations.lock().unwrap().push_back(result);
    self
  }

  /// `(language, page)` for every page request so far
  pub fn page_requests(&self) -> Vec<(String, u32)> {
    self.page_requests.lock().unwrap().clone()
  }

  pub fn configuration_requests(&self) -> usize {
    *self.configuration_requests.lock().unwrap()
  }
}

fn exhausted() -> FetchError {
  FetchError::Transport("script exhausted".to_string())
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
  async fn fetch_page(&self, language: &str, page: u32) -> Result<Page, FetchError> {
    self
      .page_requests
      .lock()
      .unwrap()
      .push((language.to_string(), page));
    self.pages.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
  }

  async fn fetch_detail(&self, _id: ShowId, _language: &str) -> Result<Show, FetchError> {
    self
      .details
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Err(exhausted()))
  }

  async fn fetch_configuration(&self) -> Result<ImageConfiguration, FetchError> {
    *self.configuration_requests.lock().unwrap() += 1;
    self
      .configurations
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Err(exhausted()))
  }
}

/// Named shows with the given ids
pub fn shows(ids: &[i64]) -> Vec<Show> {
  ids
    .iter()
    .map(|&id| Show {
      name: Some(format!("Show {id}")),
      popularity: Some(100.0 - id as f64),
      ..Show::bare(ShowId(id))
    })
    .collect()
}

pub fn page(page: u32, total_pages: u32, ids: &[i64]) -> Page {
  Page {
    page,
    total_pages,
    total_results: total_pages.saturating_mul(20),
    records: shows(ids),
  }
}
