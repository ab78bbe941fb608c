//! TMDB remote fetcher: HTTP client, response types and error taxonomy.

mod api_types;
mod cache;
mod client;
mod error;
mod types;

pub use client::TmdbClient;
pub use error::FetchError;
pub use types::{ImageConfiguration, Page, Show, ShowId};

use async_trait::async_trait;

/// Source of catalog pages, show details and image configuration.
///
/// Implementations never retry; retry policy belongs to the caller.
#[async_trait]
pub trait Fetcher: Send + Sync {
  /// Fetch one page (1-based) of the popular TV list in `language` (ISO 639-1).
  async fn fetch_page(&self, language: &str, page: u32) -> Result<Page, FetchError>;

  /// Fetch the fully populated record for one show.
  async fn fetch_detail(&self, id: ShowId, language: &str) -> Result<Show, FetchError>;

  /// Fetch the image CDN configuration.
  async fn fetch_configuration(&self) -> Result<ImageConfiguration, FetchError>;
}
