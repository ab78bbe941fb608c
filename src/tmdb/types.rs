use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::api_types::optional_date;

/// TMDB identity of a TV show
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct ShowId(pub i64);

impl fmt::Display for ShowId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A TV show as returned by the popular list and detail endpoints.
///
/// Only `id` is guaranteed. The list endpoint omits the nested collections and
/// counts, the detail endpoint omits `genre_ids`; any display field may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
  pub id: ShowId,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub original_name: Option<String>,
  #[serde(default)]
  pub original_language: Option<String>,
  #[serde(default)]
  pub overview: Option<String>,
  #[serde(default, with = "optional_date")]
  pub first_air_date: Option<NaiveDate>,
  #[serde(default)]
  pub poster_path: Option<String>,
  #[serde(default)]
  pub backdrop_path: Option<String>,
  #[serde(default)]
  pub popularity: Option<f64>,
  #[serde(default)]
  pub vote_count: Option<u32>,
  #[serde(default)]
  pub vote_average: Option<f64>,
  #[serde(default)]
  pub genre_ids: Option<Vec<i64>>,
  #[serde(default)]
  pub origin_country: Option<Vec<String>>,

  // Detail-only fields
  #[serde(default)]
  pub genres: Option<Vec<Genre>>,
  #[serde(default)]
  pub networks: Option<Vec<Network>>,
  #[serde(default)]
  pub languages: Option<Vec<String>>,
  #[serde(default)]
  pub episode_run_time: Option<Vec<u32>>,
  #[serde(default)]
  pub number_of_seasons: Option<u32>,
  #[serde(default)]
  pub number_of_episodes: Option<u32>,
}

impl Show {
  /// A show with nothing but its identity, as the API may legally send.
  pub fn bare(id: ShowId) -> Self {
    Self {
      id,
      name: None,
      original_name: None,
      original_language: None,
      overview: None,
      first_air_date: None,
      poster_path: None,
      backdrop_path: None,
      popularity: None,
      vote_count: None,
      vote_average: None,
      genre_ids: None,
      origin_country: None,
      genres: None,
      networks: None,
      languages: None,
      episode_run_time: None,
      number_of_seasons: None,
      number_of_episodes: None,
    }
  }

  /// Title to show in lists: localized name, then original name, then the id.
  pub fn display_name(&self) -> String {
    self
      .name
      .as_deref()
      .filter(|n| !n.is_empty())
      .or(self.original_name.as_deref().filter(|n| !n.is_empty()))
      .map(String::from)
      .unwrap_or_else(|| format!("#{}", self.id))
  }

  pub fn poster_url(&self, base_url: &str, size: &str) -> Option<String> {
    self
      .poster_path
      .as_deref()
      .map(|path| image_url(base_url, size, path))
  }

  pub fn backdrop_url(&self, base_url: &str, size: &str) -> Option<String> {
    self
      .backdrop_path
      .as_deref()
      .map(|path| image_url(base_url, size, path))
  }
}

/// Join `base`, `size` and `path` the way the TMDB image CDN expects:
/// `https://image.tmdb.org/t/p/` + `w500` + `/abc.jpg`.
fn image_url(base_url: &str, size: &str, path: &str) -> String {
  let base = base_url.trim_end_matches('/');
  let path = path.trim_start_matches('/');
  format!("{base}/{size}/{path}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
  pub id: i64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub logo_path: Option<String>,
}

/// One fetched batch of shows plus pagination metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
  pub page: u32,
  pub total_pages: u32,
  pub total_results: u32,
  pub records: Vec<Show>,
}

/// Image CDN configuration from `/configuration`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageConfiguration {
  pub base_url: String,
  pub secure_base_url: String,
  #[serde(default)]
  pub backdrop_sizes: Vec<String>,
  #[serde(default)]
  pub logo_sizes: Vec<String>,
  #[serde(default)]
  pub poster_sizes: Vec<String>,
}
