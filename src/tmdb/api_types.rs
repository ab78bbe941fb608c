//! Serde-deserializable envelopes matching TMDB API responses.
//!
//! Records themselves (`Show`, `Genre`, `Network`) deserialize directly; these
//! types only unwrap the JSON around them.

use serde::Deserialize;

use super::types::{ImageConfiguration, Page, Show};

/// Body of a 4xx response
#[derive(Debug, Deserialize)]
pub struct ApiErrorMessage {
  #[allow(dead_code)]
  pub status_code: i64,
  pub status_message: String,
}

// ============================================================================
// Paged list endpoints (`/tv/popular`)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiPageResponse {
  pub page: u32,
  pub total_pages: u32,
  #[serde(default)]
  pub total_results: u32,
  pub results: Vec<Show>,
}

impl From<ApiPageResponse> for Page {
  fn from(response: ApiPageResponse) -> Self {
    Page {
      page: response.page,
      total_pages: response.total_pages,
      total_results: response.total_results,
      records: response.results,
    }
  }
}

// ============================================================================
// Configuration endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiConfigurationResponse {
  pub images: ImageConfiguration,
}

/// `Option<NaiveDate>` (de)serializer that maps TMDB's empty string to `None`.
///
/// Unparseable dates are also treated as missing so one bad record does not
/// fail a whole page.
pub(crate) mod optional_date {
  use chrono::NaiveDate;
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(
      raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<NaiveDate>().ok()),
    )
  }

  pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match date {
      Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
      None => serializer.serialize_none(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tmdb::types::ShowId;
  use chrono::NaiveDate;

  const POPULAR_PAGE: &str = r#"{
    "page": 1,
    "results": [
      {
        "backdrop_path": "/tGWTz0aQrTaeGjax5Rlyhz7ImWD.jpg",
        "first_air_date": "2022-03-30",
        "genre_ids": [9648, 10759, 10765],
        "id": 92749,
        "name": "Moon Knight",
        "origin_country": ["US"],
        "original_language": "en",
        "original_name": "Moon Knight",
        "overview": "When Steven Grant...",
        "popularity": 8112.226,
        "poster_path": "/x6FsYvt33846IQnDSFxla9j0RX8.jpg",
        "vote_average": 8.5,
        "vote_count": 373
      },
      { "id": 1399, "first_air_date": "", "poster_path": null }
    ],
    "total_pages": 6421,
    "total_results": 128412
  }"#;

  #[test]
  fn test_decode_popular_page() {
    let response: ApiPageResponse = serde_json::from_str(POPULAR_PAGE).unwrap();
    let page = Page::from(response);

    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 6421);
    assert_eq!(page.total_results, 128412);
    assert_eq!(page.records.len(), 2);

    let moon_knight = &page.records[0];
    assert_eq!(moon_knight.id, ShowId(92749));
    assert_eq!(moon_knight.name.as_deref(), Some("Moon Knight"));
    assert_eq!(
      moon_knight.first_air_date,
      NaiveDate::from_ymd_opt(2022, 3, 30)
    );
    assert_eq!(moon_knight.genre_ids.as_deref(), Some(&[9648, 10759, 10765][..]));
    assert_eq!(moon_knight.vote_count, Some(373));

    let sparse = &page.records[1];
    assert_eq!(sparse.id, ShowId(1399));
    assert_eq!(sparse.first_air_date, None);
    assert_eq!(sparse.poster_path, None);
    assert_eq!(sparse.name, None);
  }

  #[test]
  fn test_decode_detail_with_nested_collections() {
    let json = r#"{
      "id": 92749,
      "name": "Moon Knight",
      "first_air_date": "not a date",
      "episode_run_time": [47],
      "genres": [{ "id": 9648, "name": "Mystery" }],
      "networks": [{ "id": 2739, "name": "Disney+", "logo_path": "/gJ8VX6JSu3ciXHuC2dDGAo2lvwM.png" }],
      "languages": ["en"],
      "number_of_seasons": 1,
      "number_of_episodes": 6
    }"#;

    let show: Show = serde_json::from_str(json).unwrap();
    assert_eq!(show.first_air_date, None);
    assert_eq!(show.number_of_episodes, Some(6));
    assert_eq!(show.genres.as_ref().map(Vec::len), Some(1));
    let networks = show.networks.unwrap();
    assert_eq!(networks[0].name, "Disney+");
    assert!(networks[0].logo_path.is_some());
  }

  #[test]
  fn test_show_survives_cache_serialization() {
    let response: ApiPageResponse = serde_json::from_str(POPULAR_PAGE).unwrap();
    let original = response.results[0].clone();

    let stored = serde_json::to_vec(&original).unwrap();
    let restored: Show = serde_json::from_slice(&stored).unwrap();
    assert_eq!(restored, original);
  }

  #[test]
  fn test_decode_configuration() {
    let json = r#"{
      "images": {
        "base_url": "http://image.tmdb.org/t/p/",
        "secure_base_url": "https://image.tmdb.org/t/p/",
        "backdrop_sizes": ["w300", "w780", "w1280", "original"],
        "logo_sizes": ["w45", "w92"],
        "poster_sizes": ["w92", "w154", "w500"]
      },
      "change_keys": ["adult"]
    }"#;

    let response: ApiConfigurationResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.images.secure_base_url, "https://image.tmdb.org/t/p/");
    assert_eq!(response.images.poster_sizes.len(), 3);
  }
}
