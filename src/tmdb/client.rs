use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::TmdbConfig;

use super::api_types::{ApiConfigurationResponse, ApiPageResponse};
use super::error::{decode_response, FetchError};
use super::types::{ImageConfiguration, Page, Show, ShowId};
use super::Fetcher;

/// TMDB v3 API client wrapper
#[derive(Clone)]
pub struct TmdbClient {
  http: reqwest::Client,
  base_url: String,
  api_key: String,
}

impl TmdbClient {
  pub fn new(config: &TmdbConfig, api_key: String) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(config.timeout())
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      api_key,
    })
  }

  /// Build the request URL for `path` with the API key and extra query parameters.
  fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
    let mut url = Url::parse(&format!("{}{}", self.base_url, path))
      .map_err(|e| FetchError::InvalidRequest(format!("{}{}: {}", self.base_url, path, e)))?;

    {
      let mut query = url.query_pairs_mut();
      query.append_pair("api_key", &self.api_key);
      for (name, value) in params {
        query.append_pair(name, value);
      }
    }

    Ok(url)
  }

  async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
    let path = url.path().to_string();
    let response = self.http.get(url).send().await?;
    let status = response.status().as_u16();
    debug!(path = %path, status, "TMDB response");

    // Headers arrived but the body did not: the link failed mid-response
    let body = response
      .bytes()
      .await
      .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

    decode_response(status, &body)
  }
}

#[async_trait]
impl Fetcher for TmdbClient {
  async fn fetch_page(&self, language: &str, page: u32) -> Result<Page, FetchError> {
    let url = self.endpoint(
      "/tv/popular",
      &[("language", language.to_string()), ("page", page.to_string())],
    )?;
    let response: ApiPageResponse = self.get(url).await?;
    Ok(response.into())
  }

  async fn fetch_detail(&self, id: ShowId, language: &str) -> Result<Show, FetchError> {
    let url = self.endpoint(&format!("/tv/{id}"), &[("language", language.to_string())])?;
    self.get(url).await
  }

  async fn fetch_configuration(&self) -> Result<ImageConfiguration, FetchError> {
    let url = self.endpoint("/configuration", &[])?;
    let response: ApiConfigurationResponse = self.get(url).await?;
    Ok(response.images)
  }
}
