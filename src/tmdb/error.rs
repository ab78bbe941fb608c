use serde::de::DeserializeOwned;
use thiserror::Error;

use super::api_types::ApiErrorMessage;

/// Localization key for connectivity problems
pub const NO_INTERNET_KEY: &str = "ERR_NO_INTERNET_DESCRIPTION";
/// Localization key for every other failure
pub const SERVICE_UNAVAILABLE_KEY: &str = "MSG_SERVICE_NOT_AVAILABLE";

/// Failures of a TMDB request, classified by where they happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  /// The request could not be built, e.g. a malformed base URL
  #[error("Invalid request: {0}")]
  InvalidRequest(String),

  /// Connectivity failure or timeout; no HTTP response was received
  #[error("Transport error: {0}")]
  Transport(String),

  /// Something came back, but not a usable HTTP response
  #[error("Invalid response: {0}")]
  InvalidResponse(String),

  /// Server-side validation error (4xx)
  #[error("Validation error with code {code}, reason: {}", reason.as_deref().unwrap_or("no reason given"))]
  Validation { code: u16, reason: Option<String> },

  /// General server-side error (5xx)
  #[error("Server error with code {code}")]
  ServerError { code: u16 },

  /// The body did not match the expected schema
  #[error("The server returned data in an unexpected format: {0}")]
  Decoding(String),
}

impl FetchError {
  pub fn is_transport(&self) -> bool {
    matches!(self, FetchError::Transport(_))
  }

  /// Key of the user-facing message; resolving it is up to the presentation layer.
  pub fn message_key(&self) -> &'static str {
    match self {
      FetchError::Transport(_) => NO_INTERNET_KEY,
      _ => SERVICE_UNAVAILABLE_KEY,
    }
  }
}

impl From<reqwest::Error> for FetchError {
  fn from(err: reqwest::Error) -> Self {
    // Strip the URL so the api_key query parameter never reaches logs
    let err = err.without_url();
    if err.is_builder() {
      FetchError::InvalidRequest(err.to_string())
    } else if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
      FetchError::Transport(err.to_string())
    } else if err.is_decode() {
      FetchError::Decoding(err.to_string())
    } else if err.is_redirect() {
      FetchError::InvalidResponse(err.to_string())
    } else {
      FetchError::Transport(err.to_string())
    }
  }
}

/// Turn an HTTP status and raw body into a decoded value or a classified error.
///
/// 2xx decodes `T`; 4xx decodes the `{status_code, status_message}` body;
/// 5xx carries only the code. Anything else is not a response we understand.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, FetchError> {
  match status {
    200..=299 => serde_json::from_slice(body).map_err(|e| FetchError::Decoding(e.to_string())),
    400..=499 => {
      let message: ApiErrorMessage =
        serde_json::from_slice(body).map_err(|e| FetchError::Decoding(e.to_string()))?;
      Err(FetchError::Validation {
        code: status,
        reason: Some(message.status_message),
      })
    }
    500..=599 => Err(FetchError::ServerError { code: status }),
    other => Err(FetchError::InvalidResponse(format!(
      "unexpected HTTP status {other}"
    ))),
  }
}
