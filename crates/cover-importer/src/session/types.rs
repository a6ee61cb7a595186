//! Types returned by the HTTP session.

use reqwest::{StatusCode, Url};
use thiserror::Error;

/// Image bytes together with the media type the server reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl FetchedImage {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }
}

/// Failures the session reports with a typed error
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered, but not with a success status. Never retried.
    #[error("GET {url} returned {status}")]
    Status { url: Url, status: StatusCode },

    #[error("GET {url} returned no Content-Type header")]
    MissingContentType { url: Url },

    /// The Content-Type header is not a media type the catalog would accept
    #[error("GET {url} returned unusable Content-Type '{value}'")]
    InvalidContentType { url: Url, value: String },

    /// Connection-level failures kept happening after every retry
    #[error("GET {url} failed after {attempts} attempts")]
    RetriesExhausted {
        url: Url,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
}

/// Check a Content-Type header value before it travels on to the catalog
pub fn parse_media_type(url: &Url, value: &str) -> Result<String, FetchError> {
    value
        .parse::<mime::Mime>()
        .map(|_| value.to_string())
        .map_err(|_| FetchError::InvalidContentType {
            url: url.clone(),
            value: value.to_string(),
        })
}
