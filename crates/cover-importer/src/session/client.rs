//! HTTP session with connection reuse and retry of connection-level failures.

use super::types::{parse_media_type, FetchError, FetchedImage};
use super::Fetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, Url};
use shared::config::HttpConfig;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// One connection pool for the whole run
///
/// GET requests that fail before a response arrives (connect errors,
/// timeouts) are retried with exponential backoff. Error statuses are not.
/// The configured timeout bounds each source GET; requests other clients
/// build on the shared pool carry no overall timeout.
pub struct HttpSession {
    /// HTTP client
    client: Client,
    /// Maximum retries for failed requests
    max_retries: u32,
    /// Base delay for retry (exponential backoff)
    retry_delay: Duration,
    /// Per-request timeout for source GETs
    timeout: Duration,
}

impl HttpSession {
    /// Create a new session
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            timeout: config.timeout(),
        })
    }

    /// The pooled client, for collaborators that share this session
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    fn request(&self, url: &Url) -> RequestBuilder {
        self.client.get(url.clone()).timeout(self.timeout)
    }

    /// Make a GET request, retrying connection-level failures
    async fn get(&self, url: &Url) -> Result<Response> {
        let mut attempt = 0;

        loop {
            debug!(url = %url, attempt = attempt + 1, "GET");

            match self.request(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        warn!(url = %url, status = %status, "Request failed");
                        return Err(FetchError::Status {
                            url: url.clone(),
                            status,
                        }
                        .into());
                    }
                    return Ok(response);
                }
                Err(e) if is_connection_failure(&e) => {
                    if attempt >= self.max_retries {
                        return Err(FetchError::RetriesExhausted {
                            url: url.clone(),
                            attempts: attempt + 1,
                            source: e,
                        }
                        .into());
                    }

                    let delay = backoff(self.retry_delay, attempt);
                    warn!(
                        url = %url,
                        error = %e,
                        delay_ms = delay.as_millis(),
                        "Connection failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("GET {} failed", url));
                }
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpSession {
    async fn get_text(&self, url: &Url) -> Result<String> {
        let response = self.get(url).await?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))
    }

    async fn get_image(&self, url: &Url) -> Result<FetchedImage> {
        let response = self.get(url).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| FetchError::MissingContentType { url: url.clone() })
            .and_then(|value| parse_media_type(url, value))?;

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        debug!(url = %url, size = bytes.len(), content_type = %content_type, "Image fetched");
        Ok(FetchedImage::new(bytes.to_vec(), content_type))
    }
}

fn is_connection_failure(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
