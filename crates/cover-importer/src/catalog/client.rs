//! HTTP client for the catalog service.

use super::{BlobUpload, CatalogApi};
use crate::session::endpoint;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde_json::Value;
use shared::CatalogItem;
use tracing::debug;

/// Catalog service client
pub struct CatalogClient {
    /// HTTP client, shared with the source session
    client: Client,
    /// Base URL of the catalog API
    base_url: Url,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid catalog base URL: {}", base_url))?;
        Ok(Self { client, base_url })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        endpoint(&self.base_url, segments)
    }
}

/// Turn a non-success status into an error that carries the response body
async fn check_status(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    anyhow::bail!("{} failed with status {}: {}", action, status, body)
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        let url = self.url(&["item"])?;
        debug!(url = %url, "Listing items");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to reach catalog service")?;
        let response = check_status(response, "GET /item").await?;

        response
            .json()
            .await
            .context("Failed to parse item list")
    }

    async fn get_item(&self, key: &str) -> Result<CatalogItem> {
        let url = self.url(&["item", key])?;
        debug!(url = %url, "Fetching item");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to reach catalog service")?;
        let response = check_status(response, &format!("GET /item/{}", key)).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse item {}", key))
    }

    async fn store_blobs(&self, blobs: Vec<BlobUpload>) -> Result<Value> {
        let url = self.url(&["blob"])?;

        let mut form = Form::new();
        for blob in blobs {
            let part = Part::bytes(blob.data)
                .file_name(blob.name.clone())
                .mime_str(&blob.media_type)
                .with_context(|| format!("Invalid media type for {}: {}", blob.name, blob.media_type))?;
            form = form.part(blob.name, part);
        }

        let response = self
            .client
            .put(url)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach catalog service")?;
        let response = check_status(response, "PUT /blob").await?;

        response
            .json()
            .await
            .context("Failed to parse blob upload acknowledgement")
    }

    async fn update_item(&self, item: &CatalogItem) -> Result<Value> {
        let url = self.url(&["item", item.key.as_str()])?;

        let response = self
            .client
            .post(url)
            .json(item)
            .send()
            .await
            .context("Failed to reach catalog service")?;
        let response = check_status(response, &format!("POST /item/{}", item.key)).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse update acknowledgement for {}", item.key))
    }
}
