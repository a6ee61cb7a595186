//! In-memory stand-ins for the catalog service and the source sites.

use crate::catalog::{BlobUpload, CatalogApi};
use crate::session::{parse_media_type, FetchError, FetchedImage, Fetcher};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};
use shared::CatalogItem;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned pages and images, 404 for anything else
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    images: HashMap<String, FetchedImage>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_image(mut self, url: &str, bytes: &[u8], content_type: &str) -> Self {
        self.images
            .insert(url.to_string(), FetchedImage::new(bytes, content_type));
        self
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, url: &Url) {
        self.requests.lock().unwrap().push(url.to_string());
    }

    fn not_found(url: &Url) -> anyhow::Error {
        FetchError::Status {
            url: url.clone(),
            status: StatusCode::NOT_FOUND,
        }
        .into()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn get_text(&self, url: &Url) -> Result<String> {
        self.record(url);
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }

    async fn get_image(&self, url: &Url) -> Result<FetchedImage> {
        self.record(url);
        let image = self
            .images
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| Self::not_found(url))?;
        parse_media_type(url, &image.content_type)?;
        Ok(image)
    }
}

/// Catalog that keeps items in memory and records every write
#[derive(Default)]
pub struct InMemoryCatalog {
    items: Mutex<Vec<CatalogItem>>,
    uploads: Mutex<Vec<Vec<BlobUpload>>>,
    updates: Mutex<Vec<CatalogItem>>,
    fail_uploads: bool,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    /// Reject every blob upload, as an unreachable catalog would
    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    /// Blob upload requests, one entry per `PUT /blob`
    pub fn uploads(&self) -> Vec<Vec<BlobUpload>> {
        self.uploads.lock().unwrap().clone()
    }

    /// Items submitted through `POST /item/{key}`
    pub fn updates(&self) -> Vec<CatalogItem> {
        self.updates.lock().unwrap().clone()
    }

    pub fn item(&self, key: &str) -> Option<CatalogItem> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.key == key)
            .cloned()
    }
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn get_item(&self, key: &str) -> Result<CatalogItem> {
        self.item(key)
            .ok_or_else(|| anyhow!("GET /item/{} failed with status 404 Not Found", key))
    }

    async fn store_blobs(&self, blobs: Vec<BlobUpload>) -> Result<Value> {
        if self.fail_uploads {
            return Err(anyhow!("PUT /blob failed with status 500 Internal Server Error"));
        }
        let count = blobs.len();
        self.uploads.lock().unwrap().push(blobs);
        Ok(json!({ "stored": count }))
    }

    async fn update_item(&self, item: &CatalogItem) -> Result<Value> {
        let mut items = self.items.lock().unwrap();
        let stored = items
            .iter_mut()
            .find(|stored| stored.key == item.key)
            .ok_or_else(|| anyhow!("POST /item/{} failed with status 400", item.key))?;
        *stored = item.clone();
        self.updates.lock().unwrap().push(item.clone());
        Ok(json!({ "status": "Updated" }))
    }
}
