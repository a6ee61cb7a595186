//! Catalog service access.
//!
//! The catalog owns the items and stores cover images as named blobs.

pub mod client;

pub use client::CatalogClient;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use shared::{blob_name, BlobReference, CatalogItem, CoverCandidate};

/// A blob ready to be stored by the catalog service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUpload {
    pub name: String,
    pub data: Vec<u8>,
    pub media_type: String,
}

/// Operations the importer needs from the catalog service
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /item`
    async fn list_items(&self) -> Result<Vec<CatalogItem>>;

    /// `GET /item/{key}`
    async fn get_item(&self, key: &str) -> Result<CatalogItem>;

    /// `PUT /blob`, all blobs in one multipart request
    async fn store_blobs(&self, blobs: Vec<BlobUpload>) -> Result<Value>;

    /// `POST /item/{key}` with the full item
    async fn update_item(&self, item: &CatalogItem) -> Result<Value>;
}

/// Name the candidates of item `key` and split them into uploads and the
/// matching cover references, preserving order
pub fn prepare_uploads(
    key: &str,
    candidates: Vec<CoverCandidate>,
) -> (Vec<BlobUpload>, Vec<BlobReference>) {
    candidates
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| {
            let name = blob_name(key, index);
            let reference = BlobReference::new(name.clone(), candidate.description);
            let upload = BlobUpload {
                name,
                data: candidate.image,
                media_type: candidate.media_type,
            };
            (upload, reference)
        })
        .unzip()
}
