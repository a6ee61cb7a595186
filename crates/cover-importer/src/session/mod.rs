//! Network access shared by the catalog client and the source adapters.
//!
//! A single `HttpSession` lives for the whole run; sources only see it through
//! the `Fetcher` trait so they can be exercised against canned pages.

pub mod client;
pub mod pacing;
pub mod types;

pub use client::HttpSession;
pub use pacing::Pacing;
pub use types::*;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Url;

/// Read-only access to remote pages and images
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page body as text
    async fn get_text(&self, url: &Url) -> Result<String>;

    /// Fetch an image with its Content-Type
    async fn get_image(&self, url: &Url) -> Result<FetchedImage>;
}

/// Append path segments to `base`, percent-encoding each one
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("{} cannot be used as a base URL", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
