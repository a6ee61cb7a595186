//! Mangadex covers.
//!
//! A title page links to a covers page, which lists every volume cover as an
//! image wrapped in a link to the full-resolution file. The image `alt`
//! text names the volume.

use super::{require_extra_field, selector, Eligibility, SkipReason, SourceAdapter};
use crate::session::{Fetcher, Pacing};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html};
use shared::config::MangadexConfig;
use shared::{CatalogItem, CoverCandidate, ItemStatus};
use std::time::Duration;
use tracing::{debug, info};

/// `extra` field holding the title page URL
pub const MANGADEX_URL_FIELD: &str = "mangadex_url";

pub struct MangadexSource {
    pacing: Pacing,
}

impl MangadexSource {
    pub fn new(pacing: Pacing) -> Self {
        Self { pacing }
    }

    pub fn from_config(config: &MangadexConfig) -> Self {
        Self::new(Pacing::new(
            Duration::from_secs(config.image_delay_secs),
            Duration::from_secs(config.item_delay_secs),
        ))
    }
}

impl Default for MangadexSource {
    fn default() -> Self {
        Self::from_config(&MangadexConfig::default())
    }
}

/// First link on a title page pointing at its covers page, made absolute
pub fn find_covers_link(html: &str, page_url: &Url) -> Result<Option<Url>> {
    let document = Html::parse_document(html);
    let link_selector = selector("a[href]")?;

    let href = document
        .select(&link_selector)
        .filter_map(|link| link.value().attr("href"))
        .find(|href| href.ends_with("/covers/"));

    match href {
        Some(href) => page_url
            .join(href)
            .map(Some)
            .with_context(|| format!("Invalid covers link '{}' on {}", href, page_url)),
        None => Ok(None),
    }
}

/// Every cover listed on a covers page as `(description, image URL)`, in page order
///
/// Images whose parent is not a link are ignored. A missing `alt` yields an
/// empty description.
pub fn extract_cover_links(html: &str, page_url: &Url) -> Result<Vec<(String, Url)>> {
    let document = Html::parse_document(html);
    let image_selector = selector(".tab-content img")?;

    let mut covers = Vec::new();
    for image in document.select(&image_selector) {
        let Some(href) = image
            .parent()
            .and_then(ElementRef::wrap)
            .and_then(|parent| parent.value().attr("href"))
        else {
            debug!(page = %page_url, "Image without enclosing link, ignoring");
            continue;
        };

        let url = page_url
            .join(href)
            .with_context(|| format!("Invalid cover link '{}' on {}", href, page_url))?;
        let description = image.value().attr("alt").unwrap_or_default().to_string();
        covers.push((description, url));
    }

    Ok(covers)
}

#[async_trait]
impl SourceAdapter for MangadexSource {
    fn name(&self) -> &'static str {
        "mangadex"
    }

    fn source_eligibility(&self, item: &CatalogItem) -> Eligibility {
        if item.status == ItemStatus::InProgress {
            return Eligibility::Skip(SkipReason::Status(item.status));
        }
        require_extra_field(item, MANGADEX_URL_FIELD)
    }

    async fn find_covers(
        &self,
        item: &CatalogItem,
        fetcher: &dyn Fetcher,
    ) -> Result<Vec<CoverCandidate>> {
        let raw_url = item
            .extra_str(MANGADEX_URL_FIELD)
            .ok_or_else(|| anyhow!("Item {} has no usable {}", item.key, MANGADEX_URL_FIELD))?;
        let title_url = Url::parse(&raw_url)
            .with_context(|| format!("Invalid {} for {}: {}", MANGADEX_URL_FIELD, item.key, raw_url))?;

        let html = fetcher.get_text(&title_url).await?;
        let Some(covers_url) = find_covers_link(&html, &title_url)? else {
            info!(key = %item.key, url = %title_url, "No covers page linked");
            return Ok(Vec::new());
        };

        info!(key = %item.key, url = %covers_url, "Fetching covers");
        let html = fetcher.get_text(&covers_url).await?;
        let links = extract_cover_links(&html, &covers_url)?;

        let mut candidates = Vec::with_capacity(links.len());
        for (index, (description, url)) in links.into_iter().enumerate() {
            if index > 0 {
                self.pacing.between_images().await;
            }

            info!(url = %url, description = %description, "Fetching cover");
            let image = fetcher
                .get_image(&url)
                .await
                .with_context(|| format!("Failed to fetch cover '{}' of {}", description, item.key))?;

            candidates.push(CoverCandidate {
                description,
                image: image.bytes,
                media_type: image.content_type,
            });
        }

        Ok(candidates)
    }

    fn pacing(&self) -> Pacing {
        self.pacing
    }
}
