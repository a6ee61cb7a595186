//! MyAnimeList covers.
//!
//! Only used for manga that carry no richer source identifier. The detail
//! page shows one lazily loaded cover wrapped in a link to the pictures tab.

use super::{require_extra_field, selector, Eligibility, SkipReason, SourceAdapter};
use crate::session::{endpoint, Fetcher, Pacing};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use scraper::Html;
use shared::config::MalConfig;
use shared::{CatalogItem, CoverCandidate, ItemKind};
use std::time::Duration;
use tracing::{info, warn};

/// `extra` field holding the numeric MAL identifier
pub const MAL_ID_FIELD: &str = "mal_id";

/// Fields naming sources that take precedence over MAL
pub const PREFERRED_SOURCE_FIELDS: [&str; 2] = ["external_url", "mangadex_url"];

/// Description stored with the single MAL cover
pub const COVER_DESCRIPTION: &str = "Cover";

pub struct MalSource {
    base_url: Url,
    pacing: Pacing,
}

impl MalSource {
    pub fn new(base_url: Url, pacing: Pacing) -> Self {
        Self { base_url, pacing }
    }

    pub fn from_config(config: &MalConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid MAL base URL: {}", config.base_url))?;
        Ok(Self::new(
            base_url,
            Pacing::new(Duration::ZERO, Duration::from_secs(config.item_delay_secs)),
        ))
    }

    /// Detail page of manga `mal_id`
    pub fn detail_url(&self, mal_id: &str) -> Result<Url> {
        endpoint(&self.base_url, &["manga", mal_id])
    }
}

/// Lazy-load source of the cover on a detail page
///
/// Every link under `#content` whose href ends in `pics` and wraps an image
/// is considered; the last one in document order wins.
pub fn find_cover_url(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let link_selector = selector("#content a")?;
    let image_selector = selector("img")?;

    let mut cover = None;
    for link in document.select(&link_selector) {
        let href = link.value().attr("href").unwrap_or_default();
        if !href.ends_with("pics") {
            continue;
        }
        let Some(image) = link.select(&image_selector).next() else {
            continue;
        };
        if let Some(src) = image.value().attr("data-src") {
            cover = Some(src.to_string());
        }
    }

    Ok(cover)
}

/// Point a cover URL at the larger variant (`123.jpg` becomes `123l.jpg`)
///
/// URLs without `.jpg` are returned unchanged.
pub fn upgrade_resolution(url: &str) -> String {
    url.replace(".jpg", "l.jpg")
}

#[async_trait]
impl SourceAdapter for MalSource {
    fn name(&self) -> &'static str {
        "mal"
    }

    fn source_eligibility(&self, item: &CatalogItem) -> Eligibility {
        if item.kind != ItemKind::Manga {
            return Eligibility::Skip(SkipReason::Kind(item.kind));
        }
        match require_extra_field(item, MAL_ID_FIELD) {
            Eligibility::Eligible => {}
            skip => return skip,
        }
        PREFERRED_SOURCE_FIELDS
            .into_iter()
            .find(|field| item.has_extra(field))
            .map_or(Eligibility::Eligible, |field| {
                Eligibility::Skip(SkipReason::ConflictingField(field))
            })
    }

    async fn find_covers(
        &self,
        item: &CatalogItem,
        fetcher: &dyn Fetcher,
    ) -> Result<Vec<CoverCandidate>> {
        let mal_id = item
            .extra_str(MAL_ID_FIELD)
            .ok_or_else(|| anyhow!("Item {} has no usable {}", item.key, MAL_ID_FIELD))?;
        let detail_url = self.detail_url(&mal_id)?;

        info!(key = %item.key, url = %detail_url, "Looking for cover");
        let html = fetcher.get_text(&detail_url).await?;
        let Some(cover) = find_cover_url(&html)? else {
            warn!(key = %item.key, "Could not find cover");
            return Ok(Vec::new());
        };

        let cover = upgrade_resolution(&cover);
        let cover_url = detail_url
            .join(&cover)
            .with_context(|| format!("Invalid cover URL for {}: {}", item.key, cover))?;

        info!(url = %cover_url, "Fetching cover");
        let image = fetcher
            .get_image(&cover_url)
            .await
            .with_context(|| format!("Failed to fetch cover of {}", item.key))?;

        Ok(vec![CoverCandidate {
            description: COVER_DESCRIPTION.to_string(),
            image: image.bytes,
            media_type: image.content_type,
        }])
    }

    fn pacing(&self) -> Pacing {
        self.pacing
    }
}
