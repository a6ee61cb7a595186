//! Cover ingestion pipeline.
//!
//! Lists the catalog once and walks it item by item: check eligibility, ask
//! the source for covers, store them as blobs, then write the item back with
//! its new `covers`. Everything is sequential and paced.

use crate::catalog::{prepare_uploads, CatalogApi};
use crate::session::Fetcher;
use crate::sources::{Eligibility, SkipReason, SourceAdapter};
use anyhow::{Context, Result};
use shared::{CatalogItem, CoverCandidate};
use tracing::{debug, error, info};

const MIB: f64 = (1 << 20) as f64;

/// Statistics for an import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub total_items: usize,
    /// Items not handed to the source
    pub skipped: usize,
    /// Items whose covers were stored
    pub updated: usize,
    /// Items for which the source found nothing
    pub no_covers: usize,
    /// Items the source failed on
    pub failed: usize,
    /// Items that would have been updated in a dry run
    pub would_update: usize,
    pub blobs_uploaded: usize,
    pub bytes_uploaded: u64,
}

/// Drives one source over the catalog
pub struct Pipeline<'a> {
    catalog: &'a dyn CatalogApi,
    fetcher: &'a dyn Fetcher,
    source: &'a dyn SourceAdapter,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    /// Create a new pipeline
    pub fn new(
        catalog: &'a dyn CatalogApi,
        fetcher: &'a dyn Fetcher,
        source: &'a dyn SourceAdapter,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            source,
            dry_run: false,
        }
    }

    /// Download covers but never upload or patch anything
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run over every item in the catalog
    ///
    /// Per-item source failures are logged and counted. Catalog failures
    /// abort the run; rerunning is safe because items with covers are skipped.
    pub async fn run(&self) -> Result<PipelineStats> {
        info!(source = self.source.name(), dry_run = self.dry_run, "Starting cover import");

        let items = self
            .catalog
            .list_items()
            .await
            .context("Failed to list catalog items")?;

        let mut stats = PipelineStats {
            total_items: items.len(),
            ..Default::default()
        };
        info!(items = stats.total_items, "Listed catalog items");

        for item in items {
            self.process(item, &mut stats).await?;
        }

        info!(
            source = self.source.name(),
            total = stats.total_items,
            skipped = stats.skipped,
            updated = stats.updated,
            no_covers = stats.no_covers,
            failed = stats.failed,
            would_update = stats.would_update,
            blobs = stats.blobs_uploaded,
            size_mib = format!("{:.2}", stats.bytes_uploaded as f64 / MIB),
            "Cover import complete"
        );

        Ok(stats)
    }

    /// Run over a single item
    pub async fn run_item(&self, key: &str) -> Result<PipelineStats> {
        let item = self
            .catalog
            .get_item(key)
            .await
            .with_context(|| format!("Failed to fetch item {}", key))?;

        let mut stats = PipelineStats {
            total_items: 1,
            ..Default::default()
        };
        self.process(item, &mut stats).await?;
        Ok(stats)
    }

    async fn process(&self, item: CatalogItem, stats: &mut PipelineStats) -> Result<()> {
        if let Eligibility::Skip(reason) = self.source.check_eligibility(&item) {
            if reason == SkipReason::HasCovers {
                info!(key = %item.key, covers = item.covers.len(), "Item has covers");
            } else {
                debug!(key = %item.key, reason = %reason, "Skipping item");
            }
            stats.skipped += 1;
            return Ok(());
        }

        match self.source.find_covers(&item, self.fetcher).await {
            Ok(candidates) if candidates.is_empty() => {
                info!(key = %item.key, "No covers found");
                stats.no_covers += 1;
            }
            Ok(candidates) => self.store(item, candidates, stats).await?,
            Err(e) => {
                error!(key = %item.key, error = format!("{:#}", e), "Failed to fetch covers");
                stats.failed += 1;
            }
        }

        self.source.pacing().between_items().await;
        Ok(())
    }

    /// Upload all candidates in one request, then write the item back
    async fn store(
        &self,
        mut item: CatalogItem,
        candidates: Vec<CoverCandidate>,
        stats: &mut PipelineStats,
    ) -> Result<()> {
        let count = candidates.len();
        let bytes: u64 = candidates.iter().map(|c| c.image.len() as u64).sum();
        info!(
            key = %item.key,
            covers = count,
            size_mib = format!("{:.2}", bytes as f64 / MIB),
            "Total cover size"
        );

        if self.dry_run {
            info!(key = %item.key, "Dry run, not uploading");
            stats.would_update += 1;
            return Ok(());
        }

        let (uploads, covers) = prepare_uploads(&item.key, candidates);

        info!(key = %item.key, "Uploading covers");
        let ack = self
            .catalog
            .store_blobs(uploads)
            .await
            .with_context(|| format!("Failed to upload covers of {}", item.key))?;
        debug!(key = %item.key, response = %ack, "Blobs stored");

        item.covers = covers;
        let ack = self
            .catalog
            .update_item(&item)
            .await
            .with_context(|| format!("Failed to update item {}", item.key))?;
        info!(key = %item.key, response = %ack, "Item updated");

        stats.updated += 1;
        stats.blobs_uploaded += count;
        stats.bytes_uploaded += bytes;
        Ok(())
    }
}
