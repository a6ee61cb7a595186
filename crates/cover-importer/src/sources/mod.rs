//! Cover sources.
//!
//! Each source knows which catalog items it can serve and how to turn its
//! site's pages into cover candidates.

pub mod mal;
pub mod mangadex;

pub use mal::MalSource;
pub use mangadex::MangadexSource;

use crate::session::{Fetcher, Pacing};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use scraper::Selector;
use shared::{CatalogItem, CoverCandidate, ItemKind, ItemStatus};
use std::fmt;

/// Why an item is not handed to a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The item already has covers
    HasCovers,
    Status(ItemStatus),
    Kind(ItemKind),
    /// `extra` is absent or empty
    NoExtra,
    MissingField(&'static str),
    /// A richer source identifier is present
    ConflictingField(&'static str),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::HasCovers => write!(f, "item already has covers"),
            SkipReason::Status(status) => write!(f, "status is {}", status),
            SkipReason::Kind(kind) => write!(f, "kind is {:?}", kind),
            SkipReason::NoExtra => write!(f, "no extra metadata"),
            SkipReason::MissingField(field) => write!(f, "extra has no {}", field),
            SkipReason::ConflictingField(field) => write!(f, "extra has {}", field),
        }
    }
}

/// Result of an eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Skip(SkipReason),
}

/// A site that can provide cover images for catalog items
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Short name used in logs and on the command line
    fn name(&self) -> &'static str;

    /// Source-specific preconditions, without the covers check
    fn source_eligibility(&self, item: &CatalogItem) -> Eligibility;

    /// Full eligibility check. Performs no I/O.
    fn check_eligibility(&self, item: &CatalogItem) -> Eligibility {
        match self.source_eligibility(item) {
            Eligibility::Eligible if !item.covers.is_empty() => {
                Eligibility::Skip(SkipReason::HasCovers)
            }
            other => other,
        }
    }

    fn is_eligible(&self, item: &CatalogItem) -> bool {
        self.check_eligibility(item) == Eligibility::Eligible
    }

    /// Locate and download the item's covers, in display order
    ///
    /// An empty result means the site has no cover for the item.
    async fn find_covers(
        &self,
        item: &CatalogItem,
        fetcher: &dyn Fetcher,
    ) -> Result<Vec<CoverCandidate>>;

    /// Courtesy delays for this source
    fn pacing(&self) -> Pacing;
}

pub(crate) fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {}", css, e))
}

/// Shorthand used by sources whose `extra` must exist and carry `field`
pub(crate) fn require_extra_field(item: &CatalogItem, field: &'static str) -> Eligibility {
    if item.extra_map().is_none() {
        Eligibility::Skip(SkipReason::NoExtra)
    } else if !item.has_extra(field) {
        Eligibility::Skip(SkipReason::MissingField(field))
    } else {
        Eligibility::Eligible
    }
}
