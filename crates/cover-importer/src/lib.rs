//! Cover importer library.
//!
//! Finds cover images for catalog items on third-party sites (Mangadex,
//! MyAnimeList), stores them as blobs in the catalog service, and links them
//! from the items.

pub mod catalog;
pub mod pipeline;
pub mod session;
pub mod sources;

#[cfg(test)]
mod testing;

pub use catalog::{CatalogApi, CatalogClient};
pub use pipeline::{Pipeline, PipelineStats};
pub use session::{Fetcher, HttpSession, Pacing};
pub use sources::{MalSource, MangadexSource, SourceAdapter};
