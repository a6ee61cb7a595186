//! Courtesy delays towards the source sites.
//!
//! The sites rate-limit implicitly, so the importer spaces its own requests
//! out: a short delay between images of one item and a longer one between
//! items.

use std::time::Duration;
use tokio::time::sleep;

/// Delays applied by a source while importing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Between two image downloads of the same item
    pub image_delay: Duration,
    /// After each item that reached the source
    pub item_delay: Duration,
}

impl Pacing {
    pub fn new(image_delay: Duration, item_delay: Duration) -> Self {
        Self {
            image_delay,
            item_delay,
        }
    }

    /// No waiting at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Wait between two image downloads
    pub async fn between_images(&self) {
        if self.image_delay.is_zero() {
            return;
        }
        tracing::debug!(delay_secs = self.image_delay.as_secs_f64(), "Waiting before next image");
        sleep(self.image_delay).await;
    }

    /// Wait before moving on to the next item
    pub async fn between_items(&self) {
        if self.item_delay.is_zero() {
            return;
        }
        tracing::info!(
            delay_secs = self.item_delay.as_secs_f64(),
            "Waiting before next item"
        );
        sleep(self.item_delay).await;
    }
}
