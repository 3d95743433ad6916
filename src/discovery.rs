//! Random item discovery over offset/limit pagination.
//!
//! The catalog API has no "sample" operation and only learns its size through a
//! query, so [`RandomDiscovery`] picks an item in two requests:
//!
//! 1. Fetch one item at offset 0 to learn the collection total (`total`, else
//!    `count`). No usable total means nothing to discover.
//! 2. Small collections (total up to [`FULL_BATCH_THRESHOLD`]) are downloaded
//!    whole and an index is drawn over the returned items. Larger ones get an
//!    index drawn over `[0, total)` and exactly that one item is fetched.
//!
//! Failures never escape: any failed fetch resolves to
//! [`Discovery::Unavailable`], the same answer an empty collection gives.
//!
//! # Examples
//!
//! ```rust
//! use kodex::prelude::*;
//! use kodex::sources::RestCatalog;
//!
//! # async fn example() -> kodex::Result<()> {
//! let catalog = RestCatalog::new("https://api.example.com")?;
//! let discovery = RandomDiscovery::new(catalog, Collection::Comics);
//!
//! match discovery.discover().await {
//!     Discovery::Found(comic) => println!("Try: {}", comic.label),
//!     Discovery::Unavailable => println!("Nothing to discover, try again"),
//!     Discovery::Superseded => {}
//! }
//! # Ok(())
//! # }
//! ```

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    catalog::Catalog,
    error::Result,
    types::{CatalogItem, Collection, PageQuery},
};

/// Largest total for which the whole collection is fetched and sampled locally.
pub const FULL_BATCH_THRESHOLD: u64 = 100;

/// Result of one discovery run.
#[derive(Debug, Clone, PartialEq)]
pub enum Discovery {
    /// A randomly chosen item.
    Found(CatalogItem),
    /// Empty collection, unknown size or a failed fetch. Offer "try again".
    Unavailable,
    /// A newer discovery started before this one finished; drop the result.
    Superseded,
}

impl Discovery {
    pub fn item(&self) -> Option<&CatalogItem> {
        match self {
            Discovery::Found(item) => Some(item),
            _ => None,
        }
    }

    pub fn into_item(self) -> Option<CatalogItem> {
        match self {
            Discovery::Found(item) => Some(item),
            _ => None,
        }
    }
}

/// Picks pseudo-uniformly random items from one collection.
///
/// Re-invoking [`discover()`](RandomDiscovery::discover) while a run is in
/// flight restarts the sequence. Runs are not cancelled (they may need one or
/// two requests); instead each run takes a generation number and a run that is
/// no longer the latest reports [`Discovery::Superseded`].
pub struct RandomDiscovery<C: Catalog> {
    catalog: C,
    collection: Collection,
    threshold: u64,
    generation: AtomicU64,
    rng: Mutex<StdRng>,
}

impl<C: Catalog> RandomDiscovery<C> {
    pub fn new(catalog: C, collection: Collection) -> Self {
        Self {
            catalog,
            collection,
            threshold: FULL_BATCH_THRESHOLD,
            generation: AtomicU64::new(0),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Overrides the full-batch threshold.
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Uses a seeded generator, for reproducible draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Runs one discovery sequence.
    pub async fn discover(&self) -> Discovery {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.sample().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(collection = %self.collection, generation, "dropping stale discovery");
            return Discovery::Superseded;
        }

        match outcome {
            Ok(Some(item)) => Discovery::Found(item),
            Ok(None) => Discovery::Unavailable,
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "random discovery failed");
                Discovery::Unavailable
            }
        }
    }

    async fn sample(&self) -> Result<Option<CatalogItem>> {
        let token = CancellationToken::new();

        let head = self
            .catalog
            .fetch_page(self.collection, PageQuery::window(0, 1), &token)
            .await?;
        let total = match head.total {
            Some(total) if total > 0 => total,
            _ => {
                debug!(collection = %self.collection, total = ?head.total, "nothing to discover");
                return Ok(None);
            }
        };

        if total <= self.threshold {
            debug!(collection = %self.collection, total, "sampling from full batch");
            let batch = self
                .catalog
                .fetch_page(
                    self.collection,
                    PageQuery::window(0, total as usize),
                    &token,
                )
                .await?;
            if batch.items.is_empty() {
                return Ok(None);
            }
            let index = self.draw(batch.items.len() as u64) as usize;
            Ok(batch.items.into_iter().nth(index))
        } else {
            let index = self.draw(total);
            debug!(collection = %self.collection, total, index, "fetching single random item");
            self.catalog
                .fetch_one(self.collection, index as usize, &token)
                .await
        }
    }

    /// `floor(random() * n)`, kept below `n` against float rounding.
    fn draw(&self, n: u64) -> u64 {
        let r: f64 = self.rng.lock().r#gen();
        ((r * n as f64).floor() as u64).min(n.saturating_sub(1))
    }
}

/// Discovers one character and one comic concurrently.
pub async fn discover_home<C: Catalog>(
    characters: &RandomDiscovery<C>,
    comics: &RandomDiscovery<C>,
) -> (Discovery, Discovery) {
    futures::join!(characters.discover(), comics.discover())
}
