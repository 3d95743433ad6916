//! Page loading for a collection listing.
//!
//! A [`Listing`] owns the query stream of one listing view. Each
//! [`load()`](Listing::load) supersedes the previous one at the transport level,
//! and the result is classified for display:
//!
//! - [`ListingOutcome::Loaded`] - items to render, with page bounds
//! - [`ListingOutcome::NoData`] - a valid, empty result
//! - [`ListingOutcome::Failed`] - a fetch failure; the view offers a retry
//!
//! A cancelled load yields `None`: there is nothing to apply and nothing to
//! report.
//!
//! # Examples
//!
//! ```rust
//! use kodex::prelude::*;
//! use kodex::sources::RestCatalog;
//!
//! # async fn example() -> kodex::Result<()> {
//! let listing = Listing::new(RestCatalog::new("https://api.example.com")?, Collection::Characters);
//! let params = ListingParams::parse("name=spider&page=2", Collection::Characters);
//!
//! match listing.load(&params).await {
//!     Some(ListingOutcome::Loaded { page, bounds }) => {
//!         println!("{} - {} shown", bounds.summary(), page.results_len);
//!     }
//!     Some(ListingOutcome::NoData { .. }) => println!("{}", Collection::Characters.empty_message()),
//!     Some(ListingOutcome::Failed { message }) => println!("{}", message),
//!     None => {} // superseded
//! }
//! # Ok(())
//! # }
//! ```

use tracing::{debug, warn};

use crate::{
    catalog::{Catalog, QueryStream},
    error::Result,
    pagination::{ListingParams, PageBounds},
    types::{Collection, PageResult},
};

/// Display classification of one page load.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingOutcome {
    Loaded { page: PageResult, bounds: PageBounds },
    NoData { bounds: PageBounds },
    Failed { message: String },
}

impl ListingOutcome {
    /// Classifies a fetch result. Cancellation maps to `None`.
    pub fn classify(
        collection: Collection,
        params: &ListingParams,
        result: Result<PageResult>,
    ) -> Option<Self> {
        match result {
            Ok(page) => {
                let bounds = params.bounds(page.total, page.results_len);
                if page.is_empty() {
                    Some(ListingOutcome::NoData { bounds })
                } else {
                    Some(ListingOutcome::Loaded { page, bounds })
                }
            }
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                warn!(%collection, error = %e, "failed to load listing");
                Some(ListingOutcome::Failed {
                    message: collection.failure_message().to_string(),
                })
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ListingOutcome::Failed { .. })
    }
}

impl Collection {
    /// Inline message shown when a page could not be loaded.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Collection::Characters => "Could not load characters.",
            Collection::Comics => "Could not load comics.",
        }
    }

    /// Empty-state message, distinct from the failure message.
    pub fn empty_message(&self) -> &'static str {
        match self {
            Collection::Characters => "No characters found.",
            Collection::Comics => "No comics found.",
        }
    }
}

/// The paginated, filterable list of one collection.
pub struct Listing<C: Catalog> {
    catalog: C,
    collection: Collection,
    stream: QueryStream,
}

impl<C: Catalog> Listing<C> {
    pub fn new(catalog: C, collection: Collection) -> Self {
        Self {
            catalog,
            collection,
            stream: QueryStream::new(),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Loads the page described by `params`, superseding any load in flight.
    ///
    /// Returns `None` when this load was itself superseded before it finished.
    /// Retrying after a failure is just calling `load` again.
    pub async fn load(&self, params: &ListingParams) -> Option<ListingOutcome> {
        let ticket = self.stream.begin();
        let result = self
            .catalog
            .fetch_page(self.collection, params.query(), ticket.token())
            .await;

        if !self.stream.is_current(&ticket) {
            debug!(
                collection = %self.collection,
                request = ticket.id(),
                "dropping superseded page"
            );
            return None;
        }
        ListingOutcome::classify(self.collection, params, result)
    }

    /// Abandons the load in flight (view teardown).
    pub fn cancel(&self) {
        self.stream.cancel();
    }
}
