//! # kodex - comics and characters catalog browsing
//!
//! kodex is the client-side core of a comics catalog browser. It talks to a REST
//! API exposing two collections, characters and comics, through offset/limit
//! pagination, and adds what a browsing front-end needs on top of it.
//!
//! ## Features
//!
//! - **Paginated listing**: filterable pages with last-request-wins cancellation
//! - **Pagination bounds**: works with or without a reported total
//! - **Random discovery**: pseudo-uniform sampling without a sample endpoint
//! - **Debounced suggestions**: autocomplete that never shows stale results
//! - **Local favorites**: per-collection lists over a pluggable key-value store
//! - **Card tilt**: pointer and device-orientation tilt/shine transforms
//!
//! ## Quick Start
//!
//! ```rust
//! use kodex::prelude::*;
//! use kodex::sources::RestCatalog;
//!
//! # async fn example() -> kodex::Result<()> {
//! let catalog = std::sync::Arc::new(RestCatalog::new("https://api.example.com")?);
//!
//! // One page of characters named like "spider"
//! let listing = Listing::new(catalog.clone(), Collection::Characters);
//! let params = ListingParams::default().with_filter("spider");
//! if let Some(ListingOutcome::Loaded { page, bounds }) = listing.load(&params).await {
//!     println!("{}: {} characters", bounds.summary(), page.results_len);
//! }
//!
//! // A random comic
//! let discovery = RandomDiscovery::new(catalog, Collection::Comics);
//! if let Discovery::Found(comic) = discovery.discover().await {
//!     println!("Random pick: {}", comic.label);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`catalog`]: the [`Catalog`] trait and per-stream request supersession
//! - [`sources`]: catalog backends ([`sources::RestCatalog`])
//! - [`listing`]: page loading and outcome classification
//! - [`pagination`]: page bounds and deep-link parameters
//! - [`discovery`]: random item discovery
//! - [`suggest`]: debounced autocomplete
//! - [`favorites`]: local favorites store
//! - [`tilt`]: card tilt/shine transforms
//! - [`types`]: items, queries and pages
//! - [`net`]: HTTP client and JSON helpers
//! - [`config`]: runtime configuration
//! - [`error`]: error handling

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod favorites;
pub mod listing;
pub mod net;
pub mod pagination;
pub mod sources;
pub mod suggest;
pub mod tilt;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```rust
/// use kodex::prelude::*;
///
/// let params = ListingParams::parse("title=saga&limit=50", Collection::Comics);
/// assert_eq!(params.query().limit, 50);
/// ```
pub mod prelude {
    pub use crate::{
        catalog::{Catalog, QueryStream, StreamTicket},
        config::Config,
        discovery::{Discovery, RandomDiscovery},
        favorites::{FavoritesStore, FileStorage, MemoryStorage, Storage},
        listing::{Listing, ListingOutcome},
        pagination::{ListingParams, PageBounds},
        suggest::{SuggestionEngine, Suggestions},
        types::{
            CatalogItem, Collection, FavoriteRecord, ItemListExt, Labeled, Namespace, PageQuery,
            PageResult, Thumbnail,
        },
    };
}

// Re-export main types at crate root for direct access
pub use catalog::{Catalog, QueryStream};
pub use config::Config;
pub use discovery::{Discovery, RandomDiscovery};
pub use error::{Error, Result};
pub use favorites::FavoritesStore;
pub use listing::{Listing, ListingOutcome};
pub use pagination::{ListingParams, PageBounds, resolve};
pub use suggest::{SuggestionEngine, Suggestions};
pub use types::{CatalogItem, Collection, FavoriteRecord, Namespace, PageQuery, PageResult};
