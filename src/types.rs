//! Core data types for catalog items, favorites and page queries.
//!
//! - [`Collection`] - The two server-side resource sets (characters, comics)
//! - [`CatalogItem`] - One character or comic as returned by the API
//! - [`FavoriteRecord`] - The persisted subset of an item
//! - [`PageQuery`] / [`PageResult`] - Offset/limit pagination in and out
//!
//! # Examples
//!
//! ```rust
//! use kodex::types::*;
//!
//! let query = PageQuery::for_page(3, 20, Some("spider"));
//! assert_eq!(query.skip, 40);
//! assert_eq!(query.limit, 20);
//! assert_eq!(query.filter.as_deref(), Some("spider"));
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One of the two resource collections exposed by the catalog API.
///
/// Each collection knows its REST path, the query parameter used for text
/// filtering, the JSON field holding an item's display label, and the favorites
/// namespace its items are stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Characters,
    Comics,
}

impl Collection {
    /// Both collections, characters first.
    pub const ALL: [Collection; 2] = [Collection::Characters, Collection::Comics];

    /// Path segment of the collection endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Characters => "characters",
            Collection::Comics => "comics",
        }
    }

    /// Query parameter carrying the server-side substring filter.
    ///
    /// This is also the deep-link parameter name for the filter text.
    pub fn filter_param(&self) -> &'static str {
        match self {
            Collection::Characters => "name",
            Collection::Comics => "title",
        }
    }

    /// JSON field used as the display label of an item.
    pub fn label_field(&self) -> &'static str {
        self.filter_param()
    }

    /// Favorites namespace for items of this collection.
    pub fn namespace(&self) -> Namespace {
        match self {
            Collection::Characters => Namespace::Heroes,
            Collection::Comics => Namespace::Comics,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "characters" | "character" | "heroes" => Ok(Collection::Characters),
            "comics" | "comic" => Ok(Collection::Comics),
            other => Err(Error::parse(format!("Unknown collection: {}", other))),
        }
    }
}

/// A named partition of the favorites store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Heroes,
    Comics,
}

impl Namespace {
    /// Storage key of the namespace.
    ///
    /// ```rust
    /// use kodex::types::Namespace;
    ///
    /// assert_eq!(Namespace::Heroes.key(), "favoriteHeroes_v1");
    /// assert_eq!(Namespace::Comics.key(), "favoriteComics_v1");
    /// ```
    pub fn key(&self) -> &'static str {
        match self {
            Namespace::Heroes => "favoriteHeroes_v1",
            Namespace::Comics => "favoriteComics_v1",
        }
    }
}

/// Image reference as served by the API: a path without extension plus the
/// extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub path: String,
    pub extension: String,
}

impl Thumbnail {
    /// Full image URL.
    ///
    /// ```rust
    /// use kodex::types::Thumbnail;
    ///
    /// let thumb = Thumbnail {
    ///     path: "https://img.example.com/portrait/spider".to_string(),
    ///     extension: "jpg".to_string(),
    /// };
    /// assert_eq!(thumb.url(), "https://img.example.com/portrait/spider.jpg");
    /// ```
    pub fn url(&self) -> String {
        format!("{}.{}", self.path, self.extension)
    }

    /// Whether the thumbnail has both a path and an extension.
    pub fn is_displayable(&self) -> bool {
        !self.path.trim().is_empty() && !self.extension.trim().is_empty()
    }
}

/// Capability set shared by everything that can be shown as a card.
///
/// The favorites store and the discovery resolver work over this trait rather
/// than over a concrete character or comic type.
pub trait Labeled {
    fn id(&self) -> &str;
    fn label(&self) -> &str;
    fn thumbnail(&self) -> Option<&Thumbnail>;
    fn description(&self) -> &str;
}

/// A character or comic as returned by a catalog fetch.
///
/// Characters take their label from `name`, comics from `title`. Instances are
/// ephemeral: created per fetch and dropped on the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique identifier within the collection
    pub id: String,

    /// Display label (character name or comic title)
    pub label: String,

    /// Cover or portrait image
    pub thumbnail: Option<Thumbnail>,

    /// Free-text description, empty when the API has none
    #[serde(default)]
    pub description: String,
}

impl Labeled for CatalogItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// The persisted subset of a [`CatalogItem`].
///
/// Records written by older front-ends stored the label under `name` (heroes)
/// or `title` (comics); both are accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub id: String,

    #[serde(alias = "name", alias = "title", default)]
    pub label: String,

    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,

    #[serde(default)]
    pub description: String,
}

impl FavoriteRecord {
    /// Copies the favorite-relevant fields out of any labeled item.
    pub fn from_item(item: &impl Labeled) -> Self {
        Self {
            id: item.id().to_string(),
            label: item.label().to_string(),
            thumbnail: item.thumbnail().cloned(),
            description: item.description().to_string(),
        }
    }
}

impl Labeled for FavoriteRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Offset/limit query for one page of a collection.
///
/// `derive_builder` generates a `PageQueryBuilder`:
///
/// ```rust
/// use kodex::types::PageQueryBuilder;
///
/// let query = PageQueryBuilder::default()
///     .limit(8usize)
///     .filter(Some("Spid".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(query.skip, 0);
/// assert_eq!(query.limit, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into))]
pub struct PageQuery {
    #[builder(default)]
    pub skip: usize,
    #[builder(default = "1")]
    pub limit: usize,
    #[builder(default)]
    pub filter: Option<String>,
}

impl PageQuery {
    /// Query for a 1-based page number.
    ///
    /// Page numbers below 1 are treated as 1 and a zero limit as 1, so
    /// `skip = (page - 1) * limit` holds, saturating at `usize::MAX`. The filter is trimmed and
    /// dropped when blank.
    pub fn for_page(page: usize, limit: usize, filter: Option<&str>) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        Self {
            skip: (page - 1).saturating_mul(limit),
            limit,
            filter: normalize_filter(filter),
        }
    }

    /// Query for `limit` items starting at `skip`, without a filter.
    pub fn window(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit: limit.max(1),
            filter: None,
        }
    }
}

/// Trims a filter and drops it when nothing is left.
pub(crate) fn normalize_filter(filter: Option<&str>) -> Option<String> {
    filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

/// One fetched page.
///
/// `total` is authoritative when present. When the API omits it, pagination
/// falls back to comparing `results_len` against the requested limit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageResult {
    pub items: Vec<CatalogItem>,
    pub total: Option<u64>,
    pub results_len: usize,
}

impl PageResult {
    pub fn new(items: Vec<CatalogItem>, total: Option<u64>) -> Self {
        let results_len = items.len();
        Self {
            items,
            total,
            results_len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Helpers for post-processing fetched items.
pub trait ItemListExt {
    /// Keeps items whose label contains `query`, ignoring case.
    fn matching_label(self, query: &str) -> Self;

    /// Keeps the first item of each id.
    fn dedupe_by_id(self) -> Self;

    /// The display labels, in order.
    fn labels(&self) -> Vec<String>;
}

impl ItemListExt for Vec<CatalogItem> {
    fn matching_label(self, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        self.into_iter()
            .filter(|item| item.label.to_lowercase().contains(&needle))
            .collect()
    }

    fn dedupe_by_id(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        self.retain(|item| seen.insert(item.id.clone()));
        self
    }

    fn labels(&self) -> Vec<String> {
        self.iter()
            .map(|item| item.label.clone())
            .filter(|label| !label.is_empty())
            .collect()
    }
}
