use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::{
    catalog::Catalog,
    config::Config,
    error::{Error, Result},
    net::{HttpClient, json},
    types::{Collection, PageQuery, PageResult},
};

/// Catalog backed by the comics REST API.
///
/// Issues `GET {base}/characters?name=&skip=&limit=` and
/// `GET {base}/comics?title=&skip=&limit=`, and reads pages of the shape
/// `{results: [...], total | count}`.
///
/// # Examples
///
/// ```rust
/// use kodex::prelude::*;
/// use kodex::sources::RestCatalog;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> kodex::Result<()> {
/// let catalog = RestCatalog::new("https://api.example.com")?;
///
/// let page = catalog
///     .fetch_page(
///         Collection::Comics,
///         PageQuery::for_page(2, 20, Some("avengers")),
///         &CancellationToken::new(),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestCatalog {
    base: Url,
    characters: HttpClient,
    comics: HttpClient,
}

impl RestCatalog {
    /// Create a catalog for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// * [`Error::Config`] - If `base_url` is not an absolute http(s) URL
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_clients(
            base_url,
            HttpClient::new(Collection::Characters.path()),
            HttpClient::new(Collection::Comics.path()),
        )
    }

    /// Create a catalog from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = |collection: Collection| {
            HttpClient::new(collection.path())
                .with_max_retries(config.max_retries)
                .with_timeout(config.request_timeout)
                .with_header("User-Agent", &config.user_agent)
        };
        Self::with_clients(
            &config.api_base_url,
            client(Collection::Characters),
            client(Collection::Comics),
        )
    }

    fn with_clients(base_url: &str, characters: HttpClient, comics: HttpClient) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API base URL must be http(s): {}",
                base_url
            )));
        }
        // Url::join replaces the last segment unless the path ends with a slash
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        Ok(Self {
            base,
            characters,
            comics,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn client(&self, collection: Collection) -> &HttpClient {
        match collection {
            Collection::Characters => &self.characters,
            Collection::Comics => &self.comics,
        }
    }

    /// Full request URL for one page query.
    pub fn page_url(&self, collection: Collection, query: &PageQuery) -> String {
        let mut query_parts = Vec::with_capacity(3);
        if let Some(filter) = &query.filter {
            query_parts.push(format!(
                "{}={}",
                collection.filter_param(),
                urlencoding::encode(filter)
            ));
        }
        query_parts.push(format!("skip={}", query.skip));
        query_parts.push(format!("limit={}", query.limit));

        format!(
            "{}{}?{}",
            self.base,
            collection.path(),
            query_parts.join("&")
        )
    }

    /// Map a raw page payload to a [`PageResult`].
    fn map_page(collection: Collection, payload: &Value) -> PageResult {
        let items = json::extract_array(payload, "results")
            .iter()
            .filter_map(|value| json::parse_item(collection, value))
            .collect();
        PageResult::new(items, json::read_total(payload))
    }
}

#[async_trait]
impl Catalog for RestCatalog {
    async fn fetch_page(
        &self,
        collection: Collection,
        query: PageQuery,
        token: &CancellationToken,
    ) -> Result<PageResult> {
        let url = self.page_url(collection, &query);
        debug!(
            %collection,
            skip = query.skip,
            limit = query.limit,
            filter = ?query.filter,
            "fetching page"
        );

        let payload: Value = self
            .client(collection)
            .get_json_cancellable(&url, token)
            .await?;
        Ok(Self::map_page(collection, &payload))
    }
}
