//! Catalog trait and per-stream request supersession.
//!
//! This module defines the [`Catalog`] trait every catalog backend implements,
//! and [`QueryStream`], which gives a logical query stream (the page list of a
//! collection, the suggestion box, ...) last-request-wins semantics: starting a
//! request cancels the one before it at the transport level.
//!
//! # Examples
//!
//! ```rust
//! use kodex::prelude::*;
//! use kodex::sources::RestCatalog;
//!
//! # async fn example() -> kodex::Result<()> {
//! let catalog = RestCatalog::new("https://api.example.com")?;
//! let stream = QueryStream::new();
//!
//! let ticket = stream.begin();
//! let page = catalog
//!     .fetch_page(Collection::Characters, PageQuery::for_page(1, 20, Some("spider")), ticket.token())
//!     .await?;
//!
//! if stream.is_current(&ticket) {
//!     println!("{} of {:?} characters", page.results_len, page.total);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    error::Result,
    types::{CatalogItem, Collection, PageQuery, PageResult},
};

/// Read-only access to the two catalog collections.
///
/// # Required Methods
///
/// * [`fetch_page()`](Catalog::fetch_page) - One offset/limit page, optionally filtered
///
/// # Implementation Guidelines
///
/// - Read the collection size from `total`, falling back to `count`; leave it
///   `None` when neither is numeric
/// - Return [`Error::Cancelled`](crate::Error::Cancelled) once `token` fires, and
///   never report cancellation as any other error
/// - Map transport and HTTP failures to [`Error::Network`](crate::Error::Network)
///   or [`Error::Http`](crate::Error::Http)
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetches one page of `collection`.
    ///
    /// The text filter, when present, is matched server-side against the
    /// collection's label field (name or title).
    ///
    /// # Errors
    ///
    /// * [`Error::Cancelled`](crate::Error::Cancelled) - The token fired first
    /// * [`Error::Network`](crate::Error::Network) - Connection failures
    /// * [`Error::Http`](crate::Error::Http) - Non-success status
    async fn fetch_page(
        &self,
        collection: Collection,
        query: PageQuery,
        token: &CancellationToken,
    ) -> Result<PageResult>;

    /// Fetches the single item at offset `skip`, if any.
    async fn fetch_one(
        &self,
        collection: Collection,
        skip: usize,
        token: &CancellationToken,
    ) -> Result<Option<CatalogItem>> {
        let page = self
            .fetch_page(collection, PageQuery::window(skip, 1), token)
            .await?;
        Ok(page.items.into_iter().next())
    }
}

#[async_trait]
impl<C: Catalog + ?Sized> Catalog for std::sync::Arc<C> {
    async fn fetch_page(
        &self,
        collection: Collection,
        query: PageQuery,
        token: &CancellationToken,
    ) -> Result<PageResult> {
        (**self).fetch_page(collection, query, token).await
    }

    async fn fetch_one(
        &self,
        collection: Collection,
        skip: usize,
        token: &CancellationToken,
    ) -> Result<Option<CatalogItem>> {
        (**self).fetch_one(collection, skip, token).await
    }
}

/// Last-request-wins guard for one logical query stream.
///
/// Every [`begin()`](QueryStream::begin) cancels the token handed out by the
/// previous call, so at most one request per stream is ever active. A result
/// may be applied only while its ticket is still
/// [`current`](QueryStream::is_current).
#[derive(Debug, Default)]
pub struct QueryStream {
    state: Mutex<StreamState>,
}

#[derive(Debug, Default)]
struct StreamState {
    issued: u64,
    active: Option<CancellationToken>,
}

/// Handle of one request within a [`QueryStream`].
#[derive(Debug, Clone)]
pub struct StreamTicket {
    id: u64,
    token: CancellationToken,
}

impl StreamTicket {
    /// Token to pass to the catalog call.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Sequence number of the request within its stream, starting at 1.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl QueryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the in-flight request, if any, and returns a ticket for the next.
    pub fn begin(&self) -> StreamTicket {
        let token = CancellationToken::new();
        let mut state = self.state.lock();
        state.issued += 1;
        if let Some(previous) = state.active.replace(token.clone()) {
            previous.cancel();
        }
        StreamTicket {
            id: state.issued,
            token,
        }
    }

    /// Whether `ticket` belongs to the most recent request of this stream.
    pub fn is_current(&self, ticket: &StreamTicket) -> bool {
        !ticket.token.is_cancelled() && self.state.lock().issued == ticket.id
    }

    /// Cancels the in-flight request without starting a new one.
    ///
    /// Used on teardown (route change, dropped view).
    pub fn cancel(&self) {
        if let Some(previous) = self.state.lock().active.take() {
            previous.cancel();
        }
    }
}

impl Drop for QueryStream {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_cancels_previous_ticket() {
        let stream = QueryStream::new();
        let first = stream.begin();
        assert!(stream.is_current(&first));

        let second = stream.begin();
        assert!(first.token().is_cancelled());
        assert!(!stream.is_current(&first));
        assert!(stream.is_current(&second));
        assert_eq!(second.id(), 2);
    }

    #[test]
    fn test_cancel_invalidates_active_ticket() {
        let stream = QueryStream::new();
        let ticket = stream.begin();
        stream.cancel();
        assert!(ticket.token().is_cancelled());
        assert!(!stream.is_current(&ticket));
    }
}
