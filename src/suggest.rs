//! Debounced autocomplete suggestions.
//!
//! [`SuggestionEngine`] turns keystroke-level input into a short list of labels
//! without flooding the catalog:
//!
//! - every input change cancels the pending timer and signals the in-flight
//!   request to stop
//! - blank input clears the list immediately, with no request
//! - otherwise one request is issued once the input has been stable for the
//!   debounce delay
//! - responses are post-filtered to labels containing the query (ignoring
//!   case) and truncated, since server-side filters may be looser
//! - a response whose sequence number is no longer the latest is discarded
//!
//! The current [`Suggestions`] are published on a `tokio::sync::watch`
//! channel.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kodex::prelude::*;
//! use kodex::sources::RestCatalog;
//!
//! # async fn example() -> kodex::Result<()> {
//! let engine = SuggestionEngine::new(RestCatalog::new("https://api.example.com")?);
//! let mut updates = engine.subscribe();
//!
//! engine.on_query_change("Spi", Collection::Characters);
//! engine.on_query_change("Spid", Collection::Characters);
//!
//! updates.changed().await.ok();
//! println!("{:?}", updates.borrow().labels);
//! # Ok(())
//! # }
//! ```

use parking_lot::Mutex;
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    catalog::Catalog,
    config::Config,
    error::{Error, Result},
    pagination::ListingParams,
    types::{Collection, ItemListExt, PageQuery, PageResult},
};

/// Quiet period before a suggestion request is issued.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Maximum number of labels requested and shown.
pub const SUGGESTION_LIMIT: usize = 8;

/// Published state of the suggestion list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    /// Trimmed query the labels belong to
    pub query: String,
    pub collection: Option<Collection>,
    pub labels: Vec<String>,
    /// Whether the list should be displayed
    pub open: bool,
    /// A request for `query` is in flight
    pub loading: bool,
    /// The request for `query` has completed or failed
    pub settled: bool,
}

/// Debounced, cancelling suggestion fetcher.
///
/// Must be used from within a tokio runtime: each input change spawns the
/// debounce task.
pub struct SuggestionEngine<C: Catalog + 'static> {
    shared: Arc<Shared<C>>,
    pending: Mutex<Option<CancellationToken>>,
}

struct Shared<C> {
    catalog: C,
    delay: Duration,
    limit: usize,
    issued: AtomicU64,
    dismissed: AtomicBool,
    state: watch::Sender<Suggestions>,
}

impl<C: Catalog + 'static> SuggestionEngine<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_settings(catalog, DEBOUNCE, SUGGESTION_LIMIT)
    }

    /// Engine using the debounce and limit of `config`.
    pub fn from_config(catalog: C, config: &Config) -> Self {
        Self::with_settings(catalog, config.debounce, config.suggestion_limit)
    }

    pub fn with_settings(catalog: C, delay: Duration, limit: usize) -> Self {
        let (state, _) = watch::channel(Suggestions::default());
        Self {
            shared: Arc::new(Shared {
                catalog,
                delay,
                limit: limit.max(1),
                issued: AtomicU64::new(0),
                dismissed: AtomicBool::new(false),
                state,
            }),
            pending: Mutex::new(None),
        }
    }

    /// Receiver observing every state change.
    pub fn subscribe(&self) -> watch::Receiver<Suggestions> {
        self.shared.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> Suggestions {
        self.shared.state.borrow().clone()
    }

    /// Number of suggestion requests started so far, including cleared ones.
    pub fn issued(&self) -> u64 {
        self.shared.issued.load(Ordering::SeqCst)
    }

    /// Reacts to new input text.
    pub fn on_query_change(&self, text: &str, collection: Collection) {
        let seq = self.shared.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.dismissed.store(false, Ordering::SeqCst);

        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().replace(token.clone()) {
            previous.cancel();
        }

        let query = text.trim().to_string();
        if query.is_empty() {
            token.cancel();
            self.shared.state.send_modify(|state| {
                *state = Suggestions {
                    settled: true,
                    ..Suggestions::default()
                };
            });
            return;
        }

        self.shared.state.send_modify(|state| {
            state.query = query.clone();
            state.collection = Some(collection);
            state.open = true;
            state.loading = false;
            state.settled = false;
        });

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            shared.run(seq, query, collection, token).await;
        });
    }

    /// Closes the list, e.g. on focus loss.
    ///
    /// A pending request is left running; its result is stored but the list
    /// stays closed until the input changes again.
    pub fn dismiss(&self) {
        self.shared.dismissed.store(true, Ordering::SeqCst);
        self.shared.state.send_modify(|state| state.open = false);
    }

    /// Submits `text` as a search: closes the list and returns the listing
    /// parameters to navigate to, or `None` for blank text.
    pub fn submit(&self, text: &str) -> Option<ListingParams> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.dismiss();
        Some(ListingParams::default().with_filter(text))
    }

    /// Cancels the pending timer and request, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.lock().take() {
            token.cancel();
        }
    }
}

impl<C: Catalog + 'static> Drop for SuggestionEngine<C> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<C: Catalog> Shared<C> {
    fn is_latest(&self, seq: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == seq
    }

    async fn run(&self, seq: u64, query: String, collection: Collection, token: CancellationToken) {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(self.delay) => {}
        }
        if !self.is_latest(seq) {
            return;
        }

        self.state.send_modify(|state| state.loading = true);

        let request = PageQuery {
            skip: 0,
            limit: self.limit,
            filter: Some(query.clone()),
        };
        // A response that outlives its token is dropped by the check below.
        let result: Result<PageResult> =
            self.catalog.fetch_page(collection, request, &token).await;

        if !self.is_latest(seq) {
            debug!(%collection, query, seq, "discarding stale suggestions");
            return;
        }

        match result {
            Ok(page) => {
                let labels = self.post_filter(page, &query);
                let open = !labels.is_empty() && !self.dismissed.load(Ordering::SeqCst);
                self.state.send_modify(|state| {
                    state.labels = labels;
                    state.open = open;
                    state.loading = false;
                    state.settled = true;
                });
            }
            Err(Error::Cancelled) => {}
            Err(e) => {
                warn!(%collection, query, error = %e, "suggestion request failed");
                self.state.send_modify(|state| {
                    state.labels.clear();
                    state.open = false;
                    state.loading = false;
                    state.settled = true;
                });
            }
        }
    }

    fn post_filter(&self, page: PageResult, query: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut labels = page.items.matching_label(query).labels();
        labels.retain(|label| seen.insert(label.clone()));
        labels.truncate(self.limit);
        labels
    }
}
