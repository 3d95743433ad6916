//! Common test utilities
//!
//! A scripted in-memory catalog and a minimal HTTP responder shared by the
//! integration tests.
// Items are public and not all of them are used by every test binary

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use tokio_util::sync::CancellationToken;

use kodex::prelude::*;
use kodex::{Error, Result};

#[allow(dead_code)]
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How the scripted catalog reports the collection size.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum TotalMode {
    /// Number of items matching the filter
    Actual,
    /// A fixed value regardless of the data
    Fixed(u64),
    /// No total at all
    Missing,
}

/// One recorded `fetch_page` call.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub collection: Collection,
    pub query: PageQuery,
}

/// In-memory [`Catalog`] with per-filter latency, call recording and
/// switchable failures.
#[allow(dead_code)]
pub struct ScriptedCatalog {
    items: HashMap<Collection, Vec<CatalogItem>>,
    total: TotalMode,
    honor_filter: bool,
    honor_limit: bool,
    honor_token: bool,
    latency: Duration,
    filter_latency: HashMap<String, Duration>,
    failing: AtomicBool,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl ScriptedCatalog {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            total: TotalMode::Actual,
            honor_filter: true,
            honor_limit: true,
            honor_token: true,
            latency: Duration::ZERO,
            filter_latency: HashMap::new(),
            failing: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_labels(mut self, collection: Collection, labels: &[&str]) -> Self {
        let items = labels
            .iter()
            .enumerate()
            .map(|(i, label)| item(&format!("{}-{}", collection, i), label))
            .collect();
        self.items.insert(collection, items);
        self
    }

    /// `count` items labelled `"<prefix> <n>"`.
    pub fn with_generated(mut self, collection: Collection, prefix: &str, count: usize) -> Self {
        let items = (0..count)
            .map(|i| item(&format!("{}-{}", collection, i), &format!("{} {}", prefix, i)))
            .collect();
        self.items.insert(collection, items);
        self
    }

    pub fn with_total(mut self, total: TotalMode) -> Self {
        self.total = total;
        self
    }

    /// Ignore filters and return every item, like a loose server-side match.
    pub fn ignoring_filter(mut self) -> Self {
        self.honor_filter = false;
        self
    }

    /// Return every matching item regardless of the requested limit.
    pub fn ignoring_limit(mut self) -> Self {
        self.honor_limit = false;
        self
    }

    /// Keep serving a request after its token is cancelled, like a backend
    /// that cannot abort in-flight work.
    pub fn ignoring_cancellation(mut self) -> Self {
        self.honor_token = false;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_filter_latency(mut self, filter: &str, latency: Duration) -> Self {
        self.filter_latency.insert(filter.to_string(), latency);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn filters(&self) -> Vec<Option<String>> {
        self.calls().into_iter().map(|call| call.query.filter).collect()
    }
}

#[async_trait]
impl Catalog for ScriptedCatalog {
    async fn fetch_page(
        &self,
        collection: Collection,
        query: PageQuery,
        token: &CancellationToken,
    ) -> Result<PageResult> {
        self.calls.lock().push(Call {
            collection,
            query: query.clone(),
        });

        let latency = query
            .filter
            .as_ref()
            .and_then(|filter| self.filter_latency.get(filter))
            .copied()
            .unwrap_or(self.latency);
        if self.honor_token {
            if !latency.is_zero() {
                tokio::select! {
                    _ = token.cancelled() => return Err(Error::Cancelled),
                    _ = tokio::time::sleep(latency) => {}
                }
            }
            if token.is_cancelled() {
                return Err(Error::Cancelled);
            }
        } else {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::http(collection.path(), 500));
        }

        let all = self.items.get(&collection).cloned().unwrap_or_default();
        let matching: Vec<CatalogItem> = match (&query.filter, self.honor_filter) {
            (Some(filter), true) => {
                let needle = filter.to_lowercase();
                all.into_iter()
                    .filter(|item| item.label.to_lowercase().contains(&needle))
                    .collect()
            }
            _ => all,
        };

        let total = match self.total {
            TotalMode::Actual => Some(matching.len() as u64),
            TotalMode::Fixed(total) => Some(total),
            TotalMode::Missing => None,
        };
        let take = if self.honor_limit { query.limit } else { usize::MAX };
        let items = matching.into_iter().skip(query.skip).take(take).collect();
        Ok(PageResult::new(items, total))
    }
}

#[allow(dead_code)]
pub fn item(id: &str, label: &str) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        label: label.to_string(),
        thumbnail: None,
        description: String::new(),
    }
}

/// A local HTTP server answering every request through a handler.
#[allow(dead_code)]
pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Request targets (path and query) received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

/// Starts a server replying `(status, json body)` for each request target.
#[allow(dead_code)]
pub async fn serve<F>(handler: F) -> TestServer
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    serve_with_delay(Duration::ZERO, handler).await
}

/// Like [`serve`], but waits `delay` before answering.
#[allow(dead_code)]
pub async fn serve_with_delay<F>(delay: Duration, handler: F) -> TestServer
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let request = String::from_utf8_lossy(&buf);
                let target = request
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                log.lock().push(target.clone());

                tokio::time::sleep(delay).await;
                let (status, body) = handler(&target);
                let response = format!(
                    "HTTP/1.1 {} Test\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    TestServer {
        base_url: format!("http://{}", addr),
        requests,
    }
}
