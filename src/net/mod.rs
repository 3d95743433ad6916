//! Network utilities for catalog requests.
//!
//! This module provides the networking infrastructure for kodex:
//!
//! - **HTTP Client**: A global, configured HTTP client with connection pooling
//! - **Retry Logic**: Bounded retries of transport failures with backoff
//! - **Cancellation**: Requests race a [`CancellationToken`] so a superseded
//!   request stops as soon as a newer one starts
//! - **Content Parsing**: JSON extraction helpers in [`json`]
//!
//! # Examples
//!
//! ```rust
//! use kodex::net::HttpClient;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> kodex::Result<()> {
//! let client = HttpClient::new("characters").with_max_retries(1);
//! let token = CancellationToken::new();
//!
//! let json: serde_json::Value = client
//!     .get_json_cancellable("https://api.example.com/characters?limit=1", &token)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::{Client, header::HeaderMap};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};

pub mod json;

/// Default user agent sent with every request.
pub const USER_AGENT: &str = concat!("kodex/", env!("CARGO_PKG_VERSION"));

/// Global HTTP client instance.
///
/// Configured with a 30-second timeout, connection pooling and compression
/// support. Created lazily on first use and shared by every [`HttpClient`].
static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(10)
        .gzip(true)
        .brotli(true)
        .build()
        .expect("Failed to build HTTP client")
});

/// HTTP client wrapper with retry logic and cancellation.
///
/// Each client is labelled with the collection (or other stream) it serves so
/// errors and log lines carry that context.
///
/// # Examples
///
/// ```rust
/// use kodex::net::HttpClient;
/// use std::time::Duration;
///
/// let client = HttpClient::new("comics")
///     .with_max_retries(2)
///     .with_timeout(Duration::from_secs(10))
///     .with_header("Accept-Language", "fr");
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    label: String,
    max_retries: u32,
    timeout: Option<Duration>,
    headers: HeaderMap,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// Defaults: no retries, global 30 second timeout.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            max_retries: 0,
            timeout: None,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the maximum number of retries for transport failures.
    ///
    /// HTTP error statuses are never retried: the user retries explicitly.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a custom header to all requests made by this client.
    ///
    /// Invalid header names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Label this client was created with.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Performs a GET request with automatic retry of transport failures.
    ///
    /// # Errors
    ///
    /// * [`Error::Http`] - For non-success statuses (4xx, 5xx)
    /// * [`Error::Network`] - For network/connection errors after retries
    pub async fn get(&self, url: &str) -> Result<Bytes> {
        let mut attempts = 0;

        loop {
            let mut request = CLIENT.get(url).headers(self.headers.clone());
            if let Some(timeout) = self.timeout {
                request = request.timeout(timeout);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.bytes().await?);
                    }
                    return Err(Error::http(&self.label, status.as_u16()));
                }
                Err(e) => {
                    if attempts < self.max_retries {
                        attempts += 1;
                        debug!(label = %self.label, attempts, error = %e, "retrying request");
                        tokio::time::sleep(backoff(attempts)).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Performs a GET request and deserializes the response as JSON.
    ///
    /// # Errors
    ///
    /// * All errors from [`get()`](HttpClient::get)
    /// * [`Error::Json`] - If JSON parsing fails
    pub async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let bytes = self.get(url).await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    /// Like [`get_json()`](HttpClient::get_json), but abandons the request as
    /// soon as `token` is cancelled.
    ///
    /// A token that is already cancelled short-circuits without touching the
    /// network.
    ///
    /// # Errors
    ///
    /// * [`Error::Cancelled`] - If the token fired before the response arrived
    /// * All errors from [`get_json()`](HttpClient::get_json)
    pub async fn get_json_cancellable<T>(&self, url: &str, token: &CancellationToken) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(label = %self.label, url, "request cancelled");
                Err(Error::Cancelled)
            }
            result = self.get_json(url) => result,
        }
    }
}

/// Longest wait between two retries.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Delay before retry number `attempts` (1-based): 500 ms, doubling, capped.
fn backoff(attempts: u32) -> Duration {
    let millis = 250u64.saturating_mul(2u64.saturating_pow(attempts));
    Duration::from_millis(millis).min(MAX_BACKOFF)
}
