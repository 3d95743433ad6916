//! Error types and result handling for kodex operations.
//!
//! All fallible operations return a [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! - **Fetch failures**: transport errors and non-success HTTP statuses. These are
//!   retryable and surface to users as an inline message.
//! - **Cancellation**: a request superseded by a newer one. Never an error from the
//!   user's point of view; callers drop it silently.
//! - **Parse Errors**: malformed payloads or configuration values
//! - **Storage Errors**: the favorites backend could not be written
//! - **IO / JSON Errors**: wrapped from the standard library and serde_json
//!
//! # Examples
//!
//! ```rust
//! use kodex::Error;
//!
//! fn describe(err: &Error) -> Option<String> {
//!     if err.is_cancelled() {
//!         // superseded by a newer request, nothing to show
//!         return None;
//!     }
//!     Some(format!("Could not load the catalog: {}", err))
//! }
//!
//! assert_eq!(describe(&Error::Cancelled), None);
//! assert!(describe(&Error::parse("bad payload")).is_some());
//! ```

use thiserror::Error;

/// Type alias for Results with kodex errors.
///
/// # Examples
///
/// ```rust
/// use kodex::{Result, Error};
///
/// fn example_operation() -> Result<String> {
///     Ok("Success".to_string())
/// }
///
/// fn example_with_error() -> Result<()> {
///     Err(Error::parse("Something went wrong"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all kodex operations.
///
/// # Variants
///
/// * [`Network`](Error::Network) - HTTP client and connection errors
/// * [`Http`](Error::Http) - Non-success status returned by the catalog API
/// * [`Cancelled`](Error::Cancelled) - Request superseded or abandoned
/// * [`Parse`](Error::Parse) - Data parsing and format errors
/// * [`Storage`](Error::Storage) - Favorites backend failures
/// * [`Config`](Error::Config) - Invalid configuration
/// * [`Io`](Error::Io) - File system and IO errors
/// * [`Json`](Error::Json) - JSON serialization errors
/// * [`Other`](Error::Other) - Generic error messages
#[derive(Error, Debug)]
pub enum Error {
    /// Network-related errors from HTTP operations.
    ///
    /// Wraps errors from reqwest: connection refused, DNS resolution failures,
    /// timeouts and TLS errors.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The catalog API answered with a non-success status.
    #[error("HTTP {status} while fetching {collection}")]
    Http { collection: String, status: u16 },

    /// The request was cancelled before it completed.
    ///
    /// Produced when a [`CancellationToken`](tokio_util::sync::CancellationToken)
    /// fires, typically because a newer request for the same stream started.
    #[error("Request cancelled")]
    Cancelled,

    /// Data parsing errors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kodex::Error;
    ///
    /// let error = Error::parse("results is not an array");
    /// ```
    #[error("Parse error: {0}")]
    Parse(String),

    /// Favorites storage could not be read or written.
    #[error("Storage error ({key}): {message}")]
    Storage { key: String, message: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and IO operation errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization and deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error messages.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates an HTTP status error for a collection.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kodex::Error;
    ///
    /// let error = Error::http("characters", 503);
    /// assert_eq!(error.to_string(), "HTTP 503 while fetching characters");
    /// ```
    pub fn http(collection: impl Into<String>, status: u16) -> Self {
        Error::Http {
            collection: collection.into(),
            status,
        }
    }

    /// Creates a storage error for the given key.
    pub fn storage(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::Storage {
            key: key.into(),
            message: msg.into(),
        }
    }

    /// Returns `true` when the error only means "superseded".
    ///
    /// Cancellation must never be reported to the user as a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Returns `true` for transport and HTTP failures, the retryable kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kodex::Error;
    ///
    /// assert!(Error::http("comics", 500).is_fetch_failure());
    /// assert!(!Error::Cancelled.is_fetch_failure());
    /// ```
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Http { .. })
    }
}
