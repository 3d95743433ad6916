//! Runtime configuration.
//!
//! A [`Config`] carries the API location, HTTP behavior and the tunable
//! constants of listing, discovery and suggestions. It can be built in code
//! with [`ConfigBuilder`], deserialized from JSON, or read from `KODEX_*`
//! environment variables with [`Config::from_env`].
//!
//! | Variable                     | Default                  |
//! |------------------------------|--------------------------|
//! | `KODEX_API_BASE_URL`         | `http://localhost:3000`  |
//! | `KODEX_USER_AGENT`           | `kodex/<version>`        |
//! | `KODEX_TIMEOUT_MS`           | `30000`                  |
//! | `KODEX_MAX_RETRIES`          | `0`                      |
//! | `KODEX_PAGE_SIZE`            | `20`                     |
//! | `KODEX_DEBOUNCE_MS`          | `300`                    |
//! | `KODEX_SUGGESTION_LIMIT`     | `8`                      |
//! | `KODEX_FULL_BATCH_THRESHOLD` | `100`                    |
//! | `KODEX_FAVORITES_DIR`        | `<data dir>/kodex`       |

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};
use tracing::{info, warn};

use crate::{
    discovery::FULL_BATCH_THRESHOLD,
    net::USER_AGENT,
    pagination::DEFAULT_PAGE_SIZE,
    suggest::{DEBOUNCE, SUGGESTION_LIMIT},
};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub user_agent: String,
    #[serde(with = "millis")]
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub default_page_size: usize,
    #[serde(with = "millis")]
    pub debounce: Duration,
    pub suggestion_limit: usize,
    pub full_batch_threshold: u64,
    pub favorites_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 0,
            default_page_size: DEFAULT_PAGE_SIZE,
            debounce: DEBOUNCE,
            suggestion_limit: SUGGESTION_LIMIT,
            full_batch_threshold: FULL_BATCH_THRESHOLD,
            favorites_dir: default_favorites_dir(),
        }
    }
}

impl Config {
    /// Loads the configuration from `KODEX_*` environment variables.
    ///
    /// Missing variables fall back to their default. Unparsable ones are
    /// logged and fall back too; loading never fails.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: try_load("KODEX_API_BASE_URL", defaults.api_base_url),
            user_agent: try_load("KODEX_USER_AGENT", defaults.user_agent),
            request_timeout: Duration::from_millis(try_load(
                "KODEX_TIMEOUT_MS",
                defaults.request_timeout.as_millis() as u64,
            )),
            max_retries: try_load("KODEX_MAX_RETRIES", defaults.max_retries),
            default_page_size: try_load("KODEX_PAGE_SIZE", defaults.default_page_size).max(1),
            debounce: Duration::from_millis(try_load(
                "KODEX_DEBOUNCE_MS",
                defaults.debounce.as_millis() as u64,
            )),
            suggestion_limit: try_load("KODEX_SUGGESTION_LIMIT", defaults.suggestion_limit)
                .max(1),
            full_batch_threshold: try_load(
                "KODEX_FULL_BATCH_THRESHOLD",
                defaults.full_batch_threshold,
            ),
            favorites_dir: try_load("KODEX_FAVORITES_DIR", defaults.favorites_dir),
        }
    }
}

/// `<platform data dir>/kodex`, or `./.kodex` when the platform has none.
pub fn default_favorites_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("kodex"))
        .unwrap_or_else(|| PathBuf::from(".kodex"))
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default:?}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default:?}");
            default
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_module_constants() {
        let config = Config::default();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.suggestion_limit, 8);
        assert_eq!(config.full_batch_threshold, 100);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::default()
            .api_base_url("https://comics.example.com")
            .max_retries(2u32)
            .build()
            .unwrap();
        assert_eq!(config.api_base_url, "https://comics.example.com");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.default_page_size, 20);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: Config =
            serde_json::from_str(r#"{"api_base_url": "http://api", "debounce": 150}"#).unwrap();
        assert_eq!(config.api_base_url, "http://api");
        assert_eq!(config.debounce, Duration::from_millis(150));
        assert_eq!(config.suggestion_limit, 8);
    }
}
