//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;

use crate::cache::{CacheLimits, RetryPolicy};

#[derive(Clone, Debug, Deserialize)]
/// Settings shared across handlers and used to build the backend client.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub backend_url: String,
    #[serde(default)]
    pub backend_token: Option<String>,
    pub request_timeout_secs: u64,
    pub page_size: usize,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub cache_stale_secs: u64,
    pub cache_max_entries: usize,
    pub templates_dir: String,
    pub secret: String,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn cache_limits(&self) -> CacheLimits {
        CacheLimits {
            stale_after: Duration::from_secs(self.cache_stale_secs),
            max_entries: self.cache_max_entries,
        }
    }

    /// Rows per list page, never zero.
    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }
}
