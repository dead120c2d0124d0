use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FetchConfig {
    #[serde(default)]
    pub backoff: BackoffConfig,
}

/// Delay bounds used while acquiring an upstream session. All values are
/// milliseconds; ranges are half-open `[min, max)`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackoffConfig {
    #[serde(default = "default_rate_limit_base_ms")]
    pub rate_limit_base_ms: u64,
    #[serde(default = "default_rate_limit_ceiling_ms")]
    pub rate_limit_ceiling_ms: u64,
    #[serde(default = "default_rate_limit_jitter_ms")]
    pub rate_limit_jitter_ms: u64,
    #[serde(default = "default_forbidden_min_ms")]
    pub forbidden_min_ms: u64,
    #[serde(default = "default_forbidden_max_ms")]
    pub forbidden_max_ms: u64,
    #[serde(default = "default_pre_request_min_ms")]
    pub pre_request_min_ms: u64,
    #[serde(default = "default_pre_request_max_ms")]
    pub pre_request_max_ms: u64,
    #[serde(default = "default_fallback_min_ms")]
    pub fallback_min_ms: u64,
    #[serde(default = "default_fallback_max_ms")]
    pub fallback_max_ms: u64,
}

fn default_rate_limit_base_ms() -> u64 {
    1_000
}

fn default_rate_limit_ceiling_ms() -> u64 {
    30_000
}

fn default_rate_limit_jitter_ms() -> u64 {
    1_000
}

fn default_forbidden_min_ms() -> u64 {
    500
}

fn default_forbidden_max_ms() -> u64 {
    2_000
}

fn default_pre_request_min_ms() -> u64 {
    100
}

fn default_pre_request_max_ms() -> u64 {
    500
}

fn default_fallback_min_ms() -> u64 {
    5_000
}

fn default_fallback_max_ms() -> u64 {
    15_000
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            rate_limit_base_ms: default_rate_limit_base_ms(),
            rate_limit_ceiling_ms: default_rate_limit_ceiling_ms(),
            rate_limit_jitter_ms: default_rate_limit_jitter_ms(),
            forbidden_min_ms: default_forbidden_min_ms(),
            forbidden_max_ms: default_forbidden_max_ms(),
            pre_request_min_ms: default_pre_request_min_ms(),
            pre_request_max_ms: default_pre_request_max_ms(),
            fallback_min_ms: default_fallback_min_ms(),
            fallback_max_ms: default_fallback_max_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RelayConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Longest silence tolerated from the media server between two reads.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Hint returned to callers in `retry_after` when upstream throttles us.
    #[serde(default = "default_retry_after_secs")]
    pub retry_after_secs: u64,
}

fn default_chunk_size() -> usize {
    8192
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_read_timeout_ms() -> u64 {
    30_000
}

fn default_retry_after_secs() -> u64 {
    60
}

impl RelayConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            retry_after_secs: default_retry_after_secs(),
        }
    }
}
