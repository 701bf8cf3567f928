//! Collaborator-layer settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderSettings {
    /// Timeout applied by the HTTP client to each request (milliseconds).
    pub request_timeout_ms: u64,
    pub retry: RetryPolicy,
    /// Results requested per search query.
    pub result_limit: usize,
    /// Upper bound on in-flight search queries within one stage.
    pub max_concurrent_queries: usize,
    /// Retrieval deadline for a whole stage; whatever has returned by then is used.
    pub stage_deadline_ms: u64,
    /// Lifetime of cached search responses (seconds).
    pub cache_ttl_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            retry: RetryPolicy::default(),
            result_limit: 10,
            max_concurrent_queries: 4,
            stage_deadline_ms: 120_000,
            cache_ttl_secs: 3_600,
        }
    }
}

impl ProviderSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn stage_deadline(&self) -> Duration {
        Duration::from_millis(self.stage_deadline_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: ProviderSettings =
            serde_json::from_str(r#"{"result_limit": 20, "retry": {"max_attempts": 5}}"#).unwrap();
        assert_eq!(settings.result_limit, 20);
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.base_delay_ms, 2_000);
        assert_eq!(settings.max_concurrent_queries, 4);
        assert_eq!(settings.cache_ttl(), Duration::from_secs(3_600));
    }
}
