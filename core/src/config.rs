// Client configuration
//
// Defaults are read from environment variables, falling back to a local API.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration shared by the API client, the push channel and the pages
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String, // e.g., http://localhost:8000
    pub request_timeout_ms: u64,
    /// Fixed delay between push channel reconnect attempts
    pub reconnect_delay_ms: u64,
    /// Periodic refetch interval of the foods page
    pub refetch_interval_ms: u64,
    /// Number of foods shown in the dashboard bar chart
    pub dashboard_top_foods: u32,
    /// Limit used by the foods page to fetch "all" foods
    pub foods_page_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("DASTURXON_API_URL")
                .or_else(|_| std::env::var("VITE_API_URL"))
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout_ms: env_or("DASTURXON_REQUEST_TIMEOUT_MS", 10_000),
            reconnect_delay_ms: env_or("DASTURXON_RECONNECT_DELAY_MS", 5_000),
            refetch_interval_ms: env_or("DASTURXON_REFETCH_INTERVAL_MS", 4_000),
            dashboard_top_foods: 10,
            foods_page_limit: 1000,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Defaults pointed at an explicit base URL (ignores the URL env vars)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Absolute URL for an API path such as `/api/stats/overview`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn refetch_interval(&self) -> Duration {
        Duration::from_millis(self.refetch_interval_ms)
    }
}

fn env_or(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
