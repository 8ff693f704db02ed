use std::fs;
use std::path::{Path, PathBuf};

use dasturxon_core::model::OrderFilters;
use dasturxon_core::{ClientConfig, Period, SortField, SortOrder};

/// Which page the watcher mounts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    #[default]
    Dashboard,
    Foods,
    Analysis,
}

/// High-level configuration for the dashboard watcher
#[derive(Clone, Debug)]
pub struct WatchConfig {
    pub client: ClientConfig,
    pub page: PageKind,
    /// Dashboard trend bucket
    pub period: Period,
    /// Foods table search and sort column
    pub search: String,
    pub sort: Option<SortField>,
    /// Direction for `sort`; largest first when unset
    pub sort_order: SortOrder,
    /// Analysis page filters, applied once after mount
    pub filters: OrderFilters,
    /// Where the analysis page writes its export; no export when unset
    pub export_dir: Option<PathBuf>,
    /// Rows printed per foods/orders snapshot
    pub max_rows: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::from_env(),
            page: std::env::var("WATCH_PAGE")
                .ok()
                .and_then(|v| match v.to_ascii_lowercase().as_str() {
                    "foods" => Some(PageKind::Foods),
                    "analysis" => Some(PageKind::Analysis),
                    "dashboard" => Some(PageKind::Dashboard),
                    _ => None,
                })
                .unwrap_or_default(),
            period: Period::default(),
            search: String::new(),
            sort: None,
            sort_order: SortOrder::default(),
            filters: OrderFilters::default(),
            export_dir: std::env::var("WATCH_EXPORT_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            max_rows: 10,
        }
    }
}

impl WatchConfig {
    /// Load configuration from a TOML file (path via DASHBOARD_WATCH_CONFIG or
    /// ./dashboard_watch.toml), overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path =
            std::env::var("DASHBOARD_WATCH_CONFIG").unwrap_or_else(|_| "dashboard_watch.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(target: "dashboard_watch", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match toml::from_str::<WatchToml>(&s) {
                Ok(t) => t.overlay(default),
                Err(e) => {
                    tracing::warn!(target: "dashboard_watch", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "dashboard_watch", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct WatchToml {
    pub page: Option<PageKind>,
    pub period: Option<Period>,
    pub search: Option<String>,
    pub sort: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub export_dir: Option<PathBuf>,
    pub max_rows: Option<usize>,
    pub client: Option<ClientToml>,
    pub filters: Option<OrderFilters>,
}

impl WatchToml {
    fn overlay(self, mut base: WatchConfig) -> WatchConfig {
        if let Some(v) = self.page {
            base.page = v;
        }
        if let Some(v) = self.period {
            base.period = v;
        }
        if let Some(v) = self.search {
            base.search = v;
        }
        if self.sort.is_some() {
            base.sort = self.sort;
        }
        if let Some(v) = self.sort_order {
            base.sort_order = v;
        }
        if self.export_dir.is_some() {
            base.export_dir = self.export_dir;
        }
        if let Some(v) = self.max_rows {
            base.max_rows = v;
        }
        if let Some(c) = self.client {
            c.apply(&mut base.client);
        }
        if let Some(f) = self.filters {
            base.filters = f;
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ClientToml {
    pub base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub reconnect_delay_ms: Option<u64>,
    pub refetch_interval_ms: Option<u64>,
    pub dashboard_top_foods: Option<u32>,
    pub foods_page_limit: Option<u32>,
}

impl ClientToml {
    fn apply(self, c: &mut ClientConfig) {
        if let Some(v) = self.base_url {
            c.base_url = v;
        }
        if let Some(v) = self.request_timeout_ms {
            c.request_timeout_ms = v;
        }
        if let Some(v) = self.reconnect_delay_ms {
            c.reconnect_delay_ms = v;
        }
        if let Some(v) = self.refetch_interval_ms {
            c.refetch_interval_ms = v;
        }
        if let Some(v) = self.dashboard_top_foods {
            c.dashboard_top_foods = v;
        }
        if let Some(v) = self.foods_page_limit {
            c.foods_page_limit = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_replaces_only_given_fields() {
        let toml_text = r#"
            page = "foods"
            search = "osh"
            sort = "revenue"

            [client]
            base_url = "http://stats.local:9000"
            refetch_interval_ms = 2500

            [filters]
            category = "Grill"
            min_price = 10000.0
        "#;
        let parsed: WatchToml = toml::from_str(toml_text).unwrap();
        let cfg = parsed.overlay(WatchConfig::default());

        assert_eq!(cfg.page, PageKind::Foods);
        assert_eq!(cfg.search, "osh");
        assert_eq!(cfg.sort, Some(SortField::Revenue));
        assert_eq!(cfg.sort_order, SortOrder::Desc);
        assert_eq!(cfg.client.base_url, "http://stats.local:9000");
        assert_eq!(cfg.client.refetch_interval_ms, 2500);
        assert_eq!(cfg.client.dashboard_top_foods, 10);
        assert_eq!(cfg.filters.category.as_deref(), Some("Grill"));
        assert_eq!(cfg.filters.min_price, Some(10000.0));
        assert_eq!(cfg.max_rows, 10);
    }

    #[test]
    fn test_sort_order_overlay() {
        let parsed: WatchToml = toml::from_str("sort = \"quantity\"\nsort_order = \"asc\"").unwrap();
        let cfg = parsed.overlay(WatchConfig::default());
        assert_eq!(cfg.sort, Some(SortField::Quantity));
        assert_eq!(cfg.sort_order, SortOrder::Asc);
    }
}
