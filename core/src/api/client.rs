use super::StatsSource;
use crate::config::ClientConfig;
use crate::model::{
    CategoryStat, CustomerAnalysis, FoodStat, HeatmapMatrix, OrderFilters, OrderRecord,
    OverviewStats, Period, TimeTrendPoint,
};
use crate::{DashError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of every spreadsheet export, whatever the filters
pub const EXPORT_FILE_NAME: &str = "orders.xlsx";

/// HTTP client for the statistics API
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) http: Client,
    pub(crate) cfg: ClientConfig,
}

impl ApiClient {
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| DashError::ConfigError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }

    /// GET a JSON resource, mapping every failure to `RemoteFailure`
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.cfg.endpoint(path);
        debug!(target: "api_client", resource, url = %url, "GET");

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "api_client", resource, error = %e, "Request failed");
                DashError::remote(resource, e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(target: "api_client", resource, %status, "API returned error status");
            return Err(DashError::remote(
                resource,
                format!("status={} body={}", status, body),
            ));
        }

        resp.json::<T>().await.map_err(|e| {
            warn!(target: "api_client", resource, error = %e, "Failed to decode response");
            DashError::remote(resource, format!("invalid body: {e}"))
        })
    }
}

#[async_trait]
impl StatsSource for ApiClient {
    async fn overview(&self) -> Result<OverviewStats> {
        self.get_json("overview", "/api/stats/overview", &[]).await
    }

    async fn top_foods(&self, limit: u32) -> Result<Vec<FoodStat>> {
        let limit = limit.max(1);
        self.get_json(
            "top_foods",
            "/api/stats/top-foods",
            &[("limit", limit.to_string())],
        )
        .await
    }

    async fn category_analysis(&self) -> Result<Vec<CategoryStat>> {
        self.get_json("category_analysis", "/api/stats/category-analysis", &[])
            .await
    }

    async fn time_trend(&self, period: Period) -> Result<Vec<TimeTrendPoint>> {
        self.get_json(
            "time_trend",
            "/api/stats/time-trend",
            &[("period", period.to_string())],
        )
        .await
    }

    async fn heatmap(&self) -> Result<HeatmapMatrix> {
        self.get_json("heatmap", "/api/stats/heatmap", &[]).await
    }

    async fn customer_analysis(&self) -> Result<CustomerAnalysis> {
        self.get_json("customer_analysis", "/api/stats/customer-analysis", &[])
            .await
    }

    async fn orders(&self, filters: &OrderFilters) -> Result<Vec<OrderRecord>> {
        self.get_json("orders", "/api/orders", &filters.to_query())
            .await
    }

    async fn categories(&self) -> Result<Vec<String>> {
        self.get_json("categories", "/api/categories", &[]).await
    }

    async fn export_orders(&self, filters: &OrderFilters, dir: &Path) -> Result<PathBuf> {
        let url = self.cfg.endpoint("/api/export/excel");
        info!(target: "api_client", url = %url, filters = filters.to_query().len(), "Exporting orders");

        let resp = self
            .http
            .get(&url)
            .query(&filters.to_query())
            .send()
            .await
            .map_err(|e| DashError::ExportFailure(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DashError::ExportFailure(format!(
                "export endpoint returned status {}",
                status
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DashError::ExportFailure(format!("failed to read body: {e}")))?;

        let target = dir.join(EXPORT_FILE_NAME);
        tokio::fs::write(&target, &bytes).await.map_err(|e| {
            DashError::ExportFailure(format!("failed to save {}: {e}", target.display()))
        })?;

        info!(
            target: "api_client",
            path = %target.display(),
            bytes = bytes.len(),
            "Export saved"
        );
        Ok(target)
    }
}
