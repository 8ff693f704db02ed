//! Remote Data Client
//!
//! One call per statistics resource plus the spreadsheet export. Calls never
//! retry; callers decide on fallbacks.

mod client;

pub use client::{ApiClient, EXPORT_FILE_NAME};

use crate::model::{
    CategoryStat, CustomerAnalysis, FoodStat, HeatmapMatrix, OrderFilters, OrderRecord,
    OverviewStats, Period, TimeTrendPoint,
};
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Read surface of the statistics API.
///
/// Every call fails with `DashError::RemoteFailure` on transport, status or
/// decode errors, except `export_orders` which fails with `ExportFailure`.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn overview(&self) -> Result<OverviewStats>;

    /// Best sellers; `limit` is clamped to at least 1
    async fn top_foods(&self, limit: u32) -> Result<Vec<FoodStat>>;

    async fn category_analysis(&self) -> Result<Vec<CategoryStat>>;

    async fn time_trend(&self, period: Period) -> Result<Vec<TimeTrendPoint>>;

    async fn heatmap(&self) -> Result<HeatmapMatrix>;

    async fn customer_analysis(&self) -> Result<CustomerAnalysis>;

    async fn orders(&self, filters: &OrderFilters) -> Result<Vec<OrderRecord>>;

    async fn categories(&self) -> Result<Vec<String>>;

    /// Download the filtered orders as a spreadsheet into `dir`.
    /// Returns the path of the saved file.
    async fn export_orders(&self, filters: &OrderFilters, dir: &Path) -> Result<PathBuf>;
}
