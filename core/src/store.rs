//! View State Store: per-page slots holding the last good value of each dataset.
//!
//! Slots are only ever replaced as a whole. Every mutation bumps `revision`, so a
//! renderer holding an older snapshot can tell it is stale.

use crate::derive::{derive_foods, summarize, FoodQuery, FoodSummary, SortField, SortSpec};
use crate::fetch::Fetched;
use crate::model::{
    CategoryStat, CustomerAnalysis, FoodStat, HeatmapMatrix, OrderFilters, OrderRecord,
    OverviewStats, Period, PushEvent, TimeTrendPoint,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// Named dataset slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Overview,
    TopFoods,
    Categories,
    TimeTrend,
    Heatmap,
    Customers,
    Foods,
    CategoryNames,
    Orders,
}

/// Result of the dashboard's parallel fetch, one resolved value per slot
#[derive(Debug, Clone)]
pub struct DashboardBatch {
    /// Trend bucket the batch was fetched for
    pub period: Period,
    pub overview: Fetched<OverviewStats>,
    pub top_foods: Fetched<Vec<FoodStat>>,
    pub categories: Fetched<Vec<CategoryStat>>,
    pub time_trend: Fetched<Vec<TimeTrendPoint>>,
    pub heatmap: Fetched<Option<HeatmapMatrix>>,
    pub customers: Fetched<CustomerAnalysis>,
}

/// Record which slots currently hold fallback data
fn mark(fallbacks: &mut BTreeSet<Slot>, slot: Slot, is_fallback: bool) {
    if is_fallback {
        fallbacks.insert(slot);
    } else {
        fallbacks.remove(&slot);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStore {
    pub overview: OverviewStats,
    pub top_foods: Vec<FoodStat>,
    pub categories: Vec<CategoryStat>,
    pub time_trend: Vec<TimeTrendPoint>,
    pub heatmap: Option<HeatmapMatrix>,
    pub customers: CustomerAnalysis,
    pub period: Period,
    pub loading: bool,
    pub fallback_slots: BTreeSet<Slot>,
    pub revision: u64,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    /// Bulk replace after a fetch batch; each slot is set on its own.
    /// The trend slot is left alone when the period changed while the batch was in flight.
    pub fn apply_batch(&mut self, batch: DashboardBatch) {
        mark(&mut self.fallback_slots, Slot::Overview, batch.overview.is_fallback());
        mark(&mut self.fallback_slots, Slot::TopFoods, batch.top_foods.is_fallback());
        mark(&mut self.fallback_slots, Slot::Categories, batch.categories.is_fallback());
        mark(&mut self.fallback_slots, Slot::Heatmap, batch.heatmap.is_fallback());
        mark(&mut self.fallback_slots, Slot::Customers, batch.customers.is_fallback());
        if batch.period == self.period {
            mark(&mut self.fallback_slots, Slot::TimeTrend, batch.time_trend.is_fallback());
            self.time_trend = batch.time_trend.value;
        }

        self.overview = batch.overview.value;
        self.top_foods = batch.top_foods.value;
        self.categories = batch.categories.value;
        self.heatmap = batch.heatmap.value;
        self.customers = batch.customers.value;
        self.loading = false;
        self.revision += 1;
    }

    /// Merge a push event: only `stats` is used, replacing the overview wholesale.
    /// Returns whether anything changed.
    pub fn apply_push(&mut self, event: &PushEvent) -> bool {
        let Some(stats) = &event.stats else {
            return false;
        };
        self.overview = stats.clone();
        self.fallback_slots.remove(&Slot::Overview);
        self.revision += 1;
        true
    }

    pub fn set_period(&mut self, period: Period) -> bool {
        if self.period == period {
            return false;
        }
        self.period = period;
        self.revision += 1;
        true
    }

    /// Replace the trend slot with data fetched for `period`.
    /// Ignored when the period has changed since the fetch started.
    pub fn apply_time_trend(&mut self, period: Period, points: Vec<TimeTrendPoint>) -> bool {
        if self.period != period {
            return false;
        }
        self.time_trend = points;
        self.fallback_slots.remove(&Slot::TimeTrend);
        self.revision += 1;
        true
    }

    pub fn uses_fallback(&self, slot: Slot) -> bool {
        self.fallback_slots.contains(&slot)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FoodsStore {
    pub foods: Vec<FoodStat>,
    pub query: FoodQuery,
    pub loading: bool,
    /// Foods slot holds demo data
    pub uses_fallback: bool,
    pub revision: u64,
}

impl FoodsStore {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    pub fn begin_fetch(&mut self) {
        if !self.loading {
            self.loading = true;
            self.revision += 1;
        }
    }

    pub fn apply_foods(&mut self, fetched: Fetched<Vec<FoodStat>>) {
        self.uses_fallback = fetched.is_fallback();
        self.foods = fetched.value;
        self.loading = false;
        self.revision += 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) -> bool {
        let search = search.into();
        if self.query.search == search {
            return false;
        }
        self.query.search = search;
        self.revision += 1;
        true
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.query.sort.toggle(field);
        self.revision += 1;
    }

    pub fn set_sort(&mut self, spec: SortSpec) -> bool {
        if self.query.sort == spec {
            return false;
        }
        self.query.sort = spec;
        self.revision += 1;
        true
    }

    /// Rows to render, in display order
    pub fn view(&self) -> Vec<FoodStat> {
        derive_foods(&self.foods, &self.query)
    }

    pub fn summary(&self) -> FoodSummary {
        summarize(&self.view())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStore {
    pub category_names: Vec<String>,
    pub orders: Vec<OrderRecord>,
    /// Filter form as currently edited; applied on the next orders fetch
    pub filters: OrderFilters,
    pub loading: bool,
    pub fallback_slots: BTreeSet<Slot>,
    pub revision: u64,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_category_names(&mut self, fetched: Fetched<Vec<String>>) {
        mark(&mut self.fallback_slots, Slot::CategoryNames, fetched.is_fallback());
        self.category_names = fetched.value;
        self.revision += 1;
    }

    pub fn begin_orders_fetch(&mut self) {
        self.loading = true;
        self.revision += 1;
    }

    pub fn apply_orders(&mut self, fetched: Fetched<Vec<OrderRecord>>) {
        mark(&mut self.fallback_slots, Slot::Orders, fetched.is_fallback());
        self.orders = fetched.value;
        self.loading = false;
        self.revision += 1;
    }

    pub fn set_filters(&mut self, filters: OrderFilters) {
        self.filters = filters;
        self.revision += 1;
    }

    pub fn reset_filters(&mut self) {
        self.set_filters(OrderFilters::default());
    }

    pub fn uses_fallback(&self, slot: Slot) -> bool {
        self.fallback_slots.contains(&slot)
    }

    /// Sum of price × quantity over the listed orders
    pub fn orders_total(&self) -> f64 {
        self.orders.iter().map(OrderRecord::total).sum()
    }
}
