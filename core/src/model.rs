//! Wire and state types for the statistics API.
//!
//! Numeric fields decode leniently: a missing or `null` value becomes zero, so
//! nothing downstream ever sees an absent number.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Treat `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Headline numbers shown in the KPI cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_orders: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_revenue: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_check: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_customers: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub most_popular_food: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_items: u64,
}

/// Cumulative sales of one food
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodStat {
    #[serde(default, deserialize_with = "null_as_default")]
    pub food_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revenue: f64,
}

impl FoodStat {
    pub fn new(food_name: &str, category: &str, quantity: u64, revenue: f64) -> Self {
        Self {
            food_name: food_name.to_string(),
            category: Some(category.to_string()),
            quantity,
            revenue,
        }
    }

    /// Revenue per unit sold; zero unless both sides are positive
    pub fn average_price(&self) -> f64 {
        if self.revenue > 0.0 && self.quantity > 0 {
            self.revenue / self.quantity as f64
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub orders: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revenue: f64,
    /// Informational; the list is not required to add up to 100
    #[serde(default, deserialize_with = "null_as_default")]
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeTrendPoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revenue: f64,
}

/// Order activity by day (rows) and hour of day (columns)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHeatmap")]
pub struct HeatmapMatrix {
    pub data: Vec<Vec<f64>>,
    pub hours: Vec<u32>,
    pub days: Vec<String>,
}

#[derive(Deserialize)]
struct RawHeatmap {
    #[serde(default)]
    data: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    hours: Vec<u32>,
    #[serde(default)]
    days: Vec<String>,
}

impl TryFrom<RawHeatmap> for HeatmapMatrix {
    type Error = String;

    fn try_from(raw: RawHeatmap) -> std::result::Result<Self, Self::Error> {
        let data: Vec<Vec<f64>> = raw
            .data
            .into_iter()
            .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
            .collect();
        HeatmapMatrix::new(data, raw.hours, raw.days)
    }
}

impl HeatmapMatrix {
    /// Build a matrix, checking it has `days.len()` rows of `hours.len()` cells
    pub fn new(
        data: Vec<Vec<f64>>,
        hours: Vec<u32>,
        days: Vec<String>,
    ) -> std::result::Result<Self, String> {
        if data.len() != days.len() {
            return Err(format!(
                "heatmap has {} rows but {} day labels",
                data.len(),
                days.len()
            ));
        }
        if let Some((idx, row)) = data
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != hours.len())
        {
            return Err(format!(
                "heatmap row {} has {} cells but {} hour labels",
                idx,
                row.len(),
                hours.len()
            ));
        }
        Ok(Self { data, hours, days })
    }

    pub fn value(&self, day: usize, hour: usize) -> Option<f64> {
        self.data.get(day).and_then(|row| row.get(hour)).copied()
    }

    pub fn max_value(&self) -> f64 {
        self.data
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub food_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
}

impl OrderRecord {
    pub fn total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopCustomer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub orders: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_customers: Vec<TopCustomer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_order_value: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repeat_rate: f64,
}

/// Message received over the push channel.
///
/// Only `stats` has a defined meaning; anything else the server sends is kept
/// untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<OverviewStats>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PushEvent {
    pub fn with_stats(stats: OverviewStats) -> Self {
        Self {
            stats: Some(stats),
            extra: serde_json::Map::new(),
        }
    }
}

/// Bucket size of the revenue trend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Daily,
        Period::Weekly,
        Period::Monthly,
        Period::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            other => Err(format!("unknown period: {}", other)),
        }
    }
}

/// Server-side filters for the orders list and the spreadsheet export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilters {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl OrderFilters {
    /// Query pairs with empty values left out.
    ///
    /// Blank strings and zero prices count as empty.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let texts = [
            ("start_date", &self.start_date),
            ("end_date", &self.end_date),
            ("category", &self.category),
        ];
        for (key, value) in texts {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }
        let prices = [("min_price", self.min_price), ("max_price", self.max_price)];
        for (key, value) in prices {
            if let Some(v) = value.filter(|v| *v != 0.0 && v.is_finite()) {
                pairs.push((key, format_price(v)));
            }
        }
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }
}

fn format_price(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}
