//! Derived view of the foods table.
//!
//! A pure search + sort pipeline over the raw foods list. The input is never
//! touched; every call returns a fresh ordered copy.

use crate::model::FoodStat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Numeric column the foods table can be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Quantity,
    Revenue,
}

impl SortField {
    /// Sort key; a non-numeric value sorts as 0
    fn key(&self, food: &FoodStat) -> f64 {
        let key = match self {
            SortField::Quantity => food.quantity as f64,
            SortField::Revenue => food.revenue,
        };
        if key.is_nan() {
            0.0
        } else {
            key
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quantity" => Ok(SortField::Quantity),
            "revenue" => Ok(SortField::Revenue),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Active sort column and direction; defaults to quantity, largest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Header click: the active field flips direction, a new field starts descending
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.order = self.order.flipped();
        } else {
            self.field = field;
            self.order = SortOrder::Desc;
        }
    }
}

/// Inputs of the foods view besides the list itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodQuery {
    pub search: String,
    pub sort: SortSpec,
}

impl FoodQuery {
    pub fn new(search: impl Into<String>, field: SortField, order: SortOrder) -> Self {
        Self {
            search: search.into(),
            sort: SortSpec::new(field, order),
        }
    }
}

/// Footer numbers of the foods table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FoodSummary {
    pub rows: usize,
    pub total_quantity: u64,
}

/// Case-insensitive substring match on food name or category
pub fn matches_search(food: &FoodStat, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    food.food_name.to_lowercase().contains(needle)
        || food
            .category
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(needle))
}

pub fn filter_foods(foods: &[FoodStat], search: &str) -> Vec<FoodStat> {
    let needle = search.to_lowercase();
    foods
        .iter()
        .filter(|food| matches_search(food, &needle))
        .cloned()
        .collect()
}

/// Stable sort on the selected column; equal keys keep their input order
pub fn sort_foods(mut rows: Vec<FoodStat>, spec: SortSpec) -> Vec<FoodStat> {
    rows.sort_by(|a, b| {
        let ord = spec.field.key(a).total_cmp(&spec.field.key(b));
        match spec.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    rows
}

/// Filter then sort
pub fn derive_foods(foods: &[FoodStat], query: &FoodQuery) -> Vec<FoodStat> {
    sort_foods(filter_foods(foods, &query.search), query.sort)
}

pub fn summarize(rows: &[FoodStat]) -> FoodSummary {
    FoodSummary {
        rows: rows.len(),
        total_quantity: rows.iter().map(|f| f.quantity).sum(),
    }
}
