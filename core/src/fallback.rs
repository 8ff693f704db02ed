//! Built-in demo datasets.
//!
//! Substituted by the pages whenever the server is unreachable or returns no
//! rows, so every slot always has something renderable.

use crate::model::{CategoryStat, CustomerAnalysis, FoodStat, OrderRecord, OverviewStats};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEMO_FOODS: &[(&str, &str, u64, f64)] = &[
    ("osh", "Asosiy ovqat", 245, 8_575_000.0),
    ("lag'mon", "Asosiy ovqat", 189, 5_670_000.0),
    ("shashlik", "Grill", 312, 7_800_000.0),
    ("manti", "Asosiy ovqat", 156, 3_120_000.0),
    ("somsa", "Fast food", 423, 3_384_000.0),
    ("chuchvara", "Asosiy ovqat", 198, 4_356_000.0),
    ("salyanka", "Suyuq ovqat", 167, 4_175_000.0),
    ("borshch", "Suyuq ovqat", 134, 2_680_000.0),
    ("sho'rva", "Suyuq ovqat", 178, 4_450_000.0),
    ("tandir kabob", "Grill", 145, 6_525_000.0),
    ("qovurma", "Asosiy ovqat", 123, 3_690_000.0),
    ("pizza", "Fast food", 89, 4_450_000.0),
    ("gamburger", "Fast food", 267, 6_675_000.0),
    ("lavash", "Fast food", 334, 7_515_000.0),
    ("donar", "Fast food", 289, 5_780_000.0),
    ("salat", "Salat", 156, 3_120_000.0),
    ("desert", "Desert", 98, 1_470_000.0),
    ("tort", "Desert", 45, 2_025_000.0),
    ("choy", "Ichimlik", 512, 2_560_000.0),
    ("kofe", "Ichimlik", 387, 4_644_000.0),
    ("sok", "Ichimlik", 456, 4_560_000.0),
    ("pepsi", "Ichimlik", 423, 2_961_000.0),
    ("cola", "Ichimlik", 389, 2_723_000.0),
    ("борщ", "Suyuq ovqat", 123, 2_460_000.0),
    ("пельмени", "Asosiy ovqat", 167, 4_175_000.0),
    ("шашлык", "Grill", 198, 5_940_000.0),
    ("салат оливье", "Salat", 145, 2_900_000.0),
    ("стейк", "Grill", 78, 4_290_000.0),
    ("рыба", "Asosiy ovqat", 89, 4_005_000.0),
    ("курица", "Asosiy ovqat", 112, 3_920_000.0),
];

const DEMO_CATEGORIES: &[(&str, u64, u64, f64, f64)] = &[
    ("Asosiy ovqat", 1523, 245, 45_678_900.0, 45.7),
    ("Grill", 733, 123, 24_456_700.0, 24.5),
    ("Fast food", 1102, 189, 23_145_600.0, 23.2),
    ("Ichimlik", 2167, 367, 17_445_600.0, 17.5),
    ("Suyuq ovqat", 602, 98, 13_783_200.0, 13.8),
    ("Salat", 301, 52, 6_020_000.0, 6.0),
    ("Desert", 143, 24, 3_495_000.0, 3.5),
];

const CATEGORY_NAMES: &[&str] = &[
    "Asosiy ovqat",
    "Grill",
    "Fast food",
    "Suyuq ovqat",
    "Salat",
    "Desert",
    "Ichimlik",
];

const ORDER_FOODS: &[&str] = &[
    "osh",
    "lag'mon",
    "shashlik",
    "manti",
    "somsa",
    "chuchvara",
    "salyanka",
    "borshch",
    "pizza",
    "gamburger",
    "lavash",
    "donar",
];

const ORDER_CATEGORIES: &[&str] = &["Asosiy ovqat", "Grill", "Fast food", "Suyuq ovqat"];

/// Number of generated demo orders
pub const DEMO_ORDER_COUNT: u64 = 50;

const DEMO_ORDER_SEED: u64 = 0x5eed_0dde;

pub fn demo_foods() -> Vec<FoodStat> {
    DEMO_FOODS
        .iter()
        .map(|(name, category, quantity, revenue)| {
            FoodStat::new(name, category, *quantity, *revenue)
        })
        .collect()
}

/// The first `n` demo foods, as shown in the dashboard bar chart
pub fn demo_top_foods(n: usize) -> Vec<FoodStat> {
    demo_foods().into_iter().take(n).collect()
}

pub fn demo_overview() -> OverviewStats {
    OverviewStats {
        total_orders: 600,
        total_revenue: 99_884_101.0,
        average_check: 166_473.5,
        total_customers: 100,
        most_popular_food: "choy".to_string(),
        total_items: 4856,
    }
}

pub fn demo_category_analysis() -> Vec<CategoryStat> {
    DEMO_CATEGORIES
        .iter()
        .map(|(category, quantity, orders, revenue, percentage)| CategoryStat {
            category: category.to_string(),
            quantity: *quantity,
            orders: *orders,
            revenue: *revenue,
            percentage: *percentage,
        })
        .collect()
}

pub fn demo_category_names() -> Vec<String> {
    CATEGORY_NAMES.iter().map(|c| c.to_string()).collect()
}

/// Empty customer analysis; there is no demo customer list
pub fn empty_customer_analysis() -> CustomerAnalysis {
    CustomerAnalysis::default()
}

/// Demo orders spread over the 30 days before today
pub fn demo_orders() -> Vec<OrderRecord> {
    demo_orders_from(chrono::Local::now().date_naive())
}

/// Demo orders spread over the 30 days before `today`.
///
/// Generated from a fixed seed, so the same day always yields the same list.
pub fn demo_orders_from(today: NaiveDate) -> Vec<OrderRecord> {
    let mut rng = StdRng::seed_from_u64(DEMO_ORDER_SEED);

    (1..=DEMO_ORDER_COUNT)
        .map(|order_id| {
            let food = ORDER_FOODS[rng.gen_range(0..ORDER_FOODS.len())];
            let category = ORDER_CATEGORIES[rng.gen_range(0..ORDER_CATEGORIES.len())];
            let price = rng.gen_range(10_000..60_000) as f64;
            let quantity = rng.gen_range(1..=3);
            let date = today - chrono::Duration::days(rng.gen_range(0..30));
            let time = format!("{}:{:02}", rng.gen_range(8..20), rng.gen_range(0..60));

            OrderRecord {
                order_id,
                customer_id: rng.gen_range(1..=100),
                food_name: food.to_string(),
                category: category.to_string(),
                price,
                quantity,
                date: date.format("%Y-%m-%d").to_string(),
                time,
            }
        })
        .collect()
}
