use dasturxon_core::live::decode_event;
use dasturxon_core::store::{DashboardBatch, DashboardStore, Slot};
use dasturxon_core::{fallback, Fetched, OverviewStats, Period};

fn batch() -> DashboardBatch {
    DashboardBatch {
        period: Period::Daily,
        overview: Fetched::remote(OverviewStats {
            total_orders: 10,
            ..Default::default()
        }),
        top_foods: Fetched::fallback(fallback::demo_top_foods(10)),
        categories: Fetched::remote(fallback::demo_category_analysis()),
        time_trend: Fetched::remote(vec![]),
        heatmap: Fetched::fallback(None),
        customers: Fetched::remote(Default::default()),
    }
}

#[test]
fn push_with_stats_sets_overview_exactly() {
    let mut store = DashboardStore::new();
    store.apply_batch(batch());

    let event = decode_event(
        r#"{"stats":{"total_orders":601,"total_revenue":5.5,"average_check":1.0,
            "total_customers":3,"most_popular_food":"osh"},"source":"orders"}"#,
    )
    .unwrap();
    assert!(store.apply_push(&event));

    assert_eq!(store.overview, event.stats.clone().unwrap());
    assert_eq!(store.overview.total_items, 0);
    // other slots untouched
    assert_eq!(store.top_foods, fallback::demo_top_foods(10));
    assert!(store.uses_fallback(Slot::TopFoods));
}

#[test]
fn push_without_stats_leaves_overview() {
    let mut store = DashboardStore::new();
    store.apply_batch(batch());
    let before = store.clone();

    for raw in [r#"{}"#, r#"{"stats":null}"#, r#"{"order":{"id":4}}"#] {
        let event = decode_event(raw).unwrap();
        assert!(!store.apply_push(&event), "{raw}");
    }
    assert_eq!(store.overview, before.overview);
    assert_eq!(store.revision, before.revision);
}

#[test]
fn push_clears_overview_fallback_flag() {
    let mut store = DashboardStore::new();
    let mut b = batch();
    b.overview = Fetched::fallback(fallback::demo_overview());
    store.apply_batch(b);
    assert!(store.uses_fallback(Slot::Overview));

    store.apply_push(&decode_event(r#"{"stats":{"total_orders":1}}"#).unwrap());
    assert!(!store.uses_fallback(Slot::Overview));
}

#[test]
fn batch_marks_each_slot_separately() {
    let mut store = DashboardStore::new();
    store.apply_batch(batch());

    assert!(!store.loading);
    assert!(!store.uses_fallback(Slot::Overview));
    assert!(store.uses_fallback(Slot::TopFoods));
    assert!(!store.uses_fallback(Slot::Categories));
    assert!(store.uses_fallback(Slot::Heatmap));
}

#[test]
fn period_change_then_trend() {
    let mut store = DashboardStore::new();
    assert!(!store.set_period(Period::Daily));
    assert!(store.set_period(Period::Yearly));
    assert!(store.apply_time_trend(Period::Yearly, vec![]));
    assert!(!store.apply_time_trend(Period::Monthly, vec![]));
}
