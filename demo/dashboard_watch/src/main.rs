mod config;
use config::{PageKind, WatchConfig};
use dasturxon_core::pages::{
    mount_analysis, mount_dashboard, mount_foods, AnalysisCommand, DashboardCommand, FoodsCommand,
    PageHandle,
};
use dasturxon_core::store::{AnalysisStore, DashboardStore, FoodsStore};
use dasturxon_core::telemetry::init_tracing;
use dasturxon_core::{join_with_fallback, PageContext, Period, PreferenceStore, SortSpec};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info,dasturxon_core=info,dashboard_watch=info");

    let prefs = PreferenceStore::load(PreferenceStore::default_path());
    let p = prefs.current();
    info!(
        target: "dashboard_watch",
        theme = ?p.theme,
        language = p.language.native_name(),
        "Preferences loaded"
    );

    // Load configuration (defaults + env + optional TOML overlay)
    let cfg = WatchConfig::load();
    info!(
        target: "dashboard_watch",
        base_url = %cfg.client.base_url,
        page = ?cfg.page,
        "Starting dashboard watcher"
    );

    let ctx = PageContext::from_config(cfg.client.clone())?;

    match cfg.page {
        PageKind::Dashboard => run_dashboard(&ctx, &cfg).await?,
        PageKind::Foods => run_foods(&ctx, &cfg).await?,
        PageKind::Analysis => run_analysis(&ctx, &cfg).await?,
    }

    info!(target: "dashboard_watch", "Shutdown complete");
    Ok(())
}

/// Render every snapshot until Ctrl-C
async fn watch_until_ctrl_c<S: Clone, C>(
    page: &PageHandle<S, C>,
    mut render: impl FnMut(&S),
) -> Result<(), Box<dyn std::error::Error>> {
    let mut rx = page.watch();
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    render(&page.snapshot());
    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                res?;
                info!(target: "dashboard_watch", "Ctrl-C received; tearing down");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    warn!(target: "dashboard_watch", "Page driver stopped");
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                render(&snapshot);
            }
        }
    }
    Ok(())
}

async fn run_dashboard(
    ctx: &PageContext,
    cfg: &WatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    // One-off comparison of all trend buckets
    let fetches = Period::ALL
        .iter()
        .map(|period| {
            let source = ctx.source.clone();
            let period = *period;
            (period.to_string(), async move { source.time_trend(period).await })
        })
        .collect();
    let trends = join_with_fallback(fetches, |_| Vec::new()).await;
    for (period, trend) in Period::ALL.iter().zip(&trends) {
        let revenue: f64 = trend.value.iter().map(|p| p.revenue).sum();
        info!(
            target: "dashboard_watch",
            period = %period,
            points = trend.value.len(),
            revenue,
            fallback = trend.is_fallback(),
            "Trend bucket"
        );
    }

    let page = mount_dashboard(ctx);
    if cfg.period != Period::default() {
        page.send(DashboardCommand::SetPeriod(cfg.period))?;
    }

    watch_until_ctrl_c(&page, |s: &DashboardStore| {
        if s.loading {
            return;
        }
        let o = &s.overview;
        info!(
            target: "dashboard_watch",
            revision = s.revision,
            orders = o.total_orders,
            revenue = o.total_revenue,
            average_check = o.average_check,
            customers = o.total_customers,
            popular = %o.most_popular_food,
            period = %s.period,
            trend_points = s.time_trend.len(),
            fallback_slots = ?s.fallback_slots,
            "Dashboard"
        );
    })
    .await?;

    page.teardown().await;
    Ok(())
}

async fn run_foods(ctx: &PageContext, cfg: &WatchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let page = mount_foods(ctx);
    if !cfg.search.is_empty() {
        page.send(FoodsCommand::Search(cfg.search.clone()))?;
    }
    if let Some(field) = cfg.sort {
        page.send(FoodsCommand::SetSort(SortSpec::new(field, cfg.sort_order)))?;
    }

    let max_rows = cfg.max_rows;
    watch_until_ctrl_c(&page, |s: &FoodsStore| {
        if s.loading {
            return;
        }
        let rows = s.view();
        let summary = s.summary();
        info!(
            target: "dashboard_watch",
            revision = s.revision,
            search = %s.query.search,
            sort = ?s.query.sort,
            rows = summary.rows,
            total_quantity = summary.total_quantity,
            fallback = s.uses_fallback,
            "Foods"
        );
        for food in rows.iter().take(max_rows) {
            info!(
                target: "dashboard_watch",
                food = %food.food_name,
                quantity = food.quantity,
                revenue = food.revenue,
                average_price = food.average_price(),
                "  row"
            );
        }
    })
    .await?;

    page.teardown().await;
    Ok(())
}

async fn run_analysis(
    ctx: &PageContext,
    cfg: &WatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = mount_analysis(ctx);
    if !cfg.filters.is_empty() {
        page.send(AnalysisCommand::SetFilters(cfg.filters.clone()))?;
        page.send(AnalysisCommand::Apply)?;
    }

    if let Some(dir) = &cfg.export_dir {
        match page.export(dir.clone()).await {
            Ok(path) => info!(target: "dashboard_watch", path = %path.display(), "Export saved"),
            Err(e) => error!(target: "dashboard_watch", error = %e, "Export failed"),
        }
    }

    let max_rows = cfg.max_rows;
    watch_until_ctrl_c(&page, |s: &AnalysisStore| {
        if s.loading {
            return;
        }
        info!(
            target: "dashboard_watch",
            revision = s.revision,
            categories = s.category_names.len(),
            orders = s.orders.len(),
            total = s.orders_total(),
            fallback_slots = ?s.fallback_slots,
            "Analysis"
        );
        for order in s.orders.iter().take(max_rows) {
            info!(
                target: "dashboard_watch",
                id = order.order_id,
                food = %order.food_name,
                quantity = order.quantity,
                total = order.total(),
                date = %order.date,
                "  order"
            );
        }
    })
    .await?;

    page.teardown().await;
    Ok(())
}
