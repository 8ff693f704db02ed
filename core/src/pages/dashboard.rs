use super::{publish, PageContext, PageHandle};
use crate::api::StatsSource;
use crate::fallback;
use crate::fetch::with_fallback;
use crate::model::{Period, PushEvent, TimeTrendPoint};
use crate::store::{DashboardBatch, DashboardStore};
use crate::Result;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

pub type DashboardPage = PageHandle<DashboardStore, DashboardCommand>;

#[derive(Debug, Clone)]
pub enum DashboardCommand {
    /// Switch the trend chart bucket and refetch only the trend
    SetPeriod(Period),
    /// Refetch every slot
    Refresh,
}

enum Msg {
    Batch(Box<DashboardBatch>),
    Trend(Period, Result<Vec<TimeTrendPoint>>),
    Push(PushEvent),
}

/// Mount the dashboard: parallel fetch of all slots plus a live subscription
/// that replaces the overview cards.
pub fn mount_dashboard(ctx: &PageContext) -> DashboardPage {
    let store = DashboardStore::new();
    let (state_tx, state_rx) = watch::channel(store.clone());
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(drive(ctx.clone(), store, state_tx, cmd_rx, shutdown_rx));
    info!(target: "page.dashboard", "Dashboard mounted");
    PageHandle::new("dashboard", state_rx, cmd_tx, shutdown_tx, task)
}

/// Fetch every dashboard slot concurrently, each with its own fallback
pub async fn fetch_dashboard(
    source: &dyn StatsSource,
    period: Period,
    top_foods: u32,
) -> DashboardBatch {
    let (overview, top, categories, time_trend, heatmap, customers) = tokio::join!(
        with_fallback("overview", source.overview(), fallback::demo_overview),
        with_fallback("top_foods", source.top_foods(top_foods), || {
            fallback::demo_top_foods(top_foods as usize)
        }),
        with_fallback(
            "category_analysis",
            source.category_analysis(),
            fallback::demo_category_analysis
        ),
        with_fallback("time_trend", source.time_trend(period), Vec::new),
        with_fallback("heatmap", async { source.heatmap().await.map(Some) }, || None),
        with_fallback(
            "customer_analysis",
            source.customer_analysis(),
            fallback::empty_customer_analysis
        ),
    );

    DashboardBatch {
        period,
        overview,
        top_foods: top,
        categories,
        time_trend,
        heatmap,
        customers,
    }
}

fn spawn_batch(ctx: &PageContext, period: Period, inbox: &mpsc::UnboundedSender<Msg>) {
    let source = Arc::clone(&ctx.source);
    let top_foods = ctx.config.dashboard_top_foods;
    let inbox = inbox.clone();
    tokio::spawn(async move {
        let batch = fetch_dashboard(source.as_ref(), period, top_foods).await;
        // Page may be gone; the result is simply dropped then
        let _ = inbox.send(Msg::Batch(Box::new(batch)));
    });
}

fn spawn_trend(ctx: &PageContext, period: Period, inbox: &mpsc::UnboundedSender<Msg>) {
    let source = Arc::clone(&ctx.source);
    let inbox = inbox.clone();
    tokio::spawn(async move {
        let res = source.time_trend(period).await;
        let _ = inbox.send(Msg::Trend(period, res));
    });
}

async fn drive(
    ctx: PageContext,
    mut store: DashboardStore,
    state_tx: watch::Sender<DashboardStore>,
    mut commands: mpsc::UnboundedReceiver<DashboardCommand>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let (inbox_tx, mut inbox) = mpsc::unbounded_channel::<Msg>();

    spawn_batch(&ctx, store.period, &inbox_tx);

    let push_tx = inbox_tx.clone();
    let _subscription = ctx.channel.subscribe(move |event| {
        let _ = push_tx.send(Msg::Push(event));
    });

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(command) = commands.recv() => match command {
                DashboardCommand::SetPeriod(period) => {
                    if store.set_period(period) {
                        debug!(target: "page.dashboard", period = %period, "Period changed");
                        spawn_trend(&ctx, period, &inbox_tx);
                        publish(&state_tx, &store);
                    }
                }
                DashboardCommand::Refresh => {
                    spawn_batch(&ctx, store.period, &inbox_tx);
                }
            },
            Some(msg) = inbox.recv() => match msg {
                Msg::Batch(batch) => {
                    store.apply_batch(*batch);
                    info!(
                        target: "page.dashboard",
                        fallback_slots = store.fallback_slots.len(),
                        "Dashboard data loaded"
                    );
                    publish(&state_tx, &store);
                }
                Msg::Trend(period, Ok(points)) => {
                    if store.apply_time_trend(period, points) {
                        publish(&state_tx, &store);
                    }
                }
                Msg::Trend(period, Err(e)) => {
                    // Keep the previous trend on screen
                    warn!(target: "page.dashboard", period = %period, error = %e, "Trend fetch failed");
                }
                Msg::Push(event) => {
                    if store.apply_push(&event) {
                        publish(&state_tx, &store);
                    }
                }
            },
        }
    }

    // `_subscription` drops here, closing the push connection
    debug!(target: "page.dashboard", "Dashboard driver stopped");
}
