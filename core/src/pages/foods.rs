use super::{publish, PageContext, PageHandle};
use crate::derive::{SortField, SortSpec};
use crate::fallback;
use crate::fetch::Fetched;
use crate::model::{FoodStat, PushEvent};
use crate::store::FoodsStore;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub type FoodsPage = PageHandle<FoodsStore, FoodsCommand>;

#[derive(Debug, Clone)]
pub enum FoodsCommand {
    Search(String),
    /// Header click on a sortable column
    Sort(SortField),
    /// Replace the sort column and direction outright
    SetSort(SortSpec),
    Refresh,
}

enum Msg {
    Foods(Result<Vec<FoodStat>>),
    Push(PushEvent),
}

/// Mount the foods table: full list fetch, periodic refetch and a refetch on
/// every push event carrying stats.
pub fn mount_foods(ctx: &PageContext) -> FoodsPage {
    let store = FoodsStore::new();
    let (state_tx, state_rx) = watch::channel(store.clone());
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(drive(ctx.clone(), store, state_tx, cmd_rx, shutdown_rx));
    info!(target: "page.foods", "Foods page mounted");
    PageHandle::new("foods", state_rx, cmd_tx, shutdown_tx, task)
}

fn spawn_fetch(ctx: &PageContext, inbox: &mpsc::UnboundedSender<Msg>) {
    let source = Arc::clone(&ctx.source);
    let limit = ctx.config.foods_page_limit;
    let inbox = inbox.clone();
    tokio::spawn(async move {
        let res = source.top_foods(limit).await;
        let _ = inbox.send(Msg::Foods(res));
    });
}

async fn drive(
    ctx: PageContext,
    mut store: FoodsStore,
    state_tx: watch::Sender<FoodsStore>,
    mut commands: mpsc::UnboundedReceiver<FoodsCommand>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let (inbox_tx, mut inbox) = mpsc::unbounded_channel::<Msg>();

    spawn_fetch(&ctx, &inbox_tx);

    let push_tx = inbox_tx.clone();
    let _subscription = ctx.channel.subscribe(move |event| {
        let _ = push_tx.send(Msg::Push(event));
    });

    // interval_at panics on a zero period
    let every = ctx.config.refetch_interval().max(Duration::from_millis(1));
    let mut refetch = interval_at(Instant::now() + every, every);
    refetch.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = refetch.tick() => {
                debug!(target: "page.foods", "Periodic refetch");
                spawn_fetch(&ctx, &inbox_tx);
            }
            Some(command) = commands.recv() => match command {
                FoodsCommand::Search(search) => {
                    if store.set_search(search) {
                        publish(&state_tx, &store);
                    }
                }
                FoodsCommand::Sort(field) => {
                    store.toggle_sort(field);
                    publish(&state_tx, &store);
                }
                FoodsCommand::SetSort(spec) => {
                    if store.set_sort(spec) {
                        publish(&state_tx, &store);
                    }
                }
                FoodsCommand::Refresh => {
                    store.begin_fetch();
                    publish(&state_tx, &store);
                    spawn_fetch(&ctx, &inbox_tx);
                }
            },
            Some(msg) = inbox.recv() => match msg {
                Msg::Foods(res) => {
                    store.apply_foods(Fetched::non_empty_or("foods", res, fallback::demo_foods));
                    debug!(
                        target: "page.foods",
                        rows = store.foods.len(),
                        fallback = store.uses_fallback,
                        "Foods loaded"
                    );
                    publish(&state_tx, &store);
                }
                Msg::Push(event) => {
                    if event.stats.is_some() {
                        spawn_fetch(&ctx, &inbox_tx);
                    }
                }
            },
        }
    }

    debug!(target: "page.foods", "Foods driver stopped");
}
