use super::{publish, PageContext, PageHandle};
use crate::fallback;
use crate::fetch::Fetched;
use crate::model::{OrderFilters, OrderRecord};
use crate::store::AnalysisStore;
use crate::{DashError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

pub type AnalysisPage = PageHandle<AnalysisStore, AnalysisCommand>;

#[derive(Debug)]
pub enum AnalysisCommand {
    /// Edit the filter form without fetching
    SetFilters(OrderFilters),
    /// Refetch orders with the current filters
    Apply,
    /// Clear every filter and refetch
    Reset,
    /// Download the spreadsheet for the current filters into `dir`
    Export {
        dir: PathBuf,
        reply: oneshot::Sender<Result<PathBuf>>,
    },
}

enum Msg {
    Categories(Result<Vec<String>>),
    Orders(u64, Result<Vec<OrderRecord>>),
}

/// Mount the orders analysis page. It has no live subscription; data changes
/// only on explicit apply or reset.
pub fn mount_analysis(ctx: &PageContext) -> AnalysisPage {
    let store = AnalysisStore::new();
    let (state_tx, state_rx) = watch::channel(store.clone());
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(drive(ctx.clone(), store, state_tx, cmd_rx, shutdown_rx));
    info!(target: "page.analysis", "Analysis page mounted");
    PageHandle::new("analysis", state_rx, cmd_tx, shutdown_tx, task)
}

impl PageHandle<AnalysisStore, AnalysisCommand> {
    /// Export the orders matching the current filters; resolves to the
    /// written file path.
    pub async fn export(&self, dir: impl Into<PathBuf>) -> Result<PathBuf> {
        let (reply, rx) = oneshot::channel();
        self.send(AnalysisCommand::Export {
            dir: dir.into(),
            reply,
        })?;
        rx.await
            .map_err(|_| DashError::ExportFailure("analysis page closed before export finished".into()))?
    }
}

fn spawn_orders(
    ctx: &PageContext,
    seq: u64,
    filters: OrderFilters,
    inbox: &mpsc::UnboundedSender<Msg>,
) {
    let source = Arc::clone(&ctx.source);
    let inbox = inbox.clone();
    tokio::spawn(async move {
        let res = source.orders(&filters).await;
        let _ = inbox.send(Msg::Orders(seq, res));
    });
}

async fn drive(
    ctx: PageContext,
    mut store: AnalysisStore,
    state_tx: watch::Sender<AnalysisStore>,
    mut commands: mpsc::UnboundedReceiver<AnalysisCommand>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let (inbox_tx, mut inbox) = mpsc::unbounded_channel::<Msg>();

    {
        let source = Arc::clone(&ctx.source);
        let inbox = inbox_tx.clone();
        tokio::spawn(async move {
            let res = source.categories().await;
            let _ = inbox.send(Msg::Categories(res));
        });
    }

    // Only the newest orders request may land in the store
    let mut orders_seq: u64 = 1;
    store.begin_orders_fetch();
    publish(&state_tx, &store);
    spawn_orders(&ctx, orders_seq, store.filters.clone(), &inbox_tx);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(command) = commands.recv() => match command {
                AnalysisCommand::SetFilters(filters) => {
                    store.set_filters(filters);
                    publish(&state_tx, &store);
                }
                AnalysisCommand::Apply => {
                    orders_seq += 1;
                    store.begin_orders_fetch();
                    publish(&state_tx, &store);
                    spawn_orders(&ctx, orders_seq, store.filters.clone(), &inbox_tx);
                }
                AnalysisCommand::Reset => {
                    orders_seq += 1;
                    store.reset_filters();
                    store.begin_orders_fetch();
                    publish(&state_tx, &store);
                    spawn_orders(&ctx, orders_seq, store.filters.clone(), &inbox_tx);
                }
                AnalysisCommand::Export { dir, reply } => {
                    let source = Arc::clone(&ctx.source);
                    let filters = store.filters.clone();
                    tokio::spawn(async move {
                        let res = source.export_orders(&filters, &dir).await;
                        match &res {
                            Ok(path) => info!(target: "page.analysis", path = %path.display(), "Orders exported"),
                            Err(e) => warn!(target: "page.analysis", code = e.code(), error = %e, "Export failed"),
                        }
                        let _ = reply.send(res);
                    });
                }
            },
            Some(msg) = inbox.recv() => match msg {
                Msg::Categories(res) => {
                    store.apply_category_names(Fetched::non_empty_or(
                        "categories",
                        res,
                        fallback::demo_category_names,
                    ));
                    publish(&state_tx, &store);
                }
                Msg::Orders(seq, res) => {
                    if seq != orders_seq {
                        debug!(target: "page.analysis", seq, "Discarding superseded orders result");
                        continue;
                    }
                    store.apply_orders(Fetched::non_empty_or("orders", res, fallback::demo_orders));
                    debug!(target: "page.analysis", rows = store.orders.len(), "Orders loaded");
                    publish(&state_tx, &store);
                }
            },
        }
    }

    debug!(target: "page.analysis", "Analysis driver stopped");
}
