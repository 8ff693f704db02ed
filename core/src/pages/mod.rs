// Page controllers
//
// Each mounted page runs one driver task that owns its store. Fetch results,
// push events, timer ticks and commands all arrive through the driver's inbox
// and are applied one at a time; renderers read snapshots from a watch channel.

mod analysis;
mod dashboard;
mod foods;

pub use analysis::{mount_analysis, AnalysisCommand, AnalysisPage};
pub use dashboard::{mount_dashboard, DashboardCommand, DashboardPage};
pub use foods::{mount_foods, FoodsCommand, FoodsPage};

use crate::api::{ApiClient, StatsSource};
use crate::config::ClientConfig;
use crate::live::{EventTransport, LiveChannel, SseTransport};
use crate::{DashError, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Collaborators shared by all pages
#[derive(Clone)]
pub struct PageContext {
    pub source: Arc<dyn StatsSource>,
    pub channel: LiveChannel,
    pub config: ClientConfig,
}

impl PageContext {
    pub fn new(
        source: Arc<dyn StatsSource>,
        transport: Arc<dyn EventTransport>,
        config: ClientConfig,
    ) -> Self {
        let channel = LiveChannel::new(transport, config.reconnect_delay());
        Self {
            source,
            channel,
            config,
        }
    }

    /// HTTP client and SSE transport for `config.base_url`
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let source = Arc::new(ApiClient::new(config.clone())?);
        let transport = Arc::new(SseTransport::new(&config)?);
        Ok(Self::new(source, transport, config))
    }
}

/// Handle of a mounted page.
///
/// Dropping it tears the page down as well; `teardown` additionally waits for
/// the driver to finish.
pub struct PageHandle<S, C> {
    name: &'static str,
    state: watch::Receiver<S>,
    commands: mpsc::UnboundedSender<C>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl<S: Clone, C> PageHandle<S, C> {
    pub(crate) fn new(
        name: &'static str,
        state: watch::Receiver<S>,
        commands: mpsc::UnboundedSender<C>,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            name,
            state,
            commands,
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    /// Current store contents
    pub fn snapshot(&self) -> S {
        self.state.borrow().clone()
    }

    /// Receiver notified on every store mutation
    pub fn watch(&self) -> watch::Receiver<S> {
        self.state.clone()
    }

    pub fn send(&self, command: C) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| DashError::PageError(format!("{} page is not mounted", self.name)))
    }

    /// Stop the driver: cancels the push subscription and page timers.
    /// Results of fetches still in flight are discarded.
    pub async fn teardown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        debug!(target: "pages", page = self.name, "Page torn down");
    }
}

impl<S, C> Drop for PageHandle<S, C> {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Publish a store snapshot to renderers
pub(crate) fn publish<S: Clone>(tx: &watch::Sender<S>, store: &S) {
    tx.send_replace(store.clone());
}
