// Shared test doubles: scripted push transports, page state waiting, and an
// in-process HTTP fixture of the statistics API
#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use dasturxon_core::live::{EventTransport, MessageStream};
use dasturxon_core::{DashError, Result};
use futures_util::stream::{self, StreamExt};
use serde_json::json;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// What one connect attempt does
pub enum Attempt {
    /// Connect fails outright
    Refuse,
    /// Deliver these messages, then the connection ends
    Finite(Vec<String>),
    /// Deliver these messages, then stay open
    Open(Vec<String>),
}

/// Transport that plays back a script of connect attempts and records when
/// each attempt happened. Once the script runs out every attempt is refused.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Attempt>>,
    attempts: Mutex<Vec<Instant>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Attempt>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            attempts: Mutex::new(Vec::new()),
        })
    }

    pub fn refusing() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl EventTransport for ScriptedTransport {
    async fn connect(&self) -> Result<MessageStream> {
        self.attempts.lock().unwrap().push(Instant::now());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            None | Some(Attempt::Refuse) => {
                Err(DashError::StreamFailure("connection refused".into()))
            }
            Some(Attempt::Finite(messages)) => {
                Ok(Box::pin(stream::iter(messages.into_iter().map(Ok))))
            }
            Some(Attempt::Open(messages)) => Ok(Box::pin(
                stream::iter(messages.into_iter().map(Ok)).chain(stream::pending()),
            )),
        }
    }
}

/// Transport whose first connection is fed by the returned sender; later
/// attempts are refused.
pub struct FeedTransport {
    rx: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl FeedTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                rx: Mutex::new(Some(rx)),
            }),
            tx,
        )
    }
}

#[async_trait]
impl EventTransport for FeedTransport {
    async fn connect(&self) -> Result<MessageStream> {
        match self.rx.lock().unwrap().take() {
            Some(rx) => Ok(Box::pin(UnboundedReceiverStream::new(rx).map(Ok))),
            None => Err(DashError::StreamFailure("feed already consumed".into())),
        }
    }
}

/// Transport that never finishes connecting
pub struct SilentTransport;

#[async_trait]
impl EventTransport for SilentTransport {
    async fn connect(&self) -> Result<MessageStream> {
        std::future::pending().await
    }
}

/// Wait until the published page state satisfies `pred`
pub async fn wait_for<S: Clone>(rx: &mut watch::Receiver<S>, pred: impl Fn(&S) -> bool) -> S {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let state = rx.borrow_and_update();
                if pred(&state) {
                    return state.clone();
                }
            }
            rx.changed().await.expect("page driver stopped");
        }
    })
    .await
    .expect("timed out waiting for page state")
}

pub fn stats_message(total_orders: u64) -> String {
    json!({
        "stats": {
            "total_orders": total_orders,
            "total_revenue": 1000.0,
            "average_check": 500.0,
            "total_customers": 2,
            "most_popular_food": "osh",
            "total_items": 4
        }
    })
    .to_string()
}

// =========================
// HTTP fixture
// =========================

/// Bytes served by the export endpoint
pub const EXPORT_BYTES: &[u8] = b"PK\x03\x04fixture-spreadsheet";

#[derive(Clone, Default)]
struct FixtureState {
    stream_connections: Arc<AtomicUsize>,
    last_orders_query: Arc<Mutex<Option<BTreeMap<String, String>>>>,
}

pub struct Fixture {
    pub base_url: String,
    state: FixtureState,
    server: tokio::task::JoinHandle<()>,
}

impl Fixture {
    pub fn stream_connections(&self) -> usize {
        self.state.stream_connections.load(Ordering::SeqCst)
    }

    /// Query parameters of the most recent `/api/orders` call
    pub fn last_orders_query(&self) -> Option<BTreeMap<String, String>> {
        self.state.last_orders_query.lock().unwrap().clone()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        self.server.abort();
    }
}

pub async fn spawn_fixture() -> Fixture {
    let state = FixtureState::default();
    let app = Router::new()
        .route("/api/stats/overview", get(overview))
        .route("/api/stats/top-foods", get(top_foods))
        .route("/api/stats/category-analysis", get(category_analysis))
        .route("/api/stats/time-trend", get(time_trend))
        .route("/api/stats/heatmap", get(heatmap))
        .route("/api/stats/customer-analysis", get(customer_analysis))
        .route("/api/orders", get(orders))
        .route("/api/categories", get(categories))
        .route("/api/export/excel", get(export_excel))
        .route("/api/events/stream", get(event_stream))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let addr = listener.local_addr().expect("fixture address");
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Fixture {
        base_url: format!("http://{}", addr),
        state,
        server,
    }
}

async fn overview() -> Json<serde_json::Value> {
    Json(json!({
        "total_orders": 600,
        "total_revenue": 99884101.0,
        "average_check": 166473.5,
        "total_customers": 100,
        "most_popular_food": "choy",
        "total_items": null
    }))
}

async fn top_foods(Query(q): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let limit: usize = q.get("limit").and_then(|v| v.parse().ok()).unwrap_or(10);
    let foods: Vec<_> = (0..limit.min(3))
        .map(|i| {
            json!({
                "food_name": format!("food-{i}"),
                "quantity": 100 - i,
                "revenue": 1000.0 * (i as f64 + 1.0)
            })
        })
        .collect();
    Json(json!(foods))
}

async fn category_analysis() -> Json<serde_json::Value> {
    Json(json!([
        {"category": "Grill", "quantity": 10, "orders": 4, "revenue": 250000.0, "percentage": 62.5},
        {"category": "Ichimlik", "quantity": 30, "orders": 20, "revenue": 150000.0, "percentage": 37.5}
    ]))
}

async fn time_trend(Query(q): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let period = q.get("period").cloned().unwrap_or_default();
    Json(json!([
        {"period": format!("{period}-1"), "revenue": 10.0},
        {"period": format!("{period}-2"), "revenue": 20.0}
    ]))
}

async fn heatmap() -> Json<serde_json::Value> {
    Json(json!({
        "data": [[1.0, null], [3.0, 4.0]],
        "hours": [12, 13],
        "days": ["Dushanba", "Seshanba"]
    }))
}

async fn customer_analysis() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
}

async fn orders(
    State(state): State<FixtureState>,
    Query(q): Query<BTreeMap<String, String>>,
) -> Json<serde_json::Value> {
    let category = q.get("category").cloned().unwrap_or_else(|| "Grill".into());
    *state.last_orders_query.lock().unwrap() = Some(q);
    Json(json!([
        {
            "order_id": 1,
            "customer_id": 7,
            "food_name": "shashlik",
            "category": category,
            "price": 25000.0,
            "quantity": 2,
            "date": "2024-05-01",
            "time": "12:30"
        }
    ]))
}

async fn categories() -> Json<serde_json::Value> {
    Json(json!(["Grill", "Ichimlik"]))
}

async fn export_excel() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )],
        EXPORT_BYTES,
    )
}

/// Each connection sends a stats event, a malformed message and a stats-less
/// event, then closes.
async fn event_stream(
    State(state): State<FixtureState>,
) -> Sse<impl futures_util::Stream<Item = std::result::Result<Event, Infallible>>> {
    let n = state.stream_connections.fetch_add(1, Ordering::SeqCst) as u64 + 1;
    let events = vec![
        Event::default().data(stats_message(600 + n)),
        Event::default().data("{not json"),
        Event::default().data(json!({"ping": n}).to_string()),
    ];
    Sse::new(stream::iter(events.into_iter().map(Ok)))
}
