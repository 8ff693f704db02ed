use crate::config::ClientConfig;
use crate::{DashError, Result};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::stream::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::pin::Pin;
use tracing::{debug, info};

pub const STREAM_PATH: &str = "/api/events/stream";

/// Raw messages of one open connection.
///
/// An `Err` item or the end of the stream means the connection is gone.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Opens push connections for a `LiveChannel`
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Open one connection. Dropping the returned stream closes it.
    async fn connect(&self) -> Result<MessageStream>;
}

/// Server-Sent Events over HTTP; each `data` field is one message
pub struct SseTransport {
    http: Client,
    url: String,
}

impl SseTransport {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        // No total timeout: the response body is open-ended
        let http = Client::builder()
            .connect_timeout(cfg.request_timeout())
            .build()
            .map_err(|e| DashError::ConfigError(format!("Failed to build SSE client: {e}")))?;
        Ok(Self {
            http,
            url: cfg.endpoint(STREAM_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EventTransport for SseTransport {
    async fn connect(&self) -> Result<MessageStream> {
        debug!(target: "live_channel", url = %self.url, "Opening event stream");

        let resp = self
            .http
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| DashError::StreamFailure(format!("connect failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DashError::StreamFailure(format!(
                "event stream returned status {}",
                status
            )));
        }

        info!(target: "live_channel", url = %self.url, "Event stream open");

        let messages = resp.bytes_stream().eventsource().filter_map(|item| async move {
            match item {
                Ok(event) if event.data.trim().is_empty() => None,
                Ok(event) => Some(Ok(event.data)),
                Err(e) => Some(Err(DashError::StreamFailure(e.to_string()))),
            }
        });

        Ok(Box::pin(messages))
    }
}
