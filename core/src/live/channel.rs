use super::transport::EventTransport;
use crate::model::PushEvent;
use crate::{DashError, Result};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Connection state of one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
    /// Waiting out the reconnect delay
    ScheduledRetry,
    /// Torn down; terminal
    Closed,
}

/// Push channel factory.
///
/// Each `subscribe` call gets its own connection and its own reconnect timer;
/// there is no fan-out between subscribers.
#[derive(Clone)]
pub struct LiveChannel {
    transport: Arc<dyn EventTransport>,
    reconnect_delay: Duration,
}

impl LiveChannel {
    pub fn new(transport: Arc<dyn EventTransport>, reconnect_delay: Duration) -> Self {
        Self {
            transport,
            reconnect_delay,
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// Start delivering decoded events to `callback` until the returned
    /// handle is unsubscribed or dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(PushEvent) + Send + 'static,
    {
        let (state_tx, state_rx) = watch::channel(ChannelState::Disconnected);
        let state_tx = Arc::new(state_tx);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_channel(
            Arc::clone(&self.transport),
            self.reconnect_delay,
            callback,
            Arc::clone(&state_tx),
            shutdown_rx,
        ));

        Subscription {
            state_tx,
            state_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Handle of one live subscription
pub struct Subscription {
    state_tx: Arc<watch::Sender<ChannelState>>,
    state_rx: watch::Receiver<ChannelState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn state(&self) -> ChannelState {
        *self.state_rx.borrow()
    }

    /// Watch state transitions
    pub fn state_changes(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == ChannelState::Closed
    }

    /// Close the connection and cancel any pending reconnect.
    /// Calling it again does nothing.
    pub fn unsubscribe(&mut self) {
        let Some(shutdown) = self.shutdown.take() else {
            return;
        };
        // Closed first, so nothing is delivered after this returns
        self.state_tx.send_replace(ChannelState::Closed);
        let _ = shutdown.send(());
        info!(target: "live_channel", "Unsubscribed");
    }

    /// Unsubscribe and wait for the channel task to finish
    pub async fn close(mut self) {
        self.unsubscribe();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Decode one raw message
pub fn decode_event(raw: &str) -> Result<PushEvent> {
    serde_json::from_str(raw).map_err(|e| DashError::DecodeFailure(e.to_string()))
}

/// Move to `next` unless the subscription is already closed
fn transition(state: &watch::Sender<ChannelState>, next: ChannelState) -> bool {
    state.send_if_modified(|current| {
        if *current == ChannelState::Closed || *current == next {
            return false;
        }
        *current = next;
        true
    });
    *state.borrow() != ChannelState::Closed
}

async fn run_channel<F>(
    transport: Arc<dyn EventTransport>,
    reconnect_delay: Duration,
    mut callback: F,
    state: Arc<watch::Sender<ChannelState>>,
    mut shutdown: oneshot::Receiver<()>,
) where
    F: FnMut(PushEvent) + Send + 'static,
{
    let mut attempt: u64 = 0;

    'outer: loop {
        if !transition(&state, ChannelState::Connecting) {
            break;
        }
        attempt += 1;
        debug!(target: "live_channel", attempt, "Connecting");

        let connected = tokio::select! {
            _ = &mut shutdown => break 'outer,
            res = transport.connect() => res,
        };

        match connected {
            Ok(mut stream) => {
                if !transition(&state, ChannelState::Connected) {
                    break;
                }
                info!(target: "live_channel", attempt, "Connected");

                loop {
                    let next = tokio::select! {
                        _ = &mut shutdown => break 'outer,
                        next = stream.next() => next,
                    };

                    match next {
                        Some(Ok(raw)) => match decode_event(&raw) {
                            Ok(event) => {
                                if *state.borrow() == ChannelState::Closed {
                                    break 'outer;
                                }
                                callback(event);
                            }
                            Err(e) => {
                                warn!(
                                    target: "live_channel",
                                    code = e.code(),
                                    error = %e,
                                    "Dropping undecodable message"
                                );
                            }
                        },
                        Some(Err(e)) => {
                            warn!(target: "live_channel", code = e.code(), error = %e, "Connection failed");
                            break;
                        }
                        None => {
                            warn!(target: "live_channel", "Event stream ended");
                            break;
                        }
                    }
                }
                // Dropping the stream closes the connection
                drop(stream);
                transition(&state, ChannelState::Disconnected);
            }
            Err(e) => {
                warn!(target: "live_channel", attempt, code = e.code(), error = %e, "Connect failed");
            }
        }

        if !transition(&state, ChannelState::ScheduledRetry) {
            break;
        }
        debug!(
            target: "live_channel",
            delay_ms = reconnect_delay.as_millis() as u64,
            "Reconnect scheduled"
        );

        tokio::select! {
            _ = &mut shutdown => break 'outer,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }

    state.send_replace(ChannelState::Closed);
    debug!(target: "live_channel", attempts = attempt, "Channel task finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_event() {
        let ev = decode_event(r#"{"stats":{"total_orders":3}}"#).unwrap();
        assert_eq!(ev.stats.unwrap().total_orders, 3);

        let err = decode_event("not json").unwrap_err();
        assert_eq!(err.code(), "DECODE_FAILURE");
    }

    #[test]
    fn test_closed_is_terminal() {
        let (tx, _rx) = watch::channel(ChannelState::Connected);
        assert!(transition(&tx, ChannelState::ScheduledRetry));
        tx.send_replace(ChannelState::Closed);
        assert!(!transition(&tx, ChannelState::Connecting));
        assert_eq!(*tx.borrow(), ChannelState::Closed);
    }
}
