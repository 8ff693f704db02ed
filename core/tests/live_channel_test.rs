mod support;

use dasturxon_core::{ChannelState, LiveChannel, PushEvent};
use std::time::Duration;
use support::{stats_message, Attempt, ScriptedTransport};
use tokio::sync::mpsc;

const DELAY: Duration = Duration::from_secs(5);

fn collecting(channel: &LiveChannel) -> (dasturxon_core::Subscription, mpsc::UnboundedReceiver<PushEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sub = channel.subscribe(move |event| {
        let _ = tx.send(event);
    });
    (sub, rx)
}

#[tokio::test(start_paused = true)]
async fn failing_channel_retries_every_five_seconds() {
    let transport = ScriptedTransport::refusing();
    let channel = LiveChannel::new(transport.clone(), DELAY);
    let mut sub = channel.subscribe(|_| {});

    tokio::time::sleep(Duration::from_secs(16)).await;

    let attempts = transport.attempts();
    assert_eq!(attempts.len(), 4, "attempts at 0s, 5s, 10s and 15s");
    for pair in attempts.windows(2) {
        assert_eq!(pair[1] - pair[0], DELAY);
    }
    assert_eq!(sub.state(), ChannelState::ScheduledRetry);

    sub.unsubscribe();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(transport.attempt_count(), 4, "no attempts after unsubscribe");
    assert_eq!(sub.state(), ChannelState::Closed);
}

#[tokio::test(start_paused = true)]
async fn undecodable_message_is_dropped_and_connection_kept() {
    let transport = ScriptedTransport::new(vec![Attempt::Open(vec![
        stats_message(1),
        "not json at all".to_string(),
        stats_message(2),
        r#"{"ping":true}"#.to_string(),
    ])]);
    let channel = LiveChannel::new(transport.clone(), DELAY);
    let (sub, mut rx) = collecting(&channel);

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    let third = rx.recv().await.unwrap();

    assert_eq!(first.stats.unwrap().total_orders, 1);
    assert_eq!(second.stats.unwrap().total_orders, 2);
    assert!(third.stats.is_none());
    assert_eq!(third.extra.get("ping"), Some(&serde_json::Value::Bool(true)));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(transport.attempt_count(), 1);
    assert_eq!(sub.state(), ChannelState::Connected);
    sub.close().await;
}

#[tokio::test(start_paused = true)]
async fn ended_stream_reconnects_after_delay() {
    let transport = ScriptedTransport::new(vec![
        Attempt::Finite(vec![stats_message(10)]),
        Attempt::Open(vec![stats_message(11)]),
    ]);
    let channel = LiveChannel::new(transport.clone(), DELAY);
    let (sub, mut rx) = collecting(&channel);

    assert_eq!(rx.recv().await.unwrap().stats.unwrap().total_orders, 10);
    assert_eq!(rx.recv().await.unwrap().stats.unwrap().total_orders, 11);

    let attempts = transport.attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[1] - attempts[0], DELAY);
    sub.close().await;
}

#[tokio::test(start_paused = true)]
async fn subscriptions_reconnect_independently() {
    let transport = ScriptedTransport::refusing();
    let channel = LiveChannel::new(transport.clone(), DELAY);

    let mut first = channel.subscribe(|_| {});
    tokio::time::sleep(Duration::from_secs(2)).await;
    let second = channel.subscribe(|_| {});
    tokio::time::sleep(Duration::from_secs(6)).await;

    // first: 0s, 5s; second: 2s, 7s
    assert_eq!(transport.attempt_count(), 4);

    first.unsubscribe();
    tokio::time::sleep(Duration::from_secs(5)).await;
    // only the second keeps retrying (12s)
    assert_eq!(transport.attempt_count(), 5);
    second.close().await;
}

#[tokio::test]
async fn unsubscribe_is_idempotent() {
    let transport = ScriptedTransport::new(vec![Attempt::Open(vec![])]);
    let channel = LiveChannel::new(transport, DELAY);
    let mut sub = channel.subscribe(|_| {});

    let mut states = sub.state_changes();
    states
        .wait_for(|s| *s == ChannelState::Connected)
        .await
        .unwrap();

    sub.unsubscribe();
    sub.unsubscribe();
    assert!(sub.is_closed());
    sub.close().await;
}

#[tokio::test(start_paused = true)]
async fn nothing_is_delivered_after_unsubscribe() {
    let (feed, tx) = support::FeedTransport::new();
    let channel = LiveChannel::new(feed, DELAY);
    let (mut sub, mut rx) = collecting(&channel);

    tx.send(stats_message(1)).unwrap();
    assert_eq!(rx.recv().await.unwrap().stats.unwrap().total_orders, 1);

    sub.unsubscribe();
    let _ = tx.send(stats_message(2));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(rx.try_recv().is_err());
}
