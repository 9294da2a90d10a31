//! Driving connectivity from a watch channel

use offline_dispatch::testing::TestHarness;
use offline_dispatch::{watch_connectivity, ConfigurationError, DynAction, OfflineConfig};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_latest_value_replays_then_stops_when_sender_closes() {
    let mut harness = TestHarness::offline(OfflineConfig::new());
    harness
        .dispatch(DynAction::new("FETCH_FEED_REQUEST"))
        .unwrap();
    harness
        .dispatch(DynAction::new("FETCH_USER_REQUEST"))
        .unwrap();
    harness.drain_forwarded();

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    drop(tx);

    watch_connectivity(harness.store_mut(), rx, CancellationToken::new())
        .await
        .unwrap();

    assert!(harness.is_connected());
    assert!(harness.queue().is_empty());
    assert_eq!(
        harness.forwarded_names(),
        vec![
            "CONNECTION_CHANGE",
            "REMOVE_FROM_ACTION_QUEUE",
            "FETCH_FEED_REQUEST",
            "REMOVE_FROM_ACTION_QUEUE",
            "FETCH_USER_REQUEST"
        ]
    );
}

#[tokio::test]
async fn test_cancel_stops_watch() {
    let mut harness = TestHarness::<DynAction>::new(OfflineConfig::new());
    let (tx, rx) = watch::channel(false);
    let cancel = CancellationToken::new();
    cancel.cancel();

    watch_connectivity(harness.store_mut(), rx, cancel)
        .await
        .unwrap();

    // initial value still applied
    assert!(!harness.is_connected());
    drop(tx);
}

#[tokio::test]
async fn test_config_error_during_replay_ends_watch() {
    let mut harness = TestHarness::offline(OfflineConfig::new());
    harness
        .dispatch(DynAction::new("FETCH_FEED_REQUEST"))
        .unwrap();
    *harness.store_mut().offline_mut().config_mut() =
        OfflineConfig::new().action_types("FETCH_FEED_REQUEST");

    let (tx, rx) = watch::channel(true);
    let result = watch_connectivity(harness.store_mut(), rx, CancellationToken::new()).await;

    assert_eq!(result, Err(ConfigurationError::ActionTypes));
    assert_eq!(harness.queue().len(), 1);
    drop(tx);
}
