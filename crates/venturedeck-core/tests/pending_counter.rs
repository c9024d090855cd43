//! Pending badge counter driven by the mock change feeds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use venturedeck_backend::{
    BackendError, BackendResult, ChangeEvent, ChangeFeed, ChangeKind, MemoryChangeFeed,
    PendingCountSource, CONNECTION_REQUESTS, TEAM_INVITATIONS,
};
use venturedeck_core::*;

async fn wait_for_total(counter: &PendingRequestCounter<MockBackend>, expected: u64) {
    let mut rx = counter.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|total| *total == expected))
        .await
        .expect("counter never reached expected total")
        .unwrap();
}

#[tokio::test]
async fn total_tracks_events_from_both_feeds() {
    let backend = Arc::new(MockBackend::new(BackendConfig::instant()));
    backend.add_connection_request("u_1");

    let counter = Arc::new(PendingRequestCounter::new(Arc::clone(&backend), "u_1"));
    let feed = backend.feed();
    let handle = counter.spawn(&*feed);
    wait_for_total(&counter, 1).await;

    backend.add_team_invitation("u_1");
    wait_for_total(&counter, 2).await;

    backend.add_connection_request("u_1");
    backend.add_team_invitation("u_1");
    wait_for_total(&counter, 4).await;

    backend.resolve_connection_request("u_1");
    wait_for_total(&counter, 3).await;

    feed.close(CONNECTION_REQUESTS);
    feed.close(TEAM_INVITATIONS);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("counter task did not stop after feeds closed")
        .unwrap();
}

#[tokio::test]
async fn other_users_events_recompute_same_total() {
    let backend = Arc::new(MockBackend::new(BackendConfig::instant()));
    backend.add_connection_request("u_1");

    let counter = Arc::new(PendingRequestCounter::new(Arc::clone(&backend), "u_1"));
    let feed = backend.feed();
    let handle = counter.spawn(&*feed);
    wait_for_total(&counter, 1).await;

    let mut rx = counter.subscribe();
    backend.add_team_invitation("u_2");
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("event for u_2 was never handled")
        .unwrap();
    assert_eq!(*rx.borrow_and_update(), 1);

    feed.close(CONNECTION_REQUESTS);
    feed.close(TEAM_INVITATIONS);
    handle.await.unwrap();
    assert_eq!(counter.current(), 1);
}

#[tokio::test]
async fn run_returns_when_both_topics_close() {
    let backend = Arc::new(MockBackend::new(BackendConfig::instant()));
    let counter = PendingRequestCounter::new(Arc::clone(&backend), "u_1");
    let feed = MemoryChangeFeed::new();

    let closer = async {
        tokio::task::yield_now().await;
        feed.close(CONNECTION_REQUESTS);
        feed.close(TEAM_INVITATIONS);
    };
    tokio::join!(counter.run(&feed), closer);
    assert_eq!(counter.current(), 0);
}

struct FlakySource {
    fail: AtomicBool,
    failed: Notify,
}

#[async_trait]
impl PendingCountSource for FlakySource {
    async fn pending_connection_requests(&self, _user_id: &str) -> BackendResult<u64> {
        if self.fail.load(Ordering::SeqCst) {
            self.failed.notify_one();
            return Err(BackendError::Unavailable("offline".to_string()));
        }
        Ok(2)
    }

    async fn pending_team_invitations(&self, _user_id: &str) -> BackendResult<u64> {
        Ok(5)
    }
}

async fn wait_for_failure(source: &FlakySource) {
    tokio::time::timeout(Duration::from_secs(5), source.failed.notified())
        .await
        .expect("failing refresh never ran");
}

#[tokio::test]
async fn failed_recompute_keeps_previous_total() {
    let source = Arc::new(FlakySource {
        fail: AtomicBool::new(false),
        failed: Notify::new(),
    });
    let counter = Arc::new(PendingRequestCounter::new(Arc::clone(&source), "u_1"));
    assert_eq!(counter.recompute().await.unwrap(), 7);

    source.fail.store(true, Ordering::SeqCst);
    let err = counter.recompute().await.unwrap_err();
    assert!(matches!(err, CoreError::Backend(BackendError::Unavailable(_))));
    assert_eq!(counter.current(), 7);
    source.failed.notified().await;

    // A feed event during an outage leaves the badge unchanged.
    let rx = counter.subscribe();
    let feed = MemoryChangeFeed::new();
    let handle = counter.spawn(&feed);
    wait_for_failure(&source).await;
    feed.publish(ChangeEvent::new(CONNECTION_REQUESTS, ChangeKind::Insert, None));
    wait_for_failure(&source).await;

    feed.close(CONNECTION_REQUESTS);
    feed.close(TEAM_INVITATIONS);
    handle.await.unwrap();
    assert!(!rx.has_changed().unwrap());
    assert_eq!(counter.current(), 7);
}

#[tokio::test]
async fn counter_over_dyn_backend() {
    let backend = Arc::new(MockBackend::new(BackendConfig::instant()));
    backend.add_connection_request("u_1");
    let dyn_backend: Arc<dyn Backend> = backend.clone();

    let counter = PendingRequestCounter::new(dyn_backend, "u_1");
    assert_eq!(counter.recompute().await.unwrap(), 1);
}
