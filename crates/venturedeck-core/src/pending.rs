//! Derived pending-request badge count for the innovator nav.
//!
//! The count is the sum of two independently fetched values (connection
//! requests and team invitations). It is recomputed on demand and on every
//! change event from either feed; events only trigger a refetch and carry
//! no count themselves.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use venturedeck_backend::{
    ChangeFeed, FeedSubscription, PendingCountSource, CONNECTION_REQUESTS, TEAM_INVITATIONS,
};

use crate::error::CoreResult;
use crate::metrics::METRICS;
use crate::obs;

/// Pending badge count for one user.
pub struct PendingRequestCounter<S: PendingCountSource + ?Sized> {
    source: Arc<S>,
    user_id: String,
    tx: watch::Sender<u64>,
}

impl<S: PendingCountSource + ?Sized> PendingRequestCounter<S> {
    /// Starts at zero until the first [`recompute`](Self::recompute).
    pub fn new(source: Arc<S>, user_id: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            source,
            user_id: user_id.into(),
            tx,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Last computed total.
    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Fetch both counts concurrently and publish their sum.
    ///
    /// The sum saturates at `u64::MAX`. On error the previous total is kept.
    pub async fn recompute(&self) -> CoreResult<u64> {
        let (connections, invitations) = futures::try_join!(
            self.source.pending_connection_requests(&self.user_id),
            self.source.pending_team_invitations(&self.user_id),
        )?;
        let total = connections.saturating_add(invitations);
        self.tx.send_replace(total);

        METRICS.inc_pending_recomputes();
        obs::emit_pending_recomputed(&self.user_id, connections, invitations, total);
        Ok(total)
    }

    /// Recompute once, then on every event from either feed until both
    /// topics close.
    pub async fn run(&self, feed: &dyn ChangeFeed) {
        let connections = feed.subscribe(CONNECTION_REQUESTS);
        let invitations = feed.subscribe(TEAM_INVITATIONS);
        self.run_with(connections, invitations).await;
    }

    async fn run_with(&self, mut connections: FeedSubscription, mut invitations: FeedSubscription) {
        self.refresh().await;

        let mut connections_open = true;
        let mut invitations_open = true;
        while connections_open || invitations_open {
            tokio::select! {
                event = connections.recv(), if connections_open => match event {
                    Some(_) => self.refresh().await,
                    None => connections_open = false,
                },
                event = invitations.recv(), if invitations_open => match event {
                    Some(_) => self.refresh().await,
                    None => invitations_open = false,
                },
            }
        }
        tracing::debug!(user_id = %self.user_id, "pending feeds closed");
    }

    async fn refresh(&self) {
        if let Err(e) = self.recompute().await {
            obs::emit_pending_error(&self.user_id, &e);
        }
    }
}

impl<S: PendingCountSource + ?Sized + 'static> PendingRequestCounter<S> {
    /// Run [`run`](Self::run) on a tokio task.
    ///
    /// Subscriptions are taken before this returns, so events published
    /// afterwards are never missed.
    pub fn spawn(self: &Arc<Self>, feed: &dyn ChangeFeed) -> JoinHandle<()> {
        let connections = feed.subscribe(CONNECTION_REQUESTS);
        let invitations = feed.subscribe(TEAM_INVITATIONS);
        let counter = Arc::clone(self);
        tokio::spawn(async move { counter.run_with(connections, invitations).await })
    }
}

impl<S: PendingCountSource + ?Sized> std::fmt::Debug for PendingRequestCounter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequestCounter")
            .field("user_id", &self.user_id)
            .field("current", &self.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venturedeck_backend::{BackendConfig, MockBackend};

    #[tokio::test]
    async fn test_recompute_sums_both_sources() {
        let backend = Arc::new(MockBackend::new(BackendConfig::instant()));
        backend.add_connection_request("u_1");
        backend.add_connection_request("u_1");
        backend.add_team_invitation("u_1");
        backend.add_team_invitation("u_2");

        let counter = PendingRequestCounter::new(backend, "u_1");
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.recompute().await.unwrap(), 3);
        assert_eq!(counter.current(), 3);
    }

    #[tokio::test]
    async fn test_subscribers_see_recomputed_total() {
        let backend = Arc::new(MockBackend::new(BackendConfig::instant()));
        backend.add_team_invitation("u_1");

        let counter = PendingRequestCounter::new(backend, "u_1");
        let rx = counter.subscribe();
        counter.recompute().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
    }

    struct FixedSource(u64, u64);

    #[async_trait::async_trait]
    impl PendingCountSource for FixedSource {
        async fn pending_connection_requests(
            &self,
            _user_id: &str,
        ) -> venturedeck_backend::BackendResult<u64> {
            Ok(self.0)
        }

        async fn pending_team_invitations(
            &self,
            _user_id: &str,
        ) -> venturedeck_backend::BackendResult<u64> {
            Ok(self.1)
        }
    }

    #[tokio::test]
    async fn test_recompute_saturates_large_counts() {
        let counter = PendingRequestCounter::new(Arc::new(FixedSource(u64::MAX, 1)), "u_1");
        assert_eq!(counter.recompute().await.unwrap(), u64::MAX);
        assert_eq!(counter.current(), u64::MAX);
    }

    #[tokio::test]
    async fn test_feed_loop_survives_large_counts() {
        let counter = Arc::new(PendingRequestCounter::new(
            Arc::new(FixedSource(u64::MAX, u64::MAX)),
            "u_1",
        ));
        let feed = venturedeck_backend::MemoryChangeFeed::new();
        let handle = counter.spawn(&feed);
        feed.publish(venturedeck_backend::ChangeEvent::new(
            CONNECTION_REQUESTS,
            venturedeck_backend::ChangeKind::Insert,
            None,
        ));
        feed.close(CONNECTION_REQUESTS);
        feed.close(TEAM_INVITATIONS);

        handle.await.unwrap();
        assert_eq!(counter.current(), u64::MAX);
    }
}
