//! In-memory mock backend.
//!
//! `MockBackend` satisfies every facade trait without a server. Each async
//! call sleeps for the configured latency before touching state, and no lock
//! is held across that sleep, so concurrent calls interleave the way real
//! network calls would: concurrent creates both append, concurrent updates
//! of the same id are last-write-wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::api::*;
use crate::config::BackendConfig;
use crate::feed::{ChangeEvent, ChangeFeed, ChangeKind, MemoryChangeFeed};
use crate::feed::{CONNECTION_REQUESTS, TEAM_INVITATIONS};
use crate::ids::IdGenerator;
use crate::record::{Fields, Record};
use crate::seed;
use crate::BackendResult;

#[derive(Debug, Default, Clone, Copy)]
struct PendingCounts {
    connection_requests: u64,
    team_invitations: u64,
}

/// In-memory backend with simulated latency.
pub struct MockBackend {
    config: BackendConfig,
    ids: IdGenerator,
    session: Session,
    records: Mutex<Vec<Record>>,
    profile: Mutex<Record>,
    pending: Mutex<HashMap<String, PendingCounts>>,
    feed: Arc<MemoryChangeFeed>,
    next_subscription: AtomicU64,
}

impl MockBackend {
    /// Create a backend. Demo startups are preloaded when
    /// `config.seed_demo_data` is set.
    pub fn new(config: BackendConfig) -> Self {
        let records = if config.seed_demo_data {
            seed::demo_startups()
        } else {
            Vec::new()
        };
        Self::with_records(config, records)
    }

    /// Create a backend whose collection starts as `records`.
    pub fn with_records(config: BackendConfig, records: Vec<Record>) -> Self {
        let session = Session {
            user_id: seed::DEMO_USER_ID.to_string(),
            display_name: seed::DEMO_DISPLAY_NAME.to_string(),
            email_or_handle: seed::DEMO_USER_EMAIL.to_string(),
            issued_token: seed::DEMO_TOKEN.to_string(),
            issued_at: Utc::now(),
        };
        Self {
            ids: IdGenerator::new(config.id_strategy),
            config,
            session,
            records: Mutex::new(records),
            profile: Mutex::new(seed::demo_profile()),
            pending: Mutex::new(HashMap::new()),
            feed: Arc::new(MemoryChangeFeed::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Change feed carrying pending-count notifications.
    pub fn feed(&self) -> Arc<MemoryChangeFeed> {
        self.feed.clone()
    }

    /// The fixed session every auth call resolves to.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Restore the collection, profile and pending counts to their initial
    /// state.
    pub fn reset(&self) {
        *lock(&self.records) = if self.config.seed_demo_data {
            seed::demo_startups()
        } else {
            Vec::new()
        };
        *lock(&self.profile) = seed::demo_profile();
        lock(&self.pending).clear();
        debug!("mock backend reset");
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a pending connection request for `user_id` and notify the feed.
    pub fn add_connection_request(&self, user_id: &str) -> String {
        self.bump_pending(user_id, CONNECTION_REQUESTS, |c| c.connection_requests += 1)
    }

    /// Add a pending team invitation for `user_id` and notify the feed.
    pub fn add_team_invitation(&self, user_id: &str) -> String {
        self.bump_pending(user_id, TEAM_INVITATIONS, |c| c.team_invitations += 1)
    }

    /// Resolve (accept or decline) one pending connection request.
    /// Returns `false` if none was pending.
    pub fn resolve_connection_request(&self, user_id: &str) -> bool {
        self.settle_pending(user_id, CONNECTION_REQUESTS, |c| &mut c.connection_requests)
    }

    /// Resolve one pending team invitation. Returns `false` if none was pending.
    pub fn resolve_team_invitation(&self, user_id: &str) -> bool {
        self.settle_pending(user_id, TEAM_INVITATIONS, |c| &mut c.team_invitations)
    }

    fn bump_pending(
        &self,
        user_id: &str,
        topic: &str,
        apply: impl FnOnce(&mut PendingCounts),
    ) -> String {
        apply(lock(&self.pending).entry(user_id.to_string()).or_default());
        let row_id = self.ids.next_id();
        self.feed.publish(ChangeEvent::new(
            topic,
            ChangeKind::Insert,
            Some(row_id.clone()),
        ));
        row_id
    }

    fn settle_pending(
        &self,
        user_id: &str,
        topic: &str,
        slot: impl FnOnce(&mut PendingCounts) -> &mut u64,
    ) -> bool {
        let settled = {
            let mut pending = lock(&self.pending);
            match pending.get_mut(user_id) {
                Some(counts) => {
                    let count = slot(counts);
                    if *count > 0 {
                        *count -= 1;
                        true
                    } else {
                        false
                    }
                }
                None => false,
            }
        };
        if settled {
            self.feed
                .publish(ChangeEvent::new(topic, ChangeKind::Update, None));
        }
        settled
    }

    fn pending_for(&self, user_id: &str) -> PendingCounts {
        lock(&self.pending).get(user_id).copied().unwrap_or_default()
    }

    fn auth_response(&self) -> AuthResponse {
        AuthResponse {
            user: AuthUser {
                id: self.session.user_id.clone(),
                email: self.session.email_or_handle.clone(),
            },
            session: self.session.clone(),
        }
    }

    async fn delay(&self) {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("config", &self.config)
            .field("records", &self.len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl AuthApi for MockBackend {
    // Credentials are not checked.
    #[instrument(skip(self, _password))]
    async fn sign_in(&self, email: &str, _password: &str) -> BackendResult<AuthResponse> {
        self.delay().await;
        info!(event = "auth.signed_in", user_id = %self.session.user_id);
        Ok(self.auth_response())
    }

    #[instrument(skip(self, _password))]
    async fn sign_up(&self, email: &str, _password: &str) -> BackendResult<AuthResponse> {
        self.delay().await;
        info!(event = "auth.signed_up", user_id = %self.session.user_id);
        Ok(self.auth_response())
    }

    async fn sign_out(&self) -> BackendResult<()> {
        self.delay().await;
        info!(event = "auth.signed_out", user_id = %self.session.user_id);
        Ok(())
    }

    async fn get_session(&self) -> BackendResult<SessionResponse> {
        Ok(SessionResponse {
            session: Some(self.session.clone()),
        })
    }

    fn on_auth_state_change(&self, _callback: AuthCallback) -> AuthSubscription {
        // The mock session never transitions, so the callback is dropped unused.
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        debug!(subscription = id, "auth state listener registered");
        AuthSubscription::new(id)
    }
}

#[async_trait]
impl EntityApi for MockBackend {
    async fn get_all(&self) -> BackendResult<Vec<Record>> {
        self.delay().await;
        Ok(lock(&self.records).clone())
    }

    async fn get_by_id(&self, id: &str) -> BackendResult<Option<Record>> {
        self.delay().await;
        Ok(lock(&self.records).iter().find(|r| r.id == id).cloned())
    }

    #[instrument(skip(self, fields))]
    async fn create(&self, fields: Fields) -> BackendResult<Record> {
        self.delay().await;
        let record = Record::new(self.ids.next_id(), fields);
        lock(&self.records).push(record.clone());
        debug!(event = "entity.created", id = %record.id);
        Ok(record)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: Fields) -> BackendResult<Option<Record>> {
        self.delay().await;
        let mut records = lock(&self.records);
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.merge(patch);
                debug!(event = "entity.updated", id = %id);
                Ok(Some(record.clone()))
            }
            None => {
                debug!(event = "entity.update_miss", id = %id);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> BackendResult<bool> {
        self.delay().await;
        let mut records = lock(&self.records);
        match records.iter().position(|r| r.id == id) {
            Some(index) => {
                records.remove(index);
                debug!(event = "entity.deleted", id = %id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ProfileApi for MockBackend {
    async fn get_current(&self) -> BackendResult<Record> {
        self.delay().await;
        Ok(lock(&self.profile).clone())
    }

    #[instrument(skip(self, patch))]
    async fn update_profile(&self, patch: Fields) -> BackendResult<Record> {
        self.delay().await;
        let mut profile = lock(&self.profile);
        profile.merge(patch);
        Ok(profile.clone())
    }
}

impl Analytics for MockBackend {
    fn track(&self, event: &str, properties: serde_json::Value) {
        debug!(event = "analytics.track", name = %event, properties = %properties);
    }

    fn identify(&self, user_id: &str, traits: serde_json::Value) {
        debug!(event = "analytics.identify", user_id = %user_id, traits = %traits);
    }

    fn page(&self, name: &str, properties: serde_json::Value) {
        debug!(event = "analytics.page", name = %name, properties = %properties);
    }
}

impl Telemetry for MockBackend {
    fn capture_exception(&self, error: &(dyn std::error::Error + 'static)) {
        warn!(event = "telemetry.exception", error = %error);
    }

    fn capture_message(&self, message: &str, level: MessageLevel) {
        match level {
            MessageLevel::Error | MessageLevel::Warning => {
                warn!(event = "telemetry.message", level = ?level, message = %message)
            }
            MessageLevel::Info | MessageLevel::Debug => {
                debug!(event = "telemetry.message", level = ?level, message = %message)
            }
        }
    }
}

#[async_trait]
impl PendingCountSource for MockBackend {
    async fn pending_connection_requests(&self, user_id: &str) -> BackendResult<u64> {
        self.delay().await;
        Ok(self.pending_for(user_id).connection_requests)
    }

    async fn pending_team_invitations(&self, user_id: &str) -> BackendResult<u64> {
        self.delay().await;
        Ok(self.pending_for(user_id).team_invitations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::into_fields;
    use serde_json::json;

    #[tokio::test]
    async fn test_seeded_backend_lists_demo_startups() {
        let backend = MockBackend::new(BackendConfig::instant().with_seed(true));
        let all = backend.get_all().await.unwrap();
        assert_eq!(all.len(), seed::demo_startups().len());
        assert_eq!(all[0].id, "s_demo_1");
    }

    #[tokio::test]
    async fn test_reset_restores_initial_state() {
        let backend = MockBackend::new(BackendConfig::instant());
        backend.create(into_fields(json!({"title": "X"}))).await.unwrap();
        backend
            .update_profile(into_fields(json!({"bio": "changed"})))
            .await
            .unwrap();
        backend.add_connection_request("u_demo");

        backend.reset();

        assert!(backend.is_empty());
        let profile = backend.get_current().await.unwrap();
        assert_eq!(profile, seed::demo_profile());
        assert_eq!(backend.pending_connection_requests("u_demo").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_resolve_pending_without_requests_is_false() {
        let backend = MockBackend::new(BackendConfig::instant());
        assert!(!backend.resolve_team_invitation("u_demo"));

        backend.add_team_invitation("u_demo");
        assert!(backend.resolve_team_invitation("u_demo"));
        assert_eq!(backend.pending_team_invitations("u_demo").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pending_changes_publish_to_feed() {
        let backend = MockBackend::new(BackendConfig::instant());
        let mut sub = backend.feed().subscribe(CONNECTION_REQUESTS);

        let row_id = backend.add_connection_request("u_demo");
        let event = sub.recv().await.unwrap();

        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.record_id, Some(row_id));
    }
}
