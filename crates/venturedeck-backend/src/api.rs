//! Backend facade trait definitions
//!
//! These traits are the contract any backend (mock or real) must satisfy:
//! - `AuthApi`: sign-in/up/out, session lookup, auth change subscription
//! - `EntityApi`: CRUD over the ordered startup collection
//! - `ProfileApi`: the signed-in user's profile record
//! - `Analytics`, `Telemetry`: synchronous, infallible diagnostics
//! - `PendingCountSource`: per-user pending counts behind nav badges
//!
//! Async traits return `BackendResult` so real transports can fail; "not
//! found" is always `Ok(None)`, never an error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Fields, Record};
use crate::BackendResult;

// ---------------------------------------------------------------------------
// AuthApi
// ---------------------------------------------------------------------------

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub email_or_handle: String,
    pub issued_token: String,
    pub issued_at: DateTime<Utc>,
}

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Resolved value of `sign_in`/`sign_up`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: AuthUser,
    pub session: Session,
}

/// Resolved value of `get_session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: Option<Session>,
}

/// Auth state transitions a backend may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// Callback invoked on auth state transitions.
pub type AuthCallback = Box<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;

/// Handle returned by `on_auth_state_change`.
#[derive(Debug)]
pub struct AuthSubscription {
    id: u64,
}

impl AuthSubscription {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Detach the callback.
    pub fn unsubscribe(self) {
        tracing::debug!(subscription = self.id, "auth subscription dropped");
    }
}

/// Authentication surface.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthResponse>;

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthResponse>;

    async fn sign_out(&self) -> BackendResult<()>;

    /// Current session. Resolves without simulated latency.
    async fn get_session(&self) -> BackendResult<SessionResponse>;

    /// Register a callback for auth transitions.
    fn on_auth_state_change(&self, callback: AuthCallback) -> AuthSubscription;
}

// ---------------------------------------------------------------------------
// EntityApi
// ---------------------------------------------------------------------------

/// CRUD over the ordered startup collection.
///
/// Guarantees:
/// - `create` appends; `get_all` returns insertion order.
/// - `update` and `delete` act on the first record whose id matches.
/// - `update` never appends; a miss returns `None` and changes nothing.
#[async_trait]
pub trait EntityApi: Send + Sync {
    async fn get_all(&self) -> BackendResult<Vec<Record>>;

    async fn get_by_id(&self, id: &str) -> BackendResult<Option<Record>>;

    /// Assign a fresh id, append, and return the stored record.
    async fn create(&self, fields: Fields) -> BackendResult<Record>;

    /// Shallow-merge `patch` into the record with `id`.
    async fn update(&self, id: &str, patch: Fields) -> BackendResult<Option<Record>>;

    /// Remove the record with `id`; `true` if one was removed.
    async fn delete(&self, id: &str) -> BackendResult<bool>;
}

// ---------------------------------------------------------------------------
// ProfileApi
// ---------------------------------------------------------------------------

/// The signed-in user's profile record.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn get_current(&self) -> BackendResult<Record>;

    /// Shallow-merge `patch` into the profile and return it.
    async fn update_profile(&self, patch: Fields) -> BackendResult<Record>;
}

// ---------------------------------------------------------------------------
// Analytics / Telemetry
// ---------------------------------------------------------------------------

/// Product analytics. Calls never fail and never block.
pub trait Analytics: Send + Sync {
    fn track(&self, event: &str, properties: serde_json::Value);

    fn identify(&self, user_id: &str, traits: serde_json::Value);

    fn page(&self, name: &str, properties: serde_json::Value);
}

/// Severity for `capture_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

/// Error/message reporting. Calls never fail and never block.
pub trait Telemetry: Send + Sync {
    fn capture_exception(&self, error: &(dyn std::error::Error + 'static));

    fn capture_message(&self, message: &str, level: MessageLevel);
}

// ---------------------------------------------------------------------------
// PendingCountSource
// ---------------------------------------------------------------------------

/// Per-user pending counts shown on the innovator nav badge.
#[async_trait]
pub trait PendingCountSource: Send + Sync {
    async fn pending_connection_requests(&self, user_id: &str) -> BackendResult<u64>;

    async fn pending_team_invitations(&self, user_id: &str) -> BackendResult<u64>;
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Everything a page may call, as one object-safe bundle.
pub trait Backend:
    AuthApi + EntityApi + ProfileApi + Analytics + Telemetry + PendingCountSource
{
}

impl<T> Backend for T where
    T: AuthApi + EntityApi + ProfileApi + Analytics + Telemetry + PendingCountSource
{
}
