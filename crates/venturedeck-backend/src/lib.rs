//! VentureDeck-Backend: backend facade contract and mock implementation
//!
//! The front-ends are written against an async facade so UI code never
//! cares whether a real server is behind it. This crate defines that facade
//! as a set of traits and ships `MockBackend`, an in-memory stand-in with
//! simulated latency.
//!
//! ## Key Components
//!
//! - `AuthApi`, `EntityApi`, `ProfileApi`: async request/response surfaces
//! - `Analytics`, `Telemetry`: fire-and-forget diagnostics
//! - `PendingCountSource` + `ChangeFeed`: inputs to derived nav badge counts
//! - `MockBackend`: in-memory implementation of all of the above
//! - `Record`: startup-like entity with an id and free-form JSON fields

pub mod api;
mod config;
mod error;
pub mod feed;
mod ids;
pub mod mock;
mod record;
pub mod seed;

pub use api::{
    Analytics, AuthApi, AuthCallback, AuthEvent, AuthResponse, AuthSubscription, AuthUser,
    Backend, EntityApi, MessageLevel, PendingCountSource, ProfileApi, Session, SessionResponse,
    Telemetry,
};
pub use config::BackendConfig;
pub use error::BackendError;
pub use feed::{
    ChangeEvent, ChangeFeed, ChangeKind, FeedSubscription, MemoryChangeFeed, CONNECTION_REQUESTS,
    TEAM_INVITATIONS,
};
pub use ids::{IdGenerator, IdStrategy};
pub use mock::MockBackend;
pub use record::{into_fields, Fields, Record};

/// Result type for backend facade operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;
