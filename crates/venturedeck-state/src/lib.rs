//! VentureDeck-State: client-side session and chrome state
//!
//! This crate holds the small state containers every VentureDeck front-end
//! reads on each route decision and render.
//!
//! ## Key Components
//!
//! - `Role`: the active user role (creator, innovator, investor, none)
//! - `RoleSessionStore`: the active role, mirrored to durable storage
//! - `NavigationVisibility`: whether the bottom navigation chrome is shown
//! - `KvStore`: durable key-value seam (`FsKvStore` on disk, `MemoryKvStore` in tests)

mod config;
mod error;
pub mod fakes;
pub mod kv;
pub mod nav;
mod role;
pub mod session;

pub use config::StateConfig;
pub use error::StateError;
pub use kv::{FsKvStore, KvStore};
pub use nav::{HideGuard, NavigationVisibility};
pub use role::Role;
pub use session::{RoleSessionStore, DEFAULT_ROLE_KEY};

/// Result type for venturedeck-state operations
pub type StateResult<T> = std::result::Result<T, StateError>;
