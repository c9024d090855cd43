//! VentureDeck Core Library
//!
//! Interaction and routing logic shared by the creator, innovator, investor
//! and onboarding front-ends, plus re-exports of the state and backend
//! crates for programmatic access.

pub mod context;
pub mod deck;
mod error;
pub mod gesture;
pub mod metrics;
pub mod obs;
pub mod pending;
pub mod resolve;
pub mod router;
pub mod telemetry;

pub use context::AppContext;
pub use deck::{SwipeDecision, SwipeDeck, SwipeResolution, SwipeThresholds};
pub use error::{CoreError, CoreResult};
pub use gesture::{
    CardTransform, GestureEffect, GestureOutcome, GesturePhase, GestureState, PointerEvent,
    SwipeGestureController, DRAG_THRESHOLD_PX, ROTATION_DIVISOR,
};
pub use pending::PendingRequestCounter;
pub use resolve::{MemoryModuleFs, ModuleFs, ModuleResolver, ResolverConfig, StdModuleFs};
pub use router::{default_trees, ActiveRoute, App, RoleRouter, RouteEntry, RouteTree, RouteTrees};

pub use venturedeck_backend::{
    into_fields, Backend, BackendConfig, BackendError, Fields, MockBackend, Record, Session,
};
pub use venturedeck_state::{
    FsKvStore, KvStore, NavigationVisibility, Role, RoleSessionStore, StateConfig, StateError,
};
