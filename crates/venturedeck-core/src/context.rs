//! Application context handed to every page.
//!
//! Bundles the role session, nav visibility, backend facade and router so
//! pages receive their dependencies explicitly at construction.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use venturedeck_backend::{Analytics, AuthApi, AuthResponse, Backend, Session};
use venturedeck_state::{HideGuard, NavigationVisibility, Role, RoleSessionStore};

use crate::error::CoreResult;
use crate::obs;
use crate::pending::PendingRequestCounter;
use crate::resolve::ResolverConfig;
use crate::router::{default_trees, ActiveRoute, RoleRouter, RouteTrees};

/// Shared dependencies of the front-end pages. Cheap to share behind `Arc`.
pub struct AppContext {
    session: Arc<RoleSessionStore>,
    nav: NavigationVisibility,
    backend: Arc<dyn Backend>,
    router: RoleRouter,
}

impl AppContext {
    /// Context over the default route trees.
    pub fn new(
        session: Arc<RoleSessionStore>,
        backend: Arc<dyn Backend>,
        resolver: ResolverConfig,
    ) -> Self {
        Self::with_trees(session, backend, default_trees(), resolver)
    }

    pub fn with_trees(
        session: Arc<RoleSessionStore>,
        backend: Arc<dyn Backend>,
        trees: RouteTrees,
        resolver: ResolverConfig,
    ) -> Self {
        let router = RoleRouter::new(Arc::clone(&session), trees, resolver);
        Self {
            session,
            nav: NavigationVisibility::new(),
            backend,
            router,
        }
    }

    pub fn session(&self) -> &RoleSessionStore {
        &self.session
    }

    pub fn nav(&self) -> &NavigationVisibility {
        &self.nav
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn router(&self) -> &RoleRouter {
        &self.router
    }

    pub fn role(&self) -> Role {
        self.session.role()
    }

    pub fn active_route(&self) -> ActiveRoute<'_> {
        self.router.active()
    }

    /// Sign in, adopt `role`, and identify the user to analytics.
    pub async fn sign_in(&self, email: &str, password: &str, role: Role) -> CoreResult<Session> {
        let response = self.backend.sign_in(email, password).await?;
        self.establish(response, role, "sign_in")
    }

    /// Same as [`sign_in`](Self::sign_in) against the sign-up endpoint.
    pub async fn sign_up(&self, email: &str, password: &str, role: Role) -> CoreResult<Session> {
        let response = self.backend.sign_up(email, password).await?;
        self.establish(response, role, "sign_up")
    }

    fn establish(&self, response: AuthResponse, role: Role, method: &str) -> CoreResult<Session> {
        let span = obs::session_span(&response.user.id);
        span.in_scope(|| -> CoreResult<Session> {
            self.session.set_role(Some(role))?;
            self.backend.identify(
                &response.user.id,
                json!({ "email": response.user.email, "role": role.as_str() }),
            );
            info!(event = "session.established", method = %method, role = %role);
            Ok(response.session)
        })
    }

    /// Role selection after sign-up; `Role::None` clears it.
    pub fn select_role(&self, role: Role) -> CoreResult<()> {
        self.session.set_role(Some(role))?;
        Ok(())
    }

    /// Sign out, clear the role and restore the nav.
    pub async fn sign_out(&self) -> CoreResult<()> {
        self.backend.sign_out().await?;
        self.session.reset()?;
        self.nav.show();
        info!(event = "session.ended");
        Ok(())
    }

    /// Hide the nav for a full-bleed page; it returns when the guard drops.
    pub fn open_full_screen(&self) -> HideGuard {
        self.nav.hide_scoped()
    }

    /// Pending badge counter for `user_id` over this context's backend.
    pub fn pending_counter(&self, user_id: &str) -> PendingRequestCounter<dyn Backend> {
        PendingRequestCounter::new(Arc::clone(&self.backend), user_id)
    }

    pub fn track_page(&self, name: &str) {
        self.backend.page(name, json!({ "role": self.role().as_str() }));
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("role", &self.session.role())
            .field("nav", &self.nav)
            .field("router", &self.router)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venturedeck_backend::{BackendConfig, MockBackend};
    use venturedeck_state::fakes::MemoryKvStore;

    use crate::router::App;

    fn context() -> AppContext {
        let session = Arc::new(RoleSessionStore::with_default_key(Arc::new(
            MemoryKvStore::new(),
        )));
        AppContext::new(
            session,
            Arc::new(MockBackend::new(BackendConfig::instant())),
            ResolverConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_sign_in_sets_role() {
        let ctx = context();
        let session = ctx
            .sign_in("demo@venturedeck.dev", "pw", Role::Creator)
            .await
            .unwrap();
        assert!(!session.user_id.is_empty());
        assert_eq!(ctx.role(), Role::Creator);
        assert_eq!(ctx.active_route().app, App::Creator);
    }

    #[tokio::test]
    async fn test_sign_out_clears_role_and_shows_nav() {
        let ctx = context();
        ctx.sign_in("a@b.c", "pw", Role::Investor).await.unwrap();
        ctx.nav().hide();

        ctx.sign_out().await.unwrap();
        assert_eq!(ctx.role(), Role::None);
        assert!(ctx.nav().is_visible());
        assert_eq!(ctx.active_route().app, App::Onboarding);
    }

    #[test]
    fn test_full_screen_guard_restores_nav() {
        let ctx = context();
        {
            let _guard = ctx.open_full_screen();
            assert!(!ctx.nav().is_visible());
        }
        assert!(ctx.nav().is_visible());
    }
}
