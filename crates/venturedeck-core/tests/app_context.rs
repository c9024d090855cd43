//! End-to-end flows through `AppContext` with file-backed role storage.

use std::sync::Arc;

use venturedeck_backend::EntityApi;
use venturedeck_core::*;

fn open_context(dir: &std::path::Path) -> AppContext {
    let kv = Arc::new(FsKvStore::new(dir).unwrap());
    let session = Arc::new(RoleSessionStore::with_default_key(kv));
    AppContext::new(
        session,
        Arc::new(MockBackend::new(BackendConfig::instant().with_seed(true))),
        ResolverConfig::default(),
    )
}

#[tokio::test]
async fn role_survives_restart_until_sign_out() {
    let dir = tempfile::tempdir().unwrap();

    let ctx = open_context(dir.path());
    assert_eq!(ctx.active_route().app, App::Onboarding);
    ctx.sign_in("demo@venturedeck.dev", "pw", Role::Innovator)
        .await
        .unwrap();

    let restarted = open_context(dir.path());
    assert_eq!(restarted.role(), Role::Innovator);
    assert_eq!(restarted.active_route().tree.base_path, "/innovator");

    restarted.sign_out().await.unwrap();
    assert_eq!(open_context(dir.path()).role(), Role::None);
}

#[tokio::test]
async fn role_subscribers_see_sign_in_synchronously() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = open_context(dir.path());
    let rx = ctx.session().subscribe();

    ctx.sign_up("new@venturedeck.dev", "pw", Role::Investor)
        .await
        .unwrap();
    assert_eq!(*rx.borrow(), Role::Investor);
}

#[tokio::test]
async fn investor_deck_over_seeded_startups() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = open_context(dir.path());
    ctx.select_role(Role::Investor).unwrap();
    assert_eq!(
        ctx.active_route().tree.find("/investor").unwrap().page,
        "SwipeDeck"
    );

    let startups = ctx.backend().get_all().await.unwrap();
    let first = startups[0].id.clone();
    let mut deck = SwipeDeck::new(startups);

    let _full_screen = ctx.open_full_screen();
    assert!(!ctx.nav().is_visible());

    let resolution = deck.accept_top().unwrap();
    assert_eq!(resolution.item.map(|r| r.id), Some(first));
    assert_eq!(deck.len(), 2);
}

#[tokio::test]
async fn pending_counter_from_context() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = open_context(dir.path());
    let counter = ctx.pending_counter("u_demo");
    assert_eq!(counter.recompute().await.unwrap(), 0);
}
