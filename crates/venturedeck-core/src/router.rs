//! Role router: picks the route tree and module-resolution base for the
//! active role.
//!
//! Each role owns one of four disjoint route trees. `Role::None` (nobody
//! has picked a role yet) maps to the onboarding tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use venturedeck_state::{Role, RoleSessionStore};

use crate::error::{CoreError, CoreResult};
use crate::obs;
use crate::resolve::{ModuleFs, ModuleResolver, ResolverConfig};

/// Front-end application a role is routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum App {
    Creator,
    Innovator,
    Investor,
    Onboarding,
}

impl App {
    pub const ALL: [App; 4] = [App::Creator, App::Innovator, App::Investor, App::Onboarding];

    /// Directory name under `apps/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            App::Creator => "creator",
            App::Innovator => "innovator",
            App::Investor => "investor",
            App::Onboarding => "onboarding",
        }
    }
}

impl From<Role> for App {
    fn from(role: Role) -> Self {
        match role {
            Role::Creator => App::Creator,
            Role::Innovator => App::Innovator,
            Role::Investor => App::Investor,
            Role::None => App::Onboarding,
        }
    }
}

impl std::fmt::Display for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One route: a path pattern (`:param` segments allowed) and the page it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub path: String,
    pub page: String,
}

impl RouteEntry {
    pub fn new(path: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            page: page.into(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        let pattern: Vec<&str> = segments(&self.path).collect();
        let actual: Vec<&str> = segments(path).collect();
        pattern.len() == actual.len()
            && pattern
                .iter()
                .zip(&actual)
                .all(|(p, a)| p.starts_with(':') || p == a)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Route table of one app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTree {
    pub app: App,
    pub base_path: String,
    pub routes: Vec<RouteEntry>,
}

impl RouteTree {
    pub fn new(app: App, base_path: impl Into<String>, routes: Vec<RouteEntry>) -> Self {
        Self {
            app,
            base_path: base_path.into(),
            routes,
        }
    }

    /// First route whose pattern matches `path`.
    pub fn find(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.iter().find(|r| r.matches(path))
    }
}

/// Exactly one route tree per [`App`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTrees {
    trees: [RouteTree; 4],
}

impl RouteTrees {
    /// Assemble the four trees.
    ///
    /// Fails unless every app appears exactly once and no two trees share a
    /// base path.
    pub fn new(trees: Vec<RouteTree>) -> CoreResult<Self> {
        let mut slots: [Option<RouteTree>; 4] = Default::default();
        for tree in trees {
            let slot = &mut slots[app_index(tree.app)];
            if slot.is_some() {
                return Err(CoreError::InvalidRouteTrees(format!(
                    "duplicate tree for {}",
                    tree.app
                )));
            }
            *slot = Some(tree);
        }

        let [creator, innovator, investor, onboarding] = slots;
        let missing = |app: App| CoreError::InvalidRouteTrees(format!("missing tree for {app}"));
        let trees = [
            creator.ok_or_else(|| missing(App::Creator))?,
            innovator.ok_or_else(|| missing(App::Innovator))?,
            investor.ok_or_else(|| missing(App::Investor))?,
            onboarding.ok_or_else(|| missing(App::Onboarding))?,
        ];

        for (i, a) in trees.iter().enumerate() {
            if let Some(b) = trees[i + 1..].iter().find(|b| b.base_path == a.base_path) {
                return Err(CoreError::InvalidRouteTrees(format!(
                    "{} and {} share base path {}",
                    a.app, b.app, a.base_path
                )));
            }
        }

        Ok(Self { trees })
    }

    pub fn get(&self, app: App) -> &RouteTree {
        &self.trees[app_index(app)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteTree> {
        self.trees.iter()
    }
}

fn app_index(app: App) -> usize {
    match app {
        App::Creator => 0,
        App::Innovator => 1,
        App::Investor => 2,
        App::Onboarding => 3,
    }
}

/// Route structure of the four front-ends.
pub fn default_trees() -> RouteTrees {
    let tree = |app: App, base: &str, routes: &[(&str, &str)]| {
        RouteTree::new(
            app,
            base,
            routes
                .iter()
                .map(|(path, page)| RouteEntry::new(*path, *page))
                .collect(),
        )
    };
    RouteTrees {
        trees: [
            tree(
                App::Creator,
                "/creator",
                &[
                    ("/creator", "CreatorDashboard"),
                    ("/creator/projects", "ProjectList"),
                    ("/creator/projects/new", "ProjectEditor"),
                    ("/creator/projects/:id", "ProjectDetail"),
                    ("/creator/profile", "Profile"),
                ],
            ),
            tree(
                App::Innovator,
                "/innovator",
                &[
                    ("/innovator", "InnovatorDashboard"),
                    ("/innovator/startups", "StartupList"),
                    ("/innovator/startups/:id", "StartupDetail"),
                    ("/innovator/requests", "PendingRequests"),
                    ("/innovator/team", "Team"),
                    ("/innovator/profile", "Profile"),
                ],
            ),
            tree(
                App::Investor,
                "/investor",
                &[
                    ("/investor", "SwipeDeck"),
                    ("/investor/portfolio", "Portfolio"),
                    ("/investor/startups/:id", "StartupDetail"),
                    ("/investor/profile", "Profile"),
                ],
            ),
            tree(
                App::Onboarding,
                "/",
                &[
                    ("/", "Welcome"),
                    ("/sign-in", "SignIn"),
                    ("/sign-up", "SignUp"),
                    ("/choose-role", "RoleSelect"),
                ],
            ),
        ],
    }
}

/// Route decision for the current role.
#[derive(Debug, Clone)]
pub struct ActiveRoute<'a> {
    pub role: Role,
    pub app: App,
    pub tree: &'a RouteTree,
    /// `<apps_root>/apps/<app>/src`
    pub resolution_base: PathBuf,
}

/// Composes the role session with the per-app route trees.
pub struct RoleRouter {
    session: Arc<RoleSessionStore>,
    trees: RouteTrees,
    resolver: ResolverConfig,
}

impl RoleRouter {
    pub fn new(
        session: Arc<RoleSessionStore>,
        trees: RouteTrees,
        resolver: ResolverConfig,
    ) -> Self {
        Self {
            session,
            trees,
            resolver,
        }
    }

    /// Read the session and select the active tree.
    pub fn active(&self) -> ActiveRoute<'_> {
        let role = self.session.role();
        let app = App::from(role);
        obs::emit_route_tree_selected(role.as_str(), app.as_str());
        ActiveRoute {
            role,
            app,
            tree: self.trees.get(app),
            resolution_base: self.resolver.resolution_base(app),
        }
    }

    /// Module-resolution base for the active role.
    pub fn resolution_base(&self) -> PathBuf {
        self.resolver.resolution_base(App::from(self.session.role()))
    }

    /// Resolve an alias import for the active role.
    pub fn resolve<F: ModuleFs>(
        &self,
        fs: F,
        importing_module: &Path,
        requested: &str,
    ) -> Option<PathBuf> {
        ModuleResolver::new(fs, self.resolver.clone()).resolve(
            self.session.role(),
            importing_module,
            requested,
        )
    }

    pub fn trees(&self) -> &RouteTrees {
        &self.trees
    }

    pub fn resolver_config(&self) -> &ResolverConfig {
        &self.resolver
    }
}

impl std::fmt::Debug for RoleRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleRouter")
            .field("role", &self.session.role())
            .field("resolver", &self.resolver)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venturedeck_state::fakes::MemoryKvStore;

    fn router() -> RoleRouter {
        let session = Arc::new(RoleSessionStore::with_default_key(Arc::new(
            MemoryKvStore::new(),
        )));
        RoleRouter::new(
            session,
            default_trees(),
            ResolverConfig::default().with_apps_root("/repo"),
        )
    }

    #[test]
    fn test_role_to_app_mapping() {
        assert_eq!(App::from(Role::Creator), App::Creator);
        assert_eq!(App::from(Role::None), App::Onboarding);
    }

    #[test]
    fn test_default_trees_are_valid() {
        let trees: Vec<RouteTree> = default_trees().iter().cloned().collect();
        assert!(RouteTrees::new(trees).is_ok());
    }

    #[test]
    fn test_route_trees_reject_duplicates_and_gaps() {
        let mut trees: Vec<RouteTree> = default_trees().iter().cloned().collect();
        trees.pop();
        let err = RouteTrees::new(trees.clone()).unwrap_err();
        assert!(err.to_string().contains("missing tree for onboarding"));

        trees.push(trees[0].clone());
        let err = RouteTrees::new(trees).unwrap_err();
        assert!(err.to_string().contains("duplicate tree for creator"));
    }

    #[test]
    fn test_route_trees_reject_shared_base() {
        let mut trees: Vec<RouteTree> = default_trees().iter().cloned().collect();
        trees[1].base_path = "/creator".to_string();
        assert!(RouteTrees::new(trees).is_err());
    }

    #[test]
    fn test_route_pattern_matching() {
        let trees = default_trees();
        let investor = trees.get(App::Investor);
        assert_eq!(investor.find("/investor/startups/s_1").unwrap().page, "StartupDetail");
        assert_eq!(investor.find("/investor/").unwrap().page, "SwipeDeck");
        assert!(investor.find("/creator").is_none());
    }

    #[test]
    fn test_active_follows_session() {
        let router = router();
        assert_eq!(router.active().app, App::Onboarding);

        router.session.set_role(Some(Role::Investor)).unwrap();
        let active = router.active();
        assert_eq!(active.app, App::Investor);
        assert_eq!(active.tree.base_path, "/investor");
        assert_eq!(active.resolution_base, PathBuf::from("/repo/apps/investor/src"));
        assert_eq!(router.resolution_base(), PathBuf::from("/repo/apps/investor/src"));
    }
}
