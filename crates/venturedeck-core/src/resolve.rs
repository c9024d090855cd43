//! Role-aware module resolution.
//!
//! Shared components import modules through an alias (`@/components/Card`).
//! For the active role, the resolver looks for a role-specific
//! implementation under `<apps_root>/apps/<app>/src` and returns it; when
//! none exists it returns `None`, deferring to default resolution of the
//! common implementation.
//!
//! Candidate order for a request `@/x/y`:
//! 1. `<base>/x/y` (exact file)
//! 2. `<base>/x/y<ext>` for each configured extension
//! 3. `<base>/x/y/index<ext>` for each configured extension
//!
//! A candidate equal to the importing module is skipped, so an override can
//! wrap its shared counterpart by importing the same alias.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use venturedeck_state::Role;

use crate::metrics::METRICS;
use crate::obs;
use crate::router::App;

/// Filesystem probe used by the resolver.
pub trait ModuleFs: Send + Sync {
    fn is_file(&self, path: &Path) -> bool;
}

impl<T: ModuleFs + ?Sized> ModuleFs for &T {
    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }
}

/// Probes the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdModuleFs;

impl ModuleFs for StdModuleFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory file set (testing).
#[derive(Debug, Default, Clone)]
pub struct MemoryModuleFs {
    files: HashSet<PathBuf>,
}

impl MemoryModuleFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(path.into());
    }
}

impl ModuleFs for MemoryModuleFs {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }
}

/// Resolver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Directory containing `apps/<app>/src` trees (default: ".")
    pub apps_root: PathBuf,
    /// Import prefix that triggers role-aware lookup (default: "@/")
    pub alias_prefix: String,
    /// Extensions tried in order (default: .ts, .tsx, .js, .jsx)
    pub extensions: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            apps_root: PathBuf::from("."),
            alias_prefix: "@/".to_string(),
            extensions: [".ts", ".tsx", ".js", ".jsx"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ResolverConfig {
    pub fn with_apps_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.apps_root = root.into();
        self
    }

    pub fn with_alias_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.alias_prefix = prefix.into();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - VENTUREDECK_APPS_ROOT (optional, default: ".")
    /// - VENTUREDECK_ALIAS_PREFIX (optional, default: "@/")
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(root) = std::env::var("VENTUREDECK_APPS_ROOT") {
            if !root.is_empty() {
                config.apps_root = PathBuf::from(root);
            }
        }
        if let Ok(prefix) = std::env::var("VENTUREDECK_ALIAS_PREFIX") {
            if !prefix.is_empty() {
                config.alias_prefix = prefix;
            }
        }
        config
    }

    /// `<apps_root>/apps/<app>/src`
    pub fn resolution_base(&self, app: App) -> PathBuf {
        self.apps_root.join("apps").join(app.as_str()).join("src")
    }
}

/// Resolves alias imports to role-specific files.
#[derive(Debug, Clone)]
pub struct ModuleResolver<F = StdModuleFs> {
    fs: F,
    config: ResolverConfig,
}

impl<F: ModuleFs> ModuleResolver<F> {
    pub fn new(fs: F, config: ResolverConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `requested` (imported from `importing_module`) for `role`.
    ///
    /// Returns `None` for non-alias requests, requests escaping the base
    /// with `..`, and when no role-specific candidate exists.
    pub fn resolve(
        &self,
        role: Role,
        importing_module: &Path,
        requested: &str,
    ) -> Option<PathBuf> {
        let relative = requested.strip_prefix(self.config.alias_prefix.as_str())?;
        let relative = Path::new(relative.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.as_os_str().is_empty() || escapes {
            return None;
        }

        let app = App::from(role);
        let target = self.config.resolution_base(app).join(relative);
        let found = self
            .candidates(&target)
            .into_iter()
            .filter(|candidate| candidate.as_path() != importing_module)
            .find(|candidate| self.fs.is_file(candidate))?;

        METRICS.inc_modules_resolved();
        obs::emit_module_resolved(app.as_str(), requested, &found);
        Some(found)
    }

    fn candidates(&self, target: &Path) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(1 + self.config.extensions.len() * 2);
        candidates.push(target.to_path_buf());
        for ext in &self.config.extensions {
            let mut with_ext = target.as_os_str().to_os_string();
            with_ext.push(ext);
            candidates.push(PathBuf::from(with_ext));
        }
        for ext in &self.config.extensions {
            candidates.push(target.join(format!("index{ext}")));
        }
        candidates
    }
}
