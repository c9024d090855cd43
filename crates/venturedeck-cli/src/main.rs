//! VentureDeck CLI
//!
//! The `vdeck` command drives the client core from a terminal.
//!
//! ## Commands
//!
//! - `role`: Show, set or clear the persisted role
//! - `routes`: Print the route tree for the persisted role
//! - `resolve`: Run the role-aware module resolver
//! - `startups`: CRUD against a seeded in-process mock backend
//! - `swipe`: Replay a pointer path through the investor deck
//! - `pending`: Demonstrate the pending-request badge counter

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, Level};

use venturedeck_backend::seed::DEMO_USER_ID;
use venturedeck_backend::{EntityApi, CONNECTION_REQUESTS, TEAM_INVITATIONS};
use venturedeck_core::metrics::METRICS;
use venturedeck_core::telemetry::init_tracing;
use venturedeck_core::{
    default_trees, BackendConfig, Fields, FsKvStore, MockBackend, ModuleResolver,
    PendingRequestCounter, PointerEvent, Record, ResolverConfig, Role, RoleRouter,
    RoleSessionStore, StateConfig, StdModuleFs, SwipeDeck, SwipeDecision, SwipeResolution,
};

#[derive(Parser)]
#[command(name = "vdeck")]
#[command(author = "VentureDeck Engineering")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "VentureDeck client core driver", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding persisted client state (default: .venturedeck)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show, set or clear the persisted role
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },

    /// Print the route tree selected by the persisted role
    Routes,

    /// Resolve an alias import for a role
    Resolve {
        /// Requested module, e.g. "@/components/Nav"
        request: String,

        /// Path of the importing module
        #[arg(long)]
        from: PathBuf,

        /// Directory containing apps/<app>/src (default: VENTUREDECK_APPS_ROOT or ".")
        #[arg(long)]
        apps_root: Option<PathBuf>,

        /// Role to resolve for (default: the persisted role)
        #[arg(long)]
        role: Option<Role>,
    },

    /// CRUD over the demo startups (not persisted across runs)
    Startups {
        #[command(subcommand)]
        action: StartupAction,
    },

    /// Replay a pointer path through the investor swipe deck
    Swipe {
        /// Space-separated "x,y" samples; first is pointer-down, last is pointer-up
        #[arg(long, allow_hyphen_values = true)]
        path: String,
    },

    /// Feed pending requests through the mock change feeds and print the badge count
    Pending {
        /// Connection requests to add
        #[arg(long, default_value = "0")]
        connections: u64,

        /// Team invitations to add
        #[arg(long, default_value = "0")]
        invitations: u64,
    },
}

#[derive(Subcommand)]
enum RoleAction {
    /// Print the persisted role
    Show,
    /// Persist a role (creator, innovator, investor or none)
    Set { role: Role },
    /// Remove the persisted role
    Clear,
}

#[derive(Subcommand)]
enum StartupAction {
    /// List all startups in insertion order
    List,
    /// Show one startup
    Get { id: String },
    /// Create a startup from key=value fields
    Create {
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Shallow-merge key=value fields into a startup
    Update {
        id: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Delete a startup
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    init_tracing(cli.json, level);

    let mut state = StateConfig::from_env();
    if let Some(dir) = cli.state_dir {
        state = state.with_state_dir(dir);
    }

    let result = match cli.command {
        Commands::Role { action } => cmd_role(&state, action),
        Commands::Routes => cmd_routes(&state),
        Commands::Resolve {
            request,
            from,
            apps_root,
            role,
        } => cmd_resolve(&state, &request, &from, apps_root, role),
        Commands::Startups { action } => cmd_startups(action).await,
        Commands::Swipe { path } => cmd_swipe(&path).await,
        Commands::Pending {
            connections,
            invitations,
        } => cmd_pending(connections, invitations).await,
    };

    METRICS.flush();
    result
}

fn open_session(state: &StateConfig) -> Result<RoleSessionStore> {
    let kv = FsKvStore::new(&state.state_dir)
        .with_context(|| format!("Failed to open state dir {:?}", state.state_dir))?;
    Ok(RoleSessionStore::open(Arc::new(kv), &state.role_key))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// role / routes / resolve
// ---------------------------------------------------------------------------

fn cmd_role(state: &StateConfig, action: RoleAction) -> Result<()> {
    let session = open_session(state)?;
    match action {
        RoleAction::Show => {}
        RoleAction::Set { role } => session
            .set_role(Some(role))
            .context("Failed to persist role")?,
        RoleAction::Clear => session.reset().context("Failed to clear role")?,
    }
    println!("{}", session.role());
    Ok(())
}

fn cmd_routes(state: &StateConfig) -> Result<()> {
    let session = Arc::new(open_session(state)?);
    let router = RoleRouter::new(session, default_trees(), ResolverConfig::from_env());
    let active = router.active();
    let tree = active.tree;

    println!("role: {}", active.role);
    println!("app:  {} ({})", active.app, tree.base_path);
    println!("src:  {}", active.resolution_base.display());
    for route in &tree.routes {
        println!("  {:<28} {}", route.path, route.page);
    }
    Ok(())
}

fn cmd_resolve(
    state: &StateConfig,
    request: &str,
    from: &Path,
    apps_root: Option<PathBuf>,
    role: Option<Role>,
) -> Result<()> {
    let role = match role {
        Some(role) => role,
        None => open_session(state)?.role(),
    };
    let mut config = ResolverConfig::from_env();
    if let Some(root) = apps_root {
        config = config.with_apps_root(root);
    }

    let resolver = ModuleResolver::new(StdModuleFs, config);
    match resolver.resolve(role, from, request) {
        Some(path) => println!("{}", path.display()),
        None => println!("(default resolution)"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// startups
// ---------------------------------------------------------------------------

/// Parse `key=value` pairs. Values that parse as JSON keep their type;
/// anything else is a string.
fn parse_fields(pairs: &[String]) -> Result<Fields> {
    let mut fields = Fields::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("Expected key=value, got '{pair}'");
        };
        if key.is_empty() {
            bail!("Empty key in '{pair}'");
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

fn demo_backend() -> Result<MockBackend> {
    let config = BackendConfig::from_env()
        .context("Invalid backend configuration")?
        .with_seed(true);
    Ok(MockBackend::new(config))
}

async fn cmd_startups(action: StartupAction) -> Result<()> {
    let backend = demo_backend()?;
    match action {
        StartupAction::List => print_json(&backend.get_all().await?),
        StartupAction::Get { id } => match backend.get_by_id(&id).await? {
            Some(record) => print_json(&record),
            None => bail!("No startup with id '{id}'"),
        },
        StartupAction::Create { fields } => {
            let record = backend.create(parse_fields(&fields)?).await?;
            info!(id = %record.id, "startup created");
            print_json(&record)
        }
        StartupAction::Update { id, fields } => {
            match backend.update(&id, parse_fields(&fields)?).await? {
                Some(record) => print_json(&record),
                None => bail!("No startup with id '{id}'"),
            }
        }
        StartupAction::Delete { id } => {
            if !backend.delete(&id).await? {
                bail!("No startup with id '{id}'");
            }
            println!("deleted {id}");
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// swipe
// ---------------------------------------------------------------------------

fn parse_path(path: &str) -> Result<Vec<(f64, f64)>> {
    let points = path
        .split_whitespace()
        .map(|sample| {
            let (x, y) = sample
                .split_once(',')
                .with_context(|| format!("Expected x,y sample, got '{sample}'"))?;
            let x: f64 = x.trim().parse().with_context(|| format!("Bad x in '{sample}'"))?;
            let y: f64 = y.trim().parse().with_context(|| format!("Bad y in '{sample}'"))?;
            Ok((x, y))
        })
        .collect::<Result<Vec<_>>>()?;
    if points.is_empty() {
        bail!("Pointer path needs at least one sample");
    }
    Ok(points)
}

/// Replay `points` on the top card. `None` means the gesture was a tap.
fn replay(
    deck: &mut SwipeDeck<Record>,
    points: &[(f64, f64)],
) -> Option<SwipeResolution<Record>> {
    const POINTER: u32 = 1;
    let (&(x0, y0), rest) = points.split_first()?;
    deck.pointer_down(0, PointerEvent::new(POINTER, x0, y0));
    for &(x, y) in rest {
        deck.pointer_move(PointerEvent::new(POINTER, x, y));
    }
    let &(x, y) = points.last()?;
    deck.pointer_up(PointerEvent::new(POINTER, x, y))
}

async fn cmd_swipe(path: &str) -> Result<()> {
    let points = parse_path(path)?;
    let backend = demo_backend()?;
    let mut deck = SwipeDeck::new(backend.get_all().await?);

    let Some(resolution) = replay(&mut deck, &points) else {
        println!("tap (no swipe)");
        return Ok(());
    };
    let title = resolution
        .item
        .as_ref()
        .and_then(|r| r.get_str("title"))
        .unwrap_or("-");
    match resolution.decision {
        SwipeDecision::SnapBack => println!(
            "snap_back dx={} dy={} (top card stays)",
            resolution.dx, resolution.dy
        ),
        decision => println!(
            "{} {title} dx={} dy={}",
            decision.as_str(),
            resolution.dx,
            resolution.dy
        ),
    }
    if let Some(next) = deck.top().and_then(|r| r.get_str("title")) {
        println!("next: {next}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// pending
// ---------------------------------------------------------------------------

async fn cmd_pending(connections: u64, invitations: u64) -> Result<()> {
    let total = pending_total(connections, invitations).await?;
    println!("pending: {total}");
    Ok(())
}

async fn pending_total(connections: u64, invitations: u64) -> Result<u64> {
    let backend = Arc::new(MockBackend::new(BackendConfig::instant()));
    let counter = Arc::new(PendingRequestCounter::new(
        Arc::clone(&backend),
        DEMO_USER_ID,
    ));
    let feed = backend.feed();
    let task = counter.spawn(&*feed);

    for _ in 0..connections {
        backend.add_connection_request(DEMO_USER_ID);
    }
    for _ in 0..invitations {
        backend.add_team_invitation(DEMO_USER_ID);
    }

    let expected = connections + invitations;
    let mut rx = counter.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|total| *total == expected))
        .await
        .context("Timed out waiting for pending count")?
        .context("Pending counter stopped")?;

    feed.close(CONNECTION_REQUESTS);
    feed.close(TEAM_INVITATIONS);
    task.await.context("Pending counter task failed")?;
    Ok(counter.current())
}
