//! Legacy view bridge server.
//!
//! Serves a small set of demo actions written in the legacy style, showing
//! each result convention the bridge understands.
//!
//! # Architecture Overview
//!
//! ```text
//!  Client ──▶ axum ──▶ request context ──▶ route table ──▶ legacy action
//!                                                              │
//!                                                              ▼
//!  Client ◀── response ◀── materializer ◀── resolver ◀── override slot
//!                 ▲                            │
//!                 └── forward: renderer / re-dispatch
//! ```

use std::path::PathBuf;

use axum::{http::StatusCode, response::IntoResponse, Json};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use legacy_view_bridge::config::loader::load_config;
use legacy_view_bridge::config::watcher::ConfigWatcher;
use legacy_view_bridge::http::PathParams;
use legacy_view_bridge::lifecycle::signals::trigger_on_ctrl_c;
use legacy_view_bridge::observability::{logging, metrics};
use legacy_view_bridge::{ActionRegistry, BridgeConfig, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "view-bridge")]
#[command(about = "Serve legacy MVC actions with legacy view resolution", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload routes and view conventions when the config file changes.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("view-bridge v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        view_root = %config.view.view_root,
        external_routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            (Some(watcher.run()?), updates)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, demo_actions())?;
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move { trigger_on_ctrl_c(&signal_shutdown).await });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn demo_actions() -> ActionRegistry {
    const USER_ACTION: &str = "com.example.action.userAction";
    const HOME_ACTION: &str = "com.example.action.HomeAction";

    ActionRegistry::new()
        // Forward to the `/user` action.
        .get("/", HOME_ACTION, |_ctx, _req| async { "/user/" })
        .get("/home/indexBack", HOME_ACTION, |_ctx, _req| async { "/home/indexBack" })
        .get("/docs", HOME_ACTION, |_ctx, _req| async {
            "https://docs.example.com/?redirect=true"
        })
        // Bare names resolve under /WEB-INF/view/user/.
        .get("/user", USER_ACTION, |_ctx, _req| async { "list.jsp" })
        .get("/user/export", USER_ACTION, |_ctx, _req| async {
            Json(serde_json::json!({ "users": [] })).into_response()
        })
        .get("/user/{id}", USER_ACTION, |_ctx, req| async move {
            let id = req
                .extensions()
                .get::<PathParams>()
                .and_then(|p| p.get("id"))
                .map(str::to_string);
            id.map(|_| "detail.jsp".to_string())
        })
        // Saving answers 204 no matter what view the action names.
        .post("/user/save", USER_ACTION, |ctx, _req| async move {
            ctx.set_forced(StatusCode::NO_CONTENT.into_response());
            "list.jsp"
        })
}
