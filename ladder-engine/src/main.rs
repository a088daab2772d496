//! ladder-engine - competitive-ladder rating and pairing service
//!
//! Startup sequence: tracing, build banner, configuration resolution,
//! database initialization, pending-report sweeper, HTTP server.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use ladder_common::config::{default_data_dir, LadderConfig};
use ladder_common::db::init_database;
use ladder_engine::roles::LoggingRoleSync;
use ladder_engine::sweep::ReportSweeper;
use ladder_engine::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "ladder-engine", about = "Competitive-ladder rating and pairing engine")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "LADDER_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory holding ladder.db
    #[arg(long, env = "LADDER_DATA")]
    data_dir: Option<PathBuf>,

    /// Bind address override (takes precedence over the config file)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting ladder-engine v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config = LadderConfig::load(args.config.as_deref())?;
    info!(
        "Configuration: baseline {}, K {}, report TTL {} min, {} tiers",
        config.rating.baseline,
        config.rating.k_factor,
        config.reports.ttl_minutes,
        config.tiers.len()
    );

    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    let db_path = data_dir.join("ladder.db");
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    // Periodic purge of expired pending reports; expiry is advisory, reads
    // already treat stale rows as absent.
    let sweeper = ReportSweeper::new(pool.clone(), &config).spawn();

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let state = AppState::new(pool, Arc::new(config), Arc::new(LoggingRoleSync));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("ladder-engine listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app).await?;

    sweeper.shutdown().await;

    Ok(())
}
