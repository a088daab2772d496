//! ladder-engine library - competitive-ladder rating and pairing engine
//!
//! Maintains durable per-player ratings, reconciles self-reported match
//! results through a two-party confirmation protocol, generates tiered
//! round-robin season pairings, and answers stats/leaderboard/pairing
//! queries. The HTTP layer in [`api`] is a thin boundary adapter; any
//! command dispatcher with the same shape can drive the engine.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;

use ladder_common::config::LadderConfig;

pub mod api;
pub mod pairing;
pub mod query;
pub mod rating;
pub mod reconcile;
pub mod roles;
pub mod season;
pub mod store;
pub mod sweep;

#[cfg(test)]
mod pairing_tests;

use roles::RoleSynchronizer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Injected engine configuration
    pub config: Arc<LadderConfig>,
    /// Tier-role synchronization collaborator
    pub roles: Arc<dyn RoleSynchronizer>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: Arc<LadderConfig>, roles: Arc<dyn RoleSynchronizer>) -> Self {
        Self { db, config, roles }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/players", post(api::register))
        .route("/api/players/:id/signup", post(api::signup))
        .route("/api/players/:id/stats", get(api::player_stats))
        .route("/api/reports", post(api::report))
        .route("/api/reports/cancel", post(api::cancel_report))
        .route("/api/leaderboard", get(api::leaderboard))
        .route("/api/pairings", get(api::pairings))
        .route("/api/season/start", post(api::start_season))
        .route("/api/season/end", post(api::end_season))
        .route("/api/roles/sync", post(api::sync_roles))
        .merge(api::health_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
