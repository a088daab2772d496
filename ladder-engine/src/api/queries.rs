//! Read-only query endpoints: stats, leaderboard, pairing schedules

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::query::{self, LeaderboardEntry, PairingsView, PlayerStatsView};
use crate::AppState;

/// GET /api/players/:id/stats
pub async fn player_stats(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerStatsView>, ApiError> {
    let stats = query::player_stats(&state.db, &player_id).await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Number of rows, clamped to 1..=25 (default 10)
    pub limit: Option<i64>,
    /// Restrict to one tier's rating range
    pub tier: Option<String>,
}

/// GET /api/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(q): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let rows = query::leaderboard(&state.db, &state.config, q.limit, q.tier.as_deref()).await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct PairingsQuery {
    /// Season number; defaults to the active season
    pub season: Option<i64>,
    /// Group label; defaults to all groups, or to the player's own group
    /// when `player` is given
    pub group: Option<String>,
    /// Player whose group to resolve when no group is given
    pub player: Option<String>,
}

/// GET /api/pairings
pub async fn pairings(
    State(state): State<AppState>,
    Query(q): Query<PairingsQuery>,
) -> Result<Json<PairingsView>, ApiError> {
    let view = query::pairings(
        &state.db,
        q.season,
        q.group.as_deref(),
        q.player.as_deref(),
    )
    .await?;
    Ok(Json(view))
}
