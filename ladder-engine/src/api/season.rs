//! Season lifecycle and role synchronization endpoints
//!
//! The chat adapter is expected to gate these behind its own admin
//! permission check before forwarding.

use axum::extract::State;
use axum::Json;

use super::ApiError;
use crate::roles::{self, RoleSyncReport};
use crate::season::{self, SeasonEndReport, SeasonStartReport};
use crate::AppState;

/// POST /api/season/start
///
/// Synchronize tier roles, generate pairings, and activate the season.
pub async fn start_season(
    State(state): State<AppState>,
) -> Result<Json<SeasonStartReport>, ApiError> {
    let report = season::start_season(&state.db, &state.config, state.roles.as_ref()).await?;
    Ok(Json(report))
}

/// POST /api/season/end
///
/// Close the active season and open the next one.
pub async fn end_season(State(state): State<AppState>) -> Result<Json<SeasonEndReport>, ApiError> {
    let report = season::end_season(&state.db).await?;
    Ok(Json(report))
}

/// POST /api/roles/sync
///
/// Re-run tier-role synchronization for every signed-up player.
pub async fn sync_roles(State(state): State<AppState>) -> Result<Json<RoleSyncReport>, ApiError> {
    let report = roles::sync_signed_up_roles(&state.db, &state.config, state.roles.as_ref()).await?;
    Ok(Json(report))
}
