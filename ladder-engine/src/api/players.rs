//! Player registration and season signup endpoints

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use ladder_common::db::models::Player;
use ladder_common::Error;

use super::ApiError;
use crate::{season, store, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub player_id: String,
}

/// POST /api/players
///
/// Register a new player at the configured baseline rating.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Player>, ApiError> {
    let player_id = req.player_id.trim();
    if player_id.is_empty() {
        return Err(Error::InvalidInput("player id must not be empty".into()).into());
    }

    let player = store::register(&state.db, player_id, state.config.rating.baseline).await?;
    Ok(Json(player))
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Defaults to signing up; send `false` to withdraw
    #[serde(default = "default_signed_up")]
    pub signed_up: bool,
}

fn default_signed_up() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub player_id: String,
    pub signed_up: bool,
}

/// POST /api/players/:id/signup
///
/// Set or clear the season-signup flag; rejected while a season is active.
pub async fn signup(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    season::set_signup(&state.db, &player_id, req.signed_up).await?;
    Ok(Json(SignupResponse {
        player_id,
        signed_up: req.signed_up,
    }))
}
