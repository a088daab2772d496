//! Match report and cancellation endpoints

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ApiError;
use crate::reconcile::{self, CancelRequest, ReportOutcome, ReportRequest};
use crate::AppState;

/// POST /api/reports
///
/// Report a match result from the reporter's perspective. With an active
/// season and a game slot this targets the season pairing; otherwise it is
/// a freeform challenge report.
pub async fn report(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<ReportOutcome>, ApiError> {
    let outcome = reconcile::report(&state.db, &state.config, &req).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub canceled: bool,
    pub opponent_id: String,
}

/// POST /api/reports/cancel
///
/// Withdraw one's own pending report by restating the same claim.
pub async fn cancel_report(
    State(state): State<AppState>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<CancelResponse>, ApiError> {
    reconcile::cancel(&state.db, &state.config, &req).await?;
    Ok(Json(CancelResponse {
        canceled: true,
        opponent_id: req.opponent_id,
    }))
}
