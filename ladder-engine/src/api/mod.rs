//! HTTP API
//!
//! Thin boundary adapter over the engine operations: handlers take
//! primitive identifiers, call one engine operation, and map the domain
//! error kinds onto HTTP statuses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use ladder_common::Error;

pub mod health;
pub mod players;
pub mod queries;
pub mod reports;
pub mod season;

pub use health::health_routes;
pub use players::{register, signup};
pub use queries::{leaderboard, pairings, player_stats};
pub use reports::{cancel_report, report};
pub use season::{end_season, start_season, sync_roles};

/// Domain error carried across the HTTP boundary
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::AlreadyExists(_)
            | Error::AlreadyReported
            | Error::Conflict
            | Error::AlreadySettled
            | Error::SeasonAlreadyActive => StatusCode::CONFLICT,
            Error::NotRegistered(_)
            | Error::NoPairing
            | Error::NoActiveSeason
            | Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::SelfReport
            | Error::EmptySignupList
            | Error::NoTierMatch
            | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Database(_) | Error::Io(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {}", self.0);
        }

        let body = Json(json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
