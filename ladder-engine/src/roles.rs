//! Tier-role synchronization
//!
//! Role assignment lives in the chat platform, so the engine only plans
//! which tier each signed-up player belongs to and hands the batch to an
//! injected [`RoleSynchronizer`]. Per-player failures are reported back
//! without aborting the batch.

use axum::async_trait;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use ladder_common::config::LadderConfig;
use ladder_common::db::models::Player;
use ladder_common::{Error, Result};

use crate::store;

/// One planned assignment: the player and the single tier role they get
#[derive(Debug, Clone, Serialize)]
pub struct TierAssignment {
    pub player_id: String,
    pub rating: f64,
    pub tier: String,
}

/// A per-player failure reported by the synchronizer
#[derive(Debug, Clone, Serialize)]
pub struct RoleSyncFailure {
    pub player_id: String,
    pub reason: String,
}

/// External collaborator applying tier roles on the chat platform
///
/// Implementations assign each listed player exactly one tier role,
/// removing any other tier role the player carries, and return the
/// players they could not update.
#[async_trait]
pub trait RoleSynchronizer: Send + Sync {
    async fn assign_tier_roles(&self, assignments: &[TierAssignment]) -> Vec<RoleSyncFailure>;
}

/// Default synchronizer: logs the plan and reports no failures. Used when
/// no chat adapter is wired in.
pub struct LoggingRoleSync;

#[async_trait]
impl RoleSynchronizer for LoggingRoleSync {
    async fn assign_tier_roles(&self, assignments: &[TierAssignment]) -> Vec<RoleSyncFailure> {
        for a in assignments {
            info!(
                "role sync: {} ({:.0}) -> {}",
                a.player_id, a.rating, a.tier
            );
        }
        Vec::new()
    }
}

/// Map players to tier assignments; players matching no tier are returned
/// separately.
pub fn plan_assignments(
    players: &[Player],
    config: &LadderConfig,
) -> (Vec<TierAssignment>, Vec<String>) {
    let mut assignments = Vec::new();
    let mut unmatched = Vec::new();

    for player in players {
        match config.tier_for(player.rating) {
            Some(tier) => assignments.push(TierAssignment {
                player_id: player.id.clone(),
                rating: player.rating,
                tier: tier.name.clone(),
            }),
            None => unmatched.push(player.id.clone()),
        }
    }

    (assignments, unmatched)
}

/// Outcome of a role synchronization run
#[derive(Debug, Clone, Serialize)]
pub struct RoleSyncReport {
    pub assigned: usize,
    pub unmatched: Vec<String>,
    pub failures: Vec<RoleSyncFailure>,
}

/// Synchronize tier roles for every signed-up player
pub async fn sync_signed_up_roles(
    db: &SqlitePool,
    config: &LadderConfig,
    roles: &dyn RoleSynchronizer,
) -> Result<RoleSyncReport> {
    let signed_up = store::signed_up_players(db).await?;
    if signed_up.is_empty() {
        return Err(Error::EmptySignupList);
    }

    let (assignments, unmatched) = plan_assignments(&signed_up, config);
    for id in &unmatched {
        warn!("player {} matches no tier; no role assigned", id);
    }

    let failures = roles.assign_tier_roles(&assignments).await;
    for failure in &failures {
        warn!(
            "role sync failed for {}: {}",
            failure.player_id, failure.reason
        );
    }

    Ok(RoleSyncReport {
        assigned: assignments.len() - failures.len(),
        unmatched,
        failures,
    })
}
