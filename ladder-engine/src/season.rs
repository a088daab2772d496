//! Season lifecycle
//!
//! A season is Open (signups accepted, no pairings) or Active (pairings
//! fixed, reporting allowed). Activation synchronizes tier roles, writes
//! the pairing batch, and flips the active flag in one transaction, so a
//! failed generation leaves the season Open with nothing written. Closing
//! a season clears every signup flag and seeds the next season number.

use serde::Serialize;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{info, warn};

use ladder_common::config::LadderConfig;
use ladder_common::db::models::Season;
use ladder_common::{Error, Result};

use crate::pairing::{self, PairingPlan};
use crate::roles::{self, RoleSyncFailure, RoleSynchronizer};
use crate::store;

/// Latest season row (the one with the maximum number)
pub async fn current_season<'e, E>(db: E) -> Result<Season>
where
    E: Executor<'e, Database = Sqlite>,
{
    let season = sqlx::query_as::<_, Season>(
        "SELECT season_number, active FROM seasons ORDER BY season_number DESC LIMIT 1",
    )
    .fetch_one(db)
    .await?;
    Ok(season)
}

/// Number of the active season, if one is running
pub async fn active_season<'e, E>(db: E) -> Result<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let number = sqlx::query_scalar::<_, i64>(
        "SELECT season_number FROM seasons WHERE active = 1 LIMIT 1",
    )
    .fetch_optional(db)
    .await?;
    Ok(number)
}

/// Sign a player up for (or withdraw them from) the upcoming season
///
/// Signups are frozen while a season is active.
pub async fn set_signup(db: &SqlitePool, player_id: &str, signed_up: bool) -> Result<()> {
    let mut tx = db.begin().await?;

    store::require_player(&mut *tx, player_id).await?;
    if active_season(&mut *tx).await?.is_some() {
        return Err(Error::SeasonAlreadyActive);
    }
    store::set_signup(&mut *tx, player_id, signed_up).await?;

    tx.commit().await?;
    Ok(())
}

/// Per-subgroup summary returned by season activation
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub players: usize,
    pub pairings: usize,
}

/// Outcome of a successful season activation
#[derive(Debug, Clone, Serialize)]
pub struct SeasonStartReport {
    pub season_number: i64,
    pub pairings_created: usize,
    pub groups: Vec<GroupSummary>,
    pub unmatched: Vec<String>,
    pub role_failures: Vec<RoleSyncFailure>,
}

/// Outcome of a season closure
#[derive(Debug, Clone, Serialize)]
pub struct SeasonEndReport {
    pub closed_season: i64,
    pub next_season: i64,
}

/// Activate the current season
///
/// Role synchronization runs before the write transaction; its per-player
/// failures are reported, not fatal. Pairing generation and the active
/// flag commit together, and the in-transaction re-check of the active
/// flag keeps two concurrent activations from both succeeding.
pub async fn start_season(
    db: &SqlitePool,
    config: &LadderConfig,
    roles: &dyn RoleSynchronizer,
) -> Result<SeasonStartReport> {
    if current_season(db).await?.active {
        return Err(Error::SeasonAlreadyActive);
    }

    let signed_up = store::signed_up_players(db).await?;
    if signed_up.is_empty() {
        return Err(Error::EmptySignupList);
    }

    let (assignments, _) = roles::plan_assignments(&signed_up, config);
    let role_failures = roles.assign_tier_roles(&assignments).await;
    for failure in &role_failures {
        warn!(
            "role sync failed for {}: {}",
            failure.player_id, failure.reason
        );
    }

    let pool: Vec<(String, f64)> = signed_up
        .iter()
        .map(|p| (p.id.clone(), p.rating))
        .collect();
    let plan: PairingPlan = {
        let mut rng = rand::thread_rng();
        pairing::plan_pairings(&pool, config, &mut rng)?
    };
    for id in &plan.unmatched {
        warn!("player {} matches no tier; excluded from season pairings", id);
    }

    let mut tx = db.begin().await?;

    let season = current_season(&mut *tx).await?;
    if season.active {
        return Err(Error::SeasonAlreadyActive);
    }

    let pairings_created = pairing::write_pairings(&mut *tx, season.season_number, &plan).await?;
    sqlx::query("UPDATE seasons SET active = 1 WHERE season_number = ?")
        .bind(season.season_number)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "season {} started: {} pairings across {} groups",
        season.season_number,
        pairings_created,
        plan.groups.len()
    );

    Ok(SeasonStartReport {
        season_number: season.season_number,
        pairings_created,
        groups: plan
            .groups
            .iter()
            .map(|g| GroupSummary {
                name: g.name.clone(),
                players: g.members.len(),
                pairings: g.pair_count(),
            })
            .collect(),
        unmatched: plan.unmatched,
        role_failures,
    })
}

/// Close the active season
///
/// Clears every signup flag, deactivates the season, and seeds the next
/// season number as Open. Historical pairings stay untouched.
pub async fn end_season(db: &SqlitePool) -> Result<SeasonEndReport> {
    let mut tx = db.begin().await?;

    let Some(season_number) = active_season(&mut *tx).await? else {
        return Err(Error::NoActiveSeason);
    };

    let cleared = store::reset_all_signups(&mut *tx).await?;
    sqlx::query("UPDATE seasons SET active = 0 WHERE season_number = ?")
        .bind(season_number)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT OR IGNORE INTO seasons (season_number, active) VALUES (?, 0)")
        .bind(season_number + 1)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "season {} ended ({} signups cleared); season {} is open",
        season_number,
        cleared,
        season_number + 1
    );

    Ok(SeasonEndReport {
        closed_season: season_number,
        next_season: season_number + 1,
    })
}
