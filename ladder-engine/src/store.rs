//! Player store
//!
//! CRUD over the players table plus the atomic outcome write. Functions
//! take any SQLite executor so the reconciliation protocol can run them
//! inside its transaction; rating counters only ever move through
//! [`apply_outcome`], together with the rating itself.

use ladder_common::db::models::Player;
use ladder_common::{Error, Result};
use sqlx::{Executor, Sqlite, SqlitePool};

/// Fetch a player record, if one exists
pub async fn get_player<'e, E>(db: E, id: &str) -> Result<Option<Player>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let player = sqlx::query_as::<_, Player>(
        "SELECT id, rating, wins, losses, draws, signed_up FROM players WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(player)
}

/// Fetch a player record or fail with `NotRegistered`
pub async fn require_player<'e, E>(db: E, id: &str) -> Result<Player>
where
    E: Executor<'e, Database = Sqlite>,
{
    get_player(db, id)
        .await?
        .ok_or_else(|| Error::NotRegistered(id.to_string()))
}

/// Register a new player with the baseline rating and zero counters
pub async fn register(db: &SqlitePool, id: &str, baseline: f64) -> Result<Player> {
    let mut tx = db.begin().await?;

    if get_player(&mut *tx, id).await?.is_some() {
        return Err(Error::AlreadyExists(id.to_string()));
    }

    sqlx::query("INSERT INTO players (id, rating) VALUES (?, ?)")
        .bind(id)
        .bind(baseline)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Player {
        id: id.to_string(),
        rating: baseline,
        wins: 0,
        losses: 0,
        draws: 0,
        signed_up: false,
    })
}

/// Apply one confirmed outcome: set the new rating and bump the counters
/// in a single statement.
///
/// Callers are responsible for running this at most once per confirmed
/// outcome; the reconciliation protocol guarantees that by deleting the
/// pending report in the same transaction.
pub async fn apply_outcome<'e, E>(
    db: E,
    id: &str,
    new_rating: f64,
    wins_delta: i64,
    losses_delta: i64,
    draws_delta: i64,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let updated = sqlx::query(
        r#"
        UPDATE players
        SET rating = ?,
            wins = wins + ?,
            losses = losses + ?,
            draws = draws + ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(new_rating)
    .bind(wins_delta)
    .bind(losses_delta)
    .bind(draws_delta)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(Error::NotRegistered(id.to_string()));
    }
    Ok(())
}

/// Set or clear a player's season-signup flag
pub async fn set_signup<'e, E>(db: E, id: &str, signed_up: bool) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let updated = sqlx::query(
        "UPDATE players SET signed_up = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(signed_up)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(Error::NotRegistered(id.to_string()));
    }
    Ok(())
}

/// Clear every player's signup flag (season closure)
pub async fn reset_all_signups<'e, E>(db: E) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let cleared = sqlx::query("UPDATE players SET signed_up = 0 WHERE signed_up = 1")
        .execute(db)
        .await?
        .rows_affected();
    Ok(cleared)
}

/// All players currently signed up for the next season
pub async fn signed_up_players<'e, E>(db: E) -> Result<Vec<Player>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let players = sqlx::query_as::<_, Player>(
        "SELECT id, rating, wins, losses, draws, signed_up FROM players WHERE signed_up = 1 ORDER BY id",
    )
    .fetch_all(db)
    .await?;
    Ok(players)
}
