//! Database initialization
//!
//! Creates the ladder schema on first run and is safe to call again on
//! every startup: all DDL is `IF NOT EXISTS` and seeding uses
//! `INSERT OR IGNORE`.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers with one writer; report confirmation
    // and queries share the pool.
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Bounded wait on writer contention
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_players_table(&pool).await?;
    create_seasons_table(&pool).await?;
    create_pairings_table(&pool).await?;
    create_pending_reports_table(&pool).await?;

    Ok(pool)
}

/// Create the players table
///
/// One row per registered player; never deleted. Counters only move
/// together with a rating write from a confirmed outcome.
pub async fn create_players_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            id TEXT PRIMARY KEY,
            rating REAL NOT NULL,
            wins INTEGER NOT NULL DEFAULT 0,
            losses INTEGER NOT NULL DEFAULT 0,
            draws INTEGER NOT NULL DEFAULT 0,
            signed_up INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (wins >= 0),
            CHECK (losses >= 0),
            CHECK (draws >= 0),
            CHECK (signed_up IN (0, 1))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_players_rating ON players(rating)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_players_signed_up ON players(signed_up)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the seasons table and seed season 1 (inactive)
pub async fn create_seasons_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS seasons (
            season_number INTEGER PRIMARY KEY,
            active INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (season_number >= 1),
            CHECK (active IN (0, 1))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO seasons (season_number, active) VALUES (1, 0)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the pairings table
///
/// One row per unordered player pair per season, holding two game slots.
/// Slot values are canonical player1-perspective scores and move from NULL
/// to a value exactly once.
pub async fn create_pairings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pairings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            season_number INTEGER NOT NULL REFERENCES seasons(season_number),
            group_name TEXT NOT NULL,
            player1_id TEXT NOT NULL REFERENCES players(id),
            player2_id TEXT NOT NULL REFERENCES players(id),
            result1 REAL DEFAULT NULL,
            result2 REAL DEFAULT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (player1_id <> player2_id),
            CHECK (result1 IS NULL OR result1 IN (0.0, 0.5, 1.0)),
            CHECK (result2 IS NULL OR result2 IN (0.0, 0.5, 1.0))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pairings_season_group ON pairings(season_number, group_name)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pairings_players ON pairings(season_number, player1_id, player2_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the pending_reports table
///
/// A freeform report carries only the opponent; a season report also names
/// the pairing row and game slot. The partial unique indexes enforce at
/// most one live report per (reporter, opponent) pair in freeform mode and
/// per (pairing, slot) in season mode.
pub async fn create_pending_reports_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pending_reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reporter_id TEXT NOT NULL REFERENCES players(id),
            opponent_id TEXT NOT NULL REFERENCES players(id),
            pairing_id INTEGER REFERENCES pairings(id),
            game_slot INTEGER,
            claim TEXT NOT NULL CHECK (claim IN ('w', 'l', 'd')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (reporter_id <> opponent_id),
            CHECK (game_slot IS NULL OR game_slot IN (1, 2)),
            CHECK (pairing_id IS NULL OR game_slot IS NOT NULL)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS ux_pending_freeform
        ON pending_reports(reporter_id, opponent_id)
        WHERE pairing_id IS NULL
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS ux_pending_season
        ON pending_reports(pairing_id, game_slot)
        WHERE pairing_id IS NOT NULL
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pending_created_at ON pending_reports(created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
