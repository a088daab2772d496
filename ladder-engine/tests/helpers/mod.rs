//! Shared test fixtures: a temp-file database with the full schema and a
//! validated configuration.
#![allow(dead_code)]

use sqlx::SqlitePool;
use tempfile::TempDir;

use ladder_common::config::{LadderConfig, TierRange};
use ladder_common::db::init_database;
use ladder_engine::store;

pub struct TestContext {
    pub pool: SqlitePool,
    pub config: LadderConfig,
    // Keeps the database file alive for the test's duration
    _dir: TempDir,
}

/// Fresh database with the shipped default configuration
pub async fn setup() -> TestContext {
    setup_with(LadderConfig::default()).await
}

/// Fresh database with a single all-encompassing tier, so every player is
/// pairable.
pub async fn setup_open_tier() -> TestContext {
    let config = LadderConfig {
        tiers: vec![TierRange {
            name: "Open".to_string(),
            min: 0.0,
            max: 3000.0,
        }],
        ..LadderConfig::default()
    };
    setup_with(config).await
}

pub async fn setup_with(mut config: LadderConfig) -> TestContext {
    config.validate().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("ladder.db")).await.unwrap();
    TestContext {
        pool,
        config,
        _dir: dir,
    }
}

/// Register players at the configured baseline rating
pub async fn register_players(ctx: &TestContext, ids: &[&str]) {
    for id in ids {
        store::register(&ctx.pool, id, ctx.config.rating.baseline)
            .await
            .unwrap();
    }
}

/// Count of live rows in pending_reports
pub async fn pending_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM pending_reports")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Force a pending report's timestamp into the distant past
pub async fn expire_pending(pool: &SqlitePool, reporter: &str, opponent: &str) {
    sqlx::query(
        "UPDATE pending_reports SET created_at = '2000-01-01 00:00:00' WHERE reporter_id = ? AND opponent_id = ?",
    )
    .bind(reporter)
    .bind(opponent)
    .execute(pool)
    .await
    .unwrap();
}
