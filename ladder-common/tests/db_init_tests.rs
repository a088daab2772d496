//! Tests for database initialization: schema creation, idempotent
//! re-initialization, seeding, and the pending-report uniqueness rules.

use ladder_common::db::init_database;

#[tokio::test]
async fn database_created_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ladder.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "database file was not created");
}

#[tokio::test]
async fn initialization_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ladder.db");

    let pool1 = init_database(&db_path).await.unwrap();
    drop(pool1);

    let pool2 = init_database(&db_path).await.unwrap();
    let seasons: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seasons")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(seasons, 1, "season seed duplicated on re-init");
}

#[tokio::test]
async fn season_one_seeded_inactive() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("ladder.db")).await.unwrap();

    let (number, active): (i64, i64) =
        sqlx::query_as("SELECT season_number, active FROM seasons ORDER BY season_number DESC LIMIT 1")
            .fetch_one(&pool)
            .await
            .unwrap();

    assert_eq!(number, 1);
    assert_eq!(active, 0);
}

#[tokio::test]
async fn foreign_keys_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("ladder.db")).await.unwrap();

    let fk: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(fk, 1);
}

#[tokio::test]
async fn duplicate_freeform_pending_rejected_by_index() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("ladder.db")).await.unwrap();

    for id in ["alice", "bob"] {
        sqlx::query("INSERT INTO players (id, rating) VALUES (?, 1380.0)")
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();
    }

    sqlx::query(
        "INSERT INTO pending_reports (reporter_id, opponent_id, claim) VALUES ('alice', 'bob', 'w')",
    )
    .execute(&pool)
    .await
    .unwrap();

    // Same (reporter, opponent) again must hit ux_pending_freeform
    let dup = sqlx::query(
        "INSERT INTO pending_reports (reporter_id, opponent_id, claim) VALUES ('alice', 'bob', 'l')",
    )
    .execute(&pool)
    .await;
    assert!(dup.is_err(), "duplicate freeform pending was accepted");

    // The mirrored direction is a different key and must be accepted
    sqlx::query(
        "INSERT INTO pending_reports (reporter_id, opponent_id, claim) VALUES ('bob', 'alice', 'l')",
    )
    .execute(&pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn pairing_slot_values_constrained() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("ladder.db")).await.unwrap();

    for id in ["alice", "bob"] {
        sqlx::query("INSERT INTO players (id, rating) VALUES (?, 1380.0)")
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();
    }

    let bad = sqlx::query(
        r#"
        INSERT INTO pairings (season_number, group_name, player1_id, player2_id, result1)
        VALUES (1, 'Open', 'alice', 'bob', 0.7)
        "#,
    )
    .execute(&pool)
    .await;
    assert!(bad.is_err(), "slot accepted a score outside {{0.0, 0.5, 1.0}}");
}
