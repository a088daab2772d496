//! Freeform reconciliation: the two-party confirm/cancel protocol and its
//! at-most-once guarantees.

mod helpers;

use helpers::{expire_pending, pending_count, register_players, setup};
use ladder_common::{Error, GameResult};
use ladder_engine::reconcile::{self, CancelRequest, ReportOutcome, ReportRequest};
use ladder_engine::store;
use ladder_engine::sweep::sweep_expired;

const EPS: f64 = 1e-9;

fn report_req(reporter: &str, opponent: &str, result: GameResult) -> ReportRequest {
    ReportRequest {
        reporter_id: reporter.to_string(),
        opponent_id: opponent.to_string(),
        result,
        game_slot: None,
    }
}

fn cancel_req(reporter: &str, opponent: &str, result: GameResult) -> CancelRequest {
    CancelRequest {
        reporter_id: reporter.to_string(),
        opponent_id: opponent.to_string(),
        result,
        game_slot: None,
    }
}

#[tokio::test]
async fn first_report_creates_pending_without_rating_change() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    let outcome = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();

    match outcome {
        ReportOutcome::Pending {
            opponent_id,
            confirm_with,
            game_slot,
        } => {
            assert_eq!(opponent_id, "bob");
            assert_eq!(confirm_with, GameResult::Loss);
            assert_eq!(game_slot, None);
        }
        other => panic!("expected Pending, got {:?}", other),
    }

    let alice = store::get_player(&ctx.pool, "alice").await.unwrap().unwrap();
    assert!((alice.rating - 1380.0).abs() < EPS);
    assert_eq!(alice.games(), 0);
    assert_eq!(pending_count(&ctx.pool).await, 1);
}

#[tokio::test]
async fn complementary_confirmation_applies_ratings_once() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();

    let outcome = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("bob", "alice", GameResult::Loss),
    )
    .await
    .unwrap();

    let ReportOutcome::Confirmed { reporter, opponent } = outcome else {
        panic!("expected Confirmed");
    };
    // Equal ratings at K=25: confirmer (bob) lost 12.5, alice gained 12.5
    assert!((reporter.new_rating - 1367.5).abs() < EPS);
    assert!((opponent.new_rating - 1392.5).abs() < EPS);

    let alice = store::get_player(&ctx.pool, "alice").await.unwrap().unwrap();
    let bob = store::get_player(&ctx.pool, "bob").await.unwrap().unwrap();
    assert!((alice.rating - 1392.5).abs() < EPS);
    assert!((bob.rating - 1367.5).abs() < EPS);
    assert_eq!((alice.wins, alice.losses, alice.draws), (1, 0, 0));
    assert_eq!((bob.wins, bob.losses, bob.draws), (0, 1, 0));
    assert_eq!(pending_count(&ctx.pool).await, 0);
}

#[tokio::test]
async fn draw_claims_confirm_each_other() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Draw),
    )
    .await
    .unwrap();
    let outcome = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("bob", "alice", GameResult::Draw),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, ReportOutcome::Confirmed { .. }));
    let alice = store::get_player(&ctx.pool, "alice").await.unwrap().unwrap();
    // Draw between equals moves nothing but still counts a game
    assert!((alice.rating - 1380.0).abs() < EPS);
    assert_eq!((alice.wins, alice.losses, alice.draws), (0, 0, 1));
}

#[tokio::test]
async fn non_complementary_claim_conflicts_and_mutates_nothing() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();

    let err = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("bob", "alice", GameResult::Win),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Conflict));

    // Alice's original pending report survives and ratings are untouched
    assert_eq!(pending_count(&ctx.pool).await, 1);
    let bob = store::get_player(&ctx.pool, "bob").await.unwrap().unwrap();
    assert!((bob.rating - 1380.0).abs() < EPS);
    assert_eq!(bob.games(), 0);
}

#[tokio::test]
async fn self_report_rejected_before_any_lookup() {
    let ctx = setup().await;
    register_players(&ctx, &["alice"]).await;

    let err = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "alice", GameResult::Win),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::SelfReport));
}

#[tokio::test]
async fn both_parties_must_be_registered() {
    let ctx = setup().await;
    register_players(&ctx, &["alice"]).await;

    let err = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "ghost", GameResult::Win),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::NotRegistered(_)));

    let err = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("ghost", "alice", GameResult::Win),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::NotRegistered(_)));
}

#[tokio::test]
async fn duplicate_report_by_same_party_rejected() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();
    let err = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::AlreadyReported));
    assert_eq!(pending_count(&ctx.pool).await, 1);
}

#[tokio::test]
async fn replayed_confirmation_does_not_reapply_ratings() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();
    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("bob", "alice", GameResult::Loss),
    )
    .await
    .unwrap();

    // The replay finds no pending report; it opens a fresh claim instead
    // of confirming a second time.
    let replay = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("bob", "alice", GameResult::Loss),
    )
    .await
    .unwrap();
    assert!(matches!(replay, ReportOutcome::Pending { .. }));

    let alice = store::get_player(&ctx.pool, "alice").await.unwrap().unwrap();
    assert!((alice.rating - 1392.5).abs() < EPS);
    assert_eq!(alice.games(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_confirmations_apply_at_most_once() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = ctx.pool.clone();
        let config = ctx.config.clone();
        handles.push(tokio::spawn(async move {
            reconcile::report(
                &pool,
                &config,
                &ReportRequest {
                    reporter_id: "bob".to_string(),
                    opponent_id: "alice".to_string(),
                    result: GameResult::Loss,
                    game_slot: None,
                },
            )
            .await
        }));
    }

    let mut confirmed = 0;
    for handle in handles {
        if let Ok(Ok(ReportOutcome::Confirmed { .. })) = handle.await {
            confirmed += 1;
        }
    }
    assert_eq!(confirmed, 1, "exactly one confirmation may succeed");

    // One rating application total
    let alice = store::get_player(&ctx.pool, "alice").await.unwrap().unwrap();
    let bob = store::get_player(&ctx.pool, "bob").await.unwrap().unwrap();
    assert!((alice.rating - 1392.5).abs() < EPS);
    assert!((bob.rating - 1367.5).abs() < EPS);
    assert_eq!(alice.games(), 1);
    assert_eq!(bob.games(), 1);
}

#[tokio::test]
async fn cancel_with_mismatched_claim_leaves_report() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();

    let err = reconcile::cancel(
        &ctx.pool,
        &ctx.config,
        &cancel_req("alice", "bob", GameResult::Draw),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(pending_count(&ctx.pool).await, 1);
}

#[tokio::test]
async fn cancel_without_pending_rejected() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    let err = reconcile::cancel(
        &ctx.pool,
        &ctx.config,
        &cancel_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn cancel_with_matching_claim_removes_report() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();
    reconcile::cancel(
        &ctx.pool,
        &ctx.config,
        &cancel_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();
    assert_eq!(pending_count(&ctx.pool).await, 0);

    // Bob's complementary claim now opens a fresh report instead of
    // confirming the canceled one.
    let outcome = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("bob", "alice", GameResult::Loss),
    )
    .await
    .unwrap();
    assert!(matches!(outcome, ReportOutcome::Pending { .. }));
}

#[tokio::test]
async fn expired_report_is_absent_for_confirmation() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();
    expire_pending(&ctx.pool, "alice", "bob").await;

    // The stale claim must not confirm, even though the row still exists
    let outcome = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("bob", "alice", GameResult::Loss),
    )
    .await
    .unwrap();
    assert!(matches!(outcome, ReportOutcome::Pending { .. }));

    let alice = store::get_player(&ctx.pool, "alice").await.unwrap().unwrap();
    assert_eq!(alice.games(), 0);
}

#[tokio::test]
async fn expired_report_does_not_block_a_fresh_claim() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();
    expire_pending(&ctx.pool, "alice", "bob").await;

    // Same reporter, same opponent: the expired row is purged in place of
    // an AlreadyReported rejection.
    let outcome = reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Draw),
    )
    .await
    .unwrap();
    assert!(matches!(outcome, ReportOutcome::Pending { .. }));
    assert_eq!(pending_count(&ctx.pool).await, 1);
}

#[tokio::test]
async fn sweeper_purges_only_expired_rows() {
    let ctx = setup().await;
    register_players(&ctx, &["alice", "bob", "carol"]).await;

    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("alice", "bob", GameResult::Win),
    )
    .await
    .unwrap();
    reconcile::report(
        &ctx.pool,
        &ctx.config,
        &report_req("carol", "bob", GameResult::Loss),
    )
    .await
    .unwrap();
    expire_pending(&ctx.pool, "alice", "bob").await;

    let deleted = sweep_expired(&ctx.pool, ctx.config.reports.ttl_minutes)
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(pending_count(&ctx.pool).await, 1);
}
