//! Match-report reconciliation
//!
//! Self-reported results come from untrusted parties, so nothing touches a
//! rating until both sides have made complementary claims. Each report or
//! cancel runs its whole read-check-write sequence inside one database
//! transaction: the pending-report row is the reservation, and deleting it
//! in the same transaction as the rating write makes every confirmed
//! outcome apply at most once.
//!
//! Two modes share the entry point:
//! - freeform, when no season is active or no game slot is named;
//! - season, which records canonical player1-perspective scores into the
//!   pairing's game slots and settles the pairing once both slots hold a
//!   result.

use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};

use ladder_common::config::LadderConfig;
use ladder_common::db::models::{Pairing, PendingReport, Player};
use ladder_common::{time, Error, GameResult, Result};

use crate::rating;
use crate::season::active_season;
use crate::store;

/// A match report from one player's perspective
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub reporter_id: String,
    pub opponent_id: String,
    pub result: GameResult,
    /// Season game slot (1 or 2); absent selects freeform mode
    pub game_slot: Option<u8>,
}

/// Cancellation of one's own outstanding report; the claim must be
/// restated exactly.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelRequest {
    pub reporter_id: String,
    pub opponent_id: String,
    pub result: GameResult,
    pub game_slot: Option<u8>,
}

/// One player's side of an applied outcome
#[derive(Debug, Clone, Serialize)]
pub struct RatingChange {
    pub player_id: String,
    pub old_rating: f64,
    pub new_rating: f64,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
}

/// What a report call did
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// First claim recorded; the opponent must confirm with the
    /// complementary result.
    Pending {
        opponent_id: String,
        confirm_with: GameResult,
        game_slot: Option<u8>,
    },
    /// Freeform match confirmed and ratings applied
    Confirmed {
        reporter: RatingChange,
        opponent: RatingChange,
    },
    /// Season game confirmed into its slot; the pairing still has an open
    /// slot, so ratings are untouched.
    SlotRecorded { pairing_id: i64, game_slot: u8 },
    /// Season game confirmed and the pairing settled: both slots filled,
    /// averaged ratings and tallies applied.
    Settled {
        pairing_id: i64,
        player1: RatingChange,
        player2: RatingChange,
    },
}

/// Report a match result
pub async fn report(
    db: &SqlitePool,
    config: &LadderConfig,
    req: &ReportRequest,
) -> Result<ReportOutcome> {
    if req.reporter_id == req.opponent_id {
        return Err(Error::SelfReport);
    }
    if let Some(slot) = req.game_slot {
        if !(1..=2).contains(&slot) {
            return Err(Error::InvalidInput("game slot must be 1 or 2".into()));
        }
    }

    let mut tx = db.begin().await?;

    let reporter = store::require_player(&mut *tx, &req.reporter_id).await?;
    let opponent = store::require_player(&mut *tx, &req.opponent_id).await?;

    let outcome = match (active_season(&mut *tx).await?, req.game_slot) {
        (Some(season), Some(slot)) => {
            report_season(&mut tx, config, req, season, slot).await?
        }
        _ => report_freeform(&mut tx, config, req, &reporter, &opponent).await?,
    };

    tx.commit().await?;
    Ok(outcome)
}

/// Cancel one's own outstanding pending report
pub async fn cancel(db: &SqlitePool, config: &LadderConfig, req: &CancelRequest) -> Result<()> {
    if req.reporter_id == req.opponent_id {
        return Err(Error::SelfReport);
    }

    let mut tx = db.begin().await?;
    store::require_player(&mut *tx, &req.reporter_id).await?;

    let cutoff = time::ttl_cutoff(config.reports.ttl_minutes);
    let pending = match (active_season(&mut *tx).await?, req.game_slot) {
        (Some(season), Some(slot)) => {
            let pairing = find_pairing(&mut tx, season, &req.reporter_id, &req.opponent_id)
                .await?
                .ok_or(Error::NoPairing)?;
            live_season_pending(&mut tx, pairing.id, slot, &cutoff)
                .await?
                .filter(|p| p.reporter_id == req.reporter_id)
        }
        _ => live_freeform_pending(&mut tx, &req.reporter_id, &req.opponent_id, &cutoff).await?,
    };

    let Some(pending) = pending else {
        return Err(Error::NotFound(format!(
            "no pending report of yours against {}",
            req.opponent_id
        )));
    };

    let claimed: GameResult = pending.claim.parse()?;
    if claimed != req.result {
        return Err(Error::InvalidInput(format!(
            "result does not match your pending report; you reported '{}'",
            claimed
        )));
    }

    sqlx::query("DELETE FROM pending_reports WHERE id = ?")
        .bind(pending.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Freeform mode: confirm the opponent's live counter-claim, or record a
/// new pending report.
async fn report_freeform(
    tx: &mut Transaction<'_, Sqlite>,
    config: &LadderConfig,
    req: &ReportRequest,
    reporter: &Player,
    opponent: &Player,
) -> Result<ReportOutcome> {
    let cutoff = time::ttl_cutoff(config.reports.ttl_minutes);

    let counter =
        live_freeform_pending(tx, &req.opponent_id, &req.reporter_id, &cutoff).await?;

    let Some(counter) = counter else {
        // No counter-claim: this report becomes the pending side.
        purge_freeform_key(tx, &req.reporter_id, &req.opponent_id, &cutoff).await?;

        if live_freeform_pending(tx, &req.reporter_id, &req.opponent_id, &cutoff)
            .await?
            .is_some()
        {
            return Err(Error::AlreadyReported);
        }

        sqlx::query(
            "INSERT INTO pending_reports (reporter_id, opponent_id, claim) VALUES (?, ?, ?)",
        )
        .bind(&req.reporter_id)
        .bind(&req.opponent_id)
        .bind(req.result.letter())
        .execute(&mut **tx)
        .await?;

        return Ok(ReportOutcome::Pending {
            opponent_id: req.opponent_id.clone(),
            confirm_with: req.result.complement(),
            game_slot: None,
        });
    };

    let their_claim: GameResult = counter.claim.parse()?;
    if req.result != their_claim.complement() {
        return Err(Error::Conflict);
    }

    // Delete-first with a row-count guard: a racing confirmation that
    // already consumed this report makes the delete a no-op and this
    // attempt fails before any rating write.
    let deleted = sqlx::query("DELETE FROM pending_reports WHERE id = ?")
        .bind(counter.id)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(Error::Conflict);
    }

    let (new_reporter, new_opponent) = rating::rate_pair(
        config.rating.k_factor,
        reporter.rating,
        opponent.rating,
        req.result.score(),
    );
    let (rep_w, rep_l, rep_d) = tally_for(req.result);
    let (opp_w, opp_l, opp_d) = tally_for(req.result.complement());

    store::apply_outcome(&mut **tx, &reporter.id, new_reporter, rep_w, rep_l, rep_d).await?;
    store::apply_outcome(&mut **tx, &opponent.id, new_opponent, opp_w, opp_l, opp_d).await?;

    Ok(ReportOutcome::Confirmed {
        reporter: RatingChange {
            player_id: reporter.id.clone(),
            old_rating: reporter.rating,
            new_rating: new_reporter,
            wins: rep_w,
            losses: rep_l,
            draws: rep_d,
        },
        opponent: RatingChange {
            player_id: opponent.id.clone(),
            old_rating: opponent.rating,
            new_rating: new_opponent,
            wins: opp_w,
            losses: opp_l,
            draws: opp_d,
        },
    })
}

/// Season mode: record the claim against the pairing's game slot, and
/// settle the pairing once both slots are filled.
async fn report_season(
    tx: &mut Transaction<'_, Sqlite>,
    config: &LadderConfig,
    req: &ReportRequest,
    season: i64,
    slot: u8,
) -> Result<ReportOutcome> {
    let pairing = find_pairing(tx, season, &req.reporter_id, &req.opponent_id)
        .await?
        .ok_or(Error::NoPairing)?;

    if pairing.slot(slot).is_some() {
        return Err(Error::AlreadySettled);
    }

    let cutoff = time::ttl_cutoff(config.reports.ttl_minutes);
    let pending = live_season_pending(tx, pairing.id, slot, &cutoff).await?;

    let Some(pending) = pending else {
        purge_season_key(tx, pairing.id, slot, &cutoff).await?;

        sqlx::query(
            r#"
            INSERT INTO pending_reports (reporter_id, opponent_id, pairing_id, game_slot, claim)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&req.reporter_id)
        .bind(&req.opponent_id)
        .bind(pairing.id)
        .bind(slot as i64)
        .bind(req.result.letter())
        .execute(&mut **tx)
        .await?;

        return Ok(ReportOutcome::Pending {
            opponent_id: req.opponent_id.clone(),
            confirm_with: req.result.complement(),
            game_slot: Some(slot),
        });
    };

    if pending.reporter_id == req.reporter_id {
        return Err(Error::AlreadyReported);
    }

    let their_claim: GameResult = pending.claim.parse()?;
    if req.result != their_claim.complement() {
        return Err(Error::Conflict);
    }

    // Both claims agree: write the canonical player1-perspective score
    // into the slot. The IS NULL guard keeps a slot from filling twice.
    let score = req
        .result
        .score_for_player1(pairing.is_player1(&req.reporter_id));
    let column = if slot == 1 { "result1" } else { "result2" };
    let updated = sqlx::query(&format!(
        "UPDATE pairings SET {column} = ? WHERE id = ? AND {column} IS NULL"
    ))
    .bind(score)
    .bind(pairing.id)
    .execute(&mut **tx)
    .await?
    .rows_affected();
    if updated == 0 {
        return Err(Error::AlreadySettled);
    }

    let deleted = sqlx::query("DELETE FROM pending_reports WHERE id = ?")
        .bind(pending.id)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(Error::Conflict);
    }

    let fresh = sqlx::query_as::<_, Pairing>(
        r#"
        SELECT id, season_number, group_name, player1_id, player2_id, result1, result2
        FROM pairings WHERE id = ?
        "#,
    )
    .bind(pairing.id)
    .fetch_one(&mut **tx)
    .await?;

    let Some((score1, score2)) = fresh.result1.zip(fresh.result2) else {
        return Ok(ReportOutcome::SlotRecorded {
            pairing_id: fresh.id,
            game_slot: slot,
        });
    };

    // Settlement: both games are rated against the same pre-settlement
    // ratings and the two results are averaged per player.
    let player1 = store::require_player(&mut **tx, &fresh.player1_id).await?;
    let player2 = store::require_player(&mut **tx, &fresh.player2_id).await?;
    let settled = settle_scores(
        config.rating.k_factor,
        player1.rating,
        player2.rating,
        [score1, score2],
    );

    store::apply_outcome(
        &mut **tx,
        &player1.id,
        settled.rating1,
        settled.wins1,
        settled.losses1,
        settled.draws,
    )
    .await?;
    store::apply_outcome(
        &mut **tx,
        &player2.id,
        settled.rating2,
        settled.losses1,
        settled.wins1,
        settled.draws,
    )
    .await?;

    // Clear any stray reports still keyed to this pairing
    sqlx::query("DELETE FROM pending_reports WHERE pairing_id = ?")
        .bind(pairing.id)
        .execute(&mut **tx)
        .await?;

    Ok(ReportOutcome::Settled {
        pairing_id: fresh.id,
        player1: RatingChange {
            player_id: player1.id.clone(),
            old_rating: player1.rating,
            new_rating: settled.rating1,
            wins: settled.wins1,
            losses: settled.losses1,
            draws: settled.draws,
        },
        player2: RatingChange {
            player_id: player2.id.clone(),
            old_rating: player2.rating,
            new_rating: settled.rating2,
            wins: settled.losses1,
            losses: settled.wins1,
            draws: settled.draws,
        },
    })
}

/// Averaged settlement of a two-game pairing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub rating1: f64,
    pub rating2: f64,
    /// Player1 wins; player2's losses mirror this
    pub wins1: i64,
    /// Player1 losses; player2's wins mirror this
    pub losses1: i64,
    pub draws: i64,
}

/// Rate each game from the same starting ratings, average the results per
/// player, and tally wins/losses/draws from the canonical
/// player1-perspective scores.
pub fn settle_scores(k: f64, rating1: f64, rating2: f64, scores: [f64; 2]) -> Settlement {
    let mut sum1 = 0.0;
    let mut sum2 = 0.0;
    let (mut wins1, mut losses1, mut draws) = (0i64, 0i64, 0i64);

    for score in scores {
        let (new1, new2) = rating::rate_pair(k, rating1, rating2, score);
        sum1 += new1;
        sum2 += new2;
        // Slots only ever hold 0.0, 0.5, or 1.0
        if score > 0.75 {
            wins1 += 1;
        } else if score < 0.25 {
            losses1 += 1;
        } else {
            draws += 1;
        }
    }

    Settlement {
        rating1: sum1 / scores.len() as f64,
        rating2: sum2 / scores.len() as f64,
        wins1,
        losses1,
        draws,
    }
}

fn tally_for(result: GameResult) -> (i64, i64, i64) {
    match result {
        GameResult::Win => (1, 0, 0),
        GameResult::Loss => (0, 1, 0),
        GameResult::Draw => (0, 0, 1),
    }
}

/// The pairing row for an unordered player pair in the given season
async fn find_pairing(
    tx: &mut Transaction<'_, Sqlite>,
    season: i64,
    a: &str,
    b: &str,
) -> Result<Option<Pairing>> {
    let pairing = sqlx::query_as::<_, Pairing>(
        r#"
        SELECT id, season_number, group_name, player1_id, player2_id, result1, result2
        FROM pairings
        WHERE season_number = ?
          AND ((player1_id = ? AND player2_id = ?) OR (player1_id = ? AND player2_id = ?))
        "#,
    )
    .bind(season)
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(pairing)
}

/// Live (non-expired) freeform pending report from `reporter` against
/// `opponent`
async fn live_freeform_pending(
    tx: &mut Transaction<'_, Sqlite>,
    reporter: &str,
    opponent: &str,
    cutoff: &str,
) -> Result<Option<PendingReport>> {
    let pending = sqlx::query_as::<_, PendingReport>(
        r#"
        SELECT id, reporter_id, opponent_id, pairing_id, game_slot, claim, created_at
        FROM pending_reports
        WHERE reporter_id = ? AND opponent_id = ? AND pairing_id IS NULL AND created_at >= ?
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(reporter)
    .bind(opponent)
    .bind(cutoff)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(pending)
}

/// Live (non-expired) pending report for a pairing's game slot
async fn live_season_pending(
    tx: &mut Transaction<'_, Sqlite>,
    pairing_id: i64,
    slot: u8,
    cutoff: &str,
) -> Result<Option<PendingReport>> {
    let pending = sqlx::query_as::<_, PendingReport>(
        r#"
        SELECT id, reporter_id, opponent_id, pairing_id, game_slot, claim, created_at
        FROM pending_reports
        WHERE pairing_id = ? AND game_slot = ? AND created_at >= ?
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(pairing_id)
    .bind(slot as i64)
    .bind(cutoff)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(pending)
}

/// Drop expired rows occupying a freeform uniqueness key so a fresh report
/// can take their place before the sweeper gets to them.
async fn purge_freeform_key(
    tx: &mut Transaction<'_, Sqlite>,
    reporter: &str,
    opponent: &str,
    cutoff: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM pending_reports
        WHERE reporter_id = ? AND opponent_id = ? AND pairing_id IS NULL AND created_at < ?
        "#,
    )
    .bind(reporter)
    .bind(opponent)
    .bind(cutoff)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Season-mode twin of [`purge_freeform_key`]
async fn purge_season_key(
    tx: &mut Transaction<'_, Sqlite>,
    pairing_id: i64,
    slot: u8,
    cutoff: &str,
) -> Result<()> {
    sqlx::query(
        "DELETE FROM pending_reports WHERE pairing_id = ? AND game_slot = ? AND created_at < ?",
    )
    .bind(pairing_id)
    .bind(slot as i64)
    .bind(cutoff)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlement_averages_identical_wins() {
        // Both games won by player1 from equal ratings at K=25: each game
        // is worth 12.5, and the average of two identical results is the
        // single-game result.
        let s = settle_scores(25.0, 1380.0, 1380.0, [1.0, 1.0]);
        assert!((s.rating1 - 1392.5).abs() < 1e-9);
        assert!((s.rating2 - 1367.5).abs() < 1e-9);
        assert_eq!((s.wins1, s.losses1, s.draws), (2, 0, 0));
    }

    #[test]
    fn settlement_split_results_cancel_out() {
        let s = settle_scores(25.0, 1380.0, 1380.0, [1.0, 0.0]);
        assert!((s.rating1 - 1380.0).abs() < 1e-9);
        assert!((s.rating2 - 1380.0).abs() < 1e-9);
        assert_eq!((s.wins1, s.losses1, s.draws), (1, 1, 0));
    }

    #[test]
    fn settlement_tallies_come_from_scores_not_reporters() {
        let s = settle_scores(25.0, 1500.0, 1300.0, [0.0, 0.5]);
        assert_eq!((s.wins1, s.losses1, s.draws), (0, 1, 1));
    }

    #[test]
    fn settlement_games_rated_from_same_start() {
        // A win then a draw must not cascade: the draw is rated from the
        // pre-settlement ratings, not from the post-win ratings.
        let k = 25.0;
        let (r1, r2) = (1400.0, 1400.0);
        let s = settle_scores(k, r1, r2, [1.0, 0.5]);
        let (g1_r1, g1_r2) = crate::rating::rate_pair(k, r1, r2, 1.0);
        let (g2_r1, g2_r2) = crate::rating::rate_pair(k, r1, r2, 0.5);
        assert!((s.rating1 - (g1_r1 + g2_r1) / 2.0).abs() < 1e-9);
        assert!((s.rating2 - (g1_r2 + g2_r2) / 2.0).abs() < 1e-9);
    }
}
