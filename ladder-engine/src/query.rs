//! Read views over the store: player stats, the leaderboard, and pairing
//! schedules. Nothing here mutates.

use serde::Serialize;
use sqlx::SqlitePool;

use ladder_common::config::LadderConfig;
use ladder_common::db::models::Pairing;
use ladder_common::{Error, Result};

use crate::season::active_season;
use crate::store;

/// Leaderboard length bounds; requests outside them are clamped
const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;
const MAX_LEADERBOARD_LIMIT: i64 = 25;

/// A player's record with their ladder position
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStatsView {
    pub player_id: String,
    pub rating: f64,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub games: i64,
    /// Percentage of decisive games won, absent before the first decisive
    /// game
    pub win_rate: Option<f64>,
    pub rank: i64,
    pub total_players: i64,
    pub signed_up: bool,
}

/// Stats for a single player
pub async fn player_stats(db: &SqlitePool, player_id: &str) -> Result<PlayerStatsView> {
    let player = store::require_player(db, player_id).await?;

    let higher: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players WHERE rating > ?")
        .bind(player.rating)
        .fetch_one(db)
        .await?;
    let total_players: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
        .fetch_one(db)
        .await?;

    Ok(PlayerStatsView {
        games: player.games(),
        win_rate: player.win_rate(),
        rank: higher + 1,
        total_players,
        player_id: player.id,
        rating: player.rating,
        wins: player.wins,
        losses: player.losses,
        draws: player.draws,
        signed_up: player.signed_up,
    })
}

/// One leaderboard row
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub player_id: String,
    pub rating: f64,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub win_rate: Option<f64>,
}

/// Top players by rating, optionally restricted to one tier's rating range
pub async fn leaderboard(
    db: &SqlitePool,
    config: &LadderConfig,
    limit: Option<i64>,
    tier: Option<&str>,
) -> Result<Vec<LeaderboardEntry>> {
    let limit = limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);

    let range = match tier {
        Some(name) => {
            let tier = config
                .tier_named(name)
                .ok_or_else(|| Error::NotFound(format!("tier '{}'", name)))?;
            Some((tier.min, tier.max))
        }
        None => None,
    };

    let rows: Vec<(String, f64, i64, i64, i64)> = match range {
        Some((min, max)) => {
            sqlx::query_as(
                r#"
                SELECT id, rating, wins, losses, draws FROM players
                WHERE rating >= ? AND rating <= ?
                ORDER BY rating DESC, id ASC
                LIMIT ?
                "#,
            )
            .bind(min)
            .bind(max)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT id, rating, wins, losses, draws FROM players
                ORDER BY rating DESC, id ASC
                LIMIT ?
                "#,
            )
            .bind(limit)
            .fetch_all(db)
            .await?
        }
    };

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, (player_id, rating, wins, losses, draws))| {
            let decisive = wins + losses;
            LeaderboardEntry {
                rank: i as i64 + 1,
                player_id,
                rating,
                wins,
                losses,
                draws,
                win_rate: if decisive > 0 {
                    Some(wins as f64 / decisive as f64 * 100.0)
                } else {
                    None
                },
            }
        })
        .collect())
}

/// Pairing schedule for a season, optionally narrowed to one group
#[derive(Debug, Clone, Serialize)]
pub struct PairingsView {
    pub season_number: i64,
    pub group_name: Option<String>,
    pub pairings: Vec<Pairing>,
}

/// Look up pairings
///
/// Defaults follow the reporting flow: no season means the active one, and
/// no group with a player given resolves that player's own group.
pub async fn pairings(
    db: &SqlitePool,
    season: Option<i64>,
    group: Option<&str>,
    player: Option<&str>,
) -> Result<PairingsView> {
    let season_number = match season {
        Some(n) => {
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seasons WHERE season_number = ?")
                .bind(n)
                .fetch_one(db)
                .await?;
            if exists == 0 {
                return Err(Error::NotFound(format!("season {}", n)));
            }
            n
        }
        None => active_season(db).await?.ok_or(Error::NoActiveSeason)?,
    };

    let group_name = match (group, player) {
        (Some(wanted), _) => Some(resolve_group(db, season_number, wanted).await?),
        (None, Some(player_id)) => {
            let own: Option<String> = sqlx::query_scalar(
                r#"
                SELECT group_name FROM pairings
                WHERE season_number = ? AND (player1_id = ? OR player2_id = ?)
                LIMIT 1
                "#,
            )
            .bind(season_number)
            .bind(player_id)
            .bind(player_id)
            .fetch_optional(db)
            .await?;
            Some(own.ok_or_else(|| {
                Error::NotFound(format!("no group for {} in season {}", player_id, season_number))
            })?)
        }
        (None, None) => None,
    };

    let pairings: Vec<Pairing> = match &group_name {
        Some(name) => {
            sqlx::query_as(
                r#"
                SELECT id, season_number, group_name, player1_id, player2_id, result1, result2
                FROM pairings
                WHERE season_number = ? AND LOWER(group_name) = LOWER(?)
                ORDER BY id
                "#,
            )
            .bind(season_number)
            .bind(name)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT id, season_number, group_name, player1_id, player2_id, result1, result2
                FROM pairings
                WHERE season_number = ?
                ORDER BY group_name, id
                "#,
            )
            .bind(season_number)
            .fetch_all(db)
            .await?
        }
    };

    Ok(PairingsView {
        season_number,
        group_name,
        pairings,
    })
}

/// Validate a group name against the season's groups, suggesting close
/// names on a miss.
async fn resolve_group(db: &SqlitePool, season_number: i64, wanted: &str) -> Result<String> {
    let groups: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT group_name FROM pairings WHERE season_number = ? ORDER BY group_name",
    )
    .bind(season_number)
    .fetch_all(db)
    .await?;

    let needle = wanted.trim().to_lowercase();
    if let Some(exact) = groups.iter().find(|g| g.to_lowercase() == needle) {
        return Ok(exact.clone());
    }

    let suggestions: Vec<&String> = groups
        .iter()
        .filter(|g| g.to_lowercase().contains(&needle))
        .take(3)
        .collect();
    let mut message = format!("group '{}' in season {}", wanted, season_number);
    if !suggestions.is_empty() {
        let names: Vec<&str> = suggestions.iter().map(|s| s.as_str()).collect();
        message.push_str(&format!(" (did you mean: {}?)", names.join(", ")));
    }
    Err(Error::NotFound(message))
}
