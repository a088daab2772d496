//! Database models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: String,
    pub rating: f64,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub signed_up: bool,
}

impl Player {
    pub fn games(&self) -> i64 {
        self.wins + self.losses + self.draws
    }

    /// Win rate over decisive games, if any were played
    pub fn win_rate(&self) -> Option<f64> {
        let decisive = self.wins + self.losses;
        if decisive > 0 {
            Some(self.wins as f64 / decisive as f64 * 100.0)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PendingReport {
    pub id: i64,
    pub reporter_id: String,
    pub opponent_id: String,
    pub pairing_id: Option<i64>,
    pub game_slot: Option<i64>,
    pub claim: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pairing {
    pub id: i64,
    pub season_number: i64,
    pub group_name: String,
    pub player1_id: String,
    pub player2_id: String,
    pub result1: Option<f64>,
    pub result2: Option<f64>,
}

impl Pairing {
    /// Score stored in the given game slot (1 or 2), if filled
    pub fn slot(&self, game_slot: u8) -> Option<f64> {
        match game_slot {
            1 => self.result1,
            2 => self.result2,
            _ => None,
        }
    }

    pub fn both_slots_filled(&self) -> bool {
        self.result1.is_some() && self.result2.is_some()
    }

    /// Whether the given player sits on the player1 side
    pub fn is_player1(&self, player_id: &str) -> bool {
        self.player1_id == player_id
    }

    /// The other side of the pairing, if the given player is part of it
    pub fn opponent_of(&self, player_id: &str) -> Option<&str> {
        if self.player1_id == player_id {
            Some(&self.player2_id)
        } else if self.player2_id == player_id {
            Some(&self.player1_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Season {
    pub season_number: i64,
    pub active: bool,
}
