//! Game result vocabulary shared by the reporting protocol and the rating
//! engine.
//!
//! Results travel on the wire as the single letters `w`, `l`, `d`, always
//! from the reporter's perspective. Pairing rows store the canonical
//! player1-perspective score instead (1.0 / 0.0 / 0.5).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A match result from one player's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "w")]
    Win,
    #[serde(rename = "l")]
    Loss,
    #[serde(rename = "d")]
    Draw,
}

impl GameResult {
    /// The result the opposing player must report for the two claims to
    /// agree: win mirrors loss, a draw mirrors itself.
    pub fn complement(self) -> GameResult {
        match self {
            GameResult::Win => GameResult::Loss,
            GameResult::Loss => GameResult::Win,
            GameResult::Draw => GameResult::Draw,
        }
    }

    /// Actual score for the claiming player: 1 for a win, 0 for a loss,
    /// 0.5 for a draw.
    pub fn score(self) -> f64 {
        match self {
            GameResult::Win => 1.0,
            GameResult::Loss => 0.0,
            GameResult::Draw => 0.5,
        }
    }

    /// Canonical player1-perspective score for a claim made by either side
    /// of a pairing.
    pub fn score_for_player1(self, reporter_is_player1: bool) -> f64 {
        if reporter_is_player1 {
            self.score()
        } else {
            self.complement().score()
        }
    }

    /// Wire letter for this result
    pub fn letter(self) -> &'static str {
        match self {
            GameResult::Win => "w",
            GameResult::Loss => "l",
            GameResult::Draw => "d",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl FromStr for GameResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "win" => Ok(GameResult::Win),
            "l" | "loss" => Ok(GameResult::Loss),
            "d" | "draw" => Ok(GameResult::Draw),
            other => Err(Error::InvalidInput(format!(
                "invalid result '{}'; use 'w', 'l', or 'd'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_mirrors_decisive_results() {
        assert_eq!(GameResult::Win.complement(), GameResult::Loss);
        assert_eq!(GameResult::Loss.complement(), GameResult::Win);
        assert_eq!(GameResult::Draw.complement(), GameResult::Draw);
    }

    #[test]
    fn score_for_player1_flips_for_player2() {
        // player2 claiming a win is a player1 loss
        assert_eq!(GameResult::Win.score_for_player1(true), 1.0);
        assert_eq!(GameResult::Win.score_for_player1(false), 0.0);
        assert_eq!(GameResult::Loss.score_for_player1(false), 1.0);
        assert_eq!(GameResult::Draw.score_for_player1(false), 0.5);
    }

    #[test]
    fn parses_wire_letters() {
        assert_eq!("w".parse::<GameResult>().unwrap(), GameResult::Win);
        assert_eq!("L".parse::<GameResult>().unwrap(), GameResult::Loss);
        assert_eq!("draw".parse::<GameResult>().unwrap(), GameResult::Draw);
        assert!("x".parse::<GameResult>().is_err());
    }

    #[test]
    fn letters_round_trip() {
        for r in [GameResult::Win, GameResult::Loss, GameResult::Draw] {
            assert_eq!(r.letter().parse::<GameResult>().unwrap(), r);
        }
    }
}
