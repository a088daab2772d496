//! Rating calculation
//!
//! Pure functions, no I/O. The logistic expected-score model with a fixed
//! K-factor: a 400-point rating gap gives the stronger side a 10:1
//! expected-score edge.

/// Expected score for a player rated `a` against a player rated `b`
///
/// Always in (0, 1), and `expected_score(a, b) + expected_score(b, a) == 1`.
pub fn expected_score(a: f64, b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((b - a) / 400.0))
}

/// Updated ratings for both players of a single game
///
/// `score_a` is player A's actual score: 1.0 for a win, 0.5 for a draw,
/// 0.0 for a loss. Both deltas are computed from the same pre-game rating
/// pair, so a decisive result is exactly zero-sum.
pub fn rate_pair(k: f64, rating_a: f64, rating_b: f64, score_a: f64) -> (f64, f64) {
    let expected_a = expected_score(rating_a, rating_b);
    let expected_b = expected_score(rating_b, rating_a);
    let score_b = 1.0 - score_a;

    (
        rating_a + k * (score_a - expected_a),
        rating_b + k * (score_b - expected_b),
    )
}
