//! Common error types for the ladder services
//!
//! Every domain error is recoverable by the caller and carries a message
//! naming the corrective action where one exists.

use thiserror::Error;

/// Common result type for ladder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds shared across the ladder services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Duplicate registration
    #[error("Player {0} is already registered")]
    AlreadyExists(String),

    /// Operation on a player with no record
    #[error("Player {0} is not registered; register first")]
    NotRegistered(String),

    /// A player reported a match against themself
    #[error("You cannot report a match against yourself")]
    SelfReport,

    /// Season report with no matching pairing row
    #[error("No season pairing found for these players and game")]
    NoPairing,

    /// Duplicate pending report by the same party
    #[error("You already reported this match; wait for your opponent to confirm")]
    AlreadyReported,

    /// Counter-claim does not complement the pending claim
    #[error("Results do not match; report the opposite result")]
    Conflict,

    /// Report against a game slot that already holds a result
    #[error("That game has already been settled")]
    AlreadySettled,

    /// Lifecycle operation requiring an active season
    #[error("No season is currently active")]
    NoActiveSeason,

    /// Lifecycle operation requiring an inactive season
    #[error("A season is already active")]
    SeasonAlreadyActive,

    /// Pairing generation with nobody signed up
    #[error("No players are signed up for the season")]
    EmptySignupList,

    /// Pairing generation where no signed-up player matches any tier
    #[error("No signed-up player matches any configured tier")]
    NoTierMatch,

    /// Query for a nonexistent season, group, or tier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Stable machine-readable name for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Database(_) => "database",
            Error::Io(_) => "io",
            Error::Config(_) => "config",
            Error::AlreadyExists(_) => "already_exists",
            Error::NotRegistered(_) => "not_registered",
            Error::SelfReport => "self_report",
            Error::NoPairing => "no_pairing",
            Error::AlreadyReported => "already_reported",
            Error::Conflict => "conflict",
            Error::AlreadySettled => "already_settled",
            Error::NoActiveSeason => "no_active_season",
            Error::SeasonAlreadyActive => "season_already_active",
            Error::EmptySignupList => "empty_signup_list",
            Error::NoTierMatch => "no_tier_match",
            Error::NotFound(_) => "not_found",
            Error::InvalidInput(_) => "invalid_input",
        }
    }
}
