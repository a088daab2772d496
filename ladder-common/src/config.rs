//! Configuration loading
//!
//! All tunables of the ladder engine live in one TOML file: the rating
//! baseline and K-factor, the pending-report TTL and sweep interval, the
//! pairing group bounds, and the ordered tier table. The engine receives
//! this as injected data; nothing here is a compile-time constant.
//!
//! Config file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `LADDER_CONFIG` environment variable
//! 3. OS-dependent default path (`<config dir>/ladder/config.toml`)
//! 4. Compiled defaults (no file present)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Rating engine parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating assigned to newly registered players
    pub baseline: f64,
    /// K-factor applied to every rating update
    pub k_factor: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            baseline: 1380.0,
            k_factor: 25.0,
        }
    }
}

/// Pending-report lifetime parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Minutes before an unconfirmed report is treated as absent
    pub ttl_minutes: i64,
    /// Minutes between physical purges of expired reports
    pub sweep_interval_minutes: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            sweep_interval_minutes: 30,
        }
    }
}

/// Season pairing group bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// Largest tier group paired as a single round-robin
    pub max_group_size: usize,
    /// Smallest subgroup a split is allowed to produce
    pub min_subgroup_size: usize,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            max_group_size: 7,
            min_subgroup_size: 4,
        }
    }
}

/// One tier of the skill ladder: a named inclusive rating range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierRange {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl TierRange {
    pub fn contains(&self, rating: f64) -> bool {
        rating >= self.min && rating <= self.max
    }
}

/// HTTP server parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the HTTP API
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5730".to_string(),
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    pub rating: RatingConfig,
    pub reports: ReportConfig,
    pub pairing: PairingConfig,
    pub server: ServerConfig,
    /// Tier table; kept sorted by descending `min` after validation so the
    /// first containing tier wins.
    pub tiers: Vec<TierRange>,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            rating: RatingConfig::default(),
            reports: ReportConfig::default(),
            pairing: PairingConfig::default(),
            server: ServerConfig::default(),
            tiers: default_tiers(),
        }
    }
}

/// Shipped tier table; the baseline rating of 1380 lands in Challenger.
fn default_tiers() -> Vec<TierRange> {
    vec![
        TierRange {
            name: "Champion".to_string(),
            min: 1550.0,
            max: 3000.0,
        },
        TierRange {
            name: "Contender".to_string(),
            min: 1450.0,
            max: 1549.0,
        },
        TierRange {
            name: "Challenger".to_string(),
            min: 1350.0,
            max: 1449.0,
        },
        TierRange {
            name: "Rookie".to_string(),
            min: 0.0,
            max: 1349.0,
        },
    ]
}

impl LadderConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: LadderConfig = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path, or from the default path
    /// if one exists, or fall back to compiled defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        match resolved {
            Some(p) => {
                let contents = std::fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", p.display(), e))
                })?;
                Self::from_toml(&contents)
            }
            None => {
                let mut config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Validate tunables and sort the tier table by descending `min`
    pub fn validate(&mut self) -> Result<()> {
        if !self.rating.baseline.is_finite() {
            return Err(Error::Config("rating.baseline must be finite".into()));
        }
        if !(self.rating.k_factor.is_finite() && self.rating.k_factor > 0.0) {
            return Err(Error::Config("rating.k_factor must be positive".into()));
        }
        if self.reports.ttl_minutes <= 0 {
            return Err(Error::Config("reports.ttl_minutes must be positive".into()));
        }
        if self.reports.sweep_interval_minutes == 0 {
            return Err(Error::Config(
                "reports.sweep_interval_minutes must be positive".into(),
            ));
        }
        if self.pairing.min_subgroup_size < 2 {
            return Err(Error::Config(
                "pairing.min_subgroup_size must be at least 2".into(),
            ));
        }
        if self.pairing.max_group_size < self.pairing.min_subgroup_size {
            return Err(Error::Config(
                "pairing.max_group_size must be >= pairing.min_subgroup_size".into(),
            ));
        }
        for tier in &self.tiers {
            if tier.name.trim().is_empty() {
                return Err(Error::Config("tier with empty name".into()));
            }
            if tier.min > tier.max {
                return Err(Error::Config(format!(
                    "tier '{}' has min > max",
                    tier.name
                )));
            }
        }
        // First containing tier wins, scanning from the highest range down
        self.tiers
            .sort_by(|a, b| b.min.partial_cmp(&a.min).unwrap_or(std::cmp::Ordering::Equal));
        Ok(())
    }

    /// Tier containing the given rating, if any
    pub fn tier_for(&self, rating: f64) -> Option<&TierRange> {
        self.tiers.iter().find(|t| t.contains(rating))
    }

    /// Tier with the given name, case-insensitive
    pub fn tier_named(&self, name: &str) -> Option<&TierRange> {
        self.tiers
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ladder").join("config.toml"))
}

/// OS-dependent default data folder (holds ladder.db)
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ladder"))
        .unwrap_or_else(|| PathBuf::from("./ladder_data"))
}
