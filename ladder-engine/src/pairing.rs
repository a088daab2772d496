//! Season pairing generation
//!
//! Signed-up players are grouped by tier, oversized tier groups are split
//! into randomized subgroups of bounded size, and every subgroup becomes a
//! full round-robin of two-game pairings. Planning is pure; only
//! [`write_pairings`] touches the database, and it runs inside the
//! season-start transaction so a failed activation leaves no rows behind.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use sqlx::SqliteConnection;

use ladder_common::config::LadderConfig;
use ladder_common::{Error, Result};

/// One subgroup: its label and its members
#[derive(Debug, Clone, Serialize)]
pub struct SubgroupPlan {
    /// Tier name, with a `-N` suffix when the tier was split
    pub name: String,
    pub members: Vec<String>,
}

impl SubgroupPlan {
    /// Number of round-robin pairings this subgroup produces: C(k, 2)
    pub fn pair_count(&self) -> usize {
        let k = self.members.len();
        k * (k.saturating_sub(1)) / 2
    }
}

/// Complete pairing plan for a season
#[derive(Debug, Clone, Serialize)]
pub struct PairingPlan {
    pub groups: Vec<SubgroupPlan>,
    /// Signed-up players whose rating matched no tier; excluded from
    /// pairing generation but not an error.
    pub unmatched: Vec<String>,
}

impl PairingPlan {
    pub fn pair_count(&self) -> usize {
        self.groups.iter().map(|g| g.pair_count()).sum()
    }
}

/// Build the pairing plan for the given signed-up players
///
/// Fails with `EmptySignupList` when nobody signed up and `NoTierMatch`
/// when nobody lands in any tier.
pub fn plan_pairings(
    players: &[(String, f64)],
    config: &LadderConfig,
    rng: &mut impl Rng,
) -> Result<PairingPlan> {
    if players.is_empty() {
        return Err(Error::EmptySignupList);
    }

    // Tier table is sorted by descending min; the first containing tier
    // wins.
    let mut by_tier: Vec<(String, Vec<String>)> = config
        .tiers
        .iter()
        .map(|t| (t.name.clone(), Vec::new()))
        .collect();
    let mut unmatched = Vec::new();

    for (id, rating) in players {
        match config.tiers.iter().position(|t| t.contains(*rating)) {
            Some(i) => by_tier[i].1.push(id.clone()),
            None => unmatched.push(id.clone()),
        }
    }

    if by_tier.iter().all(|(_, members)| members.is_empty()) {
        return Err(Error::NoTierMatch);
    }

    let mut groups = Vec::new();
    for (tier_name, mut members) in by_tier {
        if members.is_empty() {
            continue;
        }
        if members.len() <= config.pairing.max_group_size {
            groups.push(SubgroupPlan {
                name: tier_name,
                members,
            });
        } else {
            members.shuffle(rng);
            let chunks = split_balanced(members, config.pairing.max_group_size);
            for (i, chunk) in chunks.into_iter().enumerate() {
                groups.push(SubgroupPlan {
                    name: format!("{}-{}", tier_name, i + 1),
                    members: chunk,
                });
            }
        }
    }

    Ok(PairingPlan { groups, unmatched })
}

/// Split members into the fewest subgroups that respect `max_size`, with
/// sizes as even as possible so no subgroup falls below the minimum.
fn split_balanced(members: Vec<String>, max_size: usize) -> Vec<Vec<String>> {
    let n = members.len();
    let group_count = n.div_ceil(max_size);
    let base = n / group_count;
    let extra = n % group_count;

    let mut chunks = Vec::with_capacity(group_count);
    let mut iter = members.into_iter();
    for i in 0..group_count {
        let size = if i < extra { base + 1 } else { base };
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}

/// Insert one pairing row with two empty game slots for every unique
/// unordered pair in every subgroup. Returns the number of rows written.
pub async fn write_pairings(
    conn: &mut SqliteConnection,
    season_number: i64,
    plan: &PairingPlan,
) -> Result<usize> {
    let mut created = 0;
    for group in &plan.groups {
        for (i, p1) in group.members.iter().enumerate() {
            for p2 in &group.members[i + 1..] {
                sqlx::query(
                    r#"
                    INSERT INTO pairings (season_number, group_name, player1_id, player2_id)
                    VALUES (?, ?, ?, ?)
                    "#,
                )
                .bind(season_number)
                .bind(&group.name)
                .bind(p1)
                .bind(p2)
                .execute(&mut *conn)
                .await?;
                created += 1;
            }
        }
    }
    Ok(created)
}
