use rand::rngs::StdRng;
use rand::SeedableRng;

use ladder_common::config::{LadderConfig, TierRange};
use ladder_common::Error;

use crate::pairing::plan_pairings;

fn config_with_tiers(tiers: Vec<TierRange>) -> LadderConfig {
    let mut config = LadderConfig {
        tiers,
        ..LadderConfig::default()
    };
    config.validate().unwrap();
    config
}

fn one_open_tier() -> LadderConfig {
    config_with_tiers(vec![TierRange {
        name: "Open".to_string(),
        min: 0.0,
        max: 3000.0,
    }])
}

fn players(n: usize) -> Vec<(String, f64)> {
    (0..n).map(|i| (format!("p{i}"), 1380.0)).collect()
}

#[test]
fn five_players_one_tier_make_ten_pairings() {
    let plan = plan_pairings(&players(5), &one_open_tier(), &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(plan.groups.len(), 1);
    assert_eq!(plan.groups[0].name, "Open");
    assert_eq!(plan.pair_count(), 10);
}

#[test]
fn empty_signup_list_rejected() {
    let err = plan_pairings(&[], &one_open_tier(), &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert!(matches!(err, Error::EmptySignupList));
}

#[test]
fn no_tier_match_rejected() {
    let config = config_with_tiers(vec![TierRange {
        name: "Elite".to_string(),
        min: 2000.0,
        max: 3000.0,
    }]);
    let err = plan_pairings(&players(4), &config, &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert!(matches!(err, Error::NoTierMatch));
}

#[test]
fn unmatched_players_are_warned_not_fatal() {
    let config = config_with_tiers(vec![TierRange {
        name: "High".to_string(),
        min: 1400.0,
        max: 3000.0,
    }]);
    let mut pool = players(3);
    pool.push(("strong".to_string(), 1500.0));
    pool.push(("stronger".to_string(), 1600.0));

    let plan = plan_pairings(&pool, &config, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(plan.groups.len(), 1);
    assert_eq!(plan.groups[0].members.len(), 2);
    assert_eq!(plan.unmatched.len(), 3);
    assert!(plan.unmatched.contains(&"p0".to_string()));
}

#[test]
fn group_at_threshold_stays_whole() {
    let plan = plan_pairings(&players(7), &one_open_tier(), &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(plan.groups.len(), 1);
    assert_eq!(plan.groups[0].name, "Open");
    assert_eq!(plan.pair_count(), 21);
}

#[test]
fn oversized_group_splits_with_bounded_sizes() {
    for n in 8..=40 {
        let plan =
            plan_pairings(&players(n), &one_open_tier(), &mut StdRng::seed_from_u64(n as u64))
                .unwrap();
        assert!(plan.groups.len() > 1, "n={n} did not split");
        for group in &plan.groups {
            assert!(
                group.members.len() >= 4 && group.members.len() <= 7,
                "n={n}: subgroup '{}' has {} members",
                group.name,
                group.members.len()
            );
            assert!(group.name.starts_with("Open-"));
        }
    }
}

#[test]
fn split_partitions_every_player_exactly_once() {
    let pool = players(23);
    let plan = plan_pairings(&pool, &one_open_tier(), &mut StdRng::seed_from_u64(7)).unwrap();

    let mut seen: Vec<&String> = plan.groups.iter().flat_map(|g| g.members.iter()).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), pool.len(), "players lost or duplicated by the split");
}

#[test]
fn first_matching_tier_wins_for_overlapping_ranges() {
    let config = config_with_tiers(vec![
        TierRange {
            name: "Upper".to_string(),
            min: 1350.0,
            max: 3000.0,
        },
        TierRange {
            name: "Lower".to_string(),
            min: 0.0,
            max: 1400.0,
        },
    ]);
    let plan = plan_pairings(&players(4), &config, &mut StdRng::seed_from_u64(1)).unwrap();
    // 1380 sits in both ranges; the higher tier is scanned first
    assert_eq!(plan.groups.len(), 1);
    assert_eq!(plan.groups[0].name, "Upper");
}

#[test]
fn two_player_tier_pairs_once() {
    let plan = plan_pairings(&players(2), &one_open_tier(), &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(plan.pair_count(), 1);
}
