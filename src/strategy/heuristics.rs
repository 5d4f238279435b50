//! Combination-mode strategy contributions.
//!
//! Each function mutates the running `ScoreMap`. Weights arrive already
//! jittered by the engine.

use rand::Rng;
use std::collections::BTreeSet;
use tracing::debug;

use super::{LuckyConfig, ScoreMap, ScoringConfig};
use crate::stats::StatisticsSnapshot;
use crate::types::{
    all_numbers, is_odd, zone_of, NumberStat, MAX_NUMBER, MIN_NUMBER, PICK_COUNT, ZONE_COUNT,
};

/// Multiplier drawn from U[1 - spread, 1 + spread]; exactly 1 when the
/// spread is zero, without touching the rng.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    if spread <= 0.0 {
        1.0
    } else {
        rng.gen_range((1.0 - spread)..=(1.0 + spread))
    }
}

/// Add `field(stat) × weight × jitter` for every number.
pub fn stat_weighted<R, F>(
    map: &mut ScoreMap,
    snapshot: &StatisticsSnapshot,
    weight: f64,
    score_jitter: f64,
    rng: &mut R,
    field: F,
) where
    R: Rng + ?Sized,
    F: Fn(&NumberStat) -> f64,
{
    for n in all_numbers() {
        let value = field(&snapshot.number(n));
        map.add(n, value * weight * jitter(rng, score_jitter));
    }
}

/// Boost the strongest partners of the current leaders.
pub fn pair_affinity(
    map: &mut ScoreMap,
    snapshot: &StatisticsSnapshot,
    config: &ScoringConfig,
    weight: f64,
) {
    let anchors: Vec<u8> = map
        .top(config.pair_anchor_count)
        .into_iter()
        .filter(|&n| map.get(n) > 0.0)
        .collect();

    if anchors.is_empty() {
        let pairs = snapshot.top_pairs(config.fallback_pairs);
        debug!(pairs = pairs.len(), "Pair affinity without anchors, boosting top pairs");
        for pair in pairs {
            let bonus = pair.pair_score * weight;
            map.add(pair.first, bonus);
            map.add(pair.second, bonus);
        }
        return;
    }

    // collect first so every anchor sees the same map
    let mut boosts = Vec::new();
    for &anchor in &anchors {
        for (partner, pair) in snapshot.partners_of(anchor, config.pair_partners) {
            boosts.push((partner, pair.pair_score * weight));
        }
    }
    for (n, bonus) in boosts {
        map.add(n, bonus);
    }
}

/// Favour the parity under-represented in the current top six.
pub fn parity_balance(map: &mut ScoreMap, bonus: f64) {
    let odd = map.top(PICK_COUNT).into_iter().filter(|&n| is_odd(n)).count();
    let even = PICK_COUNT - odd;
    let (boost_odd, boost_even) = match odd.cmp(&even) {
        std::cmp::Ordering::Less => (true, false),
        std::cmp::Ordering::Greater => (false, true),
        std::cmp::Ordering::Equal => (true, true),
    };
    for n in all_numbers() {
        if (is_odd(n) && boost_odd) || (!is_odd(n) && boost_even) {
            map.add(n, bonus);
        }
    }
}

/// Favour zones missing from the current top six.
pub fn zone_spread(map: &mut ScoreMap, bonus: f64) {
    let mut covered = [false; ZONE_COUNT];
    for n in map.top(PICK_COUNT) {
        covered[zone_of(n)] = true;
    }
    let none_missing = covered.iter().all(|&c| c);
    for n in all_numbers() {
        if none_missing || !covered[zone_of(n)] {
            map.add(n, bonus);
        }
    }
}

/// Random "lucky" pool. Deliberately irreproducible unless the rng is seeded.
pub fn lucky_numbers<R: Rng + ?Sized>(
    map: &mut ScoreMap,
    config: &LuckyConfig,
    weight: f64,
    rng: &mut R,
) {
    let lo = config.pool_min.min(config.pool_max);
    let hi = config.pool_min.max(config.pool_max);
    let draws = rng.gen_range(lo..=hi);

    let mut pool = BTreeSet::new();
    for _ in 0..draws {
        pool.insert(rng.gen_range(MIN_NUMBER..=MAX_NUMBER));
    }
    for fav in &config.favourites {
        if rng.gen::<f64>() < fav.probability {
            pool.insert(fav.number);
        }
    }

    let bonus = (config.base_bonus + rng.gen::<f64>() * config.bonus_spread) * weight;
    for &n in &pool {
        map.add(n, bonus * rng.gen_range(0.9..=1.1));
    }
    debug!(pool = ?pool, "Lucky numbers drawn");
}

/// Penalise members of each regular sequence; overlaps are penalised once
/// per sequence.
pub fn visual_patterns(map: &mut ScoreMap, patterns: &[Vec<u8>], penalty: f64) {
    for pattern in patterns {
        for &n in pattern {
            map.add(n, -penalty);
        }
    }
}
