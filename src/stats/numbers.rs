//! Per-number aggregation.

use std::collections::BTreeMap;

use super::StatisticsConfig;
use crate::types::{all_numbers, is_odd, last_digit, DrawRecord, NumberStat, MAX_NUMBER};

/// Neutral trend score reported while the history is shorter than the window.
pub const NEUTRAL_TREND: f64 = 50.0;

/// Build one `NumberStat` per number from draws sorted by ascending round.
pub fn aggregate(
    draws: &[&DrawRecord],
    current_round: u32,
    config: &StatisticsConfig,
) -> BTreeMap<u8, NumberStat> {
    let slots = MAX_NUMBER as usize + 1;
    let mut counts = vec![0u32; slots];
    let mut last_seen = vec![0u32; slots];

    for draw in draws {
        for &n in draw.numbers() {
            counts[n as usize] += 1;
            last_seen[n as usize] = last_seen[n as usize].max(draw.round());
        }
    }

    let trend = trend_scores(draws, config.trend_window);
    let total = draws.len();

    all_numbers()
        .map(|n| {
            let idx = n as usize;
            let count = counts[idx];
            let gap = current_round.saturating_sub(last_seen[idx]);
            let popularity = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            let stat = NumberStat {
                number: n,
                appearance_count: count,
                last_round_seen: last_seen[idx],
                gap_since_last_seen: gap,
                popularity_score: popularity,
                neglect_score: 2.0 * gap as f64,
                trend_score: trend[idx],
                avoidance_score: config.avoidance.score_for(n),
                is_odd: is_odd(n),
                last_digit: last_digit(n),
            };
            (n, stat)
        })
        .collect()
}

/// Linear-decay recency score per number, indexed by number.
fn trend_scores(draws: &[&DrawRecord], window: usize) -> Vec<f64> {
    let slots = MAX_NUMBER as usize + 1;
    let window = window.max(1);
    if draws.len() < window {
        return vec![NEUTRAL_TREND; slots];
    }

    let w = window as f64;
    // sum over k of (W - k) / W
    let total_weight = (w + 1.0) / 2.0;
    let mut sums = vec![0.0f64; slots];

    for (age, draw) in draws.iter().rev().take(window).enumerate() {
        let weight = (w - age as f64) / w;
        for &n in draw.numbers() {
            sums[n as usize] += weight;
        }
    }

    sums.into_iter()
        .map(|s| (s / total_weight * 100.0).clamp(0.0, 100.0))
        .collect()
}
