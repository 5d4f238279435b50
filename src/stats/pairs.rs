//! Pair co-occurrence aggregation.

use std::collections::BTreeMap;

use crate::types::{DrawRecord, PairStat};

/// One `PairStat` per unordered pair that appeared together at least once.
pub fn aggregate(draws: &[&DrawRecord]) -> BTreeMap<(u8, u8), PairStat> {
    let total = draws.len();
    let mut pairs: BTreeMap<(u8, u8), PairStat> = BTreeMap::new();

    for draw in draws {
        let nums = draw.numbers();
        for i in 0..nums.len() {
            for j in (i + 1)..nums.len() {
                // mains are stored sorted, so nums[i] < nums[j]
                let key = (nums[i], nums[j]);
                let entry = pairs.entry(key).or_insert_with(|| PairStat {
                    first: key.0,
                    second: key.1,
                    joint_count: 0,
                    pair_score: 0.0,
                    last_round_together: 0,
                });
                entry.joint_count += 1;
                entry.last_round_together = entry.last_round_together.max(draw.round());
            }
        }
    }

    if total > 0 {
        for pair in pairs.values_mut() {
            pair.pair_score = pair.joint_count as f64 / total as f64 * 100.0;
        }
    }

    pairs
}
