//! Constrained selection of the final six numbers.
//!
//! Two branches: deterministic plans take the top six by score; everything
//! else samples from a shuffled pool at the top of the ranking, honouring
//! the active constraints on a best-effort basis. Every loop is bounded
//! and selection never fails.

pub mod adjust;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::strategy::{Constraints, ScoreMap};
use crate::types::{
    all_numbers, last_digit, Recommendation, MAX_NUMBER, MIN_NUMBER, PICK_COUNT,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Candidate pool bounds (inclusive) taken from the top of the ranking.
    pub pool_min: usize,
    pub pool_max: usize,
    /// Uniform random retries after the pool walk.
    pub fill_attempts: usize,
    /// Most numbers allowed to share one last digit.
    pub last_digit_cap: usize,
    /// Most numbers allowed in one zone under zone-spread.
    pub zone_cap: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            pool_min: 12,
            pool_max: 17,
            fill_attempts: 100,
            last_digit_cap: 2,
            zone_cap: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

pub struct Selector<'a> {
    config: &'a SelectionConfig,
}

impl<'a> Selector<'a> {
    pub fn new(config: &'a SelectionConfig) -> Self {
        Self { config }
    }

    pub fn select<R: Rng + ?Sized>(
        &self,
        scores: &ScoreMap,
        constraints: Constraints,
        rng: &mut R,
    ) -> Recommendation {
        let picks = if constraints.deterministic {
            scores.top(PICK_COUNT).into_iter().collect()
        } else {
            self.sample(scores, constraints, rng)
        };
        debug!(picks = ?picks, deterministic = constraints.deterministic, "Selection complete");
        finish(&picks)
    }

    fn sample<R: Rng + ?Sized>(
        &self,
        scores: &ScoreMap,
        constraints: Constraints,
        rng: &mut R,
    ) -> BTreeSet<u8> {
        let ranked = scores.ranked();
        let lo = self.config.pool_min.min(self.config.pool_max).max(PICK_COUNT);
        let hi = self.config.pool_max.max(lo);
        let pool_size = rng.gen_range(lo..=hi).min(ranked.len());

        let mut pool = ranked[..pool_size].to_vec();
        pool.shuffle(rng);

        let mut picks = BTreeSet::new();

        // pool walk
        for n in pool {
            if picks.len() >= PICK_COUNT {
                break;
            }
            if !self.violates(&picks, n, constraints) {
                picks.insert(n);
            }
        }

        // uniform retries, still constrained
        let mut attempts = 0;
        while picks.len() < PICK_COUNT && attempts < self.config.fill_attempts {
            attempts += 1;
            let n = rng.gen_range(MIN_NUMBER..=MAX_NUMBER);
            if !picks.contains(&n) && !self.violates(&picks, n, constraints) {
                picks.insert(n);
            }
        }

        // unconstrained top-up
        if picks.len() < PICK_COUNT {
            debug!(have = picks.len(), attempts, "Constraints unsatisfied, topping up");
            let mut rest: Vec<u8> = all_numbers().filter(|n| !picks.contains(n)).collect();
            rest.shuffle(rng);
            let missing = PICK_COUNT - picks.len();
            picks.extend(rest.into_iter().take(missing));
        }

        if constraints.parity_balance {
            picks = adjust::balance_parity(&picks, rng);
        }
        if constraints.zone_spread {
            picks = adjust::spread_zones(
                &picks,
                self.config.zone_cap,
                constraints.parity_balance,
                rng,
            );
        }

        picks
    }

    /// Whether adding `n` breaks an active pool-walk constraint.
    fn violates(&self, picks: &BTreeSet<u8>, n: u8, constraints: Constraints) -> bool {
        if constraints.avoid_adjacent
            && (picks.contains(&n.saturating_sub(1)) || picks.contains(&(n + 1)))
        {
            return true;
        }
        if constraints.last_digit_diversity {
            let same = picks
                .iter()
                .filter(|&&p| last_digit(p) == last_digit(n))
                .count();
            if same >= self.config.last_digit_cap {
                return true;
            }
        }
        false
    }
}

/// Turn an exactly-six working set into a recommendation.
fn finish(picks: &BTreeSet<u8>) -> Recommendation {
    let mut arr = [0u8; PICK_COUNT];
    for (slot, &n) in arr.iter_mut().zip(picks.iter()) {
        *slot = n;
    }
    Recommendation::from_validated(arr)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
