//! Historical statistics.
//!
//! Builds the per-number and per-pair tables from a draw history. A
//! `StatisticsSnapshot` is immutable: refreshing means building a new one
//! from the full history and swapping it in, never patching rows.

pub mod numbers;
pub mod pairs;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::types::{all_numbers, last_digit, DrawRecord, LottoError, NumberStat, PairStat};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Number of most recent draws rewarded by the trend score.
    pub trend_window: usize,
    pub avoidance: AvoidanceTable,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            trend_window: 10,
            avoidance: AvoidanceTable::default(),
        }
    }
}

/// Static "commonly avoided numbers" lookup. Higher = more avoided by
/// other players. The contents are product data, so they live in config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AvoidanceTable {
    pub strong: Vec<u8>,
    pub strong_score: f64,
    pub mild_last_digits: Vec<u8>,
    pub mild_score: f64,
    pub favoured: Vec<u8>,
    pub favoured_score: f64,
    pub default_score: f64,
}

impl Default for AvoidanceTable {
    fn default() -> Self {
        Self {
            strong: vec![4, 13, 14, 24, 34, 44],
            strong_score: 80.0,
            mild_last_digits: vec![4, 0],
            mild_score: 60.0,
            favoured: vec![1, 3, 7, 8, 9],
            favoured_score: 20.0,
            default_score: 50.0,
        }
    }
}

impl AvoidanceTable {
    pub fn score_for(&self, n: u8) -> f64 {
        if self.strong.contains(&n) {
            self.strong_score
        } else if self.mild_last_digits.contains(&last_digit(n)) {
            self.mild_score
        } else if self.favoured.contains(&n) {
            self.favoured_score
        } else {
            self.default_score
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Complete, internally consistent statistics for one history.
#[derive(Debug, Clone)]
pub struct StatisticsSnapshot {
    numbers: BTreeMap<u8, NumberStat>,
    pairs: BTreeMap<(u8, u8), PairStat>,
    total_draws: usize,
    current_round: u32,
    avoidance: AvoidanceTable,
    built_at: DateTime<Utc>,
}

impl StatisticsSnapshot {
    /// Snapshot with no history: every number resolves to a zeroed row.
    pub fn empty(config: &StatisticsConfig) -> Self {
        Self {
            numbers: BTreeMap::new(),
            pairs: BTreeMap::new(),
            total_draws: 0,
            current_round: 0,
            avoidance: config.avoidance.clone(),
            built_at: Utc::now(),
        }
    }

    /// Aggregate `history`. `current_round` defaults to the highest round
    /// present. Rounds must be unique; input order does not matter.
    pub fn build(
        history: &[DrawRecord],
        current_round: Option<u32>,
        config: &StatisticsConfig,
    ) -> Result<Self, LottoError> {
        let mut seen = HashSet::with_capacity(history.len());
        for draw in history {
            if !seen.insert(draw.round()) {
                return Err(LottoError::InvalidDraw {
                    round: draw.round(),
                    message: "duplicate round in history".to_string(),
                });
            }
        }

        let mut ordered: Vec<&DrawRecord> = history.iter().collect();
        ordered.sort_by_key(|d| d.round());

        let latest = ordered.last().map(|d| d.round()).unwrap_or(0);
        let current_round = current_round.unwrap_or(latest).max(latest);

        let numbers = numbers::aggregate(&ordered, current_round, config);
        let pairs = pairs::aggregate(&ordered);

        debug!(
            draws = ordered.len(),
            current_round,
            pairs = pairs.len(),
            "Statistics snapshot built"
        );

        Ok(Self {
            numbers,
            pairs,
            total_draws: ordered.len(),
            current_round,
            avoidance: config.avoidance.clone(),
            built_at: Utc::now(),
        })
    }

    pub fn total_draws(&self) -> usize {
        self.total_draws
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn is_empty(&self) -> bool {
        self.total_draws == 0
    }

    /// Statistics for `n`, synthesised as a zeroed row when absent.
    pub fn number(&self, n: u8) -> Cow<'_, NumberStat> {
        match self.numbers.get(&n) {
            Some(stat) => Cow::Borrowed(stat),
            None => Cow::Owned(NumberStat::empty(n, self.avoidance.score_for(n))),
        }
    }

    /// One row per number 1..=45, ascending.
    pub fn all_numbers(&self) -> Vec<Cow<'_, NumberStat>> {
        all_numbers().map(|n| self.number(n)).collect()
    }

    pub fn pair(&self, a: u8, b: u8) -> Option<&PairStat> {
        let key = if a < b { (a, b) } else { (b, a) };
        self.pairs.get(&key)
    }

    pub fn pairs(&self) -> impl Iterator<Item = &PairStat> {
        self.pairs.values()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Strongest pairs by joint count; ties keep ascending pair order.
    pub fn top_pairs(&self, limit: usize) -> Vec<&PairStat> {
        let mut all: Vec<&PairStat> = self.pairs.values().collect();
        all.sort_by(|a, b| b.joint_count.cmp(&a.joint_count));
        all.truncate(limit);
        all
    }

    /// Up to `limit` partners of `n`, strongest first, ties by partner asc.
    pub fn partners_of(&self, n: u8, limit: usize) -> Vec<(u8, &PairStat)> {
        let mut partners: Vec<(u8, &PairStat)> = self
            .pairs
            .values()
            .filter_map(|p| p.partner_of(n).map(|partner| (partner, p)))
            .collect();
        partners.sort_by(|a, b| b.1.joint_count.cmp(&a.1.joint_count).then(a.0.cmp(&b.0)));
        partners.truncate(limit);
        partners
    }

    /// Most frequently drawn numbers.
    pub fn hottest(&self, limit: usize) -> Vec<NumberStat> {
        let mut rows: Vec<NumberStat> =
            self.all_numbers().into_iter().map(Cow::into_owned).collect();
        rows.sort_by(|a, b| {
            b.appearance_count
                .cmp(&a.appearance_count)
                .then(a.number.cmp(&b.number))
        });
        rows.truncate(limit);
        rows
    }

    /// Numbers absent for the longest time.
    pub fn coldest(&self, limit: usize) -> Vec<NumberStat> {
        let mut rows: Vec<NumberStat> =
            self.all_numbers().into_iter().map(Cow::into_owned).collect();
        rows.sort_by(|a, b| {
            b.gap_since_last_seen
                .cmp(&a.gap_since_last_seen)
                .then(a.number.cmp(&b.number))
        });
        rows.truncate(limit);
        rows
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
