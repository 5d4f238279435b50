//! Latest-round discovery.
//!
//! Finds the highest published round with a bounded number of probes:
//! confirm a starting round, gallop forward with doubling steps until a
//! probe misses, then binary-search the gap. The probe budget is owned by
//! each search; exhausting it aborts instead of looping.

pub mod rounds;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::types::DrawRecord;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Looks up one published draw by round.
///
/// `Ok(None)` means the round is not published yet. Errors are transport
/// failures; the search treats them as not-found.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoundProbe: Send + Sync {
    async fn probe(&self, round: u32) -> Result<Option<DrawRecord>>;
}

/// Persistent slot for the last round known to exist.
pub trait RoundCacheSlot: Send + Sync {
    fn last_known_round(&self) -> Option<u32>;
    fn set_last_known_round(&self, round: u32) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Hard cap on probes per search.
    pub probe_budget: u32,
    /// Starting round when the cache is empty.
    pub first_guess: u32,
    /// Rounds tried below a stale start before giving up.
    pub max_back_steps: u32,
    /// First galloping step; doubles after every hit.
    pub initial_step: u32,
    /// Single-round probes after galloping runs out of its share. Also the
    /// part of the budget reserved for that scan.
    pub forward_scan: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            probe_budget: 60,
            first_guess: 1000,
            max_back_steps: 5,
            initial_step: 32,
            forward_scan: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Probe budget of {budget} exhausted before the latest round was pinned down")]
    BudgetExhausted { budget: u32 },

    #[error("No draws found at or below round {start_round} ({back_steps} steps back)")]
    NoDrawsFound { start_round: u32, back_steps: u32 },
}

/// The newest published draw and what it cost to find it.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestRound {
    pub record: DrawRecord,
    pub probes_used: u32,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Counts probes against the budget and normalises probe outcomes.
struct Prober<'a> {
    probe: &'a dyn RoundProbe,
    budget: u32,
    used: u32,
}

impl<'a> Prober<'a> {
    fn remaining(&self) -> u32 {
        self.budget.saturating_sub(self.used)
    }

    async fn probe(&mut self, round: u32) -> Result<Option<DrawRecord>, DiscoveryError> {
        if self.used >= self.budget {
            return Err(DiscoveryError::BudgetExhausted {
                budget: self.budget,
            });
        }
        self.used += 1;

        match self.probe.probe(round).await {
            Ok(Some(record)) if record.round() == round => {
                debug!(round, "Probe hit");
                Ok(Some(record))
            }
            Ok(Some(record)) => {
                warn!(
                    round,
                    returned = record.round(),
                    "Probe returned a different round, treating as miss"
                );
                Ok(None)
            }
            Ok(None) => {
                debug!(round, "Probe miss");
                Ok(None)
            }
            Err(e) => {
                debug!(round, error = %e, "Probe failed, treating as miss");
                Ok(None)
            }
        }
    }
}

/// Locate the newest published round.
///
/// On success the round is written back to `cache`; a failing write is
/// logged and ignored.
pub async fn find_latest_round(
    probe: &dyn RoundProbe,
    cache: &dyn RoundCacheSlot,
    config: &DiscoveryConfig,
) -> Result<LatestRound, DiscoveryError> {
    let start = cache
        .last_known_round()
        .filter(|&r| r >= 1)
        .unwrap_or(config.first_guess.max(1));

    let mut prober = Prober {
        probe,
        budget: config.probe_budget,
        used: 0,
    };

    // (a) confirm the start, stepping back if it is not published
    let mut best = match prober.probe(start).await? {
        Some(record) => record,
        None => step_back(&mut prober, start, config.max_back_steps).await?,
    };

    // (b) gallop until a miss
    let gallop_limit = config.probe_budget.saturating_sub(config.forward_scan);
    let mut step = config.initial_step.max(1);
    let mut first_miss: Option<u32> = None;

    while prober.used < gallop_limit {
        let Some(candidate) = best.round().checked_add(step) else {
            break;
        };
        match prober.probe(candidate).await? {
            Some(record) => {
                best = record;
                step = step.saturating_mul(2);
            }
            None => {
                first_miss = Some(candidate);
                break;
            }
        }
    }

    // (c) gallop never missed: creep forward one round at a time
    let Some(miss) = first_miss else {
        let mut scanned = 0;
        let mut missed = false;
        while scanned < config.forward_scan && prober.remaining() > 0 {
            let Some(candidate) = best.round().checked_add(1) else {
                break;
            };
            scanned += 1;
            match prober.probe(candidate).await? {
                Some(record) => best = record,
                None => {
                    missed = true;
                    break;
                }
            }
        }
        debug!(round = best.round(), scanned, missed, "Forward scan finished");
        return Ok(finish(best, prober.used, cache));
    };

    // (d) binary search the open interval (best, miss)
    let mut lo = best.round();
    let mut hi = miss;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        match prober.probe(mid).await? {
            Some(record) => {
                lo = mid;
                best = record;
            }
            None => hi = mid,
        }
    }

    Ok(finish(best, prober.used, cache))
}

async fn step_back(
    prober: &mut Prober<'_>,
    start: u32,
    max_back_steps: u32,
) -> Result<DrawRecord, DiscoveryError> {
    let mut taken = 0;
    let mut round = start;
    while taken < max_back_steps && round > 1 {
        round -= 1;
        taken += 1;
        if let Some(record) = prober.probe(round).await? {
            debug!(start, found = round, "Stale start, stepped back");
            return Ok(record);
        }
    }
    Err(DiscoveryError::NoDrawsFound {
        start_round: start,
        back_steps: taken,
    })
}

fn finish(record: DrawRecord, probes_used: u32, cache: &dyn RoundCacheSlot) -> LatestRound {
    if let Err(e) = cache.set_last_known_round(record.round()) {
        warn!(round = record.round(), error = %e, "Failed to cache latest round");
    }
    info!(round = record.round(), probes_used, "Latest round found");
    LatestRound {
        record,
        probes_used,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
