//! Recommendation engine.
//!
//! `Recommender` owns the current statistics snapshot and exposes the
//! public operations: refresh, generate, score and latest-round discovery.
//! Each request takes a clone of the snapshot `Arc` and works on private
//! state, so concurrent requests never contend beyond that clone.

pub mod record;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::discovery::{self, DiscoveryError, LatestRound, RoundCacheSlot, RoundProbe};
use crate::quality::{self, QualityReport};
use crate::selection::Selector;
use crate::stats::StatisticsSnapshot;
use crate::storage::DrawHistorySource;
use crate::strategy::{ScoringEngine, StrategyPlan};
use crate::types::{DrawRecord, LottoError, Recommendation, StrategySpec};
pub use record::GenerationRecord;

pub struct Recommender {
    config: AppConfig,
    snapshot: RwLock<Arc<StatisticsSnapshot>>,
}

impl Recommender {
    /// Start with an empty snapshot; call `refresh_statistics` before
    /// relying on history-driven strategies.
    pub fn new(config: AppConfig) -> Self {
        let snapshot = StatisticsSnapshot::empty(&config.statistics);
        Self {
            config,
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current snapshot. Stays valid even if a refresh lands meanwhile.
    pub fn snapshot(&self) -> Arc<StatisticsSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebuild statistics from the full history and swap them in.
    pub fn refresh_statistics(&self, history: &[DrawRecord]) -> Result<(), LottoError> {
        let fresh = StatisticsSnapshot::build(history, None, &self.config.statistics)?;
        info!(
            draws = fresh.total_draws(),
            current_round = fresh.current_round(),
            pairs = fresh.pair_count(),
            "Statistics refreshed"
        );
        let fresh = Arc::new(fresh);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        Ok(())
    }

    /// Load the history from `source` and refresh. Returns the draw count.
    pub fn refresh_from(&self, source: &dyn DrawHistorySource) -> anyhow::Result<usize> {
        let history = source.all()?;
        self.refresh_statistics(&history)?;
        Ok(history.len())
    }

    /// Generate `count` combinations with an entropy-seeded rng.
    pub fn generate(
        &self,
        strategies: &[StrategySpec],
        count: usize,
    ) -> Result<Vec<Recommendation>, LottoError> {
        let mut rng = StdRng::from_entropy();
        self.generate_with_rng(strategies, count, &mut rng)
    }

    /// Generate with a caller-owned rng, for seed-and-replay.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        strategies: &[StrategySpec],
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Recommendation>, LottoError> {
        if count == 0 {
            return Err(LottoError::InvalidCount);
        }
        let plan = StrategyPlan::parse(strategies)?;
        let snapshot = self.snapshot();
        Ok(self.run(&plan, &snapshot, count, rng))
    }

    /// Generate and wrap each result in a graded `GenerationRecord`.
    pub fn generate_records(
        &self,
        strategies: &[StrategySpec],
        count: usize,
        target_round: Option<u32>,
    ) -> Result<Vec<GenerationRecord>, LottoError> {
        if count == 0 {
            return Err(LottoError::InvalidCount);
        }
        let plan = StrategyPlan::parse(strategies)?;
        let snapshot = self.snapshot();
        let mut rng = StdRng::from_entropy();

        self.run(&plan, &snapshot, count, &mut rng)
            .into_iter()
            .map(|rec| {
                let report = quality::score(rec.numbers())?;
                Ok(GenerationRecord::new(rec, &plan, &report, target_round))
            })
            .collect()
    }

    fn run<R: Rng + ?Sized>(
        &self,
        plan: &StrategyPlan,
        snapshot: &StatisticsSnapshot,
        count: usize,
        rng: &mut R,
    ) -> Vec<Recommendation> {
        let scorer = ScoringEngine::new(&self.config.scoring, snapshot);
        let selector = Selector::new(&self.config.selection);
        let constraints = plan.constraints();

        let results: Vec<Recommendation> = (0..count)
            .map(|i| {
                let scores = scorer.score(plan, rng);
                let rec = selector.select(&scores, constraints, rng);
                debug!(index = i, numbers = %rec, "Combination generated");
                rec
            })
            .collect();

        info!(
            count,
            strategies = plan.steps().len(),
            deterministic = plan.is_deterministic(),
            "Recommendations generated"
        );
        results
    }

    /// Grade any six numbers. Independent of the snapshot.
    pub fn score(&self, numbers: &[u8]) -> Result<QualityReport, LottoError> {
        quality::score(numbers)
    }

    pub async fn find_latest_round(
        &self,
        probe: &dyn RoundProbe,
        cache: &dyn RoundCacheSlot,
    ) -> Result<LatestRound, DiscoveryError> {
        discovery::find_latest_round(probe, cache, &self.config.discovery).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
