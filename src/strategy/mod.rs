//! Strategy scoring.
//!
//! Parses caller-supplied (name, weight) pairs into a `StrategyPlan` and
//! runs the plan against a statistics snapshot to produce a `ScoreMap`.
//! Strategies are applied in the order supplied; each one adds its
//! weighted contribution to the running map.

pub mod blend;
pub mod heuristics;

use rand::Rng;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

use crate::stats::StatisticsSnapshot;
use crate::types::{all_numbers, in_range, LottoError, StrategySpec, MAX_NUMBER};
pub use blend::Blend;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Scoring knobs. Defaults reproduce the production tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Per-strategy weight jitter: weight × U[1 - j, 1 + j]. 0 disables.
    pub weight_jitter: f64,
    /// Per-number jitter on popularity / neglect / trend contributions.
    pub score_jitter: f64,
    /// Anchors taken from the current top of the map for pair affinity.
    pub pair_anchor_count: usize,
    /// Partners boosted per anchor.
    pub pair_partners: usize,
    /// Global pairs boosted when there are no anchors yet.
    pub fallback_pairs: usize,
    pub parity_bonus: f64,
    pub zone_bonus: f64,
    pub lucky: LuckyConfig,
    /// Regular sequences players tend to mark; members are penalised.
    pub visual_patterns: Vec<Vec<u8>>,
    pub pattern_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_jitter: 0.05,
            score_jitter: 0.03,
            pair_anchor_count: 6,
            pair_partners: 5,
            fallback_pairs: 20,
            parity_bonus: 50.0,
            zone_bonus: 30.0,
            lucky: LuckyConfig::default(),
            visual_patterns: vec![
                (1..=6).collect(),
                (1..=6).map(|k| k * 7).collect(),
                (0..=5).map(|k| 1 + k * 7).collect(),
            ],
            pattern_penalty: 20.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LuckyConfig {
    /// Uniform draws per call (inclusive range, before deduplication).
    pub pool_min: usize,
    pub pool_max: usize,
    pub base_bonus: f64,
    pub bonus_spread: f64,
    pub favourites: Vec<Favourite>,
}

impl Default for LuckyConfig {
    fn default() -> Self {
        Self {
            pool_min: 12,
            pool_max: 15,
            base_bonus: 60.0,
            bonus_spread: 20.0,
            favourites: vec![
                Favourite::new(7, 0.7),
                Favourite::new(3, 0.6),
                Favourite::new(8, 0.6),
                Favourite::new(1, 0.5),
                Favourite::new(9, 0.5),
                Favourite::new(21, 0.4),
            ],
        }
    }
}

/// A culturally favoured number and its inclusion probability.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Favourite {
    pub number: u8,
    pub probability: f64,
}

impl Favourite {
    pub fn new(number: u8, probability: f64) -> Self {
        Self {
            number,
            probability,
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy names
// ---------------------------------------------------------------------------

/// Closed set of recognised strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Popularity,
    Neglect,
    Trend,
    PairAffinity,
    ParityBalance,
    ZoneSpread,
    LuckyNumbers,
    VisualPatternAvoidance,
    Avoidance,
    AvoidAdjacent,
    LastDigitDiversity,
    Blend(Blend),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Popularity => "popularity",
            Strategy::Neglect => "neglect",
            Strategy::Trend => "trend",
            Strategy::PairAffinity => "pair-affinity",
            Strategy::ParityBalance => "parity-balance",
            Strategy::ZoneSpread => "zone-spread",
            Strategy::LuckyNumbers => "lucky-numbers",
            Strategy::VisualPatternAvoidance => "visual-pattern-avoidance",
            Strategy::Avoidance => "avoidance",
            Strategy::AvoidAdjacent => "avoid-adjacent",
            Strategy::LastDigitDiversity => "last-digit-diversity",
            Strategy::Blend(b) => b.name(),
        }
    }

    /// Combination strategies get weight jitter; blends never do.
    pub fn is_combination(&self) -> bool {
        !matches!(self, Strategy::Blend(_))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        match key.as_str() {
            "popularity" | "popular" | "hot" | "인기번호" => Ok(Strategy::Popularity),
            "neglect" | "neglected" | "cold" | "소외번호" => Ok(Strategy::Neglect),
            "trend" | "trending" | "트렌드" => Ok(Strategy::Trend),
            "pair-affinity" | "pairs" | "pair" | "페어분석" => Ok(Strategy::PairAffinity),
            "parity-balance" | "odd-even" | "parity" | "홀짝균형" => Ok(Strategy::ParityBalance),
            "zone-spread" | "zones" | "zone" | "구간분산" => Ok(Strategy::ZoneSpread),
            "lucky-numbers" | "lucky" | "행운번호" => Ok(Strategy::LuckyNumbers),
            "visual-pattern-avoidance" | "visual-patterns" | "patterns" | "시각패턴방지" => {
                Ok(Strategy::VisualPatternAvoidance)
            }
            "avoidance" | "contrarian" | "대중기피" => Ok(Strategy::Avoidance),
            "avoid-adjacent" | "no-consecutive" | "연속방지" => Ok(Strategy::AvoidAdjacent),
            "last-digit-diversity" | "last-digit" | "끝자리다양성" => {
                Ok(Strategy::LastDigitDiversity)
            }
            other => Blend::from_key(other)
                .map(Strategy::Blend)
                .ok_or_else(|| anyhow::anyhow!("Unknown strategy: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Selection-stage flags switched on by the plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraints {
    pub avoid_adjacent: bool,
    pub last_digit_diversity: bool,
    pub parity_balance: bool,
    pub zone_spread: bool,
    /// Take the top six by score with no randomness at all.
    pub deterministic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedStrategy {
    pub strategy: Strategy,
    pub weight: f64,
}

/// Validated, ordered strategies plus the constraints they imply.
#[derive(Debug, Clone)]
pub struct StrategyPlan {
    steps: Vec<PlannedStrategy>,
    constraints: Constraints,
    ignored: Vec<String>,
}

impl StrategyPlan {
    /// Parse caller specs. Unknown names are skipped with a warning; a list
    /// that ends up empty is an error.
    pub fn parse(specs: &[StrategySpec]) -> Result<Self, LottoError> {
        if specs.is_empty() {
            return Err(LottoError::NoStrategies);
        }

        let mut steps = Vec::with_capacity(specs.len());
        let mut ignored = Vec::new();
        let mut constraints = Constraints::default();

        for spec in specs {
            if !spec.weight.is_finite() {
                return Err(LottoError::InvalidWeight {
                    name: spec.name.clone(),
                    weight: spec.weight,
                });
            }
            let strategy = match spec.name.parse::<Strategy>() {
                Ok(s) => s,
                Err(e) => {
                    warn!(strategy = %spec.name, error = %e, "Ignoring unrecognized strategy");
                    ignored.push(spec.name.clone());
                    continue;
                }
            };
            match strategy {
                Strategy::AvoidAdjacent => constraints.avoid_adjacent = true,
                Strategy::LastDigitDiversity => constraints.last_digit_diversity = true,
                Strategy::ParityBalance => constraints.parity_balance = true,
                Strategy::ZoneSpread => constraints.zone_spread = true,
                Strategy::Blend(Blend::StatisticsMode) => constraints.deterministic = true,
                _ => {}
            }
            steps.push(PlannedStrategy {
                strategy,
                weight: spec.weight,
            });
        }

        if steps.is_empty() {
            return Err(LottoError::NoRecognizedStrategies { ignored });
        }

        Ok(Self {
            steps,
            constraints,
            ignored,
        })
    }

    pub fn steps(&self) -> &[PlannedStrategy] {
        &self.steps
    }

    pub fn constraints(&self) -> Constraints {
        self.constraints
    }

    pub fn is_deterministic(&self) -> bool {
        self.constraints.deterministic
    }

    /// Names that were skipped during parsing.
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Canonical (name, weight) pairs, for records and logs.
    pub fn specs(&self) -> Vec<StrategySpec> {
        self.steps
            .iter()
            .map(|s| StrategySpec::new(s.strategy.name(), s.weight))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Score map
// ---------------------------------------------------------------------------

/// Accumulating score per number 1..=45.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMap {
    scores: [f64; MAX_NUMBER as usize],
}

impl Default for ScoreMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreMap {
    pub fn new() -> Self {
        Self {
            scores: [0.0; MAX_NUMBER as usize],
        }
    }

    pub fn get(&self, n: u8) -> f64 {
        if in_range(n) {
            self.scores[(n - 1) as usize]
        } else {
            0.0
        }
    }

    /// Add `delta` to `n`; out-of-range numbers are ignored.
    pub fn add(&mut self, n: u8, delta: f64) {
        if in_range(n) {
            self.scores[(n - 1) as usize] += delta;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        all_numbers().map(move |n| (n, self.get(n)))
    }

    /// All numbers, best score first; ties broken by ascending number.
    pub fn ranked(&self) -> Vec<u8> {
        let mut nums: Vec<u8> = all_numbers().collect();
        nums.sort_by(|&a, &b| self.get(b).total_cmp(&self.get(a)).then(a.cmp(&b)));
        nums
    }

    pub fn top(&self, k: usize) -> Vec<u8> {
        let mut ranked = self.ranked();
        ranked.truncate(k);
        ranked
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Applies a plan to one snapshot. Cheap to build per request.
pub struct ScoringEngine<'a> {
    config: &'a ScoringConfig,
    snapshot: &'a StatisticsSnapshot,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(config: &'a ScoringConfig, snapshot: &'a StatisticsSnapshot) -> Self {
        Self { config, snapshot }
    }

    /// Run every step of `plan` against a fresh map.
    ///
    /// In deterministic plans no random value is drawn, so identical
    /// snapshots produce bit-identical maps.
    pub fn score<R: Rng + ?Sized>(&self, plan: &StrategyPlan, rng: &mut R) -> ScoreMap {
        let deterministic = plan.is_deterministic();
        let score_jitter = if deterministic {
            0.0
        } else {
            self.config.score_jitter
        };
        let mut map = ScoreMap::new();

        for step in plan.steps() {
            let weight = if deterministic || !step.strategy.is_combination() {
                step.weight
            } else {
                step.weight * heuristics::jitter(rng, self.config.weight_jitter)
            };

            match step.strategy {
                Strategy::Popularity => heuristics::stat_weighted(
                    &mut map,
                    self.snapshot,
                    weight,
                    score_jitter,
                    rng,
                    |s| s.popularity_score,
                ),
                Strategy::Neglect => heuristics::stat_weighted(
                    &mut map,
                    self.snapshot,
                    weight,
                    score_jitter,
                    rng,
                    |s| s.neglect_score,
                ),
                Strategy::Trend => heuristics::stat_weighted(
                    &mut map,
                    self.snapshot,
                    weight,
                    score_jitter,
                    rng,
                    |s| s.trend_score,
                ),
                Strategy::Avoidance => heuristics::stat_weighted(
                    &mut map,
                    self.snapshot,
                    weight,
                    0.0,
                    rng,
                    |s| s.avoidance_score,
                ),
                Strategy::PairAffinity => {
                    heuristics::pair_affinity(&mut map, self.snapshot, self.config, weight)
                }
                Strategy::ParityBalance => {
                    heuristics::parity_balance(&mut map, self.config.parity_bonus * weight)
                }
                Strategy::ZoneSpread => {
                    heuristics::zone_spread(&mut map, self.config.zone_bonus * weight)
                }
                Strategy::LuckyNumbers => {
                    if deterministic {
                        warn!("Skipping lucky-numbers: not reproducible in pure statistics mode");
                        continue;
                    }
                    heuristics::lucky_numbers(&mut map, &self.config.lucky, weight, rng)
                }
                Strategy::VisualPatternAvoidance => heuristics::visual_patterns(
                    &mut map,
                    &self.config.visual_patterns,
                    self.config.pattern_penalty * weight,
                ),
                Strategy::AvoidAdjacent | Strategy::LastDigitDiversity => {}
                Strategy::Blend(preset) => preset.apply(&mut map, self.snapshot, weight),
            }

            debug!(strategy = %step.strategy, weight, "Strategy applied");
        }

        map
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::make_history;
    use crate::stats::StatisticsConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_snapshot() -> StatisticsSnapshot {
        StatisticsSnapshot::build(&make_history(60), None, &StatisticsConfig::default()).unwrap()
    }

    fn make_plan(names: &[(&str, f64)]) -> StrategyPlan {
        let specs: Vec<StrategySpec> = names
            .iter()
            .map(|(n, w)| StrategySpec::new(*n, *w))
            .collect();
        StrategyPlan::parse(&specs).unwrap()
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("Popularity".parse::<Strategy>().unwrap(), Strategy::Popularity);
        assert_eq!("hot".parse::<Strategy>().unwrap(), Strategy::Popularity);
        assert_eq!("PAIR_AFFINITY".parse::<Strategy>().unwrap(), Strategy::PairAffinity);
        assert_eq!("zone spread".parse::<Strategy>().unwrap(), Strategy::ZoneSpread);
        assert_eq!("no-consecutive".parse::<Strategy>().unwrap(), Strategy::AvoidAdjacent);
        assert_eq!(
            "pure".parse::<Strategy>().unwrap(),
            Strategy::Blend(Blend::StatisticsMode)
        );
        assert_eq!(
            "pure_regression".parse::<Strategy>().unwrap(),
            Strategy::Blend(Blend::Regression)
        );
        assert_eq!("행운번호".parse::<Strategy>().unwrap(), Strategy::LuckyNumbers);
        assert!("astrology".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_plan_errors() {
        assert!(matches!(StrategyPlan::parse(&[]), Err(LottoError::NoStrategies)));

        let unknown = vec![StrategySpec::new("astrology", 1.0)];
        match StrategyPlan::parse(&unknown) {
            Err(LottoError::NoRecognizedStrategies { ignored }) => {
                assert_eq!(ignored, vec!["astrology".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }

        let nan = vec![StrategySpec::new("trend", f64::NAN)];
        assert!(matches!(
            StrategyPlan::parse(&nan),
            Err(LottoError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_plan_flags_and_ignored() {
        let plan = make_plan(&[
            ("popularity", 0.5),
            ("bogus", 1.0),
            ("odd-even", 1.0),
            ("zones", 1.0),
            ("avoid-adjacent", 1.0),
            ("last-digit-diversity", 1.0),
        ]);
        let c = plan.constraints();
        assert!(c.parity_balance && c.zone_spread && c.avoid_adjacent && c.last_digit_diversity);
        assert!(!c.deterministic);
        assert_eq!(plan.steps().len(), 5);
        assert_eq!(plan.ignored(), &["bogus".to_string()]);
        assert_eq!(plan.specs()[1].name, "parity-balance");
    }

    #[test]
    fn test_pure_mode_forces_deterministic() {
        let plan = make_plan(&[("lucky", 1.0), ("pure-statistics-mode", 1.0)]);
        assert!(plan.is_deterministic());
    }

    #[test]
    fn test_ranked_breaks_ties_ascending() {
        let mut map = ScoreMap::new();
        map.add(30, 5.0);
        map.add(10, 5.0);
        map.add(44, 9.0);
        assert_eq!(map.top(4), vec![44, 10, 30, 1]);
        map.add(0, 100.0);
        map.add(46, 100.0);
        assert_eq!(map.ranked()[0], 44);
    }

    #[test]
    fn test_deterministic_scores_are_bit_identical() {
        let snapshot = make_snapshot();
        let config = ScoringConfig::default();
        let engine = ScoringEngine::new(&config, &snapshot);
        let plan = make_plan(&[
            ("pure-statistics-mode", 1.0),
            ("popularity", 0.7),
            ("lucky-numbers", 1.0),
            ("pair-affinity", 0.3),
        ]);

        let a = engine.score(&plan, &mut StdRng::seed_from_u64(1));
        let b = engine.score(&plan, &mut StdRng::seed_from_u64(999));
        for ((_, x), (_, y)) in a.iter().zip(b.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_popularity_without_jitter_is_exact() {
        let snapshot = make_snapshot();
        let config = ScoringConfig {
            weight_jitter: 0.0,
            score_jitter: 0.0,
            ..ScoringConfig::default()
        };
        let engine = ScoringEngine::new(&config, &snapshot);
        let map = engine.score(&make_plan(&[("popularity", 2.0)]), &mut StdRng::seed_from_u64(3));
        for n in all_numbers() {
            let expected = snapshot.number(n).popularity_score * 2.0;
            assert!((map.get(n) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let snapshot = make_snapshot();
        let config = ScoringConfig::default();
        let engine = ScoringEngine::new(&config, &snapshot);
        let plan = make_plan(&[("trend", 1.0)]);
        for seed in 0..20 {
            let map = engine.score(&plan, &mut StdRng::seed_from_u64(seed));
            for n in all_numbers() {
                let base = snapshot.number(n).trend_score;
                let lo = base * 0.95 * 0.97 - 1e-9;
                let hi = base * 1.05 * 1.03 + 1e-9;
                assert!(map.get(n) >= lo && map.get(n) <= hi, "n={n}");
            }
        }
    }

    #[test]
    fn test_constraint_flags_add_nothing() {
        let snapshot = make_snapshot();
        let config = ScoringConfig::default();
        let engine = ScoringEngine::new(&config, &snapshot);
        let plan = make_plan(&[("avoid-adjacent", 1.0), ("last-digit-diversity", 1.0)]);
        let map = engine.score(&plan, &mut StdRng::seed_from_u64(0));
        assert_eq!(map, ScoreMap::new());
    }

    #[test]
    fn test_config_defaults_from_toml() {
        let cfg: ScoringConfig = toml::from_str(
            r#"
            pair_partners = 3
            [lucky]
            favourites = [{ number = 45, probability = 1.0 }]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.pair_partners, 3);
        assert_eq!(cfg.lucky.pool_min, 12);
        assert_eq!(cfg.lucky.favourites, vec![Favourite::new(45, 1.0)]);
        assert_eq!(cfg.visual_patterns.len(), 3);
        assert_eq!(cfg.visual_patterns[1], vec![7, 14, 21, 28, 35, 42]);
        assert_eq!(cfg.visual_patterns[2], vec![1, 8, 15, 22, 29, 36]);
    }
}
