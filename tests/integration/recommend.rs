//! End-to-end recommendation runs: history file → statistics → strategies
//! → selection → grading → generation log.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use lotto_recommender::config::AppConfig;
use lotto_recommender::engine::Recommender;
use lotto_recommender::quality::QualityGrade;
use lotto_recommender::storage::{self, HistoryProbe, JsonDrawHistory, MemoryRoundCache};
use lotto_recommender::types::{LottoError, StrategySpec};

use crate::mock_probe::make_history;

fn temp_path(stem: &str) -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("lotto_it_{stem}_{}.json", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

fn make_recommender(draws: u32) -> Recommender {
    let recommender = Recommender::new(AppConfig::default());
    recommender.refresh_statistics(&make_history(draws)).unwrap();
    recommender
}

const ALL_COMBINATION_STRATEGIES: [&str; 11] = [
    "popularity",
    "neglect",
    "trend",
    "pair-affinity",
    "parity-balance",
    "zone-spread",
    "lucky-numbers",
    "visual-pattern-avoidance",
    "avoidance",
    "avoid-adjacent",
    "last-digit-diversity",
];

#[test]
fn test_every_strategy_produces_valid_combinations() {
    let recommender = make_recommender(200);
    for name in ALL_COMBINATION_STRATEGIES {
        let out = recommender
            .generate(&[StrategySpec::new(name, 1.0)], 10)
            .unwrap();
        assert_eq!(out.len(), 10, "{name}");
        for rec in &out {
            let n = rec.numbers();
            assert!(n.windows(2).all(|w| w[0] < w[1]), "{name}: {rec}");
            assert!(n.iter().all(|&x| (1..=45).contains(&x)), "{name}: {rec}");
        }
    }
}

#[test]
fn test_all_strategies_together() {
    let recommender = make_recommender(200);
    let specs = StrategySpec::equally_weighted(&ALL_COMBINATION_STRATEGIES);
    let out = recommender.generate(&specs, 25).unwrap();
    assert_eq!(out.len(), 25);
    for rec in &out {
        let odd = rec.numbers().iter().filter(|&&n| n % 2 == 1).count();
        assert_eq!(odd, 3, "{rec}");
    }
}

#[test]
fn test_pure_blends_are_deterministic() {
    let recommender = make_recommender(150);
    for blend in [
        "pure-high-frequency",
        "pure-neglected",
        "pure-recent-trend",
        "pure-high-weight",
        "pure-balanced",
        "pure-cyclic",
        "pure-correlation",
        "pure-regression",
    ] {
        let specs = vec![
            StrategySpec::new("pure-statistics-mode", 1.0),
            StrategySpec::new(blend, 1.0),
        ];
        let a = recommender
            .generate_with_rng(&specs, 2, &mut StdRng::seed_from_u64(1))
            .unwrap();
        let b = recommender
            .generate_with_rng(&specs, 2, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(a, b, "{blend}");
    }
}

#[test]
fn test_stochastic_mode_varies() {
    let recommender = make_recommender(150);
    let specs = vec![StrategySpec::new("popularity", 1.0)];
    let out = recommender.generate(&specs, 30).unwrap();
    let first = out[0];
    assert!(out.iter().any(|r| *r != first));
}

#[test]
fn test_unknown_strategies_are_rejected() {
    let recommender = make_recommender(20);
    let err = recommender
        .generate(&[StrategySpec::new("numerology", 1.0)], 3)
        .unwrap_err();
    assert!(matches!(err, LottoError::NoRecognizedStrategies { .. }));
    assert!(err.to_string().contains("numerology"));

    // known names survive alongside unknown ones
    let out = recommender
        .generate(
            &[
                StrategySpec::new("numerology", 1.0),
                StrategySpec::new("trend", 1.0),
            ],
            3,
        )
        .unwrap();
    assert_eq!(out.len(), 3);
}

#[test]
fn test_statistics_invariants_on_refresh() {
    let recommender = make_recommender(300);
    let snapshot = recommender.snapshot();
    let rows = snapshot.all_numbers();
    let total: u32 = rows.iter().map(|r| r.appearance_count).sum();
    assert_eq!(total, 6 * 300);
    for pair in snapshot.pairs() {
        let a = snapshot.number(pair.first).appearance_count;
        let b = snapshot.number(pair.second).appearance_count;
        assert!(pair.joint_count <= a.min(b));
    }
    assert_eq!(snapshot.hottest(5).len(), 5);
    assert_eq!(snapshot.top_pairs(3).len(), 3);
}

#[test]
fn test_concurrent_generation_shares_snapshot() {
    let recommender = Arc::new(make_recommender(120));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let r = Arc::clone(&recommender);
            std::thread::spawn(move || {
                r.generate(&[StrategySpec::new("trend", 1.0)], 20).unwrap()
            })
        })
        .collect();
    recommender.refresh_statistics(&make_history(121)).unwrap();
    for h in handles {
        assert_eq!(h.join().unwrap().len(), 20);
    }
    assert_eq!(recommender.snapshot().total_draws(), 121);
}

#[tokio::test]
async fn test_full_pipeline_with_files() {
    let history_path = temp_path("draws");
    let log_path = temp_path("generations");

    let store = JsonDrawHistory::new(history_path.clone());
    store.save(&make_history(400)).unwrap();

    let recommender = Recommender::new(AppConfig::default());
    assert_eq!(recommender.refresh_from(&store).unwrap(), 400);

    let probe = HistoryProbe::from_source(&store).unwrap();
    let cache = MemoryRoundCache::default();
    let latest = recommender.find_latest_round(&probe, &cache).await.unwrap();
    assert_eq!(latest.record.round(), 400);

    let specs = AppConfig::default().engine.default_strategies;
    let records = recommender
        .generate_records(&specs, 5, Some(latest.record.round() + 1))
        .unwrap();
    assert_eq!(records.len(), 5);
    for record in &records {
        let report = recommender.score(record.numbers.numbers()).unwrap();
        assert_eq!(report.score, record.quality_score);
        assert_eq!(record.target_round, Some(401));
    }

    assert_eq!(storage::append_generations(&log_path, &records).unwrap(), 5);
    assert_eq!(storage::load_generations(&log_path).unwrap(), records);

    storage::delete_file(&history_path).unwrap();
    storage::delete_file(&log_path).unwrap();
}

#[test]
fn test_quality_grades() {
    let recommender = make_recommender(10);
    let excellent = recommender.score(&[3, 12, 20, 29, 38, 41]).unwrap();
    assert_eq!(excellent.grade, QualityGrade::Excellent);
    let poor = recommender.score(&[1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(poor.grade, QualityGrade::Poor);
    assert!(recommender.score(&[1, 2, 3, 4, 5, 99]).is_err());
}
