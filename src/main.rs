//! Lotto recommender entry point.
//!
//! Loads configuration, initialises structured logging, refreshes
//! statistics from the stored draw history, locates the latest round
//! offline, then prints and logs a batch of graded recommendations.

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use lotto_recommender::config::AppConfig;
use lotto_recommender::discovery::{rounds, RoundCacheSlot};
use lotto_recommender::engine::Recommender;
use lotto_recommender::storage::{self, FileRoundCache, HistoryProbe, JsonDrawHistory};

const BANNER: &str = r#"
  _       ___   _____  _____   ___
 | |     / _ \ |_   _||_   _| / _ \
 | |    | | | |  | |    | |  | | | |
 | |___ | |_| |  | |    | |  | |_| |
 |_____| \___/   |_|    |_|   \___/

  6/45 number recommender
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let cfg = AppConfig::load_or_default("config.toml")?;

    println!("{BANNER}");
    info!(
        combinations = cfg.engine.combinations,
        strategies = cfg.engine.default_strategies.len(),
        history = %cfg.storage.history_path,
        "Lotto recommender starting up"
    );

    // -- Statistics --------------------------------------------------------

    let history = JsonDrawHistory::new(cfg.storage.history_path.clone());
    let draws = history.load()?;
    let recommender = Recommender::new(cfg.clone());
    recommender.refresh_statistics(&draws)?;

    if draws.is_empty() {
        warn!("Draw history is empty; history-driven strategies will score flat");
    }

    // -- Latest round ------------------------------------------------------

    let cache = FileRoundCache::open(cfg.storage.round_cache_path.clone());
    let probe = HistoryProbe::new(draws);

    let target_round = match recommender.find_latest_round(&probe, &cache).await {
        Ok(latest) => {
            info!(
                round = latest.record.round(),
                date = %latest.record.date(),
                probes = latest.probes_used,
                "Latest draw: {}",
                latest.record
            );
            Some(rounds::expected_round_for(Utc::now(), &latest.record))
        }
        Err(e) => {
            warn!(error = %e, "Latest round unknown, estimating from the calendar");
            let today = Utc::now().with_timezone(&rounds::kst()).date_naive();
            match rounds::next_round(&cache, today) {
                0 => None,
                round => Some(round),
            }
        }
    };

    // -- Recommendations ---------------------------------------------------

    let records = recommender.generate_records(
        &cfg.engine.default_strategies,
        cfg.engine.combinations,
        target_round,
    )?;

    let strategy_list: Vec<String> = cfg
        .engine
        .default_strategies
        .iter()
        .map(|s| s.to_string())
        .collect();
    println!("Strategies: {}", strategy_list.join(", "));
    for (i, record) in records.iter().enumerate() {
        println!("  {:>2}. {record}", i + 1);
    }

    match storage::append_generations(&cfg.storage.generation_log_path, &records) {
        Ok(total) => info!(
            path = %cfg.storage.generation_log_path,
            total,
            "Generations logged"
        ),
        Err(e) => error!(error = %e, "Failed to write generation log"),
    }

    info!(
        cached_round = ?cache.last_known_round(),
        "Lotto recommender finished"
    );
    Ok(())
}

/// Structured logging: JSON when `LOTTO_LOG_JSON` is set, human-readable
/// otherwise. Filter via `RUST_LOG`.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lotto_recommender=info"));

    let json_logging = std::env::var("LOTTO_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
