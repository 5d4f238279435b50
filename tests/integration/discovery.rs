//! Latest-round discovery against a counting publisher.

use lotto_recommender::config::AppConfig;
use lotto_recommender::discovery::{
    find_latest_round, DiscoveryConfig, DiscoveryError, RoundCacheSlot,
};
use lotto_recommender::engine::Recommender;
use lotto_recommender::storage::{FileRoundCache, MemoryRoundCache};

use crate::mock_probe::MockPublisher;

#[tokio::test]
async fn test_discovery_probe_count_is_logarithmic() {
    let publisher = MockPublisher::new(1187);
    let cache = MemoryRoundCache::with_round(1000);
    let found = find_latest_round(&publisher, &cache, &DiscoveryConfig::default())
        .await
        .unwrap();

    assert_eq!(found.record.round(), 1187);
    assert_eq!(found.probes_used, publisher.calls());
    // ceil(log2(188)) = 8, plus confirm and gallop probes
    assert!(publisher.calls() <= 8 + 4, "calls: {:?}", publisher.probed());
    assert_eq!(publisher.probed()[..4], [1000, 1032, 1096, 1224]);
}

#[tokio::test]
async fn test_discovery_from_every_cached_start() {
    for start in [1, 500, 1000, 1180, 1187] {
        let publisher = MockPublisher::new(1187);
        let cache = MemoryRoundCache::with_round(start);
        let found = find_latest_round(&publisher, &cache, &DiscoveryConfig::default())
            .await
            .unwrap();
        assert_eq!(found.record.round(), 1187, "start {start}");
        assert!(publisher.calls() <= 60);
    }
}

#[tokio::test]
async fn test_discovery_broken_transport() {
    let publisher = MockPublisher::new(1187);
    publisher.set_error("connection refused");
    let cache = MemoryRoundCache::default();
    let err = find_latest_round(&publisher, &cache, &DiscoveryConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::NoDrawsFound { .. }));
    assert_eq!(publisher.calls(), 6);
    assert_eq!(publisher.probed(), vec![1000, 999, 998, 997, 996, 995]);
}

#[tokio::test]
async fn test_discovery_persists_to_file_cache() {
    let mut path = std::env::temp_dir();
    path.push(format!("lotto_it_round_cache_{}.json", uuid::Uuid::new_v4()));
    let path = path.to_string_lossy().to_string();

    let recommender = Recommender::new(AppConfig::default());
    let cache = FileRoundCache::open(path.clone());
    let first = MockPublisher::new(1100);
    let found = recommender.find_latest_round(&first, &cache).await.unwrap();
    assert_eq!(found.record.round(), 1100);

    // a week later the search restarts from the cached round
    let reopened = FileRoundCache::open(path.clone());
    assert_eq!(reopened.last_known_round(), Some(1100));
    let second = MockPublisher::new(1101);
    let found = recommender.find_latest_round(&second, &reopened).await.unwrap();
    assert_eq!(found.record.round(), 1101);
    assert_eq!(second.probed()[0], 1100);

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_discovery_can_be_bounded_by_timeout() {
    let publisher = MockPublisher::new(1187);
    let cache = MemoryRoundCache::default();
    let config = DiscoveryConfig::default();
    let found = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        find_latest_round(&publisher, &cache, &config),
    )
    .await
    .expect("search should finish well within the timeout")
    .unwrap();
    assert_eq!(found.record.round(), 1187);
}
