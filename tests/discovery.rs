//! Random discovery tests
//!
//! Request shapes and outcomes of the two-step sampling strategy.

use kodex::discovery::discover_home;
use kodex::prelude::*;
use std::{sync::Arc, time::Duration};

mod common;
use common::{ScriptedCatalog, TotalMode};

#[cfg(test)]
mod discovery_tests {
    use super::*;

    #[tokio::test]
    async fn test_small_collection_fetches_full_batch() {
        let catalog = Arc::new(
            ScriptedCatalog::new().with_generated(Collection::Comics, "Comic", 50),
        );
        let discovery = RandomDiscovery::new(Arc::clone(&catalog), Collection::Comics);

        let found = discovery.discover().await;
        let item = found.item().expect("a comic should be found");
        assert!(item.label.starts_with("Comic "));

        let calls = catalog.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].query, PageQuery::window(0, 1));
        assert_eq!(calls[1].query, PageQuery::window(0, 50));
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let catalog = Arc::new(
            ScriptedCatalog::new().with_generated(Collection::Characters, "Hero", 100),
        );
        let discovery = RandomDiscovery::new(Arc::clone(&catalog), Collection::Characters);

        assert!(discovery.discover().await.item().is_some());
        assert_eq!(catalog.calls()[1].query, PageQuery::window(0, 100));
    }

    #[tokio::test]
    async fn test_large_collection_fetches_single_index() {
        let catalog = Arc::new(
            ScriptedCatalog::new().with_generated(Collection::Characters, "Hero", 500),
        );
        let discovery =
            RandomDiscovery::new(Arc::clone(&catalog), Collection::Characters).with_seed(7);

        for _ in 0..20 {
            assert!(discovery.discover().await.item().is_some());
        }

        let calls = catalog.calls();
        assert_eq!(calls.len(), 40);
        for pair in calls.chunks(2) {
            assert_eq!(pair[0].query, PageQuery::window(0, 1));
            assert_eq!(pair[1].query.limit, 1);
            assert!(pair[1].query.skip < 500);
            assert_eq!(pair[1].query.filter, None);
        }
    }

    #[tokio::test]
    async fn test_seeded_draws_are_reproducible() {
        let catalog = Arc::new(
            ScriptedCatalog::new().with_generated(Collection::Comics, "Comic", 1000),
        );
        let first = RandomDiscovery::new(Arc::clone(&catalog), Collection::Comics).with_seed(42);
        let second = RandomDiscovery::new(Arc::clone(&catalog), Collection::Comics).with_seed(42);

        assert_eq!(first.discover().await, second.discover().await);
    }

    #[tokio::test]
    async fn test_count_used_as_total() {
        // The scripted catalog reports 300 even though it holds fewer items,
        // so any drawn offset past the data yields no item.
        let catalog = Arc::new(
            ScriptedCatalog::new()
                .with_generated(Collection::Comics, "Comic", 3)
                .with_total(TotalMode::Fixed(300)),
        );
        let discovery = RandomDiscovery::new(Arc::clone(&catalog), Collection::Comics);
        discovery.discover().await;

        let calls = catalog.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].query.limit, 1);
    }

    #[tokio::test]
    async fn test_empty_or_unknown_total_is_unavailable() {
        let empty = Arc::new(ScriptedCatalog::new());
        let discovery = RandomDiscovery::new(Arc::clone(&empty), Collection::Characters);
        assert_eq!(discovery.discover().await, Discovery::Unavailable);
        assert_eq!(empty.calls().len(), 1);

        let unknown = Arc::new(
            ScriptedCatalog::new()
                .with_generated(Collection::Characters, "Hero", 10)
                .with_total(TotalMode::Missing),
        );
        let discovery = RandomDiscovery::new(Arc::clone(&unknown), Collection::Characters);
        assert_eq!(discovery.discover().await, Discovery::Unavailable);
        assert_eq!(unknown.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_unavailable() {
        let catalog = Arc::new(
            ScriptedCatalog::new().with_generated(Collection::Comics, "Comic", 10),
        );
        catalog.set_failing(true);
        let discovery = RandomDiscovery::new(Arc::clone(&catalog), Collection::Comics);

        assert_eq!(discovery.discover().await, Discovery::Unavailable);
        assert_eq!(catalog.calls().len(), 1);

        catalog.set_failing(false);
        assert!(discovery.discover().await.item().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_supersedes_running_discovery() {
        let catalog = Arc::new(
            ScriptedCatalog::new()
                .with_generated(Collection::Characters, "Hero", 20)
                .with_latency(Duration::from_millis(100)),
        );
        let discovery = RandomDiscovery::new(Arc::clone(&catalog), Collection::Characters);

        let (first, second) = tokio::join!(discovery.discover(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            discovery.discover().await
        });

        assert_eq!(first, Discovery::Superseded);
        assert!(second.item().is_some());
        assert_eq!(catalog.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_discover_home_runs_both_collections() {
        let catalog = Arc::new(
            ScriptedCatalog::new()
                .with_generated(Collection::Characters, "Hero", 5)
                .with_generated(Collection::Comics, "Comic", 500),
        );
        let characters = RandomDiscovery::new(Arc::clone(&catalog), Collection::Characters);
        let comics = RandomDiscovery::new(Arc::clone(&catalog), Collection::Comics);

        let (hero, comic) = discover_home(&characters, &comics).await;
        assert!(hero.item().unwrap().label.starts_with("Hero "));
        assert!(comic.item().unwrap().label.starts_with("Comic "));

        let calls = catalog.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls.iter().filter(|c| c.collection == Collection::Comics).count(),
            2
        );
    }
}
