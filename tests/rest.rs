//! REST catalog tests
//!
//! Runs [`RestCatalog`] against a local HTTP server.

use kodex::Error;
use kodex::prelude::*;
use kodex::sources::RestCatalog;
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

mod common;
use common::{TEST_TIMEOUT, serve, serve_with_delay};

fn characters_body() -> String {
    serde_json::json!({
        "results": [
            {"_id": "a1", "name": "Spider-Man", "thumbnail": {"path": "http://img/spidey", "extension": "jpg"}},
            {"id": 2, "name": "Spider-Woman"},
            {"name": "Spider-Girl"}
        ],
        "total": 3,
        "count": 99
    })
    .to_string()
}

#[cfg(test)]
mod rest_tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_page_request_and_mapping() {
        let server = serve(|_| (200, characters_body())).await;
        let catalog = RestCatalog::new(&server.base_url).unwrap();
        let token = CancellationToken::new();

        let page = timeout(
            TEST_TIMEOUT,
            catalog.fetch_page(
                Collection::Characters,
                PageQuery::for_page(2, 8, Some("spider man")),
                &token,
            ),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(
            server.requests(),
            vec!["/characters?name=spider%20man&skip=8&limit=8".to_string()]
        );
        assert_eq!(page.total, Some(3));
        assert_eq!(page.results_len, 3);

        let ids: Vec<&str> = page.items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "2", "Spider-Girl"]);
        assert_eq!(
            page.items[0].thumbnail.as_ref().map(|t| t.url()),
            Some("http://img/spidey.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn test_count_when_total_missing() {
        let server = serve(|_| {
            (
                200,
                r#"{"results": [{"id": 1, "title": "Saga #1"}], "count": 12}"#.to_string(),
            )
        })
        .await;
        let catalog = RestCatalog::new(&server.base_url).unwrap();

        let page = catalog
            .fetch_page(Collection::Comics, PageQuery::window(0, 1), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(page.total, Some(12));
        assert_eq!(page.items[0].label, "Saga #1");
        assert_eq!(server.requests(), vec!["/comics?skip=0&limit=1".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_one() {
        let server =
            serve(|_| (200, r#"{"results": [{"id": 7, "title": "Saga #7"}]}"#.to_string())).await;
        let catalog = RestCatalog::new(&server.base_url).unwrap();

        let item = catalog
            .fetch_one(Collection::Comics, 6, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(item.map(|item| item.id), Some("7".to_string()));
        assert_eq!(server.requests(), vec!["/comics?skip=6&limit=1".to_string()]);
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = serve(|_| (500, r#"{"error": "boom"}"#.to_string())).await;
        let catalog = RestCatalog::new(&server.base_url).unwrap();

        let err = catalog
            .fetch_page(Collection::Characters, PageQuery::window(0, 20), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http { status: 500, .. }));
        assert!(err.is_fetch_failure());
        assert!(!err.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_request() {
        let server = serve_with_delay(Duration::from_secs(5), |_| (200, characters_body())).await;
        let catalog = RestCatalog::new(&server.base_url).unwrap();
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let result = timeout(
            Duration::from_secs(2),
            catalog.fetch_page(Collection::Characters, PageQuery::window(0, 20), &token),
        )
        .await
        .expect("cancellation should end the request early");
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_listing_over_http() {
        let server = serve(|target| {
            if target.contains("skip=0") {
                (200, characters_body())
            } else {
                (503, String::new())
            }
        })
        .await;
        let listing = Listing::new(
            Arc::new(RestCatalog::new(&server.base_url).unwrap()),
            Collection::Characters,
        );

        let first = ListingParams::default();
        let Some(ListingOutcome::Loaded { bounds, .. }) = listing.load(&first).await else {
            panic!("expected a loaded page");
        };
        assert_eq!(bounds.total_pages, Some(1));

        let outcome = listing.load(&first.with_page(2)).await.unwrap();
        assert_eq!(
            outcome,
            ListingOutcome::Failed {
                message: "Could not load characters.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_base_url_with_path() {
        let server = serve(|_| (200, r#"{"results": [], "total": 0}"#.to_string())).await;
        let catalog = RestCatalog::new(&format!("{}/api/v1", server.base_url)).unwrap();

        let page = catalog
            .fetch_page(Collection::Comics, PageQuery::window(0, 20), &CancellationToken::new())
            .await
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(server.requests(), vec!["/api/v1/comics?skip=0&limit=20".to_string()]);
    }
}
