//! Integration tests for the search/pagination lifecycle.
//!
//! Each test drives the feed controller against a real HTTP round-trip to a
//! wiremock provider, exercising the controller and the search client
//! together: first-page replace, append-on-scroll, failure retry, stale
//! search supersession, and end-of-results detection.

use secrecy::SecretString;
use snaply::feed::{FeedController, PageRequest};
use snaply::search::{search_photos, ImageRecord, SearchError, PER_PAGE};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn access_key() -> SecretString {
    SecretString::from("integration-test-key")
}

fn photo_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "alt_description": format!("photo {}", id),
        "urls": {
            "small": format!("https://img.example/{}/small.jpg", id),
            "regular": format!("https://img.example/{}/regular.jpg", id)
        },
        "user": {"name": "Integration Author", "username": "integration"}
    })
}

fn results_body(prefix: &str, count: usize) -> serde_json::Value {
    let results: Vec<_> = (0..count)
        .map(|i| photo_json(&format!("{}-{}", prefix, i)))
        .collect();
    serde_json::json!({ "results": results })
}

/// Mount a search page response for a (query, page) pair.
async fn mount_page(server: &MockServer, query: &str, page: u32, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(query_param("query", query))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Dispatch a controller request against the mock provider.
async fn fetch(
    client: &reqwest::Client,
    server: &MockServer,
    request: &PageRequest,
) -> Result<Vec<ImageRecord>, SearchError> {
    search_photos(
        client,
        &access_key(),
        &request.query,
        request.page,
        Some(&server.uri()),
    )
    .await
}

#[tokio::test]
async fn first_page_fills_feed_in_order() {
    let server = MockServer::start().await;
    mount_page(&server, "mountains", 1, results_body("m", PER_PAGE)).await;

    let client = reqwest::Client::new();
    let mut feed = FeedController::new("music", PER_PAGE);

    let request = feed.submit_search("mountains");
    let result = fetch(&client, &server, &request).await.unwrap();
    feed.apply_page(request.generation, request.page, result);

    assert_eq!(feed.len(), PER_PAGE);
    assert_eq!(feed.records()[0].id, "m-0");
    assert_eq!(feed.records()[PER_PAGE - 1].id, format!("m-{}", PER_PAGE - 1));
    assert!(!feed.is_loading());
    assert!(!feed.is_exhausted());
}

#[tokio::test]
async fn scroll_appends_second_page_after_first() {
    let server = MockServer::start().await;
    mount_page(&server, "mountains", 1, results_body("p1", PER_PAGE)).await;
    mount_page(&server, "mountains", 2, results_body("p2", 10)).await;

    let client = reqwest::Client::new();
    let mut feed = FeedController::new("music", PER_PAGE);

    let request = feed.submit_search("mountains");
    let page1 = fetch(&client, &server, &request).await.unwrap();
    feed.apply_page(request.generation, request.page, page1);

    // The viewport reaches the last card
    let request = feed.next_page().expect("pagination after a full page");
    assert_eq!(request.page, 2);
    let page2 = fetch(&client, &server, &request).await.unwrap();
    feed.apply_page(request.generation, request.page, page2);

    assert_eq!(feed.len(), PER_PAGE + 10);
    assert_eq!(feed.records()[0].id, "p1-0");
    assert_eq!(feed.records()[PER_PAGE].id, "p2-0");
    assert_eq!(feed.cursor(), 2);
    // 10 < PER_PAGE: the result set is exhausted
    assert!(feed.is_exhausted());
    assert!(feed.next_page().is_none());
}

#[tokio::test]
async fn failed_page_leaves_feed_and_retries_same_number() {
    let server = MockServer::start().await;
    mount_page(&server, "rivers", 1, results_body("r", PER_PAGE)).await;
    // Page 2 fails with a server error
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(query_param("query", "rivers"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let mut feed = FeedController::new("music", PER_PAGE);

    let request = feed.submit_search("rivers");
    let page1 = fetch(&client, &server, &request).await.unwrap();
    feed.apply_page(request.generation, request.page, page1);

    let request = feed.next_page().unwrap();
    let err = fetch(&client, &server, &request).await.unwrap_err();
    assert!(matches!(err, SearchError::HttpStatus(500)));
    feed.fail_page(request.generation, request.page);

    // Feed untouched, loading cleared, and the retry targets page 2 again
    assert_eq!(feed.len(), PER_PAGE);
    assert!(!feed.is_loading());
    let retry = feed.next_page().unwrap();
    assert_eq!(retry.page, 2);
}

#[tokio::test]
async fn failed_first_page_is_retried_with_replace_semantics() {
    let server = MockServer::start().await;
    mount_page(&server, "music", 1, results_body("music", PER_PAGE)).await;
    // The new query's first page fails once, then succeeds
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(query_param("query", "cats"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "cats", 1, results_body("cats", 12)).await;

    let client = reqwest::Client::new();
    let mut feed = FeedController::new("music", PER_PAGE);

    let request = feed.submit_search("music");
    let page = fetch(&client, &server, &request).await.unwrap();
    feed.apply_page(request.generation, request.page, page);

    let request = feed.submit_search("cats");
    let err = fetch(&client, &server, &request).await.unwrap_err();
    assert!(matches!(err, SearchError::HttpStatus(500)));
    feed.fail_page(request.generation, request.page);

    // The previous search's grid is still on screen; scrolling its tail
    // must re-request page 1, not advance to page 2
    let retry = feed.next_page().expect("retry after failed first page");
    assert_eq!(retry.page, 1);
    let page = fetch(&client, &server, &retry).await.unwrap();
    feed.apply_page(retry.generation, retry.page, page);

    // Replace, never a union with the stale feed
    assert_eq!(feed.len(), 12);
    assert_eq!(feed.records()[0].id, "cats-0");
    assert_eq!(feed.query(), "cats");
}

#[tokio::test]
async fn slow_response_for_superseded_search_is_discarded() {
    let server = MockServer::start().await;
    mount_page(&server, "first", 1, results_body("old", PER_PAGE)).await;
    mount_page(&server, "second", 1, results_body("new", 5)).await;

    let client = reqwest::Client::new();
    let mut feed = FeedController::new("music", PER_PAGE);

    // The user searches twice in quick succession; both fetches complete,
    // but the first one finishes last.
    let old_request = feed.submit_search("first");
    let new_request = feed.submit_search("second");

    let old_result = fetch(&client, &server, &old_request).await.unwrap();
    let new_result = fetch(&client, &server, &new_request).await.unwrap();

    feed.apply_page(new_request.generation, new_request.page, new_result);
    feed.apply_page(old_request.generation, old_request.page, old_result);

    // The stale page-1 response did not overwrite the newer search
    assert_eq!(feed.len(), 5);
    assert_eq!(feed.records()[0].id, "new-0");
    assert_eq!(feed.query(), "second");
}

#[tokio::test]
async fn empty_query_yields_empty_exhausted_feed() {
    let server = MockServer::start().await;
    mount_page(&server, "", 1, serde_json::json!({"results": []})).await;

    let client = reqwest::Client::new();
    let mut feed = FeedController::new("music", PER_PAGE);

    let request = feed.submit_search("");
    let result = fetch(&client, &server, &request).await.unwrap();
    feed.apply_page(request.generation, request.page, result);

    assert!(feed.is_empty());
    assert!(feed.is_exhausted());
    assert!(feed.next_page().is_none());
}
