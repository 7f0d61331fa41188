//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against a file-backed frontier.

use std::sync::Arc;
use tagcrawl::config::CrawlerConfig;
use tagcrawl::crawler::{Crawler, Scheduler, StepOutcome};
use tagcrawl::state::PageStatus;
use tagcrawl::storage::{EnqueueOutcome, FrontierStore, SqliteFrontier, StoreError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a crawler over a fresh database in `dir`
fn create_test_crawler(dir: &TempDir) -> Crawler<SqliteFrontier> {
    let store = SqliteFrontier::new(&dir.path().join("frontier.db")).expect("Failed to open store");
    let config = CrawlerConfig {
        store_retry_delay_ms: 1,
        request_timeout_secs: 5,
        ..CrawlerConfig::default()
    };

    Crawler::new(&config, Arc::new(store))
        .expect("Failed to create crawler")
        .with_scheduler(Scheduler::with_seed(100, 11))
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn page(crawler: &Crawler<SqliteFrontier>, tag: &str, url: &str) -> tagcrawl::PageRecord {
    crawler
        .store()
        .get_page_by_url(tag, url)
        .expect("Store query failed")
        .unwrap_or_else(|| panic!("No row for {}", url))
}

#[tokio::test]
async fn test_same_and_cross_host_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = url::Url::parse(&base_url).unwrap().port().unwrap();
    let other_host = format!("http://localhost:{}/elsewhere", port);

    let body = format!(
        r#"<html><body><a href="/local">Local</a><a href="{}">Away</a></body></html>"#,
        other_host
    );
    mount_page(&mock_server, "/", &body).await;

    let dir = TempDir::new().unwrap();
    let mut crawler = create_test_crawler(&dir);
    let seed = format!("{}/", base_url);
    crawler.seed("t", &[seed.clone()]);

    let outcome = crawler.step().await;
    assert!(matches!(
        outcome,
        StepOutcome::Fetched {
            links_enqueued: 2,
            ..
        }
    ));

    let parent = page(&crawler, "t", &seed);
    assert_eq!(parent.status(), PageStatus::Fetched);
    assert_eq!(parent.content.as_deref(), Some(body.as_str()));
    assert!(parent.error.is_none());

    let local = page(&crawler, "t", &format!("{}/local", base_url));
    assert_eq!(local.depth, parent.depth + 1);
    assert_eq!(local.parent_id, Some(parent.id));
    assert_eq!(local.status(), PageStatus::Pending);

    let away = page(&crawler, "t", &other_host);
    assert_eq!(away.depth, parent.depth + 100);
    assert_eq!(away.tag, "t");

    assert_eq!(crawler.store().count_total_pages().unwrap(), 3);
}

#[tokio::test]
async fn test_non_html_fails_without_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"%PDF-1.4 href=\"/hidden\"".to_vec(), "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut crawler = create_test_crawler(&dir);
    let seed = format!("{}/doc.pdf", base_url);
    crawler.seed("t", &[seed.clone()]);

    let outcome = crawler.step().await;
    assert!(matches!(outcome, StepOutcome::Failed { ref error, .. } if error == "Not html"));

    let row = page(&crawler, "t", &seed);
    assert_eq!(row.status(), PageStatus::Failed);
    assert_eq!(row.error.as_deref(), Some("Not html"));
    assert!(row.content.is_none());
    assert_eq!(crawler.store().count_total_pages().unwrap(), 1);
}

#[tokio::test]
async fn test_redirect_creates_no_intermediate_row() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/landing/"))
        .mount(&mock_server)
        .await;
    let final_body = r#"<html><body><a href="child">Child</a></body></html>"#;
    mount_page(&mock_server, "/landing/", final_body).await;

    let dir = TempDir::new().unwrap();
    let mut crawler = create_test_crawler(&dir);
    let seed = format!("{}/start", base_url);
    crawler.seed("t", &[seed.clone()]);

    crawler.step().await;

    let origin = page(&crawler, "t", &seed);
    assert_eq!(origin.status(), PageStatus::Fetched);
    assert_eq!(origin.content.as_deref(), Some(final_body));

    assert!(crawler
        .store()
        .get_page_by_url("t", &format!("{}/landing/", base_url))
        .unwrap()
        .is_none());

    // Relative links resolve against the final URL
    let child = page(&crawler, "t", &format!("{}/landing/child", base_url));
    assert_eq!(child.depth, 1);
    assert_eq!(crawler.store().count_total_pages().unwrap(), 2);
}

#[tokio::test]
async fn test_reseed_keeps_single_row() {
    let dir = TempDir::new().unwrap();
    let mut crawler = create_test_crawler(&dir);

    crawler.seed("t", &["http://ex.com".to_string()]);
    crawler.seed("t", &["http://ex.com".to_string()]);

    let row = page(&crawler, "t", "http://ex.com");
    assert_eq!(row.depth, 0);
    assert_eq!(crawler.store().count_total_pages().unwrap(), 1);
}

#[tokio::test]
async fn test_shared_database_dedups_across_processes() {
    let dir = TempDir::new().unwrap();
    let mut first = create_test_crawler(&dir);
    let mut second = create_test_crawler(&dir);

    first.seed("t", &["http://ex.com/".to_string()]);
    second.seed("t", &["http://ex.com/".to_string()]);
    second.seed("u", &["http://ex.com/".to_string()]);

    assert_eq!(first.store().count_total_pages().unwrap(), 2);
    assert_eq!(second.store().count_total_pages().unwrap(), 2);
}

#[tokio::test]
async fn test_mailto_and_normalization() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/p",
        r#"<a href="mailto:alice@example.com">Mail</a>
           <a href="/a?x=1&amp;y=2#frag">Normalized</a>
           <a href='/a?x=1&amp;y=2'>Duplicate</a>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut crawler = create_test_crawler(&dir);
    crawler.seed("t", &[format!("{}/p", base_url)]);

    let outcome = crawler.step().await;
    assert!(matches!(
        outcome,
        StepOutcome::Fetched {
            links_enqueued: 1,
            ..
        }
    ));

    let child = page(&crawler, "t", &format!("{}/a?x=1&y=2", base_url));
    assert_eq!(child.depth, 1);
    assert!(crawler
        .store()
        .get_page_by_url("t", "mailto:alice@example.com")
        .unwrap()
        .is_none());
    assert_eq!(crawler.store().count_total_pages().unwrap(), 2);
}

#[tokio::test]
async fn test_full_crawl_drains_frontier() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/page1">1</a><a href="/page2">2</a></body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<html><body><a href="/">Home</a><a href="/page2">2</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/page2", "<html><body>Leaf</body></html>").await;
    // Unmocked paths answer 404 without a content type

    mount_page(
        &mock_server,
        "/broken",
        r#"<a href="/missing">Missing</a>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut crawler = create_test_crawler(&dir);
    crawler.seed(
        "site",
        &[format!("{}/", base_url), format!("{}/broken", base_url)],
    );

    let summary = crawler.run().await;

    assert_eq!(summary.pages_fetched, 4);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.links_enqueued, 3);
    assert_eq!(summary.store_errors, 0);

    let store = crawler.store();
    assert_eq!(store.count_pages_by_status(PageStatus::Pending).unwrap(), 0);
    assert_eq!(store.count_total_pages().unwrap(), 5);
    assert_eq!(
        page(&crawler, "site", &format!("{}/missing", base_url))
            .error
            .as_deref(),
        Some("Not html")
    );

    // A drained frontier keeps reporting empty
    assert_eq!(crawler.step().await, StepOutcome::Empty);
}

#[test]
fn test_scheduler_always_picks_minimum_depth() {
    let dir = TempDir::new().unwrap();
    let store = SqliteFrontier::new(&dir.path().join("frontier.db")).unwrap();

    for (i, depth) in [200, 0, 101, 1, 100, 1, 0, 2].iter().enumerate() {
        store
            .enqueue(None, &format!("http://ex.com/{}", i), "t", *depth)
            .unwrap();
    }

    let mut scheduler = Scheduler::with_seed(100, 99);
    let mut picked = Vec::new();
    while let Some(candidate) = scheduler.next_candidate(&store).unwrap() {
        let minimum = store.min_pending_depth().unwrap();
        assert_eq!(Some(candidate.depth), minimum);
        store.mark_fetched(candidate.id, "").unwrap();
        picked.push(candidate.depth);
    }

    assert_eq!(picked, vec![0, 0, 1, 1, 2, 100, 101, 200]);
}

#[test]
fn test_terminal_state_is_write_once() {
    let store = SqliteFrontier::new_in_memory().unwrap();
    let EnqueueOutcome::Created(fetched) = store.enqueue(None, "http://ex.com/", "t", 0).unwrap()
    else {
        panic!("expected a new row");
    };
    let EnqueueOutcome::Created(failed) = store.enqueue(None, "http://ex.com/x", "t", 1).unwrap()
    else {
        panic!("expected a new row");
    };

    store.mark_fetched(fetched, "<html></html>").unwrap();
    store.mark_failed(failed, "Not html").unwrap();

    assert!(matches!(
        store.mark_failed(fetched, "late"),
        Err(StoreError::AlreadyTerminal(_))
    ));
    assert!(matches!(
        store.mark_fetched(failed, "late"),
        Err(StoreError::AlreadyTerminal(_))
    ));

    let fetched_row = store.get_page(fetched).unwrap();
    assert_eq!(fetched_row.status(), PageStatus::Fetched);
    assert!(fetched_row.failed.is_none());
    assert_eq!(fetched_row.content.as_deref(), Some("<html></html>"));

    let failed_row = store.get_page(failed).unwrap();
    assert_eq!(failed_row.status(), PageStatus::Failed);
    assert_eq!(failed_row.error.as_deref(), Some("Not html"));
    assert!(failed_row.fetched.is_none());

    // Re-seeding a terminal page never reopens it
    assert!(!store.reprioritize_seed("http://ex.com/x", "t", 0).unwrap());
    assert_eq!(store.get_page(failed).unwrap().depth, 1);
}
