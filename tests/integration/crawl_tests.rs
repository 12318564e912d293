//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! fetching, traversal and the worker cycle end-to-end.

use crawlet::config::{FetcherConfig, WorkerConfig};
use crawlet::crawler::{crawl, CrawlLimits, CrawlRequest, Fetcher, HttpFetcher};
use crawlet::state::TaskState;
use crawlet::storage::{NewTask, SqliteStorage, TaskStore, UrlStore, FETCH_FAILURE_STATUS};
use crawlet::worker::{Iteration, Worker};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_fetcher() -> HttpFetcher {
    let config = FetcherConfig {
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
        user_agent: "crawlet-test/1.0".to_string(),
    };
    HttpFetcher::new(&config).expect("Failed to build fetcher")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

/// Mounts an HTML page at `route` whose anchors point at `links`
async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">{}</a>"#, l, l))
        .collect();
    let body = format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    );

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(&body))
        .mount(server)
        .await;
}

fn request(root: String, max_depth: u32) -> CrawlRequest {
    CrawlRequest {
        root_url: root,
        max_depth,
        allow_domains: Vec::new(),
        blacklist: Vec::new(),
    }
}

#[tokio::test]
async fn test_fetch_html_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let body = r#"<html><head><title>  Home  </title></head><body>
        <a href="/about">About</a>
        <a href="contact">Contact</a>
        <a href="https://other.example/x">Other</a>
        <a href="mailto:someone@example.com">Mail</a>
        </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(body))
        .mount(&mock_server)
        .await;

    let record = test_fetcher().fetch(&format!("{}/", base_url)).await;

    assert_eq!(record.status_code, 200);
    assert_eq!(record.url, format!("{}/", base_url));
    assert_eq!(record.content_title.as_deref(), Some("  Home  "));
    assert_eq!(record.content_size, Some(body.len() as u64));
    assert_eq!(
        record.links,
        vec![
            format!("{}/about", base_url),
            format!("{}/contact", base_url),
            "https://other.example/x".to_string(),
            "mailto:someone@example.com".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_fetch_non_html_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"href": "/not-a-link"}"#)
                .insert_header("content-type", "application/json"),
        )
        .mount(&mock_server)
        .await;

    let record = test_fetcher()
        .fetch(&format!("{}/data.json", mock_server.uri()))
        .await;

    assert_eq!(record.status_code, 200);
    assert!(record.content_size.is_none());
    assert!(record.content_title.is_none());
    assert!(record.links.is_empty());
}

#[tokio::test]
async fn test_fetch_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html><a href='/x'>x</a></html>"))
        .mount(&mock_server)
        .await;

    // Unmatched routes answer 404
    let fetcher = test_fetcher();
    let missing = fetcher
        .fetch(&format!("{}/missing", mock_server.uri()))
        .await;
    let broken = fetcher.fetch(&format!("{}/broken", mock_server.uri())).await;

    assert_eq!(missing.status_code, 404);
    assert!(missing.content_title.is_none());
    assert_eq!(broken.status_code, 500);
    assert!(broken.links.is_empty());
    assert!(broken.is_error());
}

#[tokio::test]
async fn test_fetch_follows_redirect() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base_url)),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", "New", &[]).await;

    let record = test_fetcher().fetch(&format!("{}/old", base_url)).await;

    assert_eq!(record.status_code, 200);
    assert_eq!(record.url, format!("{}/new", base_url));
    assert_eq!(record.content_title.as_deref(), Some("New"));
}

#[tokio::test]
async fn test_fetch_unreachable_host() {
    let record = test_fetcher().fetch("http://127.0.0.1:9/").await;
    assert_eq!(record.status_code, FETCH_FAILURE_STATUS);
    assert!(record.links.is_empty());
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/a", "A", &["/b", "/c"]).await;
    mount_page(&mock_server, "/b", "B", &["/d"]).await;
    mount_page(&mock_server, "/c", "C", &[]).await;

    // D sits at depth 2 and must never be requested
    Mock::given(method("GET"))
        .and(path("/d"))
        .respond_with(html("<html><title>D</title></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let pages = crawl(&test_fetcher(), &request(format!("{}/a", base_url), 2)).await;

    let urls: Vec<_> = pages.iter().map(|p| p.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/c", base_url),
        ]
    );
    assert!(pages.iter().all(|p| p.status_code == 200));
}

#[tokio::test]
async fn test_crawl_visits_each_url_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Root", &["/loop", "/loop", "/"]).await;

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(html(r#"<html><a href="/">home</a><a href="/loop">me</a></html>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let pages = crawl(&test_fetcher(), &request(format!("{}/", base_url), 5)).await;
    assert_eq!(pages.len(), 2);
}

#[tokio::test]
async fn test_crawl_respects_allow_list_and_blacklist() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let host = url::Url::parse(&base_url)
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    mount_page(
        &mock_server,
        "/",
        "Root",
        &["/page", "/report.pdf", "http://b.invalid/elsewhere"],
    )
    .await;
    mount_page(&mock_server, "/page", "Page", &[]).await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut req = request(format!("{}/", base_url), 3);
    req.allow_domains = vec![host];
    req.blacklist = vec![".pdf".to_string()];

    let pages = crawl(&test_fetcher(), &req).await;

    let urls: Vec<_> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls.len(), 2);
    assert!(urls.iter().all(|u| !u.contains("b.invalid")));
    assert!(urls.iter().all(|u| !u.ends_with(".pdf")));
}

#[tokio::test]
async fn test_worker_processes_task_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Root", &["/one", "/missing"]).await;
    mount_page(&mock_server, "/one", "One", &["/two"]).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("crawlet.db");

    let storage = SqliteStorage::open(&db_path).expect("Failed to open storage");
    let storage = Arc::new(Mutex::new(storage));

    let task = storage
        .lock()
        .unwrap()
        .create_task(&NewTask::new(format!("{}/", base_url), 2))
        .expect("Failed to create task");
    assert_eq!(task.state, TaskState::Pending);

    let config = WorkerConfig {
        pool_size: 1,
        jitter_max_ms: 0,
        cooldown_ms: 0,
        store_retry_max_ms: 0,
    };
    let worker = Worker::new(
        0,
        Arc::clone(&storage),
        Arc::new(test_fetcher()),
        config,
        CrawlLimits::unbounded(),
    );

    let iteration = worker.run_once(None).await.expect("Worker iteration failed");
    assert!(matches!(
        iteration,
        Iteration::Completed { task_id, pages: 3, .. } if task_id == task.id
    ));

    // Queue is now empty
    assert_eq!(
        worker.run_once(None).await.expect("Worker iteration failed"),
        Iteration::Idle
    );

    let store = storage.lock().unwrap();
    let stored = store.get_task(task.id).unwrap().expect("Task should exist");
    assert_eq!(stored.state, TaskState::Completed);

    let urls = store.list_urls(0, 100).unwrap();
    assert_eq!(urls.len(), 3);
    assert!(urls.iter().all(|u| u.task_id == Some(task.id)));
    assert_eq!(urls[0].content_title.as_deref(), Some("Root"));

    let stats = store.compute_stats().unwrap();
    assert_eq!(stats.total_crawled_urls, 3);
    assert_eq!(stats.total_errors_during_crawling, 1);
    assert_eq!(stats.status_code_stats.get(&200), Some(&2));
    assert_eq!(stats.status_code_stats.get(&404), Some(&1));
    assert_eq!(stats.domain_stats.len(), 1);
    assert_eq!(stats.domain_stats[0].total_crawled_urls, 3);
}

#[tokio::test]
async fn test_two_stores_on_one_file_claim_distinct_tasks() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("shared.db");

    let mut first = SqliteStorage::open(&db_path).unwrap();
    let mut second = SqliteStorage::open(&db_path).unwrap();

    first
        .create_task(&NewTask::new("http://a.example/", 1))
        .unwrap();
    first
        .create_task(&NewTask::new("http://b.example/", 1))
        .unwrap();

    let a = first.claim_next_pending().unwrap().expect("first claim");
    let b = second.claim_next_pending().unwrap().expect("second claim");
    assert_ne!(a.id, b.id);
    assert!(second.claim_next_pending().unwrap().is_none());

    first.complete_task(&a).unwrap();
    assert!(first.complete_task(&a).is_err());
}
