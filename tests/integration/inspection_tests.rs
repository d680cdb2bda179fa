//! Integration tests for the inspector and the job engine
//!
//! These tests use wiremock to stand in for the inspection API and run
//! whole jobs end-to-end against a file-backed checkpoint database.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use sumi_inspect::config::SchedulerConfig;
use sumi_inspect::inspection::{
    EnvToken, Inspector, SearchConsoleInspector, StaticToken, INSPECT_PATH,
};
use sumi_inspect::output::{aggregate, export_csv, ResultFilter, StatusFilter};
use sumi_inspect::storage::{CheckpointStore, SqliteCheckpointStore};
use sumi_inspect::{JobController, JobStatus};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const SITE: &str = "https://example.com/";

fn inspector_for(server: &MockServer) -> SearchConsoleInspector {
    SearchConsoleInspector::with_client(
        reqwest::Client::new(),
        &server.uri(),
        Arc::new(StaticToken::new("test-token")),
    )
}

fn indexed_body(last_crawl: &str) -> Value {
    json!({
        "inspectionResult": {
            "indexStatusResult": {
                "verdict": "PASS",
                "coverageState": "Submitted and indexed",
                "lastCrawlTime": last_crawl
            }
        }
    })
}

/// Answers per URL: `/missing/...` gets a 404 API error, `/new/...` is not
/// indexed, everything else is indexed
struct InspectResponder;

impl Respond for InspectResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let url = body["inspectionUrl"].as_str().unwrap_or_default();

        if url.contains("/missing/") {
            ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND" }
            }))
        } else if url.contains("/new/") {
            ResponseTemplate::new(200).set_body_json(json!({
                "inspectionResult": {
                    "indexStatusResult": { "coverageState": "Discovered - currently not indexed" }
                }
            }))
        } else {
            ResponseTemplate::new(200).set_body_json(indexed_body("2024-05-01T10:00:00Z"))
        }
    }
}

fn site_urls() -> Vec<String> {
    let mut urls = Vec::new();
    for i in 0..6 {
        urls.push(format!("https://example.com/blog/{}", i));
    }
    for i in 0..3 {
        urls.push(format!("https://example.com/new/{}", i));
    }
    for i in 0..3 {
        urls.push(format!("https://example.com/missing/{}", i));
    }
    urls
}

fn fast_scheduler() -> SchedulerConfig {
    SchedulerConfig {
        batch_size: 5,
        batch_delay_ms: 10,
        checkpoint_interval: 5,
        pause_poll_ms: 10,
        ..SchedulerConfig::default()
    }
}

#[tokio::test]
async fn test_inspect_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INSPECT_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(indexed_body("2024-05-01T10:00:00Z")))
        .expect(1)
        .mount(&server)
        .await;

    let result = inspector_for(&server)
        .inspect("https://example.com/a", SITE)
        .await;

    assert!(result.is_indexed());
    let status = result.index_status().unwrap();
    assert_eq!(status.verdict.as_deref(), Some("PASS"));
    assert_eq!(status.last_crawl_time.as_deref(), Some("2024-05-01T10:00:00Z"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["inspectionUrl"], "https://example.com/a");
    assert_eq!(body["siteUrl"], SITE);
}

#[tokio::test]
async fn test_inspect_api_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INSPECT_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Quota exceeded for quota metric", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&server)
        .await;

    let result = inspector_for(&server)
        .inspect("https://example.com/a", SITE)
        .await;

    assert_eq!(result.error_message(), Some("Quota exceeded for quota metric"));
}

#[tokio::test]
async fn test_inspect_http_error_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INSPECT_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = inspector_for(&server)
        .inspect("https://example.com/a", SITE)
        .await;

    assert_eq!(result.error_message(), Some("HTTP 503"));
}

#[tokio::test]
async fn test_inspect_malformed_responses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INSPECT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(INSPECT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "inspectionResult": {} })))
        .mount(&server)
        .await;

    let inspector = inspector_for(&server);

    let garbled = inspector.inspect("https://example.com/a", SITE).await;
    assert!(garbled
        .error_message()
        .unwrap()
        .starts_with("Malformed response"));

    let empty = inspector.inspect("https://example.com/b", SITE).await;
    assert_eq!(
        empty.error_message(),
        Some("Malformed response: missing indexStatusResult")
    );
}

#[tokio::test]
async fn test_missing_token_never_calls_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(indexed_body("x")))
        .expect(0)
        .mount(&server)
        .await;

    let inspector = SearchConsoleInspector::with_client(
        reqwest::Client::new(),
        &server.uri(),
        Arc::new(EnvToken::new("SUMI_INSPECT_TEST_TOKEN_THAT_IS_NEVER_SET")),
    );

    let result = inspector.inspect("https://example.com/a", SITE).await;
    assert!(result
        .error_message()
        .unwrap()
        .contains("SUMI_INSPECT_TEST_TOKEN_THAT_IS_NEVER_SET"));
}

#[tokio::test]
async fn test_unreachable_api_is_a_per_url_error() {
    // nothing listens on the discard port
    let inspector = SearchConsoleInspector::with_client(
        reqwest::Client::new(),
        "http://127.0.0.1:9",
        Arc::new(StaticToken::new("t")),
    );

    let result = inspector.inspect("https://example.com/a", SITE).await;
    assert!(result.error_message().is_some());
}

#[tokio::test]
async fn test_full_job_against_mock_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INSPECT_PATH))
        .respond_with(InspectResponder)
        .expect(12)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteCheckpointStore::new(&dir.path().join("jobs.db")).unwrap());

    let urls = site_urls();
    let job = JobController::new(
        Arc::new(inspector_for(&server)),
        store.clone(),
        fast_scheduler(),
    )
    .run(urls.clone())
    .await
    .unwrap();

    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.site_url(), SITE);
    let order: Vec<_> = job.results().iter().map(|r| r.url.clone()).collect();
    assert_eq!(order, urls);

    let summary = aggregate(job.results());
    assert_eq!(summary.overall.total, 12);
    assert_eq!(summary.overall.indexed, 6);
    assert_eq!(summary.overall.not_indexed, 3);
    assert_eq!(summary.overall.errors, 3);
    assert_eq!(summary.directories[0].directory, "/blog/");
    assert_eq!(summary.errors[0].error, "Requested entity was not found.");
    assert_eq!(summary.errors[0].count, 3);

    let checkpoint = store.load(job.id()).unwrap().unwrap();
    assert_eq!(checkpoint.status, JobStatus::Completed);
    assert_eq!(checkpoint.completed_urls, 12);
    assert_eq!(checkpoint.results, job.results().to_vec());

    let errors = ResultFilter::new().with_status(StatusFilter::Error);
    assert_eq!(errors.apply(job.results()).len(), 3);

    let csv_path = dir.path().join("results.csv");
    export_csv(job.results(), &csv_path).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 13);
    assert!(csv.contains("https://example.com/missing/0,Error,,Requested entity was not found."));
}

#[tokio::test]
async fn test_cancel_then_resume_from_database() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INSPECT_PATH))
        .respond_with(InspectResponder)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jobs.db");
    let urls = site_urls();

    // long delay so the job is parked between batches when cancelled
    let slow = SchedulerConfig {
        batch_delay_ms: 60_000,
        ..fast_scheduler()
    };
    let store = Arc::new(SqliteCheckpointStore::new(&db_path).unwrap());
    let controller = JobController::new(Arc::new(inspector_for(&server)), store, slow);
    let handle = controller.handle();
    let task = tokio::spawn(controller.run(urls.clone()));

    let mut rx = handle.subscribe();
    while rx.borrow_and_update().current < 5 {
        rx.changed().await.unwrap();
    }
    handle.cancel().unwrap();

    let cancelled = tokio::time::timeout(Duration::from_secs(10), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(cancelled.status(), JobStatus::Cancelled);
    assert_eq!(cancelled.completed(), 5);

    // a new process would reopen the database
    let reopened = Arc::new(SqliteCheckpointStore::new(&db_path).unwrap());
    let checkpoint = reopened.load(cancelled.id()).unwrap().unwrap();
    assert_eq!(checkpoint.status, JobStatus::Cancelled);
    assert_eq!(checkpoint.completed_urls, 5);

    let resumed = JobController::new(
        Arc::new(inspector_for(&server)),
        reopened.clone(),
        fast_scheduler(),
    )
    .resume(checkpoint, urls.clone())
    .await
    .unwrap();

    assert_eq!(resumed.id(), cancelled.id());
    assert_eq!(resumed.status(), JobStatus::Completed);
    let order: Vec<_> = resumed.results().iter().map(|r| r.url.clone()).collect();
    assert_eq!(order, urls);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 12);

    let listed = reopened.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, JobStatus::Completed);
}
