use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use collector::{ActivityFetcher, ActivitySource, FetchError};
use common::config::FailurePolicy;
use normalizer::{ActivityKind, RepositoryIdentity};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use api::{build_router, ApiState};

// --- Test double for the activity backend ---

enum Outcome {
    Payload(Value),
    Status(u16, &'static str),
}

struct StubSource {
    outcomes: HashMap<ActivityKind, Outcome>,
    calls: AtomicUsize,
}

impl StubSource {
    fn healthy() -> Self {
        let mut outcomes = HashMap::new();
        outcomes.insert(
            ActivityKind::PullRequest,
            Outcome::Payload(json!({"prs": [{"id": 1, "title": "Fix bug", "state": "open"}]})),
        );
        outcomes.insert(ActivityKind::Issue, Outcome::Payload(json!([])));
        outcomes.insert(
            ActivityKind::Commit,
            Outcome::Payload(json!({
                "commits": [{"sha": "abc123", "commit": {"message": "Add feature\nmore detail"}}]
            })),
        );
        Self {
            outcomes,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(mut self, kind: ActivityKind, status: u16, body: &'static str) -> Self {
        self.outcomes.insert(kind, Outcome::Status(status, body));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivitySource for StubSource {
    async fn fetch_raw(
        &self,
        kind: ActivityKind,
        _identity: &RepositoryIdentity,
    ) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcomes.get(&kind) {
            Some(Outcome::Payload(value)) => Ok(value.clone()),
            Some(Outcome::Status(status, body)) => Err(FetchError::Status {
                kind,
                status: http::StatusCode::from_u16(*status).unwrap(),
                body: body.to_string(),
            }),
            None => Err(FetchError::EmptyPayload { kind }),
        }
    }
}

fn app_with(source: Arc<StubSource>, policy: FailurePolicy) -> Router {
    let state = Arc::new(ApiState {
        fetcher: Arc::new(ActivityFetcher::new(source)),
        policy,
        metrics_path: "/metrics",
    });
    build_router(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let res = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = app_with(Arc::new(StubSource::healthy()), FailurePolicy::FailFast);
    let (status, body) = get_json(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn activity_returns_normalized_batch() {
    let source = Arc::new(StubSource::healthy());
    let app = app_with(source.clone(), FailurePolicy::FailFast);
    let (status, body) = get_json(
        app,
        "/activity?github=octocat&repo=https://github.com/octocat/Hello-World",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.calls(), 3);
    assert_eq!(body["owner"], "octocat");
    assert_eq!(body["repo"], "Hello-World");
    assert_eq!(body["html_url"], "https://github.com/octocat/Hello-World");

    assert_eq!(body["pull_requests"]["count"], 1);
    assert_eq!(body["pull_requests"]["records"][0]["title"], "Fix bug");
    assert_eq!(body["pull_requests"]["records"][0]["state"], "open");
    assert_eq!(body["issues"]["count"], 0);
    assert_eq!(body["commits"]["count"], 1);
    assert_eq!(body["commits"]["records"][0]["title"], "Add feature");
    assert_eq!(body["commits"]["records"][0]["description"], "more detail");
    assert!(body["pull_requests"].get("raw").is_none());
    assert!(body["pull_requests"].get("error").is_none());
}

#[tokio::test]
async fn raw_flag_includes_backend_payloads() {
    let app = app_with(Arc::new(StubSource::healthy()), FailurePolicy::FailFast);
    let (status, body) = get_json(app, "/activity?github=octocat&repo=Hello-World&raw=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issues"]["raw"], json!([]));
    assert_eq!(
        body["pull_requests"]["raw"]["prs"][0]["title"],
        json!("Fix bug")
    );
}

#[tokio::test]
async fn missing_owner_is_bad_request_without_backend_calls() {
    let source = Arc::new(StubSource::healthy());
    let app = app_with(source.clone(), FailurePolicy::FailFast);
    let (status, body) = get_json(app, "/activity?repo=Hello-World").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Missing GitHub information (owner or repository)."
    );
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn failed_kind_fails_the_whole_request() {
    let source = Arc::new(StubSource::healthy().failing(ActivityKind::Issue, 500, "Internal error"));
    let app = app_with(source, FailurePolicy::FailFast);
    let (status, body) = get_json(app, "/activity?github=octocat&repo=Hello-World").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Issues 500: Internal error");
}

#[tokio::test]
async fn independent_policy_reports_errors_per_kind() {
    let source = Arc::new(StubSource::healthy().failing(ActivityKind::Issue, 500, "Internal error"));
    let app = app_with(source, FailurePolicy::FailFast);
    let (status, body) = get_json(
        app,
        "/activity?github=octocat&repo=Hello-World&policy=independent",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pull_requests"]["count"], 1);
    assert_eq!(body["commits"]["count"], 1);
    assert_eq!(body["issues"]["count"], 0);
    assert_eq!(body["issues"]["error"], "Issues 500: Internal error");
}

#[tokio::test]
async fn independent_policy_fails_when_every_kind_fails() {
    let source = Arc::new(
        StubSource::healthy()
            .failing(ActivityKind::PullRequest, 503, "down")
            .failing(ActivityKind::Issue, 503, "down")
            .failing(ActivityKind::Commit, 503, "down"),
    );
    let app = app_with(source, FailurePolicy::Independent);
    let (status, body) = get_json(app, "/activity?github=octocat&repo=Hello-World").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("PRs 503: down"), "{message}");
    assert!(message.contains("Commits 503: down"), "{message}");
}

#[tokio::test]
async fn identity_endpoint_resolves_repository_urls() {
    let app = app_with(Arc::new(StubSource::healthy()), FailurePolicy::FailFast);
    let (status, body) = get_json(
        app,
        "/activity/identity?github=%20octocat%20&repo=github.com/octocat/Spoon-Knife",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner"], "octocat");
    assert_eq!(body["repo"], "Spoon-Knife");
    assert_eq!(body["full_name"], "octocat/Spoon-Knife");
}

#[tokio::test]
async fn metrics_endpoint_exposes_fetch_counters() {
    let source = Arc::new(StubSource::healthy());
    let app = app_with(source, FailurePolicy::FailFast);
    get_json(app.clone(), "/activity?github=octocat&repo=Hello-World").await;

    let res = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("activity_fetch_requests_total"), "{text}");
}
