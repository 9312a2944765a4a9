//! Shared fixtures: fake upstream hosts (mockito), app wiring, request helpers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use mockito::{Matcher, Mock, ServerGuard};
use tower::ServiceExt;

use algoquest_backend::cache::SystemClock;
use algoquest_backend::config::ServiceConfig;
use algoquest_backend::domain::Problem;
use algoquest_backend::routes::build_router;
use algoquest_backend::snapshot::SnapshotStore;
use algoquest_backend::state::AppState;

pub const PROBLEMSET_PATH: &str = "/api/problemset.problems";

/// Host that refuses connections.
pub const DEAD_HOST: &str = "http://127.0.0.1:1";

/// Fast retries and short timeouts so failure paths finish quickly.
pub fn test_config(hosts: Vec<String>) -> ServiceConfig {
    let mut cfg = ServiceConfig::default();
    cfg.upstream.hosts = hosts;
    cfg.upstream.timeout_ms = 2_000;
    cfg.upstream.dump_timeout_ms = 2_000;
    cfg.upstream.retry_base_delay_ms = 1;
    cfg.builder.retry_base_delay_ms = 1;
    cfg.builder.timeout_ms = 2_000;
    cfg
}

pub fn app(cfg: ServiceConfig, snapshot: Vec<Problem>) -> (Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::with_parts(cfg, Arc::new(SystemClock), SnapshotStore::from_records(snapshot))
            .expect("client builds"),
    );
    (build_router(state.clone()), state)
}

pub fn problem(contest_id: i64, index: &str, rating: Option<i64>, tags: &[&str]) -> Problem {
    Problem {
        contest_id,
        index: index.to_string(),
        name: format!("Problem {contest_id}{index}"),
        rating,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn ok_body(problems: &[Problem]) -> String {
    serde_json::json!({
        "status": "OK",
        "result": { "problems": problems, "problemStatistics": [] }
    })
    .to_string()
}

/// Per-tag problemset call for `tag`.
pub async fn mock_tag(server: &mut ServerGuard, tag: &str, status: usize, body: &str, hits: usize) -> Mock {
    server
        .mock("GET", PROBLEMSET_PATH)
        .match_query(Matcher::UrlEncoded("tags".into(), tag.into()))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

/// Full-dump problemset call (no query string).
pub async fn mock_dump(server: &mut ServerGuard, status: usize, body: &str, hits: usize) -> Mock {
    server
        .mock("GET", PROBLEMSET_PATH)
        .match_query(Matcher::Regex("^$".into()))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

pub async fn body_bytes(res: Response<Body>) -> Vec<u8> {
    to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub fn header<'a>(res: &'a Response<Body>, name: &str) -> Option<&'a str> {
    res.headers().get(name).and_then(|v| v.to_str().ok())
}
