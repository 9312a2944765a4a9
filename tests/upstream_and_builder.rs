mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;

use algoquest_backend::codeforces::{Codeforces, UpstreamClient};
use algoquest_backend::error::{FetchError, SnapshotError, UpstreamError};
use algoquest_backend::snapshot::{build_snapshot, BuildReport, SnapshotStore};
use common::*;

#[tokio::test]
async fn client_walks_each_host_once_and_reports_last_failure() {
    let mut primary = mockito::Server::new_async().await;
    let mut mirror = mockito::Server::new_async().await;
    let p = primary.mock("GET", PROBLEMSET_PATH).with_status(502).expect(1).create_async().await;
    let m = mirror.mock("GET", PROBLEMSET_PATH).with_status(429).expect(1).create_async().await;

    let client = UpstreamClient::new(vec![primary.url(), mirror.url()], "test").unwrap();
    let err = client
        .get::<Value>("problemset.problems", &[], Duration::from_secs(2))
        .await
        .unwrap_err();

    match err {
        UpstreamError::AllHostsFailed { hosts, last } => {
            assert_eq!(hosts, 2);
            assert!(matches!(*last, UpstreamError::HttpStatus { status: 429, .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
    p.assert_async().await;
    m.assert_async().await;
}

#[tokio::test]
async fn empty_host_list_is_an_error() {
    let client = UpstreamClient::new(vec![], "test").unwrap();
    let err = client.get::<Value>("problemset.problems", &[], Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(err, UpstreamError::NoHosts));
}

#[tokio::test]
async fn per_tag_fetch_retries_whole_host_list_then_exhausts() {
    let mut primary = mockito::Server::new_async().await;
    let live = mock_tag(&mut primary, "graphs", 500, "", 3).await;

    let cfg = test_config(vec![primary.url(), DEAD_HOST.to_string()]);
    let cf = Codeforces::from_config(&cfg.upstream).unwrap();
    let err = cf.fetch_by_tag("graphs").await.unwrap_err();
    let FetchError::ExhaustedRetries { attempts, last } = err;
    assert_eq!(attempts, 3);
    assert!(matches!(last, UpstreamError::AllHostsFailed { hosts: 2, .. }));
    live.assert_async().await;
}

#[tokio::test]
async fn per_tag_fetch_caps_records_read() {
    let mut primary = mockito::Server::new_async().await;
    let many: Vec<_> = (0..10).map(|i| problem(i, "A", Some(800), &["math"])).collect();
    let _live = mock_tag(&mut primary, "math", 200, &ok_body(&many), 1).await;

    let mut cfg = test_config(vec![primary.url()]);
    cfg.upstream.max_live_records = 4;
    let cf = Codeforces::from_config(&cfg.upstream).unwrap();
    let got = cf.fetch_by_tag("math").await.unwrap();
    assert_eq!(got.len(), 4);
    assert_eq!(got[0].contest_id, 0);
}

#[tokio::test]
async fn accepted_lookup_reports_matching_ok_submission() {
    let mut primary = mockito::Server::new_async().await;
    let status = primary
        .mock("GET", "/api/user.status")
        .match_query(mockito::Matcher::UrlEncoded("handle".into(), "tourist".into()))
        .with_status(200)
        .with_body(
            r#"{"status":"OK","result":[
                {"id":1,"problem":{"contestId":4,"index":"A"},"verdict":"WRONG_ANSWER"},
                {"id":2,"problem":{"contestId":4,"index":"A"},"verdict":"OK"}
            ]}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let (app, _) = app(test_config(vec![primary.url()]), vec![]);

    let res = get(&app, "/cf/accepted?handle=tourist&contestId=4&index=A").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(res).await).unwrap();
    assert_eq!(body["solved"], true);
    assert_eq!(body["submissionId"], 2);

    let res = get(&app, "/cf/accepted?handle=tourist&handle=other&contestId=4&index=B").await;
    let body: Value = serde_json::from_slice(&body_bytes(res).await).unwrap();
    assert_eq!(body["solved"], false);
    assert!(body["submissionId"].is_null());

    status.assert_async().await;
}

#[tokio::test]
async fn accepted_lookup_validates_handle_and_maps_upstream_failure() {
    let (app, _) = app(test_config(vec![DEAD_HOST.to_string()]), vec![]);

    for uri in [
        "/cf/accepted?contestId=4&index=A",
        "/cf/accepted?handle=someone&index=A",
        "/cf/accepted?handle=someone&contestId=four&index=A",
        "/cf/accepted?handle=someone&contestId=4",
    ] {
        let res = get(&app, uri).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = serde_json::from_slice(&body_bytes(res).await).unwrap();
        assert!(body["error"].is_string(), "{uri}");
    }

    let res = get(&app, "/cf/accepted?handle=someone&contestId=4&index=A").await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_slice(&body_bytes(res).await).unwrap();
    assert!(body["error"].is_string());
}

fn dump_population() -> Vec<algoquest_backend::domain::Problem> {
    let mut v = Vec::new();
    for i in 0..300 {
        v.push(problem(i, "A", Some(800 + (i % 1400)), &["implementation"]));
    }
    v.push(problem(5000, "A", Some(3000), &["math"]));
    v.push(problem(5001, "A", None, &["math"]));
    v
}

#[tokio::test]
async fn builder_writes_bounded_snapshot_the_service_can_load() {
    let mut primary = mockito::Server::new_async().await;
    let dump = mock_dump(&mut primary, 200, &ok_body(&dump_population()), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("data").join("snapshot.json");
    let mut cfg = test_config(vec![primary.url()]);
    cfg.builder.target_size = 60;

    let cf = Codeforces::from_config(&cfg.upstream).unwrap();
    let report = build_snapshot(&cf, &cfg.builder, &out).await.unwrap();
    let BuildReport::Written { count } = report else { panic!("expected a written snapshot") };
    assert!(count <= 60);

    let store = SnapshotStore::load(&out);
    assert_eq!(store.len(), count);
    assert!(store.records().iter().all(|r| matches!(r.rating, Some(x) if (800..=2200).contains(&x))));
    dump.assert_async().await;
}

#[tokio::test]
async fn builder_keeps_existing_snapshot_when_download_fails() {
    let mut primary = mockito::Server::new_async().await;
    let dump = mock_dump(&mut primary, 503, "", 4).await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("snapshot.json");
    std::fs::write(&out, "[]").unwrap();

    let cfg = test_config(vec![primary.url()]);
    let cf = Codeforces::from_config(&cfg.upstream).unwrap();
    let report = build_snapshot(&cf, &cfg.builder, &out).await.unwrap();
    assert_eq!(report, BuildReport::KeptExisting);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "[]");
    dump.assert_async().await;
}

#[tokio::test]
async fn builder_fails_without_prior_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("snapshot.json");

    let mut cfg = test_config(vec![DEAD_HOST.to_string()]);
    cfg.builder.attempts = 2;
    let cf = Codeforces::from_config(&cfg.upstream).unwrap();
    let err = build_snapshot(&cf, &cfg.builder, &out).await.unwrap_err();
    assert!(matches!(err, SnapshotError::Download(FetchError::ExhaustedRetries { attempts: 2, .. })));
    assert!(!out.exists());
}
