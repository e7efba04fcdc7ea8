// tests/api_http.rs
//
// HTTP-level tests for the dashboard API without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/snapshot (ready, insufficient history, load failure)
// - GET /api/alerts + POST /api/alerts/{id}/ack
// - GET /api/articles/recent, /api/status, /api/topics

use axum::{
    body::{self, Body},
    Router,
};
use chrono::NaiveDate;
use http::{Request, StatusCode};
use serde_json::Value as Json;
use tempfile::TempDir;
use tower::ServiceExt as _; // for `oneshot`

use crypto_news_sentiment::aggregate::WindowMode;
use crypto_news_sentiment::alerts::AlertLedger;
use crypto_news_sentiment::api::{self, AppState};
use crypto_news_sentiment::article::ScoredArticle;
use crypto_news_sentiment::corpus::CorpusStore;

const BODY_LIMIT: usize = 1024 * 1024;

fn row(day: u32, title: &str, score: f64) -> ScoredArticle {
    ScoredArticle {
        date: NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
        title: title.to_string(),
        url: format!("https://news.test/{day}/{}", title.len()),
        score,
        description: None,
    }
}

/// Router over a temp corpus seeded with `rows`.
fn test_router(rows: &[ScoredArticle]) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = CorpusStore::new(dir.path().join("scores.jsonl"));
    store.append(rows).unwrap();
    let ledger = AlertLedger::open(dir.path().join("acks.json")).unwrap();
    let state = AppState::new(store, WindowMode::Rows, ledger);
    (api::router(state), dir)
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

fn shifting_corpus() -> Vec<ScoredArticle> {
    vec![
        row(1, "Bitcoin ETF approval nears", 0.0),
        row(2, "Ethereum upgrade ships", 0.05),
        row(3, "Bitcoin rally broadens", 0.6),
    ]
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let (app, _dir) = test_router(&[]);
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");
    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), "OK");
}

#[tokio::test]
async fn snapshot_is_ready_with_history() {
    let (app, _dir) = test_router(&shifting_corpus());
    let (status, v) = send(&app, "GET", "/api/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["state"], "ready");
    assert_eq!(v["aggregates"].as_array().unwrap().len(), 3);
    assert_eq!(v["alerts"][0]["kind"], "sentiment_shift");
    assert_eq!(v["recent"][0]["title"], "Bitcoin rally broadens");
    assert!(v["status"]["label"].is_string());
}

#[tokio::test]
async fn snapshot_reports_insufficient_history() {
    let (app, _dir) = test_router(&[row(1, "Lonely headline", 0.2)]);
    let (status, v) = send(&app, "GET", "/api/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["state"], "insufficient_history");
    assert_eq!(v["status"]["rationale"], "Not enough data for trend analysis");
    assert!(v.get("alerts").is_none());
}

#[tokio::test]
async fn unreadable_corpus_is_503_everywhere() {
    let (app, dir) = test_router(&[]);
    std::fs::write(dir.path().join("scores.jsonl"), "not json\n").unwrap();

    let (status, v) = send(&app, "GET", "/api/snapshot").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(v["state"], "load_failed");

    let (status, v) = send(&app, "GET", "/api/aggregates").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(v["error"].is_string());
}

#[tokio::test]
async fn acknowledged_alerts_are_filtered() {
    let (app, _dir) = test_router(&shifting_corpus());

    let (_, all) = send(&app, "GET", "/api/alerts").await;
    let id = all[0]["id"].as_str().expect("alert id").to_string();

    let (status, v) = send(&app, "POST", &format!("/api/alerts/{id}/ack")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["newly_acknowledged"], true);

    let (_, v) = send(&app, "POST", &format!("/api/alerts/{id}/ack")).await;
    assert_eq!(v["newly_acknowledged"], false);

    let (_, open) = send(&app, "GET", "/api/alerts?unacknowledged=true").await;
    assert!(open.as_array().unwrap().is_empty());

    // The unfiltered list still reports it.
    let (_, all) = send(&app, "GET", "/api/alerts").await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn recent_status_and_topics() {
    let (app, _dir) = test_router(&shifting_corpus());

    let (_, v) = send(&app, "GET", "/api/articles/recent?limit=2").await;
    let titles: Vec<&str> = v
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Bitcoin rally broadens", "Ethereum upgrade ships"]);

    let (status, v) = send(&app, "GET", "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    let score = v["score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));

    let (_, v) = send(&app, "GET", "/api/topics").await;
    assert!(v.as_array().unwrap().len() <= 5);
}
