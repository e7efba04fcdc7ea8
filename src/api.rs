//! HTTP surface for the display layer. Every read recomputes from the corpus.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::aggregate::{aggregate_with, DailyAggregate, WindowMode};
use crate::alerts::{alerts, Alert, AlertLedger};
use crate::article::ScoredArticle;
use crate::corpus::{recent, CorpusStore};
use crate::error::SentimentError;
use crate::snapshot::{RecentArticle, Snapshot, DEFAULT_RECENT_COUNT};
use crate::status::{status_or_default, SentimentStatus};
use crate::topics::{hot_topics, TopicCount, DEFAULT_TOPIC_COUNT};

const MAX_RECENT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CorpusStore>,
    pub window_mode: WindowMode,
    pub ledger: Arc<Mutex<AlertLedger>>,
}

impl AppState {
    pub fn new(store: CorpusStore, window_mode: WindowMode, ledger: AlertLedger) -> Self {
        Self {
            store: Arc::new(store),
            window_mode,
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    fn corpus(&self) -> Result<Vec<ScoredArticle>, ApiError> {
        self.store.load().map_err(ApiError::from)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/snapshot", get(snapshot))
        .route("/api/aggregates", get(aggregates))
        .route("/api/status", get(current_status))
        .route("/api/alerts", get(list_alerts))
        .route("/api/alerts/{id}/ack", post(ack_alert))
        .route("/api/articles/recent", get(recent_articles))
        .route("/api/topics", get(topics))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// JSON error body `{"error": ...}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<SentimentError> for ApiError {
    fn from(e: SentimentError) -> Self {
        let status = match e {
            SentimentError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn snapshot(State(state): State<AppState>) -> Response {
    let snap = Snapshot::load(&state.store, state.window_mode);
    let code = match snap {
        Snapshot::LoadFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (code, Json(snap)).into_response()
}

async fn aggregates(State(state): State<AppState>) -> Result<Json<Vec<DailyAggregate>>, ApiError> {
    let corpus = state.corpus()?;
    Ok(Json(aggregate_with(&corpus, state.window_mode)))
}

async fn current_status(State(state): State<AppState>) -> Result<Json<SentimentStatus>, ApiError> {
    let corpus = state.corpus()?;
    Ok(Json(status_or_default(&aggregate_with(&corpus, state.window_mode))))
}

#[derive(Debug, Deserialize)]
struct AlertsQuery {
    #[serde(default)]
    unacknowledged: bool,
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(q): Query<AlertsQuery>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    let corpus = state.corpus()?;
    let fired = alerts(&aggregate_with(&corpus, state.window_mode));
    if !q.unacknowledged {
        return Ok(Json(fired));
    }
    let ledger = state.ledger.lock().map_err(|_| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "alert ledger unavailable".into(),
    })?;
    Ok(Json(ledger.unacknowledged(fired)))
}

#[derive(Debug, Serialize)]
struct AckResp {
    id: String,
    newly_acknowledged: bool,
}

async fn ack_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AckResp>, ApiError> {
    let mut ledger = state.ledger.lock().map_err(|_| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "alert ledger unavailable".into(),
    })?;
    let newly_acknowledged = ledger.acknowledge(&id)?;
    Ok(Json(AckResp {
        id,
        newly_acknowledged,
    }))
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

async fn recent_articles(
    State(state): State<AppState>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<Vec<RecentArticle>>, ApiError> {
    let corpus = state.corpus()?;
    let n = q.limit.unwrap_or(DEFAULT_RECENT_COUNT).min(MAX_RECENT);
    Ok(Json(recent(&corpus, n).into_iter().map(RecentArticle::from).collect()))
}

async fn topics(State(state): State<AppState>) -> Result<Json<Vec<TopicCount>>, ApiError> {
    let corpus = state.corpus()?;
    Ok(Json(hot_topics(&corpus, DEFAULT_TOPIC_COUNT)))
}
