pub mod error;

use axum::body::Bytes;
use axum::{extract::State, routing::get, Json, Router};
use cpsearch_core::{DocId, IndexConfig, IndexHandle, IndexState, Platform, Problem};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<ResultCard>,
}

/// One ranked problem: the corpus record as loaded, plus id, platform and score.
#[derive(Serialize)]
pub struct ResultCard {
    pub id: DocId,
    #[serde(flatten)]
    pub problem: Problem,
    pub platform: Platform,
    pub score: f32,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub state: &'static str,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<IndexHandle>,
    /// Maximum results per query.
    pub top_k: usize,
}

impl AppState {
    pub fn new(index: Arc<IndexHandle>, top_k: usize) -> Self { Self { index, top_k } }
}

pub fn build_app(state: AppState, static_dir: Option<&Path>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let mut app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/status", get(status_handler))
        .route("/search", get(search_get_handler).post(search_handler));
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }
    app.with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Build the index on a blocking worker and publish it to `handle` when done.
/// A panicking build is recorded as a failure so the handle never stays "building".
pub fn spawn_index_build(handle: Arc<IndexHandle>, corpus: PathBuf, config: IndexConfig) -> JoinHandle<bool> {
    tokio::spawn(async move {
        let worker = handle.clone();
        match tokio::task::spawn_blocking(move || worker.build_from_path(&corpus, &config)).await {
            Ok(ready) => ready,
            Err(e) => {
                tracing::error!(error = %e, "index build task aborted");
                handle.fail(format!("index build task aborted: {e}"));
                false
            }
        }
    })
}

pub async fn search_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<SearchResponse>, ApiError> {
    // Readiness before anything else, body parsing included.
    let index = state.index.index()?;
    let query = parse_query(&body)?;
    let hits = index.search(&query, state.top_k)?;

    let results = hits
        .into_iter()
        .filter_map(|hit| {
            let doc = index.document(hit.doc_id)?;
            let mut problem = doc.problem.clone();
            for key in ["id", "platform", "score"] {
                problem.extra.remove(key);
            }
            Some(ResultCard { id: hit.doc_id, problem, platform: doc.platform(), score: hit.score })
        })
        .collect::<Vec<_>>();
    tracing::debug!(query = %query, results = results.len(), "search served");
    Ok(Json(SearchResponse { results }))
}

fn parse_query(body: &[u8]) -> Result<String, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(body).unwrap_or(serde_json::Value::Null);
    match value.get("query").and_then(|q| q.as_str()) {
        Some(q) if !q.is_empty() => Ok(q.to_string()),
        _ => Err(ApiError::BadRequest("Missing or invalid 'query'".into())),
    }
}

pub async fn search_get_handler() -> ApiError {
    ApiError::MethodNotAllowed("Use POST /search with JSON body: { query: 'your terms' }".into())
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = match state.index.state() {
        IndexState::Building => StatusResponse {
            state: "building",
            ready: false,
            documents: None,
            terms: None,
            built_at: None,
            error: None,
        },
        IndexState::Ready(index) => {
            let stats = index.stats();
            StatusResponse {
                state: "ready",
                ready: true,
                documents: Some(stats.num_docs),
                terms: Some(stats.num_terms),
                built_at: Some(stats.built_at),
                error: None,
            }
        }
        IndexState::Failed(reason) => StatusResponse {
            state: "failed",
            ready: false,
            documents: None,
            terms: None,
            built_at: None,
            error: Some(reason.to_string()),
        },
    };
    Json(status)
}
