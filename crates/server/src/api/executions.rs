//! `/test-execution` endpoints: synthetic samples, window ingestion, cache admin.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use ares_core::{ExecutionRecord, SourceTag};
use ares_ingest::IngestionCoordinator;

use crate::state::AppState;

use super::{api_error, ApiError};

// ── Synthetic samples ─────────────────────────────────────────────

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Sample size (default from config).
    pub count: Option<usize>,
}

/// A single synthetic execution.
#[utoipa::path(
    get,
    path = "/test-execution",
    tag = "Executions",
    responses(
        (status = 200, description = "One synthetic execution", body = Object)
    )
)]
pub async fn single_execution(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExecutionRecord>, ApiError> {
    state
        .snapshots
        .get_or_generate(1)
        .await
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "generator returned no record"))
}

/// Memoized synthetic sample of `count` executions.
#[utoipa::path(
    get,
    path = "/test-execution/list",
    tag = "Executions",
    params(ListParams),
    responses(
        (status = 200, description = "Synthetic executions", body = Object),
        (status = 400, description = "Invalid count", body = super::ErrorResponse)
    )
)]
pub async fn list_executions(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<ExecutionRecord>>, ApiError> {
    let Query(params) = params.map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?;
    let count = params.count.unwrap_or(state.default_count);
    if count > state.max_count {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("count must be at most {}", state.max_count),
        ));
    }
    Ok(Json(state.snapshots.get_or_generate(count).await))
}

// ── Window ingestion ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// Window start, `yyyy-MM-dd HH:mm:ss`.
    #[serde(default)]
    pub start_timestamp: Option<String>,
}

/// Empty body means no window; anything else must be a JSON object.
fn parse_fetch_body(body: &Bytes) -> Result<FetchRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(FetchRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("invalid request body: {}", e)))
}

async fn run_window(
    coordinator: &IngestionCoordinator,
    body: Bytes,
) -> Result<Json<Vec<ExecutionRecord>>, ApiError> {
    let request = parse_fetch_body(&body)?;
    let start = request.start_timestamp.unwrap_or_default();
    coordinator.execute(&start).await.map(Json).map_err(|e| {
        warn!(source = %coordinator.tag(), start = %start, error = %e, "window fetch failed");
        api_error(StatusCode::BAD_GATEWAY, e.to_string())
    })
}

/// Executions from the mock feed at or after `startTimestamp`.
#[utoipa::path(
    post,
    path = "/test-execution/test-api-executions",
    tag = "Executions",
    request_body(content = FetchRequest, description = "Optional window start"),
    responses(
        (status = 200, description = "Cached executions in the window", body = Object),
        (status = 400, description = "Malformed body", body = super::ErrorResponse),
        (status = 502, description = "Feed unavailable", body = super::ErrorResponse)
    )
)]
pub async fn fetch_mock_executions(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<ExecutionRecord>>, ApiError> {
    run_window(&state.mock, body).await
}

/// Executions from the live feed at or after `startTimestamp`.
#[utoipa::path(
    post,
    path = "/test-execution/test-real",
    tag = "Executions",
    request_body(content = FetchRequest, description = "Window start"),
    responses(
        (status = 200, description = "Cached executions in the window", body = Object),
        (status = 400, description = "Malformed body", body = super::ErrorResponse),
        (status = 502, description = "Feed unavailable", body = super::ErrorResponse)
    )
)]
pub async fn fetch_real_executions(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<ExecutionRecord>>, ApiError> {
    run_window(&state.real, body).await
}

// ── Cache admin ───────────────────────────────────────────────────

/// Drop every ledger, window marker and snapshot.
#[utoipa::path(
    delete,
    path = "/test-execution/cache",
    tag = "Executions",
    responses(
        (status = 200, description = "Cache cleared", body = String)
    )
)]
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> &'static str {
    state.cache.clear().await;
    "Cache cleared"
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SourceStats {
    pub source: String,
    pub resident: bool,
    pub records: usize,
    pub loaded_windows: Vec<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CacheStatsResponse {
    pub backend: String,
    pub sources: Vec<SourceStats>,
}

/// Per-source ledger size and loaded windows.
#[utoipa::path(
    get,
    path = "/test-execution/cache/stats",
    tag = "Executions",
    responses(
        (status = 200, description = "Ledger statistics", body = CacheStatsResponse)
    )
)]
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    let mut sources = Vec::with_capacity(SourceTag::ALL.len());
    for tag in SourceTag::ALL {
        let stats = state.cache.stats(tag).await;
        sources.push(SourceStats {
            source: stats.source.to_string(),
            resident: stats.resident,
            records: stats.records,
            loaded_windows: stats.loaded_windows,
        });
    }
    Json(CacheStatsResponse {
        backend: state.cache.backend_name().to_string(),
        sources,
    })
}
