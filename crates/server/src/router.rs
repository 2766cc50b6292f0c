//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/datasource/ping", get(api::datasource_ping))
        .route("/test-execution", get(api::single_execution))
        .route("/test-execution/list", get(api::list_executions))
        .route("/test-execution/cache", delete(api::clear_cache))
        .route("/test-execution/cache/stats", get(api::cache_stats))
        .route(
            "/test-execution/test-api-executions",
            post(api::fetch_mock_executions),
        )
        .route("/test-execution/test-real", post(api::fetch_real_executions))
        .layer(cors)
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

/// `*` allows any origin; anything else is a single exact origin.
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    if origin.trim() == "*" {
        return Ok(CorsLayer::permissive());
    }
    let value = HeaderValue::from_str(origin.trim())
        .with_context(|| format!("invalid CORS_ORIGIN '{}'", origin))?;
    Ok(CorsLayer::new()
        .allow_origin(value)
        .allow_methods(Any)
        .allow_headers(Any))
}
