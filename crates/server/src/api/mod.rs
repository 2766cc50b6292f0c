//! Domain-focused API endpoint modules.
//!
//! Shared error type lives here in mod.rs.

mod datasource;
pub mod doc;
mod executions;
mod health;


use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ── Re-exports ───────────────────────────────────────────────────

pub use datasource::datasource_ping;
pub use executions::{
    cache_stats, clear_cache, fetch_mock_executions, fetch_real_executions, list_executions,
    single_execution,
};
pub use health::health;
