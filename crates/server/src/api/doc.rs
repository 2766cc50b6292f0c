//! OpenAPI documentation aggregator, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ares API",
        version = "0.1.0",
        description = "Trade-execution ingestion with a deduplicating window cache.",
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Executions", description = "Synthetic samples, window ingestion and cache administration"),
        (name = "Datasource", description = "Upstream reachability"),
    ),
    paths(
        crate::api::health::health,
        crate::api::datasource::datasource_ping,
        crate::api::executions::single_execution,
        crate::api::executions::list_executions,
        crate::api::executions::fetch_mock_executions,
        crate::api::executions::fetch_real_executions,
        crate::api::executions::clear_cache,
        crate::api::executions::cache_stats,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::datasource::PingResponse,
        crate::api::executions::FetchRequest,
        crate::api::executions::SourceStats,
        crate::api::executions::CacheStatsResponse,
    ))
)]
pub struct ApiDoc;
