//! Upstream reachability probe.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tokio::net::TcpStream;
use tracing::debug;

use crate::state::AppState;

const PING_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Serialize, utoipa::ToSchema)]
pub struct PingResponse {
    pub available: bool,
}

/// TCP connect to `target` within three seconds.
pub(crate) async fn probe(target: &str) -> bool {
    match tokio::time::timeout(PING_TIMEOUT, TcpStream::connect(target)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!(target, error = %e, "datasource unreachable");
            false
        }
        Err(_) => {
            debug!(target, "datasource probe timed out");
            false
        }
    }
}

/// Whether the network path to the data source is up.
#[utoipa::path(
    get,
    path = "/datasource/ping",
    tag = "Datasource",
    responses(
        (status = 200, description = "Probe result", body = PingResponse)
    )
)]
pub async fn datasource_ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        available: probe(&state.ping_target).await,
    })
}
