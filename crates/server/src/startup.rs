//! Server startup: shared state construction and cache warm-up.

use std::sync::Arc;

use ares_core::{Config, SourceTag};
use ares_ingest::{
    HttpSourceClient, IngestionCoordinator, MockSourceClient, SnapshotCache, StartupWarmer,
    WarmOutcome,
};
use ares_storage::{build_store, ExecutionCacheStore};
use tracing::{info, warn};

use crate::state::AppState;

pub async fn build_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    config.validate()?;
    let store = build_store(&config.cache).await?;
    let cache = Arc::new(ExecutionCacheStore::new(store, config.cache.ttl()));
    info!("Execution cache ready (backend: {})", cache.backend_name());

    let mock = Arc::new(IngestionCoordinator::new(
        SourceTag::MockApi,
        Arc::new(MockSourceClient::new()),
        cache.clone(),
    ));
    let real = Arc::new(IngestionCoordinator::new(
        SourceTag::RealApi,
        Arc::new(HttpSourceClient::new(&config.source)?),
        cache.clone(),
    ));

    Ok(Arc::new(AppState {
        snapshots: SnapshotCache::new(cache.clone(), config.snapshot.seed),
        cache,
        mock,
        real,
        default_count: config.snapshot.default_count,
        max_count: config.snapshot.max_count,
        ping_target: config.server.ping_target.clone(),
    }))
}

/// Prime today's window for every source. Failures are logged, never fatal.
pub async fn warm(state: &AppState) {
    let warmer = StartupWarmer::new(vec![state.mock.clone(), state.real.clone()]);
    for (source, outcome) in warmer.run().await {
        match outcome {
            WarmOutcome::AlreadyLoaded => info!("  {}: already warm", source),
            WarmOutcome::Loaded { records } => info!("  {}: {} records", source, records),
            WarmOutcome::Failed { error } => {
                warn!("  {}: warm-up failed ({}), serving cold", source, error)
            }
        }
    }
}
