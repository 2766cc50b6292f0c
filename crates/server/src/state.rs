use std::sync::Arc;

use ares_ingest::{IngestionCoordinator, SnapshotCache};
use ares_storage::ExecutionCacheStore;

pub struct AppState {
    pub cache: Arc<ExecutionCacheStore>,
    pub snapshots: SnapshotCache,
    /// Coordinator for the in-process test feed.
    pub mock: Arc<IngestionCoordinator>,
    /// Coordinator for the live feed.
    pub real: Arc<IngestionCoordinator>,
    pub default_count: usize,
    pub max_count: usize,
    /// `host:port` probed by `/datasource/ping`.
    pub ping_target: String,
}
