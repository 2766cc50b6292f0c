//! Window-scoped incremental ingestion for one source.
//!
//! ```text
//! execute(T) ── T blank ──────────────────────────────► []
//!      │
//!      ├── is_loaded(T) ──────────────────────────────► get_since(T)
//!      │
//!      └── fetch(T) → map → merge → mark_loaded(T) ──► get_since(T)
//! ```
//!
//! Concurrent callers for the same unresolved window both fetch; merge keeps
//! the ledger free of duplicates. There is no request coalescing and no
//! internal timeout.

use std::sync::Arc;

use ares_core::{timestamp, ExecutionRecord, SourceTag};
use ares_storage::ExecutionCacheStore;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::mapper;
use crate::source::{FetchError, SourceClient};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{tag} fetch failed: {error}")]
    Fetch {
        tag: SourceTag,
        #[source]
        error: FetchError,
    },
}

/// What a warm-up call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum WarmOutcome {
    AlreadyLoaded,
    Loaded { records: usize },
    Failed { error: String },
}

pub struct IngestionCoordinator {
    tag: SourceTag,
    client: Arc<dyn SourceClient>,
    cache: Arc<ExecutionCacheStore>,
}

impl IngestionCoordinator {
    pub fn new(tag: SourceTag, client: Arc<dyn SourceClient>, cache: Arc<ExecutionCacheStore>) -> Self {
        Self { tag, client, cache }
    }

    pub fn tag(&self) -> SourceTag {
        self.tag
    }

    /// Every cached record at or after `start`, fetching and merging the
    /// window first when it has not been loaded.
    ///
    /// Only fetch failures surface as errors; store failures show up as
    /// cache misses.
    pub async fn execute(&self, start: &str) -> Result<Vec<ExecutionRecord>, IngestError> {
        if start.trim().is_empty() {
            return Ok(Vec::new());
        }

        if self.cache.is_loaded(self.tag, start).await {
            debug!(source = %self.tag, start, "window cache hit");
            return Ok(self.cache.get_since(self.tag, start).await);
        }

        debug!(source = %self.tag, start, client = self.client.name(), "window cache miss, fetching");
        let raw = self
            .client
            .fetch(start)
            .await
            .map_err(|error| IngestError::Fetch { tag: self.tag, error })?;

        let records = mapper::to_records(&raw);
        let outcome = self.cache.merge(self.tag, records).await;
        if !outcome.persisted {
            warn!(source = %self.tag, start, "ledger not persisted, window left unloaded");
            return Ok(self.cache.get_since(self.tag, start).await);
        }
        self.cache.mark_loaded(self.tag, start).await;
        info!(
            source = %self.tag,
            start,
            fetched = raw.len(),
            inserted = outcome.inserted,
            "window loaded"
        );

        Ok(self.cache.get_since(self.tag, start).await)
    }

    /// Warm today's window starting at local midnight.
    pub async fn initialize_cache(&self) -> WarmOutcome {
        self.initialize_cache_at(&timestamp::today_midnight()).await
    }

    /// Warm the window starting at `start`. Never fails; errors are logged.
    pub async fn initialize_cache_at(&self, start: &str) -> WarmOutcome {
        if self.cache.is_loaded(self.tag, start).await {
            info!(source = %self.tag, start, "cache already warm");
            return WarmOutcome::AlreadyLoaded;
        }
        match self.execute(start).await {
            Ok(records) => {
                info!(source = %self.tag, start, count = records.len(), "cache warmed");
                WarmOutcome::Loaded {
                    records: records.len(),
                }
            }
            Err(e) => {
                error!(source = %self.tag, start, error = %e, "cache warm-up failed");
                WarmOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
