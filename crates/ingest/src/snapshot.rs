use std::sync::Arc;

use ares_core::ExecutionRecord;
use ares_storage::ExecutionCacheStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::generator::ExecutionGenerator;

/// Count-keyed memo over the synthetic generator.
pub struct SnapshotCache {
    cache: Arc<ExecutionCacheStore>,
    generator: ExecutionGenerator,
    seed: Option<u64>,
}

impl SnapshotCache {
    pub fn new(cache: Arc<ExecutionCacheStore>, seed: Option<u64>) -> Self {
        Self {
            cache,
            generator: ExecutionGenerator,
            seed,
        }
    }

    /// Cached sample for `count`, generating and storing it on first use.
    pub async fn get_or_generate(&self, count: usize) -> Vec<ExecutionRecord> {
        if let Some(records) = self.cache.get_snapshot(count).await {
            debug!(count, "snapshot cache hit");
            return records;
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let records = self.generator.generate(count, &mut rng);
        self.cache.put_snapshot(count, &records).await;
        debug!(count, "snapshot generated");
        records
    }
}
