use std::sync::Arc;

use ares_core::SourceTag;
use tracing::info;

use crate::coordinator::{IngestionCoordinator, WarmOutcome};

/// Primes each source's window for today before traffic arrives.
pub struct StartupWarmer {
    coordinators: Vec<Arc<IngestionCoordinator>>,
}

impl StartupWarmer {
    pub fn new(coordinators: Vec<Arc<IngestionCoordinator>>) -> Self {
        Self { coordinators }
    }

    /// Warm every source in turn. A failing source is logged and skipped.
    pub async fn run(&self) -> Vec<(SourceTag, WarmOutcome)> {
        let mut outcomes = Vec::with_capacity(self.coordinators.len());
        for coordinator in &self.coordinators {
            let outcome = coordinator.initialize_cache().await;
            outcomes.push((coordinator.tag(), outcome));
        }
        let failed = outcomes
            .iter()
            .filter(|(_, o)| matches!(o, WarmOutcome::Failed { .. }))
            .count();
        info!(sources = outcomes.len(), failed, "startup warm-up finished");
        outcomes
    }
}
