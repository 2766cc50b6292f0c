//! In-process test feed shaped like the live one.

use std::sync::Arc;

use ares_core::timestamp;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use super::raw::RawExecution;
use super::traits::{FetchError, SourceClient};

const MIN_RECORDS: i64 = 10;
const MAX_RECORDS: i64 = 100;

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Deterministic feed: the same `start` and clock reading always yield the
/// same batch, so repeated fetches exercise deduplication.
pub struct MockSourceClient {
    clock: Clock,
}

impl Default for MockSourceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSourceClient {
    pub fn new() -> Self {
        Self::with_clock(timestamp::local_now)
    }

    /// Use `clock` as "now" instead of the local wall clock.
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + Sync + 'static,
    {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Build the batch covering `start..now`.
    pub fn generate(&self, start: &str) -> Vec<RawExecution> {
        let now = (self.clock)();
        let mut start_time = timestamp::parse(start).unwrap_or_else(|_| {
            now.date().and_hms_opt(0, 0, 0).unwrap_or(now)
        });
        if start_time > now {
            start_time = now;
        }

        let hours = (now - start_time).num_hours();
        let count = (hours + 1).clamp(MIN_RECORDS, MAX_RECORDS);

        (0..count)
            .map(|i| {
                let offset = if hours > 0 && count > 1 {
                    i * hours / (count - 1)
                } else {
                    i
                };
                sample(i, start_time + Duration::hours(offset))
            })
            .collect()
    }
}

fn sample(i: i64, at: NaiveDateTime) -> RawExecution {
    RawExecution {
        trade_id: Some(format!("4567-morganstanley{}", 87654 + i)),
        kind: Some("CASH_EXECUTTION".into()),
        execution_state: Some("INSERTED".into()),
        user_id: Some("etfs_121_exec_europe_uat".into()),
        product_id: Some("VOD@XLON".into()),
        session_id: Some("fix:MorganStanley-morganstanley".into()),
        way: Some(if i % 2 == 0 { "B" } else { "S" }.into()),
        price: Some(96.2 + i as f64 * 0.5),
        quantity: Some(10.0 + i as f64),
        order_id: Some(format!("dytfgdhez:{}", 654345678 + i)),
        timestamp: Some(at),
        event_timestamp: Some(at),
        portfolio_id: Some(format!("5C4D-{}", 865444 + i)),
        mic: Some("XLON".into()),
        currency_id: Some("GBX".into()),
        market_trade_id: Some(format!("28554{}", i)),
        trade_type: Some("regular".into()),
        version: Some(0),
    }
}

#[async_trait]
impl SourceClient for MockSourceClient {
    async fn fetch(&self, start: &str) -> Result<Vec<RawExecution>, FetchError> {
        let batch = self.generate(start);
        debug!(start, count = batch.len(), "mock feed generated batch");
        Ok(batch)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
