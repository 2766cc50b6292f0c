//! Live execution feed over HTTP.

use std::time::Duration;

use ares_core::config::SourceConfig;
use ares_core::timestamp;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, info};

use super::raw::{RawExecution, RawExecutionBatch};
use super::traits::{FetchError, SourceClient};

/// `GET {endpoint}?startTimestamp=...` with optional basic auth.
pub struct HttpSourceClient {
    client: Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
    zone: Tz,
}

impl HttpSourceClient {
    pub fn new(config: &SourceConfig) -> Result<Self, FetchError> {
        let zone: Tz = config
            .timezone
            .parse()
            .map_err(|_| FetchError::Config(format!("unknown timezone '{}'", config.timezone)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = config.endpoint();
        info!(endpoint = %endpoint, zone = %zone, auth = config.has_credentials(), "live feed client ready");
        Ok(Self {
            client,
            endpoint,
            username: config.username.clone(),
            password: config.password.clone(),
            zone,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Render a canonical start as `yyyy-MM-ddTHH:mm±hh:mm` in `zone`.
///
/// Unparseable input falls back to midnight of `today`'s date. Local times
/// skipped by a DST jump are moved forward one hour.
pub fn upstream_start(start: &str, zone: Tz, today: NaiveDateTime) -> String {
    let local = timestamp::parse(start)
        .unwrap_or_else(|_| today.date().and_hms_opt(0, 0, 0).unwrap_or(today));

    let zoned = zone
        .from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            zone.from_local_datetime(&(local + ChronoDuration::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| zone.from_utc_datetime(&local));

    zoned.format("%Y-%m-%dT%H:%M%:z").to_string()
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    async fn fetch(&self, start: &str) -> Result<Vec<RawExecution>, FetchError> {
        let param = upstream_start(start, self.zone, timestamp::local_now());

        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("startTimestamp", param.as_str())])
            .header(ACCEPT, "application/json");
        if let Some(user) = &self.username {
            request = request.basic_auth(user, self.password.as_deref());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api { status, body });
        }

        let batch: RawExecutionBatch = response.json().await?;
        debug!(start, upstream_start = %param, count = batch.executions.len(), "live feed fetched");
        Ok(batch.executions)
    }

    fn name(&self) -> &str {
        "http"
    }
}
