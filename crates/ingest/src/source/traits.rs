use async_trait::async_trait;
use thiserror::Error;

use super::raw::RawExecution;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("source misconfigured: {0}")]
    Config(String),
}

/// Upstream execution feed (mock, live, ...).
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Every execution from `start` (canonical `yyyy-MM-dd HH:mm:ss`) up to
    /// now at the time of the call.
    async fn fetch(&self, start: &str) -> Result<Vec<RawExecution>, FetchError>;

    /// Client name for logs.
    fn name(&self) -> &str;
}
