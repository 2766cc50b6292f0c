use thiserror::Error;

#[derive(Error, Debug)]
pub enum AresError {
    #[error("invalid timestamp '{0}': expected yyyy-MM-dd HH:mm:ss")]
    InvalidTimestamp(String),

    #[error("config error: {0}")]
    Config(String),
}
