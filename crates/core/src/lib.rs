pub mod config;
pub mod error;
pub mod execution;
pub mod timestamp;

pub use config::Config;
pub use error::*;
pub use execution::*;
