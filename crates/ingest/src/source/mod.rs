pub mod http;
pub mod mock;
pub mod raw;
pub mod traits;

pub use http::HttpSourceClient;
pub use mock::MockSourceClient;
pub use raw::{RawExecution, RawExecutionBatch};
pub use traits::{FetchError, SourceClient};
