pub mod coordinator;
pub mod generator;
pub mod mapper;
pub mod snapshot;
pub mod source;
pub mod warmer;

pub use coordinator::{IngestError, IngestionCoordinator, WarmOutcome};
pub use generator::ExecutionGenerator;
pub use snapshot::SnapshotCache;
pub use source::{FetchError, HttpSourceClient, MockSourceClient, RawExecution, SourceClient};
pub use warmer::StartupWarmer;
