//! TaskCrew Coordinator
//!
//! The concurrency core: a registry of typed workers, a capability-matched
//! task router, a bounded concurrent dispatcher that streams results in
//! completion order, a metrics aggregator, and a run coordinator that
//! drives synchronized batch rounds on top of them.
//!
//! The unit of work itself is opaque: callers inject a [`TaskExecutor`]
//! strategy, and per-round synchronization is an injected [`Synchronizer`].

pub mod config;
pub mod coordinator;
pub mod dispatcher;
pub mod executor;
pub mod metrics;
pub mod registry;
pub mod router;
pub mod sync;

// Re-export commonly used types
pub use config::{ConfigError, CoordinatorConfig};
pub use coordinator::{BatchOutcome, CoordinatorError, RoundReport, RoutingFailure, RunCoordinator, RunReport};
pub use dispatcher::Dispatcher;
pub use executor::{ExecutionError, TaskExecutor};
pub use metrics::{MetricsAggregator, RunMetrics, WorkerUtilization};
pub use registry::{RegisteredWorker, WorkerRegistry};
pub use router::{RoutingPolicy, TaskRouter};
pub use sync::{AveragingSynchronizer, PassthroughSynchronizer, SyncOutcome, Synchronizer};
