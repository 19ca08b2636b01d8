//! The injected unit of work.
//!
//! The coordinator never knows what a task *does*; it invokes an opaque
//! executor strategy and manages concurrency, matching, and aggregation
//! around it. One executor is injected per deployment, replacing any
//! per-kind branching inside the core.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use taskcrew_core::{Task, WorkerSpec};

/// Error returned by a failed unit of work.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ExecutionError {
    /// Human-readable failure detail, carried into the task result.
    pub message: String,
}

impl ExecutionError {
    /// Create a new ExecutionError.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The opaque, possibly-failing unit of work.
///
/// Implementations may take arbitrary wall-clock time; the dispatcher
/// bounds them with the configured per-task timeout.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Execute one task on the given worker, returning the success payload.
    async fn execute(&self, worker: &WorkerSpec, task: &Task) -> Result<Value, ExecutionError>;
}
