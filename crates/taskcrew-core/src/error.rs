//! Core domain errors.

use crate::{TaskKind, WorkerId};
use thiserror::Error;

/// Core domain errors for TaskCrew.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A worker with this id is already registered.
    #[error("Worker already registered: {0}")]
    DuplicateWorker(WorkerId),

    /// Unknown worker id.
    #[error("Worker not found: {0}")]
    WorkerNotFound(WorkerId),

    /// No registered worker matches the task's type tag.
    #[error("No eligible worker for task kind: {kind}")]
    NoEligibleWorker { kind: TaskKind },
}
