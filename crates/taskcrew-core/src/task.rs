//! Task and TaskResult types.

use crate::{TaskId, TaskKind, WorkerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// A unit of work submitted for execution.
///
/// Immutable once submitted to a coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier, assigned at construction.
    pub id: TaskId,

    /// Type tag used for routing.
    pub kind: TaskKind,

    /// Opaque payload handed to the executor.
    #[serde(default)]
    pub payload: Value,

    /// When the task was created.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new Task with a generated identifier and empty payload.
    pub fn new(kind: TaskKind) -> Self {
        Self {
            id: TaskId::generate(),
            kind,
            payload: Value::Null,
            created_at: Utc::now(),
        }
    }

    /// Builder method to set the payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Builder method to set a specific ID (useful for testing).
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }
}

/// Why a dispatched task failed.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskFailure {
    /// The executor returned an error.
    #[error("Task execution failed: {message}")]
    Execution { message: String },

    /// The executor exceeded the per-task deadline.
    #[error("Task timed out after {limit:?}")]
    Timeout { limit: Duration },
}

impl TaskFailure {
    /// Returns true if this failure is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Terminal outcome of a dispatched task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The executor returned a success payload.
    Completed { output: Value },
    /// The executor failed or timed out.
    Failed { error: TaskFailure },
}

/// Record of one dispatched task's execution.
///
/// Produced exactly once per (worker, task) pair that reaches the
/// dispatcher; tasks that fail routing never produce a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// The task that was executed.
    pub task_id: TaskId,

    /// The worker that executed it.
    pub worker_id: WorkerId,

    /// When execution started.
    pub started_at: DateTime<Utc>,

    /// When execution reached a terminal state.
    pub finished_at: DateTime<Utc>,

    /// Wall-clock execution time.
    pub duration: Duration,

    /// Success payload or failure detail.
    #[serde(flatten)]
    pub outcome: TaskOutcome,
}

impl TaskResult {
    /// Returns true if the task completed successfully.
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Completed { .. })
    }

    /// The success output, if any.
    pub fn output(&self) -> Option<&Value> {
        match &self.outcome {
            TaskOutcome::Completed { output } => Some(output),
            TaskOutcome::Failed { .. } => None,
        }
    }

    /// The failure detail, if any.
    pub fn failure(&self) -> Option<&TaskFailure> {
        match &self.outcome {
            TaskOutcome::Completed { .. } => None,
            TaskOutcome::Failed { error } => Some(error),
        }
    }

    /// Read a numeric field out of the success output.
    ///
    /// Returns None for failed results and for missing or non-numeric
    /// fields. Used by the averaging synchronization step.
    pub fn numeric_field(&self, field: &str) -> Option<f64> {
        self.output()?.get(field)?.as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completed_result(output: Value) -> TaskResult {
        let now = Utc::now();
        TaskResult {
            task_id: TaskId::generate(),
            worker_id: WorkerId::new("worker-0"),
            started_at: now,
            finished_at: now,
            duration: Duration::from_millis(5),
            outcome: TaskOutcome::Completed { output },
        }
    }

    #[test]
    fn test_task_builder() {
        let task = Task::new(TaskKind::Research).with_payload(json!({"query": "rust"}));
        assert_eq!(task.kind, TaskKind::Research);
        assert_eq!(task.payload["query"], "rust");
    }

    #[test]
    fn test_numeric_field() {
        let result = completed_result(json!({"accuracy": 0.92, "label": "ok"}));
        assert_eq!(result.numeric_field("accuracy"), Some(0.92));
        assert_eq!(result.numeric_field("label"), None);
        assert_eq!(result.numeric_field("missing"), None);
    }

    #[test]
    fn test_failed_result_accessors() {
        let now = Utc::now();
        let result = TaskResult {
            task_id: TaskId::generate(),
            worker_id: WorkerId::new("worker-0"),
            started_at: now,
            finished_at: now,
            duration: Duration::from_millis(5),
            outcome: TaskOutcome::Failed {
                error: TaskFailure::Timeout {
                    limit: Duration::from_secs(1),
                },
            },
        };

        assert!(!result.is_completed());
        assert!(result.output().is_none());
        assert!(result.failure().unwrap().is_timeout());
        assert_eq!(result.numeric_field("accuracy"), None);
    }
}
