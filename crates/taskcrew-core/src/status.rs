//! Status enums for Workers and the coordinator state machine.

use serde::{Deserialize, Serialize};

/// Status of a Worker in the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    /// Worker is idle and ready to accept tasks.
    #[default]
    Idle,
    /// Worker has a task in flight.
    Working,
    /// Worker's last task failed or timed out.
    Error,
}

impl WorkerStatus {
    /// Returns true if the worker has a task in flight.
    pub fn is_working(&self) -> bool {
        matches!(self, Self::Working)
    }
}

/// State of the run coordinator.
///
/// Transitions: `Idle → Dispatching → Synchronizing → (Idle | Done)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// No batch in flight.
    #[default]
    Idle,
    /// A batch's tasks are being routed and executed.
    Dispatching,
    /// All of the batch's tasks settled; synchronization step running.
    Synchronizing,
    /// Terminal; no further batches accepted.
    Done,
}

impl RunState {
    /// Returns true if the coordinator accepts no further batches.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_status_default() {
        assert_eq!(WorkerStatus::default(), WorkerStatus::Idle);
        assert!(!WorkerStatus::Idle.is_working());
        assert!(WorkerStatus::Working.is_working());
    }

    #[test]
    fn test_run_state_terminal() {
        assert!(RunState::Done.is_terminal());
        assert!(!RunState::Idle.is_terminal());
        assert!(!RunState::Dispatching.is_terminal());
        assert!(!RunState::Synchronizing.is_terminal());
    }
}
