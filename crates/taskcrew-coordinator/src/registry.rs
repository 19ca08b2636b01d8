//! Worker registry: the set of available workers and their mutable state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use taskcrew_core::{CoreError, TaskResult, WorkerId, WorkerKind, WorkerSpec, WorkerStatus};

/// A worker known to the registry, with its mutable run state.
///
/// Status and history are only ever touched under this worker's own lock;
/// different workers' updates are fully independent.
#[derive(Debug)]
pub struct RegisteredWorker {
    spec: WorkerSpec,
    state: RwLock<WorkerState>,
}

#[derive(Debug, Default)]
struct WorkerState {
    status: WorkerStatus,
    /// Append-only record of completed tasks.
    history: Vec<TaskResult>,
}

impl RegisteredWorker {
    fn new(spec: WorkerSpec) -> Self {
        Self {
            spec,
            state: RwLock::new(WorkerState::default()),
        }
    }

    /// Static specification of this worker.
    pub fn spec(&self) -> &WorkerSpec {
        &self.spec
    }

    /// Worker identifier.
    pub fn id(&self) -> &WorkerId {
        &self.spec.id
    }

    /// Current status.
    pub async fn status(&self) -> WorkerStatus {
        self.state.read().await.status
    }

    /// Number of completed tasks in this worker's history.
    pub async fn completed_tasks(&self) -> usize {
        self.state.read().await.history.len()
    }

    /// Copy of this worker's completed-task history, in completion order.
    pub async fn history(&self) -> Vec<TaskResult> {
        self.state.read().await.history.clone()
    }

    /// Transition to `Working` at task invocation.
    pub(crate) async fn begin_task(&self) {
        self.state.write().await.status = WorkerStatus::Working;
    }

    /// Record a success: append to history and return to `Idle`.
    pub(crate) async fn complete_task(&self, result: TaskResult) {
        let mut state = self.state.write().await;
        state.history.push(result);
        state.status = WorkerStatus::Idle;
    }

    /// Record a failure: transition to `Error`. Failed tasks do not enter
    /// the history.
    pub(crate) async fn fail_task(&self) {
        self.state.write().await.status = WorkerStatus::Error;
    }
}

/// Holds the set of available workers for a run.
///
/// Registration order is preserved and significant: the router breaks
/// least-busy ties in favor of the first-registered worker. Workers are
/// static for the run's lifetime; there is no removal.
#[derive(Default)]
pub struct WorkerRegistry {
    workers: Vec<Arc<RegisteredWorker>>,
    index: HashMap<WorkerId, usize>,
}

impl WorkerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from worker specifications.
    pub fn from_specs(specs: impl IntoIterator<Item = WorkerSpec>) -> Result<Self, CoreError> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    /// Add a worker to the registry.
    pub fn register(&mut self, spec: WorkerSpec) -> Result<(), CoreError> {
        if self.index.contains_key(&spec.id) {
            return Err(CoreError::DuplicateWorker(spec.id));
        }
        let id = spec.id.clone();
        self.index.insert(id, self.workers.len());
        self.workers.push(Arc::new(RegisteredWorker::new(spec)));
        Ok(())
    }

    /// Workers, optionally filtered by kind, in registration order.
    pub fn list(&self, kind: Option<WorkerKind>) -> Vec<Arc<RegisteredWorker>> {
        self.workers
            .iter()
            .filter(|w| kind.map_or(true, |k| w.spec.kind == k))
            .cloned()
            .collect()
    }

    /// Look up a worker by id.
    pub fn get(&self, id: &WorkerId) -> Result<Arc<RegisteredWorker>, CoreError> {
        self.index
            .get(id)
            .map(|&i| self.workers[i].clone())
            .ok_or_else(|| CoreError::WorkerNotFound(id.clone()))
    }

    /// Iterate workers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RegisteredWorker>> {
        self.workers.iter()
    }

    /// Number of registered workers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Returns true if no workers are registered.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use taskcrew_core::{TaskId, TaskOutcome};

    fn spec(id: &str, kind: WorkerKind) -> WorkerSpec {
        WorkerSpec::new(id, kind)
    }

    fn completed(worker_id: &WorkerId) -> TaskResult {
        let now = Utc::now();
        TaskResult {
            task_id: TaskId::generate(),
            worker_id: worker_id.clone(),
            started_at: now,
            finished_at: now,
            duration: Duration::from_millis(1),
            outcome: TaskOutcome::Completed {
                output: serde_json::json!({}),
            },
        }
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let mut registry = WorkerRegistry::new();
        registry.register(spec("w1", WorkerKind::Generic)).unwrap();

        let err = registry
            .register(spec("w1", WorkerKind::Researcher))
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateWorker(WorkerId::new("w1")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_unknown_worker() {
        let registry = WorkerRegistry::new();
        let err = registry.get(&WorkerId::new("missing")).unwrap_err();
        assert_eq!(err, CoreError::WorkerNotFound(WorkerId::new("missing")));
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let registry = WorkerRegistry::from_specs([
            spec("r1", WorkerKind::Researcher),
            spec("a1", WorkerKind::Analyst),
            spec("r2", WorkerKind::Researcher),
        ])
        .unwrap();

        let all: Vec<_> = registry.list(None).iter().map(|w| w.id().clone()).collect();
        assert_eq!(all, vec!["r1".into(), "a1".into(), "r2".into()]);

        let researchers: Vec<_> = registry
            .list(Some(WorkerKind::Researcher))
            .iter()
            .map(|w| w.id().clone())
            .collect();
        assert_eq!(researchers, vec!["r1".into(), "r2".into()]);
    }

    #[tokio::test]
    async fn test_history_is_append_only_and_success_only() {
        let registry = WorkerRegistry::from_specs([spec("w1", WorkerKind::Generic)]).unwrap();
        let worker = registry.get(&WorkerId::new("w1")).unwrap();

        worker.begin_task().await;
        assert_eq!(worker.status().await, WorkerStatus::Working);

        worker.complete_task(completed(worker.id())).await;
        assert_eq!(worker.status().await, WorkerStatus::Idle);
        assert_eq!(worker.completed_tasks().await, 1);

        worker.begin_task().await;
        worker.fail_task().await;
        assert_eq!(worker.status().await, WorkerStatus::Error);
        assert_eq!(worker.completed_tasks().await, 1);
    }
}
