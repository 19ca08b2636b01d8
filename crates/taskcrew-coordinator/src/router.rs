//! Task router - matches tasks to eligible workers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use taskcrew_core::{CoreError, Task};

use crate::registry::{RegisteredWorker, WorkerRegistry};

/// Whether a worker with a task in flight may receive another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// A `Working` worker stays eligible; the least-busy tie-break is the
    /// only back-pressure. This is the default.
    #[default]
    Shared,
    /// Strict one-task-per-worker: workers with a task in flight are
    /// skipped.
    Exclusive,
}

/// Selects an eligible worker for each incoming task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskRouter {
    policy: RoutingPolicy,
}

impl TaskRouter {
    /// Create a router with the given policy.
    pub fn new(policy: RoutingPolicy) -> Self {
        Self { policy }
    }

    /// The configured routing policy.
    pub fn policy(&self) -> RoutingPolicy {
        self.policy
    }

    /// Select a worker for the task.
    ///
    /// Eligible workers are those whose kind matches the task's type tag
    /// (or the task is generic) and whose status is admitted by the
    /// policy. Among eligible workers the one with the fewest completed
    /// tasks wins; ties go to the first-registered worker.
    pub async fn route(
        &self,
        task: &Task,
        registry: &WorkerRegistry,
    ) -> Result<Arc<RegisteredWorker>, CoreError> {
        let mut selected: Option<(Arc<RegisteredWorker>, usize)> = None;

        for worker in registry.iter() {
            if !worker.spec().supports(task.kind) {
                continue;
            }
            if self.policy == RoutingPolicy::Exclusive && worker.status().await.is_working() {
                continue;
            }

            let completed = worker.completed_tasks().await;
            match &selected {
                // Strict less-than keeps the earlier-registered worker on ties.
                Some((_, best)) if completed >= *best => {}
                _ => selected = Some((worker.clone(), completed)),
            }
        }

        match selected {
            Some((worker, completed)) => {
                debug!(
                    task_id = %task.id,
                    worker_id = %worker.id(),
                    completed_tasks = completed,
                    "Routed task"
                );
                Ok(worker)
            }
            None => Err(CoreError::NoEligibleWorker { kind: task.kind }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use taskcrew_core::{TaskId, TaskKind, TaskOutcome, TaskResult, WorkerId, WorkerKind, WorkerSpec};

    fn registry(specs: Vec<WorkerSpec>) -> WorkerRegistry {
        WorkerRegistry::from_specs(specs).unwrap()
    }

    async fn give_completed(registry: &WorkerRegistry, id: &str, count: usize) {
        let worker = registry.get(&WorkerId::new(id)).unwrap();
        for _ in 0..count {
            let now = Utc::now();
            worker
                .complete_task(TaskResult {
                    task_id: TaskId::generate(),
                    worker_id: worker.id().clone(),
                    started_at: now,
                    finished_at: now,
                    duration: Duration::from_millis(1),
                    outcome: TaskOutcome::Completed {
                        output: serde_json::json!({}),
                    },
                })
                .await;
        }
    }

    #[tokio::test]
    async fn test_route_by_kind() {
        let registry = registry(vec![
            WorkerSpec::new("r1", WorkerKind::Researcher),
            WorkerSpec::new("a1", WorkerKind::Analyst),
        ]);
        let router = TaskRouter::default();

        let worker = router
            .route(&Task::new(TaskKind::Analysis), &registry)
            .await
            .unwrap();
        assert_eq!(worker.id().as_str(), "a1");
    }

    #[tokio::test]
    async fn test_no_eligible_worker() {
        let registry = registry(vec![WorkerSpec::new("r1", WorkerKind::Researcher)]);
        let router = TaskRouter::default();

        let err = router
            .route(&Task::new(TaskKind::Writing), &registry)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::NoEligibleWorker {
                kind: TaskKind::Writing
            }
        );
    }

    #[tokio::test]
    async fn test_least_busy_wins() {
        let registry = registry(vec![
            WorkerSpec::new("a1", WorkerKind::Analyst),
            WorkerSpec::new("a2", WorkerKind::Analyst),
        ]);
        give_completed(&registry, "a1", 2).await;
        give_completed(&registry, "a2", 1).await;

        let router = TaskRouter::default();
        let worker = router
            .route(&Task::new(TaskKind::Analysis), &registry)
            .await
            .unwrap();
        assert_eq!(worker.id().as_str(), "a2");
    }

    #[tokio::test]
    async fn test_tie_goes_to_first_registered() {
        let registry = registry(vec![
            WorkerSpec::new("a1", WorkerKind::Analyst),
            WorkerSpec::new("a2", WorkerKind::Analyst),
        ]);
        give_completed(&registry, "a1", 1).await;
        give_completed(&registry, "a2", 1).await;

        let router = TaskRouter::default();
        let worker = router
            .route(&Task::new(TaskKind::Analysis), &registry)
            .await
            .unwrap();
        assert_eq!(worker.id().as_str(), "a1");
    }

    #[tokio::test]
    async fn test_generic_task_routes_to_any_worker() {
        let registry = registry(vec![
            WorkerSpec::new("r1", WorkerKind::Researcher),
            WorkerSpec::new("w1", WorkerKind::Writer),
        ]);
        give_completed(&registry, "r1", 1).await;

        let router = TaskRouter::default();
        let worker = router
            .route(&Task::new(TaskKind::Generic), &registry)
            .await
            .unwrap();
        assert_eq!(worker.id().as_str(), "w1");
    }

    #[tokio::test]
    async fn test_exclusive_policy_skips_working_worker() {
        let registry = registry(vec![
            WorkerSpec::new("a1", WorkerKind::Analyst),
            WorkerSpec::new("a2", WorkerKind::Analyst),
        ]);
        registry
            .get(&WorkerId::new("a1"))
            .unwrap()
            .begin_task()
            .await;

        let router = TaskRouter::new(RoutingPolicy::Exclusive);
        let worker = router
            .route(&Task::new(TaskKind::Analysis), &registry)
            .await
            .unwrap();
        assert_eq!(worker.id().as_str(), "a2");

        // Under the default shared policy the in-flight worker stays
        // eligible and wins on history length.
        let shared = TaskRouter::default();
        let worker = shared
            .route(&Task::new(TaskKind::Analysis), &registry)
            .await
            .unwrap();
        assert_eq!(worker.id().as_str(), "a1");
    }
}
