//! Concurrent dispatcher - executes matched (worker, task) pairs.
//!
//! All pairs of a batch run concurrently, bounded by the configured
//! maximum concurrency, each under a per-task timeout. Results are
//! streamed back in completion order so callers can start aggregating
//! before the whole batch settles.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{mpsc, Semaphore};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use taskcrew_core::{Task, TaskFailure, TaskOutcome, TaskResult};

use crate::executor::TaskExecutor;
use crate::registry::RegisteredWorker;

/// A routed (worker, task) pair ready for execution.
pub type Assignment = (Arc<RegisteredWorker>, Task);

/// Executes assignments concurrently and streams back results.
#[derive(Clone)]
pub struct Dispatcher {
    executor: Arc<dyn TaskExecutor>,
    max_concurrency: usize,
    task_timeout: Duration,
}

impl Dispatcher {
    /// Create a new Dispatcher.
    pub fn new(
        executor: Arc<dyn TaskExecutor>,
        max_concurrency: usize,
        task_timeout: Duration,
    ) -> Self {
        Self {
            executor,
            max_concurrency: max_concurrency.max(1),
            task_timeout,
        }
    }

    /// Run all assignments concurrently.
    ///
    /// Returns a channel yielding one [`TaskResult`] per assignment in
    /// completion order. The channel closes once every assignment has
    /// reached a terminal state; an individual failure never aborts the
    /// rest of the batch.
    pub fn dispatch(&self, assignments: Vec<Assignment>) -> mpsc::Receiver<TaskResult> {
        let (tx, rx) = mpsc::channel(assignments.len().max(1));
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        debug!(
            tasks = assignments.len(),
            max_concurrency = self.max_concurrency,
            "Dispatching batch"
        );

        for (worker, task) in assignments {
            let tx = tx.clone();
            let semaphore = semaphore.clone();
            let executor = self.executor.clone();
            let limit = self.task_timeout;

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };

                let result = run_one(worker, task, executor.as_ref(), limit).await;
                // Receiver dropped means the caller abandoned the batch;
                // nothing left to deliver to.
                let _ = tx.send(result).await;
            });
        }

        rx
    }

    /// Like [`dispatch`](Self::dispatch), wrapped as a `Stream`.
    pub fn dispatch_stream(&self, assignments: Vec<Assignment>) -> ReceiverStream<TaskResult> {
        ReceiverStream::new(self.dispatch(assignments))
    }
}

/// Execute a single assignment and produce its result.
async fn run_one(
    worker: Arc<RegisteredWorker>,
    task: Task,
    executor: &dyn TaskExecutor,
    limit: Duration,
) -> TaskResult {
    worker.begin_task().await;
    debug!(task_id = %task.id, worker_id = %worker.id(), "Starting task");

    let started_at = Utc::now();
    let started = Instant::now();

    let outcome = match tokio::time::timeout(limit, executor.execute(worker.spec(), &task)).await {
        Ok(Ok(output)) => TaskOutcome::Completed { output },
        Ok(Err(err)) => TaskOutcome::Failed {
            error: TaskFailure::Execution {
                message: err.message,
            },
        },
        Err(_) => TaskOutcome::Failed {
            error: TaskFailure::Timeout { limit },
        },
    };

    let result = TaskResult {
        task_id: task.id,
        worker_id: worker.id().clone(),
        started_at,
        finished_at: Utc::now(),
        duration: started.elapsed(),
        outcome,
    };

    match &result.outcome {
        TaskOutcome::Completed { .. } => {
            info!(
                task_id = %result.task_id,
                worker_id = %result.worker_id,
                duration_ms = result.duration.as_millis() as u64,
                "Task completed"
            );
            worker.complete_task(result.clone()).await;
        }
        TaskOutcome::Failed { error } => {
            warn!(
                task_id = %result.task_id,
                worker_id = %result.worker_id,
                error = %error,
                "Task failed"
            );
            worker.fail_task().await;
        }
    }

    result
}
