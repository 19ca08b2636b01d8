//! Run coordinator - drives batches and synchronized rounds.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use taskcrew_core::{CoreError, RunId, RunState, Task, TaskResult};

use crate::config::{ConfigError, CoordinatorConfig};
use crate::dispatcher::{Assignment, Dispatcher};
use crate::executor::TaskExecutor;
use crate::metrics::{MetricsAggregator, RunMetrics};
use crate::registry::WorkerRegistry;
use crate::router::TaskRouter;
use crate::sync::{SyncOutcome, Synchronizer};

/// Errors surfaced by the coordinator itself.
///
/// Routing and execution failures are not here: they are recovered
/// locally and reported inside [`BatchOutcome`].
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The coordinator has finished its run and accepts no more batches.
    #[error("Coordinator run is closed; no further batches accepted")]
    RunClosed,
}

/// A task that found no eligible worker.
#[derive(Debug, Clone)]
pub struct RoutingFailure {
    /// The task that could not be routed.
    pub task: Task,
    /// Why routing failed.
    pub reason: CoreError,
}

/// Everything a batch produced.
///
/// Every submitted task appears exactly once: either as a [`TaskResult`]
/// or as a routing failure.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Results of dispatched tasks, in completion order.
    pub results: Vec<TaskResult>,

    /// Tasks that never reached the dispatcher.
    pub routing_failures: Vec<RoutingFailure>,

    /// What the synchronization step produced.
    pub sync: SyncOutcome,

    /// Wall-clock cost of the synchronization step.
    pub sync_duration: Duration,
}

/// Summary of one round of a multi-round run.
#[derive(Debug, Clone, Serialize)]
pub struct RoundReport {
    /// 1-based round number.
    pub round: u32,
    /// Tasks that reached the dispatcher.
    pub dispatched: usize,
    /// Tasks that completed successfully.
    pub completed: usize,
    /// Tasks that failed or timed out.
    pub failed: usize,
    /// Tasks that found no eligible worker.
    pub routing_failures: usize,
    /// The synchronization metric, if one was computed.
    pub sync_metric: Option<f64>,
    /// Wall-clock cost of the synchronization step.
    pub sync_duration: Duration,
}

/// Summary of a completed multi-round run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The run's identifier.
    pub run_id: RunId,
    /// Rounds actually executed.
    pub rounds_completed: u32,
    /// True if the run stopped early on the target metric.
    pub target_reached: bool,
    /// Per-round summaries.
    pub rounds: Vec<RoundReport>,
}

/// Orchestrates batches of tasks over a pool of typed workers.
///
/// One batch at a time: tasks are routed, dispatched concurrently,
/// results aggregated as they complete, and the batch barrier clears
/// only when every dispatched task has settled. Multi-round runs repeat
/// this cycle with a synchronization step between rounds.
pub struct RunCoordinator {
    run_id: RunId,
    registry: WorkerRegistry,
    router: TaskRouter,
    dispatcher: Dispatcher,
    aggregator: MetricsAggregator,
    synchronizer: Arc<dyn Synchronizer>,
    rounds: u32,
    target_metric: Option<f64>,
    state: Mutex<RunState>,
    cancel: CancellationToken,
}

impl RunCoordinator {
    /// Build a coordinator from a validated configuration.
    ///
    /// Configuration errors are fatal here, before any batch is accepted.
    pub fn new(
        config: CoordinatorConfig,
        executor: Arc<dyn TaskExecutor>,
        synchronizer: Arc<dyn Synchronizer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let registry = WorkerRegistry::from_specs(config.workers.clone())?;
        let dispatcher = Dispatcher::new(
            executor,
            config.resolved_concurrency(),
            config.task_timeout,
        );

        let run_id = RunId::generate();
        info!(
            run_id = %run_id,
            workers = registry.len(),
            max_concurrency = config.resolved_concurrency(),
            "Coordinator initialized"
        );

        Ok(Self {
            run_id,
            registry,
            router: TaskRouter::new(config.routing_policy),
            dispatcher,
            aggregator: MetricsAggregator::new(),
            synchronizer,
            rounds: config.rounds,
            target_metric: config.target_metric,
            state: Mutex::new(RunState::Idle),
            cancel: CancellationToken::new(),
        })
    }

    /// This run's identifier.
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// The worker registry for this run.
    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    /// Current coordinator state.
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap()
    }

    /// Read-only metrics snapshot; safe to call concurrently with an
    /// in-flight batch.
    pub fn current_metrics(&self) -> RunMetrics {
        self.aggregator.snapshot()
    }

    /// Token observed between rounds; cancelling it stops new batches
    /// while the in-flight batch drains to its barrier.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation of the run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    fn set_state(&self, next: RunState) {
        let mut state = self.state.lock().unwrap();
        debug!(run_id = %self.run_id, from = ?*state, to = ?next, "State transition");
        *state = next;
    }

    /// Submit one batch and block until its barrier clears.
    ///
    /// Tasks that fail routing are surfaced as warnings in the outcome
    /// and excluded from metrics; every other submitted task yields a
    /// result, success or failure.
    pub async fn submit_batch(&self, tasks: Vec<Task>) -> Result<BatchOutcome, CoordinatorError> {
        if self.state().is_terminal() {
            return Err(CoordinatorError::RunClosed);
        }
        let outcome = self.run_batch(tasks).await;
        self.set_state(RunState::Idle);
        Ok(outcome)
    }

    /// Execute up to the configured number of rounds, calling `batch_fn`
    /// to produce each round's tasks.
    ///
    /// Rounds are strictly sequential; each round's barrier and
    /// synchronization step complete before the next round starts. The
    /// run stops early when the synchronization metric reaches the
    /// configured target, or when cancelled. Afterwards the coordinator
    /// is `Done` and rejects further batches.
    pub async fn run_rounds<F>(&self, mut batch_fn: F) -> Result<RunReport, CoordinatorError>
    where
        F: FnMut(u32) -> Vec<Task>,
    {
        if self.state().is_terminal() {
            return Err(CoordinatorError::RunClosed);
        }

        let mut reports = Vec::new();
        let mut target_reached = false;

        for round in 1..=self.rounds {
            if self.cancel.is_cancelled() {
                info!(run_id = %self.run_id, round, "Run cancelled; draining stopped");
                break;
            }

            info!(run_id = %self.run_id, round, total_rounds = self.rounds, "Starting round");
            let outcome = self.run_batch(batch_fn(round)).await;

            let completed = outcome.results.iter().filter(|r| r.is_completed()).count();
            reports.push(RoundReport {
                round,
                dispatched: outcome.results.len(),
                completed,
                failed: outcome.results.len() - completed,
                routing_failures: outcome.routing_failures.len(),
                sync_metric: outcome.sync.metric,
                sync_duration: outcome.sync_duration,
            });

            if let (Some(metric), Some(target)) = (outcome.sync.metric, self.target_metric) {
                if metric >= target {
                    info!(
                        run_id = %self.run_id,
                        round,
                        metric,
                        target,
                        "Target metric reached; stopping early"
                    );
                    target_reached = true;
                    break;
                }
            }
        }

        self.set_state(RunState::Done);

        Ok(RunReport {
            run_id: self.run_id.clone(),
            rounds_completed: reports.len() as u32,
            target_reached,
            rounds: reports,
        })
    }

    /// Route, dispatch, and synchronize one batch.
    async fn run_batch(&self, tasks: Vec<Task>) -> BatchOutcome {
        self.set_state(RunState::Dispatching);

        let mut assignments: Vec<Assignment> = Vec::with_capacity(tasks.len());
        let mut routing_failures = Vec::new();

        for task in tasks {
            match self.router.route(&task, &self.registry).await {
                Ok(worker) => {
                    info!(
                        task_id = %task.id,
                        worker_id = %worker.id(),
                        kind = %task.kind,
                        "Assigning task to worker"
                    );
                    assignments.push((worker, task));
                }
                Err(reason) => {
                    warn!(task_id = %task.id, kind = %task.kind, %reason, "Routing failed");
                    routing_failures.push(RoutingFailure { task, reason });
                }
            }
        }

        // Barrier: the stream ends only when every dispatched task has
        // settled, success or failure.
        let mut stream = self.dispatcher.dispatch_stream(assignments);
        let mut results = Vec::new();
        while let Some(result) = stream.next().await {
            self.aggregator.record(&result);
            results.push(result);
        }

        self.set_state(RunState::Synchronizing);
        let sync_started = Instant::now();
        let sync = self.synchronizer.synchronize(&results).await;
        let sync_duration = sync_started.elapsed();

        BatchOutcome {
            results,
            routing_failures,
            sync,
            sync_duration,
        }
    }
}
