//! Run-level metrics aggregation.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use taskcrew_core::{TaskId, TaskResult, WorkerId};

/// Per-worker utilization counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerUtilization {
    /// Tasks completed successfully by this worker.
    pub tasks_completed: u64,

    /// Total time spent on completed tasks.
    pub total_time: Duration,

    /// `total_time / tasks_completed`, recomputed on each update.
    pub average_time: Duration,
}

/// Running totals for a coordinator's lifetime.
///
/// Monotonically non-decreasing within a run; cumulative across batches
/// and rounds, with no reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Results received from the dispatcher, success or failure.
    pub tasks_processed: u64,

    /// Cumulative duration of successful tasks.
    pub total_processing_time: Duration,

    /// Utilization per worker, keyed by worker id.
    pub worker_utilization: HashMap<WorkerId, WorkerUtilization>,
}

impl RunMetrics {
    /// Mean successful-task duration across the whole run.
    pub fn average_processing_time(&self) -> Option<Duration> {
        let completed: u64 = self
            .worker_utilization
            .values()
            .map(|u| u.tasks_completed)
            .sum();
        if completed == 0 {
            return None;
        }
        Some(self.total_processing_time / completed as u32)
    }
}

struct AggregatorInner {
    metrics: RunMetrics,
    recorded: HashSet<TaskId>,
}

/// Accumulates task results into [`RunMetrics`].
///
/// Updates and snapshots share one mutex, so a snapshot never observes a
/// partially-applied record.
pub struct MetricsAggregator {
    inner: Mutex<AggregatorInner>,
}

impl MetricsAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(AggregatorInner {
                metrics: RunMetrics::default(),
                recorded: HashSet::new(),
            }),
        }
    }

    /// Fold one task result into the totals.
    ///
    /// Idempotent on task id: recording the same task twice is a no-op.
    /// Failed results count toward `tasks_processed` only; duration and
    /// per-worker utilization accrue for successes.
    pub fn record(&self, result: &TaskResult) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.recorded.insert(result.task_id.clone()) {
            return;
        }

        inner.metrics.tasks_processed += 1;

        if result.is_completed() {
            inner.metrics.total_processing_time += result.duration;

            let utilization = inner
                .metrics
                .worker_utilization
                .entry(result.worker_id.clone())
                .or_default();
            utilization.tasks_completed += 1;
            utilization.total_time += result.duration;
            utilization.average_time = utilization.total_time / utilization.tasks_completed as u32;
        }
    }

    /// Consistent copy of the current totals.
    pub fn snapshot(&self) -> RunMetrics {
        self.inner.lock().unwrap().metrics.clone()
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use taskcrew_core::{TaskFailure, TaskOutcome};

    fn result(task_id: &str, worker_id: &str, millis: u64, completed: bool) -> TaskResult {
        let now = Utc::now();
        TaskResult {
            task_id: TaskId::new(task_id),
            worker_id: WorkerId::new(worker_id),
            started_at: now,
            finished_at: now,
            duration: Duration::from_millis(millis),
            outcome: if completed {
                TaskOutcome::Completed { output: json!({}) }
            } else {
                TaskOutcome::Failed {
                    error: TaskFailure::Execution {
                        message: "boom".into(),
                    },
                }
            },
        }
    }

    #[test]
    fn test_record_accumulates_per_worker() {
        let aggregator = MetricsAggregator::new();
        aggregator.record(&result("t1", "w1", 100, true));
        aggregator.record(&result("t2", "w1", 300, true));
        aggregator.record(&result("t3", "w2", 50, true));

        let metrics = aggregator.snapshot();
        assert_eq!(metrics.tasks_processed, 3);
        assert_eq!(metrics.total_processing_time, Duration::from_millis(450));

        let w1 = &metrics.worker_utilization[&WorkerId::new("w1")];
        assert_eq!(w1.tasks_completed, 2);
        assert_eq!(w1.total_time, Duration::from_millis(400));
        assert_eq!(w1.average_time, Duration::from_millis(200));
    }

    #[test]
    fn test_record_is_idempotent_per_task() {
        let aggregator = MetricsAggregator::new();
        let r = result("t1", "w1", 100, true);
        aggregator.record(&r);
        aggregator.record(&r);

        let metrics = aggregator.snapshot();
        assert_eq!(metrics.tasks_processed, 1);
        assert_eq!(
            metrics.worker_utilization[&WorkerId::new("w1")].tasks_completed,
            1
        );
    }

    #[test]
    fn test_failures_count_tasks_but_not_time() {
        let aggregator = MetricsAggregator::new();
        aggregator.record(&result("t1", "w1", 100, true));
        aggregator.record(&result("t2", "w1", 999, false));

        let metrics = aggregator.snapshot();
        assert_eq!(metrics.tasks_processed, 2);
        assert_eq!(metrics.total_processing_time, Duration::from_millis(100));
        assert_eq!(
            metrics.worker_utilization[&WorkerId::new("w1")].tasks_completed,
            1
        );
    }

    #[test]
    fn test_snapshot_is_stable_without_updates() {
        let aggregator = MetricsAggregator::new();
        aggregator.record(&result("t1", "w1", 100, true));

        assert_eq!(aggregator.snapshot(), aggregator.snapshot());
    }

    #[test]
    fn test_average_processing_time() {
        let aggregator = MetricsAggregator::new();
        assert_eq!(aggregator.snapshot().average_processing_time(), None);

        aggregator.record(&result("t1", "w1", 100, true));
        aggregator.record(&result("t2", "w2", 200, true));
        assert_eq!(
            aggregator.snapshot().average_processing_time(),
            Some(Duration::from_millis(150))
        );
    }
}
