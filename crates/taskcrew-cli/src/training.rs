//! Simulated distributed training for the multi-round demo.
//!
//! Each round submits one generic task per worker carrying its epoch
//! number and data partition size; the executor "trains" for a
//! sample-proportional delay and emits a loss/accuracy pair that
//! improves with the epoch, with a little jitter.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};
use tracing::info;

use taskcrew_core::{Task, TaskKind, WorkerSpec};
use taskcrew_coordinator::{
    AveragingSynchronizer, ExecutionError, SyncOutcome, Synchronizer, TaskExecutor,
};

/// Split the dataset evenly across workers.
///
/// Each partition gets `total / workers` samples; the remainder is not
/// assigned, matching the even-partition scheme of the workload this
/// demo models.
pub fn partition_dataset(total: u64, workers: u32) -> Vec<u64> {
    let per_worker = total / u64::from(workers.max(1));
    vec![per_worker; workers as usize]
}

/// One generic task per partition for the given epoch.
pub fn epoch_tasks(epoch: u32, partitions: &[u64]) -> Vec<Task> {
    partitions
        .iter()
        .map(|&samples| {
            Task::new(TaskKind::Generic).with_payload(json!({
                "epoch": epoch,
                "samples": samples,
            }))
        })
        .collect()
}

/// Simulates one worker's training epoch.
#[derive(Clone)]
pub struct TrainingExecutor {
    delay_scale: f64,
}

impl TrainingExecutor {
    /// Create a new executor; `delay_scale` multiplies the simulated
    /// per-sample training time.
    pub fn new(delay_scale: f64) -> Self {
        Self { delay_scale }
    }

    fn training_delay(&self, samples: u64) -> Duration {
        // 1 ms per sample plus fixed overhead, as in the modeled workload.
        let millis = samples as f64 + 1_000.0;
        Duration::from_millis((millis * self.delay_scale) as u64)
    }

    fn simulate_metrics(epoch: u32) -> (f64, f64) {
        let mut rng = rand::thread_rng();
        let loss = (2.0 - f64::from(epoch) * 0.1 + rng.gen_range(-0.05..=0.05)).max(0.1);
        let accuracy = (0.5 + f64::from(epoch) * 0.08 + rng.gen_range(-0.02..=0.02)).min(0.95);
        (loss, accuracy)
    }
}

#[async_trait]
impl TaskExecutor for TrainingExecutor {
    async fn execute(&self, worker: &WorkerSpec, task: &Task) -> Result<Value, ExecutionError> {
        let epoch = task.payload["epoch"].as_u64().unwrap_or(0) as u32;
        let samples = task.payload["samples"].as_u64().unwrap_or(0);

        info!(worker_id = %worker.id, epoch, samples, "Training epoch");
        tokio::time::sleep(self.training_delay(samples)).await;

        let (loss, accuracy) = Self::simulate_metrics(epoch);
        info!(worker_id = %worker.id, epoch, loss, accuracy, "Epoch completed");

        Ok(json!({
            "epoch": epoch,
            "samples": samples,
            "loss": loss,
            "accuracy": accuracy,
        }))
    }
}

/// Parameter-averaging barrier for the training demo.
///
/// Averages both loss and accuracy over the round's successful results
/// and reports accuracy as the round metric (the early-stop signal),
/// after a simulated communication delay.
pub struct EpochSynchronizer {
    loss: AveragingSynchronizer,
    accuracy: AveragingSynchronizer,
    sync_delay: Duration,
}

impl EpochSynchronizer {
    /// Create a synchronizer with a simulated averaging delay.
    pub fn new(sync_delay: Duration) -> Self {
        Self {
            loss: AveragingSynchronizer::new("loss"),
            accuracy: AveragingSynchronizer::new("accuracy"),
            sync_delay,
        }
    }
}

#[async_trait]
impl Synchronizer for EpochSynchronizer {
    async fn synchronize(&self, results: &[taskcrew_core::TaskResult]) -> SyncOutcome {
        tokio::time::sleep(self.sync_delay).await;

        let loss = self.loss.synchronize(results).await.metric;
        let accuracy = self.accuracy.synchronize(results).await.metric;

        if let (Some(loss), Some(accuracy)) = (loss, accuracy) {
            info!(
                global_loss = loss,
                global_accuracy = accuracy,
                "Synchronization completed"
            );
        }

        SyncOutcome { metric: accuracy }
    }
}
