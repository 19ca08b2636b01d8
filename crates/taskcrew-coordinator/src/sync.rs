//! Synchronization step run at each batch barrier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use taskcrew_core::TaskResult;

/// What a synchronization step produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Aggregated metric for the round, if the synchronizer computes one.
    /// The coordinator compares this against the configured target when
    /// deciding whether to stop early.
    pub metric: Option<f64>,
}

/// Barrier-time aggregation over a settled batch.
///
/// Runs only after every dispatched task of the batch has reached a
/// terminal state, and must finish before the next round starts.
#[async_trait]
pub trait Synchronizer: Send + Sync {
    /// Synchronize over the batch's results.
    async fn synchronize(&self, results: &[TaskResult]) -> SyncOutcome;
}

/// No-op synchronization: the batch passes straight through.
///
/// Used by the multi-agent workflow variant, where rounds are independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSynchronizer;

#[async_trait]
impl Synchronizer for PassthroughSynchronizer {
    async fn synchronize(&self, _results: &[TaskResult]) -> SyncOutcome {
        SyncOutcome::default()
    }
}

/// Averages a designated numeric field across the batch's successful
/// results, modeling the parameter-averaging barrier of a distributed
/// training round. Failed results are ignored; a batch with no usable
/// values yields no metric.
#[derive(Debug, Clone)]
pub struct AveragingSynchronizer {
    field: String,
}

impl AveragingSynchronizer {
    /// Average over the given output field (e.g. `"accuracy"`).
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// The field being averaged.
    pub fn field(&self) -> &str {
        &self.field
    }
}

#[async_trait]
impl Synchronizer for AveragingSynchronizer {
    async fn synchronize(&self, results: &[TaskResult]) -> SyncOutcome {
        let values: Vec<f64> = results
            .iter()
            .filter_map(|r| r.numeric_field(&self.field))
            .collect();

        if values.is_empty() {
            return SyncOutcome { metric: None };
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        debug!(
            field = %self.field,
            samples = values.len(),
            mean,
            "Averaged batch results"
        );
        SyncOutcome { metric: Some(mean) }
    }
}
