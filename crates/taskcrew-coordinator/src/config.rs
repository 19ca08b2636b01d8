//! Coordinator configuration.

use std::time::Duration;

use thiserror::Error;

use taskcrew_core::{CoreError, WorkerSpec};

use crate::router::RoutingPolicy;

/// Configuration accepted by the run coordinator.
///
/// Validated at construction; a coordinator is never built from an
/// invalid configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Enumerated worker definitions for the run.
    pub workers: Vec<WorkerSpec>,

    /// Maximum concurrently executing tasks. `None` means one slot per
    /// worker in the pool.
    pub max_concurrency: Option<usize>,

    /// Per-task deadline; on expiry the dispatcher synthesizes a failed
    /// result so the batch barrier always clears.
    pub task_timeout: Duration,

    /// Eligibility of in-flight workers for new routing.
    pub routing_policy: RoutingPolicy,

    /// Number of rounds a multi-round run executes at most.
    pub rounds: u32,

    /// Stop issuing rounds once the synchronization metric reaches this
    /// bound (early exit, not a failure).
    pub target_metric: Option<f64>,
}

impl CoordinatorConfig {
    /// Configuration with the given workers and defaults for the rest.
    pub fn new(workers: Vec<WorkerSpec>) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    /// Builder method to bound concurrency explicitly.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = Some(max);
        self
    }

    /// Builder method to set the per-task timeout.
    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Builder method to set the routing policy.
    pub fn with_routing_policy(mut self, policy: RoutingPolicy) -> Self {
        self.routing_policy = policy;
        self
    }

    /// Builder method to set the round budget.
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Builder method to set the early-exit metric threshold.
    pub fn with_target_metric(mut self, target: f64) -> Self {
        self.target_metric = Some(target);
        self
    }

    /// Check the configuration for fatal errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers.is_empty() {
            return Err(ConfigError::NoWorkers);
        }
        if self.task_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_concurrency == Some(0) {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        Ok(())
    }

    /// Concurrency bound after applying the pool-size default.
    pub(crate) fn resolved_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or(self.workers.len())
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            workers: Vec::new(),
            max_concurrency: None,
            task_timeout: Duration::from_secs(300),
            routing_policy: RoutingPolicy::default(),
            rounds: 1,
            target_metric: None,
        }
    }
}

/// Fatal configuration errors, raised before any batch is accepted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The worker pool is empty.
    #[error("At least one worker must be configured")]
    NoWorkers,

    /// The per-task timeout is zero.
    #[error("Per-task timeout must be non-zero")]
    ZeroTimeout,

    /// The concurrency bound is zero.
    #[error("Max concurrency must be non-zero")]
    ZeroConcurrency,

    /// The round budget is zero.
    #[error("Round count must be non-zero")]
    ZeroRounds,

    /// The worker set itself is invalid (e.g. duplicate ids).
    #[error("Invalid worker set: {0}")]
    InvalidWorkers(#[from] CoreError),
}
