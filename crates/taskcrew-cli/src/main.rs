//! TaskCrew CLI - demonstration workloads for the coordinator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use taskcrew_core::{WorkerKind, WorkerSpec};
use taskcrew_coordinator::{CoordinatorConfig, PassthroughSynchronizer, RunCoordinator};

mod agents;
mod report;
mod training;

use agents::CrewExecutor;
use training::{EpochSynchronizer, TrainingExecutor};

/// TaskCrew - capability-matched concurrent task coordination demos
#[derive(Parser)]
#[command(name = "taskcrew")]
#[command(about = "Concurrent task coordination demos", long_about = None)]
struct Cli {
    /// Directory for JSON result/metrics files (skipped if unset)
    #[arg(short, long, env = "TASKCREW_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Per-task timeout in seconds
    #[arg(long, default_value_t = 300)]
    task_timeout_secs: u64,

    /// Scale factor applied to all simulated delays
    #[arg(long, default_value_t = 1.0)]
    delay_scale: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the multi-agent workflow demo
    Crew,

    /// Run the distributed training demo
    Train {
        /// Number of training workers
        #[arg(long, default_value_t = 4, env = "TASKCREW_WORKERS")]
        workers: u32,

        /// Maximum number of epochs
        #[arg(long, default_value_t = 8)]
        epochs: u32,

        /// Total samples to partition across workers
        #[arg(long, default_value_t = 10_000)]
        dataset_size: u64,

        /// Stop early once global accuracy reaches this bound
        #[arg(long, default_value_t = 0.95)]
        target_accuracy: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();

    let cli = Cli::parse();
    let task_timeout = Duration::from_secs(cli.task_timeout_secs);

    match cli.command {
        Commands::Crew => {
            run_crew(cli.output_dir, task_timeout, cli.delay_scale).await?;
        }
        Commands::Train {
            workers,
            epochs,
            dataset_size,
            target_accuracy,
        } => {
            run_train(
                cli.output_dir,
                task_timeout,
                cli.delay_scale,
                workers,
                epochs,
                dataset_size,
                target_accuracy,
            )
            .await?;
        }
    }

    Ok(())
}

async fn run_crew(
    output_dir: Option<PathBuf>,
    task_timeout: Duration,
    delay_scale: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = CoordinatorConfig::new(agents::crew_specs()).with_task_timeout(task_timeout);
    let coordinator = RunCoordinator::new(
        config,
        Arc::new(CrewExecutor::new(delay_scale)),
        Arc::new(PassthroughSynchronizer),
    )?;

    info!(run_id = %coordinator.run_id(), "Starting multi-agent workflow");

    let started = Instant::now();
    let outcome = coordinator.submit_batch(agents::workflow_tasks()).await?;
    let elapsed = started.elapsed();

    report::print_crew_summary(&coordinator, &outcome, elapsed).await;

    if let Some(dir) = output_dir {
        let results = report::workflow_result_doc(&coordinator, &outcome, elapsed);
        let results_path = report::write_json(&dir, "workflow_results", &results)?;
        let metrics_path = report::write_json(&dir, "crew_metrics", &coordinator.current_metrics())?;
        info!(
            results = %results_path.display(),
            metrics = %metrics_path.display(),
            "Workflow output saved"
        );
    }

    Ok(())
}

async fn run_train(
    output_dir: Option<PathBuf>,
    task_timeout: Duration,
    delay_scale: f64,
    workers: u32,
    epochs: u32,
    dataset_size: u64,
    target_accuracy: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let specs: Vec<WorkerSpec> = (0..workers)
        .map(|i| WorkerSpec::new(format!("worker-{i}"), WorkerKind::Generic))
        .collect();

    let config = CoordinatorConfig::new(specs)
        .with_task_timeout(task_timeout)
        .with_rounds(epochs)
        .with_target_metric(target_accuracy);

    // Simulated parameter-averaging cost grows with the pool, as in the
    // modeled workload.
    let sync_delay = Duration::from_millis(
        ((500.0 + f64::from(workers) * 100.0) * delay_scale) as u64,
    );

    let coordinator = RunCoordinator::new(
        config,
        Arc::new(TrainingExecutor::new(delay_scale)),
        Arc::new(EpochSynchronizer::new(sync_delay)),
    )?;

    println!();
    println!("{}", "=".repeat(60));
    println!("DISTRIBUTED TRAINING DEMO");
    println!("{}", "=".repeat(60));
    println!("Workers: {workers}");
    println!("Epochs: {epochs}");
    println!("Dataset size: {dataset_size} samples");
    println!("Target accuracy: {target_accuracy}");

    let partitions = training::partition_dataset(dataset_size, workers);
    info!(run_id = %coordinator.run_id(), workers, epochs, "Starting distributed training");

    let started = Instant::now();
    let run_report = coordinator
        .run_rounds(|epoch| training::epoch_tasks(epoch, &partitions))
        .await?;
    let elapsed = started.elapsed();

    let metrics = coordinator.current_metrics();
    report::print_training_summary(&run_report, &metrics, elapsed);

    if let Some(dir) = output_dir {
        let results = report::training_result_doc(&run_report, &metrics, elapsed);
        let results_path = report::write_json(&dir, "training_results", &results)?;
        let metrics_path = report::write_json(&dir, "training_metrics", &metrics)?;
        info!(
            results = %results_path.display(),
            metrics = %metrics_path.display(),
            "Training output saved"
        );
    }

    Ok(())
}
