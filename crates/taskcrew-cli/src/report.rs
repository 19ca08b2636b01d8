//! Run summaries and JSON persistence for the demo commands.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use taskcrew_coordinator::{BatchOutcome, RunCoordinator, RunMetrics, RunReport};

/// Write a timestamped JSON file under `dir`, creating it if needed.
pub fn write_json<T: Serialize>(dir: &Path, prefix: &str, value: &T) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{prefix}_{}.json", Utc::now().timestamp()));
    let file = fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(path)
}

/// Print the multi-agent workflow summary, original-demo style.
pub async fn print_crew_summary(
    coordinator: &RunCoordinator,
    outcome: &BatchOutcome,
    elapsed: Duration,
) {
    let metrics = coordinator.current_metrics();
    let failed = outcome.results.iter().filter(|r| !r.is_completed()).count();

    println!();
    println!("{}", "=".repeat(60));
    println!("MULTI-AGENT WORKFLOW SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Workflow completed in: {:.2}s", elapsed.as_secs_f64());
    println!(
        "Tasks processed: {} ({} failed, {} unroutable)",
        outcome.results.len(),
        failed,
        outcome.routing_failures.len()
    );
    println!("Active agents: {}", coordinator.registry().len());

    println!();
    println!("Agent performance:");
    for worker in coordinator.registry().iter() {
        let status = worker.status().await;
        let line = match metrics.worker_utilization.get(worker.id()) {
            Some(u) => format!(
                "{} completed, avg {:.2}s",
                u.tasks_completed,
                u.average_time.as_secs_f64()
            ),
            None => "no completed tasks".to_string(),
        };
        println!(
            "  {} ({}): {line}, status {:?}",
            worker.id(),
            worker.spec().kind,
            status
        );
    }

    if let Some(avg) = metrics.average_processing_time() {
        println!();
        println!("Overall average task time: {:.2}s", avg.as_secs_f64());
    }
}

/// Print the distributed training summary, original-demo style.
pub fn print_training_summary(report: &RunReport, metrics: &RunMetrics, elapsed: Duration) {
    println!();
    println!("{}", "-".repeat(60));
    println!("TRAINING COMPLETED");
    println!("{}", "-".repeat(60));

    for round in &report.rounds {
        println!(
            "  epoch {:>2}: {}/{} tasks completed, accuracy {}, sync {:.2}s",
            round.round,
            round.completed,
            round.dispatched,
            round
                .sync_metric
                .map_or_else(|| "n/a".to_string(), |m| format!("{m:.4}")),
            round.sync_duration.as_secs_f64()
        );
    }

    println!();
    if let Some(last) = report.rounds.last() {
        if let Some(accuracy) = last.sync_metric {
            println!("Final accuracy: {:.2}%", accuracy * 100.0);
        }
    }
    println!(
        "Epochs completed: {}{}",
        report.rounds_completed,
        if report.target_reached {
            " (target accuracy reached)"
        } else {
            ""
        }
    );
    println!("Tasks processed: {}", metrics.tasks_processed);
    println!("Training time: {:.1}s", elapsed.as_secs_f64());
}

/// Assemble the workflow results document for persistence.
pub fn workflow_result_doc(
    coordinator: &RunCoordinator,
    outcome: &BatchOutcome,
    elapsed: Duration,
) -> serde_json::Value {
    json!({
        "workflow_id": coordinator.run_id(),
        "completed_at": Utc::now(),
        "total_time_secs": elapsed.as_secs_f64(),
        "tasks_completed": outcome.results.iter().filter(|r| r.is_completed()).count(),
        "results": outcome.results,
        "routing_failures": outcome
            .routing_failures
            .iter()
            .map(|f| json!({"task_id": f.task.id, "reason": f.reason.to_string()}))
            .collect::<Vec<_>>(),
    })
}

/// Assemble the training results document for persistence.
pub fn training_result_doc(
    report: &RunReport,
    metrics: &RunMetrics,
    elapsed: Duration,
) -> serde_json::Value {
    json!({
        "training_id": report.run_id,
        "completed_at": Utc::now(),
        "training_time_secs": elapsed.as_secs_f64(),
        "epochs_completed": report.rounds_completed,
        "target_reached": report.target_reached,
        "rounds": report.rounds,
        "metrics": metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_creates_file() {
        let dir = std::env::temp_dir().join("taskcrew-report-test");
        let path = write_json(&dir, "sample", &json!({"ok": true})).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"ok\""));

        fs::remove_file(path).ok();
    }
}
