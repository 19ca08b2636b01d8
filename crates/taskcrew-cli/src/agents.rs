//! Simulated crew agents for the multi-agent workflow demo.
//!
//! Each task kind gets a fixed "thinking" delay and a canned JSON
//! payload, standing in for real research/analysis/writing work.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use taskcrew_core::{Task, TaskKind, WorkerKind, WorkerSpec};
use taskcrew_coordinator::{ExecutionError, TaskExecutor};

/// The demo crew: two researchers, two analysts, one writer.
pub fn crew_specs() -> Vec<WorkerSpec> {
    vec![
        WorkerSpec::new("researcher-001", WorkerKind::Researcher).with_capabilities(vec![
            "web_search".into(),
            "data_collection".into(),
            "source_validation".into(),
        ]),
        WorkerSpec::new("researcher-002", WorkerKind::Researcher).with_capabilities(vec![
            "academic_research".into(),
            "technical_analysis".into(),
        ]),
        WorkerSpec::new("analyst-001", WorkerKind::Analyst).with_capabilities(vec![
            "data_analysis".into(),
            "statistical_modeling".into(),
            "pattern_recognition".into(),
        ]),
        WorkerSpec::new("analyst-002", WorkerKind::Analyst).with_capabilities(vec![
            "market_analysis".into(),
            "competitive_intelligence".into(),
        ]),
        WorkerSpec::new("writer-001", WorkerKind::Writer).with_capabilities(vec![
            "technical_writing".into(),
            "report_generation".into(),
            "content_optimization".into(),
        ]),
    ]
}

/// The demo workflow: two research, two analysis, two writing tasks.
pub fn workflow_tasks() -> Vec<Task> {
    vec![
        Task::new(TaskKind::Research).with_payload(json!({
            "query": "artificial intelligence trends 2026",
            "priority": "high",
        })),
        Task::new(TaskKind::Research).with_payload(json!({
            "query": "machine learning deployment strategies",
            "priority": "medium",
        })),
        Task::new(TaskKind::Analysis).with_payload(json!({
            "data": {"market_size": 50_000_000, "growth_rate": 0.25, "competition": "high"},
            "analysis_type": "market_analysis",
        })),
        Task::new(TaskKind::Analysis).with_payload(json!({
            "data": {"user_engagement": 0.75, "retention_rate": 0.68, "satisfaction": 8.2},
            "analysis_type": "user_analytics",
        })),
        Task::new(TaskKind::Writing).with_payload(json!({
            "topic": "AI Implementation Strategy",
            "content_type": "executive_summary",
        })),
        Task::new(TaskKind::Writing).with_payload(json!({
            "topic": "Technical Architecture",
            "content_type": "technical_document",
        })),
    ]
}

/// Executes crew tasks by sleeping for a kind-specific delay and
/// returning a canned output.
#[derive(Clone)]
pub struct CrewExecutor {
    delay_scale: f64,
}

impl CrewExecutor {
    /// Create a new executor; `delay_scale` multiplies every simulated
    /// delay (use e.g. 0.01 for fast local runs).
    pub fn new(delay_scale: f64) -> Self {
        Self { delay_scale }
    }

    fn delay_for(&self, kind: TaskKind) -> Duration {
        let base_ms = match kind {
            TaskKind::Research => 2_000,
            TaskKind::Analysis => 1_500,
            TaskKind::Writing => 2_500,
            TaskKind::Generic => 1_000,
        };
        Duration::from_millis((base_ms as f64 * self.delay_scale) as u64)
    }

    fn build_research_output(task: &Task) -> Value {
        let query = task.payload["query"].as_str().unwrap_or("general research");
        json!({
            "type": "research_results",
            "query": query,
            "findings": [
                format!("Research finding 1 for '{query}': current market trends show significant growth"),
                format!("Research finding 2 for '{query}': key technologies are emerging in this space"),
                format!("Research finding 3 for '{query}': competitive landscape analysis reveals opportunities"),
            ],
            "sources": ["Academic papers database", "Industry reports", "Market research data"],
            "confidence": 0.85,
        })
    }

    fn build_analysis_output(task: &Task) -> Value {
        json!({
            "type": "analysis_results",
            "input_data": task.payload.get("data").cloned().unwrap_or(Value::Null),
            "insights": [
                "Pattern identified: cyclical behavior in data trends",
                "Anomaly detected: unusual spike in Q3 metrics",
                "Correlation found: strong relationship between variables A and B",
            ],
            "recommendations": [
                "Increase monitoring frequency during peak periods",
                "Investigate root cause of Q3 anomaly",
                "Leverage A-B correlation for predictive modeling",
            ],
            "confidence": 0.92,
        })
    }

    fn build_writing_output(task: &Task) -> Value {
        let topic = task.payload["topic"].as_str().unwrap_or("general topic");
        let content_type = task.payload["content_type"].as_str().unwrap_or("report");
        let content = format!(
            "# {topic}: {content_type}\n\n\
             ## Executive Summary\n\
             This {content_type} provides a comprehensive overview of {topic}, based on recent \
             research and analysis. The findings indicate significant opportunities for \
             improvement and growth.\n\n\
             ## Key Findings\n\
             1. **Market Opportunity**: there is substantial potential in the {topic} sector\n\
             2. **Technical Feasibility**: current technology supports implementation\n\
             3. **Resource Requirements**: moderate investment needed for successful execution\n\n\
             ## Recommendations\n\
             - Prioritize immediate implementation of key initiatives\n\
             - Establish monitoring and evaluation frameworks\n\
             - Develop strategic partnerships for enhanced capabilities\n"
        );
        json!({
            "type": "written_content",
            "topic": topic,
            "content_type": content_type,
            "content": content,
            "word_count": content.split_whitespace().count(),
            "readability_score": 8.2,
        })
    }

    fn build_generic_output(task: &Task) -> Value {
        json!({
            "type": "generic_result",
            "status": "completed",
            "message": format!("Successfully processed {} task", task.kind),
        })
    }
}

#[async_trait]
impl TaskExecutor for CrewExecutor {
    async fn execute(&self, worker: &WorkerSpec, task: &Task) -> Result<Value, ExecutionError> {
        info!(worker_id = %worker.id, kind = %task.kind, "Agent working");
        tokio::time::sleep(self.delay_for(task.kind)).await;

        let output = match task.kind {
            TaskKind::Research => Self::build_research_output(task),
            TaskKind::Analysis => Self::build_analysis_output(task),
            TaskKind::Writing => Self::build_writing_output(task),
            TaskKind::Generic => Self::build_generic_output(task),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crew_covers_workflow_kinds() {
        let specs = crew_specs();
        for task in workflow_tasks() {
            assert!(
                specs.iter().any(|s| s.supports(task.kind)),
                "no worker for {}",
                task.kind
            );
        }
    }

    #[test]
    fn test_build_research_output() {
        let task = Task::new(TaskKind::Research).with_payload(json!({"query": "rust adoption"}));
        let output = CrewExecutor::build_research_output(&task);

        assert_eq!(output["type"], "research_results");
        assert_eq!(output["query"], "rust adoption");
        assert_eq!(output["findings"].as_array().unwrap().len(), 3);
        assert!(output["findings"][0]
            .as_str()
            .unwrap()
            .contains("rust adoption"));
    }

    #[test]
    fn test_build_writing_output_counts_words() {
        let task = Task::new(TaskKind::Writing)
            .with_payload(json!({"topic": "Testing", "content_type": "report"}));
        let output = CrewExecutor::build_writing_output(&task);

        assert_eq!(output["topic"], "Testing");
        let words = output["word_count"].as_u64().unwrap();
        assert!(words > 50);
    }

    #[test]
    fn test_delay_scale() {
        let executor = CrewExecutor::new(0.5);
        assert_eq!(
            executor.delay_for(TaskKind::Research),
            Duration::from_millis(1_000)
        );
        assert_eq!(
            executor.delay_for(TaskKind::Writing),
            Duration::from_millis(1_250)
        );
    }
}
