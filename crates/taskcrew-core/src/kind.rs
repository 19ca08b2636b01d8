//! Task and worker kind vocabulary and the routing rule between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type tag a task carries for routing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Information gathering work; routes to researchers.
    Research,
    /// Data analysis work; routes to analysts.
    Analysis,
    /// Content production work; routes to writers.
    Writing,
    /// Wildcard work; any worker is eligible.
    #[default]
    Generic,
}

impl TaskKind {
    /// Returns true if this kind is the wildcard tag.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Generic)
    }

    /// Routing rule: exact kind pairing, unless the task is generic.
    pub fn matches(&self, worker: WorkerKind) -> bool {
        match self {
            Self::Research => worker == WorkerKind::Researcher,
            Self::Analysis => worker == WorkerKind::Analyst,
            Self::Writing => worker == WorkerKind::Writer,
            Self::Generic => true,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Research => "research",
            Self::Analysis => "analysis",
            Self::Writing => "writing",
            Self::Generic => "generic",
        };
        write!(f, "{}", s)
    }
}

/// The declared type of a worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    /// Handles research tasks.
    Researcher,
    /// Handles analysis tasks.
    Analyst,
    /// Handles writing tasks.
    Writer,
    /// Handles only generic tasks.
    #[default]
    Generic,
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Researcher => "researcher",
            Self::Analyst => "analyst",
            Self::Writer => "writer",
            Self::Generic => "generic",
        };
        write!(f, "{}", s)
    }
}
