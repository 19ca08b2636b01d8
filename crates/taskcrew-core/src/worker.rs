//! Worker specification types.

use crate::{TaskKind, WorkerId, WorkerKind};
use serde::{Deserialize, Serialize};

/// Static description of a worker: identity, kind, and capability labels.
///
/// Capabilities are descriptive tags carried through configuration and
/// reporting; routing itself is decided by the kind pairing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSpec {
    /// Unique worker identifier.
    pub id: WorkerId,

    /// Declared worker kind.
    pub kind: WorkerKind,

    /// Capability labels (e.g. "web_search", "statistical_modeling").
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl WorkerSpec {
    /// Create a new WorkerSpec.
    pub fn new(id: impl Into<WorkerId>, kind: WorkerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            capabilities: Vec::new(),
        }
    }

    /// Builder method to add a capability label.
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Builder method to set all capability labels at once.
    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Check if this worker is eligible for the given task kind.
    pub fn supports(&self, kind: TaskKind) -> bool {
        kind.matches(self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_follows_kind_rule() {
        let researcher = WorkerSpec::new("researcher-001", WorkerKind::Researcher)
            .with_capability("web_search")
            .with_capability("source_validation");

        assert!(researcher.supports(TaskKind::Research));
        assert!(researcher.supports(TaskKind::Generic));
        assert!(!researcher.supports(TaskKind::Analysis));
        assert_eq!(researcher.capabilities.len(), 2);
    }
}
