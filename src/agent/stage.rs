//! Per-invoice processing stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of one invoice-processing run. Ordered by execution.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    #[default]
    Recall,
    Suggest,
    Decide,
    Commit,
}

impl ProcessingStage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recall => "recall",
            Self::Suggest => "suggest",
            Self::Decide => "decide",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forward-only state machine over [`ProcessingStage`].
#[derive(Debug, Clone, Default)]
pub struct StageMachine {
    stage: ProcessingStage,
    visited: Vec<ProcessingStage>,
}

impl StageMachine {
    /// Start a run in the recall stage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stage: ProcessingStage::Recall,
            visited: vec![ProcessingStage::Recall],
        }
    }

    #[must_use]
    pub fn stage(&self) -> ProcessingStage {
        self.stage
    }

    /// Stages entered so far, in order.
    #[must_use]
    pub fn visited(&self) -> &[ProcessingStage] {
        &self.visited
    }

    /// Move to `next`. Returns `false` and stays put if `next` is not ahead
    /// of the current stage.
    pub fn advance(&mut self, next: ProcessingStage) -> bool {
        if next <= self.stage {
            tracing::warn!(from = %self.stage, to = %next, "Rejected backward stage transition");
            return false;
        }
        tracing::debug!(from = %self.stage, to = %next, "Stage transition");
        self.stage = next;
        self.visited.push(next);
        true
    }

    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.stage == ProcessingStage::Commit
    }
}
