//! Replication state tracking.

use std::time::Duration;

use serde::Serialize;

/// State of a replication run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReplicationState {
    /// Nothing has happened yet.
    Idle,

    /// Properties are being validated.
    Validating,

    /// The primary copy is in progress.
    CopyingPrimary,

    /// Per-architecture destinations are being computed.
    FanOutPlanning,

    /// A per-architecture copy is in progress.
    CopyingFanOut {
        /// Position in the plan.
        index: usize,
        /// Architecture being copied.
        arch: String,
    },

    /// Every copy succeeded.
    Done,

    /// A step failed; no further copies were attempted.
    Failed,
}

impl ReplicationState {
    /// Returns true if no further transitions are expected.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns a string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::CopyingPrimary => "copying_primary",
            Self::FanOutPlanning => "fan_out_planning",
            Self::CopyingFanOut { .. } => "copying_fan_out",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ReplicationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CopyingFanOut { index, arch } => write!(f, "{}[{index}:{arch}]", self.as_str()),
            other => f.write_str(other.as_str()),
        }
    }
}

/// One completed copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyRecord {
    /// Source reference.
    pub source: String,

    /// Destination reference.
    pub destination: String,

    /// Architecture filter that applied; empty for none.
    pub arch: String,

    /// Whether the whole index was copied.
    pub copy_full_index: bool,

    /// Wall time spent in the transport.
    pub elapsed: Duration,
}

/// Outcome of a successful replication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicationReport {
    /// States visited, in order, starting at `Idle`.
    pub transitions: Vec<ReplicationState>,

    /// Copies performed, primary first.
    pub copies: Vec<CopyRecord>,
}

impl Default for ReplicationReport {
    fn default() -> Self {
        Self {
            transitions: vec![ReplicationState::Idle],
            copies: Vec::new(),
        }
    }
}

impl ReplicationReport {
    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ReplicationState {
        self.transitions.last().unwrap_or(&ReplicationState::Idle)
    }

    /// Moves to `next`.
    pub fn enter(&mut self, next: ReplicationState) {
        tracing::debug!(from = %self.state(), to = %next, "state transition");
        self.transitions.push(next);
    }

    /// The report for a run that performed no copies.
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            transitions: vec![ReplicationState::Idle, ReplicationState::Done],
            copies: Vec::new(),
        }
    }

    /// Number of per-architecture copies performed.
    #[must_use]
    pub fn fan_out_count(&self) -> usize {
        self.copies.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_terminal() {
        assert!(ReplicationState::Done.is_terminal());
        assert!(ReplicationState::Failed.is_terminal());
        assert!(!ReplicationState::CopyingPrimary.is_terminal());
        assert!(!ReplicationState::Idle.is_terminal());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ReplicationState::FanOutPlanning.to_string(), "fan_out_planning");
        let fan_out = ReplicationState::CopyingFanOut {
            index: 1,
            arch: "arm64".to_string(),
        };
        assert_eq!(fan_out.to_string(), "copying_fan_out[1:arm64]");
    }

    #[test]
    fn test_report_transitions() {
        let mut report = ReplicationReport::default();
        assert_eq!(report.state(), &ReplicationState::Idle);
        report.enter(ReplicationState::Validating);
        report.enter(ReplicationState::CopyingPrimary);
        assert_eq!(report.state(), &ReplicationState::CopyingPrimary);
        assert_eq!(report.transitions.len(), 3);
        assert_eq!(report.fan_out_count(), 0);
    }

    #[test]
    fn test_report_skipped() {
        let report = ReplicationReport::skipped();
        assert!(report.state().is_terminal());
        assert!(report.copies.is_empty());
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let value = serde_json::to_value(ReplicationState::CopyingFanOut {
            index: 0,
            arch: "amd64".to_string(),
        })
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"state": "copying_fan_out", "index": 0, "arch": "amd64"})
        );
    }
}
