//! Run events - telemetry for completed tasks
//!
//! One RunEvent is recorded per completed task by the external execution
//! harness. Events are built through the factory with zero-valued defaults
//! and are immutable once logged.

use crate::types::{now, Intent, Timestamp, ViolationSeverity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Line counts summarizing the diff a task produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    #[serde(default)]
    pub lines_added: u64,
    #[serde(default)]
    pub lines_removed: u64,
    #[serde(default)]
    pub files_changed: u64,
}

/// Test suite outcome for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResults {
    #[serde(default)]
    pub ran: bool,
    #[serde(default)]
    pub passed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub skipped: u64,
}

/// A recorded instance where a rule was not followed during a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub description: String,
    #[serde(default)]
    pub severity: ViolationSeverity,
    #[serde(default)]
    pub auto_corrected: bool,
}

impl Violation {
    pub fn new(rule_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            description: description.into(),
            severity: ViolationSeverity::default(),
            auto_corrected: false,
        }
    }
}

/// Telemetry for one completed task.
///
/// Missing fields deserialize to factory defaults rather than being
/// rejected; a nil `event_id` means "not yet assigned" and the ledger
/// stamps a fresh one at log time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    #[serde(default)]
    pub event_id: Uuid,
    pub task_id: String,
    #[serde(default)]
    pub guidance_hash: String,
    #[serde(default)]
    pub retrieved_rule_ids: Vec<String>,
    #[serde(default)]
    pub tools_used: Vec<String>,
    #[serde(default)]
    pub files_touched: Vec<String>,
    #[serde(default)]
    pub diff_summary: DiffSummary,
    #[serde(default)]
    pub test_results: TestResults,
    #[serde(default)]
    pub violations: Vec<Violation>,
    #[serde(default)]
    pub outcome_accepted: bool,
    /// Lines later reverted or rewritten - the cost proxy for rankings.
    #[serde(default)]
    pub rework_lines: u64,
    #[serde(default)]
    pub intent: Intent,
    #[serde(default = "now")]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub duration_ms: u64,
}

impl RunEvent {
    /// Factory: a zero-valued event for a task that just started.
    pub fn new(
        task_id: impl Into<String>,
        intent: Intent,
        guidance_hash: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            task_id: task_id.into(),
            guidance_hash: guidance_hash.into(),
            retrieved_rule_ids: Vec::new(),
            tools_used: Vec::new(),
            files_touched: Vec::new(),
            diff_summary: DiffSummary::default(),
            test_results: TestResults::default(),
            violations: Vec::new(),
            outcome_accepted: false,
            rework_lines: 0,
            intent,
            timestamp: now(),
            duration_ms: 0,
        }
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// How many of this event's violations the agent corrected on its own.
    pub fn auto_corrected_count(&self) -> usize {
        self.violations.iter().filter(|v| v.auto_corrected).count()
    }
}
