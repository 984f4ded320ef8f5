//! Run Ledger - append-only telemetry log with aggregation queries
//!
//! The ledger holds RunEvents in insertion order. Events are appended via
//! `log_event`/`finalize_event` or `import_events`; prior events are never
//! mutated in place. All queries and aggregations are synchronous and
//! in-memory; persistence across restarts is the caller's concern.

pub mod evaluators;
pub mod event;

use crate::error::{LedgerError, Result};
use crate::types::{now, Timestamp};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

pub use evaluators::{
    DiffQualityEvaluator, Evaluation, ForbiddenCommandEvaluator, RunEvaluator, TestsPassEvaluator,
    ViolationRateEvaluator,
};
pub use event::{DiffSummary, RunEvent, TestResults, Violation};

/// Aggregate health metrics over the whole ledger.
///
/// An empty ledger yields all zeros, never NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LedgerMetrics {
    /// Violations per task, scaled by 10.
    pub violation_rate: f64,
    /// Share of violations the agent corrected on its own (0 when there
    /// are no violations).
    pub self_correction_rate: f64,
    /// Mean rework lines per task.
    pub rework_lines: f64,
    pub task_count: usize,
}

/// Derived ranking entry for one rule's violations. Not stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationRanking {
    pub rule_id: String,
    pub frequency: usize,
    /// Sum of rework lines of the events carrying the violations.
    pub cost: u64,
    /// frequency x cost.
    pub score: f64,
}

/// Append-only sequence of run events.
#[derive(Debug, Clone, Default)]
pub struct RunLedger {
    events: Vec<RunEvent>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, assigning a fresh id if none was set.
    /// Returns the event's id.
    pub fn log_event(&mut self, mut event: RunEvent) -> Uuid {
        if event.event_id.is_nil() {
            event.event_id = Uuid::new_v4();
        }
        let id = event.event_id;
        self.events.push(event);
        id
    }

    /// Stamp the elapsed duration since the event was created, then log it.
    pub fn finalize_event(&mut self, mut event: RunEvent) -> Uuid {
        let elapsed = now().signed_duration_since(event.timestamp);
        event.duration_ms = elapsed.num_milliseconds().max(0) as u64;
        self.log_event(event)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn all_events(&self) -> &[RunEvent] {
        &self.events
    }

    /// Look up a logged event by id.
    pub fn event(&self, event_id: Uuid) -> Result<&RunEvent> {
        self.events
            .iter()
            .find(|e| e.event_id == event_id)
            .ok_or_else(|| LedgerError::EventNotFound(event_id).into())
    }

    pub fn events_by_task(&self, task_id: &str) -> Vec<&RunEvent> {
        self.events.iter().filter(|e| e.task_id == task_id).collect()
    }

    /// The last `n` events in insertion order.
    pub fn recent_events(&self, n: usize) -> &[RunEvent] {
        let start = self.events.len().saturating_sub(n);
        &self.events[start..]
    }

    /// Events whose timestamp falls inside the inclusive range.
    pub fn events_in_range(&self, start: Timestamp, end: Timestamp) -> Vec<&RunEvent> {
        self.events
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
            .collect()
    }

    /// The first logged violation of a rule, with its owning event.
    pub fn first_violation(&self, rule_id: &str) -> Option<(&RunEvent, &Violation)> {
        self.events.iter().find_map(|event| {
            event
                .violations
                .iter()
                .find(|v| v.rule_id == rule_id)
                .map(|v| (event, v))
        })
    }

    /// Aggregate metrics over all logged events.
    pub fn compute_metrics(&self) -> LedgerMetrics {
        let task_count = self.events.len();
        if task_count == 0 {
            return LedgerMetrics::default();
        }

        let total_violations: usize = self.events.iter().map(|e| e.violations.len()).sum();
        let auto_corrected: usize = self.events.iter().map(|e| e.auto_corrected_count()).sum();
        let total_rework: u64 = self.events.iter().map(|e| e.rework_lines).sum();

        let self_correction_rate = if total_violations == 0 {
            0.0
        } else {
            auto_corrected as f64 / total_violations as f64
        };

        LedgerMetrics {
            violation_rate: total_violations as f64 / task_count as f64 * 10.0,
            self_correction_rate,
            rework_lines: total_rework as f64 / task_count as f64,
            task_count,
        }
    }

    /// Group violations by rule id into frequency/cost rankings, scored by
    /// frequency x cost and sorted descending (frequency breaks ties, rule
    /// id keeps the order deterministic).
    pub fn rank_violations(&self) -> Vec<ViolationRanking> {
        let mut grouped: HashMap<&str, (usize, u64)> = HashMap::new();
        for event in &self.events {
            for violation in &event.violations {
                let entry = grouped.entry(violation.rule_id.as_str()).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += event.rework_lines;
            }
        }

        let mut rankings: Vec<ViolationRanking> = grouped
            .into_iter()
            .map(|(rule_id, (frequency, cost))| ViolationRanking {
                rule_id: rule_id.to_string(),
                frequency,
                cost,
                score: frequency as f64 * cost as f64,
            })
            .collect();

        rankings.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(b.frequency.cmp(&a.frequency))
                .then(a.rule_id.cmp(&b.rule_id))
        });
        rankings
    }

    /// Serialize all events to JSONL, one event per line.
    pub fn export_events(&self) -> Result<String> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Append events parsed from JSONL. Blank lines are skipped; a
    /// malformed line is an error naming its line number. Returns how many
    /// events were imported.
    pub fn import_events(&mut self, data: &str) -> Result<usize> {
        let mut imported = 0;
        for (index, line) in data.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let event: RunEvent =
                serde_json::from_str(line).map_err(|source| LedgerError::MalformedRecord {
                    line: index + 1,
                    source,
                })?;
            self.log_event(event);
            imported += 1;
        }
        Ok(imported)
    }
}
