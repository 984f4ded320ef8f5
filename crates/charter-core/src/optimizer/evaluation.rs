//! Change evaluation
//!
//! Evaluating a change compares baseline ledger metrics against a candidate
//! recomputation of the same ledger with the target rule's violations
//! treated as resolved. This is a heuristic approximation, not a controlled
//! experiment: both sides read the same telemetry, so the candidate numbers
//! estimate the best case where the change eliminates every recurrence.

use crate::ledger::{LedgerMetrics, RunLedger};
use crate::optimizer::change::Change;
use serde::Serialize;

/// Outcome of evaluating one proposed change.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvaluation {
    pub baseline: LedgerMetrics,
    pub candidate: LedgerMetrics,
    pub should_promote: bool,
    pub reason: String,
}

/// Evaluate a change against the ledger.
///
/// `should_promote` is true when the target rule's violation frequency
/// exceeds the repeat-offense threshold - a repeat offender is exactly the
/// rule worth hardening.
pub fn evaluate_change(
    change: &Change,
    baseline: &LedgerMetrics,
    ledger: &RunLedger,
    repeat_offense_threshold: usize,
) -> ChangeEvaluation {
    let frequency = ledger
        .all_events()
        .iter()
        .flat_map(|e| &e.violations)
        .filter(|v| v.rule_id == change.target_rule_id)
        .count();

    let candidate = metrics_without_rule(ledger, &change.target_rule_id);
    let should_promote = frequency > repeat_offense_threshold;

    let reason = if should_promote {
        format!(
            "{} violation(s) of {} exceed the repeat-offense threshold of {}",
            frequency, change.target_rule_id, repeat_offense_threshold
        )
    } else {
        format!(
            "{} violation(s) of {} stay within the repeat-offense threshold of {}",
            frequency, change.target_rule_id, repeat_offense_threshold
        )
    };

    ChangeEvaluation {
        baseline: *baseline,
        candidate,
        should_promote,
        reason,
    }
}

/// Recompute ledger metrics as if every violation of the rule were resolved.
fn metrics_without_rule(ledger: &RunLedger, rule_id: &str) -> LedgerMetrics {
    let events = ledger.all_events();
    let task_count = events.len();
    if task_count == 0 {
        return LedgerMetrics::default();
    }

    let mut total_violations = 0usize;
    let mut auto_corrected = 0usize;
    let mut total_rework = 0u64;

    for event in events {
        let remaining = event.violations.iter().filter(|v| v.rule_id != rule_id);
        for violation in remaining {
            total_violations += 1;
            if violation.auto_corrected {
                auto_corrected += 1;
            }
        }
        total_rework += event.rework_lines;
    }

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::ledger::{RunEvent, Violation};
    use crate::optimizer::change::propose_changes;
    use crate::types::Intent;

    fn ledger_with_repeat_offender(times: usize) -> RunLedger {
        let mut ledger = RunLedger::new();
        for i in 0..times {
            let mut event = RunEvent::new(format!("task-{i}"), Intent::General, "");
            event.violations.push(Violation::new("R001", "recurred"));
            event.rework_lines = 10;
            ledger.log_event(event);
        }
        ledger
    }

    #[test]
    fn test_repeat_offender_should_promote() {
        let bundle = compile("- [R001] Always gate risky commands", None);
        let ledger = ledger_with_repeat_offender(4);
        let baseline = ledger.compute_metrics();
        let changes = propose_changes(&ledger.rank_violations(), &bundle, &ledger);

        let evaluation = evaluate_change(&changes[0], &baseline, &ledger, 3);
        assert!(evaluation.should_promote);
        assert!(evaluation.reason.contains("exceed"));
    }

    #[test]
    fn test_infrequent_offender_is_rejected() {
        let bundle = compile("- [R001] Always gate risky commands", None);
        let ledger = ledger_with_repeat_offender(2);
        let baseline = ledger.compute_metrics();
        let changes = propose_changes(&ledger.rank_violations(), &bundle, &ledger);

        let evaluation = evaluate_change(&changes[0], &baseline, &ledger, 3);
        assert!(!evaluation.should_promote);
    }

    #[test]
    fn test_candidate_metrics_drop_target_violations() {
        let bundle = compile("- [R001] Always gate risky commands", None);
        let ledger = ledger_with_repeat_offender(4);
        let baseline = ledger.compute_metrics();
        let changes = propose_changes(&ledger.rank_violations(), &bundle, &ledger);

        let evaluation = evaluate_change(&changes[0], &baseline, &ledger, 3);
        assert!(evaluation.baseline.violation_rate > 0.0);
        assert_eq!(evaluation.candidate.violation_rate, 0.0);
        // Rework attribution is unchanged - only the violations are
        // treated as resolved.
        assert_eq!(
            evaluation.candidate.rework_lines,
            evaluation.baseline.rework_lines
        );
    }
}
