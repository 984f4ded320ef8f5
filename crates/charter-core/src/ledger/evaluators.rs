//! Run evaluators - pluggable pass/fail checks over single events
//!
//! Each evaluator inspects one RunEvent and returns a verdict with a
//! reason on failure. Evaluators never throw; unrecognized input simply
//! passes through the check it does not trigger.

use crate::ledger::event::RunEvent;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    /// Default denylist for the forbidden-command check.
    static ref DEFAULT_FORBIDDEN: Vec<Regex> = vec![
        Regex::new(r"\brm\s+-[a-zA-Z]*r[a-zA-Z]*\s+/").unwrap(),
        Regex::new(r"\bcurl\s+[^|]*\|\s*(ba|z)?sh\b").unwrap(),
        Regex::new(r"\bchmod\s+777\b").unwrap(),
        Regex::new(r"\bgit\s+push\s+.*--force\b").unwrap(),
    ];
}

/// Verdict from a single evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub passed: bool,
    pub reason: Option<String>,
}

impl Evaluation {
    pub fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

/// A pass/fail check over one run event.
pub trait RunEvaluator {
    fn name(&self) -> &'static str;
    fn evaluate(&self, event: &RunEvent) -> Evaluation;
}

/// Passes iff the test suite ran and nothing failed.
#[derive(Debug, Default)]
pub struct TestsPassEvaluator;

impl RunEvaluator for TestsPassEvaluator {
    fn name(&self) -> &'static str {
        "tests_pass"
    }

    fn evaluate(&self, event: &RunEvent) -> Evaluation {
        if !event.test_results.ran {
            return Evaluation::fail("test suite did not run");
        }
        if event.test_results.failed > 0 {
            return Evaluation::fail(format!(
                "{} test(s) failed",
                event.test_results.failed
            ));
        }
        Evaluation::pass()
    }
}

/// Fails when any tool invocation matches the denylist.
#[derive(Debug)]
pub struct ForbiddenCommandEvaluator {
    patterns: Vec<Regex>,
}

impl ForbiddenCommandEvaluator {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }
}

impl Default for ForbiddenCommandEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_FORBIDDEN.clone())
    }
}

impl RunEvaluator for ForbiddenCommandEvaluator {
    fn name(&self) -> &'static str {
        "forbidden_command"
    }

    fn evaluate(&self, event: &RunEvent) -> Evaluation {
        for tool in &event.tools_used {
            if let Some(pattern) = self.patterns.iter().find(|p| p.is_match(tool)) {
                return Evaluation::fail(format!(
                    "tool invocation `{}` matches denylist pattern `{}`",
                    tool, pattern
                ));
            }
        }
        Evaluation::pass()
    }
}

/// Fails when an event carries more violations than the threshold allows.
#[derive(Debug)]
pub struct ViolationRateEvaluator {
    pub threshold: usize,
}

impl ViolationRateEvaluator {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }
}

impl RunEvaluator for ViolationRateEvaluator {
    fn name(&self) -> &'static str {
        "violation_rate"
    }

    fn evaluate(&self, event: &RunEvent) -> Evaluation {
        if event.violations.len() > self.threshold {
            return Evaluation::fail(format!(
                "{} violations exceed threshold {}",
                event.violations.len(),
                self.threshold
            ));
        }
        Evaluation::pass()
    }
}

/// Fails when rework dominates the lines a task added.
#[derive(Debug)]
pub struct DiffQualityEvaluator {
    pub max_rework_ratio: f64,
}

impl DiffQualityEvaluator {
    pub fn new(max_rework_ratio: f64) -> Self {
        Self { max_rework_ratio }
    }
}

impl RunEvaluator for DiffQualityEvaluator {
    fn name(&self) -> &'static str {
        "diff_quality"
    }

    fn evaluate(&self, event: &RunEvent) -> Evaluation {
        let added = event.diff_summary.lines_added.max(1) as f64;
        let ratio = event.rework_lines as f64 / added;
        if ratio > self.max_rework_ratio {
            return Evaluation::fail(format!(
                "rework ratio {:.2} exceeds maximum {:.2}",
                ratio, self.max_rework_ratio
            ));
        }
        Evaluation::pass()
    }
}

/// Run every evaluator against one event, collecting named verdicts.
pub fn evaluate_all(
    event: &RunEvent,
    evaluators: &[Box<dyn RunEvaluator>],
) -> Vec<(&'static str, Evaluation)> {
    evaluators
        .iter()
        .map(|evaluator| (evaluator.name(), evaluator.evaluate(event)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::event::Violation;
    use crate::types::Intent;

    fn base_event() -> RunEvent {
        RunEvent::new("task-1", Intent::General, "hash")
    }

    #[test]
    fn test_tests_pass_requires_run_and_zero_failures() {
        let evaluator = TestsPassEvaluator;

        let mut event = base_event();
        assert!(!evaluator.evaluate(&event).passed);

        event.test_results.ran = true;
        assert!(evaluator.evaluate(&event).passed);

        event.test_results.failed = 2;
        let verdict = evaluator.evaluate(&event);
        assert!(!verdict.passed);
        assert!(verdict.reason.unwrap().contains("2 test(s) failed"));
    }

    #[test]
    fn test_forbidden_command_matches_denylist() {
        let evaluator = ForbiddenCommandEvaluator::default();

        let mut event = base_event();
        event.tools_used.push("cargo test".to_string());
        assert!(evaluator.evaluate(&event).passed);

        event.tools_used.push("rm -rf /var/data".to_string());
        assert!(!evaluator.evaluate(&event).passed);
    }

    #[test]
    fn test_violation_rate_threshold() {
        let evaluator = ViolationRateEvaluator::new(1);

        let mut event = base_event();
        event.violations.push(Violation::new("R001", "one"));
        assert!(evaluator.evaluate(&event).passed);

        event.violations.push(Violation::new("R002", "two"));
        assert!(!evaluator.evaluate(&event).passed);
    }

    #[test]
    fn test_diff_quality_guards_division_by_zero() {
        let evaluator = DiffQualityEvaluator::new(0.5);

        // Zero lines added: the denominator clamps to 1.
        let mut event = base_event();
        event.rework_lines = 2;
        assert!(!evaluator.evaluate(&event).passed);

        event.diff_summary.lines_added = 100;
        assert!(evaluator.evaluate(&event).passed);
    }

    #[test]
    fn test_evaluate_all_collects_named_verdicts() {
        let evaluators: Vec<Box<dyn RunEvaluator>> = vec![
            Box::new(TestsPassEvaluator),
            Box::new(ViolationRateEvaluator::new(0)),
        ];

        let verdicts = evaluate_all(&base_event(), &evaluators);
        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts[0].0, "tests_pass");
        assert!(verdicts[1].1.passed);
    }
}
