//! Rule change proposals
//!
//! Changes are produced from the top-ranked violations of a cycle and fed
//! to an external approval workflow. A change never mutates the bundle by
//! itself; promotions apply accepted text separately.

use crate::ledger::{RunLedger, Violation, ViolationRanking};
use crate::policy::{PolicyBundle, Rule};
use serde::Serialize;
use uuid::Uuid;

/// Kind of policy change being proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Modify,
    Add,
    Promote,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Modify => "modify",
            ChangeType::Add => "add",
            ChangeType::Promote => "promote",
        }
    }
}

/// One proposed change to the rule policy.
#[derive(Debug, Clone, Serialize)]
pub struct Change {
    pub change_id: String,
    pub target_rule_id: String,
    pub change_type: ChangeType,
    pub original_text: Option<String>,
    pub proposed_text: String,
    pub rationale: String,
    pub triggering_violation: Violation,
}

impl Change {
    fn fresh_id() -> String {
        format!("chg_{}", Uuid::new_v4())
    }

    /// A `modify` proposal strengthening an existing rule.
    pub fn modify(rule: &Rule, ranking: &ViolationRanking, violation: Violation) -> Self {
        Self {
            change_id: Self::fresh_id(),
            target_rule_id: rule.id.clone(),
            change_type: ChangeType::Modify,
            original_text: Some(rule.text.clone()),
            proposed_text: strengthened_text(&rule.text),
            rationale: rationale_for(ranking),
            triggering_violation: violation,
        }
    }

    /// An `add` proposal covering a violated rule id the bundle does not know.
    pub fn add(ranking: &ViolationRanking, violation: Violation) -> Self {
        Self {
            change_id: Self::fresh_id(),
            target_rule_id: ranking.rule_id.clone(),
            change_type: ChangeType::Add,
            original_text: None,
            proposed_text: format!(
                "Address recurring failure: {}",
                violation.description
            ),
            rationale: rationale_for(ranking),
            triggering_violation: violation,
        }
    }

    /// A `promote` record for a shard rule that earned its place in the
    /// constitution.
    pub fn promotion(rule: &Rule, wins: u32, violation: Violation) -> Self {
        Self {
            change_id: Self::fresh_id(),
            target_rule_id: rule.id.clone(),
            change_type: ChangeType::Promote,
            original_text: Some(rule.text.clone()),
            proposed_text: rule.text.clone(),
            rationale: format!(
                "Rule {} was recommended for promotion in {} consecutive cycles",
                rule.id, wins
            ),
            triggering_violation: violation,
        }
    }
}

/// Propose one change per ranked violation: `modify` when the rule exists
/// in the bundle, `add` when the rule id is unknown. Rankings without a
/// recorded violation instance are skipped.
pub fn propose_changes(
    rankings: &[ViolationRanking],
    bundle: &PolicyBundle,
    ledger: &RunLedger,
) -> Vec<Change> {
    rankings
        .iter()
        .filter_map(|ranking| {
            let (_, violation) = ledger.first_violation(&ranking.rule_id)?;
            let change = match bundle.find_rule(&ranking.rule_id) {
                Some(rule) => Change::modify(rule, ranking, violation.clone()),
                None => Change::add(ranking, violation.clone()),
            };
            Some(change)
        })
        .collect()
}

fn rationale_for(ranking: &ViolationRanking) -> String {
    format!(
        "Rule {} was violated {} time(s) costing {} rework lines (score {:.0})",
        ranking.rule_id, ranking.frequency, ranking.cost, ranking.score
    )
}

fn strengthened_text(text: &str) -> String {
    let base = text.trim_end_matches('.');
    format!("{}. Verify this explicitly before marking the task complete.", base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::ledger::RunEvent;
    use crate::types::Intent;

    fn ledger_with_violation(rule_id: &str, rework: u64) -> RunLedger {
        let mut ledger = RunLedger::new();
        let mut event = RunEvent::new("task-1", Intent::General, "");
        event.violations.push(Violation::new(rule_id, "missed the check"));
        event.rework_lines = rework;
        ledger.log_event(event);
        ledger
    }

    #[test]
    fn test_known_rule_yields_modify() {
        let bundle = compile("- [R001] Always run tests before finishing", None);
        let ledger = ledger_with_violation("R001", 25);
        let rankings = ledger.rank_violations();

        let changes = propose_changes(&rankings, &bundle, &ledger);
        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.change_type, ChangeType::Modify);
        assert_eq!(change.target_rule_id, "R001");
        assert_eq!(
            change.original_text.as_deref(),
            Some("Always run tests before finishing")
        );
        assert!(change.proposed_text.contains("Always run tests"));
        assert!(change.rationale.contains("violated 1 time(s)"));
        assert!(change.rationale.contains("25 rework lines"));
        assert!(change.change_id.starts_with("chg_"));
    }

    #[test]
    fn test_unknown_rule_yields_add() {
        let bundle = compile("- [R001] Always run tests before finishing", None);
        let ledger = ledger_with_violation("R099", 5);
        let rankings = ledger.rank_violations();

        let changes = propose_changes(&rankings, &bundle, &ledger);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, ChangeType::Add);
        assert!(changes[0].original_text.is_none());
        assert!(changes[0].proposed_text.contains("missed the check"));
    }
}
