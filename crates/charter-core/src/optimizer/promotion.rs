//! Promotion tracking and application
//!
//! A shard rule earns promotion by winning repeated cycles, not one. The
//! tracker keeps a win counter per rule id; `apply_promotions` moves the
//! winners into the constitution.

use crate::optimizer::change::{Change, ChangeType};
use crate::policy::PolicyBundle;
use serde::Serialize;
use std::collections::HashMap;

/// Win counter per rule id, accumulated across cycles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromotionTracker {
    wins: HashMap<String, u32>,
}

impl PromotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one winning cycle for a rule; returns the new win count.
    pub fn record_win(&mut self, rule_id: &str) -> u32 {
        let wins = self.wins.entry(rule_id.to_string()).or_insert(0);
        *wins += 1;
        *wins
    }

    pub fn wins(&self, rule_id: &str) -> u32 {
        self.wins.get(rule_id).copied().unwrap_or(0)
    }

    /// Clear the counter once a rule has been promoted.
    pub fn reset(&mut self, rule_id: &str) {
        self.wins.remove(rule_id);
    }
}

/// Move each named shard rule into the constitution, applying the accepted
/// `modify` text when the cycle proposed one. Unknown or already-promoted
/// ids are ignored, so reapplying a promotion set is idempotent.
pub fn apply_promotions(
    bundle: &PolicyBundle,
    rule_ids: &[String],
    changes: &[Change],
) -> PolicyBundle {
    let mut next = bundle.clone();
    for rule_id in rule_ids {
        if let Some(change) = changes
            .iter()
            .find(|c| c.change_type == ChangeType::Modify && &c.target_rule_id == rule_id)
        {
            next.amend_shard_text(rule_id, change.proposed_text.clone());
        }
        next.promote(rule_id);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::ledger::{RunEvent, RunLedger, Violation};
    use crate::optimizer::change::propose_changes;
    use crate::policy::RuleTier;
    use crate::types::Intent;

    #[test]
    fn test_tracker_accumulates_and_resets() {
        let mut tracker = PromotionTracker::new();
        assert_eq!(tracker.wins("R001"), 0);
        assert_eq!(tracker.record_win("R001"), 1);
        assert_eq!(tracker.record_win("R001"), 2);
        tracker.reset("R001");
        assert_eq!(tracker.wins("R001"), 0);
    }

    #[test]
    fn test_apply_promotions_moves_shard_with_amended_text() {
        let bundle = compile("- [R002] Always run tests before finishing", None);
        let mut ledger = RunLedger::new();
        let mut event = RunEvent::new("task-1", Intent::Testing, "");
        event.violations.push(Violation::new("R002", "skipped suite"));
        event.rework_lines = 12;
        ledger.log_event(event);

        let changes = propose_changes(&ledger.rank_violations(), &bundle, &ledger);
        let promoted = apply_promotions(&bundle, &["R002".to_string()], &changes);

        assert_eq!(promoted.tier_of("R002"), Some(RuleTier::Constitution));
        let rule = promoted.find_rule("R002").unwrap();
        assert!(rule.is_constitution);
        assert!(rule.text.contains("Verify this explicitly"));
        // The original bundle is untouched.
        assert_eq!(bundle.tier_of("R002"), Some(RuleTier::Shard));
    }

    #[test]
    fn test_apply_promotions_is_idempotent() {
        let bundle = compile("- [R002] Always run tests before finishing", None);
        let ids = vec!["R002".to_string(), "R404".to_string()];

        let once = apply_promotions(&bundle, &ids, &[]);
        let twice = apply_promotions(&once, &ids, &[]);

        assert_eq!(once.rule_count(), twice.rule_count());
        assert_eq!(once.constitution.hash, twice.constitution.hash);
        assert_eq!(
            once.manifest.constitution_rules,
            twice.manifest.constitution_rules
        );
    }
}
