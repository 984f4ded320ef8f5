//! Optimizer Loop - rank violations, propose and evaluate changes,
//! promote repeat winners
//!
//! One cycle consumes the ledger and the current bundle: it ranks
//! violations, proposes a change per top offender, evaluates each change
//! against the ledger, records one ADR per evaluated change, and counts
//! wins toward promotion. A shard rule only enters the constitution after
//! multiple winning cycles - the state machine is one-directional, with no
//! demotion.

pub mod adr;
pub mod change;
pub mod evaluation;
pub mod promotion;

use crate::ledger::{RunLedger, ViolationRanking};
use crate::policy::{PolicyBundle, RuleTier};
use serde::{Deserialize, Serialize};

pub use adr::{Adr, AdrDecision, AdrLog};
pub use change::{propose_changes, Change, ChangeType};
pub use evaluation::{evaluate_change, ChangeEvaluation};
pub use promotion::{apply_promotions, PromotionTracker};

/// Tunables for the optimizer loop.
///
/// The upstream thresholds are underspecified, so they are configuration
/// with conservative defaults rather than constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Minimum logged tasks before a cycle does anything.
    #[serde(default = "default_min_task_count")]
    pub min_task_count: usize,
    /// How many ranked violations a cycle considers.
    #[serde(default = "default_ranking_breadth")]
    pub ranking_breadth: usize,
    /// Violations above this count mark a rule a repeat offender.
    #[serde(default = "default_repeat_offense_threshold")]
    pub repeat_offense_threshold: usize,
    /// Winning cycles required before a shard rule is promoted.
    #[serde(default = "default_promotion_wins")]
    pub promotion_wins: u32,
}

fn default_min_task_count() -> usize {
    5
}

fn default_ranking_breadth() -> usize {
    5
}

fn default_repeat_offense_threshold() -> usize {
    3
}

fn default_promotion_wins() -> u32 {
    2
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_task_count: default_min_task_count(),
            ranking_breadth: default_ranking_breadth(),
            repeat_offense_threshold: default_repeat_offense_threshold(),
            promotion_wins: default_promotion_wins(),
        }
    }
}

/// Everything one cycle produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub rankings: Vec<ViolationRanking>,
    pub changes: Vec<Change>,
    pub adrs: Vec<Adr>,
    /// Rule ids moved into the constitution this cycle.
    pub promoted: Vec<String>,
}

/// The optimizer loop driver. Holds the win tracker and the ADR history
/// across cycles.
#[derive(Debug, Default)]
pub struct Optimizer {
    config: OptimizerConfig,
    tracker: PromotionTracker,
    adr_log: AdrLog,
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OptimizerConfig) -> Self {
        Self {
            config,
            tracker: PromotionTracker::new(),
            adr_log: AdrLog::new(),
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn tracker(&self) -> &PromotionTracker {
        &self.tracker
    }

    /// Full ADR history across every cycle this optimizer has run.
    pub fn adr_history(&self) -> &[Adr] {
        self.adr_log.entries()
    }

    /// Run one optimization cycle over the ledger, updating the bundle in
    /// place when promotions fire.
    ///
    /// A ledger below `min_task_count` produces an empty report - sparse
    /// data is a no-op, not an error.
    pub fn run_cycle(&mut self, ledger: &RunLedger, bundle: &mut PolicyBundle) -> CycleReport {
        if ledger.len() < self.config.min_task_count {
            return CycleReport::default();
        }

        let baseline = ledger.compute_metrics();
        let mut rankings = ledger.rank_violations();
        rankings.truncate(self.config.ranking_breadth);

        let mut changes = propose_changes(&rankings, bundle, ledger);
        let mut adrs = Vec::new();
        let mut winners: Vec<String> = Vec::new();

        for change in &changes {
            let evaluation = evaluate_change(
                change,
                &baseline,
                ledger,
                self.config.repeat_offense_threshold,
            );

            let decision = if evaluation.should_promote {
                AdrDecision::Promote
            } else {
                AdrDecision::Reject
            };
            let adr = self.adr_log.record(
                format!("{} {}", title_case(change.change_type), change.target_rule_id),
                change.rationale.clone(),
                decision,
                consequences_for(change, &evaluation),
            );
            adrs.push(adr.clone());

            // Wins only accrue for rules that can still be promoted.
            if evaluation.should_promote
                && bundle.tier_of(&change.target_rule_id) == Some(RuleTier::Shard)
            {
                let wins = self.tracker.record_win(&change.target_rule_id);
                if wins >= self.config.promotion_wins {
                    winners.push(change.target_rule_id.clone());
                }
            }
        }

        if !winners.is_empty() {
            *bundle = apply_promotions(bundle, &winners, &changes);
            for rule_id in &winners {
                let wins = self.tracker.wins(rule_id);
                self.tracker.reset(rule_id);

                if let (Ok(rule), Some((_, violation))) =
                    (bundle.require_rule(rule_id), ledger.first_violation(rule_id))
                {
                    let promotion = Change::promotion(rule, wins, violation.clone());
                    let adr = self.adr_log.record(
                        format!("Promote {}", rule_id),
                        promotion.rationale.clone(),
                        AdrDecision::Promote,
                        format!(
                            "Rule {} is now part of the constitution and always enforced",
                            rule_id
                        ),
                    );
                    adrs.push(adr.clone());
                    changes.push(promotion);
                }
            }
        }

        CycleReport {
            rankings,
            changes,
            adrs,
            promoted: winners,
        }
    }
}

fn title_case(change_type: ChangeType) -> &'static str {
    match change_type {
        ChangeType::Modify => "Modify",
        ChangeType::Add => "Add",
        ChangeType::Promote => "Promote",
    }
}

fn consequences_for(change: &Change, evaluation: &ChangeEvaluation) -> String {
    match evaluation.should_promote {
        true => format!(
            "Adopting the change is expected to cut the violation rate from {:.1} to {:.1}",
            evaluation.baseline.violation_rate, evaluation.candidate.violation_rate
        ),
        false => format!(
            "Rule {} stays as-is; the evidence does not justify a change yet",
            change.target_rule_id
        ),
    }
}
