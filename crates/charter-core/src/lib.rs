//! Charter Core - The adaptive governance engine for AI coding agents
//!
//! Charter Core compiles natural-language guidance into an enforced,
//! self-improving rule policy and gates risky operations at runtime.
//!
//! # Architecture
//!
//! Charter is built on five layers:
//!
//! 1. **Policy Bundle** (`policy`): Two-tier rule model - a protected
//!    constitution plus candidate shards, indexed by rule id
//! 2. **Guidance Compiler** (`compiler`): Tokenizes guidance documents into
//!    rules, merges local overrides, classifies tiers, stamps a
//!    deterministic constitution hash
//! 3. **Run Ledger** (`ledger`): Append-only task telemetry with metrics,
//!    violation rankings, and pluggable pass/fail evaluators
//! 4. **Optimizer Loop** (`optimizer`): Ranks violations, proposes and
//!    evaluates rule changes, records ADRs, and promotes repeat winners
//!    into the constitution
//! 5. **Enforcement Gates** (`gates`): Stateless pre-execution checks for
//!    destructive commands, secret exposure, oversized diffs, and
//!    disallowed tools
//!
//! # Quick Start
//!
//! ```
//! use charter_core::compiler::compile;
//! use charter_core::ledger::{RunEvent, RunLedger, Violation};
//! use charter_core::optimizer::Optimizer;
//! use charter_core::types::Intent;
//!
//! // Compile guidance into a policy bundle.
//! let mut bundle = compile(
//!     "- [R001] Never commit hardcoded secrets (critical) @security\n\
//!      - [R002] Always run tests before finishing @testing",
//!     None,
//! );
//!
//! // Record telemetry for completed tasks.
//! let mut ledger = RunLedger::new();
//! for i in 0..6 {
//!     let mut event = RunEvent::new(format!("task-{i}"), Intent::Testing, &bundle.constitution.hash);
//!     event.violations.push(Violation::new("R002", "finished without running tests"));
//!     event.rework_lines = 15;
//!     ledger.log_event(event);
//! }
//!
//! // Run optimization cycles; repeat offenders earn promotion.
//! let mut optimizer = Optimizer::new();
//! let report = optimizer.run_cycle(&ledger, &mut bundle);
//! assert!(!report.rankings.is_empty());
//! ```
//!
//! # Design Principles
//!
//! 1. **Total parsing**: malformed guidance compiles to an empty policy,
//!    never an error
//! 2. **Append-only telemetry**: logged events are immutable; the ledger
//!    only grows
//! 3. **Earned trust**: a rule enters the constitution after repeated
//!    winning cycles, never after a single good one
//! 4. **Pure gates**: enforcement decisions depend only on the input and
//!    static configuration

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod compiler;
pub mod config;
pub mod error;
pub mod gates;
pub mod ledger;
pub mod optimizer;
pub mod policy;
pub mod types;

// Re-export commonly used types for convenience
pub use compiler::{compile, parse_guidance_file};
pub use config::CharterConfig;
pub use error::{CharterError, Result};
pub use gates::{aggregate_decision, GateConfig, GateDecision, GateResult, Gatekeeper};
pub use ledger::{
    Evaluation, LedgerMetrics, RunEvaluator, RunEvent, RunLedger, Violation, ViolationRanking,
};
pub use optimizer::{
    apply_promotions, Adr, AdrDecision, Change, ChangeType, CycleReport, Optimizer,
    OptimizerConfig, PromotionTracker,
};
pub use policy::{Constitution, PolicyBundle, Rule, RuleTier, Shard};
pub use types::{Intent, RiskClass, RuleOrigin, Timestamp, ViolationSeverity};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::types::Intent;

    const GUIDANCE: &str = "\
# Safety invariants

- [R001] Never commit hardcoded secrets (critical) @security verify:secrets-scan

# Workflow

- [R002] Always run tests before finishing @testing
- [R003] Should keep diffs small and reviewable [git]
";

    #[test]
    fn test_compile_observe_promote_workflow() {
        let mut bundle = compile(GUIDANCE, None);
        assert_eq!(bundle.manifest.constitution_rules, 1);
        assert_eq!(bundle.rule_count(), 3);

        // Six tasks keep violating R002.
        let mut ledger = RunLedger::new();
        for i in 0..6 {
            let mut event = RunEvent::new(
                format!("task-{i}"),
                Intent::Testing,
                &bundle.constitution.hash,
            );
            event.violations.push(Violation::new("R002", "skipped the suite"));
            event.rework_lines = 20;
            ledger.log_event(event);
        }

        let mut optimizer = Optimizer::new();
        let first = optimizer.run_cycle(&ledger, &mut bundle);
        assert!(first.promoted.is_empty());

        let second = optimizer.run_cycle(&ledger, &mut bundle);
        assert_eq!(second.promoted, vec!["R002".to_string()]);
        assert_eq!(bundle.tier_of("R002"), Some(RuleTier::Constitution));
        assert_eq!(bundle.manifest.constitution_rules, 2);
    }

    #[test]
    fn test_gates_guard_the_risky_path() {
        let gatekeeper = Gatekeeper::default();

        let results = gatekeeper.evaluate_command("git push --force origin main");
        assert_eq!(
            aggregate_decision(&results),
            GateDecision::RequireConfirmation
        );

        assert_eq!(aggregate_decision(&[]), GateDecision::Allow);
    }
}
