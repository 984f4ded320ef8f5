//! Guidance file parser
//!
//! Parses one guidance document into a rule list. Parsing is total:
//! malformed or empty text yields an empty list, never an error.

use crate::compiler::tokens::{tokenize_bullet, BulletToken};
use crate::policy::Rule;
use crate::types::{short_digest, Intent, RiskClass, RuleOrigin};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

lazy_static! {
    static ref HEADING_PATTERN: Regex = Regex::new(r"^(#{1,6})\s+(.+)$").unwrap();
    static ref BULLET_PATTERN: Regex = Regex::new(r"^\s*[-*]\s+(.+)$").unwrap();
    /// Headings whose bullets are forced into the constitution tier.
    static ref PROTECTED_HEADING: Regex =
        Regex::new(r"(?i)\b(safety|invariants?|non[- ]?negotiables?)\b").unwrap();
    /// Imperative cues that make an unnumbered bullet an implicit rule.
    static ref IMPERATIVE_CUE: Regex =
        Regex::new(r"(?i)\b(must|always|never|avoid|should)\b").unwrap();
}

/// Parse guidance text into rules, tagging each with its origin.
///
/// Rules under a safety/invariant/non-negotiable heading compile into the
/// constitution tier regardless of annotation; so do `critical`-risk rules.
/// Unnumbered bullets without an imperative cue are discarded.
pub fn parse_guidance_file(text: &str, origin: RuleOrigin) -> Vec<Rule> {
    let mut rules: Vec<Rule> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut protected_section = false;

    for line in text.lines() {
        if let Some(caps) = HEADING_PATTERN.captures(line.trim_end()) {
            protected_section = PROTECTED_HEADING.is_match(&caps[2]);
            continue;
        }

        let Some(caps) = BULLET_PATTERN.captures(line) else {
            continue;
        };
        let Some(rule) = rule_from_bullet(&caps[1], origin, protected_section) else {
            continue;
        };

        // A repeated id within one file overrides the earlier line in place.
        match by_id.get(&rule.id) {
            Some(&position) => rules[position].override_with(rule),
            None => {
                by_id.insert(rule.id.clone(), rules.len());
                rules.push(rule);
            }
        }
    }

    rules
}

/// Fold one bullet's token stream into a Rule, or discard it.
fn rule_from_bullet(content: &str, origin: RuleOrigin, protected_section: bool) -> Option<Rule> {
    let mut id: Option<String> = None;
    let mut risk_class = RiskClass::default();
    let mut tool_classes = BTreeSet::new();
    let mut intents: Vec<Intent> = Vec::new();
    let mut verifier: Option<String> = None;
    let mut words: Vec<String> = Vec::new();

    for token in tokenize_bullet(content) {
        match token {
            BulletToken::RuleId(value) => id = Some(value),
            BulletToken::Risk(risk) => risk_class = risk,
            BulletToken::ToolClass(value) => {
                tool_classes.insert(value);
            }
            BulletToken::IntentTag(tag) => {
                let intent = Intent::parse(&tag);
                if !intents.contains(&intent) {
                    intents.push(intent);
                }
            }
            BulletToken::Verifier(name) => verifier = Some(name),
            BulletToken::Word(word) => words.push(word),
        }
    }

    let text = words.join(" ");
    if text.is_empty() {
        return None;
    }

    let id = match id {
        Some(id) => id,
        None => {
            if !IMPERATIVE_CUE.is_match(&text) {
                // Not actionable: no explicit id, no imperative cue.
                return None;
            }
            synthesized_id(&text)
        }
    };

    Some(Rule {
        id,
        text,
        risk_class,
        tool_classes,
        intents,
        verifier,
        is_constitution: protected_section || risk_class == RiskClass::Critical,
        origin,
    })
}

/// Deterministic id for an implicit rule, derived from its text so equal
/// guidance always compiles to an identical bundle.
fn synthesized_id(text: &str) -> String {
    format!("auto-{}", &short_digest(text)[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_rule_with_annotations() {
        let rules = parse_guidance_file(
            "- [R001] Never commit hardcoded secrets (critical) @security verify:secrets-scan",
            RuleOrigin::Root,
        );

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.id, "R001");
        assert_eq!(rule.text, "Never commit hardcoded secrets");
        assert_eq!(rule.risk_class, RiskClass::Critical);
        assert!(rule.tool_classes.is_empty());
        assert_eq!(rule.intents, vec![Intent::Security]);
        assert_eq!(rule.verifier.as_deref(), Some("secrets-scan"));
        assert!(rule.is_constitution);
    }

    #[test]
    fn test_implicit_rule_gets_synthesized_id() {
        let rules = parse_guidance_file("- Always run the linter before pushing", RuleOrigin::Root);
        assert_eq!(rules.len(), 1);
        assert!(rules[0].id.starts_with("auto-"));
        assert_eq!(rules[0].risk_class, RiskClass::Medium);
        assert!(!rules[0].is_constitution);
    }

    #[test]
    fn test_synthesized_ids_are_stable() {
        let first = parse_guidance_file("- Always run the linter before pushing", RuleOrigin::Root);
        let second = parse_guidance_file("- Always run the linter before pushing", RuleOrigin::Root);
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn test_non_actionable_bullets_discarded() {
        let text = "- This project uses PostgreSQL\n- See the wiki for details";
        assert!(parse_guidance_file(text, RuleOrigin::Root).is_empty());
    }

    #[test]
    fn test_safety_heading_forces_constitution() {
        let text = "\
# Safety invariants

- [R010] Avoid destructive migrations in production

# Style

- [R011] Should prefer explicit names
";
        let rules = parse_guidance_file(text, RuleOrigin::Root);
        assert_eq!(rules.len(), 2);
        assert!(rules[0].is_constitution);
        assert!(!rules[1].is_constitution);
    }

    #[test]
    fn test_malformed_text_parses_to_empty() {
        assert!(parse_guidance_file("", RuleOrigin::Root).is_empty());
        assert!(parse_guidance_file("\x00\x01 not markdown at all", RuleOrigin::Root).is_empty());
    }

    #[test]
    fn test_duplicate_id_in_one_file_overrides() {
        let text = "- [R001] First version\n- [R001] Second version must hold";
        let rules = parse_guidance_file(text, RuleOrigin::Root);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].text, "Second version must hold");
    }
}
