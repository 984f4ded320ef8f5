//! Policy Bundle - the two-tier rule policy
//!
//! A compiled policy has two tiers: the constitution (protected, always
//! enforced) and the shards (candidate rules held individually until they
//! earn promotion). The bundle keeps an id index over both tiers so lookup
//! and promotion do not rescan the rule lists.

pub mod rule;

use crate::error::{PolicyError, Result};
use crate::types::{now, short_digest, RiskClass, RuleOrigin, Timestamp};
use serde::Serialize;
use std::collections::HashMap;

pub use rule::Rule;

/// The protected tier of rules, with a deterministic content hash.
#[derive(Debug, Clone, Serialize)]
pub struct Constitution {
    pub rules: Vec<Rule>,
    /// First 16 hex characters of a blake3 digest over the concatenated
    /// rule texts in insertion order. Identical input text always yields
    /// an identical hash.
    pub hash: String,
}

impl Constitution {
    pub fn new(rules: Vec<Rule>) -> Self {
        let hash = Self::digest_of(&rules);
        Self { rules, hash }
    }

    /// Compute the constitution hash for an ordered rule list.
    pub fn digest_of(rules: &[Rule]) -> String {
        let joined = rules
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        short_digest(&joined)
    }

    fn recompute_hash(&mut self) {
        self.hash = Self::digest_of(&self.rules);
    }
}

/// A single candidate rule held apart from the constitution pending promotion.
#[derive(Debug, Clone, Serialize)]
pub struct Shard {
    pub rule: Rule,
}

/// Flattened inspection entry in the bundle manifest.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub id: String,
    pub text: String,
    pub risk_class: RiskClass,
    pub is_constitution: bool,
    pub origin: RuleOrigin,
}

/// Inspection view over a compiled bundle.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyManifest {
    pub total_rules: usize,
    pub constitution_rules: usize,
    pub compiled_at: Timestamp,
    pub rules: Vec<RuleSummary>,
}

/// Which tier a rule currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTier {
    Constitution,
    Shard,
}

/// A compiled two-tier policy: constitution + shards + manifest.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyBundle {
    pub constitution: Constitution,
    pub shards: Vec<Shard>,
    pub manifest: PolicyManifest,
    #[serde(skip)]
    index: HashMap<String, RuleTier>,
}

impl PolicyBundle {
    /// Assemble a bundle from pre-classified tiers.
    pub fn new(constitution: Constitution, shards: Vec<Shard>) -> Self {
        let mut bundle = Self {
            constitution,
            shards,
            manifest: PolicyManifest {
                total_rules: 0,
                constitution_rules: 0,
                compiled_at: now(),
                rules: Vec::new(),
            },
            index: HashMap::new(),
        };
        bundle.rebuild();
        bundle
    }

    /// An empty bundle, as produced by compiling empty guidance text.
    pub fn empty() -> Self {
        Self::new(Constitution::new(Vec::new()), Vec::new())
    }

    /// Total number of rules across both tiers.
    pub fn rule_count(&self) -> usize {
        self.constitution.rules.len() + self.shards.len()
    }

    /// Which tier the rule currently lives in, if any.
    pub fn tier_of(&self, rule_id: &str) -> Option<RuleTier> {
        self.index.get(rule_id).copied()
    }

    pub fn contains_rule(&self, rule_id: &str) -> bool {
        self.index.contains_key(rule_id)
    }

    /// Look up a rule in either tier.
    pub fn find_rule(&self, rule_id: &str) -> Option<&Rule> {
        match self.index.get(rule_id)? {
            RuleTier::Constitution => self.constitution.rules.iter().find(|r| r.id == rule_id),
            RuleTier::Shard => self
                .shards
                .iter()
                .map(|s| &s.rule)
                .find(|r| r.id == rule_id),
        }
    }

    /// Look up a rule, erroring when absent.
    pub fn require_rule(&self, rule_id: &str) -> Result<&Rule> {
        self.find_rule(rule_id)
            .ok_or_else(|| PolicyError::RuleNotFound(rule_id.to_string()).into())
    }

    /// Replace the text of a shard rule. No-op when the id is not a shard.
    pub fn amend_shard_text(&mut self, rule_id: &str, text: impl Into<String>) -> bool {
        if self.tier_of(rule_id) != Some(RuleTier::Shard) {
            return false;
        }
        if let Some(shard) = self.shards.iter_mut().find(|s| s.rule.id == rule_id) {
            shard.rule.text = text.into();
            self.rebuild();
            return true;
        }
        false
    }

    /// Move a shard rule into the constitution. Returns whether anything
    /// moved; unknown or already-promoted ids are ignored, so reapplying
    /// a promotion leaves the bundle unchanged.
    pub fn promote(&mut self, rule_id: &str) -> bool {
        if self.tier_of(rule_id) != Some(RuleTier::Shard) {
            return false;
        }
        let position = match self.shards.iter().position(|s| s.rule.id == rule_id) {
            Some(position) => position,
            None => return false,
        };
        let mut rule = self.shards.remove(position).rule;
        rule.is_constitution = true;
        self.constitution.rules.push(rule);
        self.rebuild();
        true
    }

    /// Recompute the manifest, id index, and constitution hash after a
    /// structural change.
    fn rebuild(&mut self) {
        self.constitution.recompute_hash();

        self.index.clear();
        for rule in &self.constitution.rules {
            self.index.insert(rule.id.clone(), RuleTier::Constitution);
        }
        for shard in &self.shards {
            self.index.insert(shard.rule.id.clone(), RuleTier::Shard);
        }

        let summaries = self
            .constitution
            .rules
            .iter()
            .chain(self.shards.iter().map(|s| &s.rule))
            .map(|r| RuleSummary {
                id: r.id.clone(),
                text: r.text.clone(),
                risk_class: r.risk_class,
                is_constitution: r.is_constitution,
                origin: r.origin,
            })
            .collect();

        self.manifest = PolicyManifest {
            total_rules: self.rule_count(),
            constitution_rules: self.constitution.rules.len(),
            compiled_at: self.manifest.compiled_at,
            rules: summaries,
        };
    }
}
