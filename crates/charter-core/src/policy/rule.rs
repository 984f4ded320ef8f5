//! Rule model - the atomic unit of governance policy

use crate::types::{Intent, RiskClass, RuleOrigin};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single governance rule compiled from a guidance document.
///
/// Rules are identified by a stable string id, unique within a compiled
/// bundle. A rule from the local guidance file with the same id as a root
/// rule overrides the root rule's text and metadata while keeping the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub risk_class: RiskClass,
    /// Tool classes this rule constrains. Empty means it applies to all tools.
    #[serde(default)]
    pub tool_classes: BTreeSet<String>,
    #[serde(default)]
    pub intents: Vec<Intent>,
    #[serde(default)]
    pub verifier: Option<String>,
    #[serde(default)]
    pub is_constitution: bool,
    pub origin: RuleOrigin,
}

impl Rule {
    /// Create a rule with default metadata
    pub fn new(id: impl Into<String>, text: impl Into<String>, origin: RuleOrigin) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            risk_class: RiskClass::default(),
            tool_classes: BTreeSet::new(),
            intents: Vec::new(),
            verifier: None,
            is_constitution: false,
            origin,
        }
    }

    /// Replace this rule's text and metadata with another's, keeping the id.
    ///
    /// This is the override semantics applied when a local guidance file
    /// redefines a root rule.
    pub fn override_with(&mut self, other: Rule) {
        let id = std::mem::take(&mut self.id);
        *self = other;
        self.id = id;
    }

    /// Whether this rule constrains the given tool class.
    pub fn applies_to_tool(&self, tool_class: &str) -> bool {
        self.tool_classes.is_empty() || self.tool_classes.contains(tool_class)
    }
}
