//! Core types for Charter
//!
//! This module defines the vocabulary shared across the engine:
//! - Risk classes and intents attached to rules
//! - Rule origin (root vs. local guidance file)
//! - Violation severity
//! - Timestamps
//! - Short content digests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type alias
pub type Timestamp = DateTime<Utc>;

/// Create a timestamp for the current moment
pub fn now() -> Timestamp {
    Utc::now()
}

/// Risk classification of a rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskClass {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl RiskClass {
    /// Parse an annotation word into a risk class
    pub fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "critical" => Some(RiskClass::Critical),
            "high" => Some(RiskClass::High),
            "medium" => Some(RiskClass::Medium),
            "low" => Some(RiskClass::Low),
            _ => None,
        }
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            RiskClass::Critical => "critical",
            RiskClass::High => "high",
            RiskClass::Medium => "medium",
            RiskClass::Low => "low",
        };
        write!(f, "{}", word)
    }
}

/// Intent category a rule or task belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Security,
    Performance,
    Testing,
    Architecture,
    #[default]
    General,
}

impl Intent {
    /// Parse an `@tag` annotation into an intent. Unknown tags fall back
    /// to `General` rather than being dropped.
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "security" => Intent::Security,
            "performance" | "perf" => Intent::Performance,
            "testing" | "tests" => Intent::Testing,
            "architecture" | "arch" => Intent::Architecture,
            _ => Intent::General,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Intent::Security => "security",
            Intent::Performance => "performance",
            Intent::Testing => "testing",
            Intent::Architecture => "architecture",
            Intent::General => "general",
        };
        write!(f, "{}", word)
    }
}

/// Which guidance file a rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOrigin {
    Root,
    Local,
}

/// Severity of a recorded violation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Short content digest: the first 16 hex characters of a blake3 hash.
///
/// Pure function of the input bytes. Used for the constitution hash and
/// for deterministic synthesized rule ids.
pub fn short_digest(input: &str) -> String {
    let hash = blake3::hash(input.as_bytes());
    hex::encode(&hash.as_bytes()[..8])
}
