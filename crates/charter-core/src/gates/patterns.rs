//! Pattern tables for the enforcement gates
//!
//! Compiled once; each entry pairs a human-readable signature name with
//! its regex. Secret patterns capture the secret value in group 1 so the
//! gate can redact it without ever echoing the literal.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// High-risk command signatures that require confirmation.
    pub(crate) static ref DESTRUCTIVE_PATTERNS: Vec<(&'static str, Regex)> = vec![
        (
            "recursive delete",
            Regex::new(r"\brm\s+(-[a-zA-Z]+\s+)*-[a-zA-Z]*r[a-zA-Z]*\b").unwrap(),
        ),
        (
            "force push",
            Regex::new(r"\bgit\s+push\b.*\s(--force|-f)\b").unwrap(),
        ),
        (
            "hard reset",
            Regex::new(r"\bgit\s+reset\s+--hard\b").unwrap(),
        ),
        (
            "destructive sql",
            Regex::new(r"(?i)\b(drop\s+(table|database|schema)|truncate\s+table)\b").unwrap(),
        ),
        (
            "unfiltered sql delete",
            Regex::new(r"(?i)\bdelete\s+from\s+[`\w.]+\s*;?\s*$").unwrap(),
        ),
        (
            "namespace delete",
            Regex::new(r"(?i)\bkubectl\s+delete\s+(ns|namespace|cluster)\b").unwrap(),
        ),
        (
            "infrastructure teardown",
            Regex::new(r"(?i)\bterraform\s+destroy\b").unwrap(),
        ),
    ];

    /// Secret-shaped substrings. Group 1 captures the sensitive value.
    pub(crate) static ref SECRET_PATTERNS: Vec<(&'static str, Regex)> = vec![
        (
            "assigned credential",
            Regex::new(
                r#"(?i)\b(?:api[_-]?key|secret[_-]?key|secret|token|password|passwd)\s*[:=]\s*["']([^"']{6,})["']"#,
            )
            .unwrap(),
        ),
        ("api key prefix", Regex::new(r"\b(sk-[A-Za-z0-9_-]{16,})\b").unwrap()),
        ("aws access key", Regex::new(r"\b(AKIA[0-9A-Z]{16})\b").unwrap()),
        ("github token", Regex::new(r"\b(ghp_[A-Za-z0-9]{36,})\b").unwrap()),
        ("slack token", Regex::new(r"\b(xox[baprs]-[A-Za-z0-9-]{10,})\b").unwrap()),
        (
            "private key block",
            Regex::new(r"(-----BEGIN [A-Z ]*PRIVATE KEY-----)").unwrap(),
        ),
    ];

    /// Environment-variable references are not leaked secrets.
    pub(crate) static ref ENV_REFERENCE: Regex = Regex::new(
        r"\$\{?[A-Za-z_][A-Za-z0-9_]*\}?|\bprocess\.env\.[A-Za-z_]|\bos\.environ\b",
    )
    .unwrap();
}

/// Mask a secret for reporting: the first four characters survive, the
/// rest is elided. The literal never appears in a gate result.
pub(crate) fn mask_secret(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{}****", visible)
}
