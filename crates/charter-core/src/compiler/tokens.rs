//! Single-pass tokenizer for guidance bullet lines
//!
//! Each bullet is scanned once into a tagged token stream, which the parser
//! folds into a Rule record. Annotation grammar on a bullet line:
//! - leading `[R###]` bracketed token is the rule id
//! - a parenthesized risk word sets the risk class
//! - `@tag` tokens declare intents
//! - non-leading bracketed tokens name tool classes
//! - `verify:<name>` attaches a verifier

use crate::types::RiskClass;

/// One tagged token from a bullet line.
#[derive(Debug, Clone, PartialEq)]
pub enum BulletToken {
    RuleId(String),
    Risk(RiskClass),
    ToolClass(String),
    IntentTag(String),
    Verifier(String),
    Word(String),
}

/// Tokenize the content of a bullet line (the text after the `- ` marker).
///
/// Total: any input produces a token stream, never an error.
pub fn tokenize_bullet(content: &str) -> Vec<BulletToken> {
    let mut tokens = Vec::new();

    for (position, raw) in content.split_whitespace().enumerate() {
        let token = if let Some(inner) = delimited(raw, '[', ']') {
            if position == 0 {
                BulletToken::RuleId(inner.to_string())
            } else {
                BulletToken::ToolClass(inner.to_string())
            }
        } else if let Some(inner) = delimited(raw, '(', ')') {
            match RiskClass::parse(inner) {
                Some(risk) => BulletToken::Risk(risk),
                // Ordinary parenthesized prose stays part of the rule text.
                None => BulletToken::Word(raw.to_string()),
            }
        } else if let Some(tag) = raw.strip_prefix('@') {
            BulletToken::IntentTag(trim_trailing_punct(tag).to_string())
        } else if let Some(name) = raw.strip_prefix("verify:") {
            BulletToken::Verifier(trim_trailing_punct(name).to_string())
        } else {
            BulletToken::Word(raw.to_string())
        };
        tokens.push(token);
    }

    tokens
}

fn delimited<'a>(raw: &'a str, open: char, close: char) -> Option<&'a str> {
    raw.strip_prefix(open)?.strip_suffix(close)
}

fn trim_trailing_punct(raw: &str) -> &str {
    raw.trim_end_matches(|c| matches!(c, '.' | ',' | ';' | ':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_rule_line_tokenizes_fully() {
        let tokens =
            tokenize_bullet("[R001] Never commit hardcoded secrets (critical) @security verify:secrets-scan");

        assert_eq!(tokens[0], BulletToken::RuleId("R001".to_string()));
        assert!(tokens.contains(&BulletToken::Risk(RiskClass::Critical)));
        assert!(tokens.contains(&BulletToken::IntentTag("security".to_string())));
        assert!(tokens.contains(&BulletToken::Verifier("secrets-scan".to_string())));
    }

    #[test]
    fn test_non_leading_bracket_is_tool_class() {
        let tokens = tokenize_bullet("[R007] Use [git] and [bash] carefully");
        assert_eq!(tokens[0], BulletToken::RuleId("R007".to_string()));
        assert!(tokens.contains(&BulletToken::ToolClass("git".to_string())));
        assert!(tokens.contains(&BulletToken::ToolClass("bash".to_string())));
    }

    #[test]
    fn test_plain_parentheses_stay_words() {
        let tokens = tokenize_bullet("Prefer small commits (see workflow doc)");
        assert!(tokens
            .iter()
            .all(|t| !matches!(t, BulletToken::Risk(_))));
        assert!(tokens.contains(&BulletToken::Word("(see".to_string())));
    }

    #[test]
    fn test_trailing_punctuation_trimmed_from_tags() {
        let tokens = tokenize_bullet("Always validate inputs @security, verify:input-check.");
        assert!(tokens.contains(&BulletToken::IntentTag("security".to_string())));
        assert!(tokens.contains(&BulletToken::Verifier("input-check".to_string())));
    }
}
