//! Engine configuration
//!
//! Charter reads no files itself; a host hands in TOML text (or builds the
//! structs directly) and every section falls back to defaults when absent.

use crate::error::Result;
use crate::gates::GateConfig;
use crate::optimizer::OptimizerConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration for the governance engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharterConfig {
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub gates: GateConfig,
}

impl CharterConfig {
    /// Parse configuration from TOML text. Missing sections and fields
    /// take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = CharterConfig::from_toml_str("").unwrap();
        assert_eq!(config.optimizer.min_task_count, 5);
        assert_eq!(config.gates.diff_warn_threshold, 300);
        assert!(!config.gates.enforce_tool_allowlist);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config = CharterConfig::from_toml_str(
            r#"
[optimizer]
promotion_wins = 3

[gates]
diff_warn_threshold = 150
allowed_tools = ["bash", "mcp__*"]
"#,
        )
        .unwrap();

        assert_eq!(config.optimizer.promotion_wins, 3);
        assert_eq!(config.optimizer.min_task_count, 5);
        assert_eq!(config.gates.diff_warn_threshold, 150);
        assert_eq!(config.gates.allowed_tools.len(), 2);
        assert!(config.gates.scan_secrets);
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = CharterConfig::from_toml_str("[optimizer\nbroken").unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }
}
