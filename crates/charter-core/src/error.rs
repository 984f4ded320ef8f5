//! Error types for Charter Core
//!
//! This module defines all error types used throughout the governance engine.
//! We use `thiserror` for ergonomic error definitions with automatic Display/Error implementations.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Charter operations
pub type Result<T> = std::result::Result<T, CharterError>;

/// Main error type for Charter operations
#[derive(Error, Debug)]
pub enum CharterError {
    /// Policy-related errors
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Ledger-related errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        source: Box<CharterError>,
    },
}

/// Errors related to the rule policy
#[derive(Error, Debug, Clone)]
pub enum PolicyError {
    #[error("Rule not found: {0}")]
    RuleNotFound(String),
}

/// Errors related to the run ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Event not found: {0}")]
    EventNotFound(Uuid),

    #[error("Malformed event record at line {line}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl CharterError {
    /// Add context to an error
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add lazy context to a Result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.context(f()))
    }
}
