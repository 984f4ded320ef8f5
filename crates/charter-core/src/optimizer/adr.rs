//! Architecture decision records
//!
//! Every evaluated change produces exactly one ADR. The log is append-only
//! and numbers entries strictly increasing from 1 across cycles.

use serde::Serialize;

/// Decision recorded for one evaluated change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdrDecision {
    Promote,
    Reject,
}

/// One architecture decision record.
#[derive(Debug, Clone, Serialize)]
pub struct Adr {
    pub number: u32,
    pub title: String,
    pub rationale: String,
    pub decision: AdrDecision,
    pub consequences: String,
}

/// Append-only ADR history.
#[derive(Debug, Clone, Default)]
pub struct AdrLog {
    entries: Vec<Adr>,
}

impl AdrLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, assigning the next number.
    pub fn record(
        &mut self,
        title: impl Into<String>,
        rationale: impl Into<String>,
        decision: AdrDecision,
        consequences: impl Into<String>,
    ) -> &Adr {
        let adr = Adr {
            number: self.entries.len() as u32 + 1,
            title: title.into(),
            rationale: rationale.into(),
            decision,
            consequences: consequences.into(),
        };
        self.entries.push(adr);
        self.entries.last().expect("entry just pushed")
    }

    pub fn entries(&self) -> &[Adr] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_increase_from_one() {
        let mut log = AdrLog::new();
        log.record("Modify R001", "rationale", AdrDecision::Promote, "hardened");
        log.record("Add R099", "rationale", AdrDecision::Reject, "deferred");

        let numbers: Vec<u32> = log.entries().iter().map(|a| a.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_record_returns_the_new_entry() {
        let mut log = AdrLog::new();
        let adr = log.record("Modify R001", "why", AdrDecision::Promote, "effect");
        assert_eq!(adr.number, 1);
        assert_eq!(adr.decision, AdrDecision::Promote);
    }
}
