//! Integrity and compliance report types.
//!
//! A broken chain is a finding, not an error: `verify()` always returns a
//! `VerificationResult` and the ledger keeps serving reads and appends.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The specific check an entry failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The stored `sequence_id` does not match the entry's position.
    SequenceMismatch,
    /// `previous_hash` differs from the prior entry's stored `entry_hash`
    /// (or from the genesis sentinel for entry 0).
    LinkMismatch,
    /// Recomputing `entry_hash` from the stored fields gives a different value.
    HashMismatch,
}

/// One integrity finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityViolation {
    /// The sequence id the offending entry was assigned at append, i.e. its
    /// position in the chain. Used instead of the stored value so a tampered
    /// `sequence_id` still points at the right entry.
    pub sequence_id: u64,
    pub kind: ViolationKind,
}

/// Outcome of a full-chain verification walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// True iff `broken_entries` is empty.
    pub is_valid: bool,

    /// Every entry that failed at least one check, in chain order, without
    /// duplicates.
    pub broken_entries: Vec<u64>,

    /// Each individual failed check, in the order found.
    pub violations: Vec<IntegrityViolation>,
}

impl VerificationResult {
    /// Build a result from the raw findings of a chain walk.
    pub fn from_violations(violations: Vec<IntegrityViolation>) -> Self {
        let mut broken_entries: Vec<u64> = Vec::new();
        for v in &violations {
            if broken_entries.last() != Some(&v.sequence_id) {
                broken_entries.push(v.sequence_id);
            }
        }
        Self {
            is_valid: broken_entries.is_empty(),
            broken_entries,
            violations,
        }
    }

    /// The result for a chain with no findings.
    pub fn valid() -> Self {
        Self::from_violations(Vec::new())
    }
}

/// Compliance summary over a time window.
///
/// Counts cover only the window; `verification` always covers the whole
/// ledger because integrity is a global property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,

    /// Entries whose timestamp falls within the inclusive window.
    pub total_entries: u64,

    /// Window entries grouped by `event_type`.
    pub by_event_type: BTreeMap<String, u64>,

    /// Distinct non-empty `actor` values in the window. Entries without an
    /// actor are not counted.
    pub distinct_actors: u64,

    pub verification: VerificationResult,

    pub generated_at: DateTime<Utc>,
}
