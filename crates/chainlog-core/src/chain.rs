//! Hash-chain primitives: entry hashing and full-chain verification.
//!
//! `hash_entry` is SHA-256 over the canonical form (see
//! [`crate::canonical`]), hex-encoded in lowercase. `verify_chain` walks a
//! slice of entries and reports every entry that fails a check instead of
//! stopping at the first one.

use sha2::{Digest, Sha256};

use chainlog_contracts::{
    entry::Entry,
    report::{IntegrityViolation, VerificationResult, ViolationKind},
};

use crate::canonical::canonical_form;

/// Compute the SHA-256 hash of `entry`'s canonical form.
///
/// `entry.entry_hash` is ignored, so the same function serves both the
/// appender (which fills `entry_hash` from the result) and the verifier
/// (which compares the result to the stored value).
///
/// Returns a lowercase 64-character hex string.
pub fn hash_entry(entry: &Entry) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_form(entry));
    hex::encode(hasher.finalize())
}

/// Verify the integrity of a hash chain.
///
/// Each entry at position `i` is checked against three rules:
///
/// 1. **Sequence**: the stored `sequence_id` equals `i`.
/// 2. **Link**: `previous_hash` equals the *stored* `entry_hash` of entry
///    `i - 1`, or `Entry::GENESIS_HASH` for `i == 0`.
/// 3. **Hash**: `entry_hash` matches the value recomputed from the entry's
///    own fields.
///
/// Because links are compared against stored hashes, editing one entry's
/// content flags only that entry (rule 3). Editing an entry and re-deriving
/// its hash flags the next entry instead (rule 2). Findings are keyed by
/// position, so a rewritten `sequence_id` still reports the right entry.
///
/// An empty chain is valid.
pub fn verify_chain(entries: &[Entry]) -> VerificationResult {
    let mut violations = Vec::new();
    let mut expected_prev: &str = Entry::GENESIS_HASH;

    for (position, entry) in entries.iter().enumerate() {
        let position = position as u64;

        if entry.sequence_id != position {
            violations.push(IntegrityViolation {
                sequence_id: position,
                kind: ViolationKind::SequenceMismatch,
            });
        }

        if entry.previous_hash != expected_prev {
            violations.push(IntegrityViolation {
                sequence_id: position,
                kind: ViolationKind::LinkMismatch,
            });
        }

        if entry.entry_hash != hash_entry(entry) {
            violations.push(IntegrityViolation {
                sequence_id: position,
                kind: ViolationKind::HashMismatch,
            });
        }

        expected_prev = entry.entry_hash.as_str();
    }

    VerificationResult::from_violations(violations)
}
