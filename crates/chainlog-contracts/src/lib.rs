//! # chainlog-contracts
//!
//! Shared types for the chainlog hash-chained audit ledger.
//!
//! All crates in the workspace import from here. No ledger logic lives in
//! this crate, only data definitions, query criteria and error types.

pub mod entry;
pub mod error;
pub mod query;
pub mod report;

pub use entry::{Entry, LedgerLog, Payload};
pub use error::{LedgerError, LedgerResult};
pub use query::EntryFilter;
pub use report::{ComplianceReport, IntegrityViolation, VerificationResult, ViolationKind};

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn entry(event_type: &str, actor: Option<&str>, minute: u32) -> Entry {
        Entry {
            sequence_id: 0,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 31, 12, minute, 0).unwrap(),
            event_type: event_type.to_string(),
            payload: Payload::new(),
            actor: actor.map(str::to_string),
            previous_hash: Entry::GENESIS_HASH.to_string(),
            entry_hash: String::new(),
        }
    }

    // ── EntryFilter ──────────────────────────────────────────────────────────

    #[test]
    fn empty_filter_matches_everything() {
        let filter = EntryFilter::all();
        assert!(filter.matches(&entry("login", None, 0)));
        assert!(filter.matches(&entry("logout", Some("alice"), 59)));
    }

    #[test]
    fn filter_by_event_type_and_actor() {
        let filter = EntryFilter::all().event_type("query").actor("alice");

        assert!(filter.matches(&entry("query", Some("alice"), 1)));
        assert!(!filter.matches(&entry("query", Some("bob"), 1)));
        assert!(!filter.matches(&entry("query", None, 1)));
        assert!(!filter.matches(&entry("login", Some("alice"), 1)));
    }

    #[test]
    fn time_range_is_inclusive() {
        let e = entry("login", None, 30);
        let at = e.timestamp;

        assert!(EntryFilter::all().between(at, at).matches(&e));
        assert!(!EntryFilter::all()
            .between(at + Duration::seconds(1), at + Duration::minutes(5))
            .matches(&e));
        assert!(!EntryFilter::all()
            .between(at - Duration::minutes(5), at - Duration::seconds(1))
            .matches(&e));
    }

    // ── VerificationResult ───────────────────────────────────────────────────

    #[test]
    fn valid_result_has_no_broken_entries() {
        let result = VerificationResult::valid();
        assert!(result.is_valid);
        assert!(result.broken_entries.is_empty());
        assert!(result.violations.is_empty());
    }

    #[test]
    fn broken_entries_are_deduplicated() {
        let result = VerificationResult::from_violations(vec![
            IntegrityViolation { sequence_id: 1, kind: ViolationKind::LinkMismatch },
            IntegrityViolation { sequence_id: 1, kind: ViolationKind::HashMismatch },
            IntegrityViolation { sequence_id: 3, kind: ViolationKind::HashMismatch },
        ]);

        assert!(!result.is_valid);
        assert_eq!(result.broken_entries, vec![1, 3]);
        assert_eq!(result.violations.len(), 3);
    }

    #[test]
    fn violation_kind_serializes_snake_case() {
        let json = serde_json::to_value(ViolationKind::HashMismatch).unwrap();
        assert_eq!(json, json!("hash_mismatch"));
    }

    // ── Entry ────────────────────────────────────────────────────────────────

    #[test]
    fn genesis_hash_is_64_zeros() {
        assert_eq!(Entry::GENESIS_HASH.len(), 64);
        assert!(Entry::GENESIS_HASH.chars().all(|c| c == '0'));
    }

    #[test]
    fn entry_json_round_trip_preserves_timestamp() {
        let mut original = entry("document_ingested", Some("svc-ingest"), 7);
        original.timestamp += Duration::microseconds(123_456);
        original.payload.insert("doc".to_string(), json!({ "id": 42, "pages": [1, 2] }));

        let line = serde_json::to_string(&original).unwrap();
        let decoded: Entry = serde_json::from_str(&line).unwrap();
        assert_eq!(original, decoded);
    }

    // ── LedgerError display messages ─────────────────────────────────────────

    #[test]
    fn error_validation_display() {
        let msg = LedgerError::validation("event_type must not be empty").to_string();
        assert!(msg.contains("validation error"));
        assert!(msg.contains("event_type must not be empty"));
    }

    #[test]
    fn error_persistence_display() {
        let msg = LedgerError::persistence("disk full").to_string();
        assert!(msg.contains("persistence error"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn error_config_display() {
        let msg = LedgerError::config("unknown backend 'redis'").to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("redis"));
    }
}
