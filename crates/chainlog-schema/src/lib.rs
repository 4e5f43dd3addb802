//! # chainlog-schema
//!
//! Optional payload validation for the chainlog ledger.
//!
//! [`engine::SchemaValidator`] implements
//! [`chainlog_core::traits::PayloadValidator`]: each event type may carry a
//! JSON Schema, and `Ledger::append` rejects payloads that do not conform
//! before any state changes.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use chainlog_schema::SchemaValidator;
//!
//! let mut validator = SchemaValidator::new();
//! validator.register("document_ingested", &json!({
//!     "type": "object",
//!     "required": ["document_id"],
//! }))?;
//! let ledger = Ledger::with_validator(store, Box::new(validator))?;
//! ```

pub mod engine;

pub use engine::SchemaValidator;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::{json, Value};

    use chainlog_contracts::{entry::Payload, error::LedgerError};
    use chainlog_core::traits::PayloadValidator;

    use crate::SchemaValidator;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn ingest_schema() -> Value {
        json!({
            "type": "object",
            "required": ["document_id", "pages"],
            "properties": {
                "document_id": { "type": "string", "minLength": 1 },
                "pages": { "type": "integer", "minimum": 1 }
            }
        })
    }

    fn validator() -> SchemaValidator {
        let mut v = SchemaValidator::new();
        v.register("document_ingested", &ingest_schema()).unwrap();
        v
    }

    #[test]
    fn test_conforming_payload_passes() {
        let result = validator().validate(
            "document_ingested",
            &payload(json!({ "document_id": "10-K-2025", "pages": 212 })),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_unregistered_event_type_passes() {
        let v = validator();
        assert!(!v.has_schema("query_executed"));
        assert!(v.validate("query_executed", &payload(json!({ "anything": [1, 2] }))).is_ok());
    }

    /// Every violation is reported, not just the first.
    #[test]
    fn test_all_failures_collected() {
        let err = validator()
            .validate("document_ingested", &payload(json!({ "document_id": "", "pages": 0 })))
            .unwrap_err();

        match err {
            LedgerError::Validation { reason } => {
                assert!(reason.contains("document_ingested"), "{reason}");
                assert!(reason.contains("/document_id"), "{reason}");
                assert!(reason.contains("/pages"), "{reason}");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_field() {
        let err = validator()
            .validate("document_ingested", &payload(json!({ "pages": 3 })))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
    }

    #[test]
    fn test_invalid_schema_is_config_error() {
        let mut v = SchemaValidator::new();
        let err = v
            .register("broken", &json!({ "type": "not-a-real-type" }))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Config { .. }));
        assert!(!v.has_schema("broken"));
    }

    #[test]
    fn test_from_schemas() {
        let mut schemas: BTreeMap<String, Value> = BTreeMap::new();
        schemas.insert("document_ingested".to_string(), ingest_schema());
        schemas.insert("review_submitted".to_string(), json!({ "required": ["reviewer"] }));

        let v = SchemaValidator::from_schemas(&schemas).unwrap();
        assert!(v.has_schema("document_ingested"));
        assert!(v.has_schema("review_submitted"));
        assert!(v.validate("review_submitted", &payload(json!({}))).is_err());
    }

    /// Installed on a ledger, a rejection leaves the chain untouched.
    #[test]
    fn test_ledger_rejects_before_append() {
        use chainlog_core::{traits::EntryStore, Ledger};
        use chainlog_contracts::{entry::Entry, error::LedgerResult};

        #[derive(Default)]
        struct VecStore(Vec<Entry>);

        impl EntryStore for VecStore {
            fn append(&mut self, entry: &Entry) -> LedgerResult<()> {
                self.0.push(entry.clone());
                Ok(())
            }
            fn entries(&self) -> LedgerResult<Vec<Entry>> {
                Ok(self.0.clone())
            }
            fn len(&self) -> u64 {
                self.0.len() as u64
            }
        }

        let ledger = Ledger::with_validator(Box::new(VecStore::default()), Box::new(validator())).unwrap();

        let err = ledger
            .append("document_ingested", &json!({ "document_id": "x" }), Some("svc"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
        assert_eq!(ledger.len().unwrap(), 0);

        let entry = ledger
            .append("document_ingested", &json!({ "document_id": "x", "pages": 2 }), Some("svc"))
            .unwrap();
        assert_eq!(entry.sequence_id, 0);
        assert!(ledger.verify().unwrap().is_valid);
    }
}
