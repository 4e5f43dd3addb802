//! JSON Schema payload validator.
//!
//! `SchemaValidator` implements the `PayloadValidator` trait from
//! `chainlog-core`. It holds at most one compiled JSON Schema per event type:
//!
//! - event types without a schema are accepted unchanged
//! - every schema violation in a payload is collected, so the caller sees
//!   the full failure set in one `Validation` error
//!
//! Schemas are compiled once at registration. A document that does not
//! compile is a configuration error and is rejected there, not at append.

use std::collections::BTreeMap;

use jsonschema::Validator;
use serde_json::Value;
use tracing::{debug, warn};

use chainlog_contracts::{
    entry::Payload,
    error::{LedgerError, LedgerResult},
};
use chainlog_core::traits::PayloadValidator;

/// Validates payloads against JSON Schemas keyed by event type.
#[derive(Default)]
pub struct SchemaValidator {
    schemas: BTreeMap<String, Validator>,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("event_types", &self.schemas.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaValidator {
    /// Create a validator with no schemas; it accepts every payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every `(event_type, schema)` pair.
    pub fn from_schemas<'a, I>(schemas: I) -> LedgerResult<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut validator = Self::new();
        for (event_type, schema) in schemas {
            validator.register(event_type.clone(), schema)?;
        }
        Ok(validator)
    }

    /// Compile `schema` and use it for `event_type`.
    ///
    /// Registering the same event type twice replaces the earlier schema.
    /// Returns `LedgerError::Config` if the document is not a valid schema.
    pub fn register(&mut self, event_type: impl Into<String>, schema: &Value) -> LedgerResult<()> {
        let event_type = event_type.into();
        let compiled = jsonschema::validator_for(schema).map_err(|e| {
            LedgerError::config(format!("invalid JSON Schema for event type '{event_type}': {e}"))
        })?;

        debug!(event_type = %event_type, "payload schema registered");
        self.schemas.insert(event_type, compiled);
        Ok(())
    }

    /// Return true if a schema is registered for `event_type`.
    pub fn has_schema(&self, event_type: &str) -> bool {
        self.schemas.contains_key(event_type)
    }
}

impl PayloadValidator for SchemaValidator {
    fn validate(&self, event_type: &str, payload: &Payload) -> LedgerResult<()> {
        let Some(validator) = self.schemas.get(event_type) else {
            return Ok(());
        };

        let instance = Value::Object(payload.clone());
        let failures: Vec<String> = validator
            .iter_errors(&instance)
            .map(|error| format!("at '{}': {}", error.instance_path, error))
            .collect();

        if failures.is_empty() {
            return Ok(());
        }

        warn!(event_type = %event_type, failures = failures.len(), "payload rejected by schema");
        Err(LedgerError::validation(format!(
            "payload for '{event_type}' violates its schema: {}",
            failures.join("; ")
        )))
    }
}
