//! TOML configuration for the `chainlog` binary.
//!
//! ```toml
//! [store]
//! backend = "jsonl"          # or "memory"
//! path = "audit.jsonl"
//!
//! [schemas.document_ingested]
//! type = "object"
//! required = ["document_id"]
//! ```
//!
//! Every section is optional. A missing config file means defaults: a
//! `jsonl` store at `audit.jsonl` and no payload schemas.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use chainlog_contracts::error::{LedgerError, LedgerResult};
use chainlog_core::Ledger;
use chainlog_schema::SchemaValidator;
use chainlog_store::{open_store, StoreConfig};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    #[serde(default)]
    pub store: StoreConfig,

    /// JSON Schema per event type, written as TOML tables.
    #[serde(default)]
    pub schemas: BTreeMap<String, Value>,
}

impl LedgerConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `LedgerError::Config` if the TOML is malformed or has fields
    /// this version does not know.
    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        toml::from_str(s).map_err(|e| LedgerError::config(format!("failed to parse config TOML: {e}")))
    }

    /// Read and parse the file at `path`.
    pub fn from_file(path: &Path) -> LedgerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::config(format!("failed to read config file '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Like `from_file`, but a file that does not exist yields the defaults.
    pub fn load(path: &Path) -> LedgerResult<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Open the configured store and build a ledger over it, installing a
    /// schema validator when any schemas are configured.
    pub fn open_ledger(&self) -> LedgerResult<Ledger> {
        let store = open_store(&self.store)?;
        if self.schemas.is_empty() {
            Ledger::new(store)
        } else {
            let validator = SchemaValidator::from_schemas(&self.schemas)?;
            Ledger::with_validator(store, Box::new(validator))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use chainlog_contracts::error::LedgerError;
    use chainlog_store::StoreBackend;

    use super::LedgerConfig;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LedgerConfig::from_toml_str("").unwrap();
        assert_eq!(config.store.backend, StoreBackend::Jsonl);
        assert_eq!(config.store.path, Some(PathBuf::from("audit.jsonl")));
        assert!(config.schemas.is_empty());
    }

    #[test]
    fn test_store_and_schemas_parsed() {
        let toml = r#"
            [store]
            backend = "memory"

            [schemas.document_ingested]
            type = "object"
            required = ["document_id"]
        "#;

        let config = LedgerConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(
            config.schemas["document_ingested"],
            json!({ "type": "object", "required": ["document_id"] })
        );
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let err = LedgerConfig::from_toml_str("[store]\nbackend = \"redis\"\n").unwrap_err();
        assert!(matches!(err, LedgerError::Config { .. }));
    }

    #[test]
    fn test_unknown_section_is_config_error() {
        let err = LedgerConfig::from_toml_str("[retention]\nyears = 7\n").unwrap_err();
        assert!(matches!(err, LedgerError::Config { .. }));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.schemas.is_empty());
    }

    #[test]
    fn test_open_ledger_installs_schema_validator() {
        let toml = r#"
            [store]
            backend = "memory"

            [schemas.document_ingested]
            required = ["document_id"]
        "#;

        let ledger = LedgerConfig::from_toml_str(toml).unwrap().open_ledger().unwrap();
        assert!(ledger.append("document_ingested", &json!({}), None).is_err());
        assert!(ledger.append("document_ingested", &json!({ "document_id": "d" }), None).is_ok());
    }

    #[test]
    fn test_open_ledger_rejects_bad_schema() {
        let toml = r#"
            [store]
            backend = "memory"

            [schemas.broken]
            type = 12
        "#;

        let err = LedgerConfig::from_toml_str(toml).unwrap().open_ledger().unwrap_err();
        assert!(matches!(err, LedgerError::Config { .. }));
    }
}
