//! # chainlog-store
//!
//! Storage backends for the chainlog ledger.
//!
//! - [`InMemoryStore`]  — a `Vec`, for tests and ephemeral hosts
//! - [`JsonlFileStore`] — one JSON entry per line, fsynced on every append
//!
//! Hosts normally pick a backend from configuration with [`open_store`].

pub mod jsonl;
pub mod memory;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use chainlog_contracts::error::{LedgerError, LedgerResult};
use chainlog_core::traits::EntryStore;

pub use jsonl::JsonlFileStore;
pub use memory::InMemoryStore;

/// Which backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    #[default]
    Jsonl,
}

/// The `[store]` section of the ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// File used by the `jsonl` backend. Ignored by `memory`.
    #[serde(default = "default_store_path")]
    pub path: Option<PathBuf>,
}

fn default_store_path() -> Option<PathBuf> {
    Some(PathBuf::from("audit.jsonl"))
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

/// Build the backend described by `config`.
///
/// Returns `LedgerError::Config` when the `jsonl` backend has no path, and
/// whatever `JsonlFileStore::open` returns if the file cannot be loaded.
pub fn open_store(config: &StoreConfig) -> LedgerResult<Box<dyn EntryStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Box::new(InMemoryStore::new())),
        StoreBackend::Jsonl => {
            let path = config
                .path
                .as_ref()
                .ok_or_else(|| LedgerError::config("store.path is required for the jsonl backend"))?;
            Ok(Box::new(JsonlFileStore::open(path)?))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
