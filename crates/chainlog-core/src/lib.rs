//! # chainlog-core
//!
//! Immutable, append-only, SHA-256 hash-chained audit ledger.
//!
//! ## Overview
//!
//! Every appended event becomes an `Entry` whose `entry_hash` covers its own
//! canonical form and the `entry_hash` of the previous entry. Changing any
//! stored entry, even by a single byte, is detected by `Ledger::verify`.
//!
//! This crate provides:
//! - `canonical` — the documented, versioned byte form that gets hashed
//! - `chain`     — `hash_entry` and `verify_chain` over plain slices
//! - `traits`    — the `EntryStore` and `PayloadValidator` seams
//! - `ledger`    — the `Ledger` that wires them together under one lock
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chainlog_core::Ledger;
//! use chainlog_store::InMemoryStore;
//!
//! let ledger = Arc::new(Ledger::new(Box::new(InMemoryStore::new()))?);
//! ledger.append("document_ingested", &json!({ "doc_id": "10-K-2025" }), Some("svc-ingest"))?;
//!
//! let result = ledger.verify()?;
//! assert!(result.is_valid);
//! ```

pub mod canonical;
pub mod chain;
pub mod finite;
pub mod ledger;
pub mod traits;

pub use canonical::{canonical_form, CANONICAL_FORMAT_VERSION};
pub use chain::{hash_entry, verify_chain};
pub use ledger::Ledger;
pub use traits::{EntryStore, PayloadValidator};

// ── Tests ─────────────────────────────────────────────────────────────────────
