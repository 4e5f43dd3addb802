//! Ledger entry and export types.
//!
//! `Entry` is a single record in the hash chain. `LedgerLog` is the sealed
//! snapshot produced by `Ledger::export_log()`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Opaque event payload: a JSON object.
///
/// Key order in memory is irrelevant; the canonical hash form sorts keys at
/// every nesting level.
pub type Payload = Map<String, Value>;

/// One immutable record in the audit ledger.
///
/// `sequence_id`, `timestamp`, `previous_hash` and `entry_hash` are assigned
/// by the ledger; callers only choose `event_type`, `payload` and `actor`.
/// Changing any field after append breaks either this entry's `entry_hash`
/// or the next entry's `previous_hash` link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Position in the chain, starting at 0, no gaps.
    pub sequence_id: u64,

    /// UTC capture time, truncated to microseconds.
    pub timestamp: DateTime<Utc>,

    /// Short tag from an open set, e.g. `"document_ingested"`.
    pub event_type: String,

    /// Event data. Semantically opaque to the ledger.
    pub payload: Payload,

    /// The user or system that produced the event, if known.
    pub actor: Option<String>,

    /// `entry_hash` of the previous entry, or `GENESIS_HASH` for entry 0.
    pub previous_hash: String,

    /// Lowercase hex SHA-256 of this entry's canonical form.
    pub entry_hash: String,
}

impl Entry {
    /// The `previous_hash` of the first entry in every ledger.
    ///
    /// 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed export of a whole ledger.
///
/// `terminal_hash` is the `entry_hash` of the last entry and commits to the
/// entire chain. It is empty when the ledger holds no entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerLog {
    /// Identifier of the `Ledger` instance that produced the export.
    pub ledger_id: Uuid,

    /// All entries in chain order.
    pub entries: Vec<Entry>,

    /// Wall-clock time (UTC) the export was taken.
    pub exported_at: DateTime<Utc>,

    pub terminal_hash: String,
}
