//! The append-only, hash-chained audit ledger.
//!
//! `Ledger` owns an `EntryStore` and the chain head (next sequence id and
//! last entry hash). Both sit behind a single `RwLock`:
//!
//!   append  → write lock: validate → assign id → hash → store → advance head
//!   reads   → read lock:  verify / query / summarize / export
//!
//! Readers therefore observe the ledger either before or after an append,
//! never in between. The head only advances after the store accepts the
//! entry, so a failed write leaves no gap in the sequence.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use chainlog_contracts::{
    entry::{Entry, LedgerLog, Payload},
    error::{LedgerError, LedgerResult},
    query::EntryFilter,
    report::{ComplianceReport, VerificationResult},
};

use crate::{
    chain::{hash_entry, verify_chain},
    finite::check_finite,
    traits::{EntryStore, PayloadValidator},
};

// ── Internal mutable state ────────────────────────────────────────────────────

struct LedgerState {
    store: Box<dyn EntryStore>,

    /// The sequence id the next append will receive.
    next_sequence: u64,

    /// `entry_hash` of the last stored entry, or `GENESIS_HASH` when empty.
    last_hash: String,
}

// ── Public ledger ─────────────────────────────────────────────────────────────

/// An append-only audit ledger backed by a SHA-256 hash chain.
///
/// # Thread safety
///
/// `Ledger` is `Send + Sync`; share it with `Arc<Ledger>`. Concurrent
/// `append` calls are serialized, so every entry gets a distinct sequence id
/// and links to the entry that was actually stored before it.
pub struct Ledger {
    ledger_id: Uuid,
    validator: Option<Box<dyn PayloadValidator>>,
    state: RwLock<LedgerState>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("ledger_id", &self.ledger_id)
            .field("has_validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Open a ledger over `store`.
    ///
    /// Existing entries are kept as they are. The head is recovered from the
    /// last stored entry, even if the chain does not verify: new entries
    /// always chain from whatever is actually stored last.
    pub fn new(store: Box<dyn EntryStore>) -> LedgerResult<Self> {
        Self::build(store, None)
    }

    /// Open a ledger over `store` that runs `validator` on every payload.
    pub fn with_validator(
        store: Box<dyn EntryStore>,
        validator: Box<dyn PayloadValidator>,
    ) -> LedgerResult<Self> {
        Self::build(store, Some(validator))
    }

    fn build(
        store: Box<dyn EntryStore>,
        validator: Option<Box<dyn PayloadValidator>>,
    ) -> LedgerResult<Self> {
        let next_sequence = store.len();
        let last_hash = match next_sequence.checked_sub(1) {
            Some(last) => store
                .get(last)?
                .map(|e| e.entry_hash)
                .ok_or_else(|| {
                    LedgerError::persistence(format!("store reports {next_sequence} entries but entry {last} is missing"))
                })?,
            None => Entry::GENESIS_HASH.to_string(),
        };

        let ledger_id = Uuid::new_v4();
        info!(
            %ledger_id,
            recovered_entries = next_sequence,
            head_hash = %last_hash,
            "ledger opened"
        );

        Ok(Self {
            ledger_id,
            validator,
            state: RwLock::new(LedgerState {
                store,
                next_sequence,
                last_hash,
            }),
        })
    }

    /// Identifier of this ledger instance, stamped on exports.
    pub fn ledger_id(&self) -> Uuid {
        self.ledger_id
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Append one event and return the stored entry.
    ///
    /// `payload` may be any `Serialize` value that serializes to a JSON
    /// object (an empty object is fine). The ledger assigns `sequence_id`,
    /// `timestamp`, `previous_hash` and `entry_hash`.
    ///
    /// # Errors
    ///
    /// - `Validation`: empty `event_type`, payload not serializable (this
    ///   includes NaN and infinite floats) or not an object, or rejected by
    ///   the installed `PayloadValidator`. Nothing is recorded.
    /// - `Persistence`: the store failed. Nothing is recorded and the
    ///   sequence id is not consumed.
    pub fn append<P>(&self, event_type: &str, payload: &P, actor: Option<&str>) -> LedgerResult<Entry>
    where
        P: Serialize + ?Sized,
    {
        if event_type.trim().is_empty() {
            return Err(LedgerError::validation("event_type must not be empty"));
        }

        let payload = to_payload(payload)?;

        if let Some(validator) = &self.validator {
            validator.validate(event_type, &payload)?;
        }

        let mut state = self.write_state()?;

        let mut entry = Entry {
            sequence_id: state.next_sequence,
            timestamp: Utc::now().trunc_subsecs(6),
            event_type: event_type.to_string(),
            payload,
            actor: actor.map(str::to_string),
            previous_hash: state.last_hash.clone(),
            entry_hash: String::new(),
        };
        entry.entry_hash = hash_entry(&entry);

        if let Err(e) = state.store.append(&entry) {
            error!(
                sequence_id = entry.sequence_id,
                event_type = %entry.event_type,
                error = %e,
                "failed to persist audit entry"
            );
            return Err(e);
        }

        state.next_sequence += 1;
        state.last_hash = entry.entry_hash.clone();

        debug!(
            sequence_id = entry.sequence_id,
            event_type = %entry.event_type,
            entry_hash = %entry.entry_hash,
            "audit entry appended"
        );

        Ok(entry)
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// Walk the whole chain and report every entry that fails a check.
    ///
    /// A broken chain is a finding, returned as `Ok` with
    /// `is_valid == false`. `Err` is reserved for failing to read the store.
    pub fn verify(&self) -> LedgerResult<VerificationResult> {
        let state = self.read_state()?;
        let entries = state.store.entries()?;
        let result = verify_chain(&entries);
        report_verification(&result, entries.len());
        Ok(result)
    }

    /// Entries matching `filter`, in sequence order.
    pub fn query(&self, filter: &EntryFilter) -> LedgerResult<Vec<Entry>> {
        let state = self.read_state()?;
        let entries = state.store.entries()?;
        Ok(entries.into_iter().filter(|e| filter.matches(e)).collect())
    }

    /// Summarize entries captured within `[start, end]`.
    ///
    /// Counts cover only the window. The embedded verification result covers
    /// the whole ledger, taken from the same snapshot as the counts.
    pub fn summarize(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> LedgerResult<ComplianceReport> {
        let state = self.read_state()?;
        let entries = state.store.entries()?;

        let window = EntryFilter::all().between(start, end);
        let mut total_entries = 0u64;
        let mut by_event_type: BTreeMap<String, u64> = BTreeMap::new();
        let mut actors: BTreeSet<&str> = BTreeSet::new();

        for entry in entries.iter().filter(|e| window.matches(e)) {
            total_entries += 1;
            *by_event_type.entry(entry.event_type.clone()).or_insert(0) += 1;
            if let Some(actor) = entry.actor.as_deref() {
                actors.insert(actor);
            }
        }

        let verification = verify_chain(&entries);
        report_verification(&verification, entries.len());

        Ok(ComplianceReport {
            window_start: start,
            window_end: end,
            total_entries,
            by_event_type,
            distinct_actors: actors.len() as u64,
            verification,
            generated_at: Utc::now(),
        })
    }

    /// The entry with the given sequence id, if it exists.
    pub fn get(&self, sequence_id: u64) -> LedgerResult<Option<Entry>> {
        let state = self.read_state()?;
        state.store.get(sequence_id)
    }

    /// Number of entries recorded.
    pub fn len(&self) -> LedgerResult<u64> {
        Ok(self.read_state()?.next_sequence)
    }

    /// `true` when nothing has been recorded yet.
    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }

    /// `entry_hash` of the last entry, or `None` for an empty ledger.
    pub fn terminal_hash(&self) -> LedgerResult<Option<String>> {
        let state = self.read_state()?;
        Ok((state.next_sequence > 0).then(|| state.last_hash.clone()))
    }

    /// Export a sealed `LedgerLog` containing every entry recorded so far.
    pub fn export_log(&self) -> LedgerResult<LedgerLog> {
        let state = self.read_state()?;
        let entries = state.store.entries()?;
        let terminal_hash = entries
            .last()
            .map(|e| e.entry_hash.clone())
            .unwrap_or_default();

        info!(
            ledger_id = %self.ledger_id,
            entry_count = entries.len(),
            terminal_hash = %terminal_hash,
            "ledger exported"
        );

        Ok(LedgerLog {
            ledger_id: self.ledger_id,
            entries,
            exported_at: Utc::now(),
            terminal_hash,
        })
    }

    // ── Lock helpers ──────────────────────────────────────────────────────────

    fn read_state(&self) -> LedgerResult<RwLockReadGuard<'_, LedgerState>> {
        self.state
            .read()
            .map_err(|e| LedgerError::persistence(format!("ledger lock poisoned: {e}")))
    }

    fn write_state(&self) -> LedgerResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state
            .write()
            .map_err(|e| LedgerError::persistence(format!("ledger lock poisoned: {e}")))
    }
}

/// Serialize `payload` and require a JSON object with only finite floats.
fn to_payload<P: Serialize + ?Sized>(payload: &P) -> LedgerResult<Payload> {
    check_finite(payload)
        .map_err(|e| LedgerError::validation(format!("payload is not JSON-serializable: {e}")))?;

    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(LedgerError::validation(format!(
            "payload must be a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(LedgerError::validation(format!(
            "payload is not JSON-serializable: {e}"
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn report_verification(result: &VerificationResult, entry_count: usize) {
    if result.is_valid {
        debug!(entry_count, "audit chain verified");
    } else {
        warn!(
            entry_count,
            broken_entries = ?result.broken_entries,
            "audit chain integrity violation detected"
        );
    }
}
