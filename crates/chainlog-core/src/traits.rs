//! The two seams of the ledger.
//!
//! - `EntryStore`       — where entries live (memory, file, database)
//! - `PayloadValidator` — optional gate on what may be recorded
//!
//! The `Ledger` owns one of each and serializes access to the store, so
//! implementations do not need their own locking.

use chainlog_contracts::{
    entry::{Entry, Payload},
    error::{LedgerError, LedgerResult},
};

/// Ordered, append-only storage for ledger entries.
///
/// The ledger is the only writer. It hands over fully formed entries with
/// `sequence_id`s in strict order and never asks for updates or deletes.
pub trait EntryStore: Send + Sync {
    /// Durably record `entry` after all previously appended entries.
    ///
    /// Must be all-or-nothing: on `Err`, the store contents are exactly what
    /// they were before the call. Failures are reported as
    /// `LedgerError::Persistence`.
    fn append(&mut self, entry: &Entry) -> LedgerResult<()>;

    /// Every stored entry, in append order.
    fn entries(&self) -> LedgerResult<Vec<Entry>>;

    /// Number of stored entries.
    fn len(&self) -> u64;

    /// Return true if nothing has been stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entry stored at position `sequence_id`, if any.
    ///
    /// The default walks `entries()`; backends with indexed access should
    /// override it.
    fn get(&self, sequence_id: u64) -> LedgerResult<Option<Entry>> {
        let index = usize::try_from(sequence_id)
            .map_err(|_| LedgerError::persistence(format!("sequence id {sequence_id} out of range")))?;
        Ok(self.entries()?.into_iter().nth(index))
    }
}

/// A check run on every payload before it is appended.
///
/// Returning `Err` (normally `LedgerError::Validation`) rejects the append
/// without touching ledger state.
pub trait PayloadValidator: Send + Sync {
    fn validate(&self, event_type: &str, payload: &Payload) -> LedgerResult<()>;
}
