//! In-memory implementation of `EntryStore`.
//!
//! `InMemoryStore` keeps every entry in a `Vec`. It needs no locking of its
//! own: the `Ledger` serializes all access. Contents are lost when the
//! process exits, which makes it suitable for tests and short-lived hosts.

use chainlog_contracts::{entry::Entry, error::LedgerResult};
use chainlog_core::traits::EntryStore;

/// A volatile, append-only entry store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Vec<Entry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for InMemoryStore {
    /// Push `entry` onto the end of the vector. Cannot fail.
    fn append(&mut self, entry: &Entry) -> LedgerResult<()> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn entries(&self) -> LedgerResult<Vec<Entry>> {
        Ok(self.entries.clone())
    }

    fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    fn get(&self, sequence_id: u64) -> LedgerResult<Option<Entry>> {
        Ok(usize::try_from(sequence_id)
            .ok()
            .and_then(|idx| self.entries.get(idx))
            .cloned())
    }
}
