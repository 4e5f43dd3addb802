//! Durable JSON-lines implementation of `EntryStore`.
//!
//! Each entry is one line of JSON (`serde_json` serialization of `Entry`).
//! The file is the source of truth; an in-memory mirror serves reads.
//!
//! Append protocol:
//!
//! 1. write the serialized line, then `sync_data`
//! 2. on any I/O error, truncate the file back to its previous length
//! 3. only then extend the mirror
//!
//! so a failed append never leaves a partial line behind or a mirror that
//! disagrees with disk. If the truncation itself fails, the store is
//! poisoned and refuses every later append rather than writing after the
//! fragment.
//!
//! The store holds an exclusive advisory lock on the file for its whole
//! lifetime, taken before the existing lines are read. A second store on the
//! same path, in this process or another, fails to open instead of forking
//! the chain from a stale head.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, error, info};

use chainlog_contracts::{
    entry::Entry,
    error::{LedgerError, LedgerResult},
};
use chainlog_core::traits::EntryStore;

/// An append-only entry store backed by a JSON-lines file.
#[derive(Debug)]
pub struct JsonlFileStore {
    path: PathBuf,
    file: File,
    entries: Vec<Entry>,
    /// File length after the last successful append.
    committed_len: u64,
    /// Set when a partial line could not be truncated away.
    poisoned: bool,
}

impl JsonlFileStore {
    /// Open `path`, creating it (and its parent directories) if needed, and
    /// load every entry already in it.
    ///
    /// Blank lines are skipped. A line that does not parse as an `Entry` is
    /// a `Persistence` error naming the 1-based line number; the store does
    /// not try to repair the file.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LedgerError::persistence(format!("failed to create directory '{}': {e}", parent.display()))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| LedgerError::persistence(format!("failed to open '{}': {e}", path.display())))?;

        file.try_lock_exclusive().map_err(|e| {
            LedgerError::persistence(format!(
                "ledger file '{}' is in use by another store: {e}",
                path.display()
            ))
        })?;

        let mut entries = Vec::new();
        let reader = BufReader::new(&file);
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                LedgerError::persistence(format!("failed to read line {} of '{}': {e}", line_num + 1, path.display()))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: Entry = serde_json::from_str(&line).map_err(|e| {
                LedgerError::persistence(format!(
                    "failed to parse entry at line {} of '{}': {e}",
                    line_num + 1,
                    path.display()
                ))
            })?;
            entries.push(entry);
        }

        let committed_len = file
            .metadata()
            .map_err(|e| LedgerError::persistence(format!("failed to stat '{}': {e}", path.display())))?
            .len();

        info!(path = %path.display(), entries = entries.len(), "jsonl store opened");

        Ok(Self {
            path,
            file,
            entries,
            committed_len,
            poisoned: false,
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Undo a partially written line, poisoning the store if that fails.
    fn rollback(&mut self) {
        if let Err(e) = self.file.set_len(self.committed_len) {
            self.poisoned = true;
            error!(
                path = %self.path.display(),
                committed_len = self.committed_len,
                error = %e,
                "failed to truncate partial audit line; store poisoned"
            );
        }
    }
}

impl EntryStore for JsonlFileStore {
    fn append(&mut self, entry: &Entry) -> LedgerResult<()> {
        if self.poisoned {
            return Err(LedgerError::persistence(format!(
                "'{}' may end in a partial line after a failed rollback; refusing further appends",
                self.path.display()
            )));
        }

        let mut line = serde_json::to_string(entry).map_err(|e| {
            LedgerError::persistence(format!("failed to serialize entry {}: {e}", entry.sequence_id))
        })?;
        line.push('\n');

        let written = self
            .file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.sync_data());

        if let Err(e) = written {
            self.rollback();
            return Err(LedgerError::persistence(format!(
                "failed to write entry {} to '{}': {e}",
                entry.sequence_id,
                self.path.display()
            )));
        }

        self.committed_len += line.len() as u64;
        self.entries.push(entry.clone());

        debug!(sequence_id = entry.sequence_id, path = %self.path.display(), "entry written");
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
