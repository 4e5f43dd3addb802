//! Error types for the chainlog ledger.
//!
//! Every fallible ledger operation returns `LedgerResult<T>`. The variants
//! separate bad caller input from storage failure so the hosting layer can
//! map them to different responses. Chain-integrity findings are not errors;
//! they are reported inside [`crate::report::VerificationResult`].

use thiserror::Error;

/// The unified error type for the chainlog crates.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The caller supplied input that cannot be recorded (empty event type,
    /// payload that is not a JSON object, schema rejection).
    ///
    /// Raised before any state is touched.
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// The backing store failed to persist or read entries.
    ///
    /// On append, the ledger guarantees no partial entry was recorded and no
    /// sequence id was consumed.
    #[error("persistence error: {reason}")]
    Persistence { reason: String },

    /// A configuration value or schema document is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl LedgerError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }

    pub fn persistence(reason: impl Into<String>) -> Self {
        Self::Persistence { reason: reason.into() }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }
}

/// Convenience alias used throughout the chainlog crates.
pub type LedgerResult<T> = Result<T, LedgerError>;
