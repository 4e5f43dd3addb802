//! Subcommand handlers.
//!
//! Each handler takes an open `Ledger`, performs one operation, and returns
//! the JSON text to print plus the process exit code. Keeping output as a
//! return value lets the handlers be tested without a terminal.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use chainlog_contracts::query::EntryFilter;
use chainlog_core::Ledger;

/// Exit code for a successful command.
pub const EXIT_OK: i32 = 0;

/// Exit code when `verify` finds a broken chain.
pub const EXIT_BROKEN_CHAIN: i32 = 2;

/// Text to print and the process exit code for one command.
pub struct Outcome {
    pub output: String,
    pub exit_code: i32,
}

impl Outcome {
    fn ok<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            output: serde_json::to_string_pretty(value).context("failed to render output as JSON")?,
            exit_code: EXIT_OK,
        })
    }
}

pub fn append(ledger: &Ledger, event_type: &str, payload: &str, actor: Option<&str>) -> Result<Outcome> {
    let payload: Value = serde_json::from_str(payload).context("--payload must be valid JSON")?;
    let entry = ledger
        .append(event_type, &payload, actor)
        .with_context(|| format!("failed to append '{event_type}' event"))?;
    Outcome::ok(&entry)
}

pub fn verify(ledger: &Ledger) -> Result<Outcome> {
    let result = ledger.verify().context("failed to read ledger for verification")?;
    let mut outcome = Outcome::ok(&result)?;
    if !result.is_valid {
        outcome.exit_code = EXIT_BROKEN_CHAIN;
    }
    Ok(outcome)
}

pub fn query(ledger: &Ledger, filter: &EntryFilter) -> Result<Outcome> {
    let entries = ledger.query(filter).context("failed to query ledger")?;
    Outcome::ok(&entries)
}

pub fn summarize(ledger: &Ledger, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Outcome> {
    anyhow::ensure!(start <= end, "--start must not be after --end");
    let report = ledger.summarize(start, end).context("failed to summarize ledger")?;
    Outcome::ok(&report)
}

pub fn export(ledger: &Ledger) -> Result<Outcome> {
    let log = ledger.export_log().context("failed to export ledger")?;
    Outcome::ok(&log)
}
