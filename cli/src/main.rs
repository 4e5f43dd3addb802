//! chainlog — operator CLI for the hash-chained audit ledger.
//!
//! Opens the ledger described by the config file (default `chainlog.toml`;
//! a missing file means a `jsonl` store at `audit.jsonl`), runs one command,
//! and prints the result as JSON.
//!
//! Usage:
//!   chainlog append --event-type document_ingested --payload '{"doc":"10-K"}' --actor svc-ingest
//!   chainlog verify
//!   chainlog query --event-type query_executed --start 2026-01-01T00:00:00Z
//!   chainlog summarize --start 2026-01-01T00:00:00Z --end 2026-03-31T23:59:59Z
//!   chainlog export

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chainlog_contracts::query::EntryFilter;

use crate::commands::Outcome;
use crate::config::LedgerConfig;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Tamper-evident audit ledger.
#[derive(Parser)]
#[command(
    name = "chainlog",
    about = "Append to, verify, and report on a hash-chained audit ledger",
    long_about = "Every entry's SHA-256 hash covers the previous entry's hash, so any\n\
                  retroactive edit to a stored entry is reported by `verify`."
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "chainlog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record one event.
    Append {
        #[arg(long)]
        event_type: String,
        /// Event payload as a JSON object.
        #[arg(long, default_value = "{}")]
        payload: String,
        #[arg(long)]
        actor: Option<String>,
    },
    /// Check the whole chain; exits with status 2 if it is broken.
    Verify,
    /// List entries matching all given filters.
    Query {
        #[arg(long)]
        event_type: Option<String>,
        #[arg(long)]
        actor: Option<String>,
        /// Inclusive lower bound (RFC 3339).
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Inclusive upper bound (RFC 3339).
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },
    /// Compliance summary over an inclusive time window.
    Summarize {
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        end: DateTime<Utc>,
    },
    /// Dump the full ledger with its terminal hash.
    Export,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(outcome) => {
            println!("{}", outcome.output);
            std::process::exit(outcome.exit_code);
        }
        Err(e) => {
            eprintln!("chainlog error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = LedgerConfig::load(&cli.config)
        .with_context(|| format!("failed to load config '{}'", cli.config.display()))?;
    let ledger = config.open_ledger().context("failed to open ledger")?;

    match cli.command {
        Command::Append {
            event_type,
            payload,
            actor,
        } => commands::append(&ledger, &event_type, &payload, actor.as_deref()),
        Command::Verify => commands::verify(&ledger),
        Command::Query {
            event_type,
            actor,
            start,
            end,
        } => {
            let filter = EntryFilter {
                event_type,
                actor,
                start,
                end,
            };
            commands::query(&ledger, &filter)
        }
        Command::Summarize { start, end } => commands::summarize(&ledger, start, end),
        Command::Export => commands::export(&ledger),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{run, Cli, Command};

    #[test]
    fn test_parse_append() {
        let cli = Cli::try_parse_from([
            "chainlog",
            "append",
            "--event-type",
            "document_ingested",
            "--payload",
            r#"{"doc":"10-K"}"#,
        ])
        .unwrap();

        match cli.command {
            Command::Append { event_type, payload, actor } => {
                assert_eq!(event_type, "document_ingested");
                assert_eq!(payload, r#"{"doc":"10-K"}"#);
                assert!(actor.is_none());
            }
            _ => panic!("expected append"),
        }
        assert_eq!(cli.config.to_str(), Some("chainlog.toml"));
    }

    #[test]
    fn test_parse_rejects_bad_timestamp() {
        let parsed = Cli::try_parse_from(["chainlog", "summarize", "--start", "yesterday", "--end", "2026-01-01T00:00:00Z"]);
        assert!(parsed.is_err());
    }

    /// Two runs against the same config share the file-backed ledger.
    #[test]
    fn test_run_against_jsonl_config() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("audit.jsonl");
        let config_path = dir.path().join("chainlog.toml");
        std::fs::write(
            &config_path,
            format!("[store]\nbackend = \"jsonl\"\npath = {:?}\n", ledger_path.display().to_string()),
        )
        .unwrap();
        let config_arg = config_path.to_str().unwrap();

        for user in ["a", "b"] {
            let cli = Cli::try_parse_from([
                "chainlog", "--config", config_arg, "append", "--event-type", "login", "--actor", user,
            ])
            .unwrap();
            assert_eq!(run(cli).unwrap().exit_code, 0);
        }

        let cli = Cli::try_parse_from(["chainlog", "--config", config_arg, "verify"]).unwrap();
        let outcome = run(cli).unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.output.contains("\"is_valid\": true"));

        // Rewrite the second line's actor on disk.
        let contents = std::fs::read_to_string(&ledger_path).unwrap();
        std::fs::write(&ledger_path, contents.replace("\"actor\":\"b\"", "\"actor\":\"c\"")).unwrap();

        let cli = Cli::try_parse_from(["chainlog", "--config", config_arg, "verify"]).unwrap();
        assert_eq!(run(cli).unwrap().exit_code, 2);
    }
}
