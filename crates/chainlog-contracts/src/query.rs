//! Entry selection criteria for `Ledger::query` and `Ledger::summarize`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// Optional filters combined with AND.
///
/// A `None` field matches every entry for that dimension. `start` and `end`
/// are both inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFilter {
    pub event_type: Option<String>,
    pub actor: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl EntryFilter {
    /// A filter that matches every entry.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Restrict to entries captured within `[start, end]`.
    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Return true if `entry` satisfies every set criterion.
    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(event_type) = &self.event_type {
            if entry.event_type != *event_type {
                return false;
            }
        }
        if let Some(actor) = &self.actor {
            if entry.actor.as_deref() != Some(actor.as_str()) {
                return false;
            }
        }
        if let Some(start) = self.start {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if entry.timestamp > end {
                return false;
            }
        }
        true
    }
}
