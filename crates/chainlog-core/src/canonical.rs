//! Canonical serialization of an entry for hashing.
//!
//! The canonical form is a compact JSON document whose object keys are
//! sorted byte-wise at every nesting level:
//!
//! ```text
//! {"actor":<string|null>,"event_type":<string>,"payload":<object>,
//!  "previous_hash":<string>,"sequence_id":<integer>,"timestamp":<string>}
//! ```
//!
//! (shown wrapped; the real output has no whitespace at all).
//!
//! - strings are escaped exactly as `serde_json` escapes them
//! - integers are plain decimal, floats use `serde_json`'s shortest
//!   round-trip form
//! - `timestamp` is RFC 3339 with six fractional digits and a `Z` suffix
//! - `entry_hash` itself is never part of the document
//!
//! Key order never depends on how the payload map was built, nor on whether
//! `serde_json` was compiled with `preserve_order`. Changing anything here
//! invalidates every existing chain, so bump `CANONICAL_FORMAT_VERSION`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use chainlog_contracts::entry::Entry;

/// Version of the canonical layout produced by [`canonical_form`].
pub const CANONICAL_FORMAT_VERSION: u32 = 1;

/// Top-level document. Fields are declared in sorted order because serde
/// emits struct fields in declaration order.
#[derive(Serialize)]
struct CanonicalDocument<'a> {
    actor: Option<&'a str>,
    event_type: &'a str,
    payload: CanonicalMap<'a>,
    previous_hash: &'a str,
    sequence_id: u64,
    timestamp: String,
}

struct CanonicalMap<'a>(&'a Map<String, Value>);

struct CanonicalValue<'a>(&'a Value);

impl Serialize for CanonicalMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<(&String, &Value)> = self.0.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, &CanonicalValue(value))?;
        }
        map.end()
    }
}

impl Serialize for CanonicalValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => CanonicalMap(map).serialize(serializer),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&CanonicalValue(item))?;
                }
                seq.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

/// Format a timestamp the way the canonical form stores it.
pub fn canonical_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Produce the canonical UTF-8 bytes for `entry`, excluding `entry_hash`.
///
/// # Panics
///
/// Panics if the document cannot be serialized to JSON, which cannot happen:
/// every component is a string, integer, or `serde_json::Value`.
pub fn canonical_form(entry: &Entry) -> Vec<u8> {
    let document = CanonicalDocument {
        actor: entry.actor.as_deref(),
        event_type: &entry.event_type,
        payload: CanonicalMap(&entry.payload),
        previous_hash: &entry.previous_hash,
        sequence_id: entry.sequence_id,
        timestamp: canonical_timestamp(&entry.timestamp),
    };

    serde_json::to_vec(&document).expect("canonical document must always serialize to JSON")
}
