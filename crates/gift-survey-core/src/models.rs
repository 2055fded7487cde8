//! The persisted participant record.
//!
//! Both backends store the same logical shape:
//!
//! ```json
//! {
//!   "display_name": "Maíra Souza",
//!   "answers": { "1": 3, "10": 2 },
//!   "scores": { "A": 5, "B": 0 },
//!   "completed": false,
//!   "last_updated": "2026-03-01T12:00:00Z",
//!   "church_name": "Igreja Central"
//! }
//! ```
//!
//! Question ids are integer map keys, which `serde_json` writes as strings
//! and parses back into integers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::QUESTION_COUNT;
use crate::scoring::{ScoreState, ScoringEngine};

/// One participant's saved progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Free-form name as typed by the participant. Records written before
    /// key normalization may lack it; see [`ParticipantRecord::reconcile`].
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub answers: BTreeMap<u32, u8>,
    #[serde(default)]
    pub scores: ScoreState,
    #[serde(default)]
    pub completed: bool,
    /// Defaults to the Unix epoch when absent.
    #[serde(default, with = "iso8601")]
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub church_name: Option<String>,
    /// Legacy key this record superseded. Set while that key may still be
    /// present in the store, so a later save retries the delete instead of
    /// treating the leftover as a conflict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_from: Option<String>,
}

impl ParticipantRecord {
    /// Snapshot an engine's state.
    pub fn from_engine(
        display_name: &str,
        engine: &ScoringEngine,
        church_name: Option<&str>,
    ) -> Self {
        Self {
            display_name: display_name.to_string(),
            answers: engine.answers().clone(),
            scores: engine.scores(),
            completed: engine.is_complete(),
            last_updated: Utc::now(),
            church_name: church_name.map(str::to_string),
            migrated_from: None,
        }
    }

    /// Repair a record read back from storage: synthesize a missing display
    /// name from the key it was found under and re-derive `completed` from
    /// the answer count.
    pub fn reconcile(&mut self, key: &str) {
        if self.display_name.is_empty() {
            self.display_name = key.to_string();
        }
        self.completed = self.answers.len() == QUESTION_COUNT as usize;
    }

    /// Whether every answer in `other` is also recorded here with the same
    /// value. Timestamps and cached totals are ignored.
    pub fn extends(&self, other: &ParticipantRecord) -> bool {
        other
            .answers
            .iter()
            .all(|(q, v)| self.answers.get(q) == Some(v))
    }
}

/// RFC 3339 on write. On read, also accepts naive ISO-8601 timestamps
/// (no offset), taken as UTC.
mod iso8601 {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(serde::de::Error::custom)
    }
}
