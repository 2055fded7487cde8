//! JSON file backend.
//!
//! All participants live in one pretty-printed JSON object keyed by storage
//! key. Writes load the whole object, change one entry and replace the file
//! through a sibling temp file and a rename, so a crash mid-write leaves the
//! previous file intact.
//!
//! Entries that do not decode as a [`ParticipantRecord`] are skipped on read
//! and written back untouched. A file that is not a JSON object at all reads
//! as an empty store and is replaced by the next write.

use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

use gift_survey_core::{ParticipantRecord, Store, StoreError};

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_raw(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => {
                warn!(path = %self.path.display(), "store file is not a JSON object, treating as empty");
                Ok(Map::new())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store file unreadable, treating as empty");
                Ok(Map::new())
            }
        }
    }

    fn write_raw(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(map)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn decode(key: &str, value: Value) -> Option<ParticipantRecord> {
        match serde_json::from_value::<ParticipantRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key, error = %e, "skipping undecodable record");
                None
            }
        }
    }
}

impl Store for JsonFileStore {
    fn name(&self) -> &str {
        "local"
    }

    fn get(&self, key: &str) -> Result<Option<ParticipantRecord>, StoreError> {
        let mut map = self.load_raw()?;
        Ok(map.remove(key).and_then(|v| Self::decode(key, v)))
    }

    fn set(&self, key: &str, record: &ParticipantRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.load_raw()?;
        map.insert(key.to_string(), serde_json::to_value(record)?);
        self.write_raw(&map)?;
        debug!(key, path = %self.path.display(), "record written");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.load_raw()?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_raw(&map)?;
        debug!(key, path = %self.path.display(), "record deleted");
        Ok(())
    }

    fn list(&self) -> Result<Vec<(String, ParticipantRecord)>, StoreError> {
        let map = self.load_raw()?;
        let mut records: Vec<(String, ParticipantRecord)> = map
            .into_iter()
            .filter_map(|(key, value)| {
                let record = Self::decode(&key, value)?;
                Some((key, record))
            })
            .collect();
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }
}
