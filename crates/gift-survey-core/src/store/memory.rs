//! In-memory [`Store`] implementation for tests and embedding.
//!
//! A `BTreeMap` behind `std::sync::RwLock`, so `list()` comes back sorted
//! by key like the file backend.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::models::ParticipantRecord;

use super::{Store, StoreError};

/// In-memory participant store.
pub struct InMemoryStore {
    records: RwLock<BTreeMap<String, ParticipantRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store pre-populated with `records`.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, ParticipantRecord)>,
    {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<ParticipantRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, record: &ParticipantRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.remove(key);
        Ok(())
    }

    fn list(&self) -> Result<Vec<(String, ParticipantRecord)>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .map(|(k, r)| (k.clone(), r.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringEngine;

    fn record(name: &str) -> ParticipantRecord {
        ParticipantRecord::from_engine(name, &ScoringEngine::standard(), None)
    }

    #[test]
    fn test_set_get_delete() {
        let store = InMemoryStore::new();
        assert!(store.get("ana").unwrap().is_none());
        store.set("ana", &record("Ana")).unwrap();
        assert_eq!(store.get("ana").unwrap().unwrap().display_name, "Ana");
        store.delete("ana").unwrap();
        assert!(store.get("ana").unwrap().is_none());
        // Deleting again is fine.
        store.delete("ana").unwrap();
    }

    #[test]
    fn test_list_sorted_by_key() {
        let store = InMemoryStore::with_records(vec![
            ("zeca".to_string(), record("Zeca")),
            ("ana".to_string(), record("Ana")),
        ]);
        let keys: Vec<String> = store.list().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ana", "zeca"]);
        assert_eq!(store.len(), 2);
    }
}
