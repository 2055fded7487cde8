//! Preferred-then-fallback composite store.
//!
//! Every operation runs against the preferred backend first. If that call
//! returns an error, the error is logged and the same operation is run once
//! against the fallback backend, whose result (success or error) goes back
//! to the caller. An operation never mixes the two backends: a `set` either
//! lands whole on the preferred backend or is retried whole on the fallback.
//!
//! Only errors trigger the fallback. A preferred backend that answers
//! "absent" for a `get` is trusted.

use tracing::{debug, warn};

use crate::models::ParticipantRecord;

use super::{Store, StoreError};

/// Two backends tried in order.
pub struct FallbackStore {
    preferred: Box<dyn Store>,
    fallback: Box<dyn Store>,
    name: String,
}

impl FallbackStore {
    pub fn new(preferred: Box<dyn Store>, fallback: Box<dyn Store>) -> Self {
        let name = format!("{}+{}", preferred.name(), fallback.name());
        Self {
            preferred,
            fallback,
            name,
        }
    }

    pub fn preferred(&self) -> &dyn Store {
        self.preferred.as_ref()
    }

    pub fn fallback(&self) -> &dyn Store {
        self.fallback.as_ref()
    }

    fn attempt<T, F>(&self, op: &str, key: Option<&str>, call: F) -> Result<T, StoreError>
    where
        F: Fn(&dyn Store) -> Result<T, StoreError>,
    {
        match call(self.preferred.as_ref()) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(
                    backend = self.preferred.name(),
                    fallback = self.fallback.name(),
                    op,
                    key = key.unwrap_or("-"),
                    error = %e,
                    "store operation failed, retrying on fallback backend"
                );
                let result = call(self.fallback.as_ref());
                if result.is_ok() {
                    debug!(backend = self.fallback.name(), op, "fallback succeeded");
                }
                result
            }
        }
    }
}

impl Store for FallbackStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Result<Option<ParticipantRecord>, StoreError> {
        self.attempt("get", Some(key), |s| s.get(key))
    }

    fn set(&self, key: &str, record: &ParticipantRecord) -> Result<(), StoreError> {
        self.attempt("set", Some(key), |s| s.set(key, record))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.attempt("delete", Some(key), |s| s.delete(key))
    }

    fn list(&self) -> Result<Vec<(String, ParticipantRecord)>, StoreError> {
        self.attempt("list", None, |s| s.list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringEngine;
    use crate::store::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Backend that fails every call and counts attempts.
    struct Offline {
        calls: Arc<AtomicUsize>,
    }

    impl Store for Offline {
        fn name(&self) -> &str {
            "offline"
        }
        fn get(&self, _key: &str) -> Result<Option<ParticipantRecord>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn set(&self, _key: &str, _record: &ParticipantRecord) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Unauthorized("token expired".into()))
        }
        fn delete(&self, _key: &str) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Unavailable("timeout".into()))
        }
        fn list(&self) -> Result<Vec<(String, ParticipantRecord)>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Malformed("not json".into()))
        }
    }

    fn offline() -> (Box<dyn Store>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Offline {
                calls: calls.clone(),
            }),
            calls,
        )
    }

    fn record(name: &str) -> ParticipantRecord {
        let mut engine = ScoringEngine::standard();
        engine.answer_question(1, 3).unwrap();
        ParticipantRecord::from_engine(name, &engine, None)
    }

    #[test]
    fn test_set_falls_back_when_preferred_fails() {
        let (remote, calls) = offline();
        let store = FallbackStore::new(remote, Box::new(InMemoryStore::new()));
        store.set("ana", &record("Ana")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.fallback().get("ana").unwrap().unwrap().display_name, "Ana");
        assert_eq!(store.get("ana").unwrap().unwrap().display_name, "Ana");
        assert_eq!(store.list().unwrap().len(), 1);
        store.delete("ana").unwrap();
        assert!(store.fallback().get("ana").unwrap().is_none());
        assert_eq!(store.name(), "offline+memory");
    }

    #[test]
    fn test_preferred_success_skips_fallback() {
        let preferred = InMemoryStore::new();
        preferred.set("ana", &record("Ana")).unwrap();
        let (local, calls) = offline();
        let store = FallbackStore::new(Box::new(preferred), local);
        assert!(store.get("ana").unwrap().is_some());
        store.set("bia", &record("Bia")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_absent_on_preferred_is_not_a_failure() {
        let fallback = InMemoryStore::new();
        fallback.set("ana", &record("Ana")).unwrap();
        let store = FallbackStore::new(Box::new(InMemoryStore::new()), Box::new(fallback));
        assert!(store.get("ana").unwrap().is_none());
    }

    #[test]
    fn test_fallback_error_propagates() {
        let (remote, remote_calls) = offline();
        let (local, local_calls) = offline();
        let store = FallbackStore::new(remote, local);
        let err = store.set("ana", &record("Ana")).unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized(_)));
        assert!(store.list().is_err());
        assert_eq!(remote_calls.load(Ordering::SeqCst), 2);
        assert_eq!(local_calls.load(Ordering::SeqCst), 2);
    }
}
