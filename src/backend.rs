//! Backend selection.
//!
//! With an enabled `[remote]` section the active store is the remote
//! document store backed by the JSON file; otherwise the JSON file alone.
//! A remote backend that cannot even be constructed (bad URL, TLS setup)
//! is logged and skipped, so the tool keeps working offline.

use anyhow::Result;
use tracing::{info, warn};

use gift_survey_core::store::FallbackStore;
use gift_survey_core::Store;

use crate::config::Config;
use crate::local_store::JsonFileStore;
use crate::remote_store::RemoteDocumentStore;

/// Open the store described by `config`.
pub fn open_store(config: &Config) -> Result<Box<dyn Store>> {
    let local = JsonFileStore::new(&config.storage.path);

    let Some(remote_cfg) = config.remote() else {
        info!(path = %config.storage.path.display(), "using local store only");
        return Ok(Box::new(local));
    };

    match RemoteDocumentStore::from_config(remote_cfg) {
        Ok(remote) => {
            info!(
                remote = %remote.base_url(),
                path = %config.storage.path.display(),
                "using remote store with local fallback"
            );
            Ok(Box::new(FallbackStore::new(Box::new(remote), Box::new(local))))
        }
        Err(e) => {
            warn!(error = %e, "remote store unavailable, using local store only");
            Ok(Box::new(local))
        }
    }
}

/// Log a warning for every problem in the configured gift partition.
/// Returns whether the partition is valid.
pub fn check_catalog(config: &Config) -> bool {
    let diagnostic = config.catalog().validate();
    if diagnostic.valid {
        return true;
    }
    if !diagnostic.missing.is_empty() {
        warn!(missing = ?diagnostic.missing, "questions not mapped to any gift");
    }
    if !diagnostic.unexpected.is_empty() {
        warn!(unexpected = ?diagnostic.unexpected, "gift mappings reference unknown questions");
    }
    if diagnostic.duplicates > 0 {
        warn!(duplicates = diagnostic.duplicates, "questions mapped to more than one gift");
    }
    if !diagnostic.duplicate_ids.is_empty() {
        warn!(ids = ?diagnostic.duplicate_ids, "gift ids declared more than once");
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_local_only_without_remote() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::minimal(&dir.path().join("p.json"));
        assert_eq!(open_store(&cfg).unwrap().name(), "local");
        assert!(check_catalog(&cfg));
    }

    #[test]
    fn test_remote_wraps_local() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::minimal(&dir.path().join("p.json"));
        cfg.remote = Some(RemoteConfig {
            enabled: true,
            base_url: "http://127.0.0.1:1".into(),
            collection: "quiz_progress".into(),
            token_env: "GIFTS_TEST_UNSET_TOKEN".into(),
            timeout_secs: 1,
        });
        assert_eq!(open_store(&cfg).unwrap().name(), "remote+local");

        cfg.remote.as_mut().unwrap().enabled = false;
        assert_eq!(open_store(&cfg).unwrap().name(), "local");
    }
}
