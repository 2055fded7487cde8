//! Canonical-key persistence with legacy-key migration.
//!
//! Participants are stored under [`normalize_key`] of their display name.
//! Records written before normalization existed sit under the raw display
//! name (the *legacy key*). [`MigrationResolver`] reads and writes through
//! a [`Store`] so both kinds of record are handled:
//!
//! - **load** prefers the canonical key and falls back to the legacy key,
//!   without migrating.
//! - **save** writes the canonical key, then deletes the legacy key. The
//!   delete only happens after the write succeeded.
//! - When the canonical key already held answers that neither came from the
//!   legacy record nor extend it, the legacy record is left in place and
//!   reported as a conflict.
//!   [`MigrationResolver::resolve_conflict`] settles it by hand.
//! - [`MigrationResolver::migrate_all`] moves every legacy record in the
//!   store at once (with a dry-run mode).

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::GiftCatalog;
use crate::models::ParticipantRecord;
use crate::normalize::normalize_key;
use crate::scoring::{calculate_scores, ScoreError, ScoringEngine};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("no legacy record stored under '{0}'")]
    NoLegacyRecord(String),
}

/// Which key a loaded record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    Canonical,
    Legacy,
}

/// A record returned by [`MigrationResolver::load`].
#[derive(Debug, Clone)]
pub struct LoadedRecord {
    /// Key the record was found under.
    pub key: String,
    pub origin: KeyOrigin,
    pub record: ParticipantRecord,
}

impl LoadedRecord {
    /// Rebuild a scoring session from the stored answers.
    pub fn to_engine(&self, catalog: GiftCatalog) -> Result<ScoringEngine, ScoreError> {
        ScoringEngine::from_answers(catalog, &self.record.answers)
    }
}

/// What happened to the legacy record during a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyStatus {
    /// No legacy record exists (or the name is already canonical).
    Absent,
    /// The legacy record was deleted after the canonical write.
    Migrated { legacy_key: String },
    /// The canonical key already held different answers; the legacy record
    /// was kept for manual resolution.
    ConflictPending { legacy_key: String },
    /// The canonical write succeeded but deleting the legacy record failed.
    /// The next save retries.
    DeletePending { legacy_key: String, error: String },
}

/// Result of [`MigrationResolver::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub key: String,
    pub legacy: LegacyStatus,
}

/// How to settle a canonical/legacy conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    /// Keep the canonical record, drop the legacy one.
    KeepCanonical,
    /// Overwrite the canonical record with the legacy one, then drop the legacy one.
    KeepLegacy,
}

/// Per-entry result of a bulk migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationAction {
    /// Key already canonical.
    AlreadyCanonical,
    /// Moved (or would move, in a dry run) to `to`.
    Migrated { to: String },
    /// Target key exists or another legacy key claims it in this run.
    TargetExists { to: String },
    /// Write or delete failed; the legacy record may still be in place.
    Failed { to: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationEntry {
    pub key: String,
    pub action: MigrationAction,
}

/// Summary of [`MigrationResolver::migrate_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub dry_run: bool,
    pub migrated: usize,
    pub skipped: usize,
    pub conflicts: usize,
    pub errors: usize,
    pub entries: Vec<MigrationEntry>,
}

impl MigrationSummary {
    pub fn total(&self) -> usize {
        self.entries.len()
    }
}

/// Reads and writes participant records under canonical keys.
pub struct MigrationResolver<'a> {
    store: &'a dyn Store,
    catalog: GiftCatalog,
}

impl<'a> MigrationResolver<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            catalog: GiftCatalog::standard(),
        }
    }

    /// Catalog used to recompute totals of records moved from a legacy key.
    pub fn with_catalog(mut self, catalog: GiftCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn store(&self) -> &dyn Store {
        self.store
    }

    /// Persist `engine`'s state for `display_name`.
    pub fn save(
        &self,
        display_name: &str,
        engine: &ScoringEngine,
        church_name: Option<&str>,
    ) -> Result<SaveOutcome, MigrationError> {
        let canonical = normalize_key(display_name);
        let mut record = ParticipantRecord::from_engine(display_name, engine, church_name);

        let legacy_key = (display_name != canonical).then_some(display_name);
        let legacy = match legacy_key {
            Some(key) => self.store.get(key)?,
            None => None,
        };
        let prior = if legacy.is_some() {
            self.store.get(&canonical)?
        } else {
            None
        };

        // The canonical record supersedes the legacy one when it was written
        // by an earlier migrating save, or when it already holds every
        // legacy answer unchanged.
        let conflicting = match (&legacy, &prior) {
            (Some(legacy), Some(prior)) => {
                prior.migrated_from.as_deref() != legacy_key && !prior.extends(legacy)
            }
            _ => false,
        };
        if legacy.is_some() && !conflicting {
            record.migrated_from = legacy_key.map(str::to_string);
        }

        self.store.set(&canonical, &record)?;
        info!(key = %canonical, answered = record.answers.len(), "saved progress");

        let legacy = match (legacy_key, legacy) {
            (Some(legacy_key), Some(_)) if conflicting => {
                warn!(
                    legacy_key,
                    canonical = %canonical,
                    "canonical key already holds different answers; legacy record kept"
                );
                LegacyStatus::ConflictPending {
                    legacy_key: legacy_key.to_string(),
                }
            }
            (Some(legacy_key), Some(_)) => self.delete_legacy(legacy_key, &canonical),
            _ => LegacyStatus::Absent,
        };

        Ok(SaveOutcome {
            key: canonical,
            legacy,
        })
    }

    fn delete_legacy(&self, legacy_key: &str, canonical: &str) -> LegacyStatus {
        match self.store.delete(legacy_key) {
            Ok(()) => {
                info!(legacy_key, canonical, "migrated legacy record");
                LegacyStatus::Migrated {
                    legacy_key: legacy_key.to_string(),
                }
            }
            Err(e) => {
                warn!(legacy_key, error = %e, "legacy record delete failed; will retry on next save");
                LegacyStatus::DeletePending {
                    legacy_key: legacy_key.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Look up `display_name`: canonical key first, then the legacy key.
    /// A record found under the legacy key is returned as-is (not migrated).
    pub fn load(&self, display_name: &str) -> Result<Option<LoadedRecord>, MigrationError> {
        let canonical = normalize_key(display_name);
        if let Some(record) = self.store.get(&canonical)? {
            return Ok(Some(loaded(canonical, KeyOrigin::Canonical, record)));
        }
        if display_name != canonical {
            if let Some(record) = self.store.get(display_name)? {
                return Ok(Some(loaded(
                    display_name.to_string(),
                    KeyOrigin::Legacy,
                    record,
                )));
            }
        }
        Ok(None)
    }

    /// Settle a conflict between `display_name`'s legacy and canonical records.
    pub fn resolve_conflict(
        &self,
        display_name: &str,
        choice: ConflictChoice,
    ) -> Result<String, MigrationError> {
        let canonical = normalize_key(display_name);
        let legacy = if display_name != canonical {
            self.store.get(display_name)?
        } else {
            None
        };
        let Some(mut legacy) = legacy else {
            return Err(MigrationError::NoLegacyRecord(display_name.to_string()));
        };

        if choice == ConflictChoice::KeepLegacy {
            legacy.reconcile(display_name);
            legacy.scores = calculate_scores(&legacy.answers, &self.catalog);
            legacy.migrated_from = Some(display_name.to_string());
            self.store.set(&canonical, &legacy)?;
        }
        self.store.delete(display_name)?;
        info!(legacy_key = display_name, canonical = %canonical, ?choice, "resolved conflict");
        Ok(canonical)
    }

    /// Move every non-canonical key in the store to its canonical key.
    ///
    /// Keys whose canonical target is already present (or already claimed
    /// by an earlier key in this run) are skipped as conflicts. Per-entry
    /// write/delete failures are counted and the run continues. A dry run
    /// performs no writes.
    pub fn migrate_all(&self, dry_run: bool) -> Result<MigrationSummary, MigrationError> {
        let records = self.store.list()?;
        let mut taken: BTreeSet<String> = records.iter().map(|(k, _)| k.clone()).collect();
        let mut summary = MigrationSummary {
            dry_run,
            ..Default::default()
        };

        for (key, mut record) in records {
            let target = normalize_key(&key);
            let action = if key == target {
                summary.skipped += 1;
                MigrationAction::AlreadyCanonical
            } else if taken.contains(&target) {
                warn!(key = %key, target = %target, "migration target already exists");
                summary.conflicts += 1;
                MigrationAction::TargetExists { to: target }
            } else {
                taken.insert(target.clone());
                record.reconcile(&key);
                record.scores = calculate_scores(&record.answers, &self.catalog);
                record.migrated_from = Some(key.clone());
                match self.move_record(&key, &target, &record, dry_run) {
                    Ok(()) => {
                        summary.migrated += 1;
                        MigrationAction::Migrated { to: target }
                    }
                    Err(e) => {
                        warn!(key = %key, target = %target, error = %e, "migration failed");
                        summary.errors += 1;
                        MigrationAction::Failed {
                            to: target,
                            error: e.to_string(),
                        }
                    }
                }
            };
            summary.entries.push(MigrationEntry { key, action });
        }

        Ok(summary)
    }

    fn move_record(
        &self,
        from: &str,
        to: &str,
        record: &ParticipantRecord,
        dry_run: bool,
    ) -> Result<(), StoreError> {
        if dry_run {
            return Ok(());
        }
        self.store.set(to, record)?;
        self.store.delete(from)?;
        info!(from, to, "migrated legacy record");
        Ok(())
    }
}

fn loaded(key: String, origin: KeyOrigin, mut record: ParticipantRecord) -> LoadedRecord {
    record.reconcile(&key);
    LoadedRecord {
        key,
        origin,
        record,
    }
}
