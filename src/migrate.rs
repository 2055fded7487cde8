//! Legacy key migration commands.
//!
//! `gifts migrate` walks every stored record and moves those saved under a
//! raw display name to the normalized key. Without `--execute` it only
//! prints the plan. `gifts resolve` settles a conflict that a save left
//! behind.

use anyhow::{Context, Result};

use gift_survey_core::migration::{ConflictChoice, MigrationAction, MigrationSummary};
use gift_survey_core::MigrationResolver;

use crate::backend;
use crate::config::Config;

pub fn run_migrate(config: &Config, execute: bool) -> Result<()> {
    let store = backend::open_store(config)?;
    let resolver = MigrationResolver::new(store.as_ref()).with_catalog(config.catalog());

    let summary = resolver
        .migrate_all(!execute)
        .context("failed to list records for migration")?;
    print_summary(&summary);
    Ok(())
}

pub fn run_resolve(config: &Config, name: &str, keep: ConflictChoice) -> Result<()> {
    let store = backend::open_store(config)?;
    let resolver = MigrationResolver::new(store.as_ref()).with_catalog(config.catalog());

    let key = resolver
        .resolve_conflict(name, keep)
        .with_context(|| format!("failed to resolve conflict for '{}'", name))?;
    let kept = match keep {
        ConflictChoice::KeepCanonical => "canonical",
        ConflictChoice::KeepLegacy => "legacy",
    };
    println!("Kept the {} record for '{}' under key '{}'.", kept, name, key);
    Ok(())
}

/// Parse the `--keep` value.
pub fn parse_choice(s: &str) -> Result<ConflictChoice, String> {
    match s {
        "canonical" => Ok(ConflictChoice::KeepCanonical),
        "legacy" => Ok(ConflictChoice::KeepLegacy),
        other => Err(format!(
            "unknown choice '{}', expected 'canonical' or 'legacy'",
            other
        )),
    }
}

fn print_summary(summary: &MigrationSummary) {
    if summary.dry_run {
        println!("Dry run: no changes written. Re-run with --execute to apply.");
        println!();
    }

    for entry in &summary.entries {
        match &entry.action {
            MigrationAction::AlreadyCanonical => {}
            MigrationAction::Migrated { to } => {
                let verb = if summary.dry_run { "would move" } else { "moved" };
                println!("  {:<28} {} -> {}", entry.key, verb, to);
            }
            MigrationAction::TargetExists { to } => {
                println!("  {:<28} skipped, '{}' already taken", entry.key, to);
            }
            MigrationAction::Failed { to, error } => {
                println!("  {:<28} FAILED -> {}: {}", entry.key, to, error);
            }
        }
    }

    println!();
    println!("Records:    {}", summary.total());
    println!("Migrated:   {}", summary.migrated);
    println!("Canonical:  {}", summary.skipped);
    println!("Conflicts:  {}", summary.conflicts);
    println!("Errors:     {}", summary.errors);
}
