//! Recording answers.
//!
//! `gifts answer <name> Q=V...` restores the participant's session (canonical
//! key first, then the legacy key), applies the answers, saves under the
//! canonical key and reports progress plus the current top gifts.
//!
//! `gifts reset <name>` saves an empty session for the participant, the way
//! retaking the questionnaire starts over.

use anyhow::{bail, Context, Result};

use gift_survey_core::catalog::MAX_ANSWER_VALUE;
use gift_survey_core::migration::{LegacyStatus, SaveOutcome};
use gift_survey_core::{MigrationResolver, ScoringEngine, QUESTION_COUNT};

use crate::backend;
use crate::config::Config;

/// Parse a `QUESTION=VALUE` pair such as `12=3`.
pub fn parse_answer(s: &str) -> Result<(u32, u8), String> {
    let (q, v) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid QUESTION=VALUE: no '=' found in '{}'", s))?;
    let question: u32 = q
        .trim()
        .parse()
        .map_err(|_| format!("invalid question number '{}'", q))?;
    let value: u8 = v
        .trim()
        .parse()
        .map_err(|_| format!("invalid answer value '{}'", v))?;
    Ok((question, value))
}

pub fn run_answer(
    config: &Config,
    name: &str,
    answers: &[(u32, u8)],
    church: Option<&str>,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("participant name must not be empty");
    }
    if answers.is_empty() {
        bail!(
            "no answers given; pass QUESTION=VALUE pairs (1-{}, 0-{})",
            QUESTION_COUNT,
            MAX_ANSWER_VALUE
        );
    }

    let store = backend::open_store(config)?;
    let resolver = MigrationResolver::new(store.as_ref());
    let catalog = config.catalog();

    let loaded = resolver
        .load(name)
        .with_context(|| format!("failed to load progress for '{}'", name))?;
    let (mut engine, stored_church) = match &loaded {
        Some(loaded) => (
            loaded.to_engine(catalog)?,
            loaded.record.church_name.clone(),
        ),
        None => (ScoringEngine::new(catalog), None),
    };

    engine.batch_answer(answers.iter().copied())?;

    let church = church.map(str::to_string).or(stored_church);
    let outcome = resolver
        .save(name, &engine, church.as_deref())
        .with_context(|| format!("failed to save progress for '{}'", name))?;

    let progress = engine.progress();
    println!(
        "Saved {} answer(s) for {} (key: {})",
        answers.len(),
        name,
        outcome.key
    );
    println!(
        "Progress: {}/{} ({:.0}%)",
        progress.answered, progress.total, progress.percentage
    );
    if engine.is_complete() {
        println!("Questionnaire complete.");
    }
    println!();
    println!("Top gifts:");
    for (rank, (gift, score)) in engine.top_gifts(3).into_iter().enumerate() {
        println!(
            "  {}. {:<14} {:>3}",
            rank + 1,
            engine.catalog().label(gift),
            score
        );
    }
    report_legacy(&outcome);
    Ok(())
}

pub fn run_reset(config: &Config, name: &str) -> Result<()> {
    let store = backend::open_store(config)?;
    let resolver = MigrationResolver::new(store.as_ref());

    let church = resolver
        .load(name)?
        .and_then(|loaded| loaded.record.church_name);
    let mut engine = ScoringEngine::new(config.catalog());
    engine.reset();

    let outcome = resolver
        .save(name, &engine, church.as_deref())
        .with_context(|| format!("failed to reset progress for '{}'", name))?;
    println!("Progress for {} cleared (key: {})", name, outcome.key);
    report_legacy(&outcome);
    Ok(())
}

/// Tell the operator what happened to an old-style record.
pub(crate) fn report_legacy(outcome: &SaveOutcome) {
    match &outcome.legacy {
        LegacyStatus::Absent => {}
        LegacyStatus::Migrated { legacy_key } => {
            eprintln!("Migrated record from legacy key '{}'.", legacy_key);
        }
        LegacyStatus::ConflictPending { legacy_key } => {
            eprintln!(
                "Warning: legacy record '{}' differs from '{}' and was kept. \
                 Settle it with `gifts resolve \"{}\" --keep canonical|legacy`.",
                legacy_key, outcome.key, legacy_key
            );
        }
        LegacyStatus::DeletePending { legacy_key, error } => {
            eprintln!(
                "Warning: could not remove legacy record '{}' ({}); the next save retries.",
                legacy_key, error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("12=3").unwrap(), (12, 3));
        assert_eq!(parse_answer(" 1 = 0 ").unwrap(), (1, 0));
    }

    #[test]
    fn test_parse_answer_rejects_garbage() {
        assert!(parse_answer("12").is_err());
        assert!(parse_answer("x=1").is_err());
        assert!(parse_answer("1=-1").is_err());
        assert!(parse_answer("1=999").is_err());
    }
}
