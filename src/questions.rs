//! Catalog inspection: `gifts questions` and `gifts check-config`.

use anyhow::{bail, Result};

use gift_survey_core::catalog::{questions, MAX_ANSWER_VALUE};

use crate::config::Config;

pub fn run_questions() -> Result<()> {
    println!("Answer each statement from 0 (never) to {} (always).", MAX_ANSWER_VALUE);
    println!();
    for (id, text) in questions() {
        println!("{:>3}. {}", id, text);
    }
    Ok(())
}

/// Print the gift partition and its diagnostic. Fails when the partition
/// does not cover every question exactly once.
pub fn run_check_config(config: &Config) -> Result<()> {
    let catalog = config.catalog();
    let diagnostic = catalog.validate();

    println!(
        "Catalog: {}",
        if config.catalog.is_some() { "custom" } else { "standard" }
    );
    println!();
    for gift in catalog.gifts() {
        let ids: Vec<String> = gift.questions.iter().map(|q| q.to_string()).collect();
        println!("  {:<4} {:<14} {}", gift.id, gift.label(), ids.join(", "));
    }
    println!();
    println!("Mappings:          {}", diagnostic.total_mappings);
    println!("Unique questions:  {}", diagnostic.unique_questions);
    println!("Duplicates:        {}", diagnostic.duplicates);
    if !diagnostic.missing.is_empty() {
        println!("Missing:           {}", join(&diagnostic.missing));
    }
    if !diagnostic.unexpected.is_empty() {
        println!("Unexpected:        {}", join(&diagnostic.unexpected));
    }
    if !diagnostic.duplicate_ids.is_empty() {
        let ids: Vec<&str> = diagnostic.duplicate_ids.iter().map(String::as_str).collect();
        println!("Repeated gift ids: {}", ids.join(", "));
    }

    if !diagnostic.valid {
        bail!("gift configuration is invalid");
    }
    println!("Configuration OK.");
    Ok(())
}

fn join<'a>(ids: impl IntoIterator<Item = &'a u32>) -> String {
    ids.into_iter()
        .map(|q| q.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
