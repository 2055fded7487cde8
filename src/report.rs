//! Cross-participant reports: per-gift rankings, top performers and the
//! participant summary. Every report reads the store with one `list()`.

use anyhow::{Context, Result};

use gift_survey_core::report::GiftRanking;
use gift_survey_core::{ReportBuilder, Store};

use crate::backend;
use crate::config::Config;

fn fetch(store: &dyn Store) -> Result<Vec<(String, gift_survey_core::ParticipantRecord)>> {
    let records = ReportBuilder::fetch(store)
        .with_context(|| format!("failed to list participants from {} store", store.name()))?;
    eprintln!("Source: {} ({} participant(s))", store.name(), records.len());
    Ok(records)
}

pub fn run_report(config: &Config, include_incomplete: bool) -> Result<()> {
    let store = backend::open_store(config)?;
    let records = fetch(store.as_ref())?;
    let catalog = config.catalog();
    let rankings = ReportBuilder::new(&catalog)
        .include_incomplete(include_incomplete)
        .gift_rankings(&records);
    print_rankings("Gift report", &rankings);
    Ok(())
}

pub fn run_top(config: &Config, n: usize, include_incomplete: bool) -> Result<()> {
    let store = backend::open_store(config)?;
    let records = fetch(store.as_ref())?;
    let catalog = config.catalog();
    let rankings = ReportBuilder::new(&catalog)
        .include_incomplete(include_incomplete)
        .top_performers(&records, n);
    print_rankings(&format!("Top {} per gift", n), &rankings);
    Ok(())
}

pub fn run_summary(config: &Config) -> Result<()> {
    let store = backend::open_store(config)?;
    let records = fetch(store.as_ref())?;
    let catalog = config.catalog();
    let summary = ReportBuilder::new(&catalog).participant_summary(&records);

    if summary.is_empty() {
        println!("No participants found.");
        return Ok(());
    }

    println!("Participants: {}", summary.len());
    println!();
    println!(
        "{:<24} {:<15} {:>6}  STATUS",
        "NAME", "TOP GIFT", "SCORE"
    );
    for row in &summary {
        println!(
            "{:<24} {:<15} {:>6}  {}",
            row.display_name,
            catalog.label(&row.top_gift),
            row.top_score,
            if row.completed { "complete" } else { "incomplete" }
        );
    }
    Ok(())
}

fn print_rankings(title: &str, rankings: &[GiftRanking]) {
    if rankings.iter().all(|r| r.entries.is_empty()) {
        println!("No data found. Complete some questionnaires first.");
        return;
    }

    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
    for ranking in rankings {
        if ranking.entries.is_empty() {
            continue;
        }
        println!();
        println!("{}: {}", ranking.gift_id, ranking.gift_name);
        for (rank, entry) in ranking.entries.iter().enumerate() {
            println!(
                "  {:>2}. {:<24} {:>3} pts",
                rank + 1,
                entry.display_name,
                entry.score
            );
        }
    }
}
