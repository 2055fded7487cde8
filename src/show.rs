//! Show one participant's saved progress.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

use gift_survey_core::migration::KeyOrigin;
use gift_survey_core::MigrationResolver;

use crate::backend;
use crate::config::Config;

pub fn run_show(config: &Config, name: &str) -> Result<()> {
    let store = backend::open_store(config)?;
    let resolver = MigrationResolver::new(store.as_ref());

    let Some(loaded) = resolver.load(name)? else {
        bail!("no saved progress for '{}'", name);
    };
    let engine = loaded.to_engine(config.catalog())?;
    let record = &loaded.record;
    let progress = engine.progress();

    println!("Participant: {}", record.display_name);
    match loaded.origin {
        KeyOrigin::Canonical => println!("Key:         {}", loaded.key),
        KeyOrigin::Legacy => println!(
            "Key:         {} (legacy, migrated on next save)",
            loaded.key
        ),
    }
    if let Some(church) = &record.church_name {
        println!("Church:      {}", church);
    }
    println!("Updated:     {}", format_ts_relative(record.last_updated));
    println!(
        "Progress:    {}/{} ({:.0}%){}",
        progress.answered,
        progress.total,
        progress.percentage,
        if engine.is_complete() { ", complete" } else { "" }
    );
    println!();
    println!("  {:<4} {:<14} {:>5}", "GIFT", "NAME", "SCORE");
    for (gift, score) in engine.ranked_results() {
        println!(
            "  {:<4} {:<14} {:>5}",
            gift,
            engine.catalog().label(gift),
            score
        );
    }
    Ok(())
}

/// "3 hours ago" style age, falling back to a date for old or future times.
fn format_ts_relative(ts: DateTime<Utc>) -> String {
    let delta = (Utc::now() - ts).num_seconds();

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}
