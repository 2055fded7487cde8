//! Cross-participant reports.
//!
//! [`ReportBuilder`] turns the output of [`Store::list`] into per-gift
//! rankings and a per-participant summary. It never writes.
//!
//! Ordering rules:
//! - Gifts appear in catalog declaration order.
//! - Within a gift, participants are sorted by descending score; equal
//!   scores keep storage-key order.
//! - A participant's top gift is the highest score, ties going to the gift
//!   declared first.
//!
//! Stored `scores` and `completed` are caches written by older sessions or
//! other tools. Reports re-derive both from `answers` and the catalog.

use crate::catalog::GiftCatalog;
use crate::models::ParticipantRecord;
use crate::scoring::calculate_scores;
use crate::store::{Store, StoreError};

/// One participant's line in a gift ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedParticipant {
    pub key: String,
    pub display_name: String,
    pub score: i64,
}

/// Participants ranked for a single gift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftRanking {
    pub gift_id: String,
    pub gift_name: String,
    pub entries: Vec<RankedParticipant>,
}

/// One line of the participant summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub key: String,
    pub display_name: String,
    pub top_gift: String,
    pub top_score: i64,
    pub completed: bool,
}

/// Builds reports over a set of stored records.
pub struct ReportBuilder<'a> {
    catalog: &'a GiftCatalog,
    include_incomplete: bool,
}

impl<'a> ReportBuilder<'a> {
    /// Rankings include completed participants only; see
    /// [`include_incomplete`](Self::include_incomplete).
    pub fn new(catalog: &'a GiftCatalog) -> Self {
        Self {
            catalog,
            include_incomplete: false,
        }
    }

    pub fn include_incomplete(mut self, include: bool) -> Self {
        self.include_incomplete = include;
        self
    }

    /// Fetch every record with a single `list()` call.
    pub fn fetch(store: &dyn Store) -> Result<Vec<(String, ParticipantRecord)>, StoreError> {
        let mut records = store.list()?;
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }

    /// Per-gift rankings, one entry per catalog gift.
    pub fn gift_rankings(&self, records: &[(String, ParticipantRecord)]) -> Vec<GiftRanking> {
        let mut rankings: Vec<GiftRanking> = self
            .catalog
            .gifts()
            .iter()
            .map(|g| GiftRanking {
                gift_id: g.id.clone(),
                gift_name: g.label().to_string(),
                entries: Vec::new(),
            })
            .collect();

        for (key, record) in sorted_by_key(records) {
            let record = self.refreshed(key, record);
            if !self.include_incomplete && !record.completed {
                continue;
            }
            for (ranking, gift) in rankings.iter_mut().zip(self.catalog.gifts()) {
                let score = record.scores.get(&gift.id).copied().unwrap_or(0);
                ranking.entries.push(RankedParticipant {
                    key: key.clone(),
                    display_name: record.display_name.clone(),
                    score,
                });
            }
        }

        for ranking in &mut rankings {
            ranking.entries.sort_by(|a, b| b.score.cmp(&a.score));
        }
        rankings
    }

    /// The first `n` participants of every gift ranking.
    pub fn top_performers(
        &self,
        records: &[(String, ParticipantRecord)],
        n: usize,
    ) -> Vec<GiftRanking> {
        let mut rankings = self.gift_rankings(records);
        for ranking in &mut rankings {
            ranking.entries.truncate(n);
        }
        rankings
    }

    /// Every participant with at least one answer, with their top gift,
    /// sorted by top score descending. Completion does not filter here.
    pub fn participant_summary(
        &self,
        records: &[(String, ParticipantRecord)],
    ) -> Vec<ParticipantSummary> {
        let mut summary: Vec<ParticipantSummary> = sorted_by_key(records)
            .into_iter()
            .filter(|(_, record)| !record.answers.is_empty())
            .filter_map(|(key, record)| {
                let record = self.refreshed(key, record);
                let (top_gift, top_score) = self.top_gift(&record)?;
                Some(ParticipantSummary {
                    key: key.clone(),
                    display_name: record.display_name.clone(),
                    top_gift: top_gift.to_string(),
                    top_score,
                    completed: record.completed,
                })
            })
            .collect();
        summary.sort_by(|a, b| b.top_score.cmp(&a.top_score));
        summary
    }

    /// `record` with its display name filled in and its totals and
    /// completion re-derived from the answers.
    fn refreshed(&self, key: &str, record: &ParticipantRecord) -> ParticipantRecord {
        let mut record = record.clone();
        record.reconcile(key);
        record.scores = calculate_scores(&record.answers, self.catalog);
        record
    }

    fn top_gift<'r>(&'r self, record: &ParticipantRecord) -> Option<(&'r str, i64)> {
        let mut best: Option<(&str, i64)> = None;
        for gift in self.catalog.gifts() {
            if let Some(&score) = record.scores.get(&gift.id) {
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((gift.id.as_str(), score));
                }
            }
        }
        best
    }
}

fn sorted_by_key(records: &[(String, ParticipantRecord)]) -> Vec<&(String, ParticipantRecord)> {
    let mut sorted: Vec<&(String, ParticipantRecord)> = records.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
}
