//! Incremental scoring engine.
//!
//! [`ScoringEngine`] keeps one participant's answers and the per-gift
//! totals derived from them. An inverted index (question → gift positions)
//! is built once from the catalog, so answering a question touches only
//! the gifts that question feeds, independent of the questionnaire size.
//!
//! The totals are always equal to [`calculate_scores`] over the current
//! answers; they are cached, never an independent source of truth.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::catalog::{ConfigDiagnostic, GiftCatalog, MAX_ANSWER_VALUE, QUESTION_COUNT};

/// Gift id → total score.
pub type ScoreState = BTreeMap<String, i64>;

/// Validation failure for a single answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("question number must be 1-{max}, got {0}", max = QUESTION_COUNT)]
    QuestionOutOfRange(u32),
    #[error("answer value must be 0-{max}, got {0}", max = MAX_ANSWER_VALUE)]
    ValueOutOfRange(u8),
}

/// Completion progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    pub percentage: f64,
}

/// Answers and live per-gift totals for one participant.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: GiftCatalog,
    answers: BTreeMap<u32, u8>,
    /// Totals by gift declaration position.
    totals: Vec<i64>,
    index: HashMap<u32, Vec<usize>>,
}

impl ScoringEngine {
    pub fn new(catalog: GiftCatalog) -> Self {
        let mut index: HashMap<u32, Vec<usize>> = HashMap::new();
        for (pos, gift) in catalog.gifts().iter().enumerate() {
            for &q in &gift.questions {
                index.entry(q).or_default().push(pos);
            }
        }
        let totals = vec![0; catalog.len()];
        Self {
            catalog,
            answers: BTreeMap::new(),
            totals,
            index,
        }
    }

    /// Engine over the shipped catalog.
    pub fn standard() -> Self {
        Self::new(GiftCatalog::standard())
    }

    /// Rebuild an engine from a stored answer map. Totals are recomputed
    /// from the answers; stored totals are not consulted.
    pub fn from_answers(
        catalog: GiftCatalog,
        answers: &BTreeMap<u32, u8>,
    ) -> Result<Self, ScoreError> {
        let mut engine = Self::new(catalog);
        engine.batch_answer(answers.iter().map(|(&q, &v)| (q, v)))?;
        Ok(engine)
    }

    pub fn catalog(&self) -> &GiftCatalog {
        &self.catalog
    }

    /// Record `value` for `question_id`, replacing any previous answer.
    ///
    /// Every gift fed by the question moves by `value - previous`; answering
    /// with the same value again leaves the totals unchanged.
    pub fn answer_question(&mut self, question_id: u32, value: u8) -> Result<(), ScoreError> {
        if !(1..=QUESTION_COUNT).contains(&question_id) {
            return Err(ScoreError::QuestionOutOfRange(question_id));
        }
        if value > MAX_ANSWER_VALUE {
            return Err(ScoreError::ValueOutOfRange(value));
        }

        let previous = self.answers.insert(question_id, value).unwrap_or(0);
        let delta = i64::from(value) - i64::from(previous);
        if delta != 0 {
            if let Some(positions) = self.index.get(&question_id) {
                for &pos in positions {
                    self.totals[pos] += delta;
                }
            }
        }
        Ok(())
    }

    /// Apply answers in iteration order. Stops at the first invalid entry;
    /// entries before it stay applied.
    pub fn batch_answer<I>(&mut self, answers: I) -> Result<(), ScoreError>
    where
        I: IntoIterator<Item = (u32, u8)>,
    {
        for (q, v) in answers {
            self.answer_question(q, v)?;
        }
        Ok(())
    }

    pub fn answers(&self) -> &BTreeMap<u32, u8> {
        &self.answers
    }

    pub fn answer(&self, question_id: u32) -> Option<u8> {
        self.answers.get(&question_id).copied()
    }

    /// Snapshot of the current totals.
    pub fn scores(&self) -> ScoreState {
        self.catalog
            .gifts()
            .iter()
            .zip(&self.totals)
            .map(|(gift, &total)| (gift.id.clone(), total))
            .collect()
    }

    /// Gifts by descending score. Equal scores keep catalog declaration order.
    pub fn ranked_results(&self) -> Vec<(&str, i64)> {
        let mut ranked: Vec<(&str, i64)> = self
            .catalog
            .gifts()
            .iter()
            .zip(&self.totals)
            .map(|(gift, &total)| (gift.id.as_str(), total))
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The first `n` entries of [`ranked_results`](Self::ranked_results).
    pub fn top_gifts(&self, n: usize) -> Vec<(&str, i64)> {
        let mut ranked = self.ranked_results();
        ranked.truncate(n);
        ranked
    }

    pub fn top_gift(&self) -> Option<(&str, i64)> {
        self.ranked_results().into_iter().next()
    }

    pub fn progress(&self) -> Progress {
        let answered = self.answers.len();
        let total = QUESTION_COUNT as usize;
        Progress {
            answered,
            total,
            percentage: answered as f64 / total as f64 * 100.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.answers.len() == QUESTION_COUNT as usize
    }

    pub fn validate_config(&self) -> ConfigDiagnostic {
        self.catalog.validate()
    }

    /// Forget every answer and zero every total.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.totals.iter_mut().for_each(|t| *t = 0);
    }
}

/// Totals recomputed from scratch over a full answer map.
pub fn calculate_scores(answers: &BTreeMap<u32, u8>, catalog: &GiftCatalog) -> ScoreState {
    catalog
        .gifts()
        .iter()
        .map(|gift| {
            let total = gift
                .questions
                .iter()
                .filter_map(|q| answers.get(q))
                .map(|&v| i64::from(v))
                .sum();
            (gift.id.clone(), total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GiftDefinition;

    /// Small deterministic generator so the sequence tests need no extra crate.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 33) % bound
        }
    }

    #[test]
    fn test_single_answer_moves_one_gift() {
        let mut engine = ScoringEngine::standard();
        engine.answer_question(1, 3).unwrap();
        let scores = engine.scores();
        assert_eq!(scores["A"], 3);
        for (gift, score) in &scores {
            if gift != "A" {
                assert_eq!(*score, 0, "gift {} moved", gift);
            }
        }

        engine.answer_question(1, 0).unwrap();
        assert_eq!(engine.scores()["A"], 0);
        assert_eq!(engine.answer(1), Some(0));
    }

    #[test]
    fn test_repeat_answer_is_noop() {
        let mut engine = ScoringEngine::standard();
        engine.answer_question(17, 2).unwrap();
        let before = engine.scores();
        engine.answer_question(17, 2).unwrap();
        assert_eq!(engine.scores(), before);
        assert_eq!(engine.progress().answered, 1);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut engine = ScoringEngine::standard();
        assert_eq!(
            engine.answer_question(0, 1),
            Err(ScoreError::QuestionOutOfRange(0))
        );
        assert_eq!(
            engine.answer_question(46, 1),
            Err(ScoreError::QuestionOutOfRange(46))
        );
        assert_eq!(
            engine.answer_question(5, 4),
            Err(ScoreError::ValueOutOfRange(4))
        );
        assert!(engine.answers().is_empty());
        assert!(engine.scores().values().all(|&s| s == 0));
    }

    #[test]
    fn test_incremental_matches_recompute() {
        let mut engine = ScoringEngine::standard();
        let mut rng = Lcg(7);
        for _ in 0..500 {
            let q = rng.next(45) as u32 + 1;
            let v = rng.next(4) as u8;
            engine.answer_question(q, v).unwrap();
            assert_eq!(
                engine.scores(),
                calculate_scores(engine.answers(), engine.catalog())
            );
        }
    }

    #[test]
    fn test_overlapping_catalog_updates_every_gift() {
        let catalog = GiftCatalog::new(vec![
            GiftDefinition::new("X", "", &[1, 2]),
            GiftDefinition::new("Y", "", &[2, 3]),
        ]);
        let mut engine = ScoringEngine::new(catalog);
        engine.answer_question(2, 3).unwrap();
        assert_eq!(engine.scores()["X"], 3);
        assert_eq!(engine.scores()["Y"], 3);
        engine.answer_question(2, 1).unwrap();
        assert_eq!(engine.scores()["X"], 1);
        assert_eq!(engine.scores()["Y"], 1);

        // Question 40 feeds nothing here but is still a valid answer.
        engine.answer_question(40, 2).unwrap();
        assert_eq!(engine.answer(40), Some(2));
        assert_eq!(
            engine.scores(),
            calculate_scores(engine.answers(), engine.catalog())
        );
    }

    #[test]
    fn test_batch_answer_partial_on_error() {
        let mut engine = ScoringEngine::standard();
        let result = engine.batch_answer(vec![(1, 2), (2, 9), (3, 1)]);
        assert_eq!(result, Err(ScoreError::ValueOutOfRange(9)));
        assert_eq!(engine.answer(1), Some(2));
        assert_eq!(engine.answer(3), None);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut engine = ScoringEngine::standard();
        engine.answer_question(2, 3).unwrap();
        let mut snapshot = engine.scores();
        snapshot.insert("B".to_string(), 99);
        assert_eq!(engine.scores()["B"], 3);
    }

    #[test]
    fn test_ranked_ties_follow_declaration_order() {
        let mut engine = ScoringEngine::standard();
        // C and H tie at 3, E leads with 5.
        engine.batch_answer(vec![(3, 3), (8, 3), (5, 3), (14, 2)]).unwrap();
        let ranked = engine.ranked_results();
        let ids: Vec<&str> = ranked.iter().map(|(id, _)| *id).collect();
        assert_eq!(&ids[..3], &["E", "C", "H"]);
        // Remaining zero-score gifts keep declaration order.
        assert_eq!(&ids[3..], &["A", "B", "D", "F", "G", "I"]);
        assert_eq!(engine.top_gift(), Some(("E", 5)));
    }

    #[test]
    fn test_ranked_ties_ignore_identifier_order() {
        let catalog = GiftCatalog::new(vec![
            GiftDefinition::new("Z", "", &[1]),
            GiftDefinition::new("A", "", &[2]),
        ]);
        let mut engine = ScoringEngine::new(catalog);
        engine.batch_answer(vec![(1, 2), (2, 2)]).unwrap();
        assert_eq!(engine.ranked_results(), vec![("Z", 2), ("A", 2)]);
    }

    #[test]
    fn test_top_gifts_clamps_to_catalog() {
        let mut engine = ScoringEngine::standard();
        engine.answer_question(9, 1).unwrap();
        assert_eq!(engine.top_gifts(3).len(), 3);
        assert_eq!(engine.top_gifts(3)[0], ("I", 1));
        assert_eq!(engine.top_gifts(50).len(), 9);
        assert!(engine.top_gifts(0).is_empty());
    }

    #[test]
    fn test_progress_and_completion() {
        let mut engine = ScoringEngine::standard();
        assert_eq!(engine.progress().percentage, 0.0);
        engine
            .batch_answer((1..=QUESTION_COUNT).map(|q| (q, (q % 4) as u8)))
            .unwrap();
        let progress = engine.progress();
        assert_eq!(progress.answered, 45);
        assert_eq!(progress.total, 45);
        assert!((progress.percentage - 100.0).abs() < 1e-9);
        assert!(engine.is_complete());
    }

    #[test]
    fn test_reset_clears_answers_keeps_index() {
        let mut engine = ScoringEngine::standard();
        engine.batch_answer(vec![(1, 3), (2, 3)]).unwrap();
        engine.reset();
        assert!(engine.answers().is_empty());
        assert!(engine.scores().values().all(|&s| s == 0));
        engine.answer_question(1, 2).unwrap();
        assert_eq!(engine.scores()["A"], 2);
    }

    #[test]
    fn test_from_answers_recomputes_totals() {
        let answers = BTreeMap::from([(1, 3), (10, 2), (45, 1)]);
        let engine = ScoringEngine::from_answers(GiftCatalog::standard(), &answers).unwrap();
        assert_eq!(engine.scores()["A"], 5);
        assert_eq!(engine.scores()["I"], 1);
        assert_eq!(engine.progress().answered, 3);

        let bad = BTreeMap::from([(50, 1)]);
        assert!(ScoringEngine::from_answers(GiftCatalog::standard(), &bad).is_err());
    }

    #[test]
    fn test_validate_config_delegates_to_catalog() {
        assert!(ScoringEngine::standard().validate_config().valid);
        let engine = ScoringEngine::new(GiftCatalog::new(vec![GiftDefinition::new(
            "A",
            "",
            &[1, 1],
        )]));
        let diag = engine.validate_config();
        assert!(!diag.valid);
        assert_eq!(diag.duplicates, 1);
    }
}
