//! Score ledger: two ordered lists of scored entries.
//!
//! Totals are recomputed from the lists on every read, so they can never
//! drift from the entries. Entries keep insertion order; order matters for
//! display only. Totals are summed in a canonical order, so they depend only
//! on which entries a list holds. An add that would push a total past the
//! `f64` range is rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::habit_loop::LoopStage;

/// Which list an add targets.
///
/// Friction entries live in the short-term list but have their own
/// validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryList {
    ShortTerm,
    LongTerm,
    Friction,
}

impl fmt::Display for EntryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryList::ShortTerm => "short-term",
            EntryList::LongTerm => "long-term",
            EntryList::Friction => "friction",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<LoopStage>,
}

impl ScoreEntry {
    /// Parse a raw score typed into a form field.
    pub fn parse_score(raw: &str) -> Result<f64, ValidationError> {
        let score: f64 = raw.trim().parse().map_err(|_| ValidationError::InvalidScore {
            raw: raw.to_string(),
        })?;
        if !score.is_finite() {
            return Err(ValidationError::NonFiniteScore {
                list: EntryList::ShortTerm,
                score,
            });
        }
        Ok(score)
    }

    fn validated(
        list: EntryList,
        name: &str,
        score: f64,
        stage: Option<LoopStage>,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName { list });
        }
        if !score.is_finite() {
            return Err(ValidationError::NonFiniteScore { list, score });
        }
        if list == EntryList::Friction && score >= 0.0 {
            return Err(ValidationError::NonNegativeFriction { score });
        }
        Ok(Self {
            name: name.to_string(),
            score,
            stage,
        })
    }
}

/// Totals reported after every successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub short_total: f64,
    pub long_total: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreLedger {
    short_term: Vec<ScoreEntry>,
    long_term: Vec<ScoreEntry>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn short_term(&self) -> &[ScoreEntry] {
        &self.short_term
    }

    pub fn long_term(&self) -> &[ScoreEntry] {
        &self.long_term
    }

    pub fn short_total(&self) -> f64 {
        list_total(self.short_term.iter().map(|e| e.score))
    }

    pub fn long_total(&self) -> f64 {
        list_total(self.long_term.iter().map(|e| e.score))
    }

    pub fn totals(&self) -> LedgerTotals {
        LedgerTotals {
            short_total: self.short_total(),
            long_total: self.long_total(),
        }
    }

    /// Number of entries across both lists.
    pub fn len(&self) -> usize {
        self.short_term.len() + self.long_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn add_short_term(&mut self, name: &str, score: f64) -> Result<LedgerTotals, ValidationError> {
        self.add(EntryList::ShortTerm, name, score, None)
    }

    pub fn add_long_term(&mut self, name: &str, score: f64) -> Result<LedgerTotals, ValidationError> {
        self.add(EntryList::LongTerm, name, score, None)
    }

    /// Add deliberate resistance against the habit. Only strictly negative
    /// scores are accepted.
    pub fn add_friction(&mut self, name: &str, score: f64) -> Result<LedgerTotals, ValidationError> {
        self.add(EntryList::Friction, name, score, None)
    }

    /// Validate and append to the list `list` targets. On error the ledger
    /// is left untouched.
    pub fn add(
        &mut self,
        list: EntryList,
        name: &str,
        score: f64,
        stage: Option<LoopStage>,
    ) -> Result<LedgerTotals, ValidationError> {
        let entry = match ScoreEntry::validated(list, name, score, stage) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%list, entry = name, score, error = %err, "rejected ledger entry");
                return Err(err);
            }
        };
        let target = match list {
            EntryList::ShortTerm | EntryList::Friction => &mut self.short_term,
            EntryList::LongTerm => &mut self.long_term,
        };
        let total = list_total(target.iter().map(|e| e.score).chain([score]));
        if !total.is_finite() {
            let err = ValidationError::TotalOverflow { list };
            tracing::warn!(%list, entry = %entry.name, score, error = %err, "rejected ledger entry");
            return Err(err);
        }
        tracing::debug!(%list, entry = %entry.name, score, "ledger entry added");
        target.push(entry);
        Ok(self.totals())
    }

    pub fn reset(&mut self) {
        self.short_term.clear();
        self.long_term.clear();
    }
}

/// Sum positives and negatives, each closest-to-zero first, always taking
/// from the side that pulls the running total back towards zero. The
/// result only depends on the multiset of scores, and the running total
/// only leaves the `f64` range when the true sum does. Starts from `+0.0`,
/// so an empty list totals `0.0` and never `-0.0`.
fn list_total(scores: impl Iterator<Item = f64>) -> f64 {
    let (mut pos, mut neg): (Vec<f64>, Vec<f64>) = scores.partition(|s| *s >= 0.0);
    pos.sort_by(f64::total_cmp);
    neg.sort_by(|a, b| b.total_cmp(a));
    let (mut pos, mut neg) = (pos.into_iter(), neg.into_iter());

    let mut total = 0.0;
    loop {
        let next = if total > 0.0 {
            neg.next().or_else(|| pos.next())
        } else {
            pos.next().or_else(|| neg.next())
        };
        match next {
            Some(score) => total += score,
            None => return total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_each_list() {
        let mut ledger = ScoreLedger::new();
        ledger.add_short_term("taste", 8.0).unwrap();
        ledger.add_short_term("stress relief", 4.5).unwrap();
        let totals = ledger.add_long_term("health", -30.0).unwrap();

        assert_eq!(totals.short_total, 12.5);
        assert_eq!(totals.long_total, -30.0);
        assert_eq!(ledger.short_total(), 12.5);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn empty_ledger_totals_are_zero() {
        let ledger = ScoreLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.totals(), LedgerTotals::default());
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut ledger = ScoreLedger::new();
        ledger.add_short_term("first", 1.0).unwrap();
        ledger.add_short_term("second", 2.0).unwrap();
        ledger.add_friction("third", -1.0).unwrap();
        let names: Vec<_> = ledger.short_term().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn names_are_trimmed_and_blank_names_rejected() {
        let mut ledger = ScoreLedger::new();
        ledger.add_long_term("  money  ", -5.0).unwrap();
        assert_eq!(ledger.long_term()[0].name, "money");

        let err = ledger.add_long_term("   ", -5.0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyName {
                list: EntryList::LongTerm
            }
        );
        assert_eq!(ledger.long_term().len(), 1);
    }

    #[test]
    fn non_finite_scores_never_reach_a_total() {
        let mut ledger = ScoreLedger::new();
        ledger.add_short_term("ok", 3.0).unwrap();
        assert!(ledger.add_short_term("nan", f64::NAN).is_err());
        assert!(ledger.add_long_term("inf", f64::INFINITY).is_err());
        assert_eq!(ledger.short_total(), 3.0);
        assert_eq!(ledger.long_total(), 0.0);
    }

    #[test]
    fn overflowing_total_is_rejected_and_changes_nothing() {
        let mut ledger = ScoreLedger::new();
        ledger.add_short_term("huge", 1.7e308).unwrap();

        let err = ledger.add_short_term("huger", 1.7e308).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TotalOverflow {
                list: EntryList::ShortTerm
            }
        );
        assert_eq!(ledger.short_term().len(), 1);
        assert_eq!(ledger.short_total(), 1.7e308);

        ledger.add_long_term("deep", -1.7e308).unwrap();
        assert!(ledger.add_long_term("deeper", -1.7e308).is_err());
        assert_eq!(ledger.long_total(), -1.7e308);

        // Friction can still pull an extreme total back down.
        let totals = ledger.add_friction("lock it away", -1.7e308).unwrap();
        assert_eq!(totals.short_total, 0.0);
    }

    #[test]
    fn totals_do_not_depend_on_insertion_order() {
        let scores = [1.0e16, 1.0, -1.0e16, 0.1, 3.5];
        let mut forward = ScoreLedger::new();
        let mut backward = ScoreLedger::new();
        for (i, &score) in scores.iter().enumerate() {
            forward.add_short_term(&format!("f{i}"), score).unwrap();
        }
        for (i, &score) in scores.iter().rev().enumerate() {
            backward.add_short_term(&format!("b{i}"), score).unwrap();
        }
        assert_eq!(forward.short_total().to_bits(), backward.short_total().to_bits());
    }

    #[test]
    fn empty_totals_are_positive_zero() {
        let mut ledger = ScoreLedger::new();
        assert!(ledger.short_total().is_sign_positive());
        assert!(ledger.long_total().is_sign_positive());

        ledger.add_short_term("a", 2.0).unwrap();
        ledger.add_long_term("b", -2.0).unwrap();
        ledger.reset();
        assert!(ledger.short_total().is_sign_positive());
        assert!(ledger.long_total().is_sign_positive());
        assert_eq!(
            serde_json::to_string(&ledger.totals()).unwrap(),
            r#"{"short_total":0.0,"long_total":0.0}"#
        );
    }

    #[test]
    fn friction_must_be_negative() {
        let mut ledger = ScoreLedger::new();
        ledger.add_short_term("snack", 10.0).unwrap();

        let err = ledger.add_friction("snack", 5.0).unwrap_err();
        assert_eq!(err, ValidationError::NonNegativeFriction { score: 5.0 });
        assert!(ledger.add_friction("zero", 0.0).is_err());
        assert_eq!(ledger.short_total(), 10.0);

        let totals = ledger.add_friction("hide the snacks", -12.0).unwrap();
        assert_eq!(totals.short_total, -2.0);
    }

    #[test]
    fn stage_tag_does_not_change_totals() {
        let mut ledger = ScoreLedger::new();
        ledger
            .add(EntryList::ShortTerm, "phone on desk", 6.0, Some(LoopStage::Cue))
            .unwrap();
        assert_eq!(ledger.short_term()[0].stage, Some(LoopStage::Cue));
        assert_eq!(ledger.short_total(), 6.0);
    }

    #[test]
    fn parse_score_rejects_garbage() {
        assert_eq!(ScoreEntry::parse_score(" -4.5 "), Ok(-4.5));
        assert!(matches!(
            ScoreEntry::parse_score("lots"),
            Err(ValidationError::InvalidScore { .. })
        ));
        assert!(matches!(
            ScoreEntry::parse_score("NaN"),
            Err(ValidationError::NonFiniteScore { .. })
        ));
        assert!(ScoreEntry::parse_score("inf").is_err());
    }

    #[test]
    fn reset_clears_both_lists() {
        let mut ledger = ScoreLedger::new();
        ledger.add_short_term("a", 1.0).unwrap();
        ledger.add_long_term("b", -1.0).unwrap();
        ledger.reset();
        assert!(ledger.is_empty());
        assert_eq!(ledger.short_total(), 0.0);
        assert_eq!(ledger.long_total(), 0.0);
    }
}
