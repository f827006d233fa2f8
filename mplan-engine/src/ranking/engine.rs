//! Ranking Engine
//!
//! Scores every candidate with [`ScoreNormalizer`] and orders them:
//!
//! 1. Higher total score first
//! 2. Equal totals: higher `cultural` component score
//! 3. Then higher `health` component score
//! 4. Then original input order
//!
//! With an all-zero weight vector every total is 0.0 and input order stands.

use super::normalizer::{ComponentScoreSet, ScoreBreakdown, ScoreNormalizer};
use mplan_common::{Dimension, WeightVector};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Item to be ranked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    /// Missing or empty scores rank as 0.0 everywhere
    #[serde(default)]
    pub scores: ComponentScoreSet,
}

impl Candidate {
    pub fn new(id: impl Into<String>, scores: ComponentScoreSet) -> Self {
        Self {
            id: id.into(),
            scores,
        }
    }
}

/// One candidate with its score, explanation and 1-based rank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub candidate: Candidate,
    pub total_score: f64,
    pub explanation: String,
    pub rank: usize,
}

/// Candidate scored but not yet placed
struct Scored {
    index: usize,
    candidate: Candidate,
    breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Default)]
pub struct RankingEngine {
    normalizer: ScoreNormalizer,
}

impl RankingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score and order candidates; never fails
    pub fn rank(&self, weights: &WeightVector, candidates: Vec<Candidate>) -> Vec<RankedResult> {
        let degenerate = weights.is_degenerate();
        if degenerate {
            debug!("All preference weights are zero; keeping input order");
        }

        let mut scored: Vec<Scored> = candidates
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| {
                let breakdown = self.normalizer.score(weights, &candidate.scores);
                Scored {
                    index,
                    candidate,
                    breakdown,
                }
            })
            .collect();

        if degenerate {
            scored.sort_by_key(|s| s.index);
        } else {
            scored.sort_by(compare);
        }

        scored
            .into_iter()
            .enumerate()
            .map(|(position, s)| RankedResult {
                explanation: self.normalizer.explain(&s.breakdown),
                total_score: s.breakdown.total,
                candidate: s.candidate,
                rank: position + 1,
            })
            .collect()
    }
}

/// Total descending, then cultural, then health, then input order
fn compare(a: &Scored, b: &Scored) -> Ordering {
    b.breakdown
        .total
        .total_cmp(&a.breakdown.total)
        .then_with(|| component(b, Dimension::Cultural).total_cmp(&component(a, Dimension::Cultural)))
        .then_with(|| component(b, Dimension::Health).total_cmp(&component(a, Dimension::Health)))
        .then_with(|| a.index.cmp(&b.index))
}

fn component(s: &Scored, dimension: Dimension) -> f64 {
    s.candidate.scores.get(dimension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(results: &[RankedResult]) -> Vec<&str> {
        results.iter().map(|r| r.candidate.id.as_str()).collect()
    }

    #[test]
    fn test_ranks_are_one_based_and_sequential() {
        let engine = RankingEngine::new();
        let results = engine.rank(
            &WeightVector::BALANCED,
            vec![
                Candidate::new("a", ComponentScoreSet::new(0.1, 0.1, 0.1, 0.1, 0.1)),
                Candidate::new("b", ComponentScoreSet::new(0.9, 0.9, 0.9, 0.9, 0.9)),
                Candidate::new("c", ComponentScoreSet::new(0.5, 0.5, 0.5, 0.5, 0.5)),
            ],
        );
        assert_eq!(ids(&results), vec!["b", "c", "a"]);
        let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_health_breaks_tie_after_cultural() {
        let weights = WeightVector::ZERO.with(Dimension::Cost, 1.0);
        let results = RankingEngine::new().rank(
            &weights,
            vec![
                Candidate::new("low", ComponentScoreSet::new(0.5, 0.2, 0.4, 0.0, 0.0)),
                Candidate::new("high", ComponentScoreSet::new(0.5, 0.7, 0.4, 0.0, 0.0)),
            ],
        );
        assert_eq!(ids(&results), vec!["high", "low"]);
    }

    #[test]
    fn test_full_tie_keeps_input_order() {
        let scores = ComponentScoreSet::new(0.3, 0.3, 0.3, 0.3, 0.3);
        let results = RankingEngine::new().rank(
            &WeightVector::BALANCED,
            vec![
                Candidate::new("first", scores),
                Candidate::new("second", scores),
                Candidate::new("third", scores),
            ],
        );
        assert_eq!(ids(&results), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_zero_weights_keep_input_order() {
        let results = RankingEngine::new().rank(
            &WeightVector::ZERO,
            vec![
                Candidate::new("x", ComponentScoreSet::new(0.0, 0.0, 0.1, 0.0, 0.0)),
                Candidate::new("y", ComponentScoreSet::new(1.0, 1.0, 1.0, 1.0, 1.0)),
            ],
        );
        // Cultural would otherwise promote "y"
        assert_eq!(ids(&results), vec!["x", "y"]);
        assert!(results.iter().all(|r| r.total_score == 0.0));
    }

    #[test]
    fn test_empty_scores_are_ranked_not_rejected() {
        let candidate: Candidate = serde_json::from_str(r#"{"id": "bare"}"#).unwrap();
        let results = RankingEngine::new().rank(&WeightVector::BALANCED, vec![candidate]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].total_score, 0.0);
        assert_eq!(results[0].rank, 1);
    }

    #[test]
    fn test_no_candidates() {
        assert!(RankingEngine::new().rank(&WeightVector::BALANCED, Vec::new()).is_empty());
    }
}
