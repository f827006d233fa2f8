//! Score Normalizer - Weighted Mean + Explanation
//!
//! total = Σ weight[d] × score[d] / Σ weight[d], in [0.0, 1.0]
//!
//! An all-zero weight vector scores every candidate 0.0.

use mplan_common::weights::unit_clamp;
use mplan_common::{Dimension, WeightVector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Dimensions named in an explanation, at most
const EXPLAINED_DIMENSIONS: usize = 2;

/// Raw per-dimension scores for one candidate
///
/// Deserializes from a `name → score` map. Missing dimensions are 0.0,
/// unknown names are ignored, and scores are clamped into `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "HashMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct ComponentScoreSet {
    values: [f64; 5],
}

impl ComponentScoreSet {
    pub fn new(cost: f64, health: f64, cultural: f64, variety: f64, time: f64) -> Self {
        Self {
            values: [
                unit_clamp(cost),
                unit_clamp(health),
                unit_clamp(cultural),
                unit_clamp(variety),
                unit_clamp(time),
            ],
        }
    }

    /// No scores at all; ranks as 0.0 everywhere
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.values[dimension.index()]
    }

    pub fn with(mut self, dimension: Dimension, score: f64) -> Self {
        self.values[dimension.index()] = unit_clamp(score);
        self
    }
}

impl From<HashMap<String, f64>> for ComponentScoreSet {
    fn from(named: HashMap<String, f64>) -> Self {
        named
            .into_iter()
            .filter_map(|(name, score)| name.parse::<Dimension>().ok().map(|d| (d, score)))
            .fold(Self::empty(), |set, (d, score)| set.with(d, score))
    }
}

impl From<ComponentScoreSet> for BTreeMap<String, f64> {
    fn from(set: ComponentScoreSet) -> Self {
        Dimension::ALL
            .iter()
            .map(|d| (d.as_str().to_string(), set.get(*d)))
            .collect()
    }
}

/// Result of scoring one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Weighted mean in `[0.0, 1.0]`
    pub total: f64,
    /// weight[d] × score[d]
    contributions: [f64; 5],
}

impl ScoreBreakdown {
    pub fn contribution(&self, dimension: Dimension) -> f64 {
        self.contributions[dimension.index()]
    }

    /// Fraction of the total contributed by one dimension
    pub fn share(&self, dimension: Dimension) -> f64 {
        let sum: f64 = self.contributions.iter().sum();
        if sum > 0.0 {
            self.contribution(dimension) / sum
        } else {
            0.0
        }
    }

    /// Up to `limit` contributing dimensions, largest share first
    ///
    /// Equal contributions keep canonical dimension order.
    pub fn dominant(&self, limit: usize) -> Vec<(Dimension, f64)> {
        let mut ranked: Vec<Dimension> = Dimension::ALL
            .iter()
            .copied()
            .filter(|d| self.contribution(*d) > 0.0)
            .collect();
        ranked.sort_by(|a, b| self.contribution(*b).total_cmp(&self.contribution(*a)));
        ranked
            .into_iter()
            .take(limit)
            .map(|d| (d, self.share(d)))
            .collect()
    }
}

/// Combines a weight vector with component scores
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreNormalizer;

impl ScoreNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Weighted mean of the component scores
    pub fn score(&self, weights: &WeightVector, scores: &ComponentScoreSet) -> ScoreBreakdown {
        let mut contributions = [0.0; 5];
        for (dimension, weight) in weights.iter() {
            contributions[dimension.index()] = weight * scores.get(dimension);
        }

        let weight_sum = weights.sum();
        let total = if weight_sum > 0.0 {
            contributions.iter().sum::<f64>() / weight_sum
        } else {
            0.0
        };

        ScoreBreakdown {
            total: total.clamp(0.0, 1.0),
            contributions,
        }
    }

    /// Short human-readable justification for a score
    ///
    /// Names the (at most two) dimensions with the largest weighted share,
    /// with rounded percentages. Pure function of the breakdown.
    pub fn explain(&self, breakdown: &ScoreBreakdown) -> String {
        let dominant = breakdown.dominant(EXPLAINED_DIMENSIONS);
        let percent = |share: f64| (share * 100.0).round() as u32;

        match dominant.as_slice() {
            [] => "No weighted criteria contributed to this score".to_string(),
            [(only, share)] => format!(
                "Driven by {} ({}% of score)",
                only.describe(),
                percent(*share)
            ),
            [(first, first_share), (second, second_share), ..] => format!(
                "Strongest on {} ({}%) and {} ({}%)",
                first.describe(),
                percent(*first_share),
                second.describe(),
                percent(*second_share)
            ),
        }
    }
}
