//! Preference Aggregator - Influence-Weighted Averaging
//!
//! Folds questionnaire selections into one [`WeightVector`]:
//!
//! ```text
//! weight[d] = clamp( Σ partial[d] × influence  /  Σ influence , 0, 1 )
//! ```
//!
//! Influence is added to the denominator once per event, however many
//! dimensions that event touches. With no influence at all the result is
//! [`WeightVector::BALANCED`].

use mplan_common::{Dimension, WeightVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One questionnaire answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub question_id: String,
    pub option_id: String,
    /// Dimension name → contribution; unknown names are ignored
    #[serde(default)]
    pub partial_weights: HashMap<String, f64>,
    /// How strongly this answer counts relative to others (> 0)
    pub influence: f64,
}

impl SelectionEvent {
    pub fn new(question_id: impl Into<String>, option_id: impl Into<String>, influence: f64) -> Self {
        Self {
            question_id: question_id.into(),
            option_id: option_id.into(),
            partial_weights: HashMap::new(),
            influence,
        }
    }

    /// Builder-style helper to add one partial weight
    pub fn with_weight(mut self, dimension: impl Into<String>, contribution: f64) -> Self {
        self.partial_weights.insert(dimension.into(), contribution);
        self
    }
}

/// Running per-dimension accumulator
///
/// Events can be pushed one at a time and the weights read at any point.
#[derive(Debug, Clone, Default)]
pub struct PreferenceAggregator {
    accumulator: [f64; 5],
    total_influence: f64,
    events: usize,
}

impl PreferenceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the running totals
    ///
    /// Events with a non-positive or non-finite influence are skipped.
    pub fn push(&mut self, event: &SelectionEvent) {
        if !(event.influence.is_finite() && event.influence > 0.0) {
            warn!(
                "Skipping selection {}/{}: influence {} is not positive",
                event.question_id, event.option_id, event.influence
            );
            return;
        }

        for (name, contribution) in &event.partial_weights {
            let Ok(dimension) = name.parse::<Dimension>() else {
                debug!("Ignoring unknown dimension '{}' in {}", name, event.option_id);
                continue;
            };
            if !contribution.is_finite() {
                continue;
            }
            self.accumulator[dimension.index()] += contribution * event.influence;
        }

        self.total_influence += event.influence;
        self.events += 1;
    }

    pub fn total_influence(&self) -> f64 {
        self.total_influence
    }

    /// Number of events that were folded in
    pub fn len(&self) -> usize {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events == 0
    }

    /// Current normalized weights
    pub fn weights(&self) -> WeightVector {
        if self.total_influence == 0.0 {
            return WeightVector::BALANCED;
        }
        let normalized = |d: Dimension| self.accumulator[d.index()] / self.total_influence;
        WeightVector::new(
            normalized(Dimension::Cost),
            normalized(Dimension::Health),
            normalized(Dimension::Cultural),
            normalized(Dimension::Variety),
            normalized(Dimension::Time),
        )
    }
}

impl<'a> Extend<&'a SelectionEvent> for PreferenceAggregator {
    fn extend<I: IntoIterator<Item = &'a SelectionEvent>>(&mut self, iter: I) {
        for event in iter {
            self.push(event);
        }
    }
}

/// Aggregate a full sequence of selections; never fails
pub fn aggregate(events: &[SelectionEvent]) -> WeightVector {
    let mut aggregator = PreferenceAggregator::new();
    aggregator.extend(events);
    aggregator.weights()
}
