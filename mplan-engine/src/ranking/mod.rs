//! Preference aggregation and candidate ranking
//!
//! Questionnaire answers → [`SelectionEvent`]s → [`PreferenceAggregator`] →
//! [`WeightVector`](mplan_common::WeightVector) → [`RankingEngine`] (built on
//! [`ScoreNormalizer`]) → ordered [`RankedResult`]s.

mod aggregator;
mod engine;
mod normalizer;
mod presets;
mod questionnaire;

pub use aggregator::{aggregate, PreferenceAggregator, SelectionEvent};
pub use engine::{Candidate, RankedResult, RankingEngine};
pub use normalizer::{ComponentScoreSet, ScoreBreakdown, ScoreNormalizer};
pub use presets::{find_preset, presets, PresetScenario};
pub use questionnaire::{Question, QuestionOption, Questionnaire};
