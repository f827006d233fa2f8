//! mplan-engine library interface
//!
//! Two engines live here:
//! - [`decoder`]: pulls validated meals out of a meal-plan JSON document
//!   while it is still being generated
//! - [`ranking`]: folds questionnaire answers into preference weights and
//!   ranks candidate meals against them

pub mod decoder;
pub mod error;
pub mod ranking;

pub use crate::decoder::{decode_stream, DecoderConfig, SessionState, StreamDecoder};
pub use crate::error::{DecodeError, QuestionnaireError};
pub use crate::ranking::{
    aggregate, Candidate, ComponentScoreSet, PreferenceAggregator, Questionnaire, RankedResult,
    RankingEngine, ScoreNormalizer, SelectionEvent,
};
