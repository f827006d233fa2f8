//! Error types for mplan-engine

use crate::decoder::SessionState;
use thiserror::Error;

/// Errors that end a decoding session
///
/// Partial input and per-meal schema violations are not errors; see
/// [`crate::decoder::StreamDecoder`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The finished buffer is not a well-formed meal-plan document
    #[error("Malformed document: {reason}")]
    MalformedDocument { reason: String },

    /// Input arrived after the session reached a terminal state
    #[error("Decoding session is {state}; no further input accepted")]
    SessionClosed { state: SessionState },

    /// The chunk source failed before the document was complete
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors resolving questionnaire answers or presets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionnaireError {
    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Unknown option '{option_id}' for question '{question_id}'")]
    UnknownOption {
        question_id: String,
        option_id: String,
    },

    /// Several options were selected on a single-select question
    #[error("Question '{0}' allows only one selection")]
    SingleSelectOnly(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}
