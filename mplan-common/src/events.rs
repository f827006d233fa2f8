//! Event types emitted by a decoding session
//!
//! Events serialize with an internal `"type"` tag so they can be written out
//! one JSON object per line.

use crate::meal::{MealDraft, MealKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decoder output events
///
/// A session produces any number of `MealDecoded` / `MealRejected` events and
/// ends with exactly one of `SessionComplete` or `SessionCancelled` (or a
/// decode error, which is not an event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DecoderEvent {
    /// A meal object closed and passed validation
    ///
    /// Emitted at most once per key per session.
    MealDecoded {
        key: MealKey,
        meal: MealDraft,
    },

    /// A closed meal object failed validation and was dropped
    ///
    /// Warning-level signal only; the session carries on.
    MealRejected {
        key: MealKey,
        reason: String,
    },

    /// The document was complete and well formed
    SessionComplete {
        summary: SessionSummary,
    },

    /// The caller abandoned the session
    SessionCancelled {
        session_id: Uuid,
    },
}

impl DecoderEvent {
    /// The decoded meal, if this is a `MealDecoded` event
    pub fn as_meal(&self) -> Option<(&MealKey, &MealDraft)> {
        match self {
            Self::MealDecoded { key, meal } => Some((key, meal)),
            _ => None,
        }
    }

    /// True for `SessionComplete` and `SessionCancelled`
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SessionComplete { .. } | Self::SessionCancelled { .. }
        )
    }
}

/// Totals reported when a session completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub meals_emitted: usize,
    pub meals_rejected: usize,
    /// Length of the final buffer in bytes
    pub bytes_consumed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
