//! Streaming meal-plan decoder
//!
//! A [`StreamDecoder`] owns one generation session: the append-only text
//! buffer, the set of meal keys already emitted, and the meals decoded so far.
//! Every `feed` re-scans the whole buffer for closed meal objects and emits the
//! ones it has not emitted before.
//!
//! Lifecycle: `Streaming` → (`finish`) → `Complete` | `Failed`, or
//! `Streaming` → (`cancel`) → `Cancelled`. Terminal sessions accept no input.

mod scanner;
mod schema;
mod stream;
mod utf8;

pub use scanner::{scan_meal_spans, MealSpan};
pub use schema::{decode_meal, validate_document, validate_meal, SpanError};
pub use stream::decode_stream;

use crate::error::DecodeError;
use chrono::{DateTime, Utc};
use mplan_common::config::DecoderSettings;
use mplan_common::{DecoderEvent, MealDraft, MealKey, SessionSummary};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};
use utf8::Utf8Carry;
use uuid::Uuid;

/// Plans cover at most one week
const DEFAULT_MAX_DAYS: u32 = 7;

/// Per-session decoder limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// `day_<n>` sections above this are ignored
    pub max_days: u32,
    /// Meals the plan should contain, for progress reporting
    pub expected_meals: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_days: DEFAULT_MAX_DAYS,
            expected_meals: None,
        }
    }
}

impl DecoderConfig {
    /// Config for a plan of `days` days with `meals_per_day` meals each
    pub fn for_plan(days: u32, meals_per_day: u32) -> Self {
        Self {
            max_days: days.max(1),
            expected_meals: Some(days as usize * meals_per_day as usize),
        }
    }

    pub fn from_settings(settings: &DecoderSettings) -> Self {
        Self {
            max_days: settings.max_days.max(1),
            expected_meals: settings
                .meals_per_day
                .map(|per_day| settings.max_days as usize * per_day as usize),
        }
    }
}

/// Decoding session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Streaming,
    Complete,
    Failed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        self != Self::Streaming
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Streaming => "streaming",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// One decoding session over one meal-plan document
///
/// Chunk boundaries carry no meaning; a chunk may end mid-token or
/// mid-string. Partial input is never an error.
#[derive(Debug)]
pub struct StreamDecoder {
    session_id: Uuid,
    config: DecoderConfig,
    buffer: String,
    utf8: Utf8Carry,
    seen: HashSet<MealKey>,
    /// `(key, span start)` pairs already reported as schema violations
    rejected: HashSet<(MealKey, usize)>,
    meals: Vec<(MealKey, MealDraft)>,
    state: SessionState,
    started_at: DateTime<Utc>,
}

impl StreamDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        let session_id = Uuid::new_v4();
        info!(
            "Decoder session {} started (max_days={}, expected_meals={:?})",
            session_id, config.max_days, config.expected_meals
        );
        Self {
            session_id,
            config,
            buffer: String::new(),
            utf8: Utf8Carry::default(),
            seen: HashSet::new(),
            rejected: HashSet::new(),
            meals: Vec::new(),
            state: SessionState::Streaming,
            started_at: Utc::now(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Bytes currently held in the buffer
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Meals decoded so far, in emission order
    pub fn meals(&self) -> &[(MealKey, MealDraft)] {
        &self.meals
    }

    /// Fraction of expected meals emitted, when the plan size is known
    pub fn progress(&self) -> Option<f64> {
        self.config
            .expected_meals
            .filter(|expected| *expected > 0)
            .map(|expected| (self.meals.len() as f64 / expected as f64).min(1.0))
    }

    /// Append a text chunk and emit any meals it completes
    pub fn feed(&mut self, chunk: &str) -> Result<Vec<DecoderEvent>, DecodeError> {
        self.ensure_streaming()?;
        if chunk.is_empty() {
            return Ok(Vec::new());
        }
        self.buffer.push_str(chunk);
        Ok(self.scan())
    }

    /// Append raw transport bytes; a split trailing character waits for the
    /// next chunk
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Vec<DecoderEvent>, DecodeError> {
        self.ensure_streaming()?;
        let text = self.utf8.push(bytes);
        if text.is_empty() {
            return Ok(Vec::new());
        }
        self.buffer.push_str(&text);
        Ok(self.scan())
    }

    /// Final scan over the buffer without ending the session
    ///
    /// `finish` runs this itself. Calling it first lets the caller observe
    /// late meals even when the document then turns out to be malformed.
    pub fn reconcile(&mut self) -> Result<Vec<DecoderEvent>, DecodeError> {
        self.ensure_streaming()?;
        if let Some(replacement) = self.utf8.finish() {
            self.buffer.push(replacement);
        }
        Ok(self.scan())
    }

    /// End the session: reconcile, then validate the whole document
    ///
    /// On success the returned events end with `SessionComplete`. A buffer that
    /// is not a complete meal-plan document yields `MalformedDocument`. Either
    /// way the buffer is discarded and the session becomes terminal.
    pub fn finish(&mut self) -> Result<Vec<DecoderEvent>, DecodeError> {
        let mut events = self.reconcile()?;

        let outcome = validate_document(&self.buffer);
        let bytes_consumed = self.buffer.len();
        self.release_buffer();

        match outcome {
            Ok(()) => {
                self.state = SessionState::Complete;
                let summary = SessionSummary {
                    session_id: self.session_id,
                    meals_emitted: self.meals.len(),
                    meals_rejected: self.rejected.len(),
                    bytes_consumed,
                    started_at: self.started_at,
                    finished_at: Utc::now(),
                };
                info!(
                    "Decoder session {} complete: {} meals, {} rejected, {} bytes",
                    self.session_id, summary.meals_emitted, summary.meals_rejected, bytes_consumed
                );
                events.push(DecoderEvent::SessionComplete { summary });
                Ok(events)
            }
            Err(reason) => {
                self.state = SessionState::Failed;
                warn!(
                    "Decoder session {} failed after {} bytes: {}",
                    self.session_id, bytes_consumed, reason
                );
                Err(DecodeError::MalformedDocument { reason })
            }
        }
    }

    /// Abandon the session, discarding all session state
    ///
    /// Returns `SessionCancelled`, or `None` if the session had already ended.
    pub fn cancel(&mut self) -> Option<DecoderEvent> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = SessionState::Cancelled;
        self.release_buffer();
        self.rejected.clear();
        self.meals.clear();
        info!("Decoder session {} cancelled", self.session_id);
        Some(DecoderEvent::SessionCancelled {
            session_id: self.session_id,
        })
    }

    fn ensure_streaming(&self) -> Result<(), DecodeError> {
        if self.state.is_terminal() {
            return Err(DecodeError::SessionClosed { state: self.state });
        }
        Ok(())
    }

    fn release_buffer(&mut self) {
        self.buffer = String::new();
        self.utf8.clear();
        self.seen = HashSet::new();
    }

    fn scan(&mut self) -> Vec<DecoderEvent> {
        let mut events = Vec::new();

        for span in scan_meal_spans(&self.buffer, self.config.max_days) {
            if self.seen.contains(&span.key) || self.rejected.contains(&(span.key, span.start)) {
                continue;
            }

            match decode_meal(&self.buffer[span.start..span.end]) {
                Ok(meal) => {
                    debug!(
                        "Session {}: decoded {} '{}'",
                        self.session_id, span.key, meal.title
                    );
                    self.seen.insert(span.key);
                    self.meals.push((span.key, meal.clone()));
                    events.push(DecoderEvent::MealDecoded {
                        key: span.key,
                        meal,
                    });
                }
                Err(SpanError::Syntax(e)) => {
                    debug!(
                        "Session {}: span for {} not parseable yet: {}",
                        self.session_id, span.key, e
                    );
                }
                Err(SpanError::Schema(reason)) => {
                    warn!(
                        "Session {}: dropping {}: {}",
                        self.session_id, span.key, reason
                    );
                    self.rejected.insert((span.key, span.start));
                    events.push(DecoderEvent::MealRejected {
                        key: span.key,
                        reason,
                    });
                }
            }
        }

        events
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mplan_common::MealType;

    fn meal_json(title: &str) -> String {
        format!(
            r#"{{"title": "{}", "cook_time_minutes": 10, "difficulty": 1, "ingredients": ["x"], "instructions": ["y"], "nutrition": {{"calories": 100, "protein_g": 5, "carbs_g": 10, "fat_g": 3}}}}"#,
            title
        )
    }

    #[test]
    fn test_progress_against_expected_meals() {
        let mut decoder = StreamDecoder::new(DecoderConfig::for_plan(1, 2));
        assert_eq!(decoder.progress(), Some(0.0));

        let doc = format!(r#"{{"meal_plan": {{"day_1": {{"breakfast": {}"#, meal_json("Toast"));
        decoder.feed(&doc).unwrap();
        assert_eq!(decoder.progress(), Some(0.5));
    }

    #[test]
    fn test_progress_unknown_without_plan_size() {
        assert_eq!(StreamDecoder::default().progress(), None);
    }

    #[test]
    fn test_rejection_reported_once_per_span() {
        let mut decoder = StreamDecoder::default();
        let bad = meal_json("Toast").replace("\"difficulty\": 1", "\"difficulty\": 9");
        let events = decoder
            .feed(&format!(r#"{{"meal_plan": {{"day_1": {{"lunch": {}"#, bad))
            .unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DecoderEvent::MealRejected { .. }));

        // Later chunks re-scan the same span without repeating the warning
        let events = decoder.feed(", ").unwrap();
        assert!(events.is_empty());

        // A later, valid object for the same key is still accepted
        let events = decoder
            .feed(&format!(r#""lunch": {}"#, meal_json("Soup")))
            .unwrap();
        assert_eq!(events.len(), 1);
        let (key, meal) = events[0].as_meal().unwrap();
        assert_eq!(*key, MealKey::new(1, MealType::Lunch));
        assert_eq!(meal.title, "Soup");
    }

    #[test]
    fn test_cancel_discards_state_and_closes_session() {
        let mut decoder = StreamDecoder::default();
        decoder
            .feed(&format!(r#"{{"meal_plan": {{"day_1": {{"dinner": {}"#, meal_json("Stew")))
            .unwrap();
        assert_eq!(decoder.meals().len(), 1);

        let event = decoder.cancel().unwrap();
        assert!(matches!(event, DecoderEvent::SessionCancelled { .. }));
        assert_eq!(decoder.state(), SessionState::Cancelled);
        assert_eq!(decoder.buffered_len(), 0);
        assert!(decoder.meals().is_empty());
        assert!(decoder.cancel().is_none());
        assert_eq!(
            decoder.feed("}").unwrap_err(),
            DecodeError::SessionClosed {
                state: SessionState::Cancelled
            }
        );
    }

    #[test]
    fn test_from_settings() {
        let settings = DecoderSettings {
            max_days: 3,
            meals_per_day: Some(4),
        };
        let config = DecoderConfig::from_settings(&settings);
        assert_eq!(config.max_days, 3);
        assert_eq!(config.expected_meals, Some(12));
    }
}
