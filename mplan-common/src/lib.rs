//! # Meal Plan Common Library
//!
//! Shared code for the meal-plan engine crates including:
//! - Preference weight vectors (WeightVector, Dimension)
//! - Meal record types produced by the stream decoder
//! - Decoder event types (DecoderEvent enum)
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod meal;
pub mod weights;

pub use error::{Error, Result};
pub use events::{DecoderEvent, SessionSummary};
pub use meal::{MealDraft, MealKey, MealType, Nutrition};
pub use weights::{Dimension, WeightLevel, WeightVector};
