//! Meal records produced by the stream decoder

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meal slot within a plan day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    /// Exact-match lookup of a JSON object key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == key)
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s.trim())
            .ok_or_else(|| Error::InvalidInput(format!("unknown meal type '{}'", s)))
    }
}

/// Identity of one meal within a plan: `(day ≥ 1, meal type)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MealKey {
    pub day: u32,
    pub meal_type: MealType,
}

impl MealKey {
    pub fn new(day: u32, meal_type: MealType) -> Self {
        Self { day, meal_type }
    }

    /// Parse a `day_<n>` section key; `n` must be a positive integer
    pub fn parse_day(key: &str) -> Option<u32> {
        let digits = key.strip_prefix("day_")?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u32>().ok().filter(|day| *day >= 1)
    }
}

impl fmt::Display for MealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day_{}.{}", self.day, self.meal_type)
    }
}

/// Macronutrient breakdown for one serving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

/// A fully validated meal record
///
/// Only constructed once every field has type-checked; string fields hold the
/// decoded JSON text unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealDraft {
    pub title: String,
    pub cook_time_minutes: u32,
    /// 1 (easiest) to 5 (hardest)
    pub difficulty: u8,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub nutrition: Nutrition,
}
