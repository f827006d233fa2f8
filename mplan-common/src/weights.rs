//! Preference weight vectors
//!
//! A [`WeightVector`] carries one weight per [`Dimension`]. Every weight is
//! kept inside `[0.0, 1.0]`: constructors clamp, they never rescale. The
//! weights are not required to sum to 1.0.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Ranking dimension shared by the aggregator and the ranking engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Cost,
    Health,
    Cultural,
    Variety,
    Time,
}

impl Dimension {
    /// All dimensions in canonical order
    pub const ALL: [Dimension; 5] = [
        Dimension::Cost,
        Dimension::Health,
        Dimension::Cultural,
        Dimension::Variety,
        Dimension::Time,
    ];

    /// Wire name (`"cost"`, `"health"`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Health => "health",
            Self::Cultural => "cultural",
            Self::Variety => "variety",
            Self::Time => "time",
        }
    }

    /// Phrase used when a dimension is named in a ranking explanation
    pub fn describe(self) -> &'static str {
        match self {
            Self::Cost => "budget",
            Self::Health => "health",
            Self::Cultural => "cultural fit",
            Self::Variety => "variety",
            Self::Time => "cooking time",
        }
    }

    /// Position in [`Dimension::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cost" => Ok(Self::Cost),
            "health" => Ok(Self::Health),
            "cultural" => Ok(Self::Cultural),
            "variety" => Ok(Self::Variety),
            "time" => Ok(Self::Time),
            other => Err(Error::InvalidInput(format!("unknown dimension '{}'", other))),
        }
    }
}

/// Clamp a raw value into `[0.0, 1.0]`, mapping NaN and infinities to 0.0
pub fn unit_clamp(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Five bounded preference weights
///
/// Missing dimensions in serialized input deserialize as 0.0; unknown keys are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "WeightVectorRepr", into = "WeightVectorRepr")]
pub struct WeightVector {
    values: [f64; 5],
}

/// Named-field wire form of [`WeightVector`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct WeightVectorRepr {
    #[serde(default)]
    cost: f64,
    #[serde(default)]
    health: f64,
    #[serde(default)]
    cultural: f64,
    #[serde(default)]
    variety: f64,
    #[serde(default)]
    time: f64,
}

impl From<WeightVectorRepr> for WeightVector {
    fn from(repr: WeightVectorRepr) -> Self {
        Self::new(repr.cost, repr.health, repr.cultural, repr.variety, repr.time)
    }
}

impl From<WeightVector> for WeightVectorRepr {
    fn from(w: WeightVector) -> Self {
        Self {
            cost: w.get(Dimension::Cost),
            health: w.get(Dimension::Health),
            cultural: w.get(Dimension::Cultural),
            variety: w.get(Dimension::Variety),
            time: w.get(Dimension::Time),
        }
    }
}

impl WeightVector {
    /// Every dimension at 0.5; the fallback when no preferences are known
    pub const BALANCED: WeightVector = WeightVector { values: [0.5; 5] };

    /// Every dimension at 0.0 (degenerate; ranks by input order)
    pub const ZERO: WeightVector = WeightVector { values: [0.0; 5] };

    /// Build a vector, clamping each weight into `[0.0, 1.0]`
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

    /// Build a vector from `name → weight` pairs
    ///
    /// Unknown dimension names are ignored; absent dimensions are 0.0.
    pub fn from_named(weights: &HashMap<String, f64>) -> Self {
        let mut vector = Self::ZERO;
        for (name, value) in weights {
            if let Ok(dimension) = name.parse::<Dimension>() {
                vector = vector.with(dimension, *value);
            }
        }
        vector
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.values[dimension.index()]
    }

    /// Copy of this vector with one dimension replaced (clamped)
    pub fn with(mut self, dimension: Dimension, value: f64) -> Self {
        self.values[dimension.index()] = unit_clamp(value);
        self
    }

    /// Sum of all five weights
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// True when no dimension carries any weight
    pub fn is_degenerate(&self) -> bool {
        self.sum() == 0.0
    }

    /// `(dimension, weight)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.iter().map(move |d| (*d, self.get(*d)))
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::BALANCED
    }
}

/// Coarse label for a single weight, as shown next to a preference slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeightLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl WeightLevel {
    pub fn of(weight: f64) -> Self {
        if weight >= 0.8 {
            Self::VeryHigh
        } else if weight >= 0.6 {
            Self::High
        } else if weight >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for WeightLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
