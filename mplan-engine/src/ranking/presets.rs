//! Preset preference scenarios

use crate::error::QuestionnaireError;
use mplan_common::WeightVector;
use serde::Serialize;

/// A named, ready-made weight vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetScenario {
    pub name: &'static str,
    pub description: &'static str,
    pub weights: WeightVector,
}

impl PresetScenario {
    /// Lowercase, dash-separated form of the name ("budget-family")
    pub fn slug(&self) -> String {
        self.name
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// All built-in presets
pub fn presets() -> Vec<PresetScenario> {
    vec![
        PresetScenario {
            name: "Budget Family",
            description: "Large family, tight budget, need quick meals",
            weights: WeightVector::new(0.8, 0.6, 0.4, 0.4, 0.7),
        },
        PresetScenario {
            name: "Health Enthusiast",
            description: "Prioritize nutrition, willing to spend time/money",
            weights: WeightVector::new(0.3, 0.9, 0.6, 0.7, 0.4),
        },
        PresetScenario {
            name: "Busy Professional",
            description: "Limited time, decent budget, want convenience",
            weights: WeightVector::new(0.5, 0.6, 0.4, 0.5, 0.8),
        },
        PresetScenario {
            name: "Cultural Explorer",
            description: "Love trying different cuisines and flavors",
            weights: WeightVector::new(0.5, 0.6, 0.8, 0.8, 0.5),
        },
        PresetScenario {
            name: "Balanced Approach",
            description: "Want equal consideration of all factors",
            weights: WeightVector::BALANCED,
        },
    ]
}

/// Look up a preset by display name or slug, case-insensitively
pub fn find_preset(name: &str) -> Result<PresetScenario, QuestionnaireError> {
    let wanted = name.trim();
    presets()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted) || p.slug().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| QuestionnaireError::UnknownPreset(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mplan_common::Dimension;

    #[test]
    fn test_lookup_by_name_and_slug() {
        let by_name = find_preset("Cultural Explorer").unwrap();
        let by_slug = find_preset("cultural-explorer").unwrap();
        assert_eq!(by_name, by_slug);
        assert_eq!(by_name.weights.get(Dimension::Cultural), 0.8);
    }

    #[test]
    fn test_unknown_preset() {
        assert_eq!(
            find_preset("keto"),
            Err(QuestionnaireError::UnknownPreset("keto".to_string()))
        );
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut slugs: Vec<String> = presets().iter().map(PresetScenario::slug).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), presets().len());
    }
}
