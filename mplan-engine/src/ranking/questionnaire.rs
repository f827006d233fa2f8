//! Preference questionnaire catalog
//!
//! Each question carries an influence; each option carries the partial
//! weights it contributes. Answering produces [`SelectionEvent`]s for the
//! aggregator.

use super::aggregator::{PreferenceAggregator, SelectionEvent};
use crate::error::QuestionnaireError;
use mplan_common::WeightVector;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// One selectable answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
    pub description: String,
    pub weights: HashMap<String, f64>,
}

impl QuestionOption {
    pub fn new(id: &str, label: &str, description: &str, weights: &[(&str, f64)]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            weights: weights
                .iter()
                .map(|(name, w)| (name.to_string(), *w))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    pub allow_multiple: bool,
    pub influence: f64,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn option(&self, id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Questionnaire {
    questions: Vec<Question>,
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The three-question profile used by the planner
    pub fn standard() -> Self {
        Self::new(vec![
            Question {
                id: "primary-focus".to_string(),
                title: "What's your main meal planning focus?".to_string(),
                allow_multiple: false,
                influence: 2.0,
                options: vec![
                    QuestionOption::new(
                        "budget",
                        "Budget-Friendly",
                        "Save money on groceries",
                        &[("cost", 0.8), ("health", 0.6), ("time", 0.5), ("variety", 0.4), ("cultural", 0.4)],
                    ),
                    QuestionOption::new(
                        "health",
                        "Health & Nutrition",
                        "Eat nutritious, balanced meals",
                        &[("health", 0.8), ("cost", 0.4), ("time", 0.5), ("variety", 0.6), ("cultural", 0.5)],
                    ),
                    QuestionOption::new(
                        "time",
                        "Quick & Easy",
                        "Spend less time cooking",
                        &[("time", 0.8), ("cost", 0.6), ("health", 0.5), ("variety", 0.4), ("cultural", 0.4)],
                    ),
                    QuestionOption::new(
                        "variety",
                        "Food Variety",
                        "Try new dishes and cuisines",
                        &[("variety", 0.8), ("cultural", 0.7), ("health", 0.6), ("cost", 0.4), ("time", 0.5)],
                    ),
                ],
            },
            Question {
                id: "lifestyle".to_string(),
                title: "Which describes your lifestyle best?".to_string(),
                allow_multiple: false,
                influence: 1.5,
                options: vec![
                    QuestionOption::new(
                        "busy-professional",
                        "Busy Professional",
                        "Long work days, little time to cook",
                        &[("time", 0.7), ("cost", 0.5), ("health", 0.6)],
                    ),
                    QuestionOption::new(
                        "health-focused",
                        "Health-Conscious",
                        "Fitness and nutrition come first",
                        &[("health", 0.8), ("variety", 0.6), ("cost", 0.4)],
                    ),
                    QuestionOption::new(
                        "budget-conscious",
                        "Budget-Conscious",
                        "Watching every grocery dollar",
                        &[("cost", 0.8), ("time", 0.6), ("health", 0.5)],
                    ),
                    QuestionOption::new(
                        "food-explorer",
                        "Food Explorer",
                        "Always looking for something new",
                        &[("variety", 0.8), ("cultural", 0.8), ("health", 0.5)],
                    ),
                ],
            },
            Question {
                id: "cooking-preferences".to_string(),
                title: "What's your cooking style?".to_string(),
                allow_multiple: true,
                influence: 0.5,
                options: vec![
                    QuestionOption::new(
                        "quick-meals",
                        "Quick 15-minute meals",
                        "In and out of the kitchen fast",
                        &[("time", 0.3)],
                    ),
                    QuestionOption::new(
                        "batch-cooking",
                        "Batch cooking/meal prep",
                        "Cook once, eat several times",
                        &[("time", 0.2), ("cost", 0.2)],
                    ),
                    QuestionOption::new(
                        "from-scratch",
                        "Cook from scratch",
                        "Whole ingredients, homemade everything",
                        &[("health", 0.3), ("cost", 0.1)],
                    ),
                    QuestionOption::new(
                        "cultural-dishes",
                        "Traditional cultural dishes",
                        "Recipes from a specific heritage",
                        &[("cultural", 0.3)],
                    ),
                ],
            },
        ])
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Turn `question id → selected option ids` into selection events
    ///
    /// Events come out in catalog order (question, then selection order);
    /// repeated option ids are collapsed. Unanswered questions contribute
    /// nothing.
    pub fn resolve(
        &self,
        answers: &BTreeMap<String, Vec<String>>,
    ) -> Result<Vec<SelectionEvent>, QuestionnaireError> {
        if let Some(unknown) = answers.keys().find(|id| self.question(id).is_none()) {
            return Err(QuestionnaireError::UnknownQuestion(unknown.clone()));
        }

        let mut events = Vec::new();
        for question in &self.questions {
            let Some(selected) = answers.get(&question.id) else {
                debug!("Question '{}' left unanswered", question.id);
                continue;
            };

            let mut chosen: Vec<&str> = Vec::with_capacity(selected.len());
            for option_id in selected {
                if !chosen.contains(&option_id.as_str()) {
                    chosen.push(option_id);
                }
            }
            if chosen.len() > 1 && !question.allow_multiple {
                return Err(QuestionnaireError::SingleSelectOnly(question.id.clone()));
            }

            for option_id in chosen {
                let option = question
                    .option(option_id)
                    .ok_or_else(|| QuestionnaireError::UnknownOption {
                        question_id: question.id.clone(),
                        option_id: option_id.to_string(),
                    })?;
                events.push(SelectionEvent {
                    question_id: question.id.clone(),
                    option_id: option.id.clone(),
                    partial_weights: option.weights.clone(),
                    influence: question.influence,
                });
            }
        }

        Ok(events)
    }

    /// Resolve answers and fold them into a weight vector
    pub fn aggregate(
        &self,
        answers: &BTreeMap<String, Vec<String>>,
    ) -> Result<WeightVector, QuestionnaireError> {
        let events = self.resolve(answers)?;
        let mut aggregator = PreferenceAggregator::new();
        aggregator.extend(&events);
        Ok(aggregator.weights())
    }
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mplan_common::Dimension;

    fn answers(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(q, opts)| (q.to_string(), opts.iter().map(|o| o.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_standard_catalog_shape() {
        let catalog = Questionnaire::standard();
        assert_eq!(catalog.questions().len(), 3);
        assert_eq!(catalog.question("primary-focus").unwrap().influence, 2.0);
        assert!(catalog.question("cooking-preferences").unwrap().allow_multiple);
        assert!(!catalog.question("lifestyle").unwrap().allow_multiple);
    }

    #[test]
    fn test_resolve_in_catalog_order() {
        let catalog = Questionnaire::standard();
        let events = catalog
            .resolve(&answers(&[
                ("cooking-preferences", &["quick-meals", "quick-meals", "cultural-dishes"]),
                ("primary-focus", &["variety"]),
            ]))
            .unwrap();
        let order: Vec<&str> = events.iter().map(|e| e.option_id.as_str()).collect();
        assert_eq!(order, vec!["variety", "quick-meals", "cultural-dishes"]);
        assert_eq!(events[1].influence, 0.5);
    }

    #[test]
    fn test_single_select_rejects_two_answers() {
        let err = Questionnaire::standard()
            .resolve(&answers(&[("lifestyle", &["food-explorer", "busy-professional"])]))
            .unwrap_err();
        assert_eq!(err, QuestionnaireError::SingleSelectOnly("lifestyle".to_string()));
    }

    #[test]
    fn test_unknown_question_and_option() {
        let catalog = Questionnaire::standard();
        assert_eq!(
            catalog.resolve(&answers(&[("diet", &["vegan"])])).unwrap_err(),
            QuestionnaireError::UnknownQuestion("diet".to_string())
        );
        assert_eq!(
            catalog.resolve(&answers(&[("lifestyle", &["astronaut"])])).unwrap_err(),
            QuestionnaireError::UnknownOption {
                question_id: "lifestyle".to_string(),
                option_id: "astronaut".to_string(),
            }
        );
    }

    #[test]
    fn test_aggregate_single_focus() {
        let weights = Questionnaire::standard()
            .aggregate(&answers(&[("primary-focus", &["budget"])]))
            .unwrap();
        assert!((weights.get(Dimension::Cost) - 0.8).abs() < 1e-12);
        assert!((weights.get(Dimension::Cultural) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_no_answers_is_balanced() {
        let weights = Questionnaire::standard().aggregate(&BTreeMap::new()).unwrap();
        assert_eq!(weights, WeightVector::BALANCED);
    }
}
