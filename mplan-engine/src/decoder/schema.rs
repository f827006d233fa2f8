//! Meal and document validation
//!
//! Closed spans are parsed into `serde_json::Value` first and then checked
//! field by field, so a rejection can say exactly which field was wrong.

use mplan_common::{MealDraft, MealKey, Nutrition};
use serde_json::{Map, Value};

/// Nutrition may arrive under either key; the first present, non-null one wins
const NUTRITION_KEYS: [&str; 2] = ["nutrition", "nutrition_info"];

/// Why a closed span did not become a meal
#[derive(Debug)]
pub enum SpanError {
    /// Not valid JSON (yet); retried on the next scan
    Syntax(serde_json::Error),
    /// Valid JSON that fails the meal schema
    Schema(String),
}

/// Parse and validate one closed meal object
pub fn decode_meal(span: &str) -> Result<MealDraft, SpanError> {
    let value: Value = serde_json::from_str(span).map_err(SpanError::Syntax)?;
    validate_meal(&value).map_err(SpanError::Schema)
}

/// Check a parsed meal object against the meal schema
pub fn validate_meal(value: &Value) -> Result<MealDraft, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "meal is not a JSON object".to_string())?;

    let title = required_str(obj, "title")?;
    if title.trim().is_empty() {
        return Err("field 'title' is empty".to_string());
    }

    let cook_time_minutes = required_u32(obj, "cook_time_minutes")?;

    let difficulty = required_u32(obj, "difficulty")?;
    if !(1..=5).contains(&difficulty) {
        return Err(format!("field 'difficulty' must be 1-5, got {}", difficulty));
    }

    let ingredients = string_list(obj, "ingredients")?;
    let instructions = string_list(obj, "instructions")?;

    let nutrition_value = NUTRITION_KEYS
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
        .ok_or_else(|| "missing field 'nutrition'".to_string())?;
    let nutrition = validate_nutrition(nutrition_value)?;

    Ok(MealDraft {
        title: title.to_string(),
        cook_time_minutes,
        difficulty: difficulty as u8,
        ingredients,
        instructions,
        nutrition,
    })
}

fn validate_nutrition(value: &Value) -> Result<Nutrition, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "field 'nutrition' is not an object".to_string())?;
    Ok(Nutrition {
        calories: required_u32(obj, "calories")?,
        protein_g: required_u32(obj, "protein_g")?,
        carbs_g: required_u32(obj, "carbs_g")?,
        fat_g: required_u32(obj, "fat_g")?,
    })
}

fn required<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, String> {
    obj.get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| format!("missing field '{}'", field))
}

fn required_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a str, String> {
    required(obj, field)?
        .as_str()
        .ok_or_else(|| format!("field '{}' must be a string", field))
}

/// Non-negative integer; integral floats such as `15.0` are accepted
fn required_u32(obj: &Map<String, Value>, field: &str) -> Result<u32, String> {
    let value = required(obj, field)?;
    let not_int = || format!("field '{}' must be a non-negative integer", field);

    let Value::Number(number) = value else {
        return Err(not_int());
    };
    let whole = match number.as_u64() {
        Some(n) => n,
        None => match number.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => f as u64,
            _ => return Err(not_int()),
        },
    };
    u32::try_from(whole).map_err(|_| format!("field '{}' is out of range", field))
}

fn string_list(obj: &Map<String, Value>, field: &str) -> Result<Vec<String>, String> {
    let items = required(obj, field)?
        .as_array()
        .ok_or_else(|| format!("field '{}' must be a list", field))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("field '{}[{}]' must be a string", field, i))
        })
        .collect()
}

/// Check that a finished buffer is a complete meal-plan document
///
/// Shape: `{ "meal_plan": { "day_<n>": { ... }, ... } }`. Only the top-level
/// structure is enforced; individual meals were validated as they closed.
pub fn validate_document(buffer: &str) -> Result<(), String> {
    if buffer.trim().is_empty() {
        return Err("document is empty".to_string());
    }

    let value: Value = serde_json::from_str(buffer)
        .map_err(|e| format!("document is not complete JSON: {}", e))?;

    let root = value
        .as_object()
        .ok_or_else(|| "document root is not an object".to_string())?;
    let plan = root
        .get("meal_plan")
        .ok_or_else(|| "missing top-level key 'meal_plan'".to_string())?
        .as_object()
        .ok_or_else(|| "'meal_plan' is not an object".to_string())?;

    for (key, day) in plan {
        if MealKey::parse_day(key).is_none() {
            return Err(format!("unexpected key '{}' in 'meal_plan'", key));
        }
        if !day.is_object() {
            return Err(format!("'{}' is not an object", key));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"title": "Shakshuka", "cook_time_minutes": 25, "difficulty": 2,
        "ingredients": ["eggs", "tomatoes"], "instructions": ["simmer", "crack eggs"],
        "nutrition": {"calories": 320, "protein_g": 18, "carbs_g": 14, "fat_g": 21}}"#;

    #[test]
    fn test_valid_meal() {
        let meal = decode_meal(VALID).unwrap();
        assert_eq!(meal.title, "Shakshuka");
        assert_eq!(meal.difficulty, 2);
        assert_eq!(meal.ingredients, vec!["eggs", "tomatoes"]);
        assert_eq!(meal.nutrition.fat_g, 21);
    }

    #[test]
    fn test_legacy_nutrition_key() {
        let span = VALID.replace("\"nutrition\"", "\"nutrition_info\"");
        let meal = decode_meal(&span).unwrap();
        assert_eq!(meal.nutrition.calories, 320);
    }

    #[test]
    fn test_nutrition_takes_precedence_over_nutrition_info() {
        let span = VALID.replace(
            "\"nutrition\":",
            "\"nutrition_info\": {\"calories\": 1, \"protein_g\": 1, \"carbs_g\": 1, \"fat_g\": 1}, \"nutrition\":",
        );
        let meal = decode_meal(&span).unwrap();
        assert_eq!(meal.nutrition.calories, 320);
    }

    #[test]
    fn test_null_nutrition_falls_back_to_legacy_key() {
        let span = VALID.replace(
            "\"nutrition\":",
            "\"nutrition\": null, \"nutrition_info\":",
        );
        assert_eq!(decode_meal(&span).unwrap().nutrition.protein_g, 18);
    }

    #[test]
    fn test_difficulty_out_of_range() {
        let span = VALID.replace("\"difficulty\": 2", "\"difficulty\": 6");
        match decode_meal(&span) {
            Err(SpanError::Schema(reason)) => assert!(reason.contains("difficulty")),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_integral_float_accepted_fraction_rejected() {
        let span = VALID.replace("\"cook_time_minutes\": 25", "\"cook_time_minutes\": 25.0");
        assert_eq!(decode_meal(&span).unwrap().cook_time_minutes, 25);

        let span = VALID.replace("\"cook_time_minutes\": 25", "\"cook_time_minutes\": 25.5");
        assert!(matches!(decode_meal(&span), Err(SpanError::Schema(_))));
    }

    #[test]
    fn test_mistyped_list_entry() {
        let span = VALID.replace("[\"eggs\", \"tomatoes\"]", "[\"eggs\", 2]");
        match decode_meal(&span) {
            Err(SpanError::Schema(reason)) => assert_eq!(reason, "field 'ingredients[1]' must be a string"),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_is_distinguished() {
        assert!(matches!(decode_meal("{\"title\": }"), Err(SpanError::Syntax(_))));
    }

    #[test]
    fn test_escapes_are_decoded_without_loss() {
        let span = VALID.replace("Shakshuka", r#"Crème \"brûlée\" 🍮"#);
        assert_eq!(decode_meal(&span).unwrap().title, "Crème \"brûlée\" 🍮");
    }

    #[test]
    fn test_document_validation() {
        assert!(validate_document(r#"{"meal_plan": {"day_1": {}}}"#).is_ok());
        assert!(validate_document(" \n").is_err());
        assert!(validate_document(r#"{"meal_plan": {"day_1": {}}"#).is_err());
        assert!(validate_document(r#"{"plan": {}}"#).is_err());
        assert!(validate_document(r#"{"meal_plan": {"monday": {}}}"#).is_err());
        assert!(validate_document(r#"{"meal_plan": {"day_1": []}}"#).is_err());
        assert!(validate_document(r#"[]"#).is_err());
    }
}
