//! Structural scan for closed meal objects
//!
//! Walks the buffer once, tracking string literals, escapes and the stack of
//! open containers. A meal object is reported as a [`MealSpan`] when its
//! closing brace is seen and the containers around it are exactly
//! `{ "meal_plan": { "day_<n>": { "<meal type>": ... } } }`. Lookalike keys
//! anywhere else in the document, including inside another meal, are not
//! meal slots. Braces inside string literals, or right after a backslash,
//! never touch the stack.
//!
//! Every byte the walker branches on is ASCII, so byte offsets it reports are
//! always char boundaries.

use mplan_common::{MealKey, MealType};

/// A closed meal object: `buffer[start..end]` runs from `{` to `}` inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealSpan {
    pub key: MealKey,
    pub start: usize,
    pub end: usize,
}

/// Top-level key holding the plan
const PLAN_KEY: &str = "meal_plan";

/// Classification of an object key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyTag {
    Plan,
    Day(u32),
    Meal(MealType),
    Other,
}

#[derive(Debug)]
struct Frame {
    is_object: bool,
    /// Key under which this container was opened
    tag: Option<KeyTag>,
    start: usize,
    /// Object only: next string token is a key
    expect_key: bool,
    /// Object only: most recent key awaiting its value
    pending: Option<KeyTag>,
}

fn classify_key(raw: &str, max_days: u32) -> KeyTag {
    if raw == PLAN_KEY {
        return KeyTag::Plan;
    }
    if let Some(meal_type) = MealType::from_key(raw) {
        return KeyTag::Meal(meal_type);
    }
    match MealKey::parse_day(raw) {
        Some(day) if day <= max_days => KeyTag::Day(day),
        _ => KeyTag::Other,
    }
}

/// Find every closed meal object in `buffer`, in closing order
///
/// Never fails: unbalanced or truncated input simply yields fewer spans.
/// Days above `max_days` are ignored.
pub fn scan_meal_spans(buffer: &str, max_days: u32) -> Vec<MealSpan> {
    let bytes = buffer.as_bytes();
    let mut stack: Vec<Frame> = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;
    let mut string_start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if b == b'\\' {
            escape_next = true;
            continue;
        }

        if in_string {
            if b == b'"' {
                in_string = false;
                if let Some(top) = stack.last_mut() {
                    if top.is_object && top.expect_key {
                        top.pending = Some(classify_key(&buffer[string_start + 1..i], max_days));
                    }
                }
            }
            continue;
        }

        match b {
            b'"' => {
                in_string = true;
                string_start = i;
            }
            b'{' | b'[' => {
                let tag = stack
                    .last_mut()
                    .filter(|parent| parent.is_object)
                    .and_then(|parent| parent.pending.take());
                let is_object = b == b'{';
                stack.push(Frame {
                    is_object,
                    tag,
                    start: i,
                    expect_key: is_object,
                    pending: None,
                });
            }
            b'}' | b']' => {
                let Some(frame) = stack.pop() else {
                    continue;
                };
                // Mismatched closer: the document is broken here, keep walking
                if frame.is_object != (b == b'}') {
                    continue;
                }
                if let Some(KeyTag::Meal(meal_type)) = frame.tag.filter(|_| frame.is_object) {
                    if let Some(day) = plan_day(&stack) {
                        spans.push(MealSpan {
                            key: MealKey::new(day, meal_type),
                            start: frame.start,
                            end: i + 1,
                        });
                    }
                }
            }
            b':' => {
                if let Some(top) = stack.last_mut().filter(|top| top.is_object) {
                    top.expect_key = false;
                }
            }
            b',' => {
                if let Some(top) = stack.last_mut().filter(|top| top.is_object) {
                    top.expect_key = true;
                    top.pending = None;
                }
            }
            _ => {}
        }
    }

    spans
}

/// Day number when `stack` is exactly root → `meal_plan` → `day_<n>`
fn plan_day(stack: &[Frame]) -> Option<u32> {
    let [root, plan, day] = stack else {
        return None;
    };
    if !(root.is_object && plan.is_object && day.is_object) {
        return None;
    }
    match (root.tag, plan.tag, day.tag) {
        (None, Some(KeyTag::Plan), Some(KeyTag::Day(n))) => Some(n),
        _ => None,
    }
}
