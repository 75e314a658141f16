//! Turns a raw backend reply into the canonical [`Recipe`].
//!
//! Both producers are outside our control: the extraction service is a third
//! party, and the inference backend is a language model that wraps its JSON
//! in prose or code fences when it feels like it. The normalizer's job is to
//! salvage the maximum valid structure, not to enforce a strict schema.
//! Only an unusable `title` is fatal; everything else degrades to a default.

use crate::error::ExtractError;
use crate::model::Recipe;
use serde_json::Value;
use std::collections::BTreeMap;

/// Locate the JSON object embedded in a free-form reply.
///
/// Prefers the first fenced ```json block; otherwise falls back to the span
/// from the first `{` through the last `}`. Returns `None` when the text
/// contains no object at all.
///
/// Pure text-in, text-out so malformed-reply fixtures can be tested without
/// any network concerns.
pub fn json_candidate(text: &str) -> Option<&str> {
    if let Some(fenced) = fenced_json_block(text) {
        return Some(fenced);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn fenced_json_block(text: &str) -> Option<&str> {
    let tag = text.find("```json")?;
    let after_tag = &text[tag + "```json".len()..];
    let body_start = after_tag.find('\n')? + 1;
    let body = &after_tag[body_start..];
    let body_end = body.find("```")?;
    let candidate = body[..body_end].trim();
    if candidate.is_empty() {
        None
    } else {
        Some(candidate)
    }
}

/// Normalize a raw backend reply into a canonical [`Recipe`].
///
/// `source_url` is the requested page URL for URL-driven extractions; it
/// backfills `sourceUrl` when the reply omits one. Image-driven extractions
/// pass `None` and get an empty `sourceUrl`.
pub fn normalize(raw: &str, source_url: Option<&str>) -> Result<Recipe, ExtractError> {
    let candidate = json_candidate(raw)
        .ok_or_else(|| ExtractError::Backend("reply contains no JSON object".to_string()))?;

    let mut value: Value = serde_json::from_str(candidate)
        .map_err(|e| ExtractError::Backend(format!("reply is not valid JSON: {}", e)))?;

    migrate_legacy_shape(&mut value);

    let title = value["title"]
        .as_str()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ExtractError::SchemaViolation("recipe title is missing or empty".to_string())
        })?
        .to_string();

    // A recipe with zero steps is degenerate but valid; cook mode treats it
    // as a boundary condition.
    let instructions = string_array(&value["instructions"]);
    let ingredients = string_array(&value["ingredients"]);

    let total_time_minutes = coerce_minutes(&value["totalTime"])
        .or_else(|| coerce_minutes(&value["totalTimeMinutes"]))
        .unwrap_or(0);

    let image = value["image"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let yields = value["yields"].as_str().unwrap_or("").to_string();

    let source_url = value["sourceUrl"]
        .as_str()
        .filter(|s| !s.is_empty())
        .or(source_url)
        .unwrap_or("")
        .to_string();

    let raw_steps = value
        .get("step_ingredients")
        .or_else(|| value.get("stepIngredients"));
    let step_ingredients = step_ingredient_map(raw_steps, instructions.len());

    Ok(Recipe {
        title,
        image,
        total_time_minutes,
        yields,
        source_url,
        ingredients,
        instructions,
        step_ingredients,
    })
}

/// Older backend replies nest ingredients under `prep.ingredients` (objects
/// with `item`/`quantity`) and steps under `cook.steps`. Migrate them to the
/// flat arrays before field extraction so the rest of the pipeline only ever
/// sees one shape.
fn migrate_legacy_shape(value: &mut Value) {
    if value.get("ingredients").is_none() {
        if let Some(items) = value
            .pointer("/prep/ingredients")
            .and_then(Value::as_array)
        {
            let flat: Vec<Value> = items
                .iter()
                .filter_map(|entry| {
                    let item = entry["item"].as_str()?.trim();
                    if item.is_empty() {
                        return None;
                    }
                    let line = match entry["quantity"].as_str().map(str::trim) {
                        Some(quantity) if !quantity.is_empty() => {
                            format!("{} {}", quantity, item)
                        }
                        _ => item.to_string(),
                    };
                    Some(Value::String(line))
                })
                .collect();
            value["ingredients"] = Value::Array(flat);
        }
    }

    if value.get("instructions").is_none() {
        if let Some(steps) = value.pointer("/cook/steps").cloned() {
            value["instructions"] = steps;
        }
    }
}

fn string_array(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Coerce a numeric-looking value into whole minutes. Negative values and
/// anything non-numeric map to `None`.
fn coerce_minutes(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            let minutes = n.as_f64()?;
            if minutes.is_finite() && minutes >= 0.0 {
                Some(minutes as u32)
            } else {
                None
            }
        }
        Value::String(s) => {
            let minutes: f64 = s.trim().parse().ok()?;
            if minutes.is_finite() && minutes >= 0.0 {
                Some(minutes as u32)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Keep only entries whose key addresses a real instruction index. Invalid
/// keys are dropped silently, never fatal.
fn step_ingredient_map(raw: Option<&Value>, step_count: usize) -> BTreeMap<usize, Vec<String>> {
    let mut map = BTreeMap::new();
    let Some(object) = raw.and_then(Value::as_object) else {
        return map;
    };

    for (key, ingredients) in object {
        let Ok(index) = key.trim().parse::<usize>() else {
            continue;
        };
        if index >= step_count {
            continue;
        }
        let Some(items) = ingredients.as_array() else {
            continue;
        };
        let names: Vec<String> = items
            .iter()
            .filter_map(|item| item.as_str())
            .map(String::from)
            .collect();
        map.insert(index, names);
    }

    map
}
