//! Built-in field actions
//!
//! String, number and generator actions available in every registry built
//! with [`ActionRegistry::with_builtins`]. String positions are counted in
//! characters, not bytes.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use super::registry::{ActionDetail, ActionRegistry};
use super::ActionError;
use crate::model::Action;
use crate::types::{FieldType, Value};
use regex::Regex;
use std::sync::OnceLock;

type ActionResult = Result<Option<Value>, ActionError>;

/// Register every built-in action
pub fn register_all(registry: &mut ActionRegistry) {
    register_string_actions(registry);
    register_number_actions(registry);
    register_generator_actions(registry);
}

fn register_string_actions(registry: &mut ActionRegistry) {
    use FieldType::{Integer, String};

    let simple: [(&str, fn(&Action, Option<Value>) -> ActionResult); 8] = [
        ("Uppercase", uppercase),
        ("Lowercase", lowercase),
        ("Capitalize", capitalize),
        ("Trim", trim),
        ("TrimLeft", trim_left),
        ("TrimRight", trim_right),
        ("SeparateByDash", separate_by_dash),
        ("SeparateByUnderscore", separate_by_underscore),
    ];
    for (name, handler) in simple {
        registry.register(ActionDetail::new(name, String, String, handler));
    }

    registry.register(
        ActionDetail::new("SubString", String, String, sub_string)
            .with_param("startIndex", Integer, true)
            .with_param("endIndex", Integer, false)
            .with_description("Characters from startIndex up to (excluding) endIndex"),
    );
    registry.register(
        ActionDetail::new("SubStringAfter", String, String, sub_string_after)
            .with_param("startIndex", Integer, true)
            .with_param("endIndex", Integer, false)
            .with_param("match", String, true)
            .with_description("Substring of the text following the first occurrence of match"),
    );
    registry.register(
        ActionDetail::new("SubStringBefore", String, String, sub_string_before)
            .with_param("startIndex", Integer, true)
            .with_param("endIndex", Integer, false)
            .with_param("match", String, true)
            .with_description("Substring of the text preceding the first occurrence of match"),
    );
    registry.register(
        ActionDetail::new("PadStringLeft", String, String, pad_string_left)
            .with_param("padCharacter", String, true)
            .with_param("padCount", Integer, true),
    );
    registry.register(
        ActionDetail::new("PadStringRight", String, String, pad_string_right)
            .with_param("padCharacter", String, true)
            .with_param("padCount", Integer, true),
    );
    registry.register(
        ActionDetail::new("Append", String, String, append).with_param("string", String, false),
    );
    registry.register(
        ActionDetail::new("Prepend", String, String, prepend).with_param("string", String, false),
    );
    registry.register(ActionDetail::new("StringLength", String, Integer, string_length));
}

fn register_number_actions(registry: &mut ActionRegistry) {
    use FieldType::{Double, Float, Integer, Long};

    // Same name, one implementation per numeric type; resolution picks by input type.
    registry.register(ActionDetail::new("AbsoluteValue", Integer, Integer, absolute_value));
    registry.register(ActionDetail::new("AbsoluteValue", Long, Long, absolute_value));
    registry.register(ActionDetail::new("AbsoluteValue", Float, Float, absolute_value));
    registry.register(ActionDetail::new("AbsoluteValue", Double, Double, absolute_value));

    registry.register(ActionDetail::new("Ceiling", Double, Long, ceiling));
    registry.register(ActionDetail::new("Floor", Double, Long, floor));
}

fn register_generator_actions(registry: &mut ActionRegistry) {
    use FieldType::{All, String};

    registry.register(ActionDetail::new("CurrentDate", All, String, current_date));
    registry.register(ActionDetail::new("CurrentTime", All, String, current_time));
    registry.register(ActionDetail::new("CurrentDateTime", All, String, current_date_time));
    registry.register(ActionDetail::new("GenerateUUID", All, String, generate_uuid));
}

fn text(value: Option<Value>) -> Option<String> {
    value.map(|v| match v {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn map_text(value: Option<Value>, f: impl FnOnce(String) -> String) -> ActionResult {
    Ok(text(value).map(|s| Value::String(f(s))))
}

fn usize_param(action: &Action, name: &str) -> Result<Option<usize>, ActionError> {
    match action.param(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<usize>().map(Some).map_err(|_| {
            ActionError::invalid_parameter(
                &action.name,
                name,
                format!("'{}' is not a non-negative integer", raw),
            )
        }),
    }
}

fn required_usize(action: &Action, name: &str) -> Result<usize, ActionError> {
    usize_param(action, name)?.ok_or_else(|| {
        ActionError::invalid_parameter(&action.name, name, "required parameter is missing")
    })
}

fn required_str<'a>(action: &'a Action, name: &str) -> Result<&'a str, ActionError> {
    action.param(name).ok_or_else(|| {
        ActionError::invalid_parameter(&action.name, name, "required parameter is missing")
    })
}

/// Characters `[start, end)` of `input`, `end` defaulting to the length
fn char_range(action: &Action, input: &str, start: usize, end: Option<usize>) -> Result<String, ActionError> {
    let len = input.chars().count();
    let end = end.unwrap_or(len);
    if start > end || end > len {
        return Err(ActionError::failed(
            &action.name,
            format!(
                "range {}..{} is out of bounds for a string of length {}",
                start, end, len
            ),
        ));
    }
    Ok(input.chars().skip(start).take(end - start).collect())
}

fn uppercase(_: &Action, value: Option<Value>) -> ActionResult {
    map_text(value, |s| s.to_uppercase())
}

fn lowercase(_: &Action, value: Option<Value>) -> ActionResult {
    map_text(value, |s| s.to_lowercase())
}

fn capitalize(_: &Action, value: Option<Value>) -> ActionResult {
    map_text(value, |s| {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => s,
        }
    })
}

fn trim(_: &Action, value: Option<Value>) -> ActionResult {
    map_text(value, |s| s.trim().to_string())
}

fn trim_left(_: &Action, value: Option<Value>) -> ActionResult {
    map_text(value, |s| s.trim_start().to_string())
}

fn trim_right(_: &Action, value: Option<Value>) -> ActionResult {
    map_text(value, |s| s.trim_end().to_string())
}

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\s+=:_\-]").expect("Valid regex pattern"))
}

fn separate_by_dash(_: &Action, value: Option<Value>) -> ActionResult {
    map_text(value, |s| separator_pattern().replace_all(&s, "-").into_owned())
}

fn separate_by_underscore(_: &Action, value: Option<Value>) -> ActionResult {
    map_text(value, |s| separator_pattern().replace_all(&s, "_").into_owned())
}

fn sub_string(action: &Action, value: Option<Value>) -> ActionResult {
    let start = required_usize(action, "startIndex")?;
    let end = usize_param(action, "endIndex")?;
    match text(value) {
        None => Ok(None),
        Some(s) => char_range(action, &s, start, end).map(|r| Some(Value::String(r))),
    }
}

fn sub_string_after(action: &Action, value: Option<Value>) -> ActionResult {
    let start = required_usize(action, "startIndex")?;
    let end = usize_param(action, "endIndex")?;
    let needle = required_str(action, "match")?;
    let Some(s) = text(value) else {
        return Ok(None);
    };
    match s.find(needle) {
        None => Ok(Some(Value::String(s))),
        Some(at) => {
            let rest = &s[at + needle.len()..];
            char_range(action, rest, start, end).map(|r| Some(Value::String(r)))
        }
    }
}

fn sub_string_before(action: &Action, value: Option<Value>) -> ActionResult {
    let start = required_usize(action, "startIndex")?;
    let end = usize_param(action, "endIndex")?;
    let needle = required_str(action, "match")?;
    let Some(s) = text(value) else {
        return Ok(None);
    };
    match s.find(needle) {
        None => Ok(Some(Value::String(s))),
        Some(at) => char_range(action, &s[..at], start, end).map(|r| Some(Value::String(r))),
    }
}

fn padding(action: &Action) -> Result<String, ActionError> {
    let pad = required_str(action, "padCharacter")?;
    let count = required_usize(action, "padCount")?;
    let ch = pad.chars().next().ok_or_else(|| {
        ActionError::invalid_parameter(&action.name, "padCharacter", "must not be empty")
    })?;
    Ok(std::iter::repeat(ch).take(count).collect())
}

fn pad_string_left(action: &Action, value: Option<Value>) -> ActionResult {
    let pad = padding(action)?;
    Ok(Some(Value::String(pad + &text(value).unwrap_or_default())))
}

fn pad_string_right(action: &Action, value: Option<Value>) -> ActionResult {
    let pad = padding(action)?;
    Ok(Some(Value::String(text(value).unwrap_or_default() + &pad)))
}

fn append(action: &Action, value: Option<Value>) -> ActionResult {
    let suffix = action.param("string").unwrap_or_default();
    Ok(Some(Value::String(text(value).unwrap_or_default() + suffix)))
}

fn prepend(action: &Action, value: Option<Value>) -> ActionResult {
    let prefix = action.param("string").unwrap_or_default();
    Ok(Some(Value::String(format!(
        "{}{}",
        prefix,
        text(value).unwrap_or_default()
    ))))
}

fn string_length(action: &Action, value: Option<Value>) -> ActionResult {
    let len = text(value).map(|s| s.chars().count()).unwrap_or(0);
    i32::try_from(len)
        .map(|n| Some(Value::Integer(n)))
        .map_err(|_| ActionError::failed(&action.name, "string length exceeds INTEGER range"))
}

fn absolute_value(action: &Action, value: Option<Value>) -> ActionResult {
    let overflow = || ActionError::failed(&action.name, "absolute value overflows");
    Ok(match value {
        None => None,
        Some(Value::Byte(v)) => Some(Value::Byte(v.checked_abs().ok_or_else(overflow)?)),
        Some(Value::Short(v)) => Some(Value::Short(v.checked_abs().ok_or_else(overflow)?)),
        Some(Value::Integer(v)) => Some(Value::Integer(v.checked_abs().ok_or_else(overflow)?)),
        Some(Value::Long(v)) => Some(Value::Long(v.checked_abs().ok_or_else(overflow)?)),
        Some(Value::Float(v)) => Some(Value::Float(v.abs())),
        Some(Value::Double(v)) => Some(Value::Double(v.abs())),
        Some(other) => {
            return Err(ActionError::failed(
                &action.name,
                format!("expected a number, found {}", other.field_type()),
            ))
        }
    })
}

fn rounded(action: &Action, value: Option<Value>, round: fn(f64) -> f64) -> ActionResult {
    let Some(value) = value else {
        return Ok(None);
    };
    let f = value.as_f64().ok_or_else(|| {
        ActionError::failed(
            &action.name,
            format!("expected a number, found {}", value.field_type()),
        )
    })?;
    let r = round(f);
    if !r.is_finite() || r < i64::MIN as f64 || r > i64::MAX as f64 {
        return Err(ActionError::failed(&action.name, "result out of LONG range"));
    }
    Ok(Some(Value::Long(r as i64)))
}

fn ceiling(action: &Action, value: Option<Value>) -> ActionResult {
    rounded(action, value, f64::ceil)
}

fn floor(action: &Action, value: Option<Value>) -> ActionResult {
    rounded(action, value, f64::floor)
}

fn current_date(_: &Action, _: Option<Value>) -> ActionResult {
    Ok(Some(Value::String(
        chrono::Utc::now().format("%Y-%m-%d").to_string(),
    )))
}

fn current_time(_: &Action, _: Option<Value>) -> ActionResult {
    Ok(Some(Value::String(
        chrono::Utc::now().format("%H:%M:%S").to_string(),
    )))
}

fn current_date_time(_: &Action, _: Option<Value>) -> ActionResult {
    Ok(Some(Value::String(chrono::Utc::now().to_rfc3339())))
}

fn generate_uuid(_: &Action, _: Option<Value>) -> ActionResult {
    Ok(Some(Value::String(uuid::Uuid::new_v4().to_string())))
}
