//! Structural comparison of expected and actual scenario outcomes
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::{GoldenError, Result};
use colored::*;
use regex::Regex;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeSet;

const MASK: &str = "***MASKED***";

/// Options for diff comparison
#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub colored: bool,

    /// Unchanged lines shown when `full_diff` is off
    pub context_lines: usize,

    /// Sort object keys before comparing
    pub normalize: bool,

    pub float_tolerance: f64,

    pub full_diff: bool,

    /// Maximum diff lines to show (0 = unlimited)
    pub max_diff_lines: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            colored: true,
            context_lines: 3,
            normalize: true,
            float_tolerance: 1e-6,
            full_diff: true,
            max_diff_lines: 100,
        }
    }
}

/// Result of a comparison
#[derive(Debug)]
pub struct DiffResult {
    pub matches: bool,

    /// Line diff of the pretty-printed values; empty on a match
    pub diff_output: String,

    pub summary: DiffSummary,
}

#[derive(Debug, Default)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    /// Dotted paths that differ, e.g. `target.person[2].name`
    pub differing_paths: Vec<String>,
}

/// Compares JSON values with float tolerance, ignored and volatile fields
pub struct DiffEngine {
    options: DiffOptions,
    ignored: Vec<Vec<String>>,
    volatile: Vec<(Vec<String>, Regex)>,
}

impl DiffEngine {
    pub fn new(options: DiffOptions) -> Self {
        Self {
            options,
            ignored: Vec::new(),
            volatile: Vec::new(),
        }
    }

    /// Drop the value at dotted `path` from both sides before comparing
    pub fn ignore_field(&mut self, path: &str) {
        self.ignored.push(split_path(path));
    }

    /// Mask string values at dotted `path` that match `pattern`
    pub fn add_volatile_pattern(&mut self, path: &str, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern).map_err(|e| {
            GoldenError::CorpusError(format!("Invalid volatile pattern for {}: {}", path, e))
        })?;
        self.volatile.push((split_path(path), regex));
        Ok(())
    }

    pub fn compare(&self, expected: &Value, actual: &Value) -> DiffResult {
        let expected = self.prepare(expected);
        let actual = self.prepare(actual);

        if self.values_match(&expected, &actual) {
            return DiffResult {
                matches: true,
                diff_output: String::new(),
                summary: DiffSummary::default(),
            };
        }

        let expected_text = pretty(&expected);
        let actual_text = pretty(&actual);
        let text_diff = TextDiff::from_lines(&expected_text, &actual_text);

        let mut summary = DiffSummary::default();
        for change in text_diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Delete => summary.removed += 1,
                ChangeTag::Insert => summary.added += 1,
                ChangeTag::Equal => {}
            }
        }
        self.collect_diff_paths(&expected, &actual, "", &mut summary.differing_paths);

        DiffResult {
            matches: false,
            diff_output: self.render(&text_diff),
            summary,
        }
    }

    fn prepare(&self, value: &Value) -> Value {
        let mut prepared = if self.options.normalize {
            normalize_json(value)
        } else {
            value.clone()
        };
        for path in &self.ignored {
            remove_at(&mut prepared, path);
        }
        for (path, pattern) in &self.volatile {
            mask_at(&mut prepared, path, pattern);
        }
        prepared
    }

    fn values_match(&self, expected: &Value, actual: &Value) -> bool {
        match (expected, actual) {
            (Value::Object(exp), Value::Object(act)) => {
                exp.len() == act.len()
                    && exp.iter().all(|(key, exp_val)| {
                        act.get(key)
                            .is_some_and(|act_val| self.values_match(exp_val, act_val))
                    })
            }
            (Value::Array(exp), Value::Array(act)) => {
                exp.len() == act.len()
                    && exp
                        .iter()
                        .zip(act)
                        .all(|(exp_val, act_val)| self.values_match(exp_val, act_val))
            }
            (Value::Number(exp), Value::Number(act)) => match (exp.as_f64(), act.as_f64()) {
                (Some(e), Some(a)) => (e - a).abs() <= self.options.float_tolerance,
                _ => exp == act,
            },
            (exp, act) => exp == act,
        }
    }

    fn render<'a>(&self, text_diff: &TextDiff<'a, 'a, 'a, str>) -> String {
        let mut output = String::new();
        let header = "=== Diff (expected -> actual) ===\n";
        if self.options.colored {
            output.push_str(&header.bold().to_string());
        } else {
            output.push_str(header);
        }

        let mut shown = 0;
        let mut unchanged = 0;
        for change in text_diff.iter_all_changes() {
            if self.options.max_diff_lines > 0 && shown >= self.options.max_diff_lines {
                output.push_str("... (diff truncated) ...\n");
                break;
            }

            let text = change.to_string();
            let line = match change.tag() {
                ChangeTag::Delete if self.options.colored => format!("{}", format!("-{}", text).red()),
                ChangeTag::Delete => format!("-{}", text),
                ChangeTag::Insert if self.options.colored => format!("{}", format!("+{}", text).green()),
                ChangeTag::Insert => format!("+{}", text),
                ChangeTag::Equal => {
                    unchanged += 1;
                    if !self.options.full_diff && unchanged > self.options.context_lines {
                        continue;
                    }
                    format!(" {}", text)
                }
            };

            output.push_str(&line);
            shown += 1;
        }

        output
    }

    fn collect_diff_paths(&self, expected: &Value, actual: &Value, at: &str, paths: &mut Vec<String>) {
        match (expected, actual) {
            (Value::Object(exp), Value::Object(act)) => {
                let keys: BTreeSet<&String> = exp.keys().chain(act.keys()).collect();
                for key in keys {
                    let child = if at.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", at, key)
                    };
                    match (exp.get(key), act.get(key)) {
                        (Some(e), Some(a)) if !self.values_match(e, a) => {
                            self.collect_diff_paths(e, a, &child, paths)
                        }
                        (Some(_), None) => paths.push(format!("{} (missing in actual)", child)),
                        (None, Some(_)) => paths.push(format!("{} (extra in actual)", child)),
                        _ => {}
                    }
                }
            }
            (Value::Array(exp), Value::Array(act)) => {
                for (i, (e, a)) in exp.iter().zip(act).enumerate() {
                    if !self.values_match(e, a) {
                        self.collect_diff_paths(e, a, &format!("{}[{}]", at, i), paths);
                    }
                }
                if exp.len() != act.len() {
                    paths.push(format!(
                        "{} (length {} vs {})",
                        at,
                        exp.len(),
                        act.len()
                    ));
                }
            }
            _ => paths.push(at.to_string()),
        }
    }
}

/// Copy of `value` with object keys in sorted order
pub fn normalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Value::Object(
                keys.into_iter()
                    .map(|k| (k.clone(), normalize_json(&map[k])))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize_json).collect()),
        other => other.clone(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Arrays along the way apply the rest of the path to every element
fn remove_at(value: &mut Value, path: &[String]) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    match value {
        Value::Object(map) if rest.is_empty() => {
            map.remove(first);
        }
        Value::Object(map) => {
            if let Some(next) = map.get_mut(first) {
                remove_at(next, rest);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| remove_at(item, path)),
        _ => {}
    }
}

fn mask_at(value: &mut Value, path: &[String], pattern: &Regex) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    match value {
        Value::Object(map) => match map.get_mut(first) {
            Some(slot) if rest.is_empty() => {
                if slot.as_str().is_some_and(|s| pattern.is_match(s)) {
                    *slot = Value::String(MASK.to_string());
                }
            }
            Some(next) => mask_at(next, rest, pattern),
            None => {}
        },
        Value::Array(items) => items.iter_mut().for_each(|item| mask_at(item, path, pattern)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn plain() -> DiffEngine {
        DiffEngine::new(DiffOptions {
            colored: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_match_ignores_key_order_and_float_noise() {
        let engine = plain();
        let result = engine.compare(
            &json!({"b": 1.0, "a": [1, 2]}),
            &json!({"a": [1, 2], "b": 1.000_000_1}),
        );
        assert!(result.matches);
        assert!(result.diff_output.is_empty());
    }

    #[test]
    fn test_mismatch_reports_paths() {
        let engine = plain();
        let result = engine.compare(
            &json!({"target": {"person": [{"name": "a"}, {"name": "b"}]}, "audits": {"errors": 0}}),
            &json!({"target": {"person": [{"name": "a"}, {"name": "x"}], "extra": true}, "audits": {"errors": 0}}),
        );

        assert!(!result.matches);
        assert_eq!(
            result.summary.differing_paths,
            vec![
                "target.extra (extra in actual)".to_string(),
                "target.person[1].name".to_string(),
            ]
        );
        assert!(result.diff_output.contains("-"));
        assert!(result.summary.added > 0);
    }

    #[test]
    fn test_array_length_mismatch() {
        let result = plain().compare(&json!({"a": [1, 2]}), &json!({"a": [1]}));
        assert!(!result.matches);
        assert_eq!(result.summary.differing_paths, vec!["a (length 2 vs 1)".to_string()]);
    }

    #[test]
    fn test_ignored_fields() {
        let mut engine = plain();
        engine.ignore_field("target.items.id");
        let result = engine.compare(
            &json!({"target": {"items": [{"id": "1", "v": 1}, {"id": "2", "v": 2}]}}),
            &json!({"target": {"items": [{"id": "9", "v": 1}, {"id": "8", "v": 2}]}}),
        );
        assert!(result.matches);
    }

    #[test]
    fn test_volatile_field_masking() {
        let mut engine = plain();
        engine
            .add_volatile_pattern("target.today", r"^\d{4}-\d{2}-\d{2}$")
            .unwrap();

        assert!(engine
            .compare(&json!({"target": {"today": "2025-01-01"}}), &json!({"target": {"today": "2026-10-17"}}))
            .matches);
        assert!(!engine
            .compare(&json!({"target": {"today": "2025-01-01"}}), &json!({"target": {"today": "yesterday"}}))
            .matches);
    }

    #[test]
    fn test_invalid_volatile_pattern() {
        assert!(plain().add_volatile_pattern("a", "(").is_err());
    }

    #[test]
    fn test_normalize_json_sorts_keys() {
        let normalized = normalize_json(&json!({"z": 1, "a": {"y": 2, "b": 3}}));
        assert_eq!(pretty(&normalized), pretty(&json!({"a": {"b": 3, "y": 2}, "z": 1})));
        let keys: Vec<&String> = normalized.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "z"]);
    }
}
