//! Scenario corpus management for golden tests
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::{GoldenError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name every scenario directory carries
pub const SCENARIO_FILE: &str = "test.json";

/// One mapping scenario in the corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    pub category: String,

    pub input: ScenarioInput,

    /// Expected outcome, `{"target": ..., "audits": {"errors": n, "warnings": n}}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,

    #[serde(default)]
    pub expectations: ScenarioExpectations,

    pub metadata: ScenarioMetadata,

    /// File the scenario was loaded from
    #[serde(skip)]
    pub location: Option<PathBuf>,
}

/// Inputs of a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    /// Mapping document, inline or as a `.json` file name next to the scenario
    pub mapping: Value,

    /// Source JSON document, inline or as a `.json` file name
    pub source: Value,

    /// Engine configuration overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,

    /// Session properties
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

/// How the outcome is judged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioExpectations {
    /// Whether the session should complete without an engine error
    #[serde(default = "default_true")]
    pub should_succeed: bool,

    /// Regex the engine error must match when `should_succeed` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_pattern: Option<String>,

    /// Dotted paths removed before comparison
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_fields: Vec<String>,

    /// Values that change between runs but must keep a shape
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volatile_fields: Vec<VolatileFieldSpec>,
}

impl Default for ScenarioExpectations {
    fn default() -> Self {
        Self {
            should_succeed: true,
            error_pattern: None,
            ignore_fields: Vec::new(),
            volatile_fields: Vec::new(),
        }
    }
}

/// Volatile field: a dotted path and the pattern its value must match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatileFieldSpec {
    pub path: String,
    pub pattern: String,
}

/// Metadata about a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lower runs first
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Set when the expectation was last rewritten
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u32 {
    100
}

/// Manages the scenario corpus
pub struct CorpusManager {
    corpus_dir: PathBuf,
}

impl CorpusManager {
    pub fn new(corpus_dir: impl AsRef<Path>) -> Self {
        Self {
            corpus_dir: corpus_dir.as_ref().to_path_buf(),
        }
    }

    pub fn corpus_dir(&self) -> &Path {
        &self.corpus_dir
    }

    /// Discover all scenarios, ordered by priority then name
    pub fn discover_tests(&self) -> Result<Vec<Scenario>> {
        let mut scenarios = Vec::new();

        if !self.corpus_dir.exists() {
            return Ok(scenarios);
        }

        for entry in WalkDir::new(&self.corpus_dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.file_name() == Some(std::ffi::OsStr::new(SCENARIO_FILE)) {
                match self.load_test_case(path) {
                    Ok(scenario) => scenarios.push(scenario),
                    Err(e) => {
                        eprintln!("Warning: Failed to load scenario {:?}: {}", path, e);
                    }
                }
            }
        }

        scenarios.sort_by(|a, b| {
            a.metadata
                .priority
                .cmp(&b.metadata.priority)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(scenarios)
    }

    /// Load one scenario file, resolving file references next to it
    pub fn load_test_case(&self, path: &Path) -> Result<Scenario> {
        let content = fs::read_to_string(path)?;
        let mut scenario: Scenario = serde_json::from_str(&content)?;

        let scenario_dir = path.parent().ok_or_else(|| {
            GoldenError::CorpusError(format!("Scenario file has no directory: {}", path.display()))
        })?;

        resolve_file_ref(scenario_dir, &mut scenario.input.mapping)?;
        resolve_file_ref(scenario_dir, &mut scenario.input.source)?;
        scenario.location = Some(path.to_path_buf());

        Ok(scenario)
    }

    /// Persist `scenario` back to where it was loaded from
    pub fn save(&self, scenario: &Scenario) -> Result<()> {
        let path = scenario.location.clone().unwrap_or_else(|| {
            self.corpus_dir
                .join(&scenario.category)
                .join(&scenario.name)
                .join(SCENARIO_FILE)
        });
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // File references stay file references on disk
        let mut on_disk = scenario.clone();
        if path.exists() {
            let original: Scenario = serde_json::from_str(&fs::read_to_string(&path)?)?;
            on_disk.input = original.input;
        }

        fs::write(&path, serde_json::to_string_pretty(&on_disk)? + "\n")?;
        Ok(())
    }

    pub fn filter_by_category(&self, scenarios: Vec<Scenario>, category: &str) -> Vec<Scenario> {
        scenarios
            .into_iter()
            .filter(|s| s.category == category || category == "*")
            .collect()
    }

    pub fn filter_by_tags(&self, scenarios: Vec<Scenario>, tags: &[String]) -> Vec<Scenario> {
        if tags.is_empty() {
            return scenarios;
        }

        scenarios
            .into_iter()
            .filter(|s| tags.iter().any(|tag| s.metadata.tags.contains(tag)))
            .collect()
    }

    pub fn filter_enabled(&self, scenarios: Vec<Scenario>) -> Vec<Scenario> {
        scenarios.into_iter().filter(|s| s.metadata.enabled).collect()
    }

    /// Create the corpus directory structure with one sample scenario
    pub fn init_corpus(&self) -> Result<()> {
        for dir in ["basic", "collections", "edge-cases", "regression"] {
            fs::create_dir_all(self.corpus_dir.join(dir))?;
        }

        self.save(&sample_scenario())
    }

    /// Category directories present in the corpus
    pub fn list_categories(&self) -> Result<Vec<String>> {
        let mut categories = Vec::new();

        if !self.corpus_dir.exists() {
            return Ok(categories);
        }

        for entry in fs::read_dir(&self.corpus_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                    categories.push(name.to_string());
                }
            }
        }

        categories.sort();
        Ok(categories)
    }

    pub fn get_statistics(&self) -> Result<CorpusStatistics> {
        let scenarios = self.discover_tests()?;

        let mut stats = CorpusStatistics {
            total_tests: scenarios.len(),
            ..Default::default()
        };

        for scenario in scenarios {
            if scenario.metadata.enabled {
                stats.enabled_tests += 1;
            } else {
                stats.disabled_tests += 1;
            }
            if scenario.expected.is_none() {
                stats.missing_expectations += 1;
            }

            *stats.tests_by_category.entry(scenario.category).or_insert(0) += 1;
            for tag in scenario.metadata.tags {
                *stats.tests_by_tag.entry(tag).or_insert(0) += 1;
            }
        }

        Ok(stats)
    }
}

fn resolve_file_ref(dir: &Path, slot: &mut Value) -> Result<()> {
    if let Value::String(filename) = slot {
        if filename.ends_with(".json") {
            let content = fs::read_to_string(dir.join(filename.as_str()))?;
            *slot = serde_json::from_str(&content)?;
        }
    }
    Ok(())
}

fn sample_scenario() -> Scenario {
    Scenario {
        name: "hello-mapping".to_string(),
        category: "basic".to_string(),
        input: ScenarioInput {
            mapping: serde_json::json!({
                "name": "hello",
                "mappings": [{
                    "type": "MAP",
                    "source": {"kind": "simple", "path": "/greeting", "field_type": "STRING"},
                    "target": {"kind": "simple", "path": "/message", "field_type": "STRING"}
                }]
            }),
            source: serde_json::json!({"greeting": "Hello, world!"}),
            config: None,
            properties: BTreeMap::new(),
        },
        expected: Some(serde_json::json!({
            "target": {"message": "Hello, world!"},
            "audits": {"errors": 0, "warnings": 0}
        })),
        expectations: ScenarioExpectations::default(),
        metadata: ScenarioMetadata {
            description: "Single field copied from source to target".to_string(),
            tags: vec!["basic".to_string(), "smoke".to_string()],
            enabled: true,
            priority: 1,
            updated_at: None,
        },
        location: None,
    }
}

/// Statistics about the corpus
#[derive(Debug, Default)]
pub struct CorpusStatistics {
    pub total_tests: usize,
    pub enabled_tests: usize,
    pub disabled_tests: usize,
    pub missing_expectations: usize,
    pub tests_by_category: HashMap<String, usize>,
    pub tests_by_tag: HashMap<String, usize>,
}

impl CorpusStatistics {
    pub fn print(&self) {
        println!("=== Corpus Statistics ===");
        println!("Total scenarios: {}", self.total_tests);
        println!("Enabled: {}", self.enabled_tests);
        println!("Disabled: {}", self.disabled_tests);
        println!("Missing expectations: {}", self.missing_expectations);

        if !self.tests_by_category.is_empty() {
            println!("\nScenarios by category:");
            let mut categories: Vec<_> = self.tests_by_category.iter().collect();
            categories.sort_by_key(|(k, _)| k.as_str());
            for (category, count) in categories {
                println!("  {}: {}", category, count);
            }
        }

        if !self.tests_by_tag.is_empty() {
            println!("\nScenarios by tag:");
            let mut tags: Vec<_> = self.tests_by_tag.iter().collect();
            tags.sort_by_key(|(k, _)| k.as_str());
            for (tag, count) in tags {
                println!("  {}: {}", tag, count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scenario(name: &str, category: &str, tags: &[&str], enabled: bool) -> Scenario {
        let mut scenario = sample_scenario();
        scenario.name = name.to_string();
        scenario.category = category.to_string();
        scenario.metadata.tags = tags.iter().map(|t| t.to_string()).collect();
        scenario.metadata.enabled = enabled;
        scenario
    }

    #[test]
    fn test_corpus_manager_init() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());

        manager.init_corpus().unwrap();

        assert!(temp_dir.path().join("basic").exists());
        assert!(temp_dir.path().join("collections").exists());
        assert!(temp_dir.path().join("basic/hello-mapping/test.json").exists());
    }

    #[test]
    fn test_discover_tests() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());
        manager.init_corpus().unwrap();

        let scenarios = manager.discover_tests().unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].name, "hello-mapping");
        assert!(scenarios[0].location.is_some());
    }

    #[test]
    fn test_file_references_are_resolved() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("basic/by-ref");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("source.json"), r#"{"greeting": "hi"}"#).unwrap();
        fs::write(
            dir.join("test.json"),
            serde_json::to_string(&serde_json::json!({
                "name": "by-ref",
                "category": "basic",
                "input": {"mapping": {"name": "m"}, "source": "source.json"},
                "metadata": {"description": "file reference"}
            }))
            .unwrap(),
        )
        .unwrap();

        let manager = CorpusManager::new(temp_dir.path());
        let loaded = manager.load_test_case(&dir.join("test.json")).unwrap();
        assert_eq!(loaded.input.source, serde_json::json!({"greeting": "hi"}));
        assert!(loaded.expectations.should_succeed);
        assert_eq!(loaded.metadata.priority, 100);

        // Saving keeps the reference on disk
        manager.save(&loaded).unwrap();
        let raw: Value =
            serde_json::from_str(&fs::read_to_string(dir.join("test.json")).unwrap()).unwrap();
        assert_eq!(raw["input"]["source"], "source.json");
    }

    #[test]
    fn test_filters() {
        let manager = CorpusManager::new("unused");
        let scenarios = vec![
            scenario("one", "basic", &["smoke"], true),
            scenario("two", "collections", &["nested"], true),
            scenario("three", "basic", &[], false),
        ];

        assert_eq!(manager.filter_by_category(scenarios.clone(), "basic").len(), 2);
        assert_eq!(manager.filter_by_category(scenarios.clone(), "*").len(), 3);
        assert_eq!(
            manager
                .filter_by_tags(scenarios.clone(), &["nested".to_string()])
                .len(),
            1
        );
        assert_eq!(manager.filter_enabled(scenarios).len(), 2);
    }

    #[test]
    fn test_statistics() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());
        manager.init_corpus().unwrap();

        let stats = manager.get_statistics().unwrap();
        assert_eq!(stats.total_tests, 1);
        assert_eq!(stats.enabled_tests, 1);
        assert_eq!(stats.missing_expectations, 0);
        assert_eq!(stats.tests_by_category.get("basic"), Some(&1));
        assert_eq!(manager.list_categories().unwrap().len(), 4);
    }
}
