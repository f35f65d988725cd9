//! Golden scenario runner
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::{
    corpus::{CorpusManager, Scenario, SCENARIO_FILE},
    diff::DiffEngine,
    GoldenConfig, GoldenError, Result,
};
use colored::*;
use mapweave_core::{
    EngineConfig, MappingDocument, MappingEngine, MappingSession, Value as FieldValue,
    DEFAULT_TARGET_ID,
};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

/// Result of running one scenario
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub error: Option<String>,
    pub diff: Option<String>,
    pub duration_ms: u64,
    /// Whether the expectation was rewritten
    pub updated: bool,
}

impl TestResult {
    fn failed(name: String, error: impl ToString, duration_ms: u64) -> Self {
        Self {
            name,
            passed: false,
            error: Some(error.to_string()),
            diff: None,
            duration_ms,
            updated: false,
        }
    }

    pub fn print(&self, verbose: bool) {
        let status = if self.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!("{} {} ({}ms)", status, self.name, self.duration_ms);

        if let Some(ref error) = self.error {
            println!("  {}: {}", "Error".red(), error);
        }

        if verbose || !self.passed {
            if let Some(ref diff) = self.diff {
                println!("{}", diff);
            }
        }

        if self.updated {
            println!("  {}", "Expectation updated".yellow());
        }
    }
}

/// What a scenario run produced before judging
enum Verdict {
    Pass { updated: bool },
    Mismatch { diff: String },
}

/// Runs scenarios through the mapping engine and judges the outcome
pub struct GoldenTestRunner {
    config: GoldenConfig,
    corpus: CorpusManager,
}

impl GoldenTestRunner {
    pub fn new(config: GoldenConfig) -> Self {
        let corpus = CorpusManager::new(&config.corpus_dir);
        Self { config, corpus }
    }

    /// Create the corpus layout with a sample scenario
    pub fn init_corpus(&self) -> Result<()> {
        self.corpus.init_corpus()
    }

    pub fn get_statistics(&self) -> Result<()> {
        self.corpus.get_statistics()?.print();
        Ok(())
    }

    /// Run one scenario, addressed as `category/name`
    pub fn run_test(&self, scenario_name: &str) -> Result<TestResult> {
        let path = self.config.corpus_dir.join(scenario_name).join(SCENARIO_FILE);
        let scenario = self.corpus.load_test_case(&path)?;

        let result = self.run_scenario(&scenario, scenario_name.to_string());
        if self.config.verbose {
            result.print(true);
        }

        if result.passed {
            Ok(result)
        } else {
            Err(GoldenError::TestFailed(format!(
                "Scenario '{}' failed: {}",
                scenario_name,
                result.error.as_deref().unwrap_or("unknown error")
            )))
        }
    }

    /// Run every scenario whose name or category contains `pattern` (`*` for all)
    pub fn run_batch(&self, pattern: &str) -> Result<Vec<TestResult>> {
        let scenarios: Vec<Scenario> = self
            .corpus
            .discover_tests()?
            .into_iter()
            .filter(|s| pattern == "*" || s.name.contains(pattern) || s.category.contains(pattern))
            .collect();

        if scenarios.is_empty() {
            return Err(GoldenError::CorpusError(format!(
                "No scenarios found matching pattern '{}'",
                pattern
            )));
        }

        println!("Running {} scenarios...\n", scenarios.len());

        let mut results = Vec::with_capacity(scenarios.len());
        for scenario in &scenarios {
            let result = self.run_scenario(scenario, format!("{}/{}", scenario.category, scenario.name));
            result.print(self.config.verbose);
            results.push(result);
        }

        let failed = results.iter().filter(|r| !r.passed).count();
        println!("\n{}", "=== Scenario Summary ===".bold());
        println!(
            "{}: {} passed, {} failed",
            "Results".bold(),
            (results.len() - failed).to_string().green(),
            failed.to_string().red()
        );

        if failed > 0 {
            Err(GoldenError::TestFailed(format!("{} scenario(s) failed", failed)))
        } else {
            Ok(results)
        }
    }

    fn run_scenario(&self, scenario: &Scenario, name: String) -> TestResult {
        let start = Instant::now();
        let verdict = self.execute_test(scenario);
        let duration_ms = start.elapsed().as_millis() as u64;

        match verdict {
            Ok(Verdict::Pass { updated }) => TestResult {
                name,
                passed: true,
                error: None,
                diff: None,
                duration_ms,
                updated,
            },
            Ok(Verdict::Mismatch { diff }) => TestResult {
                diff: Some(diff),
                ..TestResult::failed(name, "Outcome does not match expectation", duration_ms)
            },
            Err(e) => TestResult::failed(name, e, duration_ms),
        }
    }

    fn execute_test(&self, scenario: &Scenario) -> Result<Verdict> {
        if !scenario.metadata.enabled {
            return Ok(Verdict::Pass { updated: false });
        }

        let outcome = perform_mapping(scenario);

        if !scenario.expectations.should_succeed {
            return match outcome {
                Ok(_) => Err(GoldenError::Mismatch(
                    "Expected the session to fail but it completed".to_string(),
                )),
                Err(GoldenError::Mapping(e)) => {
                    check_error_pattern(scenario.expectations.error_pattern.as_deref(), &e)?;
                    Ok(Verdict::Pass { updated: false })
                }
                Err(other) => Err(other),
            };
        }

        let actual = outcome?;
        let Some(expected) = scenario.expected.as_ref() else {
            if self.config.create_missing {
                self.rewrite_expectation(scenario, actual)?;
                return Ok(Verdict::Pass { updated: true });
            }
            return Err(GoldenError::Mismatch(format!(
                "Scenario '{}' has no expectation. Run with UPDATE_GOLDEN=1 to record it.",
                scenario.name
            )));
        };

        let mut diff_engine = DiffEngine::new(self.config.diff_options.clone());
        for path in &scenario.expectations.ignore_fields {
            diff_engine.ignore_field(path);
        }
        for volatile in &scenario.expectations.volatile_fields {
            diff_engine.add_volatile_pattern(&volatile.path, &volatile.pattern)?;
        }

        let diff = diff_engine.compare(expected, &actual);
        if diff.matches {
            return Ok(Verdict::Pass { updated: false });
        }

        if self.config.update_expected {
            self.rewrite_expectation(scenario, actual)?;
            return Ok(Verdict::Pass { updated: true });
        }

        let mut report = diff.diff_output;
        if !diff.summary.differing_paths.is_empty() {
            report.push_str("\nDiffering paths:\n");
            for path in &diff.summary.differing_paths {
                report.push_str(&format!("  {}\n", path));
            }
        }
        Ok(Verdict::Mismatch { diff: report })
    }

    fn rewrite_expectation(&self, scenario: &Scenario, actual: Value) -> Result<()> {
        let mut updated = scenario.clone();
        updated.expected = Some(actual);
        updated.metadata.updated_at = Some(chrono::Utc::now().to_rfc3339());
        self.corpus.save(&updated)
    }
}

/// Run the scenario's mapping and render `{"target": ..., "audits": {...}}`
pub fn perform_mapping(scenario: &Scenario) -> Result<Value> {
    let document: MappingDocument = serde_json::from_value(scenario.input.mapping.clone())?;
    let config: EngineConfig = match &scenario.input.config {
        Some(config) => serde_json::from_value(config.clone())?,
        None => EngineConfig::default(),
    };

    let engine = MappingEngine::new(config);
    let mut session = MappingSession::json(Arc::new(document), scenario.input.source.clone());
    for (name, value) in &scenario.input.properties {
        let value = FieldValue::from_json(value).ok_or_else(|| {
            GoldenError::CorpusError(format!("Property '{}' must be a JSON scalar", name))
        })?;
        session.set_property(name.clone(), value);
    }

    engine.process(&mut session)?;

    let audits = session.audits();
    Ok(json!({
        "target": session.target_json(DEFAULT_TARGET_ID).unwrap_or(Value::Null),
        "audits": {
            "errors": audits.error_count(),
            "warnings": audits.warn_count(),
        }
    }))
}

fn check_error_pattern(pattern: Option<&str>, error: &mapweave_core::Error) -> Result<()> {
    let Some(pattern) = pattern else {
        return Ok(());
    };
    let regex = Regex::new(pattern)
        .map_err(|e| GoldenError::CorpusError(format!("Invalid error pattern: {}", e)))?;
    let message = error.to_string();
    if regex.is_match(&message) {
        Ok(())
    } else {
        Err(GoldenError::Mismatch(format!(
            "Error '{}' does not match pattern '{}'",
            message, pattern
        )))
    }
}
