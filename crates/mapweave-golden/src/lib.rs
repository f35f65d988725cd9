//! Golden scenario infrastructure for the Mapweave mapping engine
//!
//! A golden scenario is a directory holding a `test.json` with a mapping
//! document, a source document and the expected target plus audit counts.
//! The runner executes each scenario end to end and diffs the outcome.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

pub mod corpus;
pub mod diff;
pub mod runner;

use std::path::PathBuf;
use thiserror::Error;

pub use corpus::{CorpusManager, CorpusStatistics, Scenario};
pub use diff::{DiffEngine, DiffOptions, DiffResult};
pub use runner::{GoldenTestRunner, TestResult};

/// Golden test error types
#[derive(Debug, Error)]
pub enum GoldenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mapping error: {0}")]
    Mapping(#[from] mapweave_core::Error),

    #[error("Expectation mismatch: {0}")]
    Mismatch(String),

    #[error("Corpus error: {0}")]
    CorpusError(String),

    #[error("Test failed: {0}")]
    TestFailed(String),
}

pub type Result<T> = std::result::Result<T, GoldenError>;

/// Configuration for golden tests
#[derive(Debug, Clone)]
pub struct GoldenConfig {
    /// Root directory of the scenario corpus
    pub corpus_dir: PathBuf,

    /// Rewrite expectations that no longer match
    pub update_expected: bool,

    /// Fill in scenarios that have no expectation yet
    pub create_missing: bool,

    pub diff_options: DiffOptions,

    pub verbose: bool,
}

impl Default for GoldenConfig {
    fn default() -> Self {
        let update_expected = env_flag("UPDATE_GOLDEN").unwrap_or(false);
        Self {
            corpus_dir: PathBuf::from("../../golden-corpus"),
            update_expected,
            create_missing: update_expected,
            diff_options: DiffOptions::default(),
            verbose: false,
        }
    }
}

impl GoldenConfig {
    /// Defaults overridden by `GOLDEN_CORPUS_DIR`, `GOLDEN_VERBOSE` and
    /// `GOLDEN_NO_COLOR`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os("GOLDEN_CORPUS_DIR") {
            config.corpus_dir = PathBuf::from(dir);
        }
        config.verbose = env_flag("GOLDEN_VERBOSE").unwrap_or(config.verbose);
        if env_flag("GOLDEN_NO_COLOR").unwrap_or(false) {
            config.diff_options.colored = false;
        }
        config
    }

    pub fn with_corpus_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.corpus_dir = dir.into();
        self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Run one scenario and panic with the runner's report on failure
pub fn assert_scenario(scenario: &str) {
    let runner = GoldenTestRunner::new(GoldenConfig::from_env());
    if let Err(e) = runner.run_test(scenario) {
        panic!("Golden scenario {} failed: {}", scenario, e);
    }
}

/// Define a `#[test]` running one scenario, addressed as `category/name`
#[macro_export]
macro_rules! golden_test {
    ($name:ident, $scenario:expr) => {
        #[test]
        fn $name() {
            $crate::assert_scenario($scenario);
        }
    };
}

/// Define a `#[test]` running every scenario matching a pattern
#[macro_export]
macro_rules! golden_test_batch {
    ($name:ident, $pattern:expr) => {
        #[test]
        fn $name() {
            let runner = $crate::GoldenTestRunner::new($crate::GoldenConfig::from_env());
            let results = runner
                .run_batch($pattern)
                .unwrap_or_else(|e| panic!("Golden batch {} failed: {}", $pattern, e));
            assert!(!results.is_empty());
        }
    };
}
