//! Session audit trail
//!
//! Per-field failures never abort a mapping session. They are recorded here
//! instead, as an append-only list owned by the session, and summarized in a
//! text report once execution finishes.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Severity of an audit or diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Info,
    Warn,
    Error,
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditStatus::Info => write!(f, "INFO"),
            AuditStatus::Warn => write!(f, "WARN"),
            AuditStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// A non-fatal record attached to a mapping session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub doc_id: Option<String>,
    pub path: Option<String>,
    pub message: String,
    pub status: AuditStatus,
    pub value: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Audit {
    pub fn new(status: AuditStatus, message: impl Into<String>) -> Self {
        Self {
            doc_id: None,
            path: None,
            message: message.into(),
            status,
            value: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_value(mut self, value: impl fmt::Display) -> Self {
        self.value = Some(value.to_string());
        self
    }
}

impl fmt::Display for Audit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)?;
        if let Some(path) = &self.path {
            write!(f, " (path={}", path)?;
            if let Some(doc_id) = &self.doc_id {
                write!(f, ", doc={}", doc_id)?;
            }
            write!(f, ")")?;
        }
        if let Some(value) = &self.value {
            write!(f, " value={}", value)?;
        }
        Ok(())
    }
}

/// Append-only audit list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Audits {
    entries: Vec<Audit>,
}

impl Audits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, audit: Audit) {
        match audit.status {
            AuditStatus::Error => log::error!("{}", audit),
            AuditStatus::Warn => log::warn!("{}", audit),
            AuditStatus::Info => log::debug!("{}", audit),
        }
        self.entries.push(audit);
    }

    pub fn info(&mut self, path: Option<&str>, message: impl Into<String>) {
        self.record(AuditStatus::Info, path, message);
    }

    pub fn warn(&mut self, path: Option<&str>, message: impl Into<String>) {
        self.record(AuditStatus::Warn, path, message);
    }

    pub fn error(&mut self, path: Option<&str>, message: impl Into<String>) {
        self.record(AuditStatus::Error, path, message);
    }

    fn record(&mut self, status: AuditStatus, path: Option<&str>, message: impl Into<String>) {
        let mut audit = Audit::new(status, message);
        audit.path = path.map(str::to_string);
        self.push(audit);
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|a| a.status == AuditStatus::Error)
    }

    pub fn error_count(&self) -> usize {
        self.count(AuditStatus::Error)
    }

    pub fn warn_count(&self) -> usize {
        self.count(AuditStatus::Warn)
    }

    pub fn count(&self, status: AuditStatus) -> usize {
        self.entries.iter().filter(|a| a.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Audit> {
        self.entries.iter()
    }

    pub fn by_status(&self, status: AuditStatus) -> Vec<&Audit> {
        self.entries.iter().filter(|a| a.status == status).collect()
    }

    pub fn as_slice(&self) -> &[Audit] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Audit> {
        self.entries
    }

    /// Human-readable summary grouped by status, most severe first
    pub fn report(&self) -> String {
        let mut grouped: BTreeMap<AuditStatus, Vec<&Audit>> = BTreeMap::new();
        for audit in &self.entries {
            grouped.entry(audit.status).or_default().push(audit);
        }

        let mut report = String::new();
        report.push_str("=== Mapping Audit Report ===\n\n");
        report.push_str(&format!("Total Audits: {}\n", self.entries.len()));
        report.push_str(&format!("Errors: {}\n", self.error_count()));
        report.push_str(&format!("Warnings: {}\n\n", self.warn_count()));

        for (status, audits) in grouped.iter().rev() {
            report.push_str(&format!("--- {} ({}) ---\n", status, audits.len()));
            for audit in audits.iter().take(10) {
                report.push_str(&format!(
                    "  • {}: {}\n",
                    audit.path.as_deref().unwrap_or("-"),
                    audit.message
                ));
            }
            if audits.len() > 10 {
                report.push_str(&format!("    ... and {} more\n", audits.len() - 10));
            }
            report.push('\n');
        }
        report
    }
}

impl<'a> IntoIterator for &'a Audits {
    type Item = &'a Audit;
    type IntoIter = std::slice::Iter<'a, Audit>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_errors() {
        let mut audits = Audits::new();
        assert!(!audits.has_errors());
        audits.info(Some("/a"), "read");
        audits.warn(Some("/b"), "no lookup entry");
        audits.error(Some("/c"), "failed");
        audits.error(None, "also failed");

        assert!(audits.has_errors());
        assert_eq!(audits.len(), 4);
        assert_eq!(audits.error_count(), 2);
        assert_eq!(audits.warn_count(), 1);
        assert_eq!(audits.by_status(AuditStatus::Info)[0].path.as_deref(), Some("/a"));
    }

    #[test]
    fn test_display() {
        let audit = Audit::new(AuditStatus::Warn, "no entry")
            .with_path("/x")
            .with_doc_id("DEFAULT.TARGET")
            .with_value("R");
        assert_eq!(
            audit.to_string(),
            "[WARN] no entry (path=/x, doc=DEFAULT.TARGET) value=R"
        );
    }

    #[test]
    fn test_report_orders_by_severity() {
        let mut audits = Audits::new();
        audits.info(Some("/a"), "first");
        audits.error(Some("/b"), "second");

        let report = audits.report();
        assert!(report.contains("Total Audits: 2"));
        let error_pos = report.find("--- ERROR (1) ---").unwrap();
        let info_pos = report.find("--- INFO (1) ---").unwrap();
        assert!(error_pos < info_pos);
    }

    #[test]
    fn test_status_serializes_screaming() {
        assert_eq!(serde_json::to_string(&AuditStatus::Warn).unwrap(), "\"WARN\"");
    }
}
