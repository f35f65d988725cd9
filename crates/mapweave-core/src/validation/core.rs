//! Validation engine
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use super::rules::{validate_document_header, validate_lookup_tables, validate_mapping};
use super::{Diagnostic, ValidationMode};
use crate::action::ActionRegistry;
use crate::audit::AuditStatus;
use crate::conversion::ConversionService;
use crate::model::MappingDocument;

/// Statically checks mapping documents against the registered converters and
/// actions
pub struct ValidationEngine<'a> {
    pub(crate) conversions: &'a dyn ConversionService,
    pub(crate) actions: &'a ActionRegistry,
    mode: ValidationMode,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(conversions: &'a dyn ConversionService, actions: &'a ActionRegistry) -> Self {
        Self::with_mode(conversions, actions, ValidationMode::Strict)
    }

    pub fn with_mode(
        conversions: &'a dyn ConversionService,
        actions: &'a ActionRegistry,
        mode: ValidationMode,
    ) -> Self {
        Self {
            conversions,
            actions,
            mode,
        }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Run every rule over `document`
    pub fn validate(&self, document: &MappingDocument) -> Vec<Diagnostic> {
        let mut diagnostics = validate_document_header(document);

        for (i, mapping) in document.mappings.iter().enumerate() {
            validate_mapping(self, mapping, &format!("mappings[{}]", i), &mut diagnostics);
        }

        diagnostics.extend(validate_lookup_tables(document));

        let diagnostics = self.filter_by_mode(diagnostics);
        log::debug!(
            "Validated '{}': {} diagnostics ({} errors)",
            document.name,
            diagnostics.len(),
            diagnostics.iter().filter(|d| d.is_error()).count()
        );
        diagnostics
    }

    fn filter_by_mode(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        match self.mode {
            ValidationMode::Strict => diagnostics,
            ValidationMode::Lenient => diagnostics
                .into_iter()
                .filter(|d| d.status == AuditStatus::Error)
                .collect(),
        }
    }
}
