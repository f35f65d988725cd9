//! Mapping engine
//!
//! The [`MappingEngine`] holds the read-only action registry and conversion
//! service shared by every session, and drives the execution of a
//! [`MappingSession`]: expansion of collection mappings, reading source
//! values, running field actions, and writing into the target trees.
//!
//! Per-field failures never abort a session. They are recorded as audits
//! and execution moves on to the next field or mapping.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::action::{ActionRegistry, FieldActionPipeline};
use crate::audit::{Audit, AuditStatus};
use crate::builder::{BuilderError, NodeProvider};
use crate::config::EngineConfig;
use crate::conversion::{ConversionService, DefaultConversionService};
use crate::expand::MappingExpander;
use crate::json::JsonNodeProvider;
use crate::model::{Field, FieldKind, LookupEntry, Mapping, MappingDocument};
use crate::session::MappingSession;
use crate::strategy::{self, PropertyStrategy};
use crate::types::{FieldType, Value};
use crate::validation::{Diagnostic, ValidationEngine};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Executes mapping documents against sessions
#[derive(Clone)]
pub struct MappingEngine {
    config: EngineConfig,
    actions: Arc<ActionRegistry>,
    conversions: Arc<dyn ConversionService>,
}

impl MappingEngine {
    /// Engine backed by the process-wide registries
    pub fn new(config: EngineConfig) -> Self {
        let conversions: Arc<dyn ConversionService> = DefaultConversionService::global();
        Self::with_registries(config, ActionRegistry::global(), conversions)
    }

    pub fn with_registries(
        config: EngineConfig,
        actions: Arc<ActionRegistry>,
        conversions: Arc<dyn ConversionService>,
    ) -> Self {
        Self {
            config,
            actions,
            conversions,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn conversions(&self) -> &dyn ConversionService {
        self.conversions.as_ref()
    }

    /// Validator configured with this engine's registries and mode
    pub fn validator(&self) -> ValidationEngine<'_> {
        ValidationEngine::with_mode(
            self.conversions.as_ref(),
            &self.actions,
            self.config.validation_mode,
        )
    }

    pub fn validate(&self, document: &MappingDocument) -> Vec<Diagnostic> {
        self.validator().validate(document)
    }

    pub fn create_session<P: NodeProvider>(&self, document: Arc<MappingDocument>) -> MappingSession<P> {
        MappingSession::new(document)
    }

    /// Run `document` over a JSON source into a fresh JSON target
    pub fn execute_json(
        &self,
        document: Arc<MappingDocument>,
        source: serde_json::Value,
    ) -> Result<MappingSession<JsonNodeProvider>> {
        let mut session = MappingSession::json(document, source);
        self.process(&mut session)?;
        Ok(session)
    }

    /// Execute every mapping of the session's document
    ///
    /// Fails only when the session cannot start: no target document, or
    /// validation errors with `fail_on_validation_errors`. Failed writes,
    /// including nodes a provider cannot resolve, are audited.
    pub fn process<P: NodeProvider>(&self, session: &mut MappingSession<P>) -> Result<()> {
        let document = session.shared_document();
        let span = tracing::info_span!(
            "mapping_session",
            document = %document.name,
            session_id = %session.metadata().session_id
        );
        let _enter = span.enter();

        session.metadata_mut().start();
        let result = self.run(session, &document);
        session.metadata_mut().finish();

        info!(
            audits = session.audits().len(),
            errors = session.audits().error_count(),
            duration_ms = session.metadata().duration_ms.unwrap_or_default(),
            "Mapping session finished"
        );
        result
    }

    fn run<P: NodeProvider>(
        &self,
        session: &mut MappingSession<P>,
        document: &MappingDocument,
    ) -> Result<()> {
        if session.target_ids().is_empty() {
            return Err(Error::Precondition {
                message: "session has no target documents".to_string(),
                diagnostics: 0,
            });
        }

        if self.config.validate_before_execution {
            let diagnostics = self.validate(document);
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            session.set_validations(diagnostics);
            if errors > 0 && self.config.fail_on_validation_errors {
                return Err(Error::Precondition {
                    message: format!("mapping document '{}' failed validation", document.name),
                    diagnostics: errors,
                });
            }
        }

        for mapping in &document.mappings {
            let expansion = MappingExpander::expand(mapping, &session.size_oracle());
            for error in expansion.errors {
                session.audit(Audit::new(AuditStatus::Error, error.to_string()));
            }
            debug!("{} expanded into {} mappings", mapping, expansion.mappings.len());

            for concrete in &expansion.mappings {
                self.process_mapping(session, document, concrete)?;
            }
        }
        Ok(())
    }

    fn process_mapping<P: NodeProvider>(
        &self,
        session: &mut MappingSession<P>,
        document: &MappingDocument,
        mapping: &Mapping,
    ) -> Result<()> {
        log::debug!("Processing {}", mapping);
        match mapping {
            Mapping::Map { source, target } => {
                let Some(value) = self.source_value(session, document, source) else {
                    return Ok(());
                };
                self.write_target(session, target, value)
            }
            Mapping::Combine {
                sources,
                target,
                delimiter,
            } => self.process_combine(session, document, sources, target, delimiter.as_deref()),
            Mapping::Separate {
                source,
                targets,
                delimiter,
            } => self.process_separate(session, document, source, targets, delimiter.as_deref()),
            Mapping::Lookup {
                source,
                target,
                lookup_table_name,
            } => self.process_lookup(session, document, source, target, lookup_table_name),
            Mapping::Collection { .. } => {
                log::warn!("Skipping unexpanded collection mapping {}", mapping);
                Ok(())
            }
        }
    }

    fn process_combine<P: NodeProvider>(
        &self,
        session: &mut MappingSession<P>,
        document: &MappingDocument,
        sources: &[Field],
        target: &Field,
        delimiter: Option<&str>,
    ) -> Result<()> {
        if let Some(unindexed) = sources.iter().find(|f| f.index.is_none()) {
            let message = format!(
                "Combine requires Index value to be set on all sourceFields sourceField.path={}",
                unindexed.describe()
            );
            session.audit(field_audit(AuditStatus::Error, target, message));
            return Ok(());
        }

        let mut values = BTreeMap::new();
        for source in sources {
            let Some(Some(value)) = self.source_value(session, document, source) else {
                continue;
            };
            let index = source.index.unwrap_or_default();
            match self.pipeline().process(&[], Some(value), FieldType::String) {
                Ok(Some(Value::String(text))) => {
                    values.insert(index, text);
                }
                Ok(_) => {}
                Err(err) => session.audit(field_audit(AuditStatus::Error, source, err.to_string())),
            }
        }

        let delimiter = delimiter.unwrap_or(self.config.default_delimiter.as_str());
        let combined = strategy::combine(&values, delimiter);
        if combined.is_empty() {
            log::debug!("Empty combined string for {}", target.describe());
            return Ok(());
        }
        self.write_target(session, target, Some(Value::String(combined)))
    }

    fn process_separate<P: NodeProvider>(
        &self,
        session: &mut MappingSession<P>,
        document: &MappingDocument,
        source: &Field,
        targets: &[Field],
        delimiter: Option<&str>,
    ) -> Result<()> {
        if let Some(unindexed) = targets.iter().find(|f| f.index.is_none()) {
            let message = format!(
                "Separate requires Index value to be set on all targetFields targetField.path={}",
                unindexed.describe()
            );
            session.audit(field_audit(AuditStatus::Error, unindexed, message));
            return Ok(());
        }

        let Some(Some(value)) = self.source_value(session, document, source) else {
            log::debug!("Nothing to separate at {}", source.describe());
            return Ok(());
        };
        let text = match self.pipeline().process(&[], Some(value), FieldType::String) {
            Ok(Some(Value::String(text))) => text,
            Ok(_) => return Ok(()),
            Err(err) => {
                session.audit(field_audit(AuditStatus::Error, source, err.to_string()));
                return Ok(());
            }
        };

        let delimiter = delimiter.unwrap_or(self.config.default_delimiter.as_str());
        let tokens = strategy::separate(&text, delimiter);
        if tokens.is_empty() {
            log::debug!("Empty string for Separate mapping at {}", source.describe());
            return Ok(());
        }

        for target in targets {
            let index = target.index.unwrap_or_default();
            let Some(token) = tokens.get(index as usize) else {
                let message = format!(
                    "Separate returned fewer segments count={} when targetField.path={} requested index={}",
                    tokens.len(),
                    target.describe(),
                    index
                );
                session.audit(field_audit(AuditStatus::Error, target, message));
                continue;
            };
            self.write_target(session, target, Some(Value::String(token.clone())))?;
        }
        Ok(())
    }

    fn process_lookup<P: NodeProvider>(
        &self,
        session: &mut MappingSession<P>,
        document: &MappingDocument,
        source: &Field,
        target: &Field,
        table_name: &str,
    ) -> Result<()> {
        let Some(table) = document.lookup_table(table_name) else {
            let message = format!("Could not find lookup table with name '{}'", table_name);
            session.audit(field_audit(AuditStatus::Error, target, message));
            return Ok(());
        };

        let Some(Some(value)) = self.source_value(session, document, source) else {
            return Ok(());
        };
        let key = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };

        let Some(entry) = table.lookup(&key) else {
            let message = format!("No lookup entry in table '{}' for source value", table_name);
            session.audit(field_audit(AuditStatus::Warn, target, message).with_value(&key));
            return Ok(());
        };

        match self.lookup_value(entry) {
            Ok(value) => self.write_target(session, target, Some(value)),
            Err(err) => {
                session.audit(field_audit(AuditStatus::Error, target, err.to_string()));
                Ok(())
            }
        }
    }

    fn lookup_value(&self, entry: &LookupEntry) -> Result<Value> {
        let value = Value::String(entry.target_value.clone());
        match entry.target_type() {
            FieldType::String | FieldType::All => Ok(value),
            to => Ok(self.conversions.convert(&value, FieldType::String, to)?),
        }
    }

    /// Read `field` and run its actions
    ///
    /// `None` means the field failed and was audited; `Some(None)` is a
    /// missing or null value.
    fn source_value<P: NodeProvider>(
        &self,
        session: &mut MappingSession<P>,
        document: &MappingDocument,
        field: &Field,
    ) -> Option<Option<Value>> {
        let result = self
            .read_field(session, document, field)
            .and_then(|value| {
                self.pipeline()
                    .process(&field.actions, value, field.declared_type())
                    .map_err(Error::from)
            });
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                session.audit(field_audit(AuditStatus::Error, field, err.to_string()));
                None
            }
        }
    }

    fn read_field<P: NodeProvider>(
        &self,
        session: &MappingSession<P>,
        document: &MappingDocument,
        field: &Field,
    ) -> Result<Option<Value>> {
        match &field.kind {
            FieldKind::Constant => Ok(field.value.clone()),
            FieldKind::Property { name } => {
                let value = PropertyStrategy::new(self.config.environment_properties).resolve(
                    name,
                    session.properties(),
                    &document.properties,
                );
                if value.is_none() {
                    log::debug!("Property '{}' is not set", name);
                }
                Ok(value)
            }
            FieldKind::Simple | FieldKind::Format { .. } => {
                let path = field.path.as_ref().ok_or_else(|| {
                    Error::source(field.describe(), "source field has no path")
                })?;
                session.source_for(field)?.read(path)
            }
        }
    }

    /// Run the target actions and write the result into the target tree
    fn write_target<P: NodeProvider>(
        &self,
        session: &mut MappingSession<P>,
        target: &Field,
        value: Option<Value>,
    ) -> Result<()> {
        let value = match self
            .pipeline()
            .process(&target.actions, value, target.declared_type())
        {
            Ok(value) => value,
            Err(err) => {
                session.audit(field_audit(AuditStatus::Error, target, err.to_string()));
                return Ok(());
            }
        };

        if value.is_none() && !self.config.write_null_values {
            log::debug!("Skipping null value for {}", target.describe());
            return Ok(());
        }

        if !target.is_document_field() {
            session.audit(field_audit(
                AuditStatus::Error,
                target,
                "Target field must be a document field",
            ));
            return Ok(());
        }

        let doc_id = session.target_id_for(target).to_string();
        if session.target(&doc_id).is_none() {
            let message = format!("No target document registered for '{}'", doc_id);
            session.audit(field_audit(AuditStatus::Error, target, message));
            return Ok(());
        }

        let conversions = self.conversions.as_ref();
        let written = match session.target_mut(&doc_id) {
            Some(builder) => builder.write(target, |field| convert_for_write(conversions, field, value)),
            None => Ok(()),
        };
        if let Err(err) = written {
            session.audit(field_audit(AuditStatus::Error, target, err.to_string()).with_doc_id(doc_id));
        }
        Ok(())
    }

    fn pipeline(&self) -> FieldActionPipeline<'_> {
        FieldActionPipeline::new(&self.actions, self.conversions.as_ref())
    }
}

/// Final conversion to the declared target type at write time
fn convert_for_write(
    conversions: &dyn ConversionService,
    field: &Field,
    value: Option<Value>,
) -> std::result::Result<Option<Value>, BuilderError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let to = field.declared_type();
    if matches!(to, FieldType::All | FieldType::Complex) || value.field_type() == to {
        return Ok(Some(value));
    }
    conversions
        .convert(&value, conversions.field_type_of(&value), to)
        .map(Some)
        .map_err(|e| BuilderError::Conversion {
            path: field.describe(),
            message: e.to_string(),
        })
}

fn field_audit(status: AuditStatus, field: &Field, message: impl Into<String>) -> Audit {
    let audit = Audit::new(status, message).with_path(field.describe());
    match &field.doc_id {
        Some(doc_id) => audit.with_doc_id(doc_id.clone()),
        None => audit,
    }
}
