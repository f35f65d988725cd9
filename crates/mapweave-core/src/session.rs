//! Mapping sessions
//!
//! A [`MappingSession`] is one execution of a mapping document: it owns the
//! source documents to read from, one [`TreeBuilder`] per target document,
//! the property bag, and the audits and validation diagnostics produced
//! along the way. Sessions are exclusively owned and never shared; the
//! mapping document itself is shared read-only through an `Arc`.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::audit::{Audit, Audits};
use crate::builder::{NodeProvider, TreeBuilder};
use crate::expand::{ExpansionError, SourceCollectionSizeOracle};
use crate::json::{JsonNodeProvider, JsonSourceDocument};
use crate::model::{Field, MappingDocument};
use crate::path::PathExpression;
use crate::types::Value;
use crate::validation::Diagnostic;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Document id used when a field names no source document
pub const DEFAULT_SOURCE_ID: &str = "DEFAULT.SOURCE";

/// Document id used when a field names no target document
pub const DEFAULT_TARGET_ID: &str = "DEFAULT.TARGET";

/// Read access to one source document
pub trait SourceDocument: Send + Sync {
    /// Scalar value at `path`; `None` when absent or null
    fn read(&self, path: &PathExpression) -> Result<Option<Value>>;

    /// Number of elements of the innermost collection on `path`
    fn collection_size(&self, path: &PathExpression) -> std::result::Result<u32, ExpansionError>;
}

/// Timing of a session run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
}

impl SessionMetadata {
    fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            started_at: None,
            finished_at: None,
            duration_ms: None,
        }
    }

    pub(crate) fn start(&mut self) {
        self.started_at = Some(Utc::now());
        self.finished_at = None;
        self.duration_ms = None;
    }

    pub(crate) fn finish(&mut self) {
        let finished = Utc::now();
        self.duration_ms = self
            .started_at
            .map(|started| (finished - started).num_milliseconds());
        self.finished_at = Some(finished);
    }
}

/// State of one mapping execution
pub struct MappingSession<P: NodeProvider> {
    document: Arc<MappingDocument>,
    sources: BTreeMap<String, Box<dyn SourceDocument>>,
    targets: BTreeMap<String, TreeBuilder<P>>,
    properties: BTreeMap<String, Value>,
    audits: Audits,
    validations: Vec<Diagnostic>,
    metadata: SessionMetadata,
}

impl<P: NodeProvider> fmt::Debug for MappingSession<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingSession")
            .field("document", &self.document.name)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("targets", &self.targets.keys().collect::<Vec<_>>())
            .field("audits", &self.audits.len())
            .field("validations", &self.validations.len())
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl<P: NodeProvider> MappingSession<P> {
    pub fn new(document: Arc<MappingDocument>) -> Self {
        Self {
            document,
            sources: BTreeMap::new(),
            targets: BTreeMap::new(),
            properties: BTreeMap::new(),
            audits: Audits::new(),
            validations: Vec::new(),
            metadata: SessionMetadata::new(),
        }
    }

    pub fn document(&self) -> &MappingDocument {
        &self.document
    }

    pub(crate) fn shared_document(&self) -> Arc<MappingDocument> {
        Arc::clone(&self.document)
    }

    pub fn add_source(&mut self, doc_id: impl Into<String>, source: impl SourceDocument + 'static) {
        self.sources.insert(doc_id.into(), Box::new(source));
    }

    /// Register a target document built by `provider`
    pub fn add_target(&mut self, doc_id: impl Into<String>, provider: P) {
        self.targets.insert(doc_id.into(), TreeBuilder::new(provider));
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn audits(&self) -> &Audits {
        &self.audits
    }

    pub fn audits_mut(&mut self) -> &mut Audits {
        &mut self.audits
    }

    pub fn validations(&self) -> &[Diagnostic] {
        &self.validations
    }

    pub(crate) fn set_validations(&mut self, validations: Vec<Diagnostic>) {
        self.validations = validations;
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut SessionMetadata {
        &mut self.metadata
    }

    /// Whether any ERROR audit was recorded
    pub fn has_errors(&self) -> bool {
        self.audits.has_errors()
    }

    pub fn target(&self, doc_id: &str) -> Option<&TreeBuilder<P>> {
        self.targets.get(doc_id)
    }

    pub fn target_ids(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    pub fn into_targets(self) -> BTreeMap<String, TreeBuilder<P>> {
        self.targets
    }

    /// Source document for `field`
    ///
    /// An explicit `doc_id` must be registered. Without one, a lone registered
    /// source is used, otherwise the default source id.
    pub fn source_for(&self, field: &Field) -> std::result::Result<&dyn SourceDocument, ExpansionError> {
        let doc_id = resolve_doc_id(field.doc_id.as_deref(), &self.sources, DEFAULT_SOURCE_ID);
        self.sources
            .get(doc_id)
            .map(|source| source.as_ref())
            .ok_or_else(|| ExpansionError::UnknownDocument {
                doc_id: doc_id.to_string(),
            })
    }

    /// Target id for `field`, resolved like [`Self::source_for`]
    pub fn target_id_for<'f>(&'f self, field: &'f Field) -> &'f str {
        resolve_doc_id(field.doc_id.as_deref(), &self.targets, DEFAULT_TARGET_ID)
    }

    pub(crate) fn target_mut(&mut self, doc_id: &str) -> Option<&mut TreeBuilder<P>> {
        self.targets.get_mut(doc_id)
    }

    pub(crate) fn audit(&mut self, audit: Audit) {
        self.audits.push(audit);
    }

    /// Collection sizes answered by the field's source document
    pub fn size_oracle(&self) -> SessionSizeOracle<'_, P> {
        SessionSizeOracle { session: self }
    }
}

fn resolve_doc_id<'a, T>(
    explicit: Option<&'a str>,
    registered: &'a BTreeMap<String, T>,
    default: &'a str,
) -> &'a str {
    if let Some(doc_id) = explicit {
        return doc_id;
    }
    match registered.keys().next() {
        Some(only) if registered.len() == 1 => only,
        _ => default,
    }
}

/// Adapts the session's sources into a [`SourceCollectionSizeOracle`]
pub struct SessionSizeOracle<'s, P: NodeProvider> {
    session: &'s MappingSession<P>,
}

impl<P: NodeProvider> SourceCollectionSizeOracle for SessionSizeOracle<'_, P> {
    fn size(&self, field: &Field) -> std::result::Result<u32, ExpansionError> {
        let path = field.path.as_ref().ok_or_else(|| ExpansionError::MissingSource {
            mapping: field.describe(),
        })?;
        self.session.source_for(field)?.collection_size(path)
    }
}

impl MappingSession<JsonNodeProvider> {
    /// Session reading `source` and building a JSON target, both under the
    /// default document ids
    pub fn json(document: Arc<MappingDocument>, source: serde_json::Value) -> Self {
        let mut session = Self::new(document);
        session.add_source(DEFAULT_SOURCE_ID, JsonSourceDocument::new(source));
        session.add_target(DEFAULT_TARGET_ID, JsonNodeProvider::new());
        session
    }

    /// Rendered JSON of a target document
    pub fn target_json(&self, doc_id: &str) -> Option<serde_json::Value> {
        self.target(doc_id).map(TreeBuilder::to_json)
    }
}
