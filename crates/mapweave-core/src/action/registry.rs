//! Static action registry
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use super::{built_in, ActionError};
use crate::model::Action;
use crate::types::{FieldType, Value};
use std::fmt;
use std::sync::{Arc, OnceLock};

static GLOBAL_REGISTRY: OnceLock<Arc<ActionRegistry>> = OnceLock::new();

/// Action implementation: receives the action (for its parameters) and the
/// value already converted to the declared source type
pub type ActionHandler = fn(&Action, Option<Value>) -> Result<Option<Value>, ActionError>;

/// Declared action parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionParameter {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
}

/// Static metadata and implementation of one registered action
#[derive(Clone)]
pub struct ActionDetail {
    pub name: String,
    pub source_type: FieldType,
    pub target_type: FieldType,
    pub parameters: Vec<ActionParameter>,
    pub description: Option<String>,
    handler: ActionHandler,
}

impl ActionDetail {
    pub fn new(
        name: impl Into<String>,
        source_type: FieldType,
        target_type: FieldType,
        handler: ActionHandler,
    ) -> Self {
        Self {
            name: name.into(),
            source_type,
            target_type,
            parameters: Vec::new(),
            description: None,
            handler,
        }
    }

    pub fn with_param(mut self, name: &str, field_type: FieldType, required: bool) -> Self {
        self.parameters.push(ActionParameter {
            name: name.to_string(),
            field_type,
            required,
        });
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Check that every required parameter is present
    pub fn check_parameters(&self, action: &Action) -> Result<(), ActionError> {
        for parameter in self.parameters.iter().filter(|p| p.required) {
            if action.param(&parameter.name).is_none() {
                return Err(ActionError::invalid_parameter(
                    &self.name,
                    &parameter.name,
                    "required parameter is missing",
                ));
            }
        }
        Ok(())
    }

    /// Run the implementation
    pub fn invoke(&self, action: &Action, value: Option<Value>) -> Result<Option<Value>, ActionError> {
        self.check_parameters(action)?;
        (self.handler)(action, value)
    }
}

impl fmt::Debug for ActionDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDetail")
            .field("name", &self.name)
            .field("source_type", &self.source_type)
            .field("target_type", &self.target_type)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Registry of action details, in registration order
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    details: Vec<ActionDetail>,
}

impl ActionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in string, number and generator actions
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        built_in::register_all(&mut registry);
        registry
    }

    /// Process-wide registry with the built-ins, populated at most once
    pub fn global() -> Arc<ActionRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| {
                let registry = ActionRegistry::with_builtins();
                log::debug!("Initialized action registry with {} details", registry.len());
                Arc::new(registry)
            })
            .clone()
    }

    pub fn register(&mut self, detail: ActionDetail) {
        self.details.push(detail);
    }

    /// All details registered under `name`, in registration order
    pub fn resolve(&self, name: &str) -> Vec<&ActionDetail> {
        self.details.iter().filter(|d| d.name == name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.details.iter().any(|d| d.name == name)
    }

    /// Pick the implementation of `name` for a value of `current_type`
    ///
    /// A single candidate is used as-is. With several, the one whose source
    /// type equals `current_type` wins; without an exact match the first
    /// registered candidate is used, which depends on registration order.
    pub fn find(&self, name: &str, current_type: FieldType) -> Result<&ActionDetail, ActionError> {
        let candidates = self.resolve(name);
        match candidates.as_slice() {
            [] => Err(ActionError::UnresolvedAction {
                name: name.to_string(),
            }),
            [only] => Ok(*only),
            [first, ..] => {
                if let Some(exact) = candidates.iter().find(|d| d.source_type == current_type) {
                    return Ok(*exact);
                }
                log::warn!(
                    "Action '{}' has {} implementations and none accepts {}; falling back to the first registered ({})",
                    name,
                    candidates.len(),
                    current_type,
                    first.source_type
                );
                Ok(*first)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Distinct action names, in registration order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for detail in &self.details {
            if !names.contains(&detail.name.as_str()) {
                names.push(&detail.name);
            }
        }
        names
    }
}
