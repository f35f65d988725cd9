//! Field action pipeline implementation
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use super::registry::ActionRegistry;
use super::ActionError;
use crate::conversion::ConversionService;
use crate::model::Action;
use crate::types::{FieldType, Value};

/// Threads a value through an ordered chain of actions
#[derive(Clone, Copy)]
pub struct FieldActionPipeline<'a> {
    registry: &'a ActionRegistry,
    conversions: &'a dyn ConversionService,
}

impl<'a> FieldActionPipeline<'a> {
    pub fn new(registry: &'a ActionRegistry, conversions: &'a dyn ConversionService) -> Self {
        Self {
            registry,
            conversions,
        }
    }

    /// Apply `actions` to `source_value` and return a value of `target_type`
    ///
    /// Complex targets are passed through untouched. A `target_type` of `All`
    /// accepts whatever type the last step produced.
    pub fn process(
        &self,
        actions: &[Action],
        source_value: Option<Value>,
        target_type: FieldType,
    ) -> Result<Option<Value>, ActionError> {
        if target_type == FieldType::Complex {
            return Ok(source_value);
        }

        let mut current_type = FieldType::of(source_value.as_ref());

        if actions.is_empty() {
            return match source_value {
                None => Ok(None),
                Some(value) => self
                    .convert(value, current_type, target_type, "field value")
                    .map(Some),
            };
        }

        let mut value = source_value;
        for action in actions {
            let detail = self.registry.find(&action.name, current_type)?;

            if detail.source_type != FieldType::All && detail.source_type != current_type {
                if let Some(v) = value.take() {
                    let context = format!("input of action '{}'", action.name);
                    value = Some(self.convert(v, current_type, detail.source_type, &context)?);
                }
            }

            log::trace!(
                "Applying action '{}' ({} -> {})",
                action.name,
                detail.source_type,
                detail.target_type
            );
            value = detail.invoke(action, value)?;

            // Wildcard outputs take the runtime type of what the action produced.
            current_type = match detail.target_type {
                FieldType::All => FieldType::of(value.as_ref()),
                declared => declared,
            };
        }

        match value {
            None => Ok(None),
            Some(v) => self
                .convert(v, current_type, target_type, "pipeline result")
                .map(Some),
        }
    }

    fn convert(
        &self,
        value: Value,
        from: FieldType,
        to: FieldType,
        context: &str,
    ) -> Result<Value, ActionError> {
        if to == FieldType::All || value.field_type() == to {
            return Ok(value);
        }
        self.conversions
            .convert(&value, from, to)
            .map_err(|e| ActionError::from_conversion(e, context))
    }
}
