//! Field and document validation.
//!
//! Validation is pure and stops at the first failing field. The outcome is a
//! [`ValidationResult`]; callers that want an error instead use
//! [`ValidationResult::into_result`].

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelError, ModelResult},
    schema::{FieldOptions, FieldType, SchemaDescriptor},
    value::{Document, Value},
};

/// Reason used when a failed validation carries no message of its own.
pub const GENERIC_MISMATCH: &str = "Document does not match schema.";

/// Reason used when an input key is not part of the schema.
pub const FIELD_NOT_FOUND: &str = "Field not found in schema.";

/// Outcome of validating a value or a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub reason: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { valid: true, reason: None }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self { valid: false, reason: Some(reason.into()) }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Converts a failed result into [`ModelError::Validation`].
    pub fn into_result(self) -> ModelResult<()> {
        if self.valid {
            return Ok(());
        }

        Err(ModelError::Validation(
            self.reason
                .unwrap_or_else(|| GENERIC_MISMATCH.to_string()),
        ))
    }
}

/// How schema fields that are missing from the input are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingRequired {
    /// A required field missing from the input fails validation.
    #[default]
    Reject,
    /// Only keys present in the input are checked. A required field that is
    /// left out entirely passes.
    Ignore,
}

/// Validates one value against one field type.
///
/// `value` is `None` when the field was not supplied at all.
pub fn validate_field(
    field_type: &FieldType,
    value: Option<&Value>,
    field: &str,
    options: FieldOptions,
) -> ValidationResult {
    let value = match value {
        Some(value) => value,
        None if options.required => return ValidationResult::invalid(format!("{field} is required.")),
        None => return ValidationResult::valid(),
    };

    if value.is_null() {
        return if options.nullable {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(format!("{field} cannot be null."))
        };
    }

    let matches = match (field_type, value) {
        (FieldType::Custom(token), _) => {
            return ValidationResult::invalid(format!(
                "Unsupported type {token} and/or field {field}."
            ));
        }
        (FieldType::Date, Value::Date(_)) => true,
        (FieldType::String, Value::String(_)) => true,
        (FieldType::Number, Value::Number(_)) => true,
        (FieldType::Boolean, Value::Bool(_)) => true,
        _ => false,
    };

    if matches {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(format!(
            "{field} should be type of {}.",
            field_type.type_name()
        ))
    }
}

/// Validates a whole document against a schema.
///
/// Input keys are checked first, in key order. [`Document`] is a sorted map,
/// so when several fields fail the reported one is the first in key order,
/// not the first the caller inserted. With
/// [`MissingRequired::Reject`] every schema field absent from `data` is then
/// checked as an unsupplied value.
pub fn validate_document(
    schema: &SchemaDescriptor,
    data: &Document,
    missing: MissingRequired,
) -> ValidationResult {
    for (key, value) in data {
        let Some(descriptor) = schema.field(key) else {
            debug!("rejecting unknown field '{key}'");
            return ValidationResult::invalid(FIELD_NOT_FOUND);
        };

        let result = validate_field(descriptor.field_type(), Some(value), key, descriptor.options());
        if !result.valid {
            debug!("field '{key}' ({}) failed validation", value.kind_name());
            return result;
        }
    }

    if missing == MissingRequired::Reject {
        for (name, descriptor) in schema.fields() {
            if data.contains_key(name) {
                continue;
            }

            let result = validate_field(descriptor.field_type(), None, name, descriptor.options());
            if !result.valid {
                debug!("required field '{name}' is missing");
                return result;
            }
        }
    }

    ValidationResult::valid()
}
