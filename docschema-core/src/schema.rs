//! Declarative document shapes.
//!
//! A [`SchemaDescriptor`] maps field names to [`FieldDescriptor`]s. A field is
//! described either by a bare [`FieldType`] or by a structured [`FieldSpec`]
//! carrying `required`, `nullable`, `default` and `ref`. The field set is
//! closed: documents may not carry keys the schema does not name.
//!
//! Schemas can be built in code or deserialized from the JSON shorthand:
//!
//! ```ignore
//! use docschema::schema::{FieldSpec, FieldType, SchemaDescriptor};
//!
//! let posts = SchemaDescriptor::builder()
//!     .field("title", FieldType::String)
//!     .field("views", FieldSpec::new(FieldType::Number).required())
//!     .build();
//!
//! let same: SchemaDescriptor = serde_json::from_value(serde_json::json!({
//!     "title": "string",
//!     "views": { "type": "number", "required": true },
//! }))?;
//! ```
//!
//! Type tokens are not checked when a schema is built. An unknown token such
//! as `"object"` becomes [`FieldType::Custom`] and is rejected the first time a
//! document is validated against it.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use crate::{
    error::ModelResult,
    value::{Document, Value},
};

/// Primitive kind a field's value must have.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    /// Any other type token. Never validates.
    Custom(String),
}

impl FieldType {
    /// The lowercase token used in schema definitions.
    pub fn token(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Custom(token) => token,
        }
    }

    /// The display name used in validation messages (`String`, `Number`, ...).
    pub fn type_name(&self) -> &str {
        match self {
            FieldType::String => "String",
            FieldType::Number => "Number",
            FieldType::Boolean => "Boolean",
            FieldType::Date => "Date",
            FieldType::Custom(token) => token,
        }
    }
}

impl From<&str> for FieldType {
    fn from(token: &str) -> Self {
        match token {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            other => FieldType::Custom(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(token: String) -> Self {
        FieldType::from(token.as_str())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.token().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Structured field description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Name of the model this field points at. Recorded only; never followed.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl FieldSpec {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            nullable: false,
            default: None,
            reference: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_ref(mut self, model: impl Into<String>) -> Self {
        self.reference = Some(model.into());
        self
    }
}

/// The `required`/`nullable` flags a field is validated with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldOptions {
    pub required: bool,
    pub nullable: bool,
}

/// Either a bare type (shorthand) or a structured spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDescriptor {
    Bare(FieldType),
    Structured(FieldSpec),
}

impl FieldDescriptor {
    pub fn field_type(&self) -> &FieldType {
        match self {
            FieldDescriptor::Bare(field_type) => field_type,
            FieldDescriptor::Structured(spec) => &spec.field_type,
        }
    }

    /// Bare types are never required and never nullable.
    pub fn options(&self) -> FieldOptions {
        match self {
            FieldDescriptor::Bare(_) => FieldOptions::default(),
            FieldDescriptor::Structured(spec) => FieldOptions {
                required: spec.required,
                nullable: spec.nullable,
            },
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        match self {
            FieldDescriptor::Bare(_) => None,
            FieldDescriptor::Structured(spec) => spec.default.as_ref(),
        }
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            FieldDescriptor::Bare(_) => None,
            FieldDescriptor::Structured(spec) => spec.reference.as_deref(),
        }
    }
}

impl From<FieldType> for FieldDescriptor {
    fn from(field_type: FieldType) -> Self {
        FieldDescriptor::Bare(field_type)
    }
}

impl From<&str> for FieldDescriptor {
    fn from(token: &str) -> Self {
        FieldDescriptor::Bare(FieldType::from(token))
    }
}

impl From<FieldSpec> for FieldDescriptor {
    fn from(spec: FieldSpec) -> Self {
        FieldDescriptor::Structured(spec)
    }
}

/// The complete, closed set of fields a document may carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDescriptor {
    fields: BTreeMap<String, FieldDescriptor>,
}

impl SchemaDescriptor {
    pub fn new(fields: BTreeMap<String, FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn builder() -> SchemaDescriptorBuilder {
        SchemaDescriptorBuilder::new()
    }

    /// Parses the JSON shorthand form.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Serialization`](crate::error::ModelError::Serialization)
    /// when a field is neither a type token nor a structured spec.
    pub fn from_json(value: serde_json::Value) -> ModelResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fills keys missing from `document` with their declared defaults.
    ///
    /// Keys already present, including ones set to null, are left alone.
    pub fn apply_defaults(&self, document: &mut Document) {
        for (name, descriptor) in &self.fields {
            if let Some(default) = descriptor.default_value() {
                document
                    .entry(name.clone())
                    .or_insert_with(|| default.clone());
            }
        }
    }
}

/// Fluent builder for [`SchemaDescriptor`].
#[derive(Debug, Default)]
pub struct SchemaDescriptorBuilder {
    fields: BTreeMap<String, FieldDescriptor>,
}

impl SchemaDescriptorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field. A later call with the same name replaces the earlier one.
    pub fn field(mut self, name: impl Into<String>, descriptor: impl Into<FieldDescriptor>) -> Self {
        self.fields.insert(name.into(), descriptor.into());
        self
    }

    pub fn build(self) -> SchemaDescriptor {
        SchemaDescriptor::new(self.fields)
    }
}
