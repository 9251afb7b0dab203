//! Convenient re-exports of commonly used types from docschema.
//!
//! ```ignore
//! use docschema::prelude::*;
//! ```

pub use docschema_core::{
    adapter::{AdapterBuilder, PersistenceAdapter, SharedAdapter},
    error::{ModelError, ModelResult},
    model::{Model, ModelOptions},
    pluralize::{EnglishPluralizer, Pluralize, Verbatim},
    query::{Condition, Constraint, Filter, Operator, Query, QueryBuilder, QueryEntry, SortDirection, SortOrder},
    registry::{Registry, RegistryBuilder},
    schema::{FieldDescriptor, FieldSpec, FieldType, SchemaDescriptor},
    validate::{MissingRequired, ValidationResult, validate_document, validate_field},
    value::{Document, StoredDocument, Value, document_from_json, document_to_json},
};
