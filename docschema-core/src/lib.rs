//! A declarative schema layer over generic document stores.
//!
//! This crate is the core of the docschema project and provides:
//!
//! - **Values** ([`value`]) - The closed set of value kinds a document may hold
//! - **Schemas** ([`schema`]) - Declarative field descriptors
//! - **Validation** ([`validate`]) - Field and document validation with first-error semantics
//! - **Queries** ([`query`]) - The filter/sort DSL and its translation into constraints
//! - **Adapters** ([`adapter`]) - The persistence interface concrete stores implement
//! - **Models** ([`model`]) - Validate-then-delegate CRUD over one collection
//! - **Registry** ([`registry`]) - The factory that names models and binds their schema
//! - **Pluralization** ([`pluralize`]) - Singular model names to plural collection names
//! - **Error handling** ([`error`]) - One error enum for every failure
//!
//! The core does no I/O of its own. Every read and write goes through a
//! [`PersistenceAdapter`](adapter::PersistenceAdapter).
//!
//! # Example
//!
//! ```ignore
//! use docschema_core::{
//!     document,
//!     registry::Registry,
//!     schema::{FieldSpec, FieldType, SchemaDescriptor},
//! };
//! use std::sync::Arc;
//!
//! let schema = SchemaDescriptor::builder()
//!     .field("title", FieldType::String)
//!     .field("views", FieldSpec::new(FieldType::Number).required())
//!     .build();
//!
//! let registry = Registry::new(Arc::new(adapter));
//! let posts = registry.model("post", schema)?;
//!
//! let id = posts.add(document! { "title" => "hi", "views" => 0 }, None).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docschema_core;

pub mod adapter;
pub mod error;
pub mod model;
pub mod pluralize;
pub mod query;
pub mod registry;
pub mod schema;
pub mod validate;
pub mod value;
