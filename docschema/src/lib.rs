//! Main docschema crate: declarative schemas and a query DSL over document stores.
//!
//! This crate is the primary entry point for users of docschema. It re-exports
//! the core types from the sub-crates and provides access to the bundled
//! persistence adapters.
//!
//! # Features
//!
//! - **Declarative schemas** - Describe a document shape once, enforce it on every write
//! - **Validation** - First-error validation with human-readable reasons
//! - **Query DSL** - Filters and sorts translated into backend constraints
//! - **Multiple backends** - In-memory and MongoDB adapters behind one trait
//!
//! # Quick Start
//!
//! ```ignore
//! use docschema::{document, memory::InMemoryAdapter, prelude::*};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ModelError> {
//!     let registry = Registry::builder()
//!         .adapter(InMemoryAdapter::new())
//!         .build()?;
//!
//!     let schema = SchemaDescriptor::builder()
//!         .field("title", FieldType::String)
//!         .field("views", FieldSpec::new(FieldType::Number).required())
//!         .build();
//!
//!     // Stored in the "posts" collection
//!     let posts = registry.model("post", schema)?;
//!
//!     let id = posts
//!         .add(document! { "title" => "Hello", "views" => 10 }, None)
//!         .await?;
//!
//!     // Rejected: "views should be type of Number."
//!     assert!(posts.edit(document! { "views" => "ten" }, &id).await.is_err());
//!
//!     let popular = posts
//!         .get(
//!             Query::builder()
//!                 .filter(Filter::gt("views", 5))
//!                 .sort("views", -1)
//!                 .build(),
//!         )
//!         .await?;
//!
//!     println!("Popular posts: {:?}", popular);
//!
//!     Ok(())
//! }
//! ```
//!
//! # JSON input
//!
//! Schemas, documents and queries can all be given as JSON:
//!
//! ```ignore
//! let schema = SchemaDescriptor::from_json(json!({
//!     "title": "string",
//!     "views": { "type": "number", "required": true },
//! }))?;
//! let data = document_from_json(json!({ "title": "Hello", "views": 1 }))?;
//! let query = Query::from_json(json!([
//!     { "views": { "condition": "gte", "value": 1 } },
//!     { "title": 1 },
//! ]))?;
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - `mongodb` - Persistent MongoDB adapter (requires the `mongodb` feature)

pub mod prelude;

pub use docschema_core::{adapter, document, error, model, pluralize, query, registry, schema, validate, value};

// Re-exported for JSON and BSON input
pub use bson;
pub use serde_json;

/// In-memory persistence adapter.
pub mod memory {
    pub use docschema_memory::{InMemoryAdapter, InMemoryAdapterBuilder};
}

/// MongoDB persistence adapter.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docschema_mongodb::{MongoDbAdapter, MongoDbAdapterBuilder, MongoQuery};
}
