//! MongoDB persistence adapter for docschema.
//!
//! This crate provides a MongoDB-based implementation of the
//! `PersistenceAdapter` trait. Translated query constraints run on MongoDB's
//! query engine.
//!
//! To use this adapter, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docschema = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Persistent storage** - Data is persisted to MongoDB Atlas or self-hosted MongoDB
//! - **Native querying** - Filters and sorts are executed by MongoDB
//! - **Async/await** - Fully asynchronous API built on MongoDB's async driver
//!
//! # Example
//!
//! ```ignore
//! use docschema::{adapter::AdapterBuilder, mongodb::MongoDbAdapter, prelude::*};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = MongoDbAdapter::builder("mongodb://localhost:27017", "my_database")
//!         .build()
//!         .await?;
//!     let registry = Registry::builder().adapter(adapter).build()?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docschema_mongodb;

pub mod query;
pub mod sanitizer;
pub mod store;

pub use query::MongoQuery;
pub use store::{MongoDbAdapter, MongoDbAdapterBuilder};
