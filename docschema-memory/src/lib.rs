//! In-memory persistence adapter for docschema.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `PersistenceAdapter` trait. It uses async-aware read-write locks for
//! concurrent access and is meant for development and tests.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Every filter operator** - Comparisons, membership and array containment
//! - **Multi-key ordering** - Sort constraints apply in order
//! - **Seeding** - Builders can pre-load documents
//!
//! # Quick Start
//!
//! ```ignore
//! use docschema::{document, memory::InMemoryAdapter, prelude::*};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Registry::builder()
//!         .adapter(InMemoryAdapter::new())
//!         .build()?;
//!     let posts = registry.model("post", schema)?;
//!
//!     posts.add(document! { "title" => "hi", "views" => 1 }, Some("p1")).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docschema_memory;

pub mod evaluator;
pub mod store;

pub use store::{InMemoryAdapter, InMemoryAdapterBuilder};
