//! Persistence adapter abstraction.
//!
//! Models never talk to a database directly. Every read and write goes through
//! a [`PersistenceAdapter`], which owns all I/O, connection handling and ID
//! generation. Adapters receive data that has already been validated and
//! queries that have already been translated into [`Constraint`]s.
//!
//! # Traits
//!
//! - [`PersistenceAdapter`]: The document-store capability consumed by models
//! - [`AdapterBuilder`]: Factory trait for creating adapter instances
//!
//! # Examples
//!
//! ```ignore
//! use docschema::adapter::PersistenceAdapter;
//! use docschema::document;
//!
//! let adapter = MyAdapter::new();
//! let id = adapter
//!     .create_document("posts", document! { "title" => "hi" }, None)
//!     .await?;
//! ```

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    error::ModelResult,
    query::Constraint,
    value::{Document, StoredDocument},
};

/// Abstract interface for document-store adapters.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. A single adapter is usually shared
/// by every model a registry produces.
///
/// # Error Handling
///
/// Adapter failures are reported as
/// [`ModelError::Backend`](crate::error::ModelError::Backend) and are passed
/// to the caller unchanged. A read of a missing document is
/// [`ModelError::NotFound`](crate::error::ModelError::NotFound).
#[async_trait]
pub trait PersistenceAdapter: Send + Sync + Debug {
    /// Returns every document of `collection` matching `constraints`.
    ///
    /// Constraints are applied in order: `Where` entries filter, `OrderBy`
    /// entries sort, earlier sort keys taking precedence. An empty result is
    /// not an error.
    async fn list_documents(
        &self,
        collection: &str,
        constraints: Vec<Constraint>,
    ) -> ModelResult<Vec<StoredDocument>>;

    /// Reads one document by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(id, collection)` when no such document exists.
    async fn read_document(&self, collection: &str, id: &str) -> ModelResult<StoredDocument>;

    /// Stores a new document and returns its ID.
    ///
    /// # Arguments
    ///
    /// * `collection` - The collection to write to. Created on first use.
    /// * `data` - The validated document body
    /// * `id` - With `Some`, the document is written under that ID, replacing
    ///   any existing document. With `None`, the adapter generates an ID.
    async fn create_document(
        &self,
        collection: &str,
        data: Document,
        id: Option<String>,
    ) -> ModelResult<String>;

    /// Merges `partial` into an existing document.
    ///
    /// Fields not named in `partial` keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(id, collection)` when the document does not exist.
    async fn update_document(&self, collection: &str, id: &str, partial: Document) -> ModelResult<()>;

    /// Deletes a document. Deleting a missing document is not an error.
    async fn delete_document(&self, collection: &str, id: &str) -> ModelResult<()>;

    /// Releases the adapter's resources.
    ///
    /// The default implementation does nothing.
    async fn shutdown(self) -> ModelResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<A> PersistenceAdapter for &A
where
    A: PersistenceAdapter + ?Sized,
{
    async fn list_documents(
        &self,
        collection: &str,
        constraints: Vec<Constraint>,
    ) -> ModelResult<Vec<StoredDocument>> {
        (**self)
            .list_documents(collection, constraints)
            .await
    }

    async fn read_document(&self, collection: &str, id: &str) -> ModelResult<StoredDocument> {
        (**self).read_document(collection, id).await
    }

    async fn create_document(
        &self,
        collection: &str,
        data: Document,
        id: Option<String>,
    ) -> ModelResult<String> {
        (**self)
            .create_document(collection, data, id)
            .await
    }

    async fn update_document(&self, collection: &str, id: &str, partial: Document) -> ModelResult<()> {
        (**self)
            .update_document(collection, id, partial)
            .await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> ModelResult<()> {
        (**self).delete_document(collection, id).await
    }
}

#[async_trait]
impl<A> PersistenceAdapter for Arc<A>
where
    A: PersistenceAdapter + ?Sized,
{
    async fn list_documents(
        &self,
        collection: &str,
        constraints: Vec<Constraint>,
    ) -> ModelResult<Vec<StoredDocument>> {
        (**self)
            .list_documents(collection, constraints)
            .await
    }

    async fn read_document(&self, collection: &str, id: &str) -> ModelResult<StoredDocument> {
        (**self).read_document(collection, id).await
    }

    async fn create_document(
        &self,
        collection: &str,
        data: Document,
        id: Option<String>,
    ) -> ModelResult<String> {
        (**self)
            .create_document(collection, data, id)
            .await
    }

    async fn update_document(&self, collection: &str, id: &str, partial: Document) -> ModelResult<()> {
        (**self)
            .update_document(collection, id, partial)
            .await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> ModelResult<()> {
        (**self).delete_document(collection, id).await
    }
}

/// A type-erased adapter, for registries that mix backends or pick one at runtime.
pub type SharedAdapter = Arc<dyn PersistenceAdapter>;

/// Factory for adapters that need async setup, such as opening a connection.
#[async_trait]
pub trait AdapterBuilder {
    type Adapter: PersistenceAdapter;

    async fn build(self) -> ModelResult<Self::Adapter>;
}
