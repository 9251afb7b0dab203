//! In-memory persistence adapter.
//!
//! Documents live in nested maps guarded by an async-aware read-write lock:
//! collection name to (document ID to document body).

use async_trait::async_trait;
use log::debug;
use mea::rwlock::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use uuid::Uuid;

use docschema_core::{
    adapter::{AdapterBuilder, PersistenceAdapter},
    error::{ModelError, ModelResult},
    query::{Constraint, SortDirection},
    value::{Document, StoredDocument},
};

use crate::evaluator::{DocumentEvaluator, compare_documents};

type CollectionMap = BTreeMap<String, Document>;
type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory persistence adapter.
///
/// # Thread Safety
///
/// `InMemoryAdapter` is cloneable and keeps its state behind an `Arc`, so
/// clones share the same data. Reads run concurrently; writes are exclusive.
///
/// # Semantics
///
/// - Generated IDs are random v4 UUIDs.
/// - Creating with an explicit ID replaces any document stored under it.
/// - Updates merge into the stored document and fail with `NotFound` when it
///   does not exist.
/// - Deleting a missing document succeeds.
/// - Listing without sort constraints returns documents in ID order.
///
/// # Example
///
/// ```ignore
/// use docschema::{document, memory::InMemoryAdapter, adapter::PersistenceAdapter};
///
/// let adapter = InMemoryAdapter::new();
/// let id = adapter
///     .create_document("posts", document! { "title" => "hi" }, None)
///     .await?;
/// let stored = adapter.read_document("posts", &id).await?;
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryAdapter {
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryAdapter {
    /// Creates an empty adapter.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    pub fn builder() -> InMemoryAdapterBuilder {
        InMemoryAdapterBuilder::default()
    }

    /// Number of documents stored in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.store
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Names of every collection that has been written to.
    pub async fn collections(&self) -> Vec<String> {
        let mut names = self
            .store
            .read()
            .await
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

#[async_trait]
impl PersistenceAdapter for InMemoryAdapter {
    async fn list_documents(
        &self,
        collection: &str,
        constraints: Vec<Constraint>,
    ) -> ModelResult<Vec<StoredDocument>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut matched = Vec::new();
        for (id, document) in collection_map {
            if DocumentEvaluator::new(document).matches(&constraints)? {
                matched.push((id, document));
            }
        }

        let sort_keys = constraints
            .iter()
            .filter_map(|constraint| match constraint {
                Constraint::OrderBy { field, direction } => Some((field.as_str(), *direction)),
                Constraint::Where { .. } => None,
            })
            .collect::<Vec<(&str, SortDirection)>>();

        if !sort_keys.is_empty() {
            matched.sort_by(|(_, a), (_, b)| compare_documents(a, b, &sort_keys));
        }

        Ok(matched
            .into_iter()
            .map(|(id, document)| StoredDocument::new(id.clone(), document.clone()))
            .collect())
    }

    async fn read_document(&self, collection: &str, id: &str) -> ModelResult<StoredDocument> {
        self.store
            .read()
            .await
            .get(collection)
            .and_then(|collection_map| collection_map.get(id))
            .map(|document| StoredDocument::new(id, document.clone()))
            .ok_or_else(|| ModelError::NotFound(id.to_string(), collection.to_string()))
    }

    async fn create_document(
        &self,
        collection: &str,
        data: Document,
        id: Option<String>,
    ) -> ModelResult<String> {
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let replaced = self
            .store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data)
            .is_some();

        debug!("stored {collection}/{id} (replaced: {replaced})");

        Ok(id)
    }

    async fn update_document(&self, collection: &str, id: &str, partial: Document) -> ModelResult<()> {
        let mut store = self.store.write().await;
        let document = store
            .get_mut(collection)
            .and_then(|collection_map| collection_map.get_mut(id))
            .ok_or_else(|| ModelError::NotFound(id.to_string(), collection.to_string()))?;

        document.extend(partial);

        debug!("merged into {collection}/{id}");

        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> ModelResult<()> {
        let removed = self
            .store
            .write()
            .await
            .get_mut(collection)
            .and_then(|collection_map| collection_map.remove(id))
            .is_some();

        debug!("deleted {collection}/{id} (existed: {removed})");

        Ok(())
    }
}

/// Builder for [`InMemoryAdapter`], optionally pre-seeded with documents.
///
/// ```ignore
/// use docschema::{adapter::AdapterBuilder, document, memory::InMemoryAdapter};
///
/// let adapter = InMemoryAdapter::builder()
///     .seed("posts", "p1", document! { "title" => "hi" })
///     .build()
///     .await?;
/// ```
#[derive(Default, Debug)]
pub struct InMemoryAdapterBuilder {
    seed: StoreMap,
}

impl InMemoryAdapterBuilder {
    /// Stores `document` under `id` in `collection` when the adapter is built.
    pub fn seed(mut self, collection: impl Into<String>, id: impl Into<String>, document: Document) -> Self {
        self.seed
            .entry(collection.into())
            .or_default()
            .insert(id.into(), document);
        self
    }
}

#[async_trait]
impl AdapterBuilder for InMemoryAdapterBuilder {
    type Adapter = InMemoryAdapter;

    async fn build(self) -> ModelResult<Self::Adapter> {
        Ok(InMemoryAdapter {
            store: Arc::new(RwLock::new(self.seed)),
        })
    }
}
