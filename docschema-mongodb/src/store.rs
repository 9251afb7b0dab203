//! MongoDB persistence adapter.
//!
//! Document IDs are stored as string `_id` values. Field names are escaped by
//! the sanitizer; values map onto BSON through the core value model.

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument, doc};
use futures::TryStreamExt;
use log::debug;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};
use uuid::Uuid;

use docschema_core::{
    adapter::{AdapterBuilder, PersistenceAdapter},
    error::{ModelError, ModelResult},
    query::Constraint,
    value::{Document, StoredDocument},
};

use crate::{query::MongoQueryTranslator, sanitizer::FieldNameSanitizer};

const ID_FIELD: &str = "_id";

fn backend_error(err: mongodb::error::Error) -> ModelError {
    ModelError::Backend(err.to_string())
}

/// Persistence adapter backed by a MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoDbAdapter {
    client: Client,
    database: String,
}

impl MongoDbAdapter {
    pub fn new(client: Client, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbAdapterBuilder {
        MongoDbAdapterBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<BsonDocument> {
        self.client
            .database(&self.database)
            .collection(&FieldNameSanitizer::sanitize(collection_name))
    }

    fn prepare_document(id: &str, data: Document) -> BsonDocument {
        let mut document = FieldNameSanitizer::to_bson(data);
        document.insert(ID_FIELD, id);
        document
    }

    fn restore_document(document: BsonDocument) -> ModelResult<StoredDocument> {
        let id = match document.get(ID_FIELD) {
            Some(Bson::String(id)) => id.clone(),
            Some(Bson::ObjectId(id)) => id.to_hex(),
            Some(other) => other.to_string(),
            None => {
                return Err(ModelError::InvalidDocument(
                    "Stored document has no _id".to_string(),
                ));
            }
        };

        Ok(StoredDocument::new(
            id,
            FieldNameSanitizer::from_bson(document, &[ID_FIELD])?,
        ))
    }
}

#[async_trait]
impl PersistenceAdapter for MongoDbAdapter {
    async fn list_documents(
        &self,
        collection: &str,
        constraints: Vec<Constraint>,
    ) -> ModelResult<Vec<StoredDocument>> {
        let query = MongoQueryTranslator::translate(&constraints)?;

        let mut options = FindOptions::default();
        options.sort = query.sort;

        self.get_collection(collection)
            .find(query.filter)
            .with_options(options)
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<BsonDocument>>()
            .await
            .map_err(backend_error)?
            .into_iter()
            .map(Self::restore_document)
            .collect()
    }

    async fn read_document(&self, collection: &str, id: &str) -> ModelResult<StoredDocument> {
        self.get_collection(collection)
            .find_one(doc! { ID_FIELD: id })
            .await
            .map_err(backend_error)?
            .map(Self::restore_document)
            .ok_or_else(|| ModelError::NotFound(id.to_string(), collection.to_string()))?
    }

    async fn create_document(
        &self,
        collection: &str,
        data: Document,
        id: Option<String>,
    ) -> ModelResult<String> {
        let target = self.get_collection(collection);

        let id = match id {
            Some(id) => {
                target
                    .replace_one(doc! { ID_FIELD: id.as_str() }, Self::prepare_document(&id, data))
                    .upsert(true)
                    .await
                    .map_err(backend_error)?;
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                target
                    .insert_one(Self::prepare_document(&id, data))
                    .await
                    .map_err(backend_error)?;
                id
            }
        };

        debug!("stored {collection}/{id}");

        Ok(id)
    }

    async fn update_document(&self, collection: &str, id: &str, partial: Document) -> ModelResult<()> {
        if partial.is_empty() {
            return self
                .read_document(collection, id)
                .await
                .map(|_| ());
        }

        let result = self
            .get_collection(collection)
            .update_one(
                doc! { ID_FIELD: id },
                doc! { "$set": FieldNameSanitizer::to_bson(partial) },
            )
            .await
            .map_err(backend_error)?;

        if result.matched_count == 0 {
            return Err(ModelError::NotFound(id.to_string(), collection.to_string()));
        }

        debug!("merged into {collection}/{id}");

        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> ModelResult<()> {
        let result = self
            .get_collection(collection)
            .delete_one(doc! { ID_FIELD: id })
            .await
            .map_err(backend_error)?;

        debug!("deleted {collection}/{id} (existed: {})", result.deleted_count > 0);

        Ok(())
    }

    async fn shutdown(self) -> ModelResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

/// Builder that parses a connection string and opens a client.
pub struct MongoDbAdapterBuilder {
    dsn: String,
    database: String,
}

impl MongoDbAdapterBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl AdapterBuilder for MongoDbAdapterBuilder {
    type Adapter = MongoDbAdapter;

    async fn build(self) -> ModelResult<Self::Adapter> {
        Ok(MongoDbAdapter::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| ModelError::Initialization(e.to_string()))?,
            )
            .map_err(|e| ModelError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
